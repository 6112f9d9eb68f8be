use crate::errors::ParseVersionRangeError;
use std::fmt;
use std::str::FromStr;

/// Closed range of message versions.
///
/// Textual forms follow the schema files: `"3"`, `"0-7"`, `"2+"` (open
/// ended) and `"none"`. An empty range is stored with `lowest > highest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    lowest: i16,
    highest: i16,
}

impl VersionRange {
    pub const fn new(lowest: i16, highest: i16) -> Self {
        Self { lowest, highest }
    }

    pub const fn none() -> Self {
        Self {
            lowest: 0,
            highest: -1,
        }
    }

    pub const fn starting_at(lowest: i16) -> Self {
        Self {
            lowest,
            highest: i16::MAX,
        }
    }

    pub fn lowest(&self) -> i16 {
        self.lowest
    }

    pub fn highest(&self) -> i16 {
        self.highest
    }

    pub fn is_empty(&self) -> bool {
        self.lowest > self.highest
    }

    /// True for `N+` ranges, which have no finite upper bound.
    pub fn is_open_ended(&self) -> bool {
        !self.is_empty() && self.highest == i16::MAX
    }

    pub fn contains(&self, version: i16) -> bool {
        !self.is_empty() && self.lowest <= version && version <= self.highest
    }

    pub fn is_subset_of(&self, other: &VersionRange) -> bool {
        self.is_empty()
            || (!other.is_empty() && other.lowest <= self.lowest && self.highest <= other.highest)
    }

    pub fn intersect(&self, other: &VersionRange) -> VersionRange {
        if self.is_empty() || other.is_empty() {
            return VersionRange::none();
        }
        let lowest = self.lowest.max(other.lowest);
        let highest = self.highest.min(other.highest);
        if lowest > highest {
            VersionRange::none()
        } else {
            VersionRange::new(lowest, highest)
        }
    }

    /// Every version in the range, ascending. Only meaningful for finite ranges.
    pub fn iter(&self) -> impl Iterator<Item = i16> {
        self.lowest..=self.highest
    }
}

impl FromStr for VersionRange {
    type Err = ParseVersionRangeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| ParseVersionRangeError {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(err("empty range"));
        }
        if trimmed == "none" {
            return Ok(VersionRange::none());
        }

        let parse_bound = |s: &str| -> Result<i16, ParseVersionRangeError> {
            let value = s
                .trim()
                .parse::<i16>()
                .map_err(|e| err(&format!("bad bound '{}': {}", s, e)))?;
            if value < 0 {
                return Err(err("versions must not be negative"));
            }
            Ok(value)
        };

        if let Some(lowest) = trimmed.strip_suffix('+') {
            return Ok(VersionRange::starting_at(parse_bound(lowest)?));
        }
        if let Some((lowest, highest)) = trimmed.split_once('-') {
            let lowest = parse_bound(lowest)?;
            let highest = parse_bound(highest)?;
            if lowest > highest {
                return Err(err("lowest version is greater than highest"));
            }
            return Ok(VersionRange::new(lowest, highest));
        }
        let single = parse_bound(trimmed)?;
        Ok(VersionRange::new(single, single))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "none")
        } else if self.is_open_ended() {
            write!(f, "{}+", self.lowest)
        } else if self.lowest == self.highest {
            write!(f, "{}", self.lowest)
        } else {
            write!(f, "{}-{}", self.lowest, self.highest)
        }
    }
}
