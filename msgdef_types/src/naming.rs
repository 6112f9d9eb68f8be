/* Identifier casing conversions shared by the generator and the fixture materializer */

/// `FooRequest` -> `foo_request`. A run of capitals stays in one word, so
/// `KRaftVersion` -> `kraft_version` and `TopicIDs` -> `topic_ids`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_upper = true;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !prev_upper && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_upper = true;
        } else {
            out.push(c);
            prev_upper = false;
        }
    }
    out
}

/// `timeout_ms` -> `TimeoutMs`. Every segment is lowercased before its
/// first letter is capitalized, so acronyms come out as `Kraft`.
pub fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_').filter(|s| !s.is_empty()) {
        let lower = segment.to_ascii_lowercase();
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    out
}
