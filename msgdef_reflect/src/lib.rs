/* Message Fixture Materialization Library
 *
 * Builds typed instances of versioned messages from JSON fixtures. Field
 * presence at a version comes from the same projection the code generator
 * uses, so a materialized instance has exactly the fields of the struct
 * emitted for that version.
 */

pub mod collection;
pub mod errors;
pub mod materialize;
pub mod naming;
pub mod schema;
pub mod value;

pub use errors::{ReflectError, ReflectResult};
pub use materialize::{materialize_fixture, Materializer};
pub use naming::normalize;
pub use schema::SchemaNode;
pub use value::{Instance, RawTaggedField, Value};
