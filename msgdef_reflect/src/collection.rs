/* Array materialization; each element goes back through the materializer's dispatch */

use crate::errors::ReflectResult;
use crate::materialize::Materializer;
use crate::schema::SchemaNode;
use crate::value::Value;
use serde_json::Value as JsonValue;

pub struct CollectionBuilder<'m, 'a> {
    materializer: &'m Materializer<'a>,
    node: SchemaNode<'a>,
    field: &'m str,
}

impl<'m, 'a> CollectionBuilder<'m, 'a> {
    pub fn new(materializer: &'m Materializer<'a>, node: SchemaNode<'a>, field: &'m str) -> Self {
        Self {
            materializer,
            node,
            field,
        }
    }

    pub fn build(&self, json: &JsonValue) -> ReflectResult<Value> {
        let element = self
            .node
            .element()
            .ok_or_else(|| self.materializer.value_error(self.field, "not an array field"))?;
        let items = json
            .as_array()
            .ok_or_else(|| self.materializer.value_error(self.field, "expected an array"))?;

        let mut elements = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let label = format!("{}[{}]", self.field, index);
            elements.push(self.materializer.element(&self.node, element, &label, item)?);
        }
        Ok(Value::Array(elements))
    }
}
