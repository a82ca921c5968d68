//! Output schema descriptors for schema-constrained generation
//!
//! Serializes to the OpenAPI subset accepted as `responseSchema`.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_ordering: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Schema {
    fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            properties: None,
            property_ordering: None,
            items: None,
            required: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a property; declaration order is kept as the property ordering
    pub fn property(mut self, name: &str, schema: Schema) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), schema);
        let ordering = self.property_ordering.get_or_insert_with(Vec::new);
        if !ordering.iter().any(|existing| existing == name) {
            ordering.push(name.to_string());
        }
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Mark every declared property as required
    pub fn require_all(mut self) -> Self {
        self.required = self.property_ordering.clone();
        self
    }

    pub fn required_keys(&self) -> &[String] {
        self.required.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_schema_serialization() {
        let schema = Schema::object()
            .property("temperature", Schema::string().describe("Celsius"))
            .property("humidity", Schema::string())
            .require_all();

        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "OBJECT",
                "properties": {
                    "temperature": {"type": "STRING", "description": "Celsius"},
                    "humidity": {"type": "STRING"}
                },
                "propertyOrdering": ["temperature", "humidity"],
                "required": ["temperature", "humidity"]
            })
        );
    }

    #[test]
    fn test_array_of_objects() {
        let schema = Schema::array(
            Schema::object()
                .property("name", Schema::string())
                .required(&["name"]),
        );
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["type"], "ARRAY");
        assert_eq!(value["items"]["type"], "OBJECT");
        assert_eq!(value["items"]["required"], json!(["name"]));
    }

    #[test]
    fn test_object_without_required_list() {
        let schema = Schema::object().property("N", Schema::string());
        assert!(schema.required_keys().is_empty());
        assert!(serde_json::to_value(&schema).unwrap().get("required").is_none());
    }
}
