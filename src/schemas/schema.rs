use schemars::schema::{ObjectValidation, RootSchema, Schema, SchemaObject};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::{
    any::TypeId,
    sync::Arc,
};

/// Cached JSON schema handle associated with a structured-output type.
#[derive(Clone, Debug)]
pub struct SchemaHandle {
    schema_name: &'static str,
    type_name: &'static str,
    type_id: TypeId,
    field_order: &'static [&'static str],
    schema_json: Arc<Value>,
}

impl SchemaHandle {
    pub fn from_root_schema<T: 'static>(
        schema_name: &'static str,
        type_name: &'static str,
        field_order: &'static [&'static str],
        root: RootSchema,
    ) -> Self {
        // RootSchema is plain data; serializing it into a Value cannot fail.
        let schema_json = serde_json::to_value(root)
            .unwrap_or_else(|err| panic!("failed to serialize schema for {}: {}", type_name, err));

        Self {
            schema_name,
            type_name,
            type_id: TypeId::of::<T>(),
            field_order,
            schema_json: Arc::new(schema_json),
        }
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Field names in declaration order.
    pub fn field_order(&self) -> &'static [&'static str] {
        self.field_order
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }

    /// Object schema in the dialect accepted by the generation endpoint's
    /// `responseSchema`: no `$schema`, `title` or `definitions`, and an explicit
    /// `propertyOrdering` so the model emits fields in declaration order.
    pub fn provider_schema(&self) -> Value {
        let source = self.schema_json();
        let mut object = Map::new();
        object.insert("type".to_string(), json!("object"));

        if let Some(description) = source.get("description") {
            object.insert("description".to_string(), description.clone());
        }
        if let Some(properties) = source.get("properties") {
            object.insert("properties".to_string(), properties.clone());
        }
        if let Some(required) = source.get("required") {
            object.insert("required".to_string(), required.clone());
        }
        object.insert("propertyOrdering".to_string(), json!(self.field_order));

        Value::Object(object)
    }
}

/// A type the generation endpoint can be asked to produce.
pub trait StructuredOutput: DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static SchemaHandle;
}

/// Read access to the free-text fields of a decoded value.
pub trait TextFields {
    fn text_fields(&self) -> Vec<(&'static str, &str)>;
}

/// Apply doc comments captured by the procedural macro to the generated schema metadata.
pub fn apply_doc_comments(
    root: &mut RootSchema,
    title: &'static str,
    description: Option<&'static str>,
    field_docs: &[(&'static str, &'static str)],
) {
    let schema_object = &mut root.schema;
    let metadata = schema_object.metadata();
    metadata.title.get_or_insert_with(|| title.to_string());
    if let Some(description) = description {
        metadata
            .description
            .get_or_insert_with(|| description.to_string());
    }

    for (field, doc) in field_docs {
        if let Some(field_object) = property_mut(schema_object, field) {
            field_object
                .metadata()
                .description
                .get_or_insert_with(|| (*doc).to_string());
        }
    }
}

/// Pattern matching any value with at least one non-whitespace character.
pub const NON_BLANK_PATTERN: &str = r"\S";

/// Mark the given string fields as required, non-empty and not whitespace-only.
pub fn require_non_empty(root: &mut RootSchema, fields: &[&'static str]) {
    for field in fields {
        if let Some(field_object) = property_mut(&mut root.schema, field) {
            let string = field_object.string();
            string.min_length = Some(1);
            string.pattern = Some(NON_BLANK_PATTERN.to_string());
        }
        root.schema
            .object()
            .required
            .insert((*field).to_string());
    }
}

fn property_mut<'a>(schema: &'a mut SchemaObject, field: &str) -> Option<&'a mut SchemaObject> {
    let object: &mut ObjectValidation = schema.object.as_deref_mut()?;
    match object.properties.get_mut(field) {
        Some(Schema::Object(field_object)) => Some(field_object),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Stop {
        /// Where to go
        place: String,
        note: Option<String>,
    }

    fn stop_handle() -> SchemaHandle {
        let mut root = schemars::schema_for!(Stop);
        apply_doc_comments(
            &mut root,
            "Stop",
            Some("One stop"),
            &[("note", "Free-form note")],
        );
        require_non_empty(&mut root, &["place"]);
        SchemaHandle::from_root_schema::<Stop>("Stop", "Stop", &["place", "note"], root)
    }

    #[test]
    fn test_doc_comments_fill_missing_descriptions() {
        let handle = stop_handle();
        let schema = handle.schema_json();

        assert_eq!(schema["title"], "Stop");
        assert_eq!(schema["description"], "One stop");
        assert_eq!(schema["properties"]["place"]["description"], "Where to go");
        assert_eq!(schema["properties"]["note"]["description"], "Free-form note");
    }

    #[test]
    fn test_require_non_empty_sets_min_length() {
        let handle = stop_handle();
        let schema = handle.schema_json();

        assert_eq!(schema["properties"]["place"]["minLength"], 1);
        assert_eq!(schema["properties"]["place"]["pattern"], NON_BLANK_PATTERN);
        assert!(schema["properties"]["note"].get("minLength").is_none());
        assert!(schema["properties"]["note"].get("pattern").is_none());
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("place")));
    }

    #[test]
    fn test_provider_schema_drops_meta_keys() {
        let handle = stop_handle();
        let provider = handle.provider_schema();

        assert_eq!(provider["type"], "object");
        assert!(provider.get("$schema").is_none());
        assert!(provider.get("title").is_none());
        assert_eq!(provider["propertyOrdering"], json!(["place", "note"]));
        assert_eq!(provider["properties"]["place"]["type"], "string");
        assert_eq!(handle.type_id(), TypeId::of::<Stop>());
    }
}
