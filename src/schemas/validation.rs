use crate::error::{PlannerError, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Compile a JSON schema into a draft-7 validator.
pub fn compile_schema(schema_name: &str, schema: &Value) -> Result<JSONSchema> {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|err| {
            PlannerError::Format(format!(
                "failed to prepare `{}` schema for validation: {}",
                schema_name, err
            ))
        })
}

/// Compile `schema` and validate a payload against it in one step.
pub fn validate_against_schema(schema_name: &str, schema: &Value, payload: &Value) -> Result<()> {
    let validator = compile_schema(schema_name, schema)?;
    validate_with(schema_name, &validator, payload)
}

/// Validate a decoded payload with a compiled validator, reporting up to
/// `MAX_SCHEMA_ERRORS` violations with their instance paths.
pub fn validate_with(schema_name: &str, validator: &JSONSchema, payload: &Value) -> Result<()> {
    let Err(errors) = validator.validate(payload) else {
        return Ok(());
    };

    let mut details = Vec::new();
    let mut truncated = false;
    for (idx, error) in errors.enumerate() {
        if idx == MAX_SCHEMA_ERRORS {
            truncated = true;
            break;
        }
        let path = error.instance_path.to_string();
        let path = if path.is_empty() { "<root>".to_string() } else { path };
        details.push(format!("{}: {}", path, error));
    }

    let mut detail = if details.is_empty() {
        "payload failed schema validation".to_string()
    } else {
        details.join("; ")
    };
    if truncated {
        detail.push_str("; additional errors truncated");
    }

    Err(PlannerError::Format(format!(
        "payload does not match `{}` schema: {}",
        schema_name, detail
    )))
}
