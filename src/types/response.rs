use std::sync::OnceLock;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::{
    error::{PlannerError, Result},
    schemas::{compile_schema, validate_with, StructuredOutput},
    types::itinerary::{Itinerary, ItineraryDay},
};

/// Compiled validator for [`Itinerary::response_schema`], built on first use.
fn itinerary_validator() -> Result<&'static JSONSchema> {
    static VALIDATOR: OnceLock<std::result::Result<JSONSchema, String>> = OnceLock::new();

    VALIDATOR
        .get_or_init(|| {
            compile_schema(ItineraryDay::schema().schema_name(), &Itinerary::response_schema())
                .map_err(|err| match err {
                    PlannerError::Format(detail) => detail,
                    other => other.to_string(),
                })
        })
        .as_ref()
        .map_err(|detail| PlannerError::Format(detail.clone()))
}

/// Decode the provider's text payload into an [`Itinerary`].
///
/// The text must be a JSON array that satisfies [`Itinerary::response_schema`]:
/// at least one element, each with non-empty `day`, `morning`, `afternoon` and
/// `night` strings, none of them whitespace-only. Anything else is a format failure.
pub fn decode_itinerary(text: &str) -> Result<Itinerary> {
    if text.trim().is_empty() {
        return Err(PlannerError::MissingPayload);
    }

    let payload: Value = serde_json::from_str(text)?;
    validate_with(
        ItineraryDay::schema().schema_name(),
        itinerary_validator()?,
        &payload,
    )?;

    let days: Vec<ItineraryDay> = decode_structured(payload)?;
    Ok(Itinerary::from(days))
}

/// Deserialize a JSON value, reporting the path of the first mismatch.
pub fn decode_structured<T>(payload: Value) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_path_to_error::deserialize(payload).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        PlannerError::Format(format!(
            "failed to deserialize `{}` at {}: {}",
            std::any::type_name::<T>(),
            location,
            err.inner()
        ))
    })
}
