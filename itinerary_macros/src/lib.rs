mod schema_extraction;
mod structured_output;

use proc_macro::TokenStream;

/// Marks a struct as a structured-output payload for the generation endpoint.
///
/// Implements `StructuredOutput` with a cached JSON schema (doc comments become
/// field descriptions, every `String` field is required to be non-empty) and
/// `TextFields` so callers can walk the free-text fields of a decoded value.
///
/// ```ignore
/// #[structured_output(name = "ItineraryDay")]
/// pub struct ItineraryDay {
///     /// Day ordinal plus a short theme
///     pub day: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn structured_output(attr: TokenStream, item: TokenStream) -> TokenStream {
    structured_output::structured_output(attr, item)
}
