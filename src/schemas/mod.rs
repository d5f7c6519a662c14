pub mod schema;
pub mod validation;

pub use schema::{
    apply_doc_comments, require_non_empty, SchemaHandle, StructuredOutput, TextFields,
    NON_BLANK_PATTERN,
};
pub use validation::{compile_schema, validate_against_schema, validate_with};
