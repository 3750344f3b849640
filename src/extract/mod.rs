mod codes;
mod name;

pub use codes::resolve_document_code;
pub use name::{FieldMap, ParsedName};
