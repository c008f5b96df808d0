pub mod field;
pub mod template;

pub use field::{Field, FieldKind, FieldType, WireField};
pub use template::{StoredTemplate, Template};
