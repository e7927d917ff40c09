pub mod annotation;
pub mod floorplan;
pub mod form;

pub use annotation::{Markup, PhotoRef, Pin, LINE_COLOR, RECTANGLE_COLOR};
pub use floorplan::{current_version, next_version};
pub use form::{FieldKind, FormDefinition, FormField, FormSchema};
