//! Fluent configuration DSL over [`Resource`](crate::resource::Resource).

mod form;
mod index;
mod resource;

pub use form::{FormBuilder, InputGroupBuilder};
pub use index::IndexBuilder;
pub use resource::ResourceBuilder;
