//! Data structures for atlas export: attributes, metadata, matrix container.

mod attrs;
mod matrix_file;
mod metadata;

pub use attrs::{AttrValue, FileAttrs};
pub use matrix_file::{MatrixFile, EXTENSION};
pub use metadata::MetadataStore;
