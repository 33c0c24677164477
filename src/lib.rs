//! classdoc: extract structured API documentation models from PHP class
//! definitions.
//!
//! A scanner builds a class metadata table from PHP source text, and
//! [`ClassDocAssembler`] turns one class from that table into a merged,
//! de-duplicated documentation model: class description, own and inherited
//! methods, own and inherited constants. Methods without a usable docblock
//! fall back to an external reference index. The model serializes to JSON
//! for downstream rendering pipelines; no rendering happens here.

pub mod assembler;
pub mod atlas;
pub mod docblock;
pub mod model;
pub mod registry;
pub mod scan;

pub use assembler::ClassDocAssembler;
pub use atlas::{manual_link, AtlasIndex, DocIndex, FallbackEntry};
pub use docblock::{to_single_line, DocBlock};
pub use model::{
    Binding, ClassDescription, ConstantDoc, DocumentedMethod, FallbackMethod, MethodDoc, ParamDoc,
    TagDoc,
};
pub use registry::{ClassHandle, ClassMeta, ClassRegistry, ConstantMeta, MethodMeta, Visibility};
pub use scan::{scan_path, scan_source};

/// Errors surfaced by the extraction pipeline.
///
/// Missing documentation is never an error; the only fatal condition in the
/// core is asking for a class the registry does not know.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown class: {0}")]
    UnknownClass(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for classdoc operations.
pub type Result<T> = std::result::Result<T, Error>;
