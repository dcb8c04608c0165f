//! Document loading and export
//!
//! Loaders turn a path into raw text; exporters write processed chunks and
//! cost reports back out.

pub mod collection;
pub mod export;
pub mod handler;
pub mod text;

pub use collection::expand_inputs;
pub use export::{ExportError, ExportFormat};
pub use handler::{DocumentLoader, LoaderRegistry};
pub use text::{ExternalFormatLoader, TextLoader};
