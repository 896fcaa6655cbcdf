//! Input parsing, output writing and the in-memory dataset model.

mod dataset;
mod parser;
mod source;
mod writer;

pub use dataset::{Cell, Column, DEFAULT_NULL_TOKENS, Dataset, format_number};
pub use parser::{Parser, ParserConfig};
pub use source::SourceMetadata;
pub use writer::{OutputFormat, to_bytes, write_dataset};
