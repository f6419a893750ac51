//! Source discovery and tree-sitter call extraction

pub mod languages;
pub mod parser_pool;
pub mod sources;


pub use parser_pool::{ParserPool, ParseResult, ParseRequest, FileType, create_parser_pool};
pub use languages::rust::RustCallExtractor;
pub use sources::{collect_sources, has_extension, read_sources};
