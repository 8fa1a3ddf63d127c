//! Input decoding, parsing, and raw table handling.

mod decode;
mod parser;
mod source;

pub use decode::{DecodeConfig, Decoded, TextEncoding, decode};
pub use parser::{Parsed, Parser, ParserConfig};
pub use source::{RawTable, SourceMetadata};
