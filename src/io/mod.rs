//! PDF input/output operations.
//!
//! Reading source documents and writing the merged result.

pub mod reader;
pub mod writer;

pub use reader::{PdfReader, SourceDocument};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
