//! Local filesystem adapters
//!
//! - [`source`] - lists instance directories holding `submission.xml`
//! - [`parser`] - parses submission XML with `quick-xml`
//! - [`checkpoint`] - stores export checkpoints in a JSON file

pub mod checkpoint;
pub mod parser;
pub mod source;

pub use checkpoint::JsonFileCheckpointStorage;
pub use parser::XmlSubmissionParser;
pub use source::{FileSystemSource, SUBMISSION_FILE_NAME};
