//! Storage integrations for formcast.
//!
//! The export engine talks to storage through the traits in [`traits`]:
//!
//! - [`SubmissionSource`] - lists candidate submission files
//! - [`SubmissionParser`] - turns a file into a parsed submission
//! - [`CheckpointStorage`] - persists per-form export checkpoints
//!
//! [`filesystem`] provides the implementations used by the CLI: an instance
//! directory scanner, an XML parser and a JSON checkpoint file.
//!
//! ```rust,no_run
//! use formcast::adapters::filesystem::FileSystemSource;
//! use formcast::adapters::{DateRange, SubmissionSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = FileSystemSource::new("./instances");
//! let files = source.list_submissions(DateRange::default(), None).await?;
//! println!("{} candidates", files.len());
//! # Ok(())
//! # }
//! ```

pub mod filesystem;
pub mod traits;

pub use traits::{CheckpointStorage, DateRange, SubmissionFile, SubmissionParser, SubmissionSource};
