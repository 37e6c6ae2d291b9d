//! Domain models and types for formcast.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`FormId`], [`InstanceId`])
//! - **The schema arena** ([`FormSchema`], [`SchemaField`], [`FieldId`])
//! - **Parsed submissions** ([`Submission`], [`SubmissionElement`])
//! - **Form definition files** ([`FormDefinition`])
//! - **Error types** ([`FormcastError`], [`SubmissionError`], [`LineSetError`])
//! - **Result type alias** ([`Result`])
//!
//! # Building a schema
//!
//! ```rust
//! use formcast::domain::{FieldSpec, FormSchema, ValueKind};
//!
//! let mut schema = FormSchema::new("data");
//! let root = schema.root();
//! let people = schema.add_field(root, FieldSpec::repeat("people"));
//! let age = schema.add_field(people, FieldSpec::new("age", ValueKind::Integer));
//!
//! assert_eq!(schema.fqn(age), "people-age");
//! ```

pub mod errors;
pub mod form;
pub mod ids;
pub mod result;
pub mod schema;
pub mod submission;

// Re-export commonly used types for convenience
pub use errors::{FormcastError, LineSetError, SubmissionError};
pub use form::{FieldDefinition, FieldKind, FormDefinition};
pub use ids::{FormId, InstanceId};
pub use result::Result;
pub use schema::{ChoiceOption, FieldId, FieldSpec, FormSchema, SchemaField, ValueKind};
pub use submission::{RepeatInstance, Submission, SubmissionElement, ValidationStatus};
