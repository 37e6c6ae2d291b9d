//! CSV rendering engine
//!
//! This module turns parsed submissions into CSV rows:
//!
//! - [`mapper`] - field mapper dispatch and choice-list expansion
//! - [`row`] - main and repeat group rows plus their headers
//! - [`encode`] - value encoding and the empty-value policy
//! - [`format`] - date and time formatting
//! - [`lines`] - rendered lines and the associative per-file merge
//! - [`media`] - attachment copy with content-hash deduplication
//! - [`audit`] - per-instance and aggregated audit trails
//! - [`writer`] - writing or appending CSV files
//!
//! # Example
//!
//! ```rust
//! use formcast::core::csv::RowRenderer;
//! use formcast::core::export::ExportOptions;
//! use formcast::domain::{FieldSpec, FormId, FormSchema, ValueKind};
//! use std::str::FromStr;
//! use std::sync::Arc;
//!
//! let mut schema = FormSchema::new("data");
//! let root = schema.root();
//! schema.add_field(root, FieldSpec::new("name", ValueKind::Text));
//!
//! let options = ExportOptions::new(FormId::from_str("f").unwrap(), "Form", "exports");
//! let renderer = RowRenderer::new(Arc::new(schema), Arc::new(options), None);
//! assert_eq!(renderer.main_header().unwrap(), "SubmissionDate,name,KEY");
//! ```

pub mod audit;
pub mod encode;
pub mod format;
pub mod lines;
pub mod mapper;
pub mod media;
pub mod row;
pub mod writer;

/// Prefix of media references written into CSV cells
pub const MEDIA_PREFIX: &str = "media/";

pub use audit::AuditAppender;
pub use encode::encode_value;
pub use lines::{Line, LineSet};
pub use mapper::{Column, MapContext, MapperTable, Visibility};
pub use media::resolve_media;
pub use row::RowRenderer;
pub use writer::write_csv;
