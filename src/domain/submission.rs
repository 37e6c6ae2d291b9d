//! Parsed submission model
//!
//! A submission is a tree of elements mirroring the form schema. An element
//! that is missing from the tree is "not present", which is different from an
//! element that is present with empty text.

use super::errors::SubmissionError;
use super::ids::InstanceId;
use super::schema::{FieldId, FormSchema};
use chrono::{DateTime, FixedOffset, Utc};
use std::path::PathBuf;

/// One node of a parsed submission document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionElement {
    name: String,
    text: String,
    children: Vec<SubmissionElement>,
}

impl SubmissionElement {
    /// Creates an element with no text and no children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Creates a leaf element with text
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Adds a child, builder style
    pub fn with_child(mut self, child: SubmissionElement) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child
    pub fn push_child(&mut self, child: SubmissionElement) {
        self.children.push(child);
    }

    /// Appends text content
    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content, trimmed
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Child elements in document order
    pub fn children(&self) -> &[SubmissionElement] {
        &self.children
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&SubmissionElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Every child with the given name, in document order
    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a SubmissionElement> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follows a chain of schema fields, taking the first match at each step
    pub fn follow(&self, schema: &FormSchema, path: &[FieldId]) -> Option<&SubmissionElement> {
        path.iter()
            .try_fold(self, |element, field| element.child(&schema.field(*field).name))
    }
}

/// Validation state of a decrypted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Signature matched
    Valid,
    /// Signature did not match
    NotValid,
}

impl ValidationStatus {
    /// Column text for the `isValidated` column
    pub fn as_column_value(self) -> &'static str {
        match self {
            Self::Valid => "true",
            Self::NotValid => "false",
        }
    }
}

/// A parsed submission together with its bookkeeping data
#[derive(Debug, Clone)]
pub struct Submission {
    /// Instance id (KEY of the main row)
    pub instance_id: InstanceId,

    /// Server-side submission date, if recorded
    pub submission_date: Option<DateTime<FixedOffset>>,

    /// Root element of the document
    pub root: SubmissionElement,

    /// Directory holding the submission's attachments
    pub working_dir: PathBuf,

    /// File the submission was parsed from
    pub source_file: PathBuf,

    /// Validation status, only known for decrypted submissions
    pub validation_status: Option<ValidationStatus>,
}

/// One instance of a repeat group located in a submission
#[derive(Debug, Clone)]
pub struct RepeatInstance<'a> {
    /// The group element
    pub element: &'a SubmissionElement,

    /// Key of the enclosing repeat instance, or the instance id
    pub parent_key: String,

    /// Key of this instance
    pub key: String,
}

impl Submission {
    /// Submission date normalized to UTC
    pub fn submission_date_utc(&self) -> Option<DateTime<Utc>> {
        self.submission_date.map(|d| d.with_timezone(&Utc))
    }

    /// Locates every instance of a repeat group, in document order
    ///
    /// Keys extend the instance id with `/<name>` for each non-repeating
    /// ancestor group and `/<name>[<n>]` (1-based) for each repeat instance.
    pub fn repeat_instances(&self, schema: &FormSchema, group: FieldId) -> Vec<RepeatInstance<'_>> {
        let path = schema.path(group);
        let mut out = Vec::new();
        let base = self.instance_id.as_str().to_string();
        collect_instances(schema, &path, &self.root, &base, &base, &mut out);
        out
    }

    /// Checks the submission against the schema's repeat structure
    ///
    /// A field the schema declares non-repeatable must occur at most once
    /// under each parent element.
    pub fn validate(&self, schema: &FormSchema) -> Result<(), SubmissionError> {
        validate_element(schema, schema.root(), &self.root).map_err(|reason| {
            SubmissionError::Invalid {
                instance_id: self.instance_id.to_string(),
                reason,
            }
        })
    }
}

fn collect_instances<'a>(
    schema: &FormSchema,
    path: &[FieldId],
    element: &'a SubmissionElement,
    path_key: &str,
    row_key: &str,
    out: &mut Vec<RepeatInstance<'a>>,
) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let field = schema.field(*head);
    for (index, child) in element.children_named(&field.name).enumerate() {
        let key = if field.repeatable {
            format!("{}/{}[{}]", path_key, field.name, index + 1)
        } else {
            format!("{}/{}", path_key, field.name)
        };
        if rest.is_empty() {
            out.push(RepeatInstance {
                element: child,
                parent_key: row_key.to_string(),
                key,
            });
        } else {
            let next_row_key = if field.repeatable { key.as_str() } else { row_key };
            collect_instances(schema, rest, child, &key, next_row_key, out);
        }
    }
}

fn validate_element(
    schema: &FormSchema,
    field: FieldId,
    element: &SubmissionElement,
) -> Result<(), String> {
    for child_id in schema.field(field).children() {
        let child = schema.field(*child_id);
        let mut count = 0;
        for occurrence in element.children_named(&child.name) {
            count += 1;
            if !child.repeatable && count > 1 {
                return Err(format!(
                    "non-repeating field {} occurs more than once",
                    schema.fqn(*child_id)
                ));
            }
            validate_element(schema, *child_id, occurrence)?;
        }
    }
    Ok(())
}
