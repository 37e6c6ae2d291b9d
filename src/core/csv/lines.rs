//! Rendered lines and their per-file aggregation
//!
//! Submissions are rendered concurrently. Each task produces one [`LineSet`]
//! per destination file and the orchestrator reduces them with
//! [`LineSet::merge`], which is associative and order-independent.

use crate::domain::LineSetError;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// One encoded CSV row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Instance the row was rendered from
    pub instance_id: String,
    /// Submission date, used for ordering only
    pub submission_date: Option<DateTime<Utc>>,
    /// Encoded row, without the trailing newline
    pub text: String,
}

impl Line {
    /// Creates a line
    pub fn new(
        instance_id: impl Into<String>,
        submission_date: Option<DateTime<Utc>>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            submission_date,
            text: text.into(),
        }
    }

    // Undated lines sort first; ties break on the instance id.
    fn chronological(&self, other: &Self) -> Ordering {
        self.submission_date
            .cmp(&other.submission_date)
            .then_with(|| self.instance_id.cmp(&other.instance_id))
    }
}

/// Rows destined for one output file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    fqn: Option<String>,
    lines: Vec<Line>,
    last_line: Option<Line>,
}

impl LineSet {
    /// An untagged set without lines, mergeable into any file
    pub fn empty() -> Self {
        Self::default()
    }

    /// A set of lines for the file identified by `fqn`
    pub fn of(fqn: impl Into<String>, lines: Vec<Line>) -> Self {
        let last_line = lines
            .iter()
            .max_by(|a, b| a.chronological(b))
            .cloned();
        Self {
            fqn: Some(fqn.into()),
            lines,
            last_line,
        }
    }

    /// The destination FQN, `None` when untagged
    pub fn fqn(&self) -> Option<&str> {
        self.fqn.as_deref()
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the set has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The chronologically most recent line
    pub fn last_line(&self) -> Option<&Line> {
        self.last_line.as_ref()
    }

    /// Combines two sets of the same file
    ///
    /// # Errors
    ///
    /// Fails when both sets are untagged or tagged with different FQNs.
    pub fn merge(self, other: LineSet) -> Result<LineSet, LineSetError> {
        let fqn = match (self.fqn, other.fqn) {
            (None, None) => return Err(LineSetError::BothUntagged),
            (Some(left), Some(right)) if left != right => {
                return Err(LineSetError::FqnMismatch { left, right })
            }
            (Some(fqn), _) | (None, Some(fqn)) => fqn,
        };

        let last_line = match (self.last_line, other.last_line) {
            (Some(a), Some(b)) => Some(if b.chronological(&a) == Ordering::Greater {
                b
            } else {
                a
            }),
            (a, b) => a.or(b),
        };

        let mut lines = self.lines;
        lines.extend(other.lines);

        Ok(LineSet {
            fqn: Some(fqn),
            lines,
            last_line,
        })
    }

    /// Lines ordered by submission date, oldest first
    pub fn sorted(&self) -> Vec<&Line> {
        let mut lines: Vec<&Line> = self.lines.iter().collect();
        lines.sort_by(|a, b| a.chronological(b));
        lines
    }

    /// Lines in processing order
    pub fn unsorted(&self) -> Vec<&Line> {
        self.lines.iter().collect()
    }
}
