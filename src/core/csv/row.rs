//! Submission row rendering
//!
//! [`RowRenderer`] turns one submission into encoded lines for the main file
//! and for every repeat group file, and produces the matching header lines.

use super::audit::AuditAppender;
use super::encode::{allow_empty_in_main, allow_empty_in_repeat, encode_header, encode_value};
use super::format::format_utc;
use super::lines::{Line, LineSet};
use super::mapper::{set_of_column_name, set_of_value, Column, MapContext, MapperTable};
use crate::core::export::ExportOptions;
use crate::domain::{FieldId, FormSchema, Result, Submission, ValueKind};
use std::collections::HashMap;
use std::sync::Arc;

/// First column of the main file
pub const SUBMISSION_DATE_COLUMN: &str = "SubmissionDate";
/// Row key column
pub const KEY_COLUMN: &str = "KEY";
/// Key of the owning row in repeat files
pub const PARENT_KEY_COLUMN: &str = "PARENT_KEY";
/// Signature check result of encrypted forms
pub const VALIDATED_COLUMN: &str = "isValidated";

/// Renders submissions of one form
#[derive(Debug, Clone)]
pub struct RowRenderer {
    schema: Arc<FormSchema>,
    options: Arc<ExportOptions>,
    mappers: MapperTable,
    audit: Option<Arc<AuditAppender>>,
}

impl RowRenderer {
    pub fn new(
        schema: Arc<FormSchema>,
        options: Arc<ExportOptions>,
        audit: Option<Arc<AuditAppender>>,
    ) -> Self {
        let mappers = MapperTable::resolve(&schema, &options);
        Self {
            schema,
            options,
            mappers,
            audit,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Destination key of the main file
    pub fn main_fqn(&self) -> String {
        self.schema.fqn(self.schema.root())
    }

    fn context<'a>(
        &'a self,
        submission: Option<&'a Submission>,
        row_base: Option<FieldId>,
        row_key: &'a str,
    ) -> MapContext<'a> {
        MapContext {
            schema: &self.schema,
            options: &self.options,
            mappers: &self.mappers,
            submission,
            row_base,
            row_key,
            audit: self.audit.as_deref(),
        }
    }

    /// `SubmissionDate,<columns>,KEY[,isValidated]`
    pub fn main_header(&self) -> Result<String> {
        let ctx = self.context(None, None, "");
        let columns = self.mappers.map(&ctx, self.schema.root(), None)?;

        let mut names = vec![SUBMISSION_DATE_COLUMN.to_string()];
        names.extend(visible(columns).map(|c| c.name));
        names.push(KEY_COLUMN.to_string());
        if self.options.encrypted {
            names.push(VALIDATED_COLUMN.to_string());
        }
        Ok(encode_header(names.iter().map(String::as_str)))
    }

    /// `<columns>,PARENT_KEY,KEY,SET-OF-<group>`
    pub fn repeat_header(&self, group: FieldId) -> Result<String> {
        let ctx = self.context(None, Some(group), "");
        let columns = self.mappers.map_children(&ctx, group, None)?;

        let mut names: Vec<String> = visible(columns).map(|c| c.name).collect();
        names.push(PARENT_KEY_COLUMN.to_string());
        names.push(KEY_COLUMN.to_string());
        names.push(set_of_column_name(&self.schema, &self.options, group));
        Ok(encode_header(names.iter().map(String::as_str)))
    }

    /// Renders the main row of a submission
    pub fn render_main(&self, submission: &Submission) -> Result<Line> {
        let instance_id = submission.instance_id.as_str();
        let ctx = self.context(Some(submission), None, instance_id);
        let columns = self
            .mappers
            .map(&ctx, self.schema.root(), Some(&submission.root))?;

        let date = submission.submission_date_utc();
        let mut cells = vec![encode_value(date.map(|d| format_utc(&d)).as_deref(), true)];
        cells.extend(visible(columns).map(|c| encode_value(c.value.as_deref(), allow_empty_in_main(&c))));
        cells.push(encode_value(Some(instance_id), false));
        if self.options.encrypted {
            let status = submission.validation_status.map(|s| s.as_column_value());
            cells.push(encode_value(status, false));
        }

        Ok(Line::new(instance_id, date, cells.join(",")))
    }

    /// Renders one row per instance of a repeat group
    pub fn render_repeat(&self, submission: &Submission, group: FieldId) -> Result<Vec<Line>> {
        let date = submission.submission_date_utc();
        let mut lines = Vec::new();

        for instance in submission.repeat_instances(&self.schema, group) {
            let ctx = self.context(Some(submission), Some(group), &instance.key);
            let columns = self
                .mappers
                .map_children(&ctx, group, Some(instance.element))?;

            let mut cells: Vec<String> = visible(columns)
                .map(|c| encode_value(c.value.as_deref(), allow_empty_in_repeat(&c)))
                .collect();
            let trailer = [
                Column::new(PARENT_KEY_COLUMN, Some(instance.parent_key.clone()), ValueKind::Text),
                Column::new(KEY_COLUMN, Some(instance.key.clone()), ValueKind::Text),
                Column::new(
                    set_of_column_name(&self.schema, &self.options, group),
                    Some(set_of_value(&self.schema, &instance.parent_key, group)),
                    ValueKind::Group,
                ),
            ];
            cells.extend(
                trailer
                    .iter()
                    .map(|c| encode_value(c.value.as_deref(), allow_empty_in_repeat(c))),
            );

            lines.push(Line::new(submission.instance_id.as_str(), date, cells.join(",")));
        }

        Ok(lines)
    }

    /// Renders a submission into one tagged line set per destination file
    ///
    /// Every repeat group gets a set, even when the submission has no
    /// instances of it.
    pub fn render_submission(&self, submission: &Submission) -> Result<HashMap<String, LineSet>> {
        let mut sets = HashMap::new();
        sets.insert(
            self.main_fqn(),
            LineSet::of(self.main_fqn(), vec![self.render_main(submission)?]),
        );
        for group in self.schema.repeat_groups() {
            let fqn = self.schema.fqn(group);
            let lines = self.render_repeat(submission, group)?;
            sets.insert(fqn.clone(), LineSet::of(fqn, lines));
        }
        Ok(sets)
    }
}

fn visible(columns: Vec<Column>) -> impl Iterator<Item = Column> {
    columns.into_iter().filter(Column::is_visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{FormId, InstanceId};
    use crate::domain::{FieldSpec, SubmissionElement, ValidationStatus};
    use chrono::DateTime;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn renderer(encrypted: bool) -> (RowRenderer, FieldId) {
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        schema.add_field(root, FieldSpec::new("name", ValueKind::Text));
        schema.add_field(root, FieldSpec::new("born", ValueKind::Date));
        let people = schema.add_field(root, FieldSpec::repeat("people"));
        schema.add_field(people, FieldSpec::new("age", ValueKind::Integer));

        let mut options = ExportOptions::new(FormId::from_str("f").unwrap(), "Form", "/tmp/unused");
        options.encrypted = encrypted;
        (RowRenderer::new(Arc::new(schema), Arc::new(options), None), people)
    }

    fn submission() -> Submission {
        let root = SubmissionElement::new("data")
            .with_child(SubmissionElement::leaf("name", "Ana, Jr."))
            .with_child(SubmissionElement::new("people").with_child(SubmissionElement::leaf("age", "30")))
            .with_child(SubmissionElement::new("people").with_child(SubmissionElement::new("age")));
        Submission {
            instance_id: InstanceId::from_str("uuid:1").unwrap(),
            submission_date: DateTime::parse_from_rfc3339("2018-01-05T23:30:00-03:00").ok(),
            root,
            working_dir: PathBuf::from("."),
            source_file: PathBuf::from("submission.xml"),
            validation_status: Some(ValidationStatus::Valid),
        }
    }

    #[test]
    fn test_headers() {
        let (renderer, people) = renderer(false);
        assert_eq!(
            renderer.main_header().unwrap(),
            "SubmissionDate,name,born,SET-OF-people,KEY"
        );
        assert_eq!(
            renderer.repeat_header(people).unwrap(),
            "age,PARENT_KEY,KEY,SET-OF-people"
        );
    }

    #[test]
    fn test_encrypted_header_has_validation_column() {
        let (renderer, _) = renderer(true);
        assert!(renderer.main_header().unwrap().ends_with(",KEY,isValidated"));
    }

    #[test]
    fn test_render_main() {
        let (renderer, _) = renderer(true);
        let line = renderer.render_main(&submission()).unwrap();
        assert_eq!(
            line.text,
            "\"Jan 6, 2018 2:30:00 AM\",\"Ana, Jr.\",,uuid:1/people,uuid:1,true"
        );
    }

    #[test]
    fn test_render_repeat() {
        let (renderer, people) = renderer(false);
        let lines = renderer.render_repeat(&submission(), people).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "30,uuid:1,uuid:1/people[1],uuid:1/people");
        // repeat rows quote empty values
        assert_eq!(lines[1].text, "\"\",uuid:1,uuid:1/people[2],uuid:1/people");
    }

    #[test]
    fn test_render_submission_tags_every_destination() {
        let (renderer, _) = renderer(false);
        let sets = renderer.render_submission(&submission()).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets["data"].len(), 1);
        assert_eq!(sets["people"].len(), 2);
        assert_eq!(sets["people"].fqn(), Some("people"));
    }
}
