//! Field mapper dispatch
//!
//! Each schema field maps to zero or more CSV [`Column`]s. The mapper for a
//! field is picked once per schema from its [`ValueKind`] and stored in a
//! [`MapperTable`]; rendering then runs the table over the submission tree.
//!
//! Mappers are also run without a submission to produce header names, so
//! column naming lives in exactly one place.
//!
//! When a field's element is absent every mapper still emits its fixed set of
//! columns with absent values, which keeps rows aligned with the header.

use super::audit::{copy_individual_audit, AuditAppender};
use super::format::{format_date, format_datetime, format_time};
use super::media::resolve_media;
use crate::core::export::ExportOptions;
use crate::domain::{FieldId, FormSchema, Result, Submission, SubmissionElement, ValueKind};

/// Suffixes of the four geopoint columns, in value order
pub const GEOPOINT_SUFFIXES: [&str; 4] = ["Latitude", "Longitude", "Altitude", "Accuracy"];

/// Prefix of repeat group back-reference columns
pub const SET_OF_PREFIX: &str = "SET-OF-";

/// Whether a column ends up in the rendered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Written to the CSV row
    Visible,
    /// Produced for its side effect only; dropped before encoding
    Aggregated,
}

/// One (name, value) pair of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// `None` when the element is absent, distinct from an empty value
    pub value: Option<String>,
    /// Kind of the field the column came from
    pub kind: ValueKind,
    pub visibility: Visibility,
}

impl Column {
    /// A visible column
    pub fn new(name: impl Into<String>, value: Option<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            value,
            kind,
            visibility: Visibility::Visible,
        }
    }

    /// A visible column with an absent value
    pub fn absent(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::new(name, None, kind)
    }

    /// Marks the column as side-effect only
    pub fn aggregated(mut self) -> Self {
        self.visibility = Visibility::Aggregated;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }
}

/// Everything a mapper may look at while mapping one field
pub struct MapContext<'a> {
    pub schema: &'a FormSchema,
    pub options: &'a ExportOptions,
    pub mappers: &'a MapperTable,
    /// `None` while generating headers
    pub submission: Option<&'a Submission>,
    /// Repeat group the row belongs to, `None` for the main row
    pub row_base: Option<FieldId>,
    /// KEY of the row being rendered
    pub row_key: &'a str,
    /// Aggregated audit writer, when the form collects audit trails
    pub audit: Option<&'a AuditAppender>,
}

impl MapContext<'_> {
    /// Column name of a field in the current row
    pub fn column_name(&self, field: FieldId) -> String {
        column_name(self.schema, self.options, self.row_base, field)
    }
}

/// Column name of `field` in a row rooted at `row_base`
pub fn column_name(
    schema: &FormSchema,
    options: &ExportOptions,
    row_base: Option<FieldId>,
    field: FieldId,
) -> String {
    if options.remove_group_names {
        schema.field(field).name.clone()
    } else {
        schema.relative_fqn(field, row_base)
    }
}

/// Name of the back-reference column of a repeat group
pub fn set_of_column_name(schema: &FormSchema, options: &ExportOptions, group: FieldId) -> String {
    format!(
        "{}{}",
        SET_OF_PREFIX,
        column_name(schema, options, schema.nearest_repeat_ancestor(group), group)
    )
}

/// Value of the back-reference column of a repeat group
///
/// `parent_key` is the KEY of the row that owns the group instances.
pub fn set_of_value(schema: &FormSchema, parent_key: &str, group: FieldId) -> String {
    format!(
        "{}/{}",
        parent_key,
        schema.relative_fqn(group, schema.nearest_repeat_ancestor(group))
    )
}

/// A mapper turns one field and its (possibly absent) element into columns
pub type FieldMapper = fn(&MapContext<'_>, FieldId, Option<&SubmissionElement>) -> Result<Vec<Column>>;

/// Mappers resolved for every field of a schema
#[derive(Clone)]
pub struct MapperTable {
    mappers: Vec<FieldMapper>,
    expand_choices: bool,
}

impl MapperTable {
    /// Resolves the mapper of every field
    pub fn resolve(schema: &FormSchema, options: &ExportOptions) -> Self {
        let mut mappers = vec![text_mapper as FieldMapper; schema.len()];
        for id in schema.depth_first() {
            mappers[id.index()] = mapper_for(schema.field(id).kind);
        }
        Self {
            mappers,
            expand_choices: options.split_select_multiples,
        }
    }

    /// Maps a field, appending choice indicator columns where enabled
    pub fn map(
        &self,
        ctx: &MapContext<'_>,
        field: FieldId,
        element: Option<&SubmissionElement>,
    ) -> Result<Vec<Column>> {
        let mut columns = (self.mappers[field.index()])(ctx, field, element)?;
        if self.expand_choices && ctx.schema.field(field).is_multiple_choice_list() {
            columns.extend(choice_columns(ctx, field, element));
        }
        Ok(columns)
    }

    /// Maps every child of `field`, looking each up under `element`
    pub fn map_children(
        &self,
        ctx: &MapContext<'_>,
        field: FieldId,
        element: Option<&SubmissionElement>,
    ) -> Result<Vec<Column>> {
        let mut columns = Vec::new();
        for child in ctx.schema.field(field).children() {
            let name = &ctx.schema.field(*child).name;
            let child_element = element.and_then(|e| e.child(name));
            columns.extend(self.map(ctx, *child, child_element)?);
        }
        Ok(columns)
    }
}

impl std::fmt::Debug for MapperTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperTable")
            .field("fields", &self.mappers.len())
            .field("expand_choices", &self.expand_choices)
            .finish()
    }
}

fn mapper_for(kind: ValueKind) -> FieldMapper {
    match kind {
        ValueKind::Date => date_mapper,
        ValueKind::Time => time_mapper,
        ValueKind::DateTime => datetime_mapper,
        ValueKind::Geopoint => geopoint_mapper,
        ValueKind::Binary => binary_mapper,
        ValueKind::Audit => audit_mapper,
        ValueKind::Group => group_mapper,
        _ => text_mapper,
    }
}

fn text_mapper(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Result<Vec<Column>> {
    Ok(vec![Column::new(
        ctx.column_name(field),
        element.map(|e| e.text().to_string()),
        ctx.schema.field(field).kind,
    )])
}

fn formatted(element: Option<&SubmissionElement>, format: fn(&str) -> String) -> Option<String> {
    element.map(|e| match e.text() {
        "" => String::new(),
        text => format(text),
    })
}

fn date_mapper(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Result<Vec<Column>> {
    Ok(vec![Column::new(
        ctx.column_name(field),
        formatted(element, format_date),
        ValueKind::Date,
    )])
}

fn time_mapper(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Result<Vec<Column>> {
    Ok(vec![Column::new(
        ctx.column_name(field),
        formatted(element, format_time),
        ValueKind::Time,
    )])
}

fn datetime_mapper(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Result<Vec<Column>> {
    Ok(vec![Column::new(
        ctx.column_name(field),
        formatted(element, format_datetime),
        ValueKind::DateTime,
    )])
}

fn geopoint_mapper(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Result<Vec<Column>> {
    let name = ctx.column_name(field);
    let tokens: Vec<&str> = element
        .map(|e| e.text().split_whitespace().take(GEOPOINT_SUFFIXES.len()).collect())
        .unwrap_or_default();

    Ok(GEOPOINT_SUFFIXES
        .iter()
        .enumerate()
        .map(|(i, suffix)| {
            Column::new(
                format!("{name}-{suffix}"),
                tokens.get(i).map(|t| t.to_string()),
                ValueKind::Geopoint,
            )
        })
        .collect())
}

fn binary_mapper(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Result<Vec<Column>> {
    let name = ctx.column_name(field);
    let (Some(element), Some(submission)) = (element, ctx.submission) else {
        return Ok(vec![Column::absent(name, ValueKind::Binary)]);
    };

    let reference = element.text();
    let value = if reference.is_empty() || !ctx.options.include_media {
        reference.to_string()
    } else {
        resolve_media(&submission.working_dir, &ctx.options.media_dir(), reference)?
    };
    Ok(vec![Column::new(name, Some(value), ValueKind::Binary)])
}

/// Individual copy plus aggregated append; only the first column is visible
fn audit_mapper(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Result<Vec<Column>> {
    let name = ctx.column_name(field);
    let individual = individual_audit_mapper(ctx, &name, element)?;
    let aggregated = aggregated_audit_mapper(ctx, &name, element)?;
    Ok(vec![individual, aggregated])
}

fn individual_audit_mapper(
    ctx: &MapContext<'_>,
    name: &str,
    element: Option<&SubmissionElement>,
) -> Result<Column> {
    let (Some(element), Some(submission)) = (element, ctx.submission) else {
        return Ok(Column::absent(name, ValueKind::Audit));
    };

    let reference = element.text();
    let value = if reference.is_empty() || !ctx.options.include_media {
        reference.to_string()
    } else {
        copy_individual_audit(
            &submission.working_dir,
            &ctx.options.media_dir(),
            reference,
            &submission.instance_id,
        )?
    };
    Ok(Column::new(name, Some(value), ValueKind::Audit))
}

fn aggregated_audit_mapper(
    ctx: &MapContext<'_>,
    name: &str,
    element: Option<&SubmissionElement>,
) -> Result<Column> {
    if let (Some(element), Some(submission), Some(audit)) = (element, ctx.submission, ctx.audit) {
        if !element.text().is_empty() {
            audit.append(
                &submission.instance_id,
                &submission.working_dir.join(element.text()),
            )?;
        }
    }
    Ok(Column::absent(name, ValueKind::Audit).aggregated())
}

fn group_mapper(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Result<Vec<Column>> {
    let schema_field = ctx.schema.field(field);

    if schema_field.repeatable {
        let value = element.map(|_| set_of_value(ctx.schema, ctx.row_key, field));
        return Ok(vec![Column::new(
            set_of_column_name(ctx.schema, ctx.options, field),
            value,
            ValueKind::Group,
        )]);
    }

    if schema_field.children().is_empty() && !ctx.schema.is_root(field) {
        return text_mapper(ctx, field, element);
    }

    ctx.mappers.map_children(ctx, field, element)
}

fn choice_columns(
    ctx: &MapContext<'_>,
    field: FieldId,
    element: Option<&SubmissionElement>,
) -> Vec<Column> {
    let name = ctx.column_name(field);
    let selected: Option<Vec<&str>> = element.map(|e| e.text().split_whitespace().collect());

    ctx.schema
        .field(field)
        .choices
        .iter()
        .map(|choice| {
            let value = selected.as_ref().map(|values| {
                if values.contains(&choice.value.as_str()) {
                    "1".to_string()
                } else {
                    "0".to_string()
                }
            });
            Column::new(format!("{}/{}", name, choice.value), value, ValueKind::Choice)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{FormId, InstanceId};
    use crate::domain::FieldSpec;
    use std::path::{Path, PathBuf};
    use std::str::FromStr;

    fn options(dir: &Path) -> ExportOptions {
        ExportOptions::new(FormId::from_str("f").unwrap(), "Form", dir)
    }

    fn submission(root: SubmissionElement, working_dir: PathBuf) -> Submission {
        Submission {
            instance_id: InstanceId::from_str("uuid:1").unwrap(),
            submission_date: None,
            root,
            working_dir,
            source_file: PathBuf::from("submission.xml"),
            validation_status: None,
        }
    }

    fn map_all(
        schema: &FormSchema,
        options: &ExportOptions,
        submission: Option<&Submission>,
    ) -> Vec<Column> {
        let mappers = MapperTable::resolve(schema, options);
        let ctx = MapContext {
            schema,
            options,
            mappers: &mappers,
            submission,
            row_base: None,
            row_key: "uuid:1",
            audit: None,
        };
        let element = submission.map(|s| &s.root);
        mappers.map(&ctx, schema.root(), element).unwrap()
    }

    #[test]
    fn test_absent_elements_keep_width() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        schema.add_field(root, FieldSpec::new("where", ValueKind::Geopoint));
        schema.add_field(root, FieldSpec::new("name", ValueKind::Text));

        let sub = submission(SubmissionElement::new("data"), dir.path().to_path_buf());
        let columns = map_all(&schema, &options(dir.path()), Some(&sub));
        assert_eq!(columns.len(), 5);
        assert!(columns.iter().all(|c| c.value.is_none()));
        assert_eq!(columns[0].name, "where-Latitude");
        assert_eq!(columns[3].name, "where-Accuracy");
    }

    #[test]
    fn test_geopoint_partial_decode() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        schema.add_field(root, FieldSpec::new("where", ValueKind::Geopoint));
        let sub = submission(
            SubmissionElement::new("data").with_child(SubmissionElement::leaf("where", "1.5 2.5")),
            dir.path().to_path_buf(),
        );
        let columns = map_all(&schema, &options(dir.path()), Some(&sub));
        let values: Vec<_> = columns.iter().map(|c| c.value.as_deref()).collect();
        assert_eq!(values, vec![Some("1.5"), Some("2.5"), None, None]);
    }

    #[test]
    fn test_nested_group_flattens_and_repeat_references() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        let household = schema.add_field(root, FieldSpec::group("household"));
        schema.add_field(household, FieldSpec::new("size", ValueKind::Integer));
        let members = schema.add_field(household, FieldSpec::repeat("members"));
        schema.add_field(members, FieldSpec::new("age", ValueKind::Integer));

        let sub = submission(
            SubmissionElement::new("data").with_child(
                SubmissionElement::new("household")
                    .with_child(SubmissionElement::leaf("size", "2"))
                    .with_child(SubmissionElement::new("members")),
            ),
            dir.path().to_path_buf(),
        );
        let columns = map_all(&schema, &options(dir.path()), Some(&sub));
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "household-size");
        assert_eq!(columns[1].name, "SET-OF-household-members");
        assert_eq!(columns[1].value.as_deref(), Some("uuid:1/household-members"));
    }

    #[test]
    fn test_remove_group_names() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        let group = schema.add_field(root, FieldSpec::group("g"));
        schema.add_field(group, FieldSpec::new("when", ValueKind::Date));
        let mut options = options(dir.path());
        options.remove_group_names = true;

        let columns = map_all(&schema, &options, None);
        assert_eq!(columns[0].name, "when");
    }

    #[test]
    fn test_choice_expansion() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        schema.add_field(root, FieldSpec::choice("fruits", true, ["apple", "pear", "fig"]));
        let mut options = options(dir.path());
        options.split_select_multiples = true;

        let sub = submission(
            SubmissionElement::new("data").with_child(SubmissionElement::leaf("fruits", "fig apple")),
            dir.path().to_path_buf(),
        );
        let columns = map_all(&schema, &options, Some(&sub));
        let pairs: Vec<_> = columns
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("fruits", Some("fig apple")),
                ("fruits/apple", Some("1")),
                ("fruits/pear", Some("0")),
                ("fruits/fig", Some("1")),
            ]
        );
    }

    #[test]
    fn test_choice_expansion_disabled() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        schema.add_field(root, FieldSpec::choice("fruits", true, ["apple"]));
        let columns = map_all(&schema, &options(dir.path()), None);
        assert_eq!(columns.len(), 1);
    }

    #[test]
    fn test_binary_without_media_keeps_reference() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        schema.add_field(root, FieldSpec::new("photo", ValueKind::Binary));
        let mut options = options(dir.path());
        options.include_media = false;

        let sub = submission(
            SubmissionElement::new("data").with_child(SubmissionElement::leaf("photo", "a.jpg")),
            dir.path().to_path_buf(),
        );
        let columns = map_all(&schema, &options, Some(&sub));
        assert_eq!(columns[0].value.as_deref(), Some("a.jpg"));
        assert!(!options.media_dir().exists());
    }

    #[test]
    fn test_audit_columns_are_tagged() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut schema = FormSchema::new("data");
        let root = schema.root();
        let meta = schema.add_field(root, FieldSpec::group("meta"));
        schema.add_field(meta, FieldSpec::new("audit", ValueKind::Audit));

        let columns = map_all(&schema, &options(dir.path()), None);
        assert_eq!(columns.len(), 2);
        assert!(columns[0].is_visible());
        assert!(!columns[1].is_visible());
        assert_eq!(columns[0].name, "meta-audit");
    }
}
