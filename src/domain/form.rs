//! Form definition files
//!
//! A form definition is a small TOML or JSON document describing the field
//! tree of a form. It is converted into the [`FormSchema`] arena used by the
//! renderer.
//!
//! ```toml
//! name = "data"
//!
//! [[fields]]
//! name = "respondent"
//! kind = "text"
//!
//! [[fields]]
//! name = "people"
//! kind = "group"
//! repeatable = true
//!
//! [[fields.fields]]
//! name = "age"
//! kind = "integer"
//! ```

use super::errors::FormcastError;
use super::result::Result;
use super::schema::{ChoiceOption, FieldId, FieldSpec, FormSchema, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Field kinds accepted in definition files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
    Time,
    #[serde(alias = "dateTime")]
    Datetime,
    Geopoint,
    Geotrace,
    Geoshape,
    Binary,
    Audit,
    SelectOne,
    SelectMultiple,
    Group,
    #[serde(other)]
    Other,
}

/// A field in a definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub choices: Vec<ChoiceOption>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Root of a definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Root element name of the submissions
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl FormDefinition {
    /// Loads a definition from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FormcastError::Schema(format!(
                "Failed to read form definition {}: {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&contents)?),
            _ => Ok(toml::from_str(&contents)?),
        }
    }

    /// Builds the schema arena
    ///
    /// # Errors
    ///
    /// Returns [`FormcastError::Schema`] for empty or duplicated sibling
    /// names, choices on non-select fields, and children or `repeatable` on
    /// non-group fields.
    pub fn into_schema(self) -> Result<FormSchema> {
        if self.name.trim().is_empty() {
            return Err(FormcastError::Schema("form name cannot be empty".to_string()));
        }
        let mut schema = FormSchema::new(self.name);
        let root = schema.root();
        add_fields(&mut schema, root, self.fields)?;
        Ok(schema)
    }
}

fn add_fields(schema: &mut FormSchema, parent: FieldId, fields: Vec<FieldDefinition>) -> Result<()> {
    let mut seen = HashSet::new();
    for definition in fields {
        if definition.name.trim().is_empty() {
            return Err(FormcastError::Schema(format!(
                "field under {} has an empty name",
                schema.fqn(parent)
            )));
        }
        if !seen.insert(definition.name.clone()) {
            return Err(FormcastError::Schema(format!(
                "duplicate field {} under {}",
                definition.name,
                schema.fqn(parent)
            )));
        }

        let (kind, multiple) = match definition.kind {
            FieldKind::Text => (ValueKind::Text, false),
            FieldKind::Integer => (ValueKind::Integer, false),
            FieldKind::Decimal => (ValueKind::Decimal, false),
            FieldKind::Boolean => (ValueKind::Boolean, false),
            FieldKind::Date => (ValueKind::Date, false),
            FieldKind::Time => (ValueKind::Time, false),
            FieldKind::Datetime => (ValueKind::DateTime, false),
            FieldKind::Geopoint => (ValueKind::Geopoint, false),
            FieldKind::Geotrace => (ValueKind::Geotrace, false),
            FieldKind::Geoshape => (ValueKind::Geoshape, false),
            FieldKind::Binary => (ValueKind::Binary, false),
            FieldKind::Audit => (ValueKind::Audit, false),
            FieldKind::SelectOne => (ValueKind::Choice, false),
            FieldKind::SelectMultiple => (ValueKind::Choice, true),
            FieldKind::Group => (ValueKind::Group, false),
            FieldKind::Other => (ValueKind::Other, false),
        };

        if kind != ValueKind::Choice && !definition.choices.is_empty() {
            return Err(FormcastError::Schema(format!(
                "field {} declares choices but is not a select",
                definition.name
            )));
        }
        if kind != ValueKind::Group && definition.repeatable {
            return Err(FormcastError::Schema(format!(
                "field {} is repeatable but is not a group",
                definition.name
            )));
        }
        if kind != ValueKind::Group && !definition.fields.is_empty() {
            return Err(FormcastError::Schema(format!(
                "field {} declares children but is not a group",
                definition.name
            )));
        }

        let spec = FieldSpec {
            name: definition.name,
            kind,
            repeatable: definition.repeatable,
            multiple_choice: multiple,
            choices: definition.choices,
        };
        let id = schema.add_field(parent, spec);
        add_fields(schema, id, definition.fields)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"
name = "data"

[[fields]]
name = "respondent"
kind = "text"

[[fields]]
name = "fruits"
kind = "select_multiple"
choices = [{ value = "apple" }, { value = "pear", label = "Pear" }]

[[fields]]
name = "people"
kind = "group"
repeatable = true

[[fields.fields]]
name = "age"
kind = "integer"

[[fields]]
name = "signature"
kind = "rank"
"#;

    #[test]
    fn test_definition_into_schema() {
        let definition: FormDefinition = toml::from_str(DEFINITION).unwrap();
        let schema = definition.into_schema().unwrap();

        assert_eq!(schema.root_name(), "data");
        let fruits = schema.find("fruits").unwrap();
        assert!(schema.field(fruits).is_multiple_choice_list());
        let people = schema.find("people").unwrap();
        assert!(schema.field(people).repeatable);
        assert!(schema.find("people-age").is_some());
        let other = schema.find("signature").unwrap();
        assert_eq!(schema.field(other).kind, ValueKind::Other);
    }

    #[test]
    fn test_duplicate_sibling_rejected() {
        let definition = FormDefinition {
            name: "data".to_string(),
            fields: vec![
                FieldDefinition {
                    name: "a".to_string(),
                    kind: FieldKind::Text,
                    repeatable: false,
                    choices: vec![],
                    fields: vec![],
                },
                FieldDefinition {
                    name: "a".to_string(),
                    kind: FieldKind::Integer,
                    repeatable: false,
                    choices: vec![],
                    fields: vec![],
                },
            ],
        };
        assert!(matches!(
            definition.into_schema(),
            Err(FormcastError::Schema(_))
        ));
    }

    #[test]
    fn test_children_on_leaf_rejected() {
        let json = r#"{"name":"data","fields":[{"name":"a","kind":"text","fields":[{"name":"b","kind":"text"}]}]}"#;
        let definition: FormDefinition = serde_json::from_str(json).unwrap();
        assert!(definition.into_schema().is_err());
    }

    #[test]
    fn test_repeatable_leaf_rejected() {
        let definition: FormDefinition = toml::from_str(
            r#"
name = "data"

[[fields]]
name = "tag"
kind = "text"
repeatable = true
"#,
        )
        .unwrap();
        match definition.into_schema() {
            Err(FormcastError::Schema(message)) => assert!(message.contains("tag")),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{"name":"data","fields":[{"name":"when","kind":"dateTime"}]}"#)
            .unwrap();
        let schema = FormDefinition::load(&path).unwrap().into_schema().unwrap();
        let when = schema.find("when").unwrap();
        assert_eq!(schema.field(when).kind, ValueKind::DateTime);
    }
}
