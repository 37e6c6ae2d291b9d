//! CSV value encoding
//!
//! Every output column is encoded individually. Whether an absent or empty
//! value becomes a truly empty field or a quoted empty string (`""`) depends
//! on the column, see [`allow_empty_in_main`] and [`allow_empty_in_repeat`].

use super::mapper::Column;
use crate::domain::ValueKind;

/// Encodes a single value
///
/// Absent and empty values encode as `""` unless `allow_empty` is set, in
/// which case the field is left empty. Values containing a newline, a double
/// quote or a comma are quoted with embedded quotes doubled.
pub fn encode_value(value: Option<&str>, allow_empty: bool) -> String {
    match value {
        None | Some("") => {
            if allow_empty {
                String::new()
            } else {
                "\"\"".to_string()
            }
        }
        Some(text) if needs_quoting(text) => format!("\"{}\"", text.replace('"', "\"\"")),
        Some(text) => text.to_string(),
    }
}

fn needs_quoting(text: &str) -> bool {
    text.contains(['\n', '"', ','])
}

/// Empty-value policy for columns of the main file
pub fn allow_empty_in_main(column: &Column) -> bool {
    matches!(
        column.kind,
        ValueKind::Date | ValueKind::Time | ValueKind::DateTime | ValueKind::Geopoint
    ) || column.name.starts_with("meta")
}

/// Empty-value policy for columns of repeat group files
///
/// Unlike main rows, the field kind plays no part here.
pub fn allow_empty_in_repeat(column: &Column) -> bool {
    column.name.starts_with("meta") || column.name.starts_with("SET-OF")
}

/// Encodes a header line from column names
pub fn encode_header<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(|name| encode_value(Some(name), true))
        .collect::<Vec<_>>()
        .join(",")
}
