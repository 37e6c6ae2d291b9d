//! XML submission parser
//!
//! Reads a submission document into a [`SubmissionElement`] tree with
//! `quick-xml`. Element names are taken without namespace prefixes.

use crate::adapters::traits::{SubmissionFile, SubmissionParser};
use crate::config::SecretString;
use crate::core::csv::format::parse_datetime;
use crate::domain::ids::InstanceId;
use crate::domain::{Submission, SubmissionElement, SubmissionError};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// Root attribute holding the server-side submission date
pub const SUBMISSION_DATE_ATTRIBUTE: &str = "submissionDate";
const INSTANCE_ID_ATTRIBUTE: &str = "instanceID";

/// Parser for plain (unencrypted) XML submissions
#[derive(Debug, Clone, Default)]
pub struct XmlSubmissionParser;

impl XmlSubmissionParser {
    pub fn new() -> Self {
        Self
    }
}

impl SubmissionParser for XmlSubmissionParser {
    fn parse(
        &self,
        file: &SubmissionFile,
        encrypted: bool,
        _private_key: Option<&SecretString>,
    ) -> Result<Submission, SubmissionError> {
        let display = file.path.display().to_string();
        if encrypted {
            return Err(SubmissionError::Decryption {
                file: display,
                reason: "encrypted submissions need a decrypting parser".to_string(),
            });
        }

        let xml = std::fs::read_to_string(&file.path)
            .map_err(|e| SubmissionError::parse(&display, e.to_string()))?;
        let document = parse_document(&xml).map_err(|reason| SubmissionError::parse(&display, reason))?;

        let instance_id = document
            .root
            .child("meta")
            .and_then(|meta| meta.child("instanceID"))
            .map(|e| e.text().to_string())
            .filter(|id| !id.is_empty())
            .or_else(|| document.root_attributes.get(INSTANCE_ID_ATTRIBUTE).cloned())
            .and_then(|id| InstanceId::new(id).ok())
            .ok_or_else(|| SubmissionError::MissingInstanceId {
                file: display.clone(),
            })?;

        let submission_date = document
            .root_attributes
            .get(SUBMISSION_DATE_ATTRIBUTE)
            .and_then(|raw| parse_datetime(raw));

        Ok(Submission {
            instance_id,
            submission_date,
            root: document.root,
            working_dir: file.working_dir.clone(),
            source_file: file.path.clone(),
            validation_status: None,
        })
    }
}

/// A parsed document
#[derive(Debug)]
pub struct Document {
    pub root: SubmissionElement,
    pub root_attributes: HashMap<String, String>,
}

/// Parses a complete document
pub fn parse_document(xml: &str) -> Result<Document, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<SubmissionElement> = Vec::new();
    let mut root_attributes = None;
    let mut root = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) => {
                if root_attributes.is_none() {
                    root_attributes = Some(attributes(&reader, &start)?);
                }
                stack.push(SubmissionElement::new(local_name(&start)?));
            }
            Event::Empty(start) => {
                if root_attributes.is_none() {
                    root_attributes = Some(attributes(&reader, &start)?);
                }
                let element = SubmissionElement::new(local_name(&start)?);
                match stack.last_mut() {
                    Some(parent) => parent.push_child(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack.pop().ok_or("unbalanced closing tag")?;
                match stack.last_mut() {
                    Some(parent) => parent.push_child(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&text.decode().map_err(|e| e.to_string())?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&data.decode().map_err(|e| e.to_string())?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = stack.last_mut() {
                    if let Some(ch) = reference.resolve_char_ref().map_err(|e| e.to_string())? {
                        current.push_text(ch.encode_utf8(&mut [0; 4]));
                    } else {
                        let name = reference.decode().map_err(|e| e.to_string())?;
                        let resolved = resolve_predefined_entity(&name)
                            .ok_or_else(|| format!("unknown entity &{name};"))?;
                        current.push_text(resolved);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("unexpected end of document".to_string());
    }
    let root = root.ok_or("document has no root element")?;
    Ok(Document {
        root,
        root_attributes: root_attributes.unwrap_or_default(),
    })
}

/// Reads one attribute of the root element without parsing the whole document
pub fn read_root_attribute(xml: &str, name: &str) -> Result<Option<String>, String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) | Event::Empty(start) => {
                return Ok(attributes(&reader, &start)?.remove(name));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn local_name(start: &BytesStart<'_>) -> Result<String, String> {
    std::str::from_utf8(start.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

fn attributes(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<HashMap<String, String>, String> {
    let mut out = HashMap::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attribute.key.local_name().as_ref())
            .map_err(|e| e.to_string())?
            .to_string();
        let value = attribute
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| e.to_string())?;
        out.insert(key, value.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SUBMISSION: &str = r#"<?xml version="1.0"?>
<data id="household" submissionDate="2018-01-05T23:30:00.000-03:00">
  <name>Ana &amp; Bo</name>
  <people><age>30</age></people>
  <people><age/></people>
  <meta><instanceID>uuid:1</instanceID></meta>
</data>"#;

    fn file(dir: &std::path::Path, xml: &str) -> SubmissionFile {
        let path = dir.join("submission.xml");
        std::fs::write(&path, xml).unwrap();
        SubmissionFile {
            path,
            working_dir: dir.to_path_buf(),
            submission_date: None,
        }
    }

    #[test]
    fn test_parse_document_tree() {
        let document = parse_document(SUBMISSION).unwrap();
        assert_eq!(document.root.name(), "data");
        assert_eq!(document.root.child("name").unwrap().text(), "Ana & Bo");
        assert_eq!(document.root.children_named("people").count(), 2);
        let second = document.root.children_named("people").nth(1).unwrap();
        assert_eq!(second.child("age").map(|e| e.text()), Some(""));
        assert_eq!(document.root_attributes["id"], "household");
    }

    #[test]
    fn test_parse_submission() {
        let dir = tempfile::TempDir::new().unwrap();
        let submission = XmlSubmissionParser::new()
            .parse(&file(dir.path(), SUBMISSION), false, None)
            .unwrap();
        assert_eq!(submission.instance_id.as_str(), "uuid:1");
        assert!(submission.submission_date.is_some());
        assert_eq!(submission.working_dir, PathBuf::from(dir.path()));
    }

    #[test]
    fn test_instance_id_from_root_attribute() {
        let dir = tempfile::TempDir::new().unwrap();
        let xml = r#"<data instanceID="uuid:attr"><name>x</name></data>"#;
        let submission = XmlSubmissionParser::new()
            .parse(&file(dir.path(), xml), false, None)
            .unwrap();
        assert_eq!(submission.instance_id.as_str(), "uuid:attr");
        assert!(submission.submission_date.is_none());
    }

    #[test]
    fn test_missing_instance_id() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = XmlSubmissionParser::new()
            .parse(&file(dir.path(), "<data><name>x</name></data>"), false, None)
            .unwrap_err();
        assert!(matches!(err, SubmissionError::MissingInstanceId { .. }));
    }

    #[test]
    fn test_malformed_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = XmlSubmissionParser::new()
            .parse(&file(dir.path(), "<data><name>x</data>"), false, None)
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Parse { .. }));
    }

    #[test]
    fn test_encrypted_form_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = XmlSubmissionParser::new()
            .parse(&file(dir.path(), SUBMISSION), true, None)
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Decryption { .. }));
    }

    #[test]
    fn test_read_root_attribute() {
        assert_eq!(
            read_root_attribute(SUBMISSION, SUBMISSION_DATE_ATTRIBUTE).unwrap(),
            Some("2018-01-05T23:30:00.000-03:00".to_string())
        );
        assert_eq!(read_root_attribute("<data/>", "x").unwrap(), None);
    }
}
