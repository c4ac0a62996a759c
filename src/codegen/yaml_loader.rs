//! YAML document loader.
//!
//! Reads schema and forms documents from disk into a generic YAML tree and
//! converts that tree into the typed AST from [`crate::codegen::types`].
//! Shape errors are reported here, before any other stage sees the document.

use crate::codegen::type_mapper::PrimitiveType;
use crate::codegen::types::{
    FormsDocument, ModelDefinition, SchemaDocument, SchemaEntry, MODEL_KIND,
};
use crate::error::{MapperError, Result};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a document into a generic YAML tree.
///
/// An empty file yields `Value::Null`. A missing file is `SchemaFileMissing`.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MapperError::SchemaFileMissing {
            path: path.to_path_buf(),
        },
        _ => MapperError::io(path, e),
    })?;

    parse_document(path, &content)
}

/// Parse document text that has already been read
pub fn parse_document(path: &Path, content: &str) -> Result<Value> {
    serde_yaml::from_str(content)
        .map_err(|e| MapperError::malformed(path, format!("invalid YAML: {}", e)))
}

/// Load and convert a schema document
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<SchemaDocument> {
    let path = path.as_ref();
    let value = load_document(path)?;
    schema_from_value(path, value)
}

/// Load and convert a forms document
pub fn load_forms<P: AsRef<Path>>(path: P) -> Result<FormsDocument> {
    let path = path.as_ref();
    let value = load_document(path)?;
    forms_from_value(path, value)
}

/// Convert a YAML tree into a schema document.
///
/// `path` is only used for error messages.
pub fn schema_from_value(path: &Path, value: Value) -> Result<SchemaDocument> {
    let mapping = match value {
        Value::Null => return Ok(SchemaDocument::default()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(MapperError::malformed(
                path,
                format!("expected a mapping of model names, found {}", describe(&other)),
            ))
        }
    };

    let mut entries = IndexMap::new();

    for (key, entry) in mapping {
        let name = match key {
            Value::String(name) => name,
            other => {
                return Err(MapperError::malformed(
                    path,
                    format!("model names must be strings, found {}", describe(&other)),
                ))
            }
        };

        check_model_name(path, &name)?;
        let entry = schema_entry(path, &name, entry)?;
        entries.insert(name, entry);
    }

    Ok(SchemaDocument { entries })
}

fn schema_entry(path: &Path, name: &str, value: Value) -> Result<SchemaEntry> {
    let mut mapping = match value {
        Value::Mapping(mapping) => mapping,
        other => {
            tracing::debug!("Entry '{}' is {}, ignoring it", name, describe(&other));
            return Ok(SchemaEntry::unknown());
        }
    };

    let kind = match mapping.remove("type") {
        Some(Value::String(kind)) => kind,
        _ => {
            tracing::debug!("Entry '{}' has no string type, ignoring it", name);
            return Ok(SchemaEntry::unknown());
        }
    };

    if kind != MODEL_KIND {
        return Ok(SchemaEntry::Other { kind });
    }

    let model: ModelDefinition = serde_yaml::from_value(Value::Mapping(mapping))
        .map_err(|e| MapperError::malformed(path, format!("model '{}': {}", name, e)))?;

    validate_model(path, name, &model)?;

    Ok(SchemaEntry::Model(model))
}

/// Reject model names that cannot be used as a single directory name.
///
/// Model names become `<kebab>/` directories under the output root, so they
/// must not contain separators or climb out of it.
fn check_model_name(path: &Path, name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.');

    if invalid {
        return Err(MapperError::malformed(
            path,
            format!("model name '{}' is not a valid directory name", name),
        ));
    }

    Ok(())
}

/// Validate a model definition's local shape
fn validate_model(path: &Path, name: &str, model: &ModelDefinition) -> Result<()> {
    for (field, mapping) in &model.mappings {
        if field.is_empty() {
            return Err(MapperError::malformed(
                path,
                format!("model '{}' has an empty field name", name),
            ));
        }

        if let Some(map) = &mapping.map {
            if map.is_empty() || map.split('.').any(str::is_empty) {
                return Err(MapperError::malformed(
                    path,
                    format!("field '{}.{}' has an invalid map path '{}'", name, field, map),
                ));
            }
        }
    }

    for (field, relationship) in &model.relationships {
        if relationship.target().is_empty() {
            return Err(MapperError::malformed(
                path,
                format!("relationship '{}.{}' has no target type", name, field),
            ));
        }
    }

    check_wire_names(path, name, model)
}

/// How a field occupies a transfer-object member
#[derive(Debug, Clone, Copy, PartialEq)]
enum WireClaim {
    Flat(PrimitiveType),
    Nested,
    Relation,
}

/// Reject fields that would declare the same transfer-object member twice.
///
/// Two flat fields may share a wire name when they agree on the type, and
/// nested fields may share their outer key.
fn check_wire_names(path: &Path, name: &str, model: &ModelDefinition) -> Result<()> {
    let mut claimed: HashMap<&str, (&str, WireClaim)> = HashMap::new();

    let mappings = model.mappings.iter().map(|(field, mapping)| {
        let source = mapping.source_path(field);
        match source.split_once('.') {
            Some((outer, _)) => (field.as_str(), outer, WireClaim::Nested),
            None => (
                field.as_str(),
                source,
                WireClaim::Flat(PrimitiveType::from_tag(&mapping.field_type)),
            ),
        }
    });
    let relations = model
        .relationships
        .keys()
        .map(|field| (field.as_str(), field.as_str(), WireClaim::Relation));

    for (field, wire, claim) in mappings.chain(relations) {
        match claimed.get(wire) {
            None => {
                claimed.insert(wire, (field, claim));
            }
            Some((_, existing)) if *existing == claim && claim != WireClaim::Relation => {}
            Some((other, _)) => {
                return Err(MapperError::malformed(
                    path,
                    format!(
                        "field '{}.{}' uses wire name '{}', which '{}.{}' already declares",
                        name, field, wire, name, other
                    ),
                ))
            }
        }
    }

    Ok(())
}

/// Convert a YAML tree into a forms document
pub fn forms_from_value(path: &Path, value: Value) -> Result<FormsDocument> {
    let forms: FormsDocument = match value {
        Value::Null => return Ok(FormsDocument::default()),
        Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|e| MapperError::malformed(path, e.to_string()))?,
        other => {
            return Err(MapperError::malformed(
                path,
                format!("expected a mapping of model names, found {}", describe(&other)),
            ))
        }
    };

    for name in forms.models.keys() {
        check_model_name(path, name)?;
    }

    Ok(forms)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
