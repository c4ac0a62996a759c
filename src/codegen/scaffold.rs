//! Document scaffolding.
//!
//! Creates the schema and forms documents with their explanatory header when
//! they do not exist yet, and re-serializes replacement documents under the
//! same header.

use crate::codegen::fs_utils;
use crate::error::{MapperError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCHEMA_FILE_NAME: &str = "schema.tw";
pub const FORMS_FILE_NAME: &str = "form.tw";

pub const SCHEMA_HEADER: &str = "\
# =============================================================================
# Schema Definition File
# =============================================================================
#
# This file defines the data models and their relationships for the application.
# Each model specifies its properties, types, mappings, and relationships with
# other models.
#
# Structure:
# - Each model is defined with its properties and relationships
# - 'type: model' indicates a model definition
# - 'mappings' define the model's properties and their types
# - 'relationships' define connections between models
#
# =============================================================================
";

pub const FORMS_HEADER: &str = "\
# =============================================================================
# Form Validation Definition File
# =============================================================================
#
# This file defines the validation rules for the forms of the application.
# Each model lists its actions (e.g. create, update), and each action lists
# the validation rules of its fields.
#
# Structure:
# - Top-level keys are model names
# - Second-level keys are action names
# - Each field declares 'type', 'required', 'nullable' and its constraints
# - 'messages' and 'i18n' attach literal or localized messages per constraint
#
# =============================================================================
";

/// Create `schema.tw` in `mappers_dir` if missing; returns its path
pub fn ensure_schema_document_exists(mappers_dir: &Path) -> Result<PathBuf> {
    ensure_document(mappers_dir, SCHEMA_FILE_NAME, SCHEMA_HEADER, "# Add your models here\n")
}

/// Create `form.tw` in `mappers_dir` if missing; returns its path
pub fn ensure_forms_document_exists(mappers_dir: &Path) -> Result<PathBuf> {
    ensure_document(mappers_dir, FORMS_FILE_NAME, FORMS_HEADER, "# Add your forms here\n")
}

fn ensure_document(
    mappers_dir: &Path,
    file_name: &str,
    header: &str,
    placeholder: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(mappers_dir).map_err(|e| MapperError::write(mappers_dir, e))?;

    let path = mappers_dir.join(file_name);
    if !path.exists() {
        tracing::info!("Creating {}", path.display());
        fs_utils::write_file(&path, format!("{}\n{}", header, placeholder))
            .map_err(|e| MapperError::write(&path, e))?;
        tracing::info!("Created {}", path.display());
    }

    Ok(path)
}

/// Serialize a document as YAML under the given header
pub fn render_with_header<T: Serialize>(header: &str, document: &T) -> Result<String> {
    let yaml = serde_yaml::to_string(document)
        .map_err(|e| MapperError::Config(format!("failed to serialize document: {}", e)))?;
    Ok(format!("{}\n{}", header, yaml))
}
