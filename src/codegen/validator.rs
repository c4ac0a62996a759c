//! Referential integrity checks for schema documents.

use crate::codegen::types::SchemaDocument;
use crate::error::{MapperError, Result};

/// Check that every relationship points at a model present in the document.
///
/// The whole document is checked, regardless of any model filter, and the
/// first dangling reference aborts the run.
pub fn validate_relationships(schema: &SchemaDocument) -> Result<()> {
    for (name, model) in schema.models() {
        for (field, relationship) in &model.relationships {
            let target = relationship.target();

            if !schema.contains(target) {
                tracing::error!(
                    "Error in model \"{}\": Referenced model \"{}\" in relationship \"{}\" does not exist in schema",
                    name,
                    target,
                    field
                );
                return Err(MapperError::UnresolvedRelationship {
                    model: name.to_string(),
                    field: field.clone(),
                    target: target.to_string(),
                });
            }
        }
    }

    for (name, field, target) in non_model_targets(schema) {
        tracing::warn!(
            "Model \"{}\": relationship \"{}\" references \"{}\", which is not a model; its import will not resolve",
            name,
            field,
            target
        );
    }

    Ok(())
}

/// Relationships whose target exists but is not a `type: model` entry,
/// as `(model, field, target)`
pub fn non_model_targets(schema: &SchemaDocument) -> Vec<(String, String, String)> {
    schema
        .models()
        .flat_map(|(name, model)| {
            model
                .relationships
                .iter()
                .filter(move |(_, relationship)| {
                    let target = relationship.target();
                    schema.contains(target) && schema.model(target).is_none()
                })
                .map(move |(field, relationship)| {
                    (
                        name.to_string(),
                        field.clone(),
                        relationship.target().to_string(),
                    )
                })
        })
        .collect()
}
