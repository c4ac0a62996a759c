//! Entity model construction.

use crate::codegen::ir::{EntityField, EntityIr, RelationIr};
use crate::codegen::type_mapper::PrimitiveType;
use crate::codegen::types::ModelDefinition;
use crate::codegen::utils::model_names;

/// Build the entity IR for one model.
///
/// Scalar fields keep document order and their required flag; relationships
/// follow, typed against the target model's names.
pub fn entity_ir(name: &str, model: &ModelDefinition) -> EntityIr {
    let fields = model
        .mappings
        .iter()
        .map(|(field, mapping)| EntityField {
            name: field.clone(),
            primitive: PrimitiveType::from_tag(&mapping.field_type),
            required: mapping.required,
        })
        .collect();

    EntityIr {
        names: model_names(name),
        fields,
        relations: relation_irs(model),
    }
}

/// Relationship IR shared by the entity and transfer-object builders
pub fn relation_irs(model: &ModelDefinition) -> Vec<RelationIr> {
    model
        .relationships
        .iter()
        .map(|(field, relationship)| RelationIr {
            name: field.clone(),
            target: model_names(relationship.target()),
            collection: relationship.is_collection(),
        })
        .collect()
}
