//! Transfer-object construction.
//!
//! A transfer object is the wire shape of a model plus its projections onto
//! the entity. Field `map` paths rename wire fields and may nest them one
//! level deep (`address.street`).

use crate::codegen::ir::{Projection, TransferIr, WireField, WirePath};
use crate::codegen::model_emitter::relation_irs;
use crate::codegen::type_mapper::PrimitiveType;
use crate::codegen::types::ModelDefinition;
use crate::codegen::utils::model_names;

/// Build the transfer-object IR for one model
pub fn transfer_ir(name: &str, model: &ModelDefinition) -> TransferIr {
    let mut wire_fields: Vec<WireField> = Vec::new();
    let mut projections = Vec::new();

    for (field, mapping) in &model.mappings {
        let primitive = PrimitiveType::from_tag(&mapping.field_type);
        let source = wire_path(name, field, mapping.source_path(field));

        match &source {
            WirePath::Direct(wire_name) => {
                add_flat(&mut wire_fields, wire_name, primitive, mapping.required)
            }
            WirePath::Nested { outer, inner } => {
                add_nested(&mut wire_fields, outer, inner, primitive, mapping.required)
            }
        }

        projections.push(Projection {
            entity_field: field.clone(),
            source,
        });
    }

    TransferIr {
        names: model_names(name),
        wire_fields,
        projections,
        relations: relation_irs(model),
    }
}

/// Split a mapped path into its wire location.
///
/// Only one nesting level is supported: for `a.b.c` the first and last
/// segments are used.
pub fn wire_path(model: &str, field: &str, path: &str) -> WirePath {
    let segments: Vec<&str> = path.split('.').collect();

    match segments.as_slice() {
        [single] => WirePath::Direct(single.to_string()),
        [outer, .., inner] => {
            if segments.len() > 2 {
                tracing::warn!(
                    "Field \"{}.{}\" maps to \"{}\"; only one nesting level is supported, using {}.{}",
                    model,
                    field,
                    path,
                    outer,
                    inner
                );
            }
            WirePath::Nested {
                outer: outer.to_string(),
                inner: inner.to_string(),
            }
        }
        [] => WirePath::Direct(field.to_string()),
    }
}

/// Attach a flat member; fields sharing a wire name share one member
fn add_flat(
    wire_fields: &mut Vec<WireField>,
    wire_name: &str,
    primitive: PrimitiveType,
    required: bool,
) {
    for existing in wire_fields.iter_mut() {
        if let WireField::Flat {
            name,
            required: member_required,
            ..
        } = existing
        {
            if name == wire_name {
                *member_required |= required;
                return;
            }
        }
    }

    wire_fields.push(WireField::Flat {
        name: wire_name.to_string(),
        primitive,
        required,
    });
}

/// Attach a nested property, grouping by the first path segment
fn add_nested(
    wire_fields: &mut Vec<WireField>,
    outer: &str,
    inner: &str,
    primitive: PrimitiveType,
    required: bool,
) {
    for existing in wire_fields.iter_mut() {
        if let WireField::Nested {
            key,
            required: group_required,
            properties,
        } = existing
        {
            if key == outer {
                *group_required |= required;
                if !properties.iter().any(|(name, _)| name == inner) {
                    properties.push((inner.to_string(), primitive));
                }
                return;
            }
        }
    }

    wire_fields.push(WireField::Nested {
        key: outer.to_string(),
        required,
        properties: vec![(inner.to_string(), primitive)],
    });
}
