//! Code generation framework for entity models, transfer objects and
//! validation rulesets.
//!
//! Documents are loaded into a validated AST ([`types`]), lowered to an
//! emitter-neutral IR ([`ir`]) and rendered by an [`ArtifactEmitter`].

pub mod types;
pub mod yaml_loader;
pub mod utils;
pub mod type_mapper;
pub mod validator;
pub mod ir;
pub mod model_emitter;
pub mod transfer_emitter;
pub mod rules;
pub mod plugins;
pub mod typescript;
pub mod reconcile;
pub mod changes;
pub mod scaffold;
pub mod orchestration;
pub mod project_config;
pub mod fs_utils;

// Re-export key types
pub use types::{
    ActionRules, FieldMapping, FormsDocument, ModelDefinition, Relationship, RuleType,
    SchemaDocument, SchemaEntry, ValidationRule,
};
pub use yaml_loader::{load_forms, load_schema};
pub use ir::ArtifactKind;
pub use plugins::{ArtifactEmitter, CommandFormatter, FormatterFix, NoOpFormatter};
pub use typescript::TypeScriptEmitter;
pub use validator::{non_model_targets, validate_relationships};
pub use changes::{changed_keys, ChangeSet};
pub use scaffold::{ensure_forms_document_exists, ensure_schema_document_exists};
pub use orchestration::{
    generate_entities_and_transfer_objects, generate_validation_rulesets, ArtifactFailure,
    GeneratedArtifact, GenerationOptions, GenerationReport, Generator,
};
pub use project_config::MapforgeConfig;
