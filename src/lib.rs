//! # Mapforge: Schema-Driven Model and Form Generation
//!
//! Mapforge reads a YAML schema document and a YAML forms document and emits,
//! per model, an entity class, a transfer object with projections back to the
//! entity, and a set of validation rulesets.
//!
//! ## Features
//!
//! - **Referential integrity gate**: dangling relationships abort before anything is written
//! - **Directory reconciliation**: output directories always mirror the current schema
//! - **Nested wire mapping**: `map: address.street` reads a field out of a nested object
//! - **Change-scoped regeneration**: watchers regenerate only the models that changed
//! - **Pluggable emitters**: target languages implement [`ArtifactEmitter`] (TypeScript shipped)
//!
//! ## Example: Schema Document
//!
//! ```yaml
//! User:
//!   type: model
//!   mappings:
//!     id:
//!       type: string
//!       required: true
//!     street:
//!       type: string
//!       map: address.street
//!
//! Post:
//!   type: model
//!   mappings:
//!     title:
//!       type: string
//!   relationships:
//!     author:
//!       type: User
//!       map: userId
//! ```
//!
//! ## Example: Forms Document
//!
//! ```yaml
//! User:
//!   create:
//!     email:
//!       type: string
//!       required: true
//!       email: true
//!       i18n:
//!         email: validation.email
//! ```
//!
//! ## Example: Generation
//!
//! ```rust,no_run
//! use mapforge::{generate_entities_and_transfer_objects, GenerationOptions};
//! use std::path::Path;
//!
//! let report = generate_entities_and_transfer_objects(
//!     Path::new("mappers"),
//!     Path::new("mappers/schema.tw"),
//!     &GenerationOptions::default(),
//! )?;
//! println!("generated {} models", report.models.len());
//! # Ok::<(), mapforge::MapperError>(())
//! ```

pub mod error;

// Code generation engine
pub mod codegen;

// File watching and change-scoped regeneration
pub mod watch;

// HTTP bridge for the visual schema editor
pub mod bridge;

pub use error::{MapperError, Result};

pub use codegen::{
    ensure_forms_document_exists, ensure_schema_document_exists,
    generate_entities_and_transfer_objects, generate_validation_rulesets, ArtifactEmitter,
    ArtifactKind, CommandFormatter, FormatterFix, GeneratedArtifact, GenerationOptions,
    GenerationReport, Generator, MapforgeConfig, NoOpFormatter, TypeScriptEmitter,
};

pub use watch::{
    ChangeCallback, DocumentKind, DocumentWatch, InMemorySnapshotStore, SnapshotStore, WatchId,
    WatcherRegistry,
};
