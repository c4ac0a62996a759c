//! High-level orchestration API for code generation.
//!
//! Two pipelines share the same shape: load, check, reconcile, emit, then an
//! optional formatting pass.
//!
//! - schema pipeline: entity models and transfer objects per model
//! - forms pipeline: one validation ruleset per model, covering all actions
//!
//! Document-level problems (missing file, malformed shape, dangling
//! relationship) abort the run before anything is written. Failures while
//! writing one artifact are logged and collected, and the run continues.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codegen::ir::ArtifactKind;
use crate::codegen::model_emitter::entity_ir;
use crate::codegen::plugins::{ArtifactEmitter, CommandFormatter, FormatterFix};
use crate::codegen::reconcile::{canonical_dirs, reconcile_model_dirs, remove_stale_artifacts};
use crate::codegen::rules::ruleset_ir;
use crate::codegen::transfer_emitter::transfer_ir;
use crate::codegen::typescript::TypeScriptEmitter;
use crate::codegen::utils::to_kebab_name;
use crate::codegen::validator::validate_relationships;
use crate::codegen::yaml_loader::{load_forms, load_schema};
use crate::codegen::fs_utils;
use crate::error::{MapperError, Result};

/// Options of one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Run the formatter over the mappers directory afterwards
    pub fix_formatting: bool,
    /// Restrict emission to these models; `None` processes every model
    pub model_names: Option<Vec<String>>,
}

impl GenerationOptions {
    pub fn for_models<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fix_formatting: false,
            model_names: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    fn includes(&self, name: &str) -> bool {
        match &self.model_names {
            Some(names) => names.iter().any(|n| n == name),
            None => true,
        }
    }
}

/// One emitted source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub model: String,
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct ArtifactFailure {
    pub artifact: GeneratedArtifact,
    pub error: MapperError,
}

/// What a run did
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Models that were emitted, in document order
    pub models: Vec<String>,
    /// Artifacts whose content changed on disk
    pub written: Vec<GeneratedArtifact>,
    /// Artifacts regenerated with identical content
    pub unchanged: Vec<GeneratedArtifact>,
    pub failures: Vec<ArtifactFailure>,
    /// Model directories (or form artifacts) removed by reconciliation
    pub removed: Vec<String>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every artifact produced by the run, written or unchanged
    pub fn artifacts(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.written.iter().chain(self.unchanged.iter())
    }
}

/// Generation engine with its pluggable collaborators
#[derive(Clone)]
pub struct Generator {
    emitter: Arc<dyn ArtifactEmitter>,
    formatter: Arc<dyn FormatterFix>,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            emitter: Arc::new(TypeScriptEmitter::default()),
            formatter: Arc::new(CommandFormatter::default()),
        }
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_emitter(mut self, emitter: impl ArtifactEmitter + 'static) -> Self {
        self.emitter = Arc::new(emitter);
        self
    }

    pub fn with_formatter(mut self, formatter: impl FormatterFix + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Generate entity models and transfer objects from a schema document.
    ///
    /// The whole document is validated before any directory is touched.
    pub fn generate_entities_and_transfer_objects(
        &self,
        mappers_dir: &Path,
        schema_path: &Path,
        options: &GenerationOptions,
    ) -> Result<GenerationReport> {
        let schema = load_schema(schema_path)?;
        let mut report = GenerationReport::default();

        if schema.is_empty() {
            tracing::warn!(
                "Please check the {} file, and define your models.",
                schema_path.display()
            );
            return Ok(report);
        }

        validate_relationships(&schema)?;

        warn_unknown_names(options, |name| schema.contains(name));
        let selected: Vec<_> = schema
            .models()
            .filter(|(name, _)| options.includes(name))
            .collect();

        if selected.is_empty() {
            tracing::warn!("No models found in schema to process");
            return Ok(report);
        }

        fs::create_dir_all(mappers_dir).map_err(|e| MapperError::write(mappers_dir, e))?;
        let canonical = canonical_dirs(schema.models().map(|(name, _)| name));
        report.removed = reconcile_model_dirs(mappers_dir, &canonical)?.removed;

        for (name, model) in selected {
            let model_dir = mappers_dir.join(to_kebab_name(name));

            let entity = entity_ir(name, model);
            self.write_artifact(&mut report, name, ArtifactKind::Model, &model_dir, |emitter, out| {
                emitter.emit_model(out, &entity)
            });

            let transfer = transfer_ir(name, model);
            self.write_artifact(
                &mut report,
                name,
                ArtifactKind::TransferObject,
                &model_dir,
                |emitter, out| emitter.emit_transfer_object(out, &transfer),
            );

            tracing::info!("Generated files for model: {}", name);
            report.models.push(name.to_string());
        }

        self.finish(mappers_dir, options);
        Ok(report)
    }

    /// Generate validation rulesets from a forms document
    pub fn generate_validation_rulesets(
        &self,
        mappers_dir: &Path,
        forms_path: &Path,
        options: &GenerationOptions,
    ) -> Result<GenerationReport> {
        let forms = load_forms(forms_path)?;
        let mut report = GenerationReport::default();

        if forms.is_empty() {
            tracing::warn!(
                "Please check the {} file, and define your forms.",
                forms_path.display()
            );
            return Ok(report);
        }

        warn_unknown_names(options, |name| forms.models.contains_key(name));
        let selected: Vec<_> = forms
            .models
            .iter()
            .filter(|(name, _)| options.includes(name))
            .collect();

        if selected.is_empty() {
            tracing::warn!("No forms found to process");
            return Ok(report);
        }

        fs::create_dir_all(mappers_dir).map_err(|e| MapperError::write(mappers_dir, e))?;
        let canonical: BTreeSet<String> = canonical_dirs(forms.models.keys().map(String::as_str));
        report.removed = remove_stale_artifacts(mappers_dir, &canonical, |dir| {
            self.emitter.file_name(dir, ArtifactKind::ValidationRuleset)
        })?;

        for (name, actions) in selected {
            let model_dir = mappers_dir.join(to_kebab_name(name));
            let ruleset = ruleset_ir(name, actions);

            self.write_artifact(
                &mut report,
                name,
                ArtifactKind::ValidationRuleset,
                &model_dir,
                |emitter, out| emitter.emit_ruleset(out, &ruleset),
            );

            tracing::info!("Generated form rules for model: {}", name);
            report.models.push(name.to_string());
        }

        self.finish(mappers_dir, options);
        Ok(report)
    }

    /// Render and write one artifact, recording the outcome in `report`
    fn write_artifact<F>(
        &self,
        report: &mut GenerationReport,
        model: &str,
        kind: ArtifactKind,
        model_dir: &Path,
        render: F,
    ) where
        F: FnOnce(&dyn ArtifactEmitter, &mut dyn std::io::Write) -> std::io::Result<()>,
    {
        let file_name = self.emitter.file_name(&to_kebab_name(model), kind);
        let artifact = GeneratedArtifact {
            model: model.to_string(),
            kind,
            path: model_dir.join(file_name),
        };

        let emitter = self.emitter.as_ref();
        match fs_utils::write_rendered(&artifact.path, |out| render(emitter, out)) {
            Ok(true) => report.written.push(artifact),
            Ok(false) => report.unchanged.push(artifact),
            Err(e) => {
                let error = MapperError::write(&artifact.path, e);
                tracing::error!("Failed to write {} for model {}: {}", kind, model, error);
                report.failures.push(ArtifactFailure { artifact, error });
            }
        }
    }

    fn finish(&self, mappers_dir: &Path, options: &GenerationOptions) {
        if options.fix_formatting {
            if let Err(e) = self.formatter.fix(mappers_dir) {
                tracing::error!("{}", e);
            }
        }
    }
}

fn warn_unknown_names<F>(options: &GenerationOptions, exists: F)
where
    F: Fn(&str) -> bool,
{
    if let Some(names) = &options.model_names {
        for name in names.iter().filter(|name| !exists(name.as_str())) {
            tracing::warn!("Model \"{}\" was requested but is not defined", name);
        }
    }
}

/// Generate entity models and transfer objects with the default TypeScript emitter
pub fn generate_entities_and_transfer_objects(
    mappers_dir: &Path,
    schema_path: &Path,
    options: &GenerationOptions,
) -> Result<GenerationReport> {
    Generator::default().generate_entities_and_transfer_objects(mappers_dir, schema_path, options)
}

/// Generate validation rulesets with the default TypeScript emitter
pub fn generate_validation_rulesets(
    mappers_dir: &Path,
    forms_path: &Path,
    options: &GenerationOptions,
) -> Result<GenerationReport> {
    Generator::default().generate_validation_rulesets(mappers_dir, forms_path, options)
}
