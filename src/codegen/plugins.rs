//! Extension points of the generation pipeline.
//!
//! Target languages plug in through [`ArtifactEmitter`]; the optional
//! post-generation formatting pass plugs in through [`FormatterFix`].

use crate::codegen::ir::{ArtifactKind, EntityIr, RulesetIr, TransferIr};
use crate::error::{MapperError, Result};
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

/// Renders IR into source text for one target language
///
/// # Example
///
/// ```ignore
/// struct KotlinEmitter;
///
/// impl ArtifactEmitter for KotlinEmitter {
///     fn file_name(&self, file_stem: &str, kind: ArtifactKind) -> String {
///         format!("{}.{}.kt", file_stem, kind)
///     }
///     // ...
/// }
/// ```
pub trait ArtifactEmitter: Send + Sync {
    /// File name (inside the model directory) for an artifact
    fn file_name(&self, file_stem: &str, kind: ArtifactKind) -> String;

    fn emit_model(&self, out: &mut dyn Write, entity: &EntityIr) -> io::Result<()>;

    fn emit_transfer_object(&self, out: &mut dyn Write, transfer: &TransferIr) -> io::Result<()>;

    fn emit_ruleset(&self, out: &mut dyn Write, ruleset: &RulesetIr) -> io::Result<()>;
}

/// Post-processing pass run over the mappers directory after generation.
///
/// Failures are reported but never undo generated artifacts.
pub trait FormatterFix: Send + Sync {
    fn fix(&self, dir: &Path) -> Result<()>;
}

/// Runs an external command with the directory appended, e.g. `eslint --fix <dir>`
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self {
            program: "eslint".to_string(),
            args: vec!["--fix".to_string()],
        }
    }
}

impl FormatterFix for CommandFormatter {
    fn fix(&self, dir: &Path) -> Result<()> {
        tracing::info!("Running {} fix on {} folder...", self.program, dir.display());

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(dir)
            .status()
            .map_err(|e| MapperError::FormatterFixFailure {
                dir: dir.to_path_buf(),
                message: format!("failed to start {}: {}", self.program, e),
            })?;

        if !status.success() {
            return Err(MapperError::FormatterFixFailure {
                dir: dir.to_path_buf(),
                message: format!("{} exited with {}", self.program, status),
            });
        }

        tracing::info!("{} fix completed successfully", self.program);
        Ok(())
    }
}

/// Formatter that does nothing
pub struct NoOpFormatter;

impl FormatterFix for NoOpFormatter {
    fn fix(&self, _dir: &Path) -> Result<()> {
        Ok(())
    }
}
