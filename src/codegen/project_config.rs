//! Project configuration schema for mapforge.yaml
//!
//! Every field is optional; a missing file means all defaults. CLI flags
//! override whatever is loaded here.

use crate::codegen::orchestration::Generator;
use crate::codegen::plugins::{CommandFormatter, NoOpFormatter};
use crate::codegen::scaffold::{FORMS_FILE_NAME, SCHEMA_FILE_NAME};
use crate::codegen::typescript::{
    TypeScriptEmitter, DEFAULT_I18N_IMPORT_PATH, DEFAULT_VALIDATORS_IMPORT_PATH,
};
use crate::error::{MapperError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default name of the configuration file, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "mapforge.yaml";

/// Top-level project configuration from mapforge.yaml
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MapforgeConfig {
    #[serde(default = "default_mappers_dir")]
    pub mappers_dir: PathBuf,
    #[serde(default = "default_schema_file")]
    pub schema_file: String,
    #[serde(default = "default_forms_file")]
    pub forms_file: String,
    #[serde(default)]
    pub fix_formatting: bool,
    #[serde(default)]
    pub watch: bool,
    #[serde(default = "default_formatter")]
    pub formatter: Vec<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_i18n_import_path")]
    pub i18n_import_path: String,
    #[serde(default = "default_validators_import_path")]
    pub validators_import_path: String,
    #[serde(default)]
    pub editor: EditorConfig,
}

/// Editor bridge server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    #[serde(default = "default_editor_host")]
    pub host: String,
    #[serde(default = "default_editor_port")]
    pub port: u16,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            host: default_editor_host(),
            port: default_editor_port(),
        }
    }
}

fn default_mappers_dir() -> PathBuf {
    PathBuf::from("./mappers")
}

fn default_schema_file() -> String {
    SCHEMA_FILE_NAME.to_string()
}

fn default_forms_file() -> String {
    FORMS_FILE_NAME.to_string()
}

fn default_formatter() -> Vec<String> {
    vec!["eslint".to_string(), "--fix".to_string()]
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_i18n_import_path() -> String {
    DEFAULT_I18N_IMPORT_PATH.to_string()
}

fn default_validators_import_path() -> String {
    DEFAULT_VALIDATORS_IMPORT_PATH.to_string()
}

fn default_editor_host() -> String {
    "127.0.0.1".to_string()
}

fn default_editor_port() -> u16 {
    4510
}

impl Default for MapforgeConfig {
    fn default() -> Self {
        Self {
            mappers_dir: default_mappers_dir(),
            schema_file: default_schema_file(),
            forms_file: default_forms_file(),
            fix_formatting: false,
            watch: false,
            formatter: default_formatter(),
            debounce_ms: default_debounce_ms(),
            i18n_import_path: default_i18n_import_path(),
            validators_import_path: default_validators_import_path(),
            editor: EditorConfig::default(),
        }
    }
}

impl MapforgeConfig {
    /// Load project configuration from a mapforge.yaml file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MapperError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: Self = serde_yaml::from_str(&contents)
            .map_err(|e| MapperError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise `mapforge.yaml` when present, otherwise defaults
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(CONFIG_FILE_NAME).is_file() => Self::from_file(CONFIG_FILE_NAME),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.formatter.iter().all(|part| part.trim().is_empty()) {
            return Err(MapperError::Config(
                "formatter command must not be empty".to_string(),
            ));
        }

        if self.debounce_ms == 0 {
            return Err(MapperError::Config(
                "debounce_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Full path of the schema document
    pub fn schema_path(&self) -> PathBuf {
        self.mappers_dir.join(&self.schema_file)
    }

    /// Full path of the forms document
    pub fn forms_path(&self) -> PathBuf {
        self.mappers_dir.join(&self.forms_file)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn formatter(&self) -> Option<CommandFormatter> {
        CommandFormatter::new(&self.formatter)
    }

    pub fn emitter(&self) -> TypeScriptEmitter {
        TypeScriptEmitter {
            i18n_import_path: self.i18n_import_path.clone(),
            validators_import_path: self.validators_import_path.clone(),
        }
    }

    /// Generator wired with the configured emitter and formatter
    pub fn generator(&self) -> Generator {
        let generator = Generator::new().with_emitter(self.emitter());
        match self.formatter() {
            Some(formatter) => generator.with_formatter(formatter),
            None => generator.with_formatter(NoOpFormatter),
        }
    }

    /// Address the editor bridge binds to, e.g. "127.0.0.1:4510"
    pub fn editor_address(&self) -> String {
        format!("{}:{}", self.editor.host, self.editor.port)
    }
}
