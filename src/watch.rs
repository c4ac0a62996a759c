//! Watch orchestration for the schema and forms documents.
//!
//! Each registered document gets its own debounced watcher. When the file
//! settles, the new content is compared against the last snapshot and only
//! the changed top-level keys are regenerated (or handed to a callback).

use crate::codegen::changes::{changed_keys, ChangeSet};
use crate::codegen::orchestration::{GenerationOptions, GenerationReport, Generator};
use crate::codegen::yaml_loader::parse_document;
use crate::error::{MapperError, Result};
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Default quiet period before a burst of writes is treated as one change
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Receives the changed names instead of the watcher generating itself
pub type ChangeCallback = Arc<dyn Fn(Vec<String>) + Send + Sync>;

/// Handle of a registered watcher
pub type WatchId = u64;

/// Keeps the last parsed snapshot of each watched document
pub trait SnapshotStore: Send + Sync {
    fn load(&self, path: &Path) -> Option<Value>;
    fn store(&self, path: &Path, snapshot: Value);
}

#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<HashMap<PathBuf, Value>>,
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self, path: &Path) -> Option<Value> {
        let snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        snapshots.get(path).cloned()
    }

    fn store(&self, path: &Path, snapshot: Value) {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        snapshots.insert(path.to_path_buf(), snapshot);
    }
}

/// Which pipeline a watched document feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Schema,
    Forms,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Schema => write!(f, "schema"),
            DocumentKind::Forms => write!(f, "forms"),
        }
    }
}

impl DocumentKind {
    /// What the top-level keys of this document name
    pub fn entry_label(&self) -> &'static str {
        match self {
            DocumentKind::Schema => "models",
            DocumentKind::Forms => "forms",
        }
    }
}

/// One watched document and what to do when it changes
#[derive(Clone)]
pub struct DocumentWatch {
    pub kind: DocumentKind,
    pub mappers_dir: PathBuf,
    pub path: PathBuf,
    pub options: GenerationOptions,
    generator: Generator,
    store: Arc<dyn SnapshotStore>,
    on_change: Option<ChangeCallback>,
}

impl DocumentWatch {
    pub fn new(
        kind: DocumentKind,
        mappers_dir: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        generator: Generator,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            kind,
            mappers_dir: mappers_dir.into(),
            path: path.into(),
            options: GenerationOptions::default(),
            generator,
            store,
            on_change: None,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_on_change(mut self, on_change: Option<ChangeCallback>) -> Self {
        self.on_change = on_change;
        self
    }

    /// Record the current content as the baseline, if the document parses
    pub fn seed(&self) {
        if let Ok(Some(current)) = self.read_current() {
            self.store.store(&self.path, current);
        }
    }

    /// React to a change of the document on disk.
    ///
    /// Returns the keys that changed. A missing or unparsable document is
    /// reported through logs and yields an empty set; the previous snapshot is
    /// kept so the next valid edit is compared against the last good state.
    pub fn handle_change(&self) -> Result<ChangeSet> {
        let current = match self.read_current() {
            Ok(Some(current)) => current,
            Ok(None) => return Ok(ChangeSet::new()),
            Err(e) => {
                tracing::error!("{}", e);
                return Ok(ChangeSet::new());
            }
        };

        let previous = self.store.load(&self.path);
        let changes = changed_keys(previous.as_ref(), &current);
        if changes.is_empty() {
            tracing::debug!("No changes detected in {}", self.path.display());
            self.store.store(&self.path, current);
            return Ok(changes);
        }

        let names: Vec<String> = changes.iter().cloned().collect();
        tracing::info!("Regenerating {}: {}", self.kind.entry_label(), names.join(", "));

        match &self.on_change {
            Some(on_change) => on_change(names),
            None => match self.regenerate(names) {
                Ok(_) => {}
                Err(e) if e.is_missing_document() => return Ok(ChangeSet::new()),
                Err(e) => return Err(e),
            },
        }

        self.store.store(&self.path, current);
        Ok(changes)
    }

    fn read_current(&self) -> Result<Option<Value>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => parse_document(&self.path, &content).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet", self.path.display());
                Ok(None)
            }
            Err(e) => Err(MapperError::io(&self.path, e)),
        }
    }

    fn regenerate(&self, names: Vec<String>) -> Result<GenerationReport> {
        let options = GenerationOptions {
            model_names: Some(names),
            ..self.options.clone()
        };

        match self.kind {
            DocumentKind::Schema => self.generator.generate_entities_and_transfer_objects(
                &self.mappers_dir,
                &self.path,
                &options,
            ),
            DocumentKind::Forms => {
                self.generator
                    .generate_validation_rulesets(&self.mappers_dir, &self.path, &options)
            }
        }
    }
}

struct WatchEntry {
    watch: DocumentWatch,
    debouncer: Option<Debouncer<RecommendedWatcher>>,
}

/// Owns every active watcher; dropping the registry stops them all
pub struct WatcherRegistry {
    generator: Generator,
    store: Arc<dyn SnapshotStore>,
    debounce: Duration,
    next_id: WatchId,
    entries: HashMap<WatchId, WatchEntry>,
}

impl Default for WatcherRegistry {
    fn default() -> Self {
        Self::new(Generator::default())
    }
}

impl WatcherRegistry {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            store: Arc::new(InMemorySnapshotStore::default()),
            debounce: DEFAULT_DEBOUNCE,
            next_id: 1,
            entries: HashMap::new(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Register a watcher on the schema document; call [`start`](Self::start) to begin watching
    pub fn watch_schema(
        &mut self,
        mappers_dir: &Path,
        schema_path: &Path,
        options: GenerationOptions,
        on_change: Option<ChangeCallback>,
    ) -> WatchId {
        self.register(DocumentKind::Schema, mappers_dir, schema_path, options, on_change)
    }

    /// Register a watcher on the forms document
    pub fn watch_forms(
        &mut self,
        mappers_dir: &Path,
        forms_path: &Path,
        options: GenerationOptions,
        on_change: Option<ChangeCallback>,
    ) -> WatchId {
        self.register(DocumentKind::Forms, mappers_dir, forms_path, options, on_change)
    }

    fn register(
        &mut self,
        kind: DocumentKind,
        mappers_dir: &Path,
        path: &Path,
        options: GenerationOptions,
        on_change: Option<ChangeCallback>,
    ) -> WatchId {
        let watch = DocumentWatch::new(
            kind,
            mappers_dir,
            path,
            self.generator.clone(),
            self.store.clone(),
        )
        .with_options(options)
        .with_on_change(on_change);

        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            id,
            WatchEntry {
                watch,
                debouncer: None,
            },
        );
        id
    }

    /// Start every registered watcher that is not running yet
    pub fn start(&mut self) -> Result<()> {
        for entry in self.entries.values_mut() {
            if entry.debouncer.is_none() {
                entry.debouncer = Some(spawn_watcher(&entry.watch, self.debounce)?);
            }
        }
        Ok(())
    }

    /// Stop and forget one watcher; returns whether it existed
    pub fn stop(&mut self, id: WatchId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                if entry.debouncer.is_some() {
                    tracing::info!("Stopped watching {}", entry.watch.path.display());
                }
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self) {
        let ids: Vec<WatchId> = self.entries.keys().copied().collect();
        for id in ids {
            self.stop(id);
        }
    }

    pub fn is_running(&self, id: WatchId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.debouncer.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Watch the document's parent directory and react to events on the document.
///
/// Editors often replace files on save, so the directory is watched rather
/// than the file itself.
fn spawn_watcher(watch: &DocumentWatch, debounce: Duration) -> Result<Debouncer<RecommendedWatcher>> {
    let file_name = watch
        .path
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| MapperError::Watch(format!("{} is not a file path", watch.path.display())))?;
    let dir = match watch.path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    watch.seed();

    let handler = watch.clone();
    let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| match result {
        Ok(events) => {
            if events
                .iter()
                .any(|event| event.path.file_name() == Some(file_name.as_os_str()))
            {
                if let Err(e) = handler.handle_change() {
                    tracing::error!("Failed to regenerate from {}: {}", handler.path.display(), e);
                }
            }
        }
        Err(e) => tracing::error!("Watch error on {}: {}", handler.path.display(), e),
    })
    .map_err(|e| MapperError::Watch(e.to_string()))?;

    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| MapperError::Watch(format!("{}: {}", dir.display(), e)))?;

    tracing::info!("Watching {} {} for changes", watch.kind, watch.path.display());
    Ok(debouncer)
}
