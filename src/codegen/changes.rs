//! Change tracking between two document snapshots.

use indexmap::IndexSet;
use serde_yaml::Value;

/// Top-level keys whose content differs between two snapshots
pub type ChangeSet = IndexSet<String>;

/// Compute the keys of `current` that are new or structurally different.
///
/// A missing or non-mapping `previous` counts as an empty document. Keys that
/// only exist in `previous` are not reported; removal is handled by directory
/// reconciliation, not regeneration.
pub fn changed_keys(previous: Option<&Value>, current: &Value) -> ChangeSet {
    let Some(current) = current.as_mapping() else {
        return ChangeSet::new();
    };
    let previous = previous.and_then(Value::as_mapping);

    current
        .iter()
        .filter(|(key, value)| previous.and_then(|prev| prev.get(*key)) != Some(*value))
        .filter_map(|(key, _)| key.as_str().map(str::to_string))
        .collect()
}
