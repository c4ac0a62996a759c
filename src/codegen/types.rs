//! Type definitions for schema and forms documents.
//!
//! These types are the validated AST of the YAML documents. They are built
//! once at load time (see [`crate::codegen::yaml_loader`]) so that no later
//! stage has to re-check the document shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Suffix on a relationship type meaning "array of" the referenced model
pub const COLLECTION_MARKER: &str = "[]";

/// Entry kind that the generator processes
pub const MODEL_KIND: &str = "model";

/// Kind recorded for entries that carry no string `type`
pub const UNKNOWN_KIND: &str = "unknown";

/// Parsed schema document, keyed by model name in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDocument {
    pub entries: IndexMap<String, SchemaEntry>,
}

/// One top-level entry of the schema document
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaEntry {
    /// `type: model` entry
    Model(ModelDefinition),
    /// Any other entry kind; kept for reconciliation, never emitted
    Other { kind: String },
}

/// Model definition: scalar fields plus relationships
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ModelDefinition {
    #[serde(default)]
    pub mappings: IndexMap<String, FieldMapping>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub relationships: IndexMap<String, Relationship>,
}

/// Scalar field mapping
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FieldMapping {
    #[serde(rename = "type", default)]
    pub field_type: String,
    /// Dotted source path on the wire object; defaults to the field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
}

/// Relationship to another model
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Relationship {
    /// Target model name, optionally suffixed with `[]`
    #[serde(rename = "type")]
    pub target_type: String,
    /// Source field; preserved but not used by emission
    #[serde(default)]
    pub map: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SchemaEntry {
    /// Entry with no usable `type` key
    pub fn unknown() -> Self {
        SchemaEntry::Other {
            kind: UNKNOWN_KIND.to_string(),
        }
    }
}

impl SchemaDocument {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over `type: model` entries only
    pub fn models(&self) -> impl Iterator<Item = (&str, &ModelDefinition)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            SchemaEntry::Model(model) => Some((name.as_str(), model)),
            SchemaEntry::Other { .. } => None,
        })
    }

    pub fn model(&self, name: &str) -> Option<&ModelDefinition> {
        match self.entries.get(name) {
            Some(SchemaEntry::Model(model)) => Some(model),
            _ => None,
        }
    }
}

impl FieldMapping {
    /// Wire path for this field (`map` or the field name itself)
    pub fn source_path<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.map.as_deref().unwrap_or(field_name)
    }
}

impl Relationship {
    /// Referenced model name with the collection marker stripped
    pub fn target(&self) -> &str {
        self.target_type
            .strip_suffix(COLLECTION_MARKER)
            .unwrap_or(&self.target_type)
    }

    pub fn is_collection(&self) -> bool {
        self.target_type.ends_with(COLLECTION_MARKER)
    }
}

/// Field rules for one action (`create`, `update`, ...) of a model
pub type ActionRules = IndexMap<String, ValidationRule>;

/// Parsed forms document: model -> action -> field -> rule
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FormsDocument {
    pub models: IndexMap<String, IndexMap<String, ActionRules>>,
}

impl FormsDocument {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Validation rule for one form field
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub nullable: bool,

    // String constraints
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub length: Option<f64>,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub url: bool,
    #[serde(default)]
    pub uuid: bool,
    #[serde(default)]
    pub cuid: bool,
    pub includes: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub regex: Option<String>,

    // Numeric constraints
    pub gt: Option<f64>,
    pub gte: Option<f64>,
    pub lt: Option<f64>,
    pub lte: Option<f64>,
    #[serde(default)]
    pub int: bool,
    #[serde(default)]
    pub positive: bool,
    #[serde(default)]
    pub negative: bool,
    pub multiple_of: Option<f64>,
    #[serde(default)]
    pub finite: bool,
    #[serde(default)]
    pub safe: bool,

    // Array constraints
    #[serde(default)]
    pub nonempty: bool,
    #[serde(rename = "min_items")]
    pub min_items: Option<f64>,
    #[serde(rename = "max_items")]
    pub max_items: Option<f64>,

    /// Name of a predicate exported by the validators module
    pub custom: Option<String>,

    /// Literal message template per constraint key
    #[serde(default)]
    pub messages: IndexMap<String, String>,
    /// Localization key per constraint key
    #[serde(default)]
    pub i18n: IndexMap<String, String>,

    /// Element schema for `type: array`
    pub item: Option<Box<ValidationRule>>,
    /// Nested schema for `type: object`
    #[serde(default)]
    pub properties: IndexMap<String, ValidationRule>,
}

/// Rule type after defaulting; unknown tags are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleType {
    String,
    Number,
    Boolean,
    Date,
    Array,
    Object,
    Unknown(String),
}

impl ValidationRule {
    pub fn resolved_type(&self) -> RuleType {
        match self.rule_type.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("string") => RuleType::String,
            Some("number") => RuleType::Number,
            Some("boolean") => RuleType::Boolean,
            Some("date") => RuleType::Date,
            Some("array") => RuleType::Array,
            Some("object") => RuleType::Object,
            Some(other) => RuleType::Unknown(other.to_string()),
        }
    }
}
