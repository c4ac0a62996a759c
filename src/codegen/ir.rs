//! Intermediate representation handed to artifact emitters.
//!
//! Builders in `model_emitter`, `transfer_emitter` and `rules` turn the
//! document AST into these structures; an [`ArtifactEmitter`] only renders
//! them. Nothing here knows about a target language.
//!
//! [`ArtifactEmitter`]: crate::codegen::plugins::ArtifactEmitter

use crate::codegen::type_mapper::PrimitiveType;
use std::fmt;

/// Kind of generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    TransferObject,
    ValidationRuleset,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::TransferObject => "transfer-object",
            ArtifactKind::ValidationRuleset => "validation-ruleset",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names derived from one model name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNames {
    /// Name as written in the document
    pub canonical: String,
    /// Capitalized display form, used for type names
    pub class_name: String,
    /// Camel-initial form, used for value identifiers
    pub value_name: String,
    /// Lower-kebab form, used for directory and file names
    pub file_stem: String,
}

// ============================================================================
// Entity models
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct EntityIr {
    pub names: ModelNames,
    pub fields: Vec<EntityField>,
    pub relations: Vec<RelationIr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityField {
    pub name: String,
    pub primitive: PrimitiveType,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationIr {
    pub name: String,
    pub target: ModelNames,
    pub collection: bool,
}

// ============================================================================
// Transfer objects
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TransferIr {
    pub names: ModelNames,
    pub wire_fields: Vec<WireField>,
    pub projections: Vec<Projection>,
    pub relations: Vec<RelationIr>,
}

/// Field on the wire type
#[derive(Debug, Clone, PartialEq)]
pub enum WireField {
    Flat {
        name: String,
        primitive: PrimitiveType,
        required: bool,
    },
    /// One nesting level; every property shares the same first path segment
    Nested {
        key: String,
        required: bool,
        properties: Vec<(String, PrimitiveType)>,
    },
}

/// Where an entity field is read from on the wire object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WirePath {
    Direct(String),
    Nested { outer: String, inner: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub entity_field: String,
    pub source: WirePath,
}

// ============================================================================
// Validation rulesets
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RulesetIr {
    pub names: ModelNames,
    pub actions: Vec<ActionIr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionIr {
    pub name: String,
    pub pascal_name: String,
    pub fields: Vec<(String, FieldChain)>,
}

/// Ordered constraint chain for one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChain {
    pub base: BaseType,
    pub base_message: Option<Message>,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BaseType {
    String,
    Number,
    Boolean,
    Date,
    Array(Box<FieldChain>),
    Object(Vec<(String, FieldChain)>),
    Any,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    Min(f64),
    Max(f64),
    Length(f64),
    Email,
    Url,
    Uuid,
    Cuid,
    Includes(String),
    StartsWith(String),
    EndsWith(String),
    Regex(String),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
    Int,
    Positive,
    Negative,
    MultipleOf(f64),
    Finite,
    Safe,
    Nonempty,
    MinItems(f64),
    MaxItems(f64),
    Custom(String),
    Nullable,
    Optional,
    /// Implicit minimum length of 1 on required strings
    RequiredMin,
}

/// Resolved message for a constraint
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Localization key plus the constraint parameters for interpolation
    I18n {
        key: String,
        params: Vec<(String, ParamValue)>,
    },
    /// Literal text with placeholders already substituted
    Literal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => f.write_str(&format_number(*n)),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl FieldChain {
    /// Untyped chain, used for arrays without an item schema
    pub fn any() -> Self {
        Self {
            base: BaseType::Any,
            base_message: None,
            constraints: Vec::new(),
        }
    }

    /// Whether this chain or a nested one carries a localized message
    pub fn uses_i18n(&self) -> bool {
        let own = matches!(self.base_message, Some(Message::I18n { .. }))
            || self
                .constraints
                .iter()
                .any(|c| matches!(c.message, Some(Message::I18n { .. })));
        own || self.nested().any(FieldChain::uses_i18n)
    }

    /// Whether this chain or a nested one references a custom predicate
    pub fn uses_custom(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.kind, ConstraintKind::Custom(_)))
            || self.nested().any(FieldChain::uses_custom)
    }

    fn nested(&self) -> Box<dyn Iterator<Item = &FieldChain> + '_> {
        match &self.base {
            BaseType::Array(item) => Box::new(std::iter::once(item.as_ref())),
            BaseType::Object(properties) => Box::new(properties.iter().map(|(_, chain)| chain)),
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl RulesetIr {
    pub fn uses_i18n(&self) -> bool {
        self.chains().any(FieldChain::uses_i18n)
    }

    pub fn uses_custom(&self) -> bool {
        self.chains().any(FieldChain::uses_custom)
    }

    fn chains(&self) -> impl Iterator<Item = &FieldChain> {
        self.actions
            .iter()
            .flat_map(|action| action.fields.iter().map(|(_, chain)| chain))
    }
}

/// Render a number without a trailing `.0` when it is integral
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
