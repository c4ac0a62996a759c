//! Validation rule compiler.
//!
//! Turns the field rules of a forms document into ordered constraint chains.
//! Order within a chain is fixed: base type, string constraints, numeric
//! constraints, array constraints, custom predicate, nullable, then
//! optional/required. Constraints are never reordered.

use crate::codegen::ir::{
    ActionIr, BaseType, Constraint, ConstraintKind, FieldChain, Message, ParamValue, RulesetIr,
};
use crate::codegen::types::{ActionRules, RuleType, ValidationRule};
use crate::codegen::utils::{model_names, to_pascal_case};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Compile every action of one model
pub fn ruleset_ir(name: &str, actions: &IndexMap<String, ActionRules>) -> RulesetIr {
    RulesetIr {
        names: model_names(name),
        actions: actions
            .iter()
            .map(|(action, rules)| ActionIr {
                name: action.clone(),
                pascal_name: to_pascal_case(action),
                fields: rules
                    .iter()
                    .map(|(field, rule)| (field.clone(), compile_field(rule)))
                    .collect(),
            })
            .collect(),
    }
}

/// Compile one field rule into its constraint chain.
///
/// Array items and nested object properties go through this same routine.
pub fn compile_field(rule: &ValidationRule) -> FieldChain {
    let rule_type = rule.resolved_type();

    let base = match &rule_type {
        RuleType::String => BaseType::String,
        RuleType::Number => BaseType::Number,
        RuleType::Boolean => BaseType::Boolean,
        RuleType::Date => BaseType::Date,
        RuleType::Array => BaseType::Array(Box::new(
            rule.item
                .as_deref()
                .map(compile_field)
                .unwrap_or_else(FieldChain::any),
        )),
        RuleType::Object => BaseType::Object(
            rule.properties
                .iter()
                .map(|(name, property)| (name.clone(), compile_field(property)))
                .collect(),
        ),
        RuleType::Unknown(_) => BaseType::Any,
    };

    let mut chain = ChainBuilder {
        rule,
        constraints: Vec::new(),
    };

    match rule_type {
        RuleType::String => chain.string_constraints(),
        RuleType::Number => chain.numeric_constraints(),
        RuleType::Array => chain.array_constraints(),
        _ => {}
    }

    if let Some(predicate) = &rule.custom {
        chain.push(
            "custom",
            ConstraintKind::Custom(predicate.clone()),
            vec![("custom", ParamValue::Text(predicate.clone()))],
        );
    }

    if rule.nullable {
        chain.constraints.push(Constraint {
            kind: ConstraintKind::Nullable,
            message: None,
        });
    }

    if !rule.required {
        chain.constraints.push(Constraint {
            kind: ConstraintKind::Optional,
            message: None,
        });
    } else if rule_type == RuleType::String {
        chain.push(
            "required",
            ConstraintKind::RequiredMin,
            vec![("min", ParamValue::Number(1.0))],
        );
    }

    FieldChain {
        base,
        base_message: resolve_message(rule, "type", &[]),
        constraints: chain.constraints,
    }
}

struct ChainBuilder<'a> {
    rule: &'a ValidationRule,
    constraints: Vec<Constraint>,
}

impl ChainBuilder<'_> {
    fn push(&mut self, key: &str, kind: ConstraintKind, params: Vec<(&str, ParamValue)>) {
        let params: Vec<(String, ParamValue)> = params
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        self.constraints.push(Constraint {
            kind,
            message: resolve_message(self.rule, key, &params),
        });
    }

    fn number(&mut self, key: &str, value: Option<f64>, kind: fn(f64) -> ConstraintKind) {
        if let Some(n) = value {
            self.push(key, kind(n), vec![(key, ParamValue::Number(n))]);
        }
    }

    fn text(&mut self, key: &str, value: &Option<String>, kind: fn(String) -> ConstraintKind) {
        if let Some(s) = value {
            self.push(key, kind(s.clone()), vec![(key, ParamValue::Text(s.clone()))]);
        }
    }

    fn flag(&mut self, key: &str, enabled: bool, kind: ConstraintKind) {
        if enabled {
            self.push(key, kind, Vec::new());
        }
    }

    fn string_constraints(&mut self) {
        let rule = self.rule;
        self.number("min", rule.min, ConstraintKind::Min);
        self.number("max", rule.max, ConstraintKind::Max);
        self.number("length", rule.length, ConstraintKind::Length);
        self.flag("email", rule.email, ConstraintKind::Email);
        self.flag("url", rule.url, ConstraintKind::Url);
        self.flag("uuid", rule.uuid, ConstraintKind::Uuid);
        self.flag("cuid", rule.cuid, ConstraintKind::Cuid);
        self.text("includes", &rule.includes, ConstraintKind::Includes);
        self.text("startsWith", &rule.starts_with, ConstraintKind::StartsWith);
        self.text("endsWith", &rule.ends_with, ConstraintKind::EndsWith);
        self.text("regex", &rule.regex, ConstraintKind::Regex);
    }

    fn numeric_constraints(&mut self) {
        let rule = self.rule;
        self.number("gt", rule.gt, ConstraintKind::Gt);
        self.number("gte", rule.gte, ConstraintKind::Gte);
        self.number("lt", rule.lt, ConstraintKind::Lt);
        self.number("lte", rule.lte, ConstraintKind::Lte);
        self.flag("int", rule.int, ConstraintKind::Int);
        self.flag("positive", rule.positive, ConstraintKind::Positive);
        self.flag("negative", rule.negative, ConstraintKind::Negative);
        self.number("multipleOf", rule.multiple_of, ConstraintKind::MultipleOf);
        self.flag("finite", rule.finite, ConstraintKind::Finite);
        self.flag("safe", rule.safe, ConstraintKind::Safe);
    }

    fn array_constraints(&mut self) {
        let rule = self.rule;
        self.flag("nonempty", rule.nonempty, ConstraintKind::Nonempty);
        self.number("min_items", rule.min_items, ConstraintKind::MinItems);
        self.number("max_items", rule.max_items, ConstraintKind::MaxItems);
    }
}

/// Resolve the message for a constraint key.
///
/// A localization key wins over a literal template; with neither, the
/// constraint is left unannotated.
pub fn resolve_message(
    rule: &ValidationRule,
    key: &str,
    params: &[(String, ParamValue)],
) -> Option<Message> {
    if let Some(i18n_key) = rule.i18n.get(key) {
        return Some(Message::I18n {
            key: i18n_key.clone(),
            params: params.to_vec(),
        });
    }

    rule.messages
        .get(key)
        .map(|template| Message::Literal(substitute_placeholders(template, params)))
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("static pattern"))
}

/// Replace `{name}` with the matching parameter; unknown names are kept
pub fn substitute_placeholders(template: &str, params: &[(String, ParamValue)]) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| {
            params
                .iter()
                .find(|(name, _)| name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
