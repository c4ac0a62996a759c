//! TypeScript artifact emitter.
//!
//! Entities become classes, transfer objects become classes with `toEntity`
//! and `toPlainEntity` projections, and validation rulesets become zod
//! object schemas.

use crate::codegen::ir::{
    format_number, ArtifactKind, BaseType, ConstraintKind, EntityIr, FieldChain, Message,
    ModelNames, ParamValue, RelationIr, RulesetIr, TransferIr, WireField, WirePath,
};
use crate::codegen::plugins::ArtifactEmitter;
use crate::codegen::type_mapper::typescript_type;
use crate::codegen::utils::ts_string_literal;
use std::io::{self, Write};

pub const DEFAULT_I18N_IMPORT_PATH: &str = "@/i18n";
pub const DEFAULT_VALIDATORS_IMPORT_PATH: &str = "@/validators";

/// Emits `.ts` files
#[derive(Debug, Clone)]
pub struct TypeScriptEmitter {
    /// Module exporting the `t` translation function
    pub i18n_import_path: String,
    /// Module exporting custom predicates
    pub validators_import_path: String,
}

impl Default for TypeScriptEmitter {
    fn default() -> Self {
        Self {
            i18n_import_path: DEFAULT_I18N_IMPORT_PATH.to_string(),
            validators_import_path: DEFAULT_VALIDATORS_IMPORT_PATH.to_string(),
        }
    }
}

impl ArtifactEmitter for TypeScriptEmitter {
    fn file_name(&self, file_stem: &str, kind: ArtifactKind) -> String {
        let suffix = match kind {
            ArtifactKind::Model => "model",
            ArtifactKind::TransferObject => "dto",
            ArtifactKind::ValidationRuleset => "form",
        };
        format!("{}.{}.ts", file_stem, suffix)
    }

    fn emit_model(&self, out: &mut dyn Write, entity: &EntityIr) -> io::Result<()> {
        let class_name = model_class(&entity.names);

        let imports = relation_imports(&entity.names, &entity.relations, "Model", "model");
        for import in &imports {
            writeln!(out, "{}", import)?;
        }
        if !imports.is_empty() {
            writeln!(out)?;
        }

        writeln!(out, "export class {} {{", class_name)?;
        for field in &entity.fields {
            writeln!(
                out,
                "  {}{}: {}",
                property_key(&field.name),
                required_marker(field.required),
                typescript_type(field.primitive)
            )?;
        }
        for relation in &entity.relations {
            writeln!(
                out,
                "  {}?: {}",
                property_key(&relation.name),
                relation_type(relation, "Model")
            )?;
        }
        if !entity.fields.is_empty() || !entity.relations.is_empty() {
            writeln!(out)?;
        }
        writeln!(out, "  constructor(data: Partial<{}> = {{}}) {{", class_name)?;
        writeln!(out, "    Object.assign(this, data)")?;
        writeln!(out, "  }}")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(
            out,
            "export type {} = Omit<{}, 'constructor'>",
            plain_class(&entity.names),
            class_name
        )?;

        Ok(())
    }

    fn emit_transfer_object(&self, out: &mut dyn Write, transfer: &TransferIr) -> io::Result<()> {
        let names = &transfer.names;
        let class_name = dto_class(names);

        for import in relation_imports(names, &transfer.relations, "DTO", "dto") {
            writeln!(out, "{}", import)?;
        }
        writeln!(
            out,
            "import {{ {}, type {} }} from './{}.model'",
            model_class(names),
            plain_class(names),
            names.file_stem
        )?;
        writeln!(out)?;

        writeln!(out, "export class {} {{", class_name)?;
        for field in &transfer.wire_fields {
            match field {
                WireField::Flat {
                    name,
                    primitive,
                    required,
                } => writeln!(
                    out,
                    "  {}{}: {}",
                    property_key(name),
                    required_marker(*required),
                    typescript_type(*primitive)
                )?,
                WireField::Nested {
                    key,
                    required,
                    properties,
                } => {
                    let members: Vec<String> = properties
                        .iter()
                        .map(|(name, primitive)| {
                            format!("{}: {}", property_key(name), typescript_type(*primitive))
                        })
                        .collect();
                    writeln!(
                        out,
                        "  {}{}: {{ {} }}",
                        property_key(key),
                        required_marker(*required),
                        members.join("; ")
                    )?
                }
            }
        }
        for relation in &transfer.relations {
            writeln!(
                out,
                "  {}?: {}",
                property_key(&relation.name),
                relation_type(relation, "DTO")
            )?;
        }
        if !transfer.wire_fields.is_empty() || !transfer.relations.is_empty() {
            writeln!(out)?;
        }

        writeln!(out, "  constructor(data: Partial<{}> = {{}}) {{", class_name)?;
        writeln!(out, "    Object.assign(this, data)")?;
        writeln!(out, "  }}")?;
        writeln!(out)?;

        writeln!(out, "  toEntity(): {} {{", model_class(names))?;
        writeln!(out, "    return new {}({{", model_class(names))?;
        write_projections(out, transfer, "toEntity")?;
        writeln!(out, "    }})")?;
        writeln!(out, "  }}")?;
        writeln!(out)?;

        writeln!(out, "  toPlainEntity(): {} {{", plain_class(names))?;
        writeln!(out, "    return {{")?;
        write_projections(out, transfer, "toPlainEntity")?;
        writeln!(out, "    }}")?;
        writeln!(out, "  }}")?;
        writeln!(out, "}}")?;

        Ok(())
    }

    fn emit_ruleset(&self, out: &mut dyn Write, ruleset: &RulesetIr) -> io::Result<()> {
        writeln!(out, "import {{ z }} from 'zod'")?;
        if ruleset.uses_i18n() {
            writeln!(out, "import {{ t }} from {}", ts_string_literal(&self.i18n_import_path))?;
        }
        if ruleset.uses_custom() {
            writeln!(
                out,
                "import * as validators from {}",
                ts_string_literal(&self.validators_import_path)
            )?;
        }

        for action in &ruleset.actions {
            let schema_name = format!("{}{}Schema", ruleset.names.value_name, action.pascal_name);

            writeln!(out)?;
            writeln!(out, "export const {} = z.object({{", schema_name)?;
            for (field, chain) in &action.fields {
                writeln!(out, "  {}: {},", property_key(field), render_chain(chain, 1))?;
            }
            writeln!(out, "}})")?;
            writeln!(out)?;
            writeln!(
                out,
                "export type {}{}Form = z.infer<typeof {}>",
                ruleset.names.class_name, action.pascal_name, schema_name
            )?;
        }

        Ok(())
    }
}

fn model_class(names: &ModelNames) -> String {
    format!("{}Model", names.class_name)
}

fn plain_class(names: &ModelNames) -> String {
    format!("{}PlainModel", names.class_name)
}

fn dto_class(names: &ModelNames) -> String {
    format!("{}DTO", names.class_name)
}

fn required_marker(required: bool) -> &'static str {
    if required {
        "!"
    } else {
        "?"
    }
}

fn relation_type(relation: &RelationIr, suffix: &str) -> String {
    let type_name = format!("{}{}", relation.target.class_name, suffix);
    if relation.collection {
        format!("{}[]", type_name)
    } else {
        type_name
    }
}

/// Type-only imports of related classes, deduplicated in first-use order
fn relation_imports(
    owner: &ModelNames,
    relations: &[RelationIr],
    suffix: &str,
    file_kind: &str,
) -> Vec<String> {
    let mut imports: Vec<String> = Vec::new();

    for relation in relations {
        if relation.target.canonical == owner.canonical {
            continue;
        }

        let import = format!(
            "import type {{ {}{} }} from '../{}/{}.{}'",
            relation.target.class_name,
            suffix,
            relation.target.file_stem,
            relation.target.file_stem,
            file_kind
        );
        if !imports.contains(&import) {
            imports.push(import);
        }
    }

    imports
}

fn write_projections(out: &mut dyn Write, transfer: &TransferIr, method: &str) -> io::Result<()> {
    for projection in &transfer.projections {
        let source = match &projection.source {
            WirePath::Direct(name) => format!("this{}", member(name, false)),
            WirePath::Nested { outer, inner } => {
                format!("this{}{}", member(outer, false), member(inner, true))
            }
        };
        writeln!(out, "      {}: {},", property_key(&projection.entity_field), source)?;
    }

    for relation in &transfer.relations {
        let access = format!("this{}", member(&relation.name, false));
        let projected = if relation.collection {
            format!("{}?.map(e => e.{}())", access, method)
        } else {
            format!("{}?.{}()", access, method)
        };
        writeln!(out, "      {}: {},", property_key(&relation.name), projected)?;
    }

    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Object/class key, quoted when it is not a plain identifier
fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        ts_string_literal(name)
    }
}

/// Member access suffix, optionally chained with `?.`
fn member(name: &str, optional: bool) -> String {
    match (is_identifier(name), optional) {
        (true, false) => format!(".{}", name),
        (true, true) => format!("?.{}", name),
        (false, false) => format!("[{}]", ts_string_literal(name)),
        (false, true) => format!("?.[{}]", ts_string_literal(name)),
    }
}

/// Render a constraint chain as a zod expression
fn render_chain(chain: &FieldChain, depth: usize) -> String {
    let base_params = message_params(chain.base_message.as_ref());

    let mut expr = match &chain.base {
        BaseType::String => format!("z.string({})", base_params),
        BaseType::Number => format!("z.number({})", base_params),
        BaseType::Boolean => format!("z.boolean({})", base_params),
        BaseType::Date => format!("z.date({})", base_params),
        BaseType::Any => "z.any()".to_string(),
        BaseType::Array(item) => {
            format!("z.array({})", join_args(&render_chain(item, depth), &base_params))
        }
        BaseType::Object(properties) => {
            let indent = "  ".repeat(depth + 1);
            let mut body = String::from("{\n");
            for (name, property) in properties {
                body.push_str(&format!(
                    "{}{}: {},\n",
                    indent,
                    property_key(name),
                    render_chain(property, depth + 1)
                ));
            }
            body.push_str(&"  ".repeat(depth));
            body.push('}');
            format!("z.object({})", join_args(&body, &base_params))
        }
    };

    // After `.refine` or `.nullable` the schema is no longer a ZodString
    let mut wrapped = false;

    for constraint in &chain.constraints {
        let params = message_params(constraint.message.as_ref());
        let call = match &constraint.kind {
            ConstraintKind::Min(n) | ConstraintKind::MinItems(n) => number_call("min", *n, &params),
            ConstraintKind::Max(n) | ConstraintKind::MaxItems(n) => number_call("max", *n, &params),
            ConstraintKind::Length(n) => number_call("length", *n, &params),
            ConstraintKind::Email => format!(".email({})", params),
            ConstraintKind::Url => format!(".url({})", params),
            ConstraintKind::Uuid => format!(".uuid({})", params),
            ConstraintKind::Cuid => format!(".cuid({})", params),
            ConstraintKind::Includes(s) => text_call("includes", s, &params),
            ConstraintKind::StartsWith(s) => text_call("startsWith", s, &params),
            ConstraintKind::EndsWith(s) => text_call("endsWith", s, &params),
            ConstraintKind::Regex(pattern) => format!(
                ".regex({})",
                join_args(&format!("new RegExp({})", ts_string_literal(pattern)), &params)
            ),
            ConstraintKind::Gt(n) => number_call("gt", *n, &params),
            ConstraintKind::Gte(n) => number_call("gte", *n, &params),
            ConstraintKind::Lt(n) => number_call("lt", *n, &params),
            ConstraintKind::Lte(n) => number_call("lte", *n, &params),
            ConstraintKind::Int => format!(".int({})", params),
            ConstraintKind::Positive => format!(".positive({})", params),
            ConstraintKind::Negative => format!(".negative({})", params),
            ConstraintKind::MultipleOf(n) => number_call("multipleOf", *n, &params),
            ConstraintKind::Finite => format!(".finite({})", params),
            ConstraintKind::Safe => format!(".safe({})", params),
            ConstraintKind::Nonempty => format!(".nonempty({})", params),
            ConstraintKind::Custom(predicate) => {
                wrapped = true;
                format!(
                    ".refine({})",
                    join_args(&format!("validators{}", member(predicate, false)), &params)
                )
            }
            ConstraintKind::Nullable => {
                wrapped = true;
                ".nullable()".to_string()
            }
            ConstraintKind::Optional => ".optional()".to_string(),
            ConstraintKind::RequiredMin if wrapped => format!(
                ".refine({})",
                join_args("v => v == null || v.length >= 1", &params)
            ),
            ConstraintKind::RequiredMin => number_call("min", 1.0, &params),
        };
        expr.push_str(&call);
    }

    expr
}

fn number_call(method: &str, n: f64, params: &str) -> String {
    format!(".{}({})", method, join_args(&format_number(n), params))
}

fn text_call(method: &str, value: &str, params: &str) -> String {
    format!(".{}({})", method, join_args(&ts_string_literal(value), params))
}

fn join_args(first: &str, second: &str) -> String {
    if second.is_empty() {
        first.to_string()
    } else {
        format!("{}, {}", first, second)
    }
}

/// zod params object carrying the resolved message, or nothing
fn message_params(message: Option<&Message>) -> String {
    match message {
        None => String::new(),
        Some(Message::Literal(text)) => format!("{{ message: {} }}", ts_string_literal(text)),
        Some(Message::I18n { key, params }) if params.is_empty() => {
            format!("{{ message: t({}) }}", ts_string_literal(key))
        }
        Some(Message::I18n { key, params }) => {
            let values: Vec<String> = params
                .iter()
                .map(|(name, value)| {
                    let rendered = match value {
                        ParamValue::Number(n) => format_number(*n),
                        ParamValue::Text(s) => ts_string_literal(s),
                    };
                    format!("{}: {}", property_key(name), rendered)
                })
                .collect();
            format!(
                "{{ message: t({}, {{ {} }}) }}",
                ts_string_literal(key),
                values.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::model_emitter::entity_ir;
    use crate::codegen::rules::{compile_field, ruleset_ir};
    use crate::codegen::transfer_emitter::transfer_ir;
    use crate::codegen::types::{ActionRules, ModelDefinition, ValidationRule};
    use indexmap::IndexMap;

    fn model(yaml: &str) -> ModelDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn render_model(name: &str, yaml: &str) -> String {
        let mut out = Vec::new();
        TypeScriptEmitter::default()
            .emit_model(&mut out, &entity_ir(name, &model(yaml)))
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn render_dto(name: &str, yaml: &str) -> String {
        let mut out = Vec::new();
        TypeScriptEmitter::default()
            .emit_transfer_object(&mut out, &transfer_ir(name, &model(yaml)))
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn chain(yaml: &str) -> String {
        let rule: ValidationRule = serde_yaml::from_str(yaml).unwrap();
        render_chain(&compile_field(&rule), 1)
    }

    const POST: &str = r#"
mappings:
  id: { type: string, required: true }
  content: { type: string, map: body }
  views: { type: number }
relationships:
  author: { type: UserProfile, map: userId }
  comments: { type: "Comment[]", map: comments }
"#;

    #[test]
    fn test_file_names() {
        let emitter = TypeScriptEmitter::default();
        assert_eq!(emitter.file_name("user-profile", ArtifactKind::Model), "user-profile.model.ts");
        assert_eq!(emitter.file_name("post", ArtifactKind::TransferObject), "post.dto.ts");
        assert_eq!(emitter.file_name("post", ArtifactKind::ValidationRuleset), "post.form.ts");
    }

    #[test]
    fn test_model_class() {
        let output = render_model("Post", POST);

        assert!(output.starts_with(
            "import type { UserProfileModel } from '../user-profile/user-profile.model'\n\
             import type { CommentModel } from '../comment/comment.model'\n\n"
        ));
        assert!(output.contains("export class PostModel {\n  id!: string\n  content?: string\n"));
        assert!(output.contains("  views?: number\n"));
        assert!(output.contains("  author?: UserProfileModel\n  comments?: CommentModel[]\n"));
        assert!(output.contains("constructor(data: Partial<PostModel> = {})"));
        assert!(output.ends_with("export type PostPlainModel = Omit<PostModel, 'constructor'>\n"));
    }

    #[test]
    fn test_model_self_reference_is_not_imported() {
        let output = render_model(
            "User",
            "mappings: {}\nrelationships:\n  manager: { type: User, map: managerId }\n  reports: { type: 'User[]', map: reports }\n",
        );
        assert!(!output.contains("import"));
        assert!(output.contains("  manager?: UserModel\n  reports?: UserModel[]\n"));
    }

    #[test]
    fn test_dto_projections() {
        let output = render_dto("Post", POST);

        assert!(output.contains("import type { UserProfileDTO } from '../user-profile/user-profile.dto'"));
        assert!(output.contains("import { PostModel, type PostPlainModel } from './post.model'"));
        assert!(output.contains("  body?: string\n"));
        assert!(output.contains("  toEntity(): PostModel {\n    return new PostModel({\n"));
        assert!(output.contains("      content: this.body,\n"));
        assert!(output.contains("      author: this.author?.toEntity(),\n"));
        assert!(output.contains("      comments: this.comments?.map(e => e.toEntity()),\n"));
        assert!(output.contains("  toPlainEntity(): PostPlainModel {\n    return {\n"));
        assert!(output.contains("      author: this.author?.toPlainEntity(),\n"));
        assert!(output.contains("      comments: this.comments?.map(e => e.toPlainEntity()),\n"));
    }

    #[test]
    fn test_dto_nested_mapping() {
        let output = render_dto(
            "User",
            "mappings:\n  street: { type: string, map: address.street, required: true }\n",
        );

        assert!(output.contains("  address!: { street: string }\n"));
        assert!(output.contains("      street: this.address?.street,\n"));
    }

    #[test]
    fn test_non_identifier_keys_are_quoted() {
        let output = render_dto("User", "mappings:\n  firstName: { type: string, map: first-name }\n");
        assert!(output.contains("  'first-name'?: string\n"));
        assert!(output.contains("      firstName: this['first-name'],\n"));
    }

    #[test]
    fn test_chain_rendering() {
        assert_eq!(
            chain("{ type: string, required: true }"),
            "z.string().min(1)"
        );
        assert_eq!(
            chain("{ email: true, max: 120 }"),
            "z.string().max(120).email().optional()"
        );
        assert_eq!(
            chain("{ type: number, required: true, gt: 0, int: true, nullable: true }"),
            "z.number().gt(0).int().nullable()"
        );
        assert_eq!(chain("{ type: color }"), "z.any().optional()");
    }

    #[test]
    fn test_required_after_wrapper_uses_refine() {
        assert_eq!(
            chain("{ type: string, required: true, nullable: true }"),
            "z.string().nullable().refine(v => v == null || v.length >= 1)"
        );
        assert_eq!(
            chain("{ type: string, required: true, max: 8, custom: isSlug, messages: { required: Required } }"),
            "z.string().max(8).refine(validators.isSlug).refine(v => v == null || v.length >= 1, { message: 'Required' })"
        );
        assert_eq!(
            chain("{ type: string, required: true, max: 8 }"),
            "z.string().max(8).min(1)"
        );
    }

    #[test]
    fn test_chain_messages() {
        assert_eq!(
            chain("{ type: string, min: 3, i18n: { min: key.min }, messages: { min: literal } }"),
            "z.string().min(3, { message: t('key.min', { min: 3 }) }).optional()"
        );
        assert_eq!(
            chain("{ email: true, required: true, i18n: { email: form.email }, messages: { required: \"Can't be blank\" } }"),
            "z.string().email({ message: t('form.email') }).min(1, { message: 'Can\\'t be blank' })"
        );
        assert_eq!(
            chain("{ type: number, messages: { type: Must be a number } }"),
            "z.number({ message: 'Must be a number' }).optional()"
        );
    }

    #[test]
    fn test_regex_is_emitted_as_escaped_literal() {
        assert_eq!(
            chain(r#"{ regex: "^\\d+'$", required: true }"#),
            r"z.string().regex(new RegExp('^\\d+\'$')).min(1)"
        );
    }

    #[test]
    fn test_nested_chains() {
        assert_eq!(
            chain("{ type: array, nonempty: true, item: { type: number, required: true } }"),
            "z.array(z.number()).nonempty().optional()"
        );
        assert_eq!(
            chain("{ type: object, required: true, properties: { zip: { required: true } } }"),
            "z.object({\n    zip: z.string().min(1),\n  })"
        );
    }

    #[test]
    fn test_ruleset_file() {
        let actions: IndexMap<String, ActionRules> = serde_yaml::from_str(
            r#"
create:
  email: { email: true, required: true, i18n: { email: user.email } }
  password: { custom: isStrongPassword, required: true }
update:
  name: { max: 50 }
"#,
        )
        .unwrap();

        let mut out = Vec::new();
        TypeScriptEmitter::default()
            .emit_ruleset(&mut out, &ruleset_ir("User", &actions))
            .unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.starts_with(
            "import { z } from 'zod'\nimport { t } from '@/i18n'\nimport * as validators from '@/validators'\n"
        ));
        assert!(output.contains("export const userCreateSchema = z.object({\n"));
        assert!(output.contains("  password: z.string().refine(validators.isStrongPassword).refine(v => v == null || v.length >= 1),\n"));
        assert!(output.contains("export type UserCreateForm = z.infer<typeof userCreateSchema>\n"));
        assert!(output.contains("export const userUpdateSchema = z.object({\n  name: z.string().max(50).optional(),\n})\n"));
    }
}
