//! Integration tests for the schema and forms generation pipelines

use mapforge::{
    generate_entities_and_transfer_objects, generate_validation_rulesets, GenerationOptions,
    Generator, MapperError, NoOpFormatter,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BLOG_SCHEMA: &str = r#"
UserProfile:
  type: model
  mappings:
    id:
      type: string
      required: true
    street:
      type: string
      map: address.street
      required: true

Post:
  type: model
  mappings:
    title:
      type: string
  relationships:
    author:
      type: UserProfile
      map: userId
"#;

fn write_schema(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("schema.tw");
    fs::write(&path, content).unwrap();
    path
}

fn generator() -> Generator {
    Generator::new().with_formatter(NoOpFormatter)
}

fn snapshot(dir: &Path) -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(snapshot(&path));
        } else {
            files.push((path.clone(), fs::read_to_string(&path).unwrap()));
        }
    }
    files.sort();
    files
}

#[test]
fn test_dangling_relationship_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let mappers = tmp.path().join("mappers");
    fs::create_dir_all(&mappers).unwrap();
    let schema = write_schema(
        &mappers,
        "A:\n  type: model\n  mappings:\n    id: { type: string }\nB:\n  type: model\n  relationships:\n    a: { type: A }\n    c: { type: C, map: cId }\n",
    );

    let err = generator()
        .generate_entities_and_transfer_objects(&mappers, &schema, &GenerationOptions::default())
        .unwrap_err();

    match err {
        MapperError::UnresolvedRelationship { model, field, target } => {
            assert_eq!(model, "B");
            assert_eq!(field, "c");
            assert_eq!(target, "C");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!mappers.join("a").exists());
    assert!(!mappers.join("b").exists());
}

#[test]
fn test_kebab_directories_and_file_names() {
    let tmp = TempDir::new().unwrap();
    let schema = write_schema(tmp.path(), BLOG_SCHEMA);

    generate_entities_and_transfer_objects(tmp.path(), &schema, &GenerationOptions::default())
        .unwrap();

    assert!(tmp.path().join("user-profile/user-profile.model.ts").is_file());
    assert!(tmp.path().join("user-profile/user-profile.dto.ts").is_file());
    assert!(tmp.path().join("post/post.model.ts").is_file());

    let post_model = fs::read_to_string(tmp.path().join("post/post.model.ts")).unwrap();
    assert!(post_model.contains("from '../user-profile/user-profile.model'"));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let schema = write_schema(tmp.path(), BLOG_SCHEMA);
    let options = GenerationOptions::default();

    generator()
        .generate_entities_and_transfer_objects(tmp.path(), &schema, &options)
        .unwrap();
    let first = snapshot(tmp.path());

    let report = generator()
        .generate_entities_and_transfer_objects(tmp.path(), &schema, &options)
        .unwrap();
    let second = snapshot(tmp.path());

    assert_eq!(first, second);
    assert!(report.written.is_empty());
    assert_eq!(report.unchanged.len(), 4);
}

#[test]
fn test_removed_model_directory_is_deleted() {
    let tmp = TempDir::new().unwrap();
    let schema = write_schema(
        tmp.path(),
        "A:\n  type: model\n  mappings:\n    id: { type: string }\nB:\n  type: model\n  mappings:\n    id: { type: string }\n",
    );
    fs::create_dir_all(tmp.path().join("node_modules/zod")).unwrap();

    generator()
        .generate_entities_and_transfer_objects(tmp.path(), &schema, &GenerationOptions::default())
        .unwrap();
    let a_model = fs::read_to_string(tmp.path().join("a/a.model.ts")).unwrap();

    write_schema(tmp.path(), "A:\n  type: model\n  mappings:\n    id: { type: string }\n");
    let report = generator()
        .generate_entities_and_transfer_objects(tmp.path(), &schema, &GenerationOptions::default())
        .unwrap();

    assert_eq!(report.removed, vec!["b".to_string()]);
    assert!(!tmp.path().join("b").exists());
    assert_eq!(fs::read_to_string(tmp.path().join("a/a.model.ts")).unwrap(), a_model);
    assert!(tmp.path().join("node_modules/zod").is_dir());
    assert!(tmp.path().join("schema.tw").is_file());
}

#[test]
fn test_nested_mapping_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let schema = write_schema(tmp.path(), BLOG_SCHEMA);

    generator()
        .generate_entities_and_transfer_objects(
            tmp.path(),
            &schema,
            &GenerationOptions::for_models(["UserProfile"]),
        )
        .unwrap();

    let dto = fs::read_to_string(tmp.path().join("user-profile/user-profile.dto.ts")).unwrap();
    assert!(dto.contains("  address!: { street: string }\n"));
    assert!(dto.contains("      street: this.address?.street,\n"));
    assert!(!tmp.path().join("post/post.dto.ts").exists());
}

#[test]
fn test_validation_rulesets_file() {
    let tmp = TempDir::new().unwrap();
    let forms = tmp.path().join("form.tw");
    fs::write(
        &forms,
        r#"
UserProfile:
  create:
    email:
      type: string
      required: true
      email: true
      messages:
        email: Invalid email
      i18n:
        email: validation.email
    nickname:
      type: string
"#,
    )
    .unwrap();

    let report = generate_validation_rulesets(tmp.path(), &forms, &GenerationOptions::default())
        .unwrap();
    assert_eq!(report.models, vec!["UserProfile".to_string()]);

    let output = fs::read_to_string(tmp.path().join("user-profile/user-profile.form.ts")).unwrap();
    assert!(output.contains("export const userProfileCreateSchema = z.object({\n"));
    assert!(output.contains(
        "  email: z.string().email({ message: t('validation.email') }).min(1),\n"
    ));
    assert!(!output.contains("Invalid email"));
    assert!(output.contains("  nickname: z.string().optional(),\n"));
    assert!(output.contains("export type UserProfileCreateForm = z.infer<typeof userProfileCreateSchema>\n"));
}

#[test]
fn test_forms_pipeline_removes_stale_rulesets_only() {
    let tmp = TempDir::new().unwrap();
    let forms = tmp.path().join("form.tw");
    fs::create_dir_all(tmp.path().join("legacy")).unwrap();
    fs::write(tmp.path().join("legacy/legacy.form.ts"), "stale").unwrap();
    fs::write(tmp.path().join("legacy/legacy.model.ts"), "kept").unwrap();
    fs::write(&forms, "User:\n  create:\n    name: { required: true }\n").unwrap();

    let report = generate_validation_rulesets(tmp.path(), &forms, &GenerationOptions::default())
        .unwrap();

    assert_eq!(report.removed, vec!["legacy".to_string()]);
    assert!(!tmp.path().join("legacy/legacy.form.ts").exists());
    assert!(tmp.path().join("legacy/legacy.model.ts").is_file());
    assert!(tmp.path().join("user/user.form.ts").is_file());
}

#[test]
fn test_malformed_document_aborts() {
    let tmp = TempDir::new().unwrap();
    let schema = write_schema(tmp.path(), "- just\n- a list\n");

    let err = generate_entities_and_transfer_objects(tmp.path(), &schema, &GenerationOptions::default())
        .unwrap_err();
    assert!(matches!(err, MapperError::MalformedSchemaShape { .. }));
}

#[test]
fn test_model_name_cannot_leave_the_mappers_directory() {
    let tmp = TempDir::new().unwrap();
    let mappers = tmp.path().join("project/mappers");
    fs::create_dir_all(&mappers).unwrap();
    let schema = write_schema(
        &mappers,
        "\"../../escaped\":\n  type: model\n  mappings:\n    id: { type: string }\n",
    );

    let err = generator()
        .generate_entities_and_transfer_objects(&mappers, &schema, &GenerationOptions::default())
        .unwrap_err();

    assert!(matches!(err, MapperError::MalformedSchemaShape { .. }));
    assert!(!tmp.path().join("escaped").exists());
    assert_eq!(snapshot(tmp.path()).len(), 1);
}

#[test]
fn test_untyped_entries_do_not_block_generation() {
    let tmp = TempDir::new().unwrap();
    let schema = write_schema(
        tmp.path(),
        "User:\n  type: model\n  mappings:\n    id: { type: string }\nNotes:\n  description: free text\n",
    );

    let report = generator()
        .generate_entities_and_transfer_objects(tmp.path(), &schema, &GenerationOptions::default())
        .unwrap();

    assert_eq!(report.models, vec!["User".to_string()]);
    assert!(tmp.path().join("user/user.model.ts").is_file());
    assert!(!tmp.path().join("notes").exists());
}
