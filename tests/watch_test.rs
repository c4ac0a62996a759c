//! Integration tests for change-scoped regeneration and the editor bridge

use mapforge::bridge::{read_editor_state, replace_schema_document, BridgeState};
use mapforge::{
    ensure_schema_document_exists, ChangeCallback, DocumentKind, DocumentWatch,
    GenerationOptions, Generator, InMemorySnapshotStore, NoOpFormatter,
};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const TWO_MODELS: &str = "A:\n  type: model\n  mappings:\n    id: { type: string }\nB:\n  type: model\n  mappings:\n    id: { type: string }\n";

#[test]
fn test_only_changed_model_is_regenerated() {
    let tmp = TempDir::new().unwrap();
    let schema = tmp.path().join("schema.tw");
    fs::write(&schema, TWO_MODELS).unwrap();

    let generator = Generator::new().with_formatter(NoOpFormatter);
    generator
        .generate_entities_and_transfer_objects(tmp.path(), &schema, &GenerationOptions::default())
        .unwrap();
    let a_path = tmp.path().join("a/a.model.ts");
    let b_path = tmp.path().join("b/b.model.ts");
    fs::write(&a_path, "// untouched").unwrap();

    let watch = DocumentWatch::new(
        DocumentKind::Schema,
        tmp.path(),
        &schema,
        generator,
        Arc::new(InMemorySnapshotStore::default()),
    );
    watch.seed();

    fs::write(&schema, TWO_MODELS.replace("B:\n  type: model\n  mappings:\n    id: { type: string }", "B:\n  type: model\n  mappings:\n    id: { type: number }")).unwrap();
    let changes = watch.handle_change().unwrap();

    assert_eq!(changes.iter().collect::<Vec<_>>(), vec!["B"]);
    assert_eq!(fs::read_to_string(&a_path).unwrap(), "// untouched");
    assert!(fs::read_to_string(&b_path).unwrap().contains("id?: number"));
}

#[test]
fn test_editor_save_feeds_the_watcher() {
    let tmp = TempDir::new().unwrap();
    let mappers = tmp.path().join("mappers");
    let schema_path = ensure_schema_document_exists(&mappers).unwrap();

    let calls: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let on_change: ChangeCallback = Arc::new(move |names| sink.lock().unwrap().push(names));

    let watch = DocumentWatch::new(
        DocumentKind::Schema,
        &mappers,
        &schema_path,
        Generator::new().with_formatter(NoOpFormatter),
        Arc::new(InMemorySnapshotStore::default()),
    )
    .with_on_change(Some(on_change));
    watch.seed();

    let state = BridgeState {
        project_path: tmp.path().to_path_buf(),
        schema_path: schema_path.clone(),
        form_path: mappers.join("form.tw"),
    };
    replace_schema_document(
        &state,
        &serde_json::json!({
            "Invoice": { "type": "model", "mappings": { "total": { "type": "number" } } }
        }),
    )
    .unwrap();

    watch.handle_change().unwrap();
    assert_eq!(*calls.lock().unwrap(), vec![vec!["Invoice".to_string()]]);

    let editor = read_editor_state(&state);
    let models = editor.schema.unwrap();
    assert_eq!(models["Invoice"].mappings["total"].field_type, "number");
}
