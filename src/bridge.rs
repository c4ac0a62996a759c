//! Remote editor bridge.
//!
//! A visual schema editor reads the current models and the resolved document
//! paths, and writes back a full replacement schema. Writing goes through the
//! same file the watchers observe, so a save from the editor regenerates
//! exactly like a manual edit.

use crate::codegen::fs_utils;
use crate::codegen::scaffold::{render_with_header, SCHEMA_HEADER};
use crate::codegen::types::{FieldMapping, Relationship};
use crate::codegen::yaml_loader::{load_schema, schema_from_value};
use crate::error::{MapperError, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Paths the bridge serves
#[derive(Debug, Clone)]
pub struct BridgeState {
    pub project_path: PathBuf,
    pub schema_path: PathBuf,
    pub form_path: PathBuf,
}

/// Response of `GET /api/schema`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub project_path: PathBuf,
    pub schema_path: PathBuf,
    pub form_path: PathBuf,
    /// Model entries only; `None` when the schema cannot be read
    pub schema: Option<IndexMap<String, EditorModel>>,
}

#[derive(Debug, Serialize)]
pub struct EditorModel {
    pub mappings: IndexMap<String, FieldMapping>,
    pub relationships: IndexMap<String, Relationship>,
}

/// Body of `PUT /api/schema`
#[derive(Debug, Deserialize)]
pub struct ReplaceSchemaRequest {
    pub schema: serde_json::Value,
}

/// Read the schema for the editor, keeping only model entries
pub fn read_editor_state(state: &BridgeState) -> EditorState {
    let schema = match load_schema(&state.schema_path) {
        Ok(document) => Some(
            document
                .models()
                .map(|(name, model)| {
                    (
                        name.to_string(),
                        EditorModel {
                            mappings: model.mappings.clone(),
                            relationships: model.relationships.clone(),
                        },
                    )
                })
                .collect(),
        ),
        Err(e) => {
            tracing::error!("Error reading schema file: {}", e);
            None
        }
    };

    EditorState {
        project_path: state.project_path.clone(),
        schema_path: state.schema_path.clone(),
        form_path: state.form_path.clone(),
        schema,
    }
}

/// Overwrite the schema document with `schema`, under the canonical header.
///
/// The replacement must have the shape of a schema document; referential
/// checks are left to the next generation run.
pub fn replace_schema_document(state: &BridgeState, schema: &serde_json::Value) -> Result<()> {
    let document = serde_yaml::to_value(schema)
        .map_err(|e| MapperError::malformed(&state.schema_path, e.to_string()))?;
    schema_from_value(&state.schema_path, document.clone())?;

    let content = render_with_header(SCHEMA_HEADER, &document)?;
    fs_utils::write_file(&state.schema_path, content)
        .map_err(|e| MapperError::write(&state.schema_path, e))?;

    tracing::info!("Schema saved to {}", state.schema_path.display());
    Ok(())
}

/// Build the bridge router
pub fn router(state: BridgeState) -> Router {
    Router::new()
        .route("/api/schema", get(get_schema).put(put_schema))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn get_schema(State(state): State<Arc<BridgeState>>) -> Json<EditorState> {
    Json(read_editor_state(&state))
}

async fn put_schema(
    State(state): State<Arc<BridgeState>>,
    Json(request): Json<ReplaceSchemaRequest>,
) -> std::result::Result<Json<serde_json::Value>, BridgeError> {
    replace_schema_document(&state, &request.schema)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mapforge-editor",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Error handling

#[derive(Debug)]
pub enum BridgeError {
    ValidationError(String),
    InternalError(String),
}

impl From<MapperError> for BridgeError {
    fn from(e: MapperError) -> Self {
        match e {
            MapperError::MalformedSchemaShape { .. } => BridgeError::ValidationError(e.to_string()),
            other => BridgeError::InternalError(format!("Failed to save schema: {}", other)),
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            BridgeError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            BridgeError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        tracing::error!("{}", message);
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn state(tmp: &TempDir) -> BridgeState {
        BridgeState {
            project_path: tmp.path().to_path_buf(),
            schema_path: tmp.path().join("mappers/schema.tw"),
            form_path: tmp.path().join("mappers/form.tw"),
        }
    }

    #[test]
    fn test_get_lists_models_only() {
        let tmp = TempDir::new().unwrap();
        let state = state(&tmp);
        fs::create_dir_all(tmp.path().join("mappers")).unwrap();
        fs::write(
            &state.schema_path,
            "User:\n  type: model\n  mappings:\n    id: { type: string }\nSettings:\n  type: config\n",
        )
        .unwrap();

        let editor = read_editor_state(&state);
        let schema = editor.schema.unwrap();
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["User"]);
        assert!(schema["User"].relationships.is_empty());

        let json = serde_json::to_value(read_editor_state(&state)).unwrap();
        assert!(json.get("schemaPath").is_some());
        assert!(json["schema"]["User"]["relationships"].is_object());
    }

    #[test]
    fn test_get_without_schema_returns_null() {
        let tmp = TempDir::new().unwrap();
        let editor = read_editor_state(&state(&tmp));
        assert!(editor.schema.is_none());
    }

    #[test]
    fn test_put_writes_header_and_document() {
        let tmp = TempDir::new().unwrap();
        let state = state(&tmp);
        let schema = serde_json::json!({
            "User": { "type": "model", "mappings": { "id": { "type": "string", "required": true } } }
        });

        replace_schema_document(&state, &schema).unwrap();

        let content = fs::read_to_string(&state.schema_path).unwrap();
        assert!(content.starts_with(SCHEMA_HEADER));
        let document = load_schema(&state.schema_path).unwrap();
        assert!(document.model("User").unwrap().mappings["id"].required);
    }

    #[test]
    fn test_put_rejects_malformed_document() {
        let tmp = TempDir::new().unwrap();
        let state = state(&tmp);

        let err = replace_schema_document(&state, &serde_json::json!(["not", "a", "mapping"])).unwrap_err();
        assert!(matches!(err, MapperError::MalformedSchemaShape { .. }));
        assert!(!state.schema_path.exists());
    }

    #[tokio::test]
    async fn test_put_rejects_model_names_outside_the_project() {
        let tmp = TempDir::new().unwrap();
        let state = Arc::new(state(&tmp));
        let request = ReplaceSchemaRequest {
            schema: serde_json::json!({
                "../../escaped": { "type": "model", "mappings": { "id": { "type": "string" } } }
            }),
        };

        let err = put_schema(State(state.clone()), Json(request)).await.unwrap_err();
        assert!(matches!(err, BridgeError::ValidationError(ref msg) if msg.contains("../../escaped")));
        assert!(!state.schema_path.exists());
    }

    #[tokio::test]
    async fn test_put_handler_reports_success() {
        let tmp = TempDir::new().unwrap();
        let state = Arc::new(state(&tmp));
        let request = ReplaceSchemaRequest {
            schema: serde_json::json!({ "Post": { "type": "model", "mappings": {} } }),
        };

        let Json(body) = put_schema(State(state.clone()), Json(request)).await.unwrap();
        assert_eq!(body["success"], true);
        assert!(state.schema_path.is_file());
    }
}
