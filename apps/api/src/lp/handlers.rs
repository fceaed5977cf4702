//! Axum route handlers for the LP content API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::lp::document::ContentDocument;
use crate::lp::legacy::LegacySettings;
use crate::lp::manager::{EditOutcome, SectionManager};
use crate::lp::patch::{GlobalSettingsPatch, SectionPatch};
use crate::lp::registry::{all_types, SectionKind, SectionTypeDescriptor};
use crate::lp::store::{load_document, save_document};
use crate::lp::templates::{all_templates, Template};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub document: ContentDocument,
    pub record: LegacySettings,
}

/// One editing step, applied in request order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    Add {
        #[serde(rename = "sectionType")]
        kind: SectionKind,
    },
    Duplicate {
        id: String,
    },
    Delete {
        id: String,
        #[serde(default)]
        confirmed: bool,
    },
    ToggleVisibility {
        id: String,
    },
    Edit {
        id: String,
        patch: SectionPatch,
    },
    Move {
        id: String,
        #[serde(rename = "toIndex")]
        to_index: usize,
    },
    Reorder,
    ApplyTemplate {
        #[serde(rename = "templateId")]
        template_id: String,
        #[serde(default)]
        confirmed: bool,
    },
    UpdateGlobalSettings {
        patch: GlobalSettingsPatch,
    },
}

#[derive(Debug, Deserialize)]
pub struct OperationsRequest {
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Applied,
    Rejected,
    RequiresConfirmation,
}

#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub index: usize,
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationResult {
    fn from_outcome(index: usize, outcome: EditOutcome) -> Self {
        match outcome {
            EditOutcome::Applied => OperationResult {
                index,
                status: OperationStatus::Applied,
                code: None,
                message: None,
            },
            EditOutcome::Rejected(rejection) => OperationResult {
                index,
                status: OperationStatus::Rejected,
                code: Some(rejection.code()),
                message: Some(rejection.to_string()),
            },
            EditOutcome::RequiresConfirmation => OperationResult {
                index,
                status: OperationStatus::RequiresConfirmation,
                code: None,
                message: Some("Resend with confirmed = true to proceed".to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OperationsResponse {
    pub results: Vec<OperationResult>,
    pub saved: bool,
    pub document: ContentDocument,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/lp/section-types
pub async fn handle_section_types() -> Json<Vec<SectionTypeDescriptor>> {
    Json(all_types().to_vec())
}

/// GET /api/v1/lp/templates
pub async fn handle_templates() -> Json<&'static [Template]> {
    Json(all_templates())
}

/// GET /api/v1/lp/:company_id/:job_id
///
/// Loads the persisted record and migrates it to the current schema.
/// A job without a record gets the fresh six-section document.
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path((company_id, job_id)): Path<(String, String)>,
) -> Result<Json<ContentDocument>, AppError> {
    let doc = load_document(state.store.as_ref(), &company_id, &job_id).await?;
    Ok(Json(doc))
}

/// PUT /api/v1/lp/:company_id/:job_id
///
/// Persists a current-schema document plus its legacy projection.
pub async fn handle_put_document(
    State(state): State<AppState>,
    Path((company_id, job_id)): Path<(String, String)>,
    Json(doc): Json<ContentDocument>,
) -> Result<Json<SaveResponse>, AppError> {
    if !doc.is_current() {
        return Err(AppError::Validation(format!(
            "Unsupported LP content version '{}'",
            doc.version
        )));
    }
    let record = save_document(state.store.as_ref(), &company_id, &job_id, &doc).await?;
    Ok(Json(SaveResponse {
        document: doc,
        record,
    }))
}

/// POST /api/v1/lp/:company_id/:job_id/operations
///
/// Loads the document into a fresh editing session, applies every operation
/// in order and saves once if anything changed.
pub async fn handle_operations(
    State(state): State<AppState>,
    Path((company_id, job_id)): Path<(String, String)>,
    Json(request): Json<OperationsRequest>,
) -> Result<Json<OperationsResponse>, AppError> {
    if request.operations.is_empty() {
        return Err(AppError::Validation("operations cannot be empty".to_string()));
    }

    let record = state.store.get(&company_id, &job_id).await?;
    let mut manager = SectionManager::new();
    manager.load(record.as_ref());

    let results: Vec<OperationResult> = request
        .operations
        .into_iter()
        .enumerate()
        .map(|(index, op)| OperationResult::from_outcome(index, apply_operation(&mut manager, op)))
        .collect();

    let document = manager.get_current_document();
    let saved = results
        .iter()
        .any(|r| r.status == OperationStatus::Applied);
    if saved {
        save_document(state.store.as_ref(), &company_id, &job_id, &document).await?;
    }
    info!(
        "Applied {} operations to LP for company {company_id} job {job_id} (saved: {saved})",
        results.len()
    );

    Ok(Json(OperationsResponse {
        results,
        saved,
        document,
    }))
}

fn apply_operation(manager: &mut SectionManager, op: Operation) -> EditOutcome {
    match op {
        Operation::Add { kind } => manager.add_section(kind),
        Operation::Duplicate { id } => manager.duplicate_section(&id),
        Operation::Delete { id, confirmed } => manager.delete_section(&id, confirmed),
        Operation::ToggleVisibility { id } => manager.toggle_visibility(&id),
        Operation::Edit { id, patch } => manager.edit_section(&id, patch),
        Operation::Move { id, to_index } => manager.move_section(&id, to_index),
        Operation::Reorder => {
            manager.reorder();
            EditOutcome::Applied
        }
        Operation::ApplyTemplate {
            template_id,
            confirmed,
        } => manager.apply_template(&template_id, confirmed),
        Operation::UpdateGlobalSettings { patch } => manager.update_global_settings(patch),
    }
}
