use axum::{extract::State, Extension, Json};
use stockcheck_core::{BatchRequest, BatchResponse};

use crate::middleware::RequestId;

use super::AppState;

/// Runs every item in order. A bad item yields an inline `ok: false`
/// record and never aborts the batch.
pub(super) async fn check_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchResponse> {
    let results = state.checker.check_batch(request.items).await;

    let failed = results.iter().filter(|r| !r.result.ok).count();
    tracing::info!(
        request_id = %req_id.0,
        count = results.len(),
        failed,
        "check_batch handled"
    );

    Json(BatchResponse::from(results))
}
