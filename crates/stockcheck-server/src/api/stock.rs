use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use stockcheck_core::batch::{unsupported_brand_message, MISSING_IDENTIFIER_MESSAGE};
use stockcheck_core::{is_supported_brand, StockCheckResponse, StockQuery};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CheckStockParams {
    pub brand: Option<String>,
    pub code: Option<String>,
    pub sku: Option<String>,
}

pub(super) async fn check_stock(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<CheckStockParams>,
) -> Result<Json<StockCheckResponse>, ApiError> {
    let brand = params.brand.as_deref().unwrap_or_default();
    if !is_supported_brand(brand) {
        return Err(ApiError::validation(
            req_id.0,
            unsupported_brand_message(brand),
        ));
    }

    let Some(query) = StockQuery::from_parts(params.sku.as_deref(), params.code.as_deref())
    else {
        return Err(ApiError::validation(req_id.0, MISSING_IDENTIFIER_MESSAGE));
    };

    let response = state.checker.check(&query).await;
    tracing::info!(
        request_id = %req_id.0,
        searched = %response.searched,
        ok = response.ok,
        verdict = ?response.verdict,
        "check_stock handled"
    );
    Ok(Json(response))
}
