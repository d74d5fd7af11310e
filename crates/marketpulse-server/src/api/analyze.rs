use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use marketpulse_sentiment::AnalysisReport;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    /// Missing and blank topics are both rejected by request validation.
    #[serde(default)]
    pub topic: String,
    #[serde(default, alias = "num_articles")]
    pub count: Option<i64>,
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        let error = ApiError::new(req_id.0.clone(), "invalid_input", rejection.body_text());
        match rejected_field(&rejection) {
            Some(field) => error.with_field(field),
            None => error,
        }
    })?;

    let count = body
        .count
        .map(usize::try_from)
        .transpose()
        .map_err(|_| {
            ApiError::new(req_id.0.clone(), "invalid_input", "invalid count: must be at least 1")
                .with_field("count")
        })?;

    let report = state
        .service
        .analyze(&body.topic, count)
        .await
        .map_err(|e| ApiError::from_sentiment(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Request field named in a body that parsed as JSON but had the wrong shape.
///
/// The data-error text is prefixed with the failing path, e.g.
/// `topic: invalid type: integer 4, expected a string`.
fn rejected_field(rejection: &JsonRejection) -> Option<&'static str> {
    let JsonRejection::JsonDataError(err) = rejection else {
        return None;
    };
    let text = err.body_text();
    if text.contains("topic") {
        Some("topic")
    } else if text.contains("count") || text.contains("num_articles") {
        Some("count")
    } else {
        None
    }
}
