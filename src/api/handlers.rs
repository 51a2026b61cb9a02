//! HTTP handlers for the dashboard page and the JSON API
//!
//! These handlers use the shared DashboardService.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::FormRejection, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::service::DashboardService;
use crate::dashboard::Interaction;
use crate::error::{FormError, MalformedUpload};
use crate::features::FeatureImportance;
use crate::kpi::Kpis;
use crate::models::{DeliveryStatus, Dimension, DimensionMetric};
use crate::predict::{predict_late, BatchPrediction, ManualOrderForm};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub loaded_at: String,
    pub datasets: BTreeMap<String, String>,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub dimension: Dimension,
    pub label_column: &'static str,
    pub rows: Vec<DimensionMetric>,
}

#[derive(Serialize)]
pub struct FeaturesResponse {
    pub available: bool,
    pub features: Vec<FeatureImportance>,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub predicted_late: bool,
    pub status: DeliveryStatus,
    pub verdict: &'static str,
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub columns: Vec<String>,
    /// Positional rows aligned with `columns`, so duplicate headers survive
    pub rows: Vec<Vec<String>>,
    pub kpis: Kpis,
    pub summary: String,
}

impl From<BatchPrediction> for BatchResponse {
    fn from(batch: BatchPrediction) -> Self {
        Self {
            columns: batch.output_columns(),
            rows: batch.output_rows().collect(),
            kpis: batch.kpis,
            summary: batch.summary_line(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (status, Json(ErrorResponse { error: error.to_string() }))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct PredictRequest {
    pub scheduled: i64,
    pub actual: i64,
}

// ============================================================================
// Page Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;

/// GET /
pub async fn index(State(service): State<AppState>) -> Html<String> {
    Html(service.render(&Interaction::View))
}

/// POST /upload
pub async fn upload(
    State(service): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let outcome = match multipart {
        Ok(mut multipart) => match read_upload(&mut multipart).await {
            Ok(bytes) => service.predict_upload(&bytes),
            Err(e) => Err(e),
        },
        Err(rejection) => Err(MalformedUpload::Transfer(rejection.body_text())),
    };
    Html(service.render(&Interaction::Upload(outcome)))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, MalformedUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MalformedUpload::Transfer(e.body_text()))?
    {
        if field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map_err(|e| MalformedUpload::Transfer(e.body_text()));
        }
    }
    Err(MalformedUpload::NoFile)
}

/// POST /predict
pub async fn predict_manual(
    State(service): State<AppState>,
    form: Result<Form<ManualOrderForm>, FormRejection>,
) -> Html<String> {
    let interaction = match form {
        Ok(Form(form)) => {
            let outcome = service.predict_manual(&form);
            Interaction::Manual { form, outcome }
        }
        Err(rejection) => Interaction::Manual {
            form: ManualOrderForm::default(),
            outcome: Err(FormError::Rejected(rejection.body_text())),
        },
    };
    Html(service.render(&interaction))
}

// ============================================================================
// JSON Handlers
// ============================================================================

/// GET /api/v1/health
pub async fn health(State(service): State<AppState>) -> impl IntoResponse {
    let report = service.health();
    let status = if report.all_loaded() { "ok" } else { "degraded" };
    Json(HealthResponse {
        status,
        loaded_at: report.loaded_at.to_rfc3339(),
        datasets: report
            .datasets
            .into_iter()
            .map(|(name, reason)| (name, reason.unwrap_or_else(|| "ok".to_string())))
            .collect(),
    })
}

/// GET /api/v1/kpis
pub async fn get_kpis(State(service): State<AppState>) -> Result<Json<Kpis>, ApiError> {
    service
        .kpis()
        .map(Json)
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e))
}

/// GET /api/v1/metrics/:dimension
pub async fn get_metrics(
    State(service): State<AppState>,
    Path(dimension): Path<String>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let dimension: Dimension = dimension
        .parse()
        .map_err(|e: String| api_error(StatusCode::NOT_FOUND, e))?;
    let table = service
        .table(dimension)
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, e))?;

    Ok(Json(MetricsResponse {
        dimension,
        label_column: dimension.label_column(),
        rows: table.sorted_by_late_percent().into_iter().cloned().collect(),
    }))
}

/// GET /api/v1/features
pub async fn get_features(State(service): State<AppState>) -> Json<FeaturesResponse> {
    let features = match service.features() {
        crate::features::FeatureImportanceView::Available(features) => features.clone(),
        crate::features::FeatureImportanceView::Unavailable(_) => Vec::new(),
    };
    Json(FeaturesResponse {
        available: service.features().is_available(),
        features,
    })
}

/// POST /api/v1/predict
pub async fn predict(Json(req): Json<PredictRequest>) -> Json<PredictResponse> {
    let status = DeliveryStatus::from_late(predict_late(req.scheduled, req.actual));
    Json(PredictResponse {
        predicted_late: status.is_late(),
        status,
        verdict: status.verdict(),
    })
}

/// POST /api/v1/predict/batch
pub async fn predict_batch(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<Json<BatchResponse>, ApiError> {
    service
        .predict_upload(&body)
        .map(|batch| Json(BatchResponse::from(batch)))
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))
}
