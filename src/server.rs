use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::classifier::ClassifierKind;
use crate::config::Config;
use crate::error::PlanError;
use crate::planner::PlanResult;
use crate::projection::{project, Projection, ProjectionRequest};
use crate::reference::loader::load_reference;
use crate::reference::ReferenceData;
use crate::types::PlanRequest;

#[derive(Clone)]
struct ApiState {
    config: Config,
    reference: Arc<ReferenceData>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
    status: &'static str,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    tag: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(error: &PlanError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            tag: error.status().as_tag(),
            message: error.message().to_string(),
        }
    }

    fn rejected(rejection: JsonRejection) -> Self {
        warn!("malformed request body: {}", rejection.body_text());
        Self::bad_request(&PlanError::data(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
            status: self.tag,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Default, Deserialize)]
struct PlanApiRequest {
    #[serde(flatten)]
    request: PlanRequest,
    strategy: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    templates: usize,
    fingerprint: String,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let reference = load_reference(&config.data)?;
    info!(fingerprint = %reference.fingerprint(), "reference snapshot ready");
    let state = ApiState {
        config,
        reference: Arc::new(reference),
    };

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/plan", post(plan))
        .route("/api/projection", post(projection))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        templates: state.reference.templates.len(),
        fingerprint: state.reference.fingerprint(),
    })
}

async fn plan(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<PlanApiRequest>, JsonRejection>,
) -> ApiResult<PlanResult> {
    let Json(body) = payload.map_err(ApiError::rejected)?;
    let (profile, goal) = body.request.validate().map_err(|e| {
        warn!("rejected plan request: {e}");
        ApiError::bad_request(&e)
    })?;

    let result = match body.strategy.as_deref() {
        Some(raw) => {
            let kind = ClassifierKind::from_str(raw)
                .map_err(|e| ApiError::bad_request(&PlanError::data(e.to_string())))?;
            state.reference.plan_with(kind, &profile, &goal)
        }
        None => state.reference.create_plan(&profile, &goal),
    };
    info!(status = %result.status.as_tag(), "plan request served");
    Ok(ok(result))
}

async fn projection(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<ProjectionRequest>, JsonRejection>,
) -> ApiResult<Projection> {
    let Json(request) = payload.map_err(ApiError::rejected)?;
    let projection = project(&request, state.config.projection.default_poly_degree)
        .map_err(|e| ApiError::bad_request(&e))?;
    Ok(ok(projection))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanStatus;
    use crate::testing::{sample_bundle, sample_minimums, sample_request, sample_templates};
    use axum::extract::FromRequest;
    use tokio_test::block_on;

    fn state() -> ApiState {
        ApiState {
            config: Config::default(),
            reference: Arc::new(ReferenceData::new(
                sample_templates(),
                sample_minimums(),
                sample_bundle(),
            )),
        }
    }

    #[test]
    fn health_reports_snapshot() {
        let Json(response) = block_on(health(State(state())));
        assert!(response.ok);
        assert_eq!(response.data.status, "ok");
        assert_eq!(response.data.fingerprint.len(), 64);
        assert_eq!(response.data.templates, sample_templates().len());
    }

    #[test]
    fn plan_endpoint_returns_engine_outcome() {
        let body = PlanApiRequest {
            request: sample_request(),
            strategy: None,
        };
        let Json(response) = block_on(plan(State(state()), Ok(Json(body)))).expect("served");
        assert!(response.ok);
        assert_eq!(response.data.status, PlanStatus::Success);
        assert!(response.data.months_to_goal.is_some());
    }

    #[test]
    fn plan_endpoint_honours_strategy() {
        let body = PlanApiRequest {
            request: sample_request(),
            strategy: Some("rules".to_string()),
        };
        let Json(response) = block_on(plan(State(state()), Ok(Json(body)))).expect("served");
        assert_eq!(response.data.strategy, Some(ClassifierKind::Rule));
    }

    #[test]
    fn invalid_plan_request_is_bad_request() {
        let mut request = sample_request();
        request.income = None;
        let body = PlanApiRequest {
            request,
            strategy: None,
        };
        let err = block_on(plan(State(state()), Ok(Json(body)))).expect_err("must reject");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.tag, "data_error");
        assert!(err.message.contains("income"));
    }

    #[test]
    fn unknown_strategy_is_bad_request() {
        let body = PlanApiRequest {
            request: sample_request(),
            strategy: Some("oracle".to_string()),
        };
        let err = block_on(plan(State(state()), Ok(Json(body)))).expect_err("must reject");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn projection_endpoint_validates_lengths() {
        let request = ProjectionRequest {
            months: vec![1.0, 2.0, 3.0],
            progress: vec![10.0, 20.0],
            duration: 5,
            poly_degree: None,
        };
        let err = block_on(projection(State(state()), Ok(Json(request)))).expect_err("must reject");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Length of 'months' and 'progress' must match.");
    }

    #[test]
    fn projection_endpoint_projects() {
        let request = ProjectionRequest {
            months: vec![1.0, 2.0, 3.0],
            progress: vec![10.0, 20.0, 30.0],
            duration: 4,
            poly_degree: None,
        };
        let Json(response) =
            block_on(projection(State(state()), Ok(Json(request)))).expect("projected");
        assert_eq!(response.data.all_months.len(), 5);
    }

    #[test]
    fn plan_request_accepts_flat_json() {
        let body: PlanApiRequest = serde_json::from_str(
            r#"{"income": 3000, "last_saving": 0, "goal": 2000, "duration": 24,
                "goal_name": "Trip", "strategy": "dt",
                "expenses": [{"type": "housing", "expense": 900}]}"#,
        )
        .expect("parse");
        assert_eq!(body.strategy.as_deref(), Some("dt"));
        assert_eq!(body.request.income, Some(3000.0));
        assert_eq!(body.request.expenses.map(|e| e.len()), Some(1));
    }

    fn extract<T: serde::de::DeserializeOwned + Send>(
        raw: &'static str,
    ) -> std::result::Result<Json<T>, JsonRejection> {
        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(raw))
            .expect("request");
        block_on(<Json<T> as FromRequest<()>>::from_request(request, &()))
    }

    #[test]
    fn mistyped_plan_body_is_a_data_error() {
        let payload = extract::<PlanApiRequest>(
            r#"{"income": "lots", "last_saving": 0, "expenses": "none",
                "goal": 2000, "duration": 24, "goal_name": "Trip"}"#,
        );
        assert!(payload.is_err());
        let err = block_on(plan(State(state()), payload)).expect_err("must reject");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.tag, "data_error");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn mistyped_projection_body_is_a_data_error() {
        let payload = extract::<ProjectionRequest>(
            r#"{"months": "1,2,3", "progress": [1, 2, 3], "duration": 4}"#,
        );
        let err = block_on(projection(State(state()), payload)).expect_err("must reject");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.tag, "data_error");
    }
}
