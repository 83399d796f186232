use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
};
use platform_api::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult, internal_error};
use platform_db::{self, DbPool};
use products_hr::{
    Employee, EmployeeService, HrError, NewEmployee, SeaOrmEmployeeStore, StoreError,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;

pub type Employees = EmployeeService<SeaOrmEmployeeStore>;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub employees: Employees,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Arc<AppConfig>) -> Self {
        let store = Arc::new(SeaOrmEmployeeStore::new(pool.clone()));
        Self {
            pool,
            employees: EmployeeService::new(store),
            config,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "employee server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/employees",
            get(list_employees).post(create_employee),
        )
        .route("/api/employees/search", get(search_employees))
        .route(
            "/api/employees/{id}",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

fn hr_error(err: HrError) -> ApiError {
    match err {
        HrError::DuplicateResource { email } | HrError::Store(StoreError::Conflict(email)) => {
            ApiError::Conflict(HrError::duplicate(email).to_string())
        }
        HrError::Store(StoreError::NotFound(_)) => ApiError::NotFound,
        err @ HrError::Store(StoreError::Database(_)) => internal_error(err),
    }
}

async fn create_employee(
    State(state): State<AppState>,
    ApiJson(employee): ApiJson<NewEmployee>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let saved = state.employees.create(employee).await.map_err(hr_error)?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<Employee>>> {
    let employees = state.employees.list_all().await.map_err(hr_error)?;
    Ok(Json(employees))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameQuery {
    first_name: String,
    last_name: String,
}

async fn search_employees(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    let employees = state
        .employees
        .find_by_name(&query.first_name, &query.last_name)
        .await
        .map_err(hr_error)?;
    Ok(Json(employees))
}

async fn get_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Employee>> {
    state
        .employees
        .get_by_id(id)
        .await
        .map_err(hr_error)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn update_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(employee): ApiJson<NewEmployee>,
) -> ApiResult<Json<Employee>> {
    let updated = state
        .employees
        .update(employee.with_id(id))
        .await
        .map_err(hr_error)?;
    Ok(Json(updated))
}

async fn delete_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.employees.delete_by_id(id).await.map_err(hr_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = platform_db::ping(&state.pool).await;
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
