use axum::{
    Form, Json, Router,
    extract::{FromRequest, Path, Request, State, rejection::PathRejection},
    http::{StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Duration;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::downloader::{self, ExportError};
use crate::entry::{Entry, EntryForm};
use crate::labels;
use crate::login::{self, AccessGate, AuthError, SessionStore};
use crate::store::{Ordering, RecordStore, StoreError};
use crate::validator::{self, ValidationError};

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub gate: AccessGate,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, gate: AccessGate, session_lifetime: Duration) -> Self {
        AppState {
            store,
            gate,
            sessions: SessionStore::new(session_lifetime),
        }
    }
}

/// Notification handed to the page, which decides how to show it
#[derive(Debug, Serialize)]
pub struct Notice {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl Notice {
    pub fn ok(code: &'static str, message: impl Into<String>) -> Self {
        Notice {
            status: "ok",
            code,
            message: message.into(),
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Notice {
            status: "error",
            code,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct EntriesResponse {
    ordering: Ordering,
    entries: Vec<Entry>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("{}", labels::NOT_FOUND)]
    NotFound,

    #[error("{}", labels::UNAUTHORIZED)]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, notice) = match &self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, Notice::error(e.code(), e.to_string())),
            AppError::Store(e) => {
                error!("Store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Notice::error("store_failed", labels::SAVE_FAILED),
                )
            }
            AppError::Export(ExportError::Empty) => (
                StatusCode::BAD_REQUEST,
                Notice::error("nothing_to_export", labels::NOTHING_TO_EXPORT),
            ),
            AppError::Export(e) => {
                error!("Export failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Notice::error("export_failed", labels::EXPORT_FAILED),
                )
            }
            AppError::Auth(AuthError::WrongPassword) => (
                StatusCode::UNAUTHORIZED,
                Notice::error("wrong_password", labels::WRONG_PASSWORD),
            ),
            AppError::Auth(e) => {
                error!("Access gate failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Notice::error("auth_failed", labels::UNAUTHORIZED),
                )
            }
            AppError::MalformedBody(reason) => {
                warn!("Malformed submission: {}", reason);
                (
                    StatusCode::BAD_REQUEST,
                    Notice::error("malformed_body", labels::SAVE_FAILED),
                )
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, Notice::error("not_found", labels::NOT_FOUND)),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Notice::error("unauthorized", labels::UNAUTHORIZED),
            ),
        };

        (status, Json(notice)).into_response()
    }
}

/// Build the router over a prepared state
///
/// The data page, list, view and export routes sit behind the access gate;
/// the form, its submit endpoint and the login routes are public.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/data", get(serve_data_page))
        .route("/api/entries", get(list_entries))
        .route("/api/entries/:position", get(get_entry))
        .route("/api/export/xlsx", get(export_xlsx))
        .route("/api/export/csv", get(export_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), login::require_auth));

    Router::new()
        .route("/", get(serve_form))
        .route("/api/entries", post(submit_entry))
        .route("/login", get(login::serve_login_page))
        .route("/api/login", post(login::handle_login))
        .route("/api/logout", post(login::handle_logout))
        .merge(protected)
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = config.open_store()?;
    let gate = AccessGate::new(&config.secret)?;

    // Setup app state
    let app_state = Arc::new(AppState::new(
        store,
        gate,
        Duration::hours(i64::from(config.session_hours)),
    ));

    let app = router(app_state);

    // Start server
    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_form() -> Html<&'static str> {
    Html(include_str!("./static/form.html"))
}

async fn serve_data_page() -> Html<&'static str> {
    Html(include_str!("./static/data.html"))
}

/// Read the submitted candidate as an urlencoded form or as JSON, by Content-Type
async fn read_entry_form(request: Request) -> Result<EntryForm, AppError> {
    let urlencoded = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if urlencoded {
        let Form(form) = Form::<EntryForm>::from_request(request, &())
            .await
            .map_err(|e| AppError::MalformedBody(e.body_text()))?;
        Ok(form)
    } else {
        let Json(form) = Json::<EntryForm>::from_request(request, &())
            .await
            .map_err(|e| AppError::MalformedBody(e.body_text()))?;
        Ok(form)
    }
}

async fn submit_entry(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Notice>), AppError> {
    let form = read_entry_form(request).await?;
    let entry = match validator::validate(&form.sanitized()) {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Rejected submission: {}", e.code());
            return Err(e.into());
        }
    };

    state.store.append(entry)?;
    info!("Stored a new registration");

    Ok((StatusCode::CREATED, Json(Notice::ok("saved", labels::SAVED))))
}

async fn list_entries(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let entries = state.store.list_all()?;

    Ok(Json(EntriesResponse {
        ordering: state.store.ordering(),
        entries,
    }))
}

async fn get_entry(
    position: Result<Path<usize>, PathRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Entry>, AppError> {
    // A position that is not a number names no entry
    let Ok(Path(position)) = position else {
        return Err(AppError::NotFound);
    };

    state
        .store
        .get(position)?
        .map(Json)
        .ok_or(AppError::NotFound)
}

async fn export_xlsx(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let entries = state.store.list_all()?;
    let buffer = downloader::to_xlsx(&entries)?;

    Ok(attachment(
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        labels::EXPORT_FILE_NAME,
        "registrations.xlsx",
        buffer,
    ))
}

async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let entries = state.store.list_all()?;
    let csv = downloader::to_csv(&entries)?;

    Ok(attachment(
        "text/csv; charset=utf-8",
        labels::EXPORT_CSV_FILE_NAME,
        "registrations.csv",
        csv.into_bytes(),
    ))
}

// Download response; `fallback` is the ASCII name for clients without RFC 5987 support
fn attachment(content_type: &'static str, file_name: &str, fallback: &str, body: Vec<u8>) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
