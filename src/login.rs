#[cfg(feature = "web")]
use crate::app::{AppError, AppState, Notice};
use crate::labels;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
#[cfg(feature = "web")]
use axum::{
    Form, Json,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
#[cfg(feature = "web")]
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
#[cfg(feature = "web")]
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(feature = "web")]
use std::sync::Arc;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use uuid::Uuid;

/// Name of the cookie holding the session id
pub const SESSION_COOKIE: &str = "session";

/// Access gate failure
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{}", labels::WRONG_PASSWORD)]
    WrongPassword,

    #[error("could not hash the shared secret")]
    Hashing,
}

/// Shared-secret gate in front of the data pages
///
/// Only an Argon2 hash of the secret is kept in memory. `check` accepts
/// exactly the configured string and nothing else: no trimming, no case
/// folding. This toggles visibility only; it is not an access-control
/// mechanism for the stores.
pub struct AccessGate {
    hash: String,
}

impl AccessGate {
    /// Hash the shared secret
    ///
    /// # Arguments
    /// * `secret` - The configured shared secret
    ///
    /// # Returns
    /// * `Result<AccessGate, AuthError>` - The gate, or `AuthError::Hashing`
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|_| AuthError::Hashing)?
            .to_string();

        Ok(AccessGate { hash })
    }

    /// Compare user input against the shared secret
    pub fn check(&self, input: &str) -> Result<(), AuthError> {
        let parsed_hash = PasswordHash::new(&self.hash).map_err(|_| AuthError::Hashing)?;

        Argon2::default()
            .verify_password(input.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::WrongPassword)
    }
}

/// Per-browser session state
#[derive(Debug, Clone)]
pub struct Session {
    /// Set once the shared secret was entered correctly
    pub authorized: bool,

    /// Time when the session expires
    pub expires_at: DateTime<Utc>,
}

/// Session table owned by the application state
///
/// Lives only in memory: a restart logs everybody out.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            lifetime,
        }
    }

    /// Start a session and return its id
    pub fn create(&self, authorized: bool) -> String {
        let session_id = Uuid::new_v4().to_string();
        let session = Session {
            authorized,
            expires_at: Utc::now() + self.lifetime,
        };

        // A panic elsewhere never leaves the map half-updated
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        // Drop whatever has expired while we hold the lock anyway
        let now = Utc::now();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session_id.clone(), session);

        session_id
    }

    /// Whether `session_id` names a live, authorized session
    pub fn is_authorized(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);

        sessions
            .get(session_id)
            .is_some_and(|s| s.authorized && s.expires_at > Utc::now())
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
    }
}

/// Login form data
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

// Web handler functions below (only compiled with "web" feature)

/// Serve the password page
#[cfg(feature = "web")]
pub async fn serve_login_page() -> Html<&'static str> {
    Html(include_str!("./static/login.html"))
}

/// Handle the password form
///
/// A match starts an authorized session and sets the session cookie. A
/// mismatch leaves any existing session as it was and answers 401.
#[cfg(feature = "web")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Json<Notice>), AppError> {
    if let Err(e) = state.gate.check(&form.password) {
        warn!("Rejected login attempt");
        return Err(e.into());
    }

    let session_id = state.sessions.create(true);
    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    info!("Session authorized");
    Ok((jar.add(cookie), Json(Notice::ok("logged_in", labels::LOGGED_IN))))
}

/// Handle logout
///
/// Forgets the session server-side and clears the cookie.
#[cfg(feature = "web")]
pub async fn handle_logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }

    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/login"),
    )
}

/// Authentication middleware
///
/// Lets authorized sessions through. Everything else gets 401 on API paths
/// and a redirect to the password page otherwise.
#[cfg(feature = "web")]
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let authorized = jar
        .get(SESSION_COOKIE)
        .is_some_and(|cookie| state.sessions.is_authorized(cookie.value()));

    if authorized {
        return next.run(request).await;
    }

    if request.uri().path().starts_with("/api/") {
        AppError::Unauthorized.into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}
