//! Authentication route handlers.
//!
//! Email/password against `GoTrue`. On success the user identity and access
//! token go into the session; the cart and wishlist stay untouched, so a
//! visitor's cart survives logging in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use trizen_core::Email;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::supabase::SupabaseError;

/// Login/register form data.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

impl CredentialsForm {
    /// Blank fields are rejected locally, before any auth service call.
    fn is_incomplete(&self) -> bool {
        self.email.trim().is_empty() || self.password.is_empty()
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Display the login page.
#[instrument]
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: None }
}

/// Display the registration page.
#[instrument]
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate { error: None }
}

/// Store the authenticated identity in the session and Sentry scope.
async fn establish(
    session: &Session,
    auth: crate::supabase::types::AuthSession,
) -> Result<(), AppError> {
    let email = Email::parse(&auth.user.email)
        .map_err(|e| AppError::Internal(format!("auth service returned invalid email: {e}")))?;

    let user = CurrentUser {
        id: auth.user.id,
        email,
        access_token: auth.access_token,
    };

    set_sentry_user(&user.id, Some(user.email.as_str()));
    set_current_user(session, &user).await?;
    Ok(())
}

/// Sign in.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    if form.is_incomplete() {
        return LoginTemplate {
            error: Some("ইমেইল এবং পাসওয়ার্ড দুটোই দিন।".to_string()),
        }
        .into_response();
    }

    match state.supabase().sign_in(&form.email, &form.password).await {
        Ok(auth) => {
            if let Err(e) = establish(&session, auth).await {
                tracing::error!("Failed to store login in session: {e}");
                return LoginTemplate {
                    error: Some("লগইন করা যায়নি, আবার চেষ্টা করুন।".to_string()),
                }
                .into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(SupabaseError::Auth(message)) => {
            tracing::warn!("Login rejected: {message}");
            LoginTemplate {
                error: Some("ইমেইল বা পাসওয়ার্ড সঠিক নয়।".to_string()),
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {e}");
            LoginTemplate {
                error: Some("লগইন করা যায়নি, আবার চেষ্টা করুন।".to_string()),
            }
            .into_response()
        }
    }
}

/// Register a new account.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    if form.is_incomplete() {
        return RegisterTemplate {
            error: Some("ইমেইল এবং পাসওয়ার্ড দুটোই দিন।".to_string()),
        }
        .into_response();
    }

    if Email::parse(&form.email).is_err() {
        return RegisterTemplate {
            error: Some("সঠিক ইমেইল ঠিকানা দিন।".to_string()),
        }
        .into_response();
    }

    match state.supabase().sign_up(&form.email, &form.password).await {
        Ok(auth) => {
            if let Err(e) = establish(&session, auth).await {
                tracing::error!("Failed to store signup in session: {e}");
                return RegisterTemplate {
                    error: Some("অ্যাকাউন্ট তৈরি করা যায়নি, আবার চেষ্টা করুন।".to_string()),
                }
                .into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(SupabaseError::Auth(message)) => {
            tracing::warn!("Signup rejected: {message}");
            RegisterTemplate {
                error: Some(message),
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!("Signup failed: {e}");
            RegisterTemplate {
                error: Some("অ্যাকাউন্ট তৈরি করা যায়নি, আবার চেষ্টা করুন।".to_string()),
            }
            .into_response()
        }
    }
}

/// Sign out.
///
/// Token revocation is best effort; the local session is cleared either way.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(crate::models::session_keys::CURRENT_USER)
        .await
        && let Err(e) = state.supabase().sign_out(&user.access_token).await
    {
        tracing::warn!("Token revocation failed: {e}");
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session user: {e}");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_blank_credentials_are_rejected_locally() {
        assert!(form("", "").is_incomplete());
        assert!(form("user@example.com", "").is_incomplete());
        assert!(form("", "hunter2").is_incomplete());
        assert!(form("   ", "hunter2").is_incomplete());
    }

    #[test]
    fn test_filled_credentials_pass_the_local_check() {
        assert!(!form("user@example.com", "hunter2").is_incomplete());
    }
}
