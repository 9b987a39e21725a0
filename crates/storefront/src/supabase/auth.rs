//! `GoTrue` authentication methods.
//!
//! Email/password flows only: the storefront signs users in with the
//! password grant and keeps the returned access token in the session.

use serde::Serialize;
use tracing::instrument;

use crate::supabase::SupabaseError;
use crate::supabase::rest::{SupabaseClient, extract_api_message};
use crate::supabase::types::AuthSession;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl SupabaseClient {
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url())
    }

    async fn auth_request(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<AuthSession, SupabaseError> {
        let response = request.header("apikey", self.anon_key()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SupabaseError::Auth(extract_api_message(&body)));
        }

        serde_json::from_str(&body).map_err(SupabaseError::Parse)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Auth` on rejected credentials, or another error if the
    /// request itself fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let request = self
            .http()
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password });
        self.auth_request(request).await
    }

    /// Register a new account.
    ///
    /// The project has email confirmation disabled, so signup returns a
    /// usable session straight away.
    ///
    /// # Errors
    ///
    /// Returns `Auth` if the signup is rejected (duplicate email, weak
    /// password), or another error if the request itself fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let request = self
            .http()
            .post(self.auth_url("signup"))
            .json(&Credentials { email, password });
        self.auth_request(request).await
    }

    /// Revoke the user's access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. The local session is cleared
    /// by the caller regardless.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .http()
            .post(self.auth_url("logout"))
            .header("apikey", self.anon_key())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Auth(extract_api_message(&body)));
        }
        Ok(())
    }
}
