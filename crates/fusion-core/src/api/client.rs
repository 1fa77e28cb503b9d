//! Request layer with re-authentication.
//!
//! Every request carries the current access token. A 401 triggers exactly one
//! refresh exchange; on success the session is updated and the original
//! request is replayed once with the new token. If there is no refresh token
//! or the exchange fails, the caller gets the original 401.
//!
//! Concurrent requests that all hit a 401 each run their own refresh; there
//! is no queueing.

use std::sync::Arc;

use fusion_types::auth::RefreshResponse;
use fusion_types::error::ApiError;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::session::SessionStore;

pub const REFRESH_PATH: &str = "/auth/token/refresh/";

pub struct ApiClient<T: HttpTransport> {
    transport: T,
    session: Arc<SessionStore>,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T, session: Arc<SessionStore>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `request`, returning the successful response or a tagged error.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = self.session.access_token();
        let response = self
            .transport
            .execute(request, token.as_ref().map(|t| t.expose_secret()))
            .await?;

        if response.status != 401 {
            return into_result(response);
        }

        let Some(refresh) = self.session.refresh_token() else {
            tracing::debug!(path = %request.path, "401 without refresh token");
            return Err(status_error(response));
        };

        match self.refresh(&refresh).await {
            Ok(access) => {
                tracing::debug!(path = %request.path, "retrying request after token refresh");
                let retried = self
                    .transport
                    .execute(request, Some(access.expose_secret()))
                    .await?;
                into_result(retried)
            }
            Err(err) => {
                tracing::debug!(path = %request.path, error = %err, "token refresh failed");
                Err(status_error(response))
            }
        }
    }

    /// Execute and decode the JSON body.
    pub async fn call<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R, ApiError> {
        let response = self.execute(request).await?;
        decode(&response.body)
    }

    /// Execute, discarding any body (e.g. 204 No Content).
    pub async fn call_empty(&self, request: &ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    /// Exchange the refresh token for a new access token and install it.
    async fn refresh(&self, refresh: &SecretString) -> Result<SecretString, ApiError> {
        let request = ApiRequest::new(Method::Post, REFRESH_PATH)
            .json(serde_json::json!({ "refresh": refresh.expose_secret() }));
        let response = into_result(self.transport.execute(&request, None).await?)?;
        let tokens: RefreshResponse = decode(&response.body)?;

        self.session
            .set_tokens(&tokens.access, tokens.refresh.as_deref())
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        tracing::info!("access token refreshed");
        Ok(SecretString::from(tokens.access))
    }
}

fn into_result(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(status_error(response))
    }
}

fn status_error(response: ApiResponse) -> ApiError {
    ApiError::Status {
        status: response.status,
        message: extract_message(&response.body),
        body: response.body,
    }
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull a human-readable message out of a structured error body.
///
/// Tries `error`, then `detail`, then the first field error (fields in key
/// order). `non_field_errors` messages are returned bare; other field errors
/// are prefixed with the field name.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match &value {
        Value::Object(map) => {
            for key in ["error", "detail"] {
                if let Some(message) = map.get(key).and_then(first_text) {
                    return Some(message);
                }
            }
            map.iter().find_map(|(field, v)| {
                first_text(v).map(|message| {
                    if field == "non_field_errors" {
                        message
                    } else {
                        format!("{field}: {message}")
                    }
                })
            })
        }
        other => first_text(other),
    }
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}
