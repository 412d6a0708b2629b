use crate::amo::auth::{AmoAuth, TokenResponse};
use crate::error::Error;
use crate::model::joined::JoinedLead;
use crate::pipeline::LeadsPipeline;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub struct AppState {
    pub pipeline: LeadsPipeline,
    pub auth: Option<AmoAuth>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/leads", get(get_leads))
        .route("/api/auth/token", get(get_token))
        .with_state(Arc::new(state))
}

async fn get_leads(State(state): State<Arc<AppState>>) -> Result<Json<Vec<JoinedLead>>, ApiError> {
    let leads = state.pipeline.joined_leads().await?;
    debug!("responding with {} joined leads", leads.len());
    Ok(Json(leads))
}

#[derive(Deserialize)]
struct AuthQuery {
    code: String,
}

async fn get_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
) -> Result<Json<TokenResponse>, ApiError> {
    let auth = state.auth.as_ref().ok_or(Error::OAuthDisabled)?;
    let token = auth.exchange_code(&query.code).await?;
    Ok(Json(token))
}

/// What leaves the service on failure. Upstream detail is already logged
/// and is never part of the body.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Internal,
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        match value {
            Error::OAuthDisabled => ApiError::NotFound,
            _ => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "OAuth is not configured".to_string()),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, Error::FetchFailed.to_string()),
        };

        let body = Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "error": status.canonical_reason().unwrap_or_default(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amo::tests::client_for;
    use crate::config::OAuthConfig;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(server: &MockServer, oauth: bool) -> Router {
        let client = client_for(server);
        let auth = oauth.then(|| {
            AmoAuth::new(
                client.clone(),
                OAuthConfig {
                    client_id: "client".to_string(),
                    client_secret: "secret".to_string(),
                    redirect_uri: "https://example.org/cb".to_string(),
                },
            )
        });
        router(AppState {
            pipeline: LeadsPipeline::new(client),
            auth,
        })
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn leads_endpoint_returns_joined_array() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v4/leads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_embedded": { "leads": [{
                    "id": 1, "name": "Flat 42", "price": 10, "created_at": 1700000000,
                    "status_id": 10, "responsible_user_id": 20, "pipeline_id": 5
                }] }
            })))
            .mount(&server)
            .await;
        for route in ["/api/v4/leads/pipelines", "/api/v4/users", "/api/v4/contacts"] {
            Mock::given(path(route))
                .respond_with(ResponseTemplate::new(204))
                .mount(&server)
                .await;
        }

        let (status, body) = call(app(&server, false), "/api/leads").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "name": "Flat 42", "price": 10, "created_at": 1700000000,
                "status": null, "responsible": null, "contacts": []
            }])
        );
    }

    #[tokio::test]
    async fn upstream_failure_hides_detail() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v4/leads"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;

        let (status, body) = call(app(&server, false), "/api/leads").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "statusCode": 500,
                "message": "Something went wrong during fetch! Please try again later.",
                "error": "Internal Server Error"
            })
        );
    }

    #[tokio::test]
    async fn token_endpoint_requires_oauth_config() {
        let server = MockServer::start().await;
        let (status, body) = call(app(&server, false), "/api/auth/token?code=abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
    }

    #[tokio::test]
    async fn token_endpoint_exchanges_code() {
        let server = MockServer::start().await;
        Mock::given(path("/oauth2/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": 86400,
                "access_token": "access",
                "refresh_token": "refresh"
            })))
            .mount(&server)
            .await;

        let (status, body) = call(app(&server, true), "/api/auth/token?code=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["access_token"], "access");
    }
}
