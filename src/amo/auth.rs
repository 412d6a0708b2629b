use crate::amo::AmoClient;
use crate::config::OAuthConfig;
use crate::error::Error;
use crate::Result;
use log::{debug, error};
use reqwest::Url;
use serde::{Deserialize, Serialize};

const TOKEN_PATH: &str = "/oauth2/access_token";

#[derive(Serialize, Debug)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TokenResponse {
    pub token_type: String,
    pub expires_in: u64,
    pub access_token: String,
    pub refresh_token: String,
}

/// Trades an amoCRM authorization code for an access/refresh token pair.
pub struct AmoAuth {
    client: AmoClient,
    oauth: OAuthConfig,
}

impl AmoAuth {
    pub fn new(client: AmoClient, oauth: OAuthConfig) -> AmoAuth {
        AmoAuth { client, oauth }
    }

    /// The token endpoint lives at the account root, not under `/api/v4`.
    fn token_url(&self) -> Result<Url> {
        Url::parse(self.client.base_url())
            .and_then(|base| base.join(TOKEN_PATH))
            .map_err(|_| Error::ConfigWrongFormat("AMOCRM_API_URL"))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        self.send(code).await.inspect_err(|err| {
            error!("Failed to exchange amoCRM authorization code: {err}");
        })
    }

    async fn send(&self, code: &str) -> Result<TokenResponse> {
        let url = self.token_url()?;
        debug!("POST {url}");

        let body = TokenRequest {
            client_id: &self.oauth.client_id,
            client_secret: &self.oauth.client_secret,
            grant_type: "authorization_code",
            code,
            redirect_uri: &self.oauth.redirect_uri,
        };
        let response = self.client.http().post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                path: TOKEN_PATH.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
            path: TOKEN_PATH.to_string(),
            source,
        })
    }
}
