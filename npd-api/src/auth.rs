use chrono::{DateTime, Utc};
use npd_auth::{TokenField, TokenSet, generate_device_id};
use reqwest::Response;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatch;
use crate::error::ErrorDetail;
use crate::{Client, NpdApiError};

const LOGIN_ENDPOINT: &str = "/auth/lkfl";
const REFRESH_ENDPOINT: &str = "/auth/token";
// The auth endpoints only accept requests that look like they come from the sales page.
const AUTH_REFERER_PAGE: &str = "Sales";
const SOURCE_TYPE: &str = "WEB";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceInfo<'a> {
    source_device_id: &'a str,
    source_type: &'static str,
    app_version: &'a str,
    meta_details: MetaDetails<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetaDetails<'a> {
    user_agent: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    device_info: DeviceInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
    device_info: DeviceInfo<'a>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: String,
    token_expire_in: DateTime<Utc>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    profile: Option<Profile>,
}

/// Taxpayer profile returned by a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub inn: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Client {
    /// Full login with INN and password. Stores a fresh access and refresh
    /// token for `inn` and returns the taxpayer profile.
    pub async fn login(&self, inn: &str, password: &SecretString) -> Result<Profile, NpdApiError> {
        let tokens = self.token_store.get_tokens(inn);
        let mut tokens = tokens.lock().await;
        let device_id = ensure_device(&mut tokens);

        let body = LoginRequest {
            username: inn,
            password: password.expose_secret(),
            device_info: self.device_info(&device_id),
        };
        let response = self.auth_exchange(LOGIN_ENDPOINT, &body).await?;

        let profile = response.profile.clone().unwrap_or_else(|| Profile {
            inn: inn.to_string(),
            ..Profile::default()
        });
        if profile.inn != inn {
            tracing::warn!(
                account_id = %inn,
                profile_inn = %profile.inn,
                "Login profile belongs to a different INN"
            );
        }

        apply_tokens(&mut tokens, response);
        tracing::info!(account_id = %inn, "Logged in");

        Ok(profile)
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh(&self, account_id: Option<&str>) -> Result<(), NpdApiError> {
        let tokens = self.tokens(account_id)?;
        let mut tokens = tokens.lock().await;
        self.refresh_locked(&mut tokens).await
    }

    /// Refresh with the token set already locked by the caller.
    pub(crate) async fn refresh_locked(&self, tokens: &mut TokenSet) -> Result<(), NpdApiError> {
        let refresh_token = tokens
            .refresh()
            .map(|refresh| refresh.value().to_string())
            .ok_or_else(|| {
                NpdApiError::Configuration("refresh token is needed to refresh".to_string())
            })?;
        let device_id = ensure_device(tokens);

        let body = RefreshRequest {
            refresh_token: &refresh_token,
            device_info: self.device_info(&device_id),
        };
        let response = self.auth_exchange(REFRESH_ENDPOINT, &body).await?;

        let expires_at = response.token_expire_in;
        apply_tokens(tokens, response);
        tracing::info!(
            account_id = %tokens.account_id(),
            %expires_at,
            "Access token refreshed"
        );

        Ok(())
    }

    fn device_info<'a>(&'a self, device_id: &'a str) -> DeviceInfo<'a> {
        DeviceInfo {
            source_device_id: device_id,
            source_type: SOURCE_TYPE,
            app_version: &self.config.app_version,
            meta_details: MetaDetails {
                user_agent: &self.config.user_agent,
            },
        }
    }

    async fn auth_exchange<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<TokenResponse, NpdApiError> {
        let dispatch = Dispatch::post(endpoint)
            .json(serde_json::to_value(body)?)
            .referer(AUTH_REFERER_PAGE)
            .auth_required(false);
        let response = self.execute(dispatch, None).await?;

        read_token_response(response).await
    }
}

fn ensure_device(tokens: &mut TokenSet) -> String {
    if let Some(device) = tokens.device() {
        return device.value().to_string();
    }
    let device_id = generate_device_id();
    tokens.set(TokenField::Device, device_id.as_str());
    device_id
}

/// Access is always replaced; refresh only when the server rotated it.
fn apply_tokens(tokens: &mut TokenSet, response: TokenResponse) {
    tokens.set(TokenField::Access, (response.token, response.token_expire_in));
    if let Some(refresh_token) = response.refresh_token.filter(|token| !token.is_empty()) {
        tokens.set(TokenField::Refresh, refresh_token);
    }
}

async fn read_token_response(response: Response) -> Result<TokenResponse, NpdApiError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.contains("json"));

    if !status.is_success() || !is_json {
        let body = response.text().await?;
        tracing::warn!(%status, "Authentication rejected");
        return Err(NpdApiError::Authentication {
            status,
            detail: ErrorDetail::parse(&body),
        });
    }

    Ok(response.json::<TokenResponse>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_body_shape() {
        let body = RefreshRequest {
            refresh_token: "R1",
            device_info: DeviceInfo {
                source_device_id: "dev",
                source_type: SOURCE_TYPE,
                app_version: "1.0.0",
                meta_details: MetaDetails { user_agent: "ua" },
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "refreshToken": "R1",
                "deviceInfo": {
                    "sourceDeviceId": "dev",
                    "sourceType": "WEB",
                    "appVersion": "1.0.0",
                    "metaDetails": {"userAgent": "ua"}
                }
            })
        );
    }

    #[test]
    fn token_response_parses_z_timestamp() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"token":"A2","tokenExpireIn":"2030-01-01T00:00:00.000Z","profile":{"inn":"111111111111"}}"#,
        )
        .unwrap();
        assert_eq!(response.token_expire_in.to_rfc3339(), "2030-01-01T00:00:00+00:00");
        assert_eq!(response.refresh_token, None);
        assert_eq!(response.profile.unwrap().inn, "111111111111");
    }

    #[test]
    fn apply_keeps_refresh_when_not_rotated() {
        let mut tokens = TokenSet::detached("1");
        tokens.set(TokenField::Refresh, "R1");

        apply_tokens(
            &mut tokens,
            TokenResponse {
                token: "A2".to_string(),
                token_expire_in: Utc::now(),
                refresh_token: Some(String::new()),
                profile: None,
            },
        );

        assert_eq!(tokens.access().unwrap().value(), "A2");
        assert_eq!(tokens.refresh().unwrap().value(), "R1");
    }

    #[test]
    fn ensure_device_generates_once() {
        let mut tokens = TokenSet::detached("1");
        let first = ensure_device(&mut tokens);
        let second = ensure_device(&mut tokens);
        assert_eq!(first, second);
        assert_eq!(first.len(), 21);
    }
}
