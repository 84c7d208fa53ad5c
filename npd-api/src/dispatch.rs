use chrono::{DateTime, Utc};
use npd_auth::TokenSet;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::{Method, Response};

use crate::macros::setter;
use crate::{Client, NpdApiError};

/// One outgoing call as seen by [`Client::dispatch`].
#[derive(Debug, Clone)]
pub struct Dispatch {
    method: Method,
    url: String,
    json: Option<serde_json::Value>,
    params: Vec<(String, String)>,
    headers: HeaderMap,
    referer: Option<String>,
    auth_required: bool,
    account_id: Option<String>,
}

impl Dispatch {
    /// `url` is a path below the configured base URL or an absolute URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            json: None,
            params: Vec::new(),
            headers: HeaderMap::new(),
            referer: None,
            auth_required: true,
            account_id: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    setter!(opt json: serde_json::Value);
    setter!(opt referer: String);
    setter!(opt account_id: String);
    setter!(auth_required: bool);

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    /// Extra header. Overrides the default `referer`, never `Authorization`.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Token state of an account at the moment a call is about to be sent.
///
/// Calls built with `auth_required(false)` never get here; they go out with
/// only the `referer` convention applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Access token present and alive.
    TokenLive,
    /// Access token dead or missing, refresh token present.
    NeedsRefresh,
    /// Nothing to authenticate with; login must happen first.
    NeedsLogin,
}

impl AuthState {
    pub fn assess(tokens: &TokenSet) -> Self {
        Self::assess_at(tokens, Utc::now())
    }

    pub fn assess_at(tokens: &TokenSet, now: DateTime<Utc>) -> Self {
        if tokens.access().is_some_and(|access| access.is_alive_at(now)) {
            Self::TokenLive
        } else if tokens.refresh().is_some() {
            Self::NeedsRefresh
        } else {
            Self::NeedsLogin
        }
    }
}

impl Client {
    /// Send `dispatch`, authenticating first when it requires it.
    ///
    /// The response is returned as-is whatever its status: the only guarantee
    /// is that a live bearer token was attached at send time.
    pub async fn dispatch(&self, dispatch: Dispatch) -> Result<Response, NpdApiError> {
        let access_token = if dispatch.auth_required {
            Some(self.authorize(dispatch.account_id.as_deref()).await?)
        } else {
            None
        };

        self.execute(dispatch, access_token).await
    }

    /// Live access token for the account, refreshing it if needed.
    async fn authorize(&self, account_id: Option<&str>) -> Result<String, NpdApiError> {
        let account_id = self.resolve_account(account_id)?;
        let tokens = self.token_store.get_tokens(account_id);
        // Held across the refresh so concurrent callers refresh at most once.
        let mut tokens = tokens.lock().await;

        let state = AuthState::assess(&tokens);
        tracing::debug!(account_id = %account_id, ?state, "Assessed token state");

        match state {
            AuthState::TokenLive => {}
            AuthState::NeedsRefresh => {
                tracing::info!(account_id = %account_id, "Access token expired, refreshing");
                self.refresh_locked(&mut tokens).await?;
            }
            AuthState::NeedsLogin => {
                return Err(NpdApiError::Configuration(
                    "access token is needed for authorization".to_string(),
                ));
            }
        }

        tokens
            .access()
            .map(|access| access.value().to_string())
            .ok_or_else(|| {
                NpdApiError::Configuration("access token is needed for authorization".to_string())
            })
    }

    /// Build headers and send. No token handling happens here.
    pub(crate) async fn execute(
        &self,
        dispatch: Dispatch,
        access_token: Option<String>,
    ) -> Result<Response, NpdApiError> {
        let Dispatch {
            method,
            url,
            json,
            params,
            headers: extra_headers,
            referer,
            ..
        } = dispatch;

        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(&self.config.referer(referer.as_deref()))?,
        );
        headers.extend(extra_headers);
        if let Some(token) = access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let url = self.config.resolve_url(&url);
        tracing::debug!(%method, %url, "Sending request");

        let mut request = self.http.request(method, &url).headers(headers);
        if !params.is_empty() {
            request = request.query(&params);
        }
        if let Some(body) = &json {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use npd_auth::TokenField;

    #[test]
    fn live_access_token() {
        let mut tokens = TokenSet::detached("1");
        tokens.set(TokenField::Access, ("A1", Utc::now() + Duration::hours(1)));
        assert_eq!(AuthState::assess(&tokens), AuthState::TokenLive);
    }

    #[test]
    fn live_access_without_refresh_is_still_live() {
        let mut tokens = TokenSet::detached("1");
        tokens.set(TokenField::Access, "A1");
        assert_eq!(AuthState::assess(&tokens), AuthState::TokenLive);
    }

    #[test]
    fn dead_access_with_refresh_needs_refresh() {
        let mut tokens = TokenSet::detached("1");
        tokens.set(TokenField::Access, ("A1", Utc::now() - Duration::hours(1)));
        tokens.set(TokenField::Refresh, "R1");
        assert_eq!(AuthState::assess(&tokens), AuthState::NeedsRefresh);
    }

    #[test]
    fn missing_access_with_refresh_needs_refresh() {
        let mut tokens = TokenSet::detached("1");
        tokens.set(TokenField::Refresh, "R1");
        assert_eq!(AuthState::assess(&tokens), AuthState::NeedsRefresh);
    }

    #[test]
    fn nothing_stored_needs_login() {
        assert_eq!(
            AuthState::assess(&TokenSet::detached("1")),
            AuthState::NeedsLogin
        );
    }

    #[test]
    fn dead_access_without_refresh_needs_login() {
        let mut tokens = TokenSet::detached("1");
        tokens.set(TokenField::Access, ("A1", Utc::now() - Duration::seconds(1)));
        assert_eq!(AuthState::assess(&tokens), AuthState::NeedsLogin);
    }

    #[test]
    fn assessment_is_relative_to_given_instant() {
        let now = Utc::now();
        let mut tokens = TokenSet::detached("1");
        tokens.set(TokenField::Access, ("A1", now));
        tokens.set(TokenField::Refresh, "R1");
        assert_eq!(
            AuthState::assess_at(&tokens, now - Duration::seconds(1)),
            AuthState::TokenLive
        );
        assert_eq!(AuthState::assess_at(&tokens, now), AuthState::NeedsRefresh);
    }
}
