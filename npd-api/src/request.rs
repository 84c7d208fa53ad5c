use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;

use crate::dispatch::Dispatch;
use crate::error::ErrorDetail;
use crate::{Client, NpdApiError};

/// Payload of a typed request.
pub enum RequestData<T> {
    Empty,
    Json(T),
    Query(T),
}

/// A typed business endpoint sent through [`Client::send`].
pub trait Request {
    type Data: Serialize;
    type Response: DeserializeOwned;
    const METHOD: Method = Method::GET;

    fn endpoint(&self) -> Cow<'_, str>;

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Empty
    }

    /// Portal page reported in `referer`; `None` means the portal root.
    fn referer(&self) -> Option<&str> {
        None
    }
}

impl Client {
    /// Send a typed request for the default account.
    pub async fn send<R>(&self, request: R) -> Result<R::Response, NpdApiError>
    where
        R: Request,
    {
        self.send_as(None, request).await
    }

    /// Send a typed request on behalf of `account_id`. Non-2xx answers become
    /// [`NpdApiError::Api`].
    pub async fn send_as<R>(&self, account_id: Option<&str>, request: R) -> Result<R::Response, NpdApiError>
    where
        R: Request,
    {
        let mut dispatch = Dispatch::new(R::METHOD, request.endpoint().into_owned());
        if let Some(page) = request.referer() {
            dispatch = dispatch.referer(page);
        }
        if let Some(account_id) = account_id {
            dispatch = dispatch.account_id(account_id);
        }
        dispatch = match request.data() {
            RequestData::Empty => dispatch,
            RequestData::Json(data) => dispatch.json(serde_json::to_value(data)?),
            RequestData::Query(data) => dispatch.params(query_pairs(serde_json::to_value(data)?)),
        };

        let response = self.dispatch(dispatch).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(NpdApiError::Api {
                status,
                detail: ErrorDetail::parse(&body),
            });
        }

        Ok(response.json::<R::Response>().await?)
    }
}

/// Flatten a serialized query struct into key/value pairs, dropping nulls.
fn query_pairs(value: serde_json::Value) -> Vec<(String, String)> {
    let serde_json::Value::Object(map) = value else {
        return Vec::new();
    };

    map.into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}
