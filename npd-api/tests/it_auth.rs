//! Login and explicit refresh against a mock service.

mod common;

use chrono::Duration;
use common::{INN, client_for, expire_in};
use mockito::{Matcher, Server};
use npd_api::{ErrorDetail, NpdApiError};
use secrecy::SecretString;
use serde_json::json;

fn password() -> SecretString {
    SecretString::from("secret".to_string())
}

#[tokio::test]
async fn login_stores_tokens_and_returns_profile() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/lkfl")
        .match_header("referer", format!("{}/Sales", server.url()).as_str())
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "username": INN,
            "password": "secret",
            "deviceInfo": {"sourceType": "WEB", "appVersion": "1.0.0"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "token": "A1",
                "tokenExpireIn": expire_in(Duration::hours(1)),
                "refreshToken": "R1",
                "profile": {"inn": INN, "displayName": "Иванов Иван"}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);

    let profile = client.login(INN, &password()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(profile.inn, INN);
    assert_eq!(profile.display_name.as_deref(), Some("Иванов Иван"));

    let tokens = client.tokens(None).unwrap();
    let tokens = tokens.lock().await;
    assert!(tokens.access().unwrap().is_alive());
    assert_eq!(tokens.access().unwrap().value(), "A1");
    assert_eq!(tokens.refresh().unwrap().value(), "R1");
    assert_eq!(tokens.device().unwrap().value().len(), 21);
}

#[tokio::test]
async fn login_reuses_device_id() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/lkfl")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"token": "A1", "tokenExpireIn": expire_in(Duration::hours(1)), "refreshToken": "R1"})
                .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);

    client.login(INN, &password()).await.unwrap();
    let first = client.tokens(None).unwrap().lock().await.device().cloned();
    client.login(INN, &password()).await.unwrap();
    let second = client.tokens(None).unwrap().lock().await.device().cloned();

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn rejected_login_is_authentication_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/lkfl")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code":"authentication.failed","message":"Неверный ИНН или пароль"}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.login(INN, &password()).await.unwrap_err();

    assert!(err.is_authentication());
    assert_eq!(err.status().map(|s| s.as_u16()), Some(422));
    let tokens = client.tokens(None).unwrap();
    assert!(tokens.lock().await.access().is_none());
}

#[tokio::test]
async fn non_json_login_answer_is_rejected() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/lkfl")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.login(INN, &password()).await.unwrap_err();

    match err {
        NpdApiError::Authentication { detail, .. } => {
            assert_eq!(detail, ErrorDetail::Raw("<html>maintenance</html>".to_string()));
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn explicit_refresh_without_refresh_token_is_configuration_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/token")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.refresh(None).await.unwrap_err();

    assert!(matches!(err, NpdApiError::Configuration(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn login_for_other_profile_inn_keeps_requested_account() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/lkfl")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "token": "A1",
                "tokenExpireIn": expire_in(Duration::hours(1)),
                "refreshToken": "R1",
                "profile": {"inn": "999999999999"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);

    let profile = client.login(INN, &password()).await.unwrap();

    assert_eq!(profile.inn, "999999999999");
    let requested = client.tokens(Some(INN)).unwrap();
    assert_eq!(requested.lock().await.access().unwrap().value(), "A1");
    let reported = client.tokens(Some("999999999999")).unwrap();
    assert!(reported.lock().await.access().is_none());
}
