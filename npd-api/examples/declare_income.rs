use npd_api::endpoints::{Amount, Service};
use npd_api::{Client, ClientConfig, NpdApiError, Request};
use secrecy::SecretString;

#[tokio::main]
pub async fn main() -> Result<(), NpdApiError> {
    let client = Client::new(ClientConfig::default().with_default_inn("111111111111"))?;
    client
        .login("111111111111", &SecretString::from("password".to_string()))
        .await?;

    let req = Request::incomes().declare(vec![Service::new(
        "Consulting",
        Amount::from_rubles(1500),
    )]);

    let res = client.send(req).await?;
    println!("receipt: {}", res.approved_receipt_uuid);
    Ok(())
}
