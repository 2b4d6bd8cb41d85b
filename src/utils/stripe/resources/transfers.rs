use reqwest::Client;

use crate::utils::stripe::models::{Transfer, TransferRequest};
use crate::utils::stripe::resources::send;

pub struct Transfers<'a> {
    secret_key: &'a str,
}

impl<'a> Transfers<'a> {
    pub fn new(secret_key: &'a str) -> Self {
        Self { secret_key }
    }

    /// Moves an allocated prize from the platform balance to a winner's
    /// connected account. The idempotency key header makes replays of the
    /// same settlement a no-op on the provider side.
    pub async fn create(&self, request: TransferRequest) -> Result<Transfer, String> {
        let mut form: Vec<(String, String)> = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.to_lowercase()),
            ("destination".to_string(), request.destination_account),
        ];
        for (key, value) in request.metadata {
            form.push((format!("metadata[{key}]"), value));
        }

        send(
            Client::new()
                .post("https://api.stripe.com/v1/transfers")
                .header("Idempotency-Key", request.idempotency_key)
                .bearer_auth(self.secret_key)
                .form(&form),
        )
        .await
    }
}
