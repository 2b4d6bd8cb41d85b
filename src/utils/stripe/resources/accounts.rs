use reqwest::Client;
use serde::Serialize;
use serde_json::json;

use crate::utils::stripe::models::Account;
use crate::utils::stripe::resources::send;

#[derive(Debug, Serialize)]
pub struct Identity<'a> {
    pub country: &'a str,
    pub entity_type: Option<EntityType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Individual,
}

pub struct Accounts<'a> {
    version: &'a str,
    secret_key: &'a str,
}

impl<'a> Accounts<'a> {
    pub fn new(version: &'a str, secret_key: &'a str) -> Self {
        Self {
            version,
            secret_key,
        }
    }

    /// Creates the recipient-configured connected account a creator's prize
    /// transfers pay into.
    pub async fn create(&self, email: &str, identity: Identity<'a>) -> Result<Account, String> {
        let data = json!({
            "contact_email": email,
            "configuration": {
                "recipient": {
                    "capabilities": {
                        "cards": {
                            "requested": true
                        }
                    }
                },
            },
            "identity": {
                "country": identity.country,
                "entity_type": identity.entity_type.unwrap_or(EntityType::Individual)
            },
            "dashboard": "full",
            "include": [
                "configuration.recipient",
                "identity",
                "defaults"
            ]
        });

        send(
            Client::new()
                .post("https://api.stripe.com/v2/core/accounts")
                .header("Stripe-Version", self.version)
                .bearer_auth(self.secret_key)
                .json(&data),
        )
        .await
    }
}
