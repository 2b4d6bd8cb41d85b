use crate::{
    interfaces::payment::PaymentInterface,
    utils::stripe::{
        models::{Account, AccountLink, Transfer, TransferRequest},
        resources::{
            account_links::AccountLinks,
            accounts::{Accounts, Identity},
            transfers::Transfers,
        },
    },
};
use async_trait::async_trait;

pub mod models;
mod resources;

pub struct StripePayment {
    secret_key: String,
    version: &'static str,
}

impl StripePayment {
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            version: "2025-05-28.preview",
        }
    }
}

#[async_trait]
impl PaymentInterface for StripePayment {
    async fn recipient_link(
        &self,
        account: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<AccountLink, String> {
        let account_links = AccountLinks::new(self.version, &self.secret_key);
        account_links
            .create_onboarding(account, refresh_url, return_url)
            .await
    }

    async fn create_transfer(&self, request: TransferRequest) -> Result<Transfer, String> {
        let transfers = Transfers::new(&self.secret_key);
        transfers.create(request).await
    }

    async fn create_recipient_account(
        &self,
        email: &str,
        country: &str,
    ) -> Result<Account, String> {
        let accounts = Accounts::new(self.version, &self.secret_key);
        accounts
            .create(
                email,
                Identity {
                    country,
                    entity_type: None,
                },
            )
            .await
    }
}
