use async_trait::async_trait;

use crate::utils::stripe::models::{Account, AccountLink, Transfer, TransferRequest};

#[async_trait]
pub trait PaymentInterface {
    async fn recipient_link(
        &self,
        account: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<AccountLink, String>;
    async fn create_transfer(&self, request: TransferRequest) -> Result<Transfer, String>;
    async fn create_recipient_account(&self, email: &str, country: &str)
        -> Result<Account, String>;
}
