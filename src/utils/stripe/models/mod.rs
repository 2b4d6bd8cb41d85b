use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AccountLink {
    pub account: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    pub id: String,
    pub contact_email: String,
}

#[derive(Debug, Deserialize)]
pub struct Transfer {
    pub id: String,
}

/// One outgoing transfer to a connected account. The idempotency key makes
/// retrying the same settlement safe at the payment-provider boundary.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub destination_account: String,
    pub amount: i64,
    pub currency: String,
    pub idempotency_key: String,
    pub metadata: HashMap<String, String>,
}
