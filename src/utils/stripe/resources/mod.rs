pub mod account_links;
pub mod accounts;
pub mod transfers;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

/// Sends a prepared request and decodes the body; a non-2xx response comes
/// back as the provider's error payload verbatim.
pub(super) async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, String> {
    let res = request.send().await.map_err(|e| e.to_string())?;
    if !res.status().is_success() {
        return Err(res.text().await.map_err(|e| e.to_string())?);
    }
    res.json::<T>().await.map_err(|e| e.to_string())
}
