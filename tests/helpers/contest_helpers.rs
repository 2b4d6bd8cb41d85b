use axum_test::{TestResponse, TestServer};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use spotlight_server::entities::contest::contest_entity::Contest;

#[allow(dead_code)]
pub fn percentage_positions(percentages: &[u32]) -> Value {
    Value::Array(
        percentages
            .iter()
            .map(|p| json!({ "type": "Percentage", "percentage": p }))
            .collect(),
    )
}

#[allow(dead_code)]
pub fn amount_positions(amounts: &[i64]) -> Value {
    Value::Array(
        amounts
            .iter()
            .map(|a| json!({ "type": "Amount", "amount": a }))
            .collect(),
    )
}

#[allow(dead_code)]
pub async fn create_contest(
    server: &TestServer,
    token: &str,
    total_budget: i64,
    winner_count: u32,
    positions: Value,
    criterion: &str,
) -> Contest {
    let response = server
        .post("/api/contests")
        .json(&json!({
            "title": "Creator showdown",
            "description": "Best clip wins",
            "total_budget": total_budget,
            "winner_count": winner_count,
            "positions": positions,
            "criterion": criterion,
            "start_at": (Utc::now() - Duration::days(7)).to_rfc3339(),
            "end_at": (Utc::now() - Duration::hours(1)).to_rfc3339(),
        }))
        .add_header("Cookie", format!("jwt={token}"))
        .add_header("Accept", "application/json")
        .await;
    response.assert_status_success();
    response.json::<Contest>()
}

#[allow(dead_code)]
pub async fn set_contest_status(
    server: &TestServer,
    token: &str,
    contest_id: &str,
    status: &str,
) -> TestResponse {
    server
        .post(&format!("/api/contests/{contest_id}/status"))
        .json(&json!({ "status": status }))
        .add_header("Cookie", format!("jwt={token}"))
        .add_header("Accept", "application/json")
        .await
}

#[allow(dead_code)]
pub async fn activate_and_complete(server: &TestServer, token: &str, contest_id: &str) {
    set_contest_status(server, token, contest_id, "Active")
        .await
        .assert_status_success();
    set_contest_status(server, token, contest_id, "Completed")
        .await
        .assert_status_success();
}

#[allow(dead_code)]
pub async fn apply_to_contest(server: &TestServer, token: &str, contest_id: &str) -> TestResponse {
    server
        .post(&format!("/api/contests/{contest_id}/apply"))
        .json(&json!({ "post_url": "https://clips.example.com/entry" }))
        .add_header("Cookie", format!("jwt={token}"))
        .add_header("Accept", "application/json")
        .await
}

#[allow(dead_code)]
pub async fn set_application_status(
    server: &TestServer,
    token: &str,
    application_id: &str,
    status: &str,
) -> TestResponse {
    server
        .post(&format!("/api/applications/{application_id}/status"))
        .json(&json!({ "status": status }))
        .add_header("Cookie", format!("jwt={token}"))
        .add_header("Accept", "application/json")
        .await
}

#[allow(dead_code)]
pub async fn finalize_winners(server: &TestServer, token: &str, contest_id: &str) -> TestResponse {
    server
        .post(&format!("/api/contests/{contest_id}/finalize_winners"))
        .add_header("Cookie", format!("jwt={token}"))
        .add_header("Accept", "application/json")
        .await
}

#[allow(dead_code)]
pub async fn process_payouts(server: &TestServer, token: &str, contest_id: &str) -> TestResponse {
    server
        .post(&format!("/api/contests/{contest_id}/payouts/process"))
        .add_header("Cookie", format!("jwt={token}"))
        .add_header("Accept", "application/json")
        .await
}

#[allow(dead_code)]
pub fn views_metrics(views: u64) -> Value {
    json!({ "tiktok_metrics": { "views": views } })
}
