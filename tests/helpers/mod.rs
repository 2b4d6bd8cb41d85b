pub mod contest_helpers;
#[macro_use]
pub mod test_with_server;

use axum_test::TestServer;
use fake::{faker, Fake};
use serde_json::Value;
use spotlight_server::routes::users::TestUserResponse;
use uuid::Uuid;

// allowing this because test binaries compile independently and not all of
// them use every helper
#[allow(dead_code)]
pub async fn create_fake_login_test_user(
    server: &TestServer,
    payout_account: Option<&str>,
    creator_metrics: Option<Value>,
) -> (String, String) {
    let username = format!(
        "user_{}",
        Uuid::new_v4().simple().to_string()[..12].to_string()
    );
    let full_name: String = faker::name::en::Name().fake();

    let response = server
        .post("/test/api/users")
        .json(&serde_json::json!({
            "username": username,
            "full_name": full_name,
            "email": format!("{username}@example.com"),
            "payout_account": payout_account,
            "creator_metrics": creator_metrics,
        }))
        .add_header("Accept", "application/json")
        .await;
    response.assert_status_success();
    let created = response.json::<TestUserResponse>();

    (created.id, created.token)
}
