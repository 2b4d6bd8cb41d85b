#[macro_export]
macro_rules! test_with_server {
    ($name:ident, |$server:ident, $ctx_state:ident, $config:ident| $body:block) => {

        #[tokio::test(flavor="multi_thread")]
        #[serial_test::serial]
        async fn $name() {
            use std::sync::Arc;
            use async_trait::async_trait;
            use axum_test::{TestServer, TestServerConfig};
            use futures::FutureExt;
            use std::panic::resume_unwind;
            use tokio::sync::broadcast;
            use spotlight_server::config::AppConfig;
            use spotlight_server::database::client::{Database, DbConfig};
            use spotlight_server::interfaces::payment::PaymentInterface;
            use spotlight_server::middleware::mw_ctx::CtxState;
            use spotlight_server::utils::jwt::JWT;
            use spotlight_server::utils::stripe::models::{Account, AccountLink, Transfer, TransferRequest};

            struct MockPayment;

            #[async_trait]
            impl PaymentInterface for MockPayment {
                async fn recipient_link(
                    &self,
                    account: &str,
                    _refresh_url: &str,
                    _return_url: &str,
                ) -> Result<AccountLink, String> {
                    Ok(AccountLink {
                        account: account.to_string(),
                        url: format!("https://connect.example.com/onboard/{account}"),
                    })
                }

                async fn create_transfer(&self, request: TransferRequest) -> Result<Transfer, String> {
                    // accounts named acct_fail* simulate provider rejections
                    if request.destination_account.starts_with("acct_fail") {
                        return Err("destination account is not payable".to_string());
                    }
                    Ok(Transfer {
                        id: format!("tr_{}", request.idempotency_key.replace([':', ' '], "_")),
                    })
                }

                async fn create_recipient_account(
                    &self,
                    email: &str,
                    _country: &str,
                ) -> Result<Account, String> {
                    Ok(Account {
                        id: format!("acct_{}", email.replace(['@', '.'], "_")),
                        contact_email: email.to_string(),
                    })
                }
            }

            fn create_ctx_state(db: Database, config: &AppConfig) -> Arc<CtxState> {
                let (event_sender, _) = broadcast::channel(100);
                let ctx_state = CtxState {
                    db,
                    is_development: config.is_development,
                    stripe_secret_key: config.stripe_secret_key.clone(),
                    stripe_wh_secret: config.stripe_wh_secret.clone(),
                    stripe_platform_account: config.stripe_platform_account.clone(),
                    jwt: JWT::new(config.jwt_secret.clone(), chrono::Duration::days(1)),
                    event_sender,
                    payment: Arc::new(MockPayment {}),
                };
                Arc::new(ctx_state)
            }

            let $config = AppConfig {
                db_namespace: "test".to_string(),
                db_database: "test".to_string(),
                db_password: None,
                db_username: None,
                db_url: "mem://".to_string(),
                stripe_secret_key: "".to_string(),
                stripe_wh_secret: "".to_string(),
                stripe_platform_account: "".to_string(),
                jwt_secret: "secret".to_string(),
                is_development: true,
                sentry_project_link: None,
                settlement_sweep_secs: 1,
            };

            let $ctx_state = {
                let db = Database::connect(DbConfig {
                    url: &$config.db_url,
                    database: &$config.db_database,
                    namespace: &$config.db_namespace,
                    password: $config.db_password.as_deref(),
                    username: $config.db_username.as_deref(),
                })
                .await;

                db.run_migrations().await.unwrap();
                spotlight_server::init::run_migrations(&db).await.unwrap();
                create_ctx_state(db, &$config)
            };

            let routes_all = spotlight_server::init::main_router(&$ctx_state.clone());

            let $server = TestServer::new_with_config(
                routes_all,
                TestServerConfig {
                    transport: None,
                    save_cookies: true,
                    expect_success_by_default: false,
                    restrict_requests_with_http_schema: false,
                    default_content_type: None,
                    default_scheme: None,
                },
            )
            .expect("Failed to create test server");

            let test_result = std::panic::AssertUnwindSafe(async {
                (|| async $body)().await;
            })
            .catch_unwind()
            .await;

            $ctx_state.clone().db.client
                .query(format!("REMOVE DATABASE {};", $config.db_database))
                .await
                .expect("failed to remove database");

            if let Err(panic) = test_result {
                resume_unwind(panic);
            }
        }
    };
}
