use dotenvy;

#[derive(Debug)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub stripe_secret_key: String,
    pub stripe_wh_secret: String,
    pub stripe_platform_account: String,
    pub jwt_secret: String,
    pub is_development: bool,
    pub sentry_project_link: Option<String>,
    pub settlement_sweep_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").expect("Missing DB_URL in env");

        let stripe_secret_key =
            std::env::var("STRIPE_SECRET_KEY").expect("Missing STRIPE_SECRET_KEY in env");
        let stripe_wh_secret =
            std::env::var("STRIPE_WEBHOOK_SECRET").expect("Missing STRIPE_WEBHOOK_SECRET in env");
        let stripe_platform_account = std::env::var("STRIPE_PLATFORM_ACCOUNT")
            .expect("Missing STRIPE_PLATFORM_ACCOUNT in env");
        let jwt_secret = std::env::var("JWT_SECRET").expect("Missing JWT_SECRET in env");

        let is_development = std::env::var("DEVELOPMENT")
            .expect("set DEVELOPMENT env var")
            .eq("true");

        let sentry_project_link = std::env::var("SENTRY_PROJECT_LINK").ok();

        let settlement_sweep_secs = std::env::var("SETTLEMENT_SWEEP_SECS").map_or(60, |t| {
            t.parse::<u64>().expect("SETTLEMENT_SWEEP_SECS must be number")
        });

        Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            stripe_secret_key,
            stripe_wh_secret,
            stripe_platform_account,
            jwt_secret,
            is_development,
            sentry_project_link,
            settlement_sweep_secs,
        }
    }
}
