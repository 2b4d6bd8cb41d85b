use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::{Id, Thing};

use crate::database::client::Db;
use crate::entities::contest::contest_entity::{self, CurrencySymbol, WinnerPayoutStatus};
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{get_entity, with_not_found_err, IdentIdName};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Display, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PayoutTimeline {
    pub status: PayoutStatus,
    pub date: DateTime<Utc>,
}

/// Per-winner transfer attempt and its outcome. Failed rows are terminal;
/// nothing in here retries on its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WinnerPayout {
    pub user: Thing,
    pub position: u32,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<String>,
    pub status: WinnerPayoutStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Audit record of one settlement run. Written once when dispatch starts and
/// once more with the per-winner outcomes; never rewritten after that.
#[derive(Debug, Serialize, Deserialize)]
pub struct Payout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub contest: Thing,
    pub brand_user: Thing,
    pub total_amount: i64,
    pub currency: CurrencySymbol,
    pub status: PayoutStatus,
    pub winner_payouts: Vec<WinnerPayout>,
    #[serde(default)]
    pub timelines: Vec<PayoutTimeline>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<String>,
}

pub struct PayoutDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "contest_payout";
const CONTEST_TABLE: &str = contest_entity::TABLE_NAME;
const USER_TABLE: &str = local_user_entity::TABLE_NAME;

impl<'a> PayoutDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS contest ON TABLE {TABLE_NAME} TYPE record<{CONTEST_TABLE}>;
    DEFINE INDEX IF NOT EXISTS contest_idx ON TABLE {TABLE_NAME} COLUMNS contest;
    DEFINE FIELD IF NOT EXISTS brand_user ON TABLE {TABLE_NAME} TYPE record<{USER_TABLE}>;
    DEFINE FIELD IF NOT EXISTS total_amount ON TABLE {TABLE_NAME} TYPE number;
    DEFINE FIELD IF NOT EXISTS currency ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string;
    DEFINE INDEX IF NOT EXISTS status_idx ON TABLE {TABLE_NAME} COLUMNS status;
    DEFINE FIELD IF NOT EXISTS winner_payouts ON TABLE {TABLE_NAME} FLEXIBLE TYPE array;
    DEFINE FIELD IF NOT EXISTS timelines ON TABLE {TABLE_NAME} FLEXIBLE TYPE array;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    ");
        let mutation = self.db.query(sql).await?;

        mutation.check().expect("should mutate contestPayout");

        Ok(())
    }

    pub async fn create_for_settlement(
        &self,
        id: Thing,
        contest: Thing,
        brand_user: Thing,
        total_amount: i64,
        currency: CurrencySymbol,
        winner_payouts: Vec<WinnerPayout>,
    ) -> CtxResult<Thing> {
        let _ = self
            .db
            .query(format!(
                "INSERT INTO {TABLE_NAME} {{
                id: $id,
                contest: $contest,
                brand_user: $brand_user,
                total_amount: $total_amount,
                currency: $currency,
                status: $status,
                winner_payouts: $winner_payouts,
                timelines: [{{ status: $status, date: time::now() }}]
            }};"
            ))
            .bind(("id", id.clone()))
            .bind(("contest", contest))
            .bind(("brand_user", brand_user))
            .bind(("total_amount", total_amount))
            .bind(("currency", currency))
            .bind(("status", PayoutStatus::Processing))
            .bind(("winner_payouts", winner_payouts))
            .await?
            .check()?;

        Ok(id)
    }

    pub async fn record_results(
        &self,
        payout_id: &Thing,
        status: PayoutStatus,
        winner_payouts: Vec<WinnerPayout>,
    ) -> CtxResult<()> {
        self.db
            .query(
                "UPDATE <record>$id SET
                    status=$status,
                    winner_payouts=$winner_payouts,
                    timelines+=[{ status: $status, date: time::now() }];",
            )
            .bind(("id", payout_id.to_raw()))
            .bind(("status", status))
            .bind(("winner_payouts", winner_payouts))
            .await?
            .check()
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<Payout> {
        let opt = get_entity::<Payout>(self.db, TABLE_NAME, &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get_by_contest(&self, contest_id: &Thing) -> CtxResult<Vec<Payout>> {
        let mut res = self
            .db
            .query(format!(
                "SELECT * FROM {TABLE_NAME}
                    WHERE contest=<record>$contest ORDER BY created_at DESC;"
            ))
            .bind(("contest", contest_id.to_raw()))
            .await?;
        Ok(res.take::<Vec<Payout>>(0)?)
    }

    pub fn generate_id() -> Thing {
        Thing::from((TABLE_NAME, Id::ulid()))
    }
}
