use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{
    get_entity, get_entity_list, with_not_found_err, IdentIdName, Pagination,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Display, Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum CurrencySymbol {
    USD,
    EUR,
}

/// Metric a contest ranks its entries by.
#[derive(EnumString, Display, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RankCriterion {
    Views,
    Likes,
    Comments,
    Shares,
}

#[derive(EnumString, Display, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ContestStatus {
    Draft,
    Active,
    Completed,
    Rejected,
    RequestEdit,
    Cancelled,
}

impl ContestStatus {
    /// Lifecycle is monotonic apart from the edit-request loop back to Active.
    pub fn can_transition_to(&self, next: &ContestStatus) -> bool {
        use ContestStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Draft, Rejected)
                | (Draft, Cancelled)
                | (Active, Completed)
                | (Active, RequestEdit)
                | (Active, Cancelled)
                | (RequestEdit, Active)
                | (RequestEdit, Cancelled)
        )
    }
}

/// Settlement progress on the contest itself. `None` means never settled;
/// the move to `Processing` is the double-settlement guard.
#[derive(EnumString, Display, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ContestPayoutStatus {
    None,
    Processing,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PrizePosition {
    Amount { amount: i64 },
    Percentage { percentage: u32 },
}

/// Prize configuration. All amounts are minor units (cents); a contest uses
/// either absolute amounts or percentages of the budget, not a mix.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrizePlan {
    pub total_budget: i64,
    pub winner_count: u32,
    pub positions: Vec<PrizePosition>,
    pub criterion: RankCriterion,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Display, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum WinnerPayoutStatus {
    Pending,
    Completed,
    Failed,
}

/// Denormalized winner summary kept on the contest; the payout record is the
/// audit source of truth for money movement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContestWinner {
    pub user: Thing,
    pub application: Thing,
    pub position: u32,
    pub prize_amount: i64,
    pub metric_value: f64,
    pub payout_status: WinnerPayoutStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub created_by: Thing,
    pub title: String,
    pub description: String,
    pub status: ContestStatus,
    pub currency: CurrencySymbol,
    pub prize_plan: PrizePlan,
    pub payout_status: ContestPayoutStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winners: Option<Vec<ContestWinner>>,
    #[serde(default)]
    pub funded_amount: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContestCreate {
    pub created_by: Thing,
    pub title: String,
    pub description: String,
    pub status: ContestStatus,
    pub currency: CurrencySymbol,
    pub prize_plan: PrizePlan,
    pub payout_status: ContestPayoutStatus,
    pub funded_amount: i64,
}

pub struct ContestDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "contest";
const USER_TABLE: &str = local_user_entity::TABLE_NAME;

impl<'a> ContestDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS created_by ON TABLE {TABLE_NAME} TYPE record<{USER_TABLE}>;
    DEFINE INDEX IF NOT EXISTS created_by_idx ON TABLE {TABLE_NAME} COLUMNS created_by;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string;
    DEFINE INDEX IF NOT EXISTS status_idx ON TABLE {TABLE_NAME} COLUMNS status;
    DEFINE FIELD IF NOT EXISTS currency ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS prize_plan ON TABLE {TABLE_NAME} FLEXIBLE TYPE object;
    DEFINE FIELD IF NOT EXISTS payout_status ON TABLE {TABLE_NAME} TYPE string DEFAULT 'None';
    DEFINE INDEX IF NOT EXISTS payout_status_idx ON TABLE {TABLE_NAME} COLUMNS payout_status;
    DEFINE FIELD IF NOT EXISTS winners ON TABLE {TABLE_NAME} FLEXIBLE TYPE option<array>;
    DEFINE FIELD IF NOT EXISTS funded_amount ON TABLE {TABLE_NAME} TYPE number DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    ");
        let mutation = self.db.query(sql).await?;

        mutation.check().expect("should mutate contest");

        Ok(())
    }

    pub async fn create(&self, record: ContestCreate) -> CtxResult<Contest> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<Contest>| v.unwrap())
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<Contest> {
        let opt = get_entity::<Contest>(self.db, TABLE_NAME, &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get_by_creator(
        &self,
        creator: &Thing,
        pagination: Option<Pagination>,
    ) -> CtxResult<Vec<Contest>> {
        get_entity_list::<Contest>(
            self.db,
            TABLE_NAME,
            &IdentIdName::ColumnIdent {
                column: "created_by".to_string(),
                val: creator.to_raw(),
                rec: true,
            },
            pagination,
        )
        .await
    }

    pub async fn set_status(&self, contest_id: &Thing, status: ContestStatus) -> CtxResult<Contest> {
        let mut res = self
            .db
            .query("UPDATE <record>$id SET status=$status RETURN AFTER;")
            .bind(("id", contest_id.to_raw()))
            .bind(("status", status))
            .await?;
        let contest = res.take::<Option<Contest>>(0)?;
        with_not_found_err(contest, self.ctx, contest_id.to_raw().as_str())
    }

    pub async fn set_winners(
        &self,
        contest_id: &Thing,
        winners: Vec<ContestWinner>,
    ) -> CtxResult<Contest> {
        let mut res = self
            .db
            .query("UPDATE <record>$id SET winners=$winners RETURN AFTER;")
            .bind(("id", contest_id.to_raw()))
            .bind(("winners", winners))
            .await?;
        let contest = res.take::<Option<Contest>>(0)?;
        with_not_found_err(contest, self.ctx, contest_id.to_raw().as_str())
    }

    /// Conditional write used as the double-settlement guard: flips
    /// payout_status None->Processing only while the contest is Completed.
    /// Returns None when the guard did not pass (caller decides why).
    pub async fn try_begin_settlement(&self, contest_id: &Thing) -> CtxResult<Option<Contest>> {
        let mut res = self
            .db
            .query(
                "UPDATE <record>$id SET payout_status=$processing
                    WHERE status=$completed AND payout_status=$none RETURN AFTER;",
            )
            .bind(("id", contest_id.to_raw()))
            .bind(("processing", ContestPayoutStatus::Processing))
            .bind(("completed", ContestStatus::Completed))
            .bind(("none", ContestPayoutStatus::None))
            .await?;
        Ok(res.take::<Option<Contest>>(0)?)
    }

    pub async fn finish_settlement(
        &self,
        contest_id: &Thing,
        winners: Vec<ContestWinner>,
    ) -> CtxResult<()> {
        self.db
            .query("UPDATE <record>$id SET payout_status=$completed, winners=$winners;")
            .bind(("id", contest_id.to_raw()))
            .bind(("completed", ContestPayoutStatus::Completed))
            .bind(("winners", winners))
            .await?
            .check()
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn add_funded_amount(&self, contest_id: &Thing, amount: i64) -> CtxResult<()> {
        self.db
            .query("UPDATE <record>$id SET funded_amount += $amount;")
            .bind(("id", contest_id.to_raw()))
            .bind(("amount", amount))
            .await?
            .check()
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    /// Contests with finalized winners whose payouts have not started yet.
    /// The caller applies the end-date cutoff.
    pub async fn get_ready_for_settlement(&self) -> CtxResult<Vec<Contest>> {
        let mut res = self
            .db
            .query(format!(
                "SELECT * FROM {TABLE_NAME}
                    WHERE status=$completed AND payout_status=$none AND winners != NONE;"
            ))
            .bind(("completed", ContestStatus::Completed))
            .bind(("none", ContestPayoutStatus::None))
            .await?;
        Ok(res.take::<Vec<Contest>>(0)?)
    }
}
