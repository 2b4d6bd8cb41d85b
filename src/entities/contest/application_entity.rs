use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::contest::contest_entity;
use crate::entities::user_auth::local_user_entity::{self, UserView};
use crate::middleware;
use middleware::utils::db_utils::{
    get_entity, get_entity_list_view, with_not_found_err, IdentIdName, Pagination, QryOrder,
    ViewFieldSelector,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(EnumString, Display, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

/// One creator entry into a contest. Immutable apart from status; the metrics
/// snapshot is taken from the creator profile at apply time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContestApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub contest: Thing,
    pub created_by: Thing,
    pub status: ApplicationStatus,
    pub post_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_snapshot: Option<Value>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<String>,
}

/// Brand-facing entry listing with the creator joined in.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationView {
    pub id: Thing,
    pub created_by: UserView,
    pub status: ApplicationStatus,
    pub post_url: String,
    pub created_at: DateTime<Utc>,
}

impl ViewFieldSelector for ApplicationView {
    fn get_select_query_fields() -> String {
        "id,
        created_by.{id, username, full_name, image_uri} as created_by,
        status,
        post_url,
        created_at"
            .to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ContestApplicationCreate {
    pub contest: Thing,
    pub created_by: Thing,
    pub status: ApplicationStatus,
    pub post_url: String,
    pub metrics_snapshot: Option<Value>,
}

pub struct ApplicationDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "contest_application";
const CONTEST_TABLE: &str = contest_entity::TABLE_NAME;
const USER_TABLE: &str = local_user_entity::TABLE_NAME;

impl<'a> ApplicationDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS contest ON TABLE {TABLE_NAME} TYPE record<{CONTEST_TABLE}>;
    DEFINE INDEX IF NOT EXISTS contest_idx ON TABLE {TABLE_NAME} COLUMNS contest;
    DEFINE FIELD IF NOT EXISTS created_by ON TABLE {TABLE_NAME} TYPE record<{USER_TABLE}>;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string;
    DEFINE INDEX IF NOT EXISTS status_idx ON TABLE {TABLE_NAME} COLUMNS status;
    DEFINE FIELD IF NOT EXISTS post_url ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS metrics_snapshot ON TABLE {TABLE_NAME} FLEXIBLE TYPE option<object>;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS contest_user_idx ON TABLE {TABLE_NAME} COLUMNS contest, created_by UNIQUE;
    ");
        let mutation = self.db.query(sql).await?;

        mutation.check().expect("should mutate contestApplication");

        Ok(())
    }

    pub async fn create(&self, record: ContestApplicationCreate) -> CtxResult<ContestApplication> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<ContestApplication>| v.unwrap())
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<ContestApplication> {
        let opt = get_entity::<ContestApplication>(self.db, TABLE_NAME, &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    /// Entries for a contest in submission order. Submission order is the
    /// ranking tie-break, so the ordering here is load-bearing.
    pub async fn get_by_contest(
        &self,
        contest_id: &Thing,
        status: Option<ApplicationStatus>,
    ) -> CtxResult<Vec<ContestApplication>> {
        let qry = match status {
            Some(_) => format!(
                "SELECT * FROM {TABLE_NAME}
                    WHERE contest=<record>$contest AND status=$status
                    ORDER BY created_at ASC;"
            ),
            None => format!(
                "SELECT * FROM {TABLE_NAME}
                    WHERE contest=<record>$contest
                    ORDER BY created_at ASC;"
            ),
        };
        let mut qry = self.db.query(qry).bind(("contest", contest_id.to_raw()));
        if let Some(status) = status {
            qry = qry.bind(("status", status));
        }
        let mut res = qry.await?;
        Ok(res.take::<Vec<ContestApplication>>(0)?)
    }

    /// Same listing shaped for the review screen, creator joined in.
    pub async fn get_by_contest_view<T: for<'de> Deserialize<'de> + ViewFieldSelector>(
        &self,
        contest_id: &Thing,
        status: Option<ApplicationStatus>,
    ) -> CtxResult<Vec<T>> {
        let contest_filter = IdentIdName::ColumnIdent {
            column: "contest".to_string(),
            val: contest_id.to_raw(),
            rec: true,
        };
        let ident = match status {
            None => contest_filter,
            Some(status) => IdentIdName::ColumnIdentAnd(vec![
                contest_filter,
                IdentIdName::ColumnIdent {
                    column: "status".to_string(),
                    val: status.to_string(),
                    rec: false,
                },
            ]),
        };
        get_entity_list_view::<T>(
            self.db,
            TABLE_NAME,
            &ident,
            Some(Pagination {
                order_by: Some("created_at".to_string()),
                order_dir: Some(QryOrder::ASC),
                count: 100,
                start: 0,
            }),
        )
        .await
    }

    pub async fn set_status(
        &self,
        application_id: &Thing,
        status: ApplicationStatus,
    ) -> CtxResult<ContestApplication> {
        let mut res = self
            .db
            .query("UPDATE <record>$id SET status=$status RETURN AFTER;")
            .bind(("id", application_id.to_raw()))
            .bind(("status", status))
            .await?;
        let application = res.take::<Option<ContestApplication>>(0)?;
        with_not_found_err(application, self.ctx, application_id.to_raw().as_str())
    }
}
