use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::Sender;
use validator::Validate;

use crate::{
    database::client::Db,
    entities::contest::{
        application_entity::{
            ApplicationDbService, ApplicationStatus, ApplicationView, ContestApplication,
            ContestApplicationCreate,
        },
        contest_entity::{
            Contest, ContestCreate, ContestDbService, ContestPayoutStatus, ContestStatus,
            ContestWinner, CurrencySymbol, PrizePlan, PrizePosition, RankCriterion,
        },
    },
    entities::user_auth::local_user_entity::LocalUserDbService,
    interfaces::repositories::user_notifications::UserNotificationsInterface,
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        mw_ctx::AppEvent,
        utils::db_utils::IdentIdName,
        utils::string_utils::get_str_thing,
    },
    services::notification_service::NotificationService,
    services::prize_allocator,
    services::ranking,
};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ContestInput {
    #[validate(length(min = 5, message = "Min 5 characters for title"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub currency: Option<CurrencySymbol>,
    #[validate(range(min = 1))]
    pub total_budget: i64,
    #[validate(range(min = 1))]
    pub winner_count: u32,
    pub positions: Vec<PrizePosition>,
    pub criterion: RankCriterion,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

pub struct ContestService<'a, N>
where
    N: UserNotificationsInterface,
{
    contests_repository: ContestDbService<'a>,
    applications_repository: ApplicationDbService<'a>,
    users_repository: LocalUserDbService<'a>,
    notification_service: NotificationService<'a, N>,
    ctx: &'a Ctx,
}

impl<'a, N> ContestService<'a, N>
where
    N: UserNotificationsInterface,
{
    pub fn new(
        db: &'a Db,
        ctx: &'a Ctx,
        event_sender: &'a Sender<AppEvent>,
        notification_repository: &'a N,
    ) -> Self {
        Self {
            contests_repository: ContestDbService { db, ctx },
            applications_repository: ApplicationDbService { db, ctx },
            users_repository: LocalUserDbService { db, ctx },
            notification_service: NotificationService::new(ctx, event_sender, notification_repository),
            ctx,
        }
    }

    pub async fn create(&self, user_id: &str, data: ContestInput) -> CtxResult<Contest> {
        data.validate()
            .map_err(|e| AppError::Generic {
                description: e.to_string(),
            })?;

        let user_thing = get_str_thing(user_id)?;
        let _ = self
            .users_repository
            .exists(IdentIdName::Id(user_thing.clone()))
            .await?;

        let plan = PrizePlan {
            total_budget: data.total_budget,
            winner_count: data.winner_count,
            positions: data.positions,
            criterion: data.criterion,
            start_at: data.start_at,
            end_at: data.end_at,
        };
        validate_prize_plan(&plan).map_err(|e| self.ctx.to_ctx_error(e))?;

        self.contests_repository
            .create(ContestCreate {
                created_by: user_thing,
                title: data.title,
                description: data.description,
                status: ContestStatus::Draft,
                currency: data.currency.unwrap_or(CurrencySymbol::USD),
                prize_plan: plan,
                payout_status: ContestPayoutStatus::None,
                funded_amount: 0,
            })
            .await
    }

    pub async fn set_status(
        &self,
        user_id: &str,
        contest_id: &str,
        next: ContestStatus,
    ) -> CtxResult<Contest> {
        let user_thing = get_str_thing(user_id)?;
        let contest_thing = get_str_thing(contest_id)?;
        let contest = self
            .contests_repository
            .get(IdentIdName::Id(contest_thing.clone()))
            .await?;

        if contest.created_by != user_thing {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden));
        }
        if !contest.status.can_transition_to(&next) {
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: format!("Cannot move contest from {} to {next}", contest.status),
            }));
        }

        self.contests_repository
            .set_status(&contest_thing, next)
            .await
    }

    pub async fn apply(
        &self,
        user_id: &str,
        contest_id: &str,
        post_url: String,
    ) -> CtxResult<ContestApplication> {
        let user_thing = get_str_thing(user_id)?;
        let contest_thing = get_str_thing(contest_id)?;

        let contest = self
            .contests_repository
            .get(IdentIdName::Id(contest_thing.clone()))
            .await?;
        if contest.status != ContestStatus::Active {
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: "Contest is not accepting entries".to_string(),
            }));
        }
        if contest.created_by == user_thing {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden));
        }

        let user = self
            .users_repository
            .get(IdentIdName::Id(user_thing.clone()))
            .await?;

        self.applications_repository
            .create(ContestApplicationCreate {
                contest: contest_thing,
                created_by: user_thing,
                status: ApplicationStatus::Pending,
                post_url,
                // ranking later reads this snapshot, not the live profile
                metrics_snapshot: user.creator_metrics,
            })
            .await
    }

    pub async fn set_application_status(
        &self,
        user_id: &str,
        application_id: &str,
        next: ApplicationStatus,
    ) -> CtxResult<ContestApplication> {
        let user_thing = get_str_thing(user_id)?;
        let application_thing = get_str_thing(application_id)?;

        let application = self
            .applications_repository
            .get(IdentIdName::Id(application_thing.clone()))
            .await?;
        let contest = self
            .contests_repository
            .get(IdentIdName::Id(application.contest.clone()))
            .await?;

        if contest.created_by != user_thing {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden));
        }
        if application.status != ApplicationStatus::Pending {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden));
        }
        let approved = match next {
            ApplicationStatus::Approved => true,
            ApplicationStatus::Rejected => false,
            ApplicationStatus::Pending => {
                return Err(self.ctx.to_ctx_error(AppError::Forbidden));
            }
        };

        let application = self
            .applications_repository
            .set_status(&application_thing, next)
            .await?;

        let _ = self
            .notification_service
            .on_application_status(
                &user_thing,
                &application.created_by,
                &application.contest,
                approved,
            )
            .await;

        Ok(application)
    }

    pub async fn get_applications(
        &self,
        user_id: &str,
        contest_id: &str,
        status: Option<ApplicationStatus>,
    ) -> CtxResult<Vec<ApplicationView>> {
        let user_thing = get_str_thing(user_id)?;
        let contest_thing = get_str_thing(contest_id)?;
        let contest = self
            .contests_repository
            .get(IdentIdName::Id(contest_thing.clone()))
            .await?;
        if contest.created_by != user_thing {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden));
        }
        self.applications_repository
            .get_by_contest_view::<ApplicationView>(&contest_thing, status)
            .await
    }

    /// Ranks approved entries by the contest criterion and writes the winner
    /// list with allocated prize amounts onto the contest. Runs once per
    /// contest; settlement picks the list up from there.
    pub async fn finalize_winners(
        &self,
        user_id: &str,
        contest_id: &str,
    ) -> CtxResult<Vec<ContestWinner>> {
        let user_thing = get_str_thing(user_id)?;
        let contest_thing = get_str_thing(contest_id)?;
        let contest = self
            .contests_repository
            .get(IdentIdName::Id(contest_thing.clone()))
            .await?;

        if contest.created_by != user_thing {
            return Err(self.ctx.to_ctx_error(AppError::Forbidden));
        }
        if contest.status != ContestStatus::Completed {
            return Err(self.ctx.to_ctx_error(AppError::ContestNotReady {
                status: contest.status.to_string(),
            }));
        }
        if contest.payout_status != ContestPayoutStatus::None {
            return Err(self.ctx.to_ctx_error(AppError::ContestAlreadySettled));
        }
        if contest.winners.is_some() {
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: "Winners already finalized".to_string(),
            }));
        }

        // approved entries come back in submission order, the ranking tie-break
        let entries = self
            .applications_repository
            .get_by_contest(&contest_thing, Some(ApplicationStatus::Approved))
            .await?;

        let ranked = ranking::rank(
            &entries,
            contest.prize_plan.criterion,
            contest.prize_plan.winner_count,
        );
        let winners = prize_allocator::allocate(ranked, &contest.prize_plan);

        let _ = self
            .contests_repository
            .set_winners(&contest_thing, winners.clone())
            .await?;

        let winner_users = winners.iter().map(|w| w.user.clone()).collect::<Vec<_>>();
        let _ = self
            .notification_service
            .on_winners_finalized(&user_thing, &contest_thing, winner_users)
            .await;

        Ok(winners)
    }
}

fn validate_prize_plan(plan: &PrizePlan) -> Result<(), AppError> {
    if plan.positions.is_empty() {
        return Err(AppError::Generic {
            description: "Prize plan needs at least one position".to_string(),
        });
    }
    if plan.end_at <= plan.start_at {
        return Err(AppError::Generic {
            description: "Contest end date must be after the start date".to_string(),
        });
    }

    let all_amounts = plan
        .positions
        .iter()
        .all(|p| matches!(p, PrizePosition::Amount { .. }));
    let all_percentages = plan
        .positions
        .iter()
        .all(|p| matches!(p, PrizePosition::Percentage { .. }));
    if !all_amounts && !all_percentages {
        return Err(AppError::Generic {
            description: "Prize positions must all be amounts or all percentages".to_string(),
        });
    }

    if all_percentages {
        let sum: u32 = plan
            .positions
            .iter()
            .map(|p| match p {
                PrizePosition::Percentage { percentage } => *percentage,
                PrizePosition::Amount { .. } => 0,
            })
            .sum();
        if sum > 100 {
            return Err(AppError::Generic {
                description: format!("Prize percentages sum to {sum}, max is 100"),
            });
        }
    }

    if all_amounts {
        let sum: i64 = plan
            .positions
            .iter()
            .map(|p| match p {
                PrizePosition::Amount { amount } => *amount,
                PrizePosition::Percentage { .. } => 0,
            })
            .sum();
        if sum > plan.total_budget {
            return Err(AppError::Generic {
                description: "Prize amounts exceed the total budget".to_string(),
            });
        }
    }

    Ok(())
}
