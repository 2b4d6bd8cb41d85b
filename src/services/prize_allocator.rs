use crate::entities::contest::contest_entity::{
    ContestWinner, PrizePlan, PrizePosition, WinnerPayoutStatus,
};
use crate::services::ranking::RankedEntry;

/// Amount for a 1-based position. Positions past the configured table pay 0;
/// an under-configured prize table is not an error. Percentage amounts use
/// integer division so the allocated sum can never exceed the budget; any
/// rounding remainder stays with the brand.
pub fn position_amount(plan: &PrizePlan, position: u32) -> i64 {
    match plan.positions.get(position.saturating_sub(1) as usize) {
        None => 0,
        Some(PrizePosition::Amount { amount }) => *amount,
        Some(PrizePosition::Percentage { percentage }) => {
            plan.total_budget * (*percentage as i64) / 100
        }
    }
}

pub fn allocate(ranked: Vec<RankedEntry>, plan: &PrizePlan) -> Vec<ContestWinner> {
    ranked
        .into_iter()
        .map(|entry| ContestWinner {
            prize_amount: position_amount(plan, entry.position),
            user: entry.user,
            application: entry.application,
            position: entry.position,
            metric_value: entry.metric_value,
            payout_status: WinnerPayoutStatus::Pending,
        })
        .collect()
}
