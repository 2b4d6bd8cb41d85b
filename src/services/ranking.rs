use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::entities::contest::application_entity::ContestApplication;
use crate::entities::contest::contest_entity::RankCriterion;
use crate::services::metric_resolver;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub user: Thing,
    pub application: Thing,
    pub position: u32,
    pub metric_value: f64,
}

/// Orders entries by the contest criterion, best first, and keeps the top
/// `winner_count`. Entries are expected in submission order (created_at ASC):
/// the sort is stable, so on equal metric values the earlier entrant wins.
pub fn rank(
    entries: &[ContestApplication],
    criterion: RankCriterion,
    winner_count: u32,
) -> Vec<RankedEntry> {
    let mut scored: Vec<(&ContestApplication, f64)> = entries
        .iter()
        .map(|entry| {
            (
                entry,
                metric_resolver::resolve(entry.metrics_snapshot.as_ref(), criterion),
            )
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(winner_count as usize)
        .enumerate()
        .map(|(index, (entry, metric_value))| RankedEntry {
            user: entry.created_by.clone(),
            application: entry.id.clone().unwrap(),
            position: index as u32 + 1,
            metric_value,
        })
        .collect()
}
