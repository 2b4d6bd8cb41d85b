use serde_json::Value;

use crate::entities::contest::contest_entity::RankCriterion;

/// Creator metrics arrive in one of several legacy shapes depending on when
/// the profile was written. Lookup is an explicit accessor chain instead of
/// optional chaining sprinkled through handlers; first hit wins.
type Accessor = for<'a> fn(&'a Value, &str) -> Option<&'a Value>;

fn top_level_metrics<'a>(profile: &'a Value, criterion: &str) -> Option<&'a Value> {
    profile.get("tiktok_metrics")?.get(criterion)
}

fn nested_profile_metrics<'a>(profile: &'a Value, criterion: &str) -> Option<&'a Value> {
    profile
        .get("creator_profile_data")?
        .get("tiktok_metrics")?
        .get(criterion)
}

// oldest vintage stores a precomputed average per criterion
fn precomputed_average<'a>(profile: &'a Value, criterion: &str) -> Option<&'a Value> {
    profile
        .get("tiktok_data")?
        .get(format!("tiktok_average_{criterion}").as_str())
}

const ACCESSORS: [Accessor; 3] = [top_level_metrics, nested_profile_metrics, precomputed_average];

fn as_finite_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(num) => num.as_f64().filter(|v| v.is_finite()),
        // the oldest profiles stored counts as strings
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Missing or malformed data resolves to 0 so every approved entry stays
/// rankable; an unknown profile ranks last, it is never dropped.
pub fn resolve(profile: Option<&Value>, criterion: RankCriterion) -> f64 {
    let Some(profile) = profile else {
        return 0.0;
    };
    let criterion = criterion.to_string();
    ACCESSORS
        .iter()
        .find_map(|accessor| accessor(profile, &criterion).and_then(as_finite_number))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_top_level_metrics() {
        let profile = json!({ "tiktok_metrics": { "views": 1200, "likes": 40 } });
        assert_eq!(resolve(Some(&profile), RankCriterion::Views), 1200.0);
        assert_eq!(resolve(Some(&profile), RankCriterion::Likes), 40.0);
    }

    #[test]
    fn resolves_nested_profile_metrics() {
        let profile = json!({
            "creator_profile_data": { "tiktok_metrics": { "comments": 77 } }
        });
        assert_eq!(resolve(Some(&profile), RankCriterion::Comments), 77.0);
    }

    #[test]
    fn resolves_precomputed_average() {
        let profile = json!({ "tiktok_data": { "tiktok_average_views": 350.5 } });
        assert_eq!(resolve(Some(&profile), RankCriterion::Views), 350.5);
    }

    #[test]
    fn top_level_wins_over_older_shapes() {
        let profile = json!({
            "tiktok_metrics": { "views": 10 },
            "creator_profile_data": { "tiktok_metrics": { "views": 999 } },
            "tiktok_data": { "tiktok_average_views": 999 }
        });
        assert_eq!(resolve(Some(&profile), RankCriterion::Views), 10.0);
    }

    #[test]
    fn parses_string_counts() {
        let profile = json!({ "tiktok_metrics": { "shares": " 42 " } });
        assert_eq!(resolve(Some(&profile), RankCriterion::Shares), 42.0);
    }

    #[test]
    fn malformed_candidate_falls_through_to_next_shape() {
        let profile = json!({
            "tiktok_metrics": { "views": "n/a" },
            "creator_profile_data": { "tiktok_metrics": { "views": 55 } }
        });
        assert_eq!(resolve(Some(&profile), RankCriterion::Views), 55.0);
    }

    #[test]
    fn missing_profile_defaults_to_zero() {
        assert_eq!(resolve(None, RankCriterion::Views), 0.0);
        let profile = json!({ "bio": "no metrics here" });
        assert_eq!(resolve(Some(&profile), RankCriterion::Views), 0.0);
        let profile = json!({ "tiktok_metrics": { "views": null } });
        assert_eq!(resolve(Some(&profile), RankCriterion::Views), 0.0);
    }
}
