use std::collections::BTreeMap;

use super::filter::FilteredView;

// ---------------------------------------------------------------------------
// Scores by genre (scatter)
// ---------------------------------------------------------------------------

/// One scatter point: a game's user and critic score, coloured by genre.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingPoint {
    pub user_score: f64,
    pub critic_score: f64,
    pub genre: String,
}

/// One point per record in the view, in view order.
pub fn to_rating_aggregate(view: &FilteredView<'_>) -> Vec<RatingPoint> {
    view.iter()
        .map(|rec| RatingPoint {
            user_score: rec.user_score,
            critic_score: rec.critic_score,
            genre: rec.genre.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Releases by year and platform (stacked area)
// ---------------------------------------------------------------------------

/// Number of releases on one platform in one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCount {
    pub year: i32,
    pub platform: String,
    pub count: usize,
}

/// Group the view by `(year, platform)` and count each group.
///
/// Rows come out ordered by year ascending, then platform name.
pub fn to_platform_aggregate(view: &FilteredView<'_>) -> Vec<PlatformCount> {
    let mut groups: BTreeMap<(i32, &str), usize> = BTreeMap::new();
    for rec in view.iter() {
        *groups.entry((rec.year, rec.platform.as_str())).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|((year, platform), count)| PlatformCount {
            year,
            platform: platform.to_string(),
            count,
        })
        .collect()
}
