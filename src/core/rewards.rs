use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::core::pool::WorkerPools;
use crate::core::proximity::ProximityMatcher;
use crate::error::Result;
use crate::models::{Attraction, User, UserReward, VisitedLocation};
use crate::services::providers::{with_timeout, RewardScoreProvider};
use crate::services::AttractionCatalog;

/// Outcome of one reward calculation for a user
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewardSummary {
    /// Unrewarded attractions within the proximity buffer of a visit
    pub matched: usize,
    /// Rewards stored by this call
    pub inserted: usize,
    /// Matches rewarded concurrently by another call
    pub skipped: usize,
    /// Matches left unrewarded because scoring failed
    pub failed: usize,
}

enum ScoreOutcome {
    Inserted,
    Skipped,
    Failed,
}

impl RewardSummary {
    fn record(&mut self, outcome: ScoreOutcome) {
        match outcome {
            ScoreOutcome::Inserted => self.inserted += 1,
            ScoreOutcome::Skipped => self.skipped += 1,
            ScoreOutcome::Failed => self.failed += 1,
        }
    }
}

/// A visit that qualifies for a reward at the catalog entry `attraction_index`
#[derive(Debug, Clone)]
struct Candidate {
    visited_location: VisitedLocation,
    attraction_index: usize,
}

/// Matches visited locations against the catalog and stores rewards
///
/// # Pipeline
/// 1. Fetch the shared catalog once per call
/// 2. Proximity matching on the proximity pool (CPU only)
/// 3. One scoring call per match on the scoring pool
/// 4. Insert-if-absent into the user's reward set
pub struct RewardsEngine {
    catalog: Arc<AttractionCatalog>,
    scores: Arc<dyn RewardScoreProvider>,
    matcher: ProximityMatcher,
    pools: Arc<WorkerPools>,
    call_timeout: Duration,
}

impl RewardsEngine {
    pub fn new(
        catalog: Arc<AttractionCatalog>,
        scores: Arc<dyn RewardScoreProvider>,
        matcher: ProximityMatcher,
        pools: Arc<WorkerPools>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            scores,
            matcher,
            pools,
            call_timeout,
        }
    }

    pub fn matcher(&self) -> &ProximityMatcher {
        &self.matcher
    }

    pub fn pools(&self) -> &Arc<WorkerPools> {
        &self.pools
    }

    pub fn get_user_rewards(&self, user: &User) -> Vec<UserReward> {
        user.rewards()
    }

    /// Points the scoring provider would award `user_id` for `attraction`
    ///
    /// Read-only: nothing is stored. The call takes a scoring permit like any
    /// other scoring request.
    pub async fn get_reward_points(&self, attraction: &Attraction, user_id: Uuid) -> Result<i32> {
        let _permit = self.pools.acquire_scoring().await?;
        let points = with_timeout(
            "getRewards",
            self.call_timeout,
            self.scores.get_points(attraction.attraction_id, user_id),
        )
        .await?;

        Ok(points)
    }

    /// Reward every unrewarded attraction the user has visited
    ///
    /// Safe to call repeatedly and concurrently for the same user: each
    /// attraction ends up with at most one reward, and existing rewards are
    /// never rescored. A scoring failure leaves that attraction unrewarded
    /// for the next call without affecting the others.
    pub async fn calculate_rewards(&self, user: &Arc<User>) -> Result<RewardSummary> {
        let visited = user.visited_locations();
        if visited.is_empty() {
            return Ok(RewardSummary::default());
        }

        let attractions = self.catalog.attractions().await?;
        let rewarded = user.rewarded_attraction_ids();

        let matcher = self.matcher;
        let catalog = Arc::clone(&attractions);
        let candidates = self
            .pools
            .run_proximity(move || find_candidates(&matcher, &visited, &catalog, &rewarded))
            .await?;

        let mut summary = RewardSummary {
            matched: candidates.len(),
            ..RewardSummary::default()
        };

        if candidates.is_empty() {
            return Ok(summary);
        }

        tracing::debug!(user = %user.name(), matched = candidates.len(), "Scoring reward candidates");

        let mut tasks = JoinSet::new();
        for candidate in candidates {
            // Waits here when the scoring pool is saturated
            let permit = self.pools.acquire_scoring().await?;

            let user = Arc::clone(user);
            let attractions = Arc::clone(&attractions);
            let scores = Arc::clone(&self.scores);
            let call_timeout = self.call_timeout;

            tasks.spawn(async move {
                let _permit = permit;
                let attraction = &attractions[candidate.attraction_index];
                score_candidate(&*scores, &user, candidate.visited_location, attraction, call_timeout).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    tracing::error!(user = %user.name(), "Scoring task failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        if summary.failed > 0 {
            tracing::warn!(
                user = %user.name(),
                failed = summary.failed,
                "Some rewards could not be scored and will be retried on the next cycle"
            );
        }

        Ok(summary)
    }
}

/// For each unrewarded attraction, the earliest visit within the proximity
/// buffer
fn find_candidates(
    matcher: &ProximityMatcher,
    visited: &[VisitedLocation],
    attractions: &[Attraction],
    rewarded: &HashSet<Uuid>,
) -> Vec<Candidate> {
    attractions
        .iter()
        .enumerate()
        .filter(|(_, attraction)| !rewarded.contains(&attraction.attraction_id))
        .filter_map(|(attraction_index, attraction)| {
            visited
                .iter()
                .find(|v| matcher.is_within_proximity_buffer(attraction, &v.location))
                .map(|v| Candidate {
                    visited_location: v.clone(),
                    attraction_index,
                })
        })
        .collect()
}

async fn score_candidate(
    scores: &dyn RewardScoreProvider,
    user: &User,
    visited_location: VisitedLocation,
    attraction: &Attraction,
    call_timeout: Duration,
) -> ScoreOutcome {
    // Another call may have stored it while this one waited for a permit
    if user.has_reward_for(attraction.attraction_id) {
        return ScoreOutcome::Skipped;
    }

    let points = with_timeout(
        "getRewards",
        call_timeout,
        scores.get_points(attraction.attraction_id, user.id()),
    )
    .await;

    match points {
        Ok(points) => {
            let reward = UserReward::new(visited_location, attraction.clone(), points);
            if user.add_reward(reward) {
                tracing::trace!(user = %user.name(), attraction = %attraction.attraction_name, points, "Reward stored");
                ScoreOutcome::Inserted
            } else {
                ScoreOutcome::Skipped
            }
        }
        Err(e) => {
            tracing::warn!(
                user = %user.name(),
                attraction = %attraction.attraction_name,
                "Failed to score reward: {}",
                e
            );
            ScoreOutcome::Failed
        }
    }
}
