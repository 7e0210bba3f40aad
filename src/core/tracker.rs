use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex as AsyncMutex, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::rewards::RewardsEngine;
use crate::models::{User, VisitedLocation};
use crate::services::providers::{with_timeout, LocationProvider, ProviderError};
use crate::services::UserStore;

/// Produces location samples for users, on demand or periodically
///
/// Every new sample is appended to the user's history and triggers a
/// background reward calculation.
pub struct LocationTracker {
    locations: Arc<dyn LocationProvider>,
    rewards: Arc<RewardsEngine>,
    store: Arc<UserStore>,
    poll_interval: Duration,
    call_timeout: Duration,
    concurrency: Arc<Semaphore>,
    /// One guard per user whose first sample is being fetched
    first_fetch: DashMap<Uuid, Arc<AsyncMutex<()>>>,
    shutdown_tx: watch::Sender<bool>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl LocationTracker {
    pub fn new(
        locations: Arc<dyn LocationProvider>,
        rewards: Arc<RewardsEngine>,
        store: Arc<UserStore>,
        poll_interval: Duration,
        call_timeout: Duration,
        max_concurrent_polls: usize,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            locations,
            rewards,
            store,
            poll_interval,
            call_timeout,
            concurrency: Arc::new(Semaphore::new(max_concurrent_polls.max(1))),
            first_fetch: DashMap::new(),
            shutdown_tx,
            poller: Mutex::new(None),
        }
    }

    /// Current position of a user, served from history when available
    ///
    /// Only a user without any history causes a remote fetch, and concurrent
    /// callers for that user share a single one.
    pub async fn refresh(&self, user: &Arc<User>) -> Result<VisitedLocation, ProviderError> {
        if let Some(last) = user.last_visited_location() {
            return Ok(last);
        }

        let guard = Arc::clone(self.first_fetch.entry(user.id()).or_default().value());
        let result = {
            let _first = guard.lock().await;
            // The caller that held the guard before us may have recorded a sample
            match user.last_visited_location() {
                Some(last) => Ok(last),
                None => self.track_user_location(user).await,
            }
        };

        if result.is_ok() {
            self.first_fetch.remove(&user.id());
        }
        result
    }

    /// Fetch a fresh sample, record it and schedule reward calculation
    ///
    /// Returns as soon as the sample is recorded; rewards are computed in the
    /// background.
    pub async fn track_user_location(&self, user: &Arc<User>) -> Result<VisitedLocation, ProviderError> {
        let visited = with_timeout(
            "getUserLocation",
            self.call_timeout,
            self.locations.get_user_location(user.id()),
        )
        .await?;

        if visited.user_id != user.id() {
            return Err(ProviderError::InvalidResponse(format!(
                "location for {} returned for user {}",
                visited.user_id,
                user.id()
            )));
        }

        user.add_visited_location(visited.clone());
        self.spawn_reward_calculation(user);

        Ok(visited)
    }

    fn spawn_reward_calculation(&self, user: &Arc<User>) {
        let rewards = Arc::clone(&self.rewards);
        let user = Arc::clone(user);

        tokio::spawn(async move {
            match rewards.calculate_rewards(&user).await {
                Ok(summary) => debug!(user = %user.name(), ?summary, "Rewards calculated"),
                Err(e) => warn!(user = %user.name(), "Reward calculation failed: {}", e),
            }
        });
    }

    /// Start polling every known user on the configured interval
    ///
    /// Returns `false` if polling is already running.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut poller = self.poller.lock();
        if poller.is_some() {
            return false;
        }

        self.shutdown_tx.send_replace(false);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let tracker = Arc::clone(self);

        info!(interval = ?self.poll_interval, "Location tracker started");
        *poller = Some(tokio::spawn(tracker.run(shutdown_rx)));
        true
    }

    /// Stop scheduling polls and wait for the polling loop to exit
    ///
    /// Refreshes already in flight are left to finish.
    pub async fn stop(&self) {
        self.shutdown_tx.send_replace(true);

        let handle = self.poller.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Location tracker loop ended abnormally: {}", e);
            }
            info!("Location tracker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.poller.lock().is_some() && !self.is_stopping()
    }

    fn is_stopping(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll_all_users().await,
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }

            if self.is_stopping() {
                break;
            }
        }
    }

    /// Schedule one independent refresh per user
    async fn poll_all_users(self: &Arc<Self>) {
        let users = self.store.all_users();
        debug!(users = users.len(), "Begin tracker poll");

        for user in users {
            if self.is_stopping() {
                debug!("Tracker stopping, skipping remaining users");
                return;
            }

            let permit = match Arc::clone(&self.concurrency).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let tracker = Arc::clone(self);

            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = tracker.track_user_location(&user).await {
                    warn!(user = %user.name(), "Failed to track user location: {}", e);
                }
            });
        }
    }
}
