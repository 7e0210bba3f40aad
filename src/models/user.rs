use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{Provider, UserPreferences, UserReward, VisitedLocation};

/// A tracked user
///
/// Shared as `Arc<User>` between the store, the tracker and the rewards
/// engine. The visited-location history is append-only and the reward set is
/// keyed by attraction id, so concurrent scoring tasks can only ever store one
/// reward per attraction.
#[derive(Debug)]
pub struct User {
    id: Uuid,
    name: String,
    phone_number: String,
    email_address: String,
    visited_locations: RwLock<Vec<VisitedLocation>>,
    rewards: DashMap<Uuid, UserReward>,
    preferences: RwLock<UserPreferences>,
    trip_deals: RwLock<Vec<Provider>>,
}

impl User {
    pub fn new(id: Uuid, name: &str, phone_number: &str, email_address: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            email_address: email_address.to_string(),
            visited_locations: RwLock::new(Vec::new()),
            rewards: DashMap::new(),
            preferences: RwLock::new(UserPreferences::default()),
            trip_deals: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    pub fn add_visited_location(&self, visited: VisitedLocation) {
        self.visited_locations.write().push(visited);
    }

    /// Snapshot of the history in chronological order
    pub fn visited_locations(&self) -> Vec<VisitedLocation> {
        self.visited_locations.read().clone()
    }

    pub fn last_visited_location(&self) -> Option<VisitedLocation> {
        self.visited_locations.read().last().cloned()
    }

    pub fn has_visited_locations(&self) -> bool {
        !self.visited_locations.read().is_empty()
    }

    pub fn clear_visited_locations(&self) {
        self.visited_locations.write().clear();
    }

    /// Store a reward unless one already exists for the same attraction
    ///
    /// Returns `true` when this call inserted the reward. The check and the
    /// insert happen under the same shard lock.
    pub fn add_reward(&self, reward: UserReward) -> bool {
        match self.rewards.entry(reward.attraction.attraction_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(reward);
                true
            }
        }
    }

    pub fn has_reward_for(&self, attraction_id: Uuid) -> bool {
        self.rewards.contains_key(&attraction_id)
    }

    pub fn rewarded_attraction_ids(&self) -> HashSet<Uuid> {
        self.rewards.iter().map(|entry| *entry.key()).collect()
    }

    /// Unordered snapshot of the reward set
    pub fn rewards(&self) -> Vec<UserReward> {
        self.rewards.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn reward_count(&self) -> usize {
        self.rewards.len()
    }

    pub fn total_reward_points(&self) -> i64 {
        self.rewards
            .iter()
            .map(|entry| i64::from(entry.value().reward_points))
            .sum()
    }

    pub fn preferences(&self) -> UserPreferences {
        self.preferences.read().clone()
    }

    pub fn set_preferences(&self, preferences: UserPreferences) {
        *self.preferences.write() = preferences;
    }

    pub fn trip_deals(&self) -> Vec<Provider> {
        self.trip_deals.read().clone()
    }

    pub fn set_trip_deals(&self, deals: Vec<Provider>) {
        *self.trip_deals.write() = deals;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attraction, Location};
    use chrono::Utc;
    use std::sync::Arc;

    fn create_user() -> User {
        User::new(Uuid::new_v4(), "jon", "000", "jon@tourGuide.com")
    }

    fn visit(user: &User, lat: f64, lon: f64) -> VisitedLocation {
        VisitedLocation::new(user.id(), Location::new(lat, lon), Utc::now())
    }

    #[test]
    fn test_history_is_ordered() {
        let user = create_user();
        assert!(user.last_visited_location().is_none());

        user.add_visited_location(visit(&user, 1.0, 1.0));
        user.add_visited_location(visit(&user, 2.0, 2.0));

        assert_eq!(user.visited_locations().len(), 2);
        assert_eq!(user.last_visited_location().unwrap().location, Location::new(2.0, 2.0));

        user.clear_visited_locations();
        assert!(!user.has_visited_locations());
    }

    #[test]
    fn test_add_reward_keeps_first_per_attraction() {
        let user = create_user();
        let attraction = Attraction::new("Disneyland", "Anaheim", "CA", 33.817595, -117.922008);
        let visited = visit(&user, 33.817595, -117.922008);

        assert!(user.add_reward(UserReward::new(visited.clone(), attraction.clone(), 100)));
        assert!(!user.add_reward(UserReward::new(visited, attraction.clone(), 999)));

        assert_eq!(user.reward_count(), 1);
        assert_eq!(user.total_reward_points(), 100);
        assert!(user.has_reward_for(attraction.attraction_id));
    }

    #[test]
    fn test_concurrent_add_reward_stores_one() {
        let user = Arc::new(create_user());
        let attraction = Attraction::new("Disneyland", "Anaheim", "CA", 33.817595, -117.922008);
        let visited = visit(&user, 33.817595, -117.922008);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let user = Arc::clone(&user);
                let reward = UserReward::new(visited.clone(), attraction.clone(), i);
                std::thread::spawn(move || user.add_reward(reward))
            })
            .collect();

        let inserted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|inserted| *inserted)
            .count();

        assert_eq!(inserted, 1);
        assert_eq!(user.reward_count(), 1);
    }

    #[test]
    fn test_preferences_replaced_wholesale() {
        let user = create_user();
        let prefs = UserPreferences {
            number_of_adults: 2,
            number_of_children: 3,
            trip_duration: 7,
            ..UserPreferences::default()
        };

        user.set_preferences(prefs.clone());
        assert_eq!(user.preferences(), prefs);
    }
}
