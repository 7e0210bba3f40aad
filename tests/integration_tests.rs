// Integration tests for TourGuide

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tourguide::config::Settings;
use tourguide::models::{Attraction, Location, User, VisitedLocation};
use tourguide::services::{
    ProviderError, RewardScoreProvider, SimulatedGps, SimulatedRewardCentral, SimulatedTripPricer,
    UserStore,
};
use tourguide::{Collaborators, TourGuide, TourGuideError};
use uuid::Uuid;

/// Scorer that records how often it is asked
struct CountingScores {
    calls: AtomicUsize,
    delay: Duration,
}

#[async_trait]
impl RewardScoreProvider for CountingScores {
    async fn get_points(&self, _attraction_id: Uuid, _user_id: Uuid) -> Result<i32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(250)
    }
}

fn disneyland() -> Attraction {
    Attraction::new("Disneyland", "Anaheim", "CA", 33.817595, -117.922008)
}

fn catalog_with_disneyland() -> Vec<Attraction> {
    vec![
        Attraction::new("Jackson Hole", "Jackson Hole", "WY", 43.582767, -110.821999),
        Attraction::new("Mojave National Preserve", "Kelso", "CA", 35.141689, -115.510399),
        Attraction::new("Joshua Tree National Park", "Joshua Tree National Park", "CA", 33.881866, -115.90065),
        disneyland(),
        Attraction::new("Buffalo National River", "St Joe", "AR", 35.985512, -92.757652),
        Attraction::new("Hot Springs National Park", "Hot Springs", "AR", 34.52153, -93.042267),
        Attraction::new("Kartchner Caverns State Park", "Benson", "AZ", 31.837551, -110.347382),
    ]
}

fn create_tour_guide(gps: Arc<SimulatedGps>, scores: Arc<dyn RewardScoreProvider>) -> TourGuide {
    let mut settings = Settings::default();
    settings.tracker.enabled = false;

    TourGuide::new(
        &settings,
        Arc::new(UserStore::new()),
        Collaborators {
            locations: gps,
            scores,
            trip_pricer: Arc::new(SimulatedTripPricer),
        },
    )
}

fn create_user(name: &str) -> User {
    User::new(Uuid::new_v4(), name, "000", &format!("{}@tourGuide.com", name))
}

async fn wait_for_rewards(user: &User, expected: usize) {
    for _ in 0..200 {
        if user.reward_count() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_nearby_attractions_ranks_exact_match_first() {
    let gps = Arc::new(SimulatedGps::with_attractions(catalog_with_disneyland()));
    let scores = Arc::new(CountingScores { calls: AtomicUsize::new(0), delay: Duration::ZERO });
    let guide = create_tour_guide(gps, scores.clone());
    let user = guide.add_user(create_user("userCustom"));
    let visited = VisitedLocation::new(user.id(), Location::new(33.817595, -117.922008), Utc::now());
    user.add_visited_location(visited.clone());

    let nearby = guide.nearby_attractions(&visited).await.unwrap();

    assert_eq!(nearby.user_location, visited.location);
    assert_eq!(nearby.attractions.len(), 5);
    assert_eq!(nearby.attractions[0].attraction_name, "Disneyland");
    assert_eq!(nearby.attractions[0].distance_miles, 0.0);
    assert!(nearby
        .attractions
        .windows(2)
        .all(|w| w[0].distance_miles <= w[1].distance_miles));
    assert!(nearby.attractions.iter().all(|a| a.reward_points == Some(250)));

    // Previews are never stored
    assert_eq!(user.reward_count(), 0);
    assert_eq!(scores.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_get_user_location_fetches_exactly_once() {
    let gps = Arc::new(SimulatedGps::new());
    let guide = create_tour_guide(gps.clone(), Arc::new(SimulatedRewardCentral::new(Duration::ZERO)));
    let users: Vec<_> = (0..10)
        .map(|i| guide.add_user(create_user(&format!("user{}", i))))
        .collect();

    for user in &users {
        let visited = guide.get_user_location(user.name()).await.unwrap();
        assert_eq!(visited.user_id, user.id());
        // Second call is served from history
        assert_eq!(guide.get_user_location(user.name()).await.unwrap(), visited);
    }

    assert_eq!(gps.location_calls(), users.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_location_is_fetched_once() {
    let gps = Arc::new(SimulatedGps::new().with_latency(Duration::from_millis(50)));
    let guide = create_tour_guide(gps.clone(), Arc::new(SimulatedRewardCentral::new(Duration::ZERO)));
    let user = guide.add_user(create_user("jon"));

    let (first, second) = tokio::join!(guide.get_user_location("jon"), guide.get_user_location("jon"));

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(gps.location_calls(), 1);
    assert_eq!(user.visited_locations().len(), 1);
}

#[tokio::test]
async fn test_get_user_location_with_history() {
    let gps = Arc::new(SimulatedGps::new());
    let guide = create_tour_guide(gps.clone(), Arc::new(SimulatedRewardCentral::new(Duration::ZERO)));
    let user = guide.add_user(create_user("jon"));
    let known = VisitedLocation::new(user.id(), Location::new(1.0, 2.0), Utc::now());
    user.add_visited_location(known.clone());

    assert_eq!(guide.get_user_location("jon").await.unwrap(), known);
    assert_eq!(gps.location_calls(), 0);
}

#[tokio::test]
async fn test_unknown_user_is_reported() {
    let guide = create_tour_guide(
        Arc::new(SimulatedGps::new()),
        Arc::new(SimulatedRewardCentral::new(Duration::ZERO)),
    );

    assert!(matches!(guide.get_user_location("nobody").await, Err(TourGuideError::UserNotFound(_))));
    assert!(matches!(guide.get_user_rewards("nobody"), Err(TourGuideError::UserNotFound(_))));
}

#[tokio::test]
async fn test_tracking_near_attraction_earns_reward() {
    let gps = Arc::new(SimulatedGps::with_attractions(catalog_with_disneyland()));
    gps.set_fixed_location(Some(disneyland().location));
    let guide = create_tour_guide(gps, Arc::new(SimulatedRewardCentral::new(Duration::ZERO).with_fixed_points(42)));
    let user = guide.add_user(create_user("jon"));

    guide.get_user_location("jon").await.unwrap();
    wait_for_rewards(&user, 1).await;

    let rewards = guide.get_user_rewards("jon").unwrap();
    assert_eq!(rewards.len(), 1);
    assert_eq!(rewards[0].attraction.attraction_name, "Disneyland");
    assert_eq!(rewards[0].reward_points, 42);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calculations_store_one_reward() {
    let gps = Arc::new(SimulatedGps::with_attractions(catalog_with_disneyland()));
    let scores = Arc::new(CountingScores { calls: AtomicUsize::new(0), delay: Duration::from_millis(25) });
    let guide = create_tour_guide(gps, scores);
    let user = guide.add_user(create_user("jon"));
    user.add_visited_location(VisitedLocation::new(user.id(), disneyland().location, Utc::now()));

    let rewards = guide.rewards();
    let results = futures::future::join_all((0..8).map(|_| rewards.calculate_rewards(&user))).await;

    let inserted: usize = results.into_iter().map(|r| r.unwrap().inserted).sum();
    assert_eq!(inserted, 1);
    assert_eq!(user.reward_count(), 1);

    // A later cycle neither rescores nor duplicates
    let again = rewards.calculate_rewards(&user).await.unwrap();
    assert_eq!(again.matched, 0);
    assert_eq!(user.reward_count(), 1);
}

#[tokio::test]
async fn test_new_visit_adds_only_new_rewards() {
    let gps = Arc::new(SimulatedGps::with_attractions(catalog_with_disneyland()));
    let scores = Arc::new(CountingScores { calls: AtomicUsize::new(0), delay: Duration::ZERO });
    let guide = create_tour_guide(gps, scores.clone());
    let user = guide.add_user(create_user("jon"));
    let rewards = guide.rewards();

    user.add_visited_location(VisitedLocation::new(user.id(), disneyland().location, Utc::now()));
    rewards.calculate_rewards(&user).await.unwrap();

    // Joshua Tree
    user.add_visited_location(VisitedLocation::new(user.id(), Location::new(33.881866, -115.90065), Utc::now()));
    let summary = rewards.calculate_rewards(&user).await.unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(user.reward_count(), 2);
    assert_eq!(scores.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_get_attraction_is_case_insensitive() {
    let gps = Arc::new(SimulatedGps::with_attractions(catalog_with_disneyland()));
    let guide = create_tour_guide(gps, Arc::new(SimulatedRewardCentral::new(Duration::ZERO)));

    // Not the first catalog entry
    let found = guide.get_attraction("DISNEYLAND").await.unwrap();
    assert_eq!(found.attraction_name, "Disneyland");

    let last = guide.get_attraction("kartchner caverns state park").await.unwrap();
    assert_eq!(last.state, "AZ");

    assert!(matches!(
        guide.get_attraction("Atlantis").await,
        Err(TourGuideError::AttractionNotFound(_))
    ));
}

#[tokio::test]
async fn test_trip_deals_use_reward_points() {
    let gps = Arc::new(SimulatedGps::with_attractions(catalog_with_disneyland()));
    let guide = create_tour_guide(gps, Arc::new(SimulatedRewardCentral::new(Duration::ZERO)));
    let user = guide.add_user(create_user("jon"));
    let attraction = guide.get_attraction("Disneyland").await.unwrap();

    let deals = guide.get_trip_deals("jon", &attraction).await.unwrap();

    assert_eq!(deals.len(), 5);
    assert_eq!(user.trip_deals().len(), 5);
}

#[tokio::test]
async fn test_lifecycle_start_and_shutdown() {
    let gps = Arc::new(SimulatedGps::new());
    let mut settings = Settings::default();
    settings.tracker.poll_interval_secs = 1;

    let store = Arc::new(UserStore::new());
    let guide = TourGuide::new(
        &settings,
        Arc::clone(&store),
        Collaborators {
            locations: gps.clone(),
            scores: Arc::new(SimulatedRewardCentral::new(Duration::ZERO)),
            trip_pricer: Arc::new(SimulatedTripPricer),
        },
    );
    guide.add_user(create_user("jon"));

    guide.start();
    assert!(guide.tracker().is_running());

    tokio::time::sleep(Duration::from_millis(50)).await;
    guide.shutdown().await;

    assert!(!guide.tracker().is_running());
    assert!(gps.location_calls() >= 1);
    assert!(store.get_user("jon").unwrap().has_visited_locations());
}
