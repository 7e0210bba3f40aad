use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tourguide::config::Settings;
use tourguide::services::simulated::internal_users;
use tourguide::services::{
    GpsUtilClient, LocationProvider, RewardCentralClient, RewardScoreProvider, SimulatedGps,
    SimulatedRewardCentral, SimulatedTripPricer, UserStore,
};
use tourguide::{Collaborators, TourGuide};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting TourGuide...");

    let call_timeout = settings.providers.call_timeout();

    let locations: Arc<dyn LocationProvider> = match &settings.providers.gps_url {
        Some(url) => {
            info!("Using GpsUtil at {}", url);
            Arc::new(GpsUtilClient::new(url.clone(), call_timeout)?)
        }
        None => {
            info!("No GpsUtil URL configured, using simulated locations");
            Arc::new(SimulatedGps::new())
        }
    };

    let scores: Arc<dyn RewardScoreProvider> = match &settings.providers.reward_central_url {
        Some(url) => {
            info!("Using RewardCentral at {}", url);
            Arc::new(RewardCentralClient::new(url.clone(), call_timeout)?)
        }
        None => {
            info!("No RewardCentral URL configured, using simulated scores");
            Arc::new(SimulatedRewardCentral::new(std::time::Duration::from_millis(100)))
        }
    };

    // Seed internal test users
    let store = Arc::new(UserStore::new());
    for user in internal_users(settings.internal.user_count) {
        store.add_user(user);
    }
    info!("Created {} internal test users", store.len());

    let tour_guide = TourGuide::new(
        &settings,
        Arc::clone(&store),
        Collaborators {
            locations,
            scores,
            trip_pricer: Arc::new(SimulatedTripPricer),
        },
    );

    info!(
        proximity_workers = settings.pools.proximity_workers,
        scoring_workers = settings.pools.scoring_workers,
        "TourGuide initialized"
    );

    tour_guide.start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down...");
    tour_guide.shutdown().await;
    info!("TourGuide stopped");

    Ok(())
}
