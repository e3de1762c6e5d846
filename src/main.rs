// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mergington Directory storage bootstrap
//!
//! Resolves the storage backend (Firestore or in-memory fallback), seeds
//! the default catalog if needed, and reports what is available.

use mergington_directory::{config::Config, Database, Query};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        project = %config.gcp_project_id,
        timeout_ms = config.connect_timeout_ms,
        "Starting Mergington Directory"
    );

    let db = Database::new(config);

    let activities = db.get_activities_collection().await?;
    let teachers = db.get_teachers_collection().await?;

    let activity_count = activities.count_documents(&Query::all()).await?;
    let teacher_count = teachers.count_documents(&Query::all()).await?;
    let weekend = activities
        .find(&Query::all().any_of("schedule_details.days", ["Saturday", "Sunday"]))
        .await?;

    tracing::info!(
        mode = ?db.mode(),
        activities = activity_count,
        teachers = teacher_count,
        weekend_activities = weekend.len(),
        "Directory storage ready"
    );
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mergington_directory=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
