use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{info, warn};

use courtbook::config::Config;
use courtbook::engine::ContactInfo;
use courtbook::model::{hhmm, Court, Reservation, SlotKey};
use courtbook::reaper;
use courtbook::session::SessionManager;
use courtbook::store::InMemoryStore;

/// A club snapshot plus one visitor's clicks, replayed end to end.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    courts: Vec<Court>,
    #[serde(default)]
    reservations: Vec<Reservation>,
    from: NaiveDate,
    to: NaiveDate,
    #[serde(default)]
    member: bool,
    #[serde(default)]
    user_id: Option<String>,
    toggles: Vec<Toggle>,
    contact: ContactInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Toggle {
    court_id: String,
    date: NaiveDate,
    #[serde(with = "hhmm")]
    start: NaiveTime,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    courtbook::observability::init(config.metrics_port)?;

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_file.clone());
    let scenario: Scenario = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    info!("loaded {} courts, {} reservations from {}", scenario.courts.len(), scenario.reservations.len(), path.display());

    let store = Arc::new(InMemoryStore::with_data(scenario.courts, scenario.reservations));
    let sessions = Arc::new(SessionManager::new(store));
    tokio::spawn(reaper::run_reaper(
        sessions.clone(),
        config.reaper_interval,
        config.session_ttl,
    ));

    let id = sessions.open(scenario.member, scenario.user_id)?;
    let grid = sessions.calendar(id, scenario.from, scenario.to).await?;
    let selectable = grid.iter().filter(|s| s.is_selectable()).count();
    info!("calendar {}..{}: {} slots, {selectable} selectable", scenario.from, scenario.to, grid.len());

    for toggle in &scenario.toggles {
        let key = SlotKey::at(&toggle.court_id, toggle.date, toggle.start);
        match sessions.toggle(id, &key).await {
            Ok(blocks) => info!("toggled {key}: {} blocks selected", blocks.len()),
            Err(e) => warn!("toggle {key} rejected: {e}"),
        }
    }

    let receipt = sessions.checkout(id, &scenario.contact).await?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}
