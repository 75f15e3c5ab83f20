use anyhow::Context;
use serde_json::json;

use pocketledger_app::{AppConfig, Tracker, today};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    pocketledger_observability::init(&config.log);

    let tracker = Tracker::open(&config)?;
    let Some(session) = tracker.session() else {
        tracing::warn!("no user logged in; nothing to report");
        return Ok(());
    };

    let today = today();
    let snapshot = json!({
        "user": session.email(),
        "dashboard": tracker.dashboard()?,
        "notifications": tracker.notifications(today)?,
        "weekly": tracker.weekly_chart(today)?,
        "monthly": tracker.monthly_chart(today)?,
    });
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
