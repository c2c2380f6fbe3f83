// weather-server/src/plugins/weather/operations.rs
use crate::plugins::weather::client::{AlertSource, FetchError};
use crate::plugins::weather::format::{format_alert, AlertCollection};
use serde_json::Value;
use tracing::info;

pub const NO_DATA_MESSAGE: &str = "No data or weather alerts found";
// Trailing space is part of the message clients already match on.
pub const NO_ACTIVE_ALERTS_MESSAGE: &str = "No active weather alerts found ";

pub fn state_alerts_url(base: &str, state: &str) -> String {
    format!("{}/alerts/active/area/{}", base, state)
}

pub fn city_alerts_url(base: &str, state: &str, city: &str) -> String {
    format!("{}/alerts/active/area/{}/{}", base, state, city)
}

/// Turn an alerts response (or its absence) into the text returned to the caller.
pub fn render_alerts(data: Option<&Value>) -> String {
    match AlertCollection::from_response(data) {
        AlertCollection::Missing => NO_DATA_MESSAGE.to_string(),
        AlertCollection::Empty => NO_ACTIVE_ALERTS_MESSAGE.to_string(),
        AlertCollection::Alerts(records) => {
            info!("Formatting {} active alerts", records.len());
            records.iter().map(format_alert).collect::<Vec<_>>().join("\n")
        }
    }
}

/// Fetch the alerts at `url` and render them.
pub async fn query_alerts(source: &dyn AlertSource, url: &str) -> Result<String, FetchError> {
    info!("Querying alerts: {}", url);
    let data = source.fetch(url).await?;
    Ok(render_alerts(data.as_ref()))
}
