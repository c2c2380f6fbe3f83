// weather-server/src/plugins/weather/format.rs
use serde_json::Value;

pub const UNKNOWN_EVENT: &str = "Unknown Event";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_ADDITIONAL_INFO: &str = "No additional information";

/// The `properties` of one alert feature. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertRecord {
    pub event: Option<String>,
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
}

impl AlertRecord {
    /// Read a feature. A missing or malformed `properties` gives an empty record.
    pub fn from_feature(feature: &Value) -> Self {
        let props = feature.get("properties");
        let field = |key: &str| {
            props
                .and_then(|p| p.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        AlertRecord {
            event: field("event"),
            area_desc: field("areaDesc"),
            severity: field("severity"),
            description: field("description"),
            instruction: field("instruction"),
        }
    }

    pub fn event(&self) -> &str {
        self.event.as_deref().unwrap_or(UNKNOWN_EVENT)
    }

    pub fn area(&self) -> &str {
        self.area_desc.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn severity(&self) -> &str {
        self.severity.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_ADDITIONAL_INFO)
    }

    pub fn instruction(&self) -> &str {
        self.instruction.as_deref().unwrap_or(NO_ADDITIONAL_INFO)
    }
}

/// Render one alert as a five-line summary.
pub fn format_alert(record: &AlertRecord) -> String {
    format!(
        "Event: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}",
        record.event(),
        record.area(),
        record.severity(),
        record.description(),
        record.instruction(),
    )
}

/// What an alerts response contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertCollection {
    /// No response, or no usable `features` array.
    Missing,
    /// A `features` array with nothing in it.
    Empty,
    Alerts(Vec<AlertRecord>),
}

impl AlertCollection {
    pub fn from_response(data: Option<&Value>) -> Self {
        let features = match data.and_then(|d| d.get("features")).and_then(Value::as_array) {
            Some(features) => features,
            None => return AlertCollection::Missing,
        };

        if features.is_empty() {
            AlertCollection::Empty
        } else {
            AlertCollection::Alerts(features.iter().map(AlertRecord::from_feature).collect())
        }
    }
}
