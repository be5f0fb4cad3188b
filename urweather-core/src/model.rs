use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::{Visual, classify};

/// Result of one successful lookup. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_kph: f64,
    pub condition_text: String,
    /// Upstream condition icon, unrelated to the classifier's asset choice.
    pub condition_icon_url: String,
    /// "city, region, country"
    pub resolved_location_label: String,
    pub observed_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn visual(&self) -> Visual {
        classify(self.temperature_c, self.wind_kph, self.humidity_pct)
    }
}

/// Everything the view needs to draw itself. Only the controller writes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub pending_input_text: String,
    pub last_confirmed_location: String,
    pub current_snapshot: Option<WeatherSnapshot>,
    pub error_message: Option<String>,
    pub error_banner_visible: bool,
}

impl QueryState {
    /// Visual for the current snapshot. With nothing loaded yet the classifier
    /// sees no readings and falls through to its default.
    pub fn visual(&self) -> Visual {
        match &self.current_snapshot {
            Some(snapshot) => snapshot.visual(),
            None => classify(f64::NAN, f64::NAN, f64::NAN),
        }
    }

    /// Banner text, only while the banner is up.
    pub fn banner(&self) -> Option<&str> {
        if self.error_banner_visible { self.error_message.as_deref() } else { None }
    }
}
