//! Maps current weather metrics onto the static icon/background catalogue.
//!
//! Rules are evaluated in table order and the first match wins. Several rules
//! overlap (anything above 20°C is caught by the first one), so later rules are
//! only reachable for cooler readings. The ordering is part of the observable
//! behaviour and must not be rearranged.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Sunny,
    Cloudy,
    Windy,
    Storm,
    Rainy,
    Snowy,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Sunny => "sunny",
            Icon::Cloudy => "cloudy",
            Icon::Windy => "windy",
            Icon::Storm => "storm",
            Icon::Rainy => "rainy",
            Icon::Snowy => "snowy",
        }
    }

    /// Deployed asset reference for this icon.
    pub fn asset_path(&self) -> &'static str {
        match self {
            Icon::Sunny => "/weatherapp/sunny1.svg",
            Icon::Cloudy => "/weatherapp/cloudy1.svg",
            Icon::Windy => "/weatherapp/wind.svg",
            Icon::Storm => "/weatherapp/storm.svg",
            Icon::Rainy => "/weatherapp/rainy.svg",
            Icon::Snowy => "/weatherapp/snowy1.svg",
        }
    }

    /// Single-glyph stand-in used by terminal front-ends.
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Sunny => "☀",
            Icon::Cloudy => "☁",
            Icon::Windy => "≋",
            Icon::Storm => "⛈",
            Icon::Rainy => "☂",
            Icon::Snowy => "❄",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    Sunny,
    Cloudy,
    Storm,
    Rainy,
    Cold,
}

impl Background {
    pub fn as_str(&self) -> &'static str {
        match self {
            Background::Sunny => "sunny",
            Background::Cloudy => "cloudy",
            Background::Storm => "storm",
            Background::Rainy => "rainy",
            Background::Cold => "cold",
        }
    }

    /// Deployed asset reference for this background.
    pub fn asset_path(&self) -> &'static str {
        match self {
            Background::Sunny => "/weatherapp/sunnygif.gif",
            Background::Cloudy => "/weatherapp/cloudygif.gif",
            Background::Storm => "/weatherapp/stormgif.gif",
            Background::Rainy => "/weatherapp/rainygif.gif",
            Background::Cold => "/weatherapp/coldgif.gif",
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icon and background pair chosen for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Visual {
    pub icon: Icon,
    pub background: Background,
}

impl Visual {
    const fn new(icon: Icon, background: Background) -> Self {
        Self { icon, background }
    }
}

impl Default for Visual {
    fn default() -> Self {
        Visual::new(Icon::Snowy, Background::Cold)
    }
}

/// Classify a reading. Total over `f64`: NaN compares false everywhere and
/// lands on the default branch.
#[allow(clippy::if_same_then_else)]
pub fn classify(temperature_c: f64, wind_kph: f64, humidity_pct: f64) -> Visual {
    let t = temperature_c;
    let w = wind_kph;
    let h = humidity_pct;

    if t > 20.0 {
        Visual::new(Icon::Sunny, Background::Sunny)
    } else if t > 25.0 && w < 10.0 {
        Visual::new(Icon::Sunny, Background::Sunny)
    } else if (15.0..=25.0).contains(&t) && (10.0..=20.0).contains(&w) {
        Visual::new(Icon::Cloudy, Background::Cloudy)
    } else if w > 25.0 {
        Visual::new(Icon::Windy, Background::Storm)
    } else if w > 40.0 {
        Visual::new(Icon::Storm, Background::Storm)
    } else if h > 75.0 && (17.0..=30.0).contains(&t) {
        Visual::new(Icon::Rainy, Background::Rainy)
    } else if t > 10.0 {
        Visual::new(Icon::Snowy, Background::Cold)
    } else {
        Visual::default()
    }
}
