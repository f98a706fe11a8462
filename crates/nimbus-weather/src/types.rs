use serde::{Deserialize, Serialize};

/// Where a weather report applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// Weather condition as reported upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub code: i32,
    pub text: String,
    /// Icon path, usually protocol-relative (`//cdn.../day/113.png`)
    pub icon: String,
}

impl Condition {
    /// Icon URL with an explicit scheme.
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        }
    }
}

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub condition: Condition,
    pub temp_c: f64,
    pub feelslike_c: f64,
    /// Relative humidity, 0-100
    pub humidity: u8,
    /// UV index, never negative
    pub uv: f64,
}

/// Current weather for one location. Cached as a whole in the single cache slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location: LocationInfo,
    pub current: CurrentConditions,
}

/// One row of a location search, in server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl LocationCandidate {
    /// "Name, Region, Country", skipping blank parts.
    pub fn display_name(&self) -> String {
        [&self.name, &self.region, &self.country]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
