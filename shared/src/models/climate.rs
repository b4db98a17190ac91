//! Climate zone classification with regional crop suggestions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClimateZone {
    Tropical,
    Subtropical,
    Arid,
    Temperate,
}

impl ClimateZone {
    /// Classify from a single temperature/humidity reading
    pub fn classify(temperature: f64, humidity: f64) -> Self {
        if temperature >= 30.0 && humidity >= 70.0 {
            ClimateZone::Tropical
        } else if (20.0..30.0).contains(&temperature) && humidity >= 50.0 {
            ClimateZone::Subtropical
        } else if temperature >= 30.0 && humidity < 50.0 {
            ClimateZone::Arid
        } else {
            ClimateZone::Temperate
        }
    }

    pub fn crops(&self) -> &'static [&'static str] {
        match self {
            ClimateZone::Tropical => &[
                "Rice", "Coconut", "Banana", "Mango", "Chili", "Ginger", "Sugarcane",
            ],
            ClimateZone::Subtropical => &[
                "Wheat", "Potato", "Onion", "Tomato", "Groundnut", "Sunflower", "Mustard",
            ],
            ClimateZone::Arid => &[
                "Jowar", "Bajra", "Pulses", "Groundnut", "Castor", "Cumin", "Chickpea",
            ],
            ClimateZone::Temperate => &[
                "Apple", "Pear", "Cabbage", "Carrot", "Garlic", "Broccoli", "Lettuce",
            ],
        }
    }

    pub fn temp_range(&self) -> &'static str {
        match self {
            ClimateZone::Tropical => "20-35°C",
            ClimateZone::Subtropical => "15-28°C",
            ClimateZone::Arid => "25-45°C",
            ClimateZone::Temperate => "10-25°C",
        }
    }

    pub fn rainfall(&self) -> &'static str {
        match self {
            ClimateZone::Tropical => "High (150-300cm/year)",
            ClimateZone::Subtropical => "Moderate (75-150cm/year)",
            ClimateZone::Arid => "Low (<50cm/year)",
            ClimateZone::Temperate => "Moderate (50-100cm/year)",
        }
    }

    pub fn profile(&self) -> ClimateProfile {
        ClimateProfile {
            zone: *self,
            crops: self.crops().iter().map(|c| c.to_string()).collect(),
            temp_range: self.temp_range().to_string(),
            rainfall: self.rainfall().to_string(),
        }
    }
}

/// Serializable view of a zone and its regional crops
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateProfile {
    pub zone: ClimateZone,
    pub crops: Vec<String>,
    pub temp_range: String,
    pub rainfall: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_classification() {
        assert_eq!(ClimateZone::classify(32.0, 80.0), ClimateZone::Tropical);
        assert_eq!(ClimateZone::classify(25.0, 60.0), ClimateZone::Subtropical);
        assert_eq!(ClimateZone::classify(38.0, 20.0), ClimateZone::Arid);
        assert_eq!(ClimateZone::classify(12.0, 60.0), ClimateZone::Temperate);
        // Warm but dry below 30°C has no dedicated zone
        assert_eq!(ClimateZone::classify(25.0, 30.0), ClimateZone::Temperate);
    }

    #[test]
    fn test_profile_lists_crops() {
        let profile = ClimateZone::Arid.profile();
        assert_eq!(profile.zone, ClimateZone::Arid);
        assert!(profile.crops.contains(&"Bajra".to_string()));
    }
}
