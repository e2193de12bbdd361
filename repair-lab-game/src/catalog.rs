//! Static content catalogs: mood profiles, weather modifiers and challenges.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::OnceLock;
use thiserror::Error;

/// Number of canonical actions every mood profile carries.
pub const MOOD_ACTION_COUNT: usize = 3;

/// Inline storage for a mood's action list.
pub type ActionList = SmallVec<[String; MOOD_ACTION_COUNT]>;

/// Daily challenge prompts offered by the challenge generator.
pub const CHALLENGES: [&str; 5] = [
    "Complete two focus sessions of 25 minutes",
    "Take a no-phone walk and log your mood",
    "Drink water 4 times before dinner",
    "Replace 30 minutes of doomscrolling with reading",
    "Plan a mini reward for the evening",
];

/// Errors raised when a mood catalog fails validation.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("mood catalog JSON parse error: {0}")]
    Parse(String),
    #[error("mood catalog is empty")]
    Empty,
    #[error("mood {key} must have a positive finite weight (got {weight})")]
    InvalidWeight { key: String, weight: f64 },
    #[error("mood {key} must list {expected} actions (got {actual})")]
    ActionCount {
        key: String,
        expected: usize,
        actual: usize,
    },
    #[error("mood {key} has a blank action")]
    BlankAction { key: String },
    #[error("duplicate mood key {0}")]
    DuplicateKey(String),
}

/// A weighted mood the plan generator can draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    pub key: String,
    pub label: String,
    pub weight: f64,
    pub actions: ActionList,
}

impl MoodProfile {
    /// Built-in mood used when no catalog entry can be drawn.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            key: "balanced".to_string(),
            label: "Balanced".to_string(),
            weight: 10.0,
            actions: SmallVec::from_iter([
                "Keep momentum: finish one meaningful task".to_string(),
                "Celebrate with your favorite snack".to_string(),
                "Capture what is working in a quick note".to_string(),
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MoodCatalog(pub Vec<MoodProfile>);

impl MoodCatalog {
    /// Load and validate a mood catalog from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the catalog is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let moods: Vec<MoodProfile> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let catalog = Self(moods);
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.0.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, mood) in self.0.iter().enumerate() {
            if !mood.weight.is_finite() || mood.weight <= 0.0 {
                return Err(CatalogError::InvalidWeight {
                    key: mood.key.clone(),
                    weight: mood.weight,
                });
            }
            if mood.actions.len() != MOOD_ACTION_COUNT {
                return Err(CatalogError::ActionCount {
                    key: mood.key.clone(),
                    expected: MOOD_ACTION_COUNT,
                    actual: mood.actions.len(),
                });
            }
            if mood.actions.iter().any(|action| action.trim().is_empty()) {
                return Err(CatalogError::BlankAction {
                    key: mood.key.clone(),
                });
            }
            if self.0[..index].iter().any(|other| other.key == mood.key) {
                return Err(CatalogError::DuplicateKey(mood.key.clone()));
            }
        }
        Ok(())
    }

    /// Shared catalog parsed once per process from the embedded asset.
    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<MoodCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            Self::from_json(include_str!("../data/moods.json")).unwrap_or_else(|err| {
                log::warn!("embedded mood catalog rejected ({err}); using fallback mood");
                Self(vec![MoodProfile::fallback()])
            })
        })
    }

    #[must_use]
    pub fn get_by_key(&self, key: &str) -> Option<&MoodProfile> {
        self.0.iter().find(|mood| mood.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoodProfile> {
        self.0.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[MoodProfile] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a MoodCatalog {
    type Item = &'a MoodProfile;
    type IntoIter = std::slice::Iter<'a, MoodProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Weather conditions the user can report when asking for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Sunny,
    #[default]
    Cloudy,
    Rainy,
    Stormy,
}

impl WeatherKind {
    /// Catalog order; ties in insight rankings resolve to the earliest entry.
    pub const ALL: [Self; 4] = [Self::Sunny, Self::Cloudy, Self::Rainy, Self::Stormy];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Stormy => "stormy",
        }
    }

    /// Parse a weather key case-insensitively.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|weather| weather.key().eq_ignore_ascii_case(key))
    }

    /// Confidence delta applied by the plan generator.
    #[must_use]
    pub const fn confidence_delta(self) -> i32 {
        match self {
            Self::Sunny => 6,
            Self::Cloudy => 2,
            Self::Rainy => -3,
            Self::Stormy => -7,
        }
    }

    /// Inclusive range the insight generator draws this weather's impact from.
    #[must_use]
    pub const fn impact_range(self) -> (i32, i32) {
        match self {
            Self::Sunny => (6, 14),
            Self::Cloudy => (1, 8),
            Self::Rainy => (-7, 3),
            Self::Stormy => (-12, 0),
        }
    }
}

impl std::fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Confidence delta for a raw weather key; unknown keys contribute nothing.
#[must_use]
pub fn weather_delta(key: &str) -> i32 {
    WeatherKind::from_key(key).map_or(0, WeatherKind::confidence_delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_loads_all_moods() {
        let catalog = MoodCatalog::default_catalog();
        assert_eq!(catalog.len(), 7);
        let total: f64 = catalog.iter().map(|mood| mood.weight).sum();
        assert!((total - 100.0).abs() < f64::EPSILON);
        let social = catalog.get_by_key("social").unwrap();
        assert_eq!(social.label, "Needs Human Energy");
        assert_eq!(social.actions.len(), MOOD_ACTION_COUNT);
    }

    #[test]
    fn catalog_rejects_invalid_entries() {
        let zero_weight = r#"[{"key":"a","label":"A","weight":0,"actions":["x","y","z"]}]"#;
        assert!(matches!(
            MoodCatalog::from_json(zero_weight),
            Err(CatalogError::InvalidWeight { .. })
        ));

        let short = r#"[{"key":"a","label":"A","weight":1,"actions":["x","y"]}]"#;
        assert!(matches!(
            MoodCatalog::from_json(short),
            Err(CatalogError::ActionCount { actual: 2, .. })
        ));

        let blank = r#"[{"key":"a","label":"A","weight":1,"actions":["x"," ","z"]}]"#;
        assert!(matches!(
            MoodCatalog::from_json(blank),
            Err(CatalogError::BlankAction { .. })
        ));

        let dupes = r#"[
            {"key":"a","label":"A","weight":1,"actions":["x","y","z"]},
            {"key":"a","label":"B","weight":1,"actions":["x","y","z"]}
        ]"#;
        assert_eq!(
            MoodCatalog::from_json(dupes),
            Err(CatalogError::DuplicateKey("a".to_string()))
        );

        assert_eq!(MoodCatalog::from_json("[]"), Err(CatalogError::Empty));
        assert!(matches!(
            MoodCatalog::from_json("{"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn weather_keys_parse_case_insensitively() {
        assert_eq!(WeatherKind::from_key("SUNNY"), Some(WeatherKind::Sunny));
        assert_eq!(WeatherKind::from_key(" stormy "), Some(WeatherKind::Stormy));
        assert_eq!(WeatherKind::from_key("x"), None);
        assert_eq!(weather_delta("rainy"), -3);
        assert_eq!(weather_delta("hail"), 0);
        assert_eq!(WeatherKind::default().key(), "cloudy");
    }

    #[test]
    fn fallback_mood_is_valid() {
        let catalog = MoodCatalog(vec![MoodProfile::fallback()]);
        assert!(catalog.validate().is_ok());
    }
}
