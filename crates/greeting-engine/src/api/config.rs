use serde::Deserialize;

/// Page configuration, passed in by the host as JSON. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    /// Gate the timeline behind the unlock overlay (default: true).
    /// When false the timeline starts `start_delay_ms` after load.
    pub use_unlock_overlay: bool,
    /// Delay before the timeline starts without an overlay (default: 200).
    pub start_delay_ms: f64,
    /// First number shown by the overlay countdown (default: 3).
    pub countdown_from: u32,
    /// Time between countdown steps (default: 700).
    pub countdown_tick_ms: f64,
    /// Overlay text while waiting for the user.
    pub idle_prompt: String,
    /// Image gallery started at the music switch, if any.
    pub gallery: Option<GalleryConfig>,
    /// Personalization document, relative to the page.
    pub customization_url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            use_unlock_overlay: true,
            start_delay_ms: 200.0,
            countdown_from: 3,
            countdown_tick_ms: 700.0,
            idle_prompt: "Tap anywhere to begin".to_string(),
            gallery: None,
            customization_url: "customize.json".to_string(),
        }
    }
}

impl PageConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryConfig {
    /// Id of the `<img>` element to rotate.
    pub element_id: String,
    pub candidates: Vec<String>,
    /// Rotation period (default: 3000). Raised to the gallery's
    /// `MIN_INTERVAL_MS` when shorter.
    #[serde(default = "default_interval")]
    pub interval_ms: f64,
}

fn default_interval() -> f64 {
    3000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = PageConfig::from_json("{}").unwrap();
        assert_eq!(config, PageConfig::default());
        assert!(config.use_unlock_overlay);
        assert_eq!(config.customization_url, "customize.json");
    }

    #[test]
    fn parse_camel_case_with_gallery() {
        let json = r#"{
            "useUnlockOverlay": false,
            "startDelayMs": 350,
            "gallery": { "elementId": "photo", "candidates": ["a.jpg", "b.jpg"] }
        }"#;
        let config = PageConfig::from_json(json).unwrap();
        assert!(!config.use_unlock_overlay);
        assert_eq!(config.start_delay_ms, 350.0);
        assert_eq!(config.countdown_from, 3);

        let gallery = config.gallery.unwrap();
        assert_eq!(gallery.element_id, "photo");
        assert_eq!(gallery.candidates.len(), 2);
        assert_eq!(gallery.interval_ms, 3000.0);
    }

    #[test]
    fn wrong_types_are_errors() {
        assert!(PageConfig::from_json(r#"{"countdownFrom": "three"}"#).is_err());
    }
}
