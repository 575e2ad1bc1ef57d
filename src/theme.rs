//! Color themes and AI theme ingestion
//!
//! A theme is requested from an external generator as JSON text, then
//! validated here before it can replace the active palette. Failures never
//! touch the active theme.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::sim::{COLOR_SLOTS, ColorSlot};

/// Shown when the prompt is empty
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a description for the theme.";
/// Shown for any generator or validation failure
pub const GENERATION_FAILED_MESSAGE: &str = "AI failed to generate theme. Please try again.";

/// Transport-level failure reported by a generator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("theme generator failed: {0}")]
pub struct GeneratorError(pub String);

/// Why a theme request produced no theme
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("theme description is empty")]
    EmptyPrompt,
    #[error("generated theme is malformed: {0}")]
    Malformed(String),
    #[error("theme request failed: {0}")]
    Transport(String),
}

impl ThemeError {
    /// Message suitable for the menu screen
    pub fn user_message(&self) -> &'static str {
        match self {
            ThemeError::EmptyPrompt => EMPTY_PROMPT_MESSAGE,
            ThemeError::Malformed(_) | ThemeError::Transport(_) => GENERATION_FAILED_MESSAGE,
        }
    }
}

impl From<GeneratorError> for ThemeError {
    fn from(err: GeneratorError) -> Self {
        ThemeError::Transport(err.0)
    }
}

/// Named color palette (hex strings)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub sky_color: String,
    pub road_color: String,
    pub stripe_color: String,
    pub grass_color: String,
    pub player_car_color: String,
    /// At least `COLOR_SLOTS` entries
    pub opponent_car_colors: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            sky_color: "#1a202c".to_string(),
            road_color: "#4a5568".to_string(),
            stripe_color: "#f7fafc".to_string(),
            grass_color: "#2f855a".to_string(),
            player_car_color: "#e53e3e".to_string(),
            opponent_car_colors: vec![
                "#3182ce".to_string(),
                "#dd6b20".to_string(),
                "#38a169".to_string(),
            ],
        }
    }
}

/// Generator output before validation; every field may be missing
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ThemeCandidate {
    sky_color: Option<String>,
    road_color: Option<String>,
    stripe_color: Option<String>,
    grass_color: Option<String>,
    player_car_color: Option<String>,
    opponent_car_colors: Option<Vec<String>>,
}

fn required(field: &str, value: Option<String>) -> Result<String, ThemeError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ThemeError::Malformed(format!("missing {}", field))),
    }
}

impl ThemeCandidate {
    fn validate(self) -> Result<Theme, ThemeError> {
        let opponent_car_colors = self
            .opponent_car_colors
            .ok_or_else(|| ThemeError::Malformed("missing opponentCarColors".to_string()))?;
        if opponent_car_colors.len() < COLOR_SLOTS {
            return Err(ThemeError::Malformed(format!(
                "opponentCarColors has {} entries, need at least {}",
                opponent_car_colors.len(),
                COLOR_SLOTS
            )));
        }
        if opponent_car_colors.iter().any(|c| c.trim().is_empty()) {
            return Err(ThemeError::Malformed(
                "opponentCarColors contains an empty color".to_string(),
            ));
        }

        Ok(Theme {
            sky_color: required("skyColor", self.sky_color)?,
            road_color: required("roadColor", self.road_color)?,
            stripe_color: required("stripeColor", self.stripe_color)?,
            grass_color: required("grassColor", self.grass_color)?,
            player_car_color: required("playerCarColor", self.player_car_color)?,
            opponent_car_colors,
        })
    }
}

impl Theme {
    /// Parse and validate generator output
    pub fn from_json(text: &str) -> Result<Self, ThemeError> {
        let candidate: ThemeCandidate = serde_json::from_str(text.trim())
            .map_err(|e| ThemeError::Malformed(format!("invalid JSON: {}", e)))?;
        candidate.validate()
    }

    /// Color for an opponent palette slot (None only for hand-built themes
    /// with too few colors)
    pub fn opponent_color(&self, slot: ColorSlot) -> Option<&str> {
        self.opponent_car_colors.get(slot.index()).map(String::as_str)
    }

    /// CSS custom properties consumed by the presentation layer
    pub fn css_variables(&self) -> Vec<(String, &str)> {
        let mut vars = vec![
            ("--sky-color".to_string(), self.sky_color.as_str()),
            ("--road-color".to_string(), self.road_color.as_str()),
            ("--stripe-color".to_string(), self.stripe_color.as_str()),
            ("--grass-color".to_string(), self.grass_color.as_str()),
            ("--player-car-color".to_string(), self.player_car_color.as_str()),
        ];
        for (i, color) in self.opponent_car_colors.iter().take(COLOR_SLOTS).enumerate() {
            vars.push((format!("--opponent-car-color-{}", i + 1), color.as_str()));
        }
        vars
    }
}

/// A validated request for the generator
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeRequest {
    /// What the player typed
    pub description: String,
    /// Full instruction text sent to the model
    pub prompt: String,
    /// JSON schema the response must follow
    pub schema: Value,
    /// Sequence number assigned by `ThemeState::begin` (0 otherwise)
    pub ticket: u64,
}

impl ThemeRequest {
    /// Build a request, rejecting blank descriptions locally
    pub fn new(description: &str) -> Result<Self, ThemeError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ThemeError::EmptyPrompt);
        }
        Ok(Self {
            description: description.to_string(),
            prompt: format!(
                "Generate a color theme for a retro racing game based on the following \
                 description: \"{}\". Please provide hex color codes. The theme should be \
                 vibrant and have good contrast.",
                description
            ),
            schema: response_schema(),
            ticket: 0,
        })
    }
}

/// Response schema handed to the generator
pub fn response_schema() -> Value {
    let color = |description: &str| json!({ "type": "STRING", "description": description });
    json!({
        "type": "OBJECT",
        "properties": {
            "skyColor": color("A hex color code for the sky or background."),
            "roadColor": color("A hex color code for the road surface."),
            "stripeColor": color("A hex color code for the dashed lines on the road."),
            "grassColor": color("A hex color code for the area beside the road."),
            "playerCarColor": color("A hex color code for the player's car."),
            "opponentCarColors": {
                "type": "ARRAY",
                "description": "An array of exactly 3 hex color codes for opponent cars.",
                "items": { "type": "STRING" }
            }
        },
        "required": [
            "skyColor",
            "roadColor",
            "stripeColor",
            "grassColor",
            "playerCarColor",
            "opponentCarColors"
        ]
    })
}

/// External service that turns a request into theme JSON text
pub trait ThemeGenerator {
    fn generate(&self, request: &ThemeRequest)
    -> impl Future<Output = Result<String, GeneratorError>>;
}

/// Request a theme and validate the result.
///
/// A blank description fails before the generator is called.
pub async fn generate_theme<G: ThemeGenerator + ?Sized>(
    generator: &G,
    description: &str,
) -> Result<Theme, ThemeError> {
    let request = ThemeRequest::new(description)?;
    let text = generator.generate(&request).await?;
    Theme::from_json(&text)
}

/// Active theme plus the status of the latest request.
///
/// Only the most recently started request may change the theme; results of
/// older requests that settle late are dropped.
#[derive(Debug, Clone, Default)]
pub struct ThemeState {
    active: Theme,
    loading: bool,
    error: Option<String>,
    /// Ticket of the latest request handed out
    latest: u64,
}

impl ThemeState {
    pub fn new(active: Theme) -> Self {
        Self {
            active,
            ..Default::default()
        }
    }

    #[inline]
    pub fn active(&self) -> &Theme {
        &self.active
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// User-facing message from the last failed request
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a request. Returns None (and records the message) for a blank
    /// description, so no call goes out.
    pub fn begin(&mut self, description: &str) -> Option<ThemeRequest> {
        match ThemeRequest::new(description) {
            Ok(mut request) => {
                self.latest += 1;
                request.ticket = self.latest;
                self.loading = true;
                self.error = None;
                Some(request)
            }
            Err(e) => {
                self.error = Some(e.user_message().to_string());
                None
            }
        }
    }

    /// Finish the request holding `ticket`: swap the whole palette on success,
    /// keep it on failure. Returns false (and changes nothing) for a request
    /// that has been superseded.
    pub fn finish(&mut self, ticket: u64, result: Result<Theme, ThemeError>) -> bool {
        if ticket != self.latest {
            log::debug!("Dropping theme result {} (latest is {})", ticket, self.latest);
            return false;
        }
        self.loading = false;
        match result {
            Ok(theme) => {
                log::info!("Applied generated theme (sky {})", theme.sky_color);
                self.active = theme;
                self.error = None;
            }
            Err(e) => {
                log::error!("Failed to generate theme: {}", e);
                self.error = Some(e.user_message().to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    const VALID: &str = r##"{
        "skyColor": "#000000",
        "roadColor": "#222222",
        "stripeColor": "#ffff00",
        "grassColor": "#ff00ff",
        "playerCarColor": "#00ffff",
        "opponentCarColors": ["#111111", "#333333", "#555555"]
    }"##;

    struct MockGenerator {
        response: Result<String, GeneratorError>,
        calls: Cell<usize>,
        last_prompt: RefCell<Option<String>>,
    }

    impl MockGenerator {
        fn replying(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: Cell::new(0),
                last_prompt: RefCell::new(None),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                response: Err(GeneratorError(reason.to_string())),
                calls: Cell::new(0),
                last_prompt: RefCell::new(None),
            }
        }
    }

    impl ThemeGenerator for MockGenerator {
        async fn generate(&self, request: &ThemeRequest) -> Result<String, GeneratorError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_prompt.borrow_mut() = Some(request.prompt.clone());
            self.response.clone()
        }
    }

    #[test]
    fn test_accepts_three_colors() {
        let theme = Theme::from_json(VALID).unwrap();
        assert_eq!(theme.sky_color, "#000000");
        assert_eq!(theme.opponent_color(ColorSlot::wrapping(2)), Some("#555555"));
    }

    #[test]
    fn test_accepts_more_than_three_colors() {
        let text = VALID.replace(r##""#555555"]"##, r##""#555555", "#777777"]"##);
        let theme = Theme::from_json(&text).unwrap();
        assert_eq!(theme.opponent_car_colors.len(), 4);
    }

    #[test]
    fn test_rejects_two_colors() {
        let text = VALID.replace(r##", "#555555"]"##, "]");
        let err = Theme::from_json(&text).unwrap_err();
        assert!(matches!(err, ThemeError::Malformed(ref m) if m.contains("2 entries")));
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
    }

    #[test]
    fn test_rejects_missing_field() {
        let text = VALID.replace(r##""skyColor": "#000000","##, "");
        let err = Theme::from_json(&text).unwrap_err();
        assert_eq!(err, ThemeError::Malformed("missing skyColor".to_string()));

        let text = VALID.replace(r##""grassColor": "#ff00ff""##, r##""grassColor": """##);
        assert!(Theme::from_json(&text).is_err());
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(matches!(
            Theme::from_json("Sure! Here is a theme"),
            Err(ThemeError::Malformed(_))
        ));
    }

    #[test]
    fn test_default_theme_roundtrips_through_validation() {
        let json = serde_json::to_string(&Theme::default()).unwrap();
        assert_eq!(Theme::from_json(&json).unwrap(), Theme::default());
    }

    #[test]
    fn test_css_variables() {
        let theme = Theme::default();
        let vars = theme.css_variables();
        assert_eq!(vars.len(), 8);
        assert_eq!(vars[0], ("--sky-color".to_string(), "#1a202c"));
        assert_eq!(vars[7], ("--opponent-car-color-3".to_string(), "#38a169"));
    }

    #[test]
    fn test_request_prompt_and_schema() {
        let request = ThemeRequest::new("  neon synthwave  ").unwrap();
        assert_eq!(request.description, "neon synthwave");
        assert!(request.prompt.contains("\"neon synthwave\""));
        assert_eq!(request.schema["required"].as_array().map(Vec::len), Some(6));
    }

    #[test]
    fn test_empty_prompt_never_calls_generator() {
        let generator = MockGenerator::replying(VALID);
        for prompt in ["", "   ", "\t\n"] {
            let err = pollster::block_on(generate_theme(&generator, prompt)).unwrap_err();
            assert_eq!(err, ThemeError::EmptyPrompt);
            assert_eq!(err.user_message(), EMPTY_PROMPT_MESSAGE);
        }
        assert_eq!(generator.calls.get(), 0);
    }

    #[test]
    fn test_generate_theme_success() {
        let generator = MockGenerator::replying(VALID);
        let theme = pollster::block_on(generate_theme(&generator, "midnight")).unwrap();
        assert_eq!(theme.road_color, "#222222");
        assert_eq!(generator.calls.get(), 1);
        let prompt = generator.last_prompt.borrow().clone().unwrap();
        assert!(prompt.contains("midnight"));
    }

    #[test]
    fn test_generate_theme_transport_failure() {
        let generator = MockGenerator::failing("503");
        let err = pollster::block_on(generate_theme(&generator, "midnight")).unwrap_err();
        assert_eq!(err, ThemeError::Transport("503".to_string()));
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
    }

    #[test]
    fn test_state_keeps_theme_on_failure() {
        let mut state = ThemeState::default();
        let request = state.begin("lava").unwrap();
        assert!(state.is_loading());

        let generator = MockGenerator::replying(r##"{"skyColor": "#ff0000"}"##);
        let result = pollster::block_on(async {
            let text = generator.generate(&request).await?;
            Theme::from_json(&text)
        });
        assert!(state.finish(request.ticket, result));

        assert!(!state.is_loading());
        assert_eq!(state.active(), &Theme::default());
        assert_eq!(state.error(), Some(GENERATION_FAILED_MESSAGE));
    }

    #[test]
    fn test_state_swaps_theme_on_success() {
        let mut state = ThemeState::default();
        let first = state.begin("offline").unwrap();
        state.finish(first.ticket, Err(ThemeError::Transport("offline".into())));
        assert!(state.error().is_some());

        let second = state.begin("arcade").unwrap();
        assert!(state.finish(second.ticket, Theme::from_json(VALID)));
        assert_eq!(state.active().player_car_color, "#00ffff");
        assert!(state.error().is_none());
    }

    #[test]
    fn test_state_drops_superseded_result() {
        let mut state = ThemeState::default();
        let older = state.begin("lava").unwrap();
        let newer = state.begin("ice").unwrap();
        assert!(newer.ticket > older.ticket);

        // Newer request settles first
        let ice = Theme::from_json(VALID).unwrap();
        assert!(state.finish(newer.ticket, Ok(ice.clone())));
        assert!(!state.is_loading());

        // The slower, older one must not overwrite it
        assert!(!state.finish(older.ticket, Ok(Theme::default())));
        assert_eq!(state.active(), &ice);
        assert!(!state.finish(older.ticket, Err(ThemeError::Transport("late".into()))));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_state_stays_loading_until_latest_settles() {
        let mut state = ThemeState::default();
        let older = state.begin("lava").unwrap();
        let newer = state.begin("ice").unwrap();

        assert!(!state.finish(older.ticket, Theme::from_json(VALID)));
        assert!(state.is_loading());
        assert_eq!(state.active(), &Theme::default());

        assert!(state.finish(newer.ticket, Theme::from_json(VALID)));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_state_blank_prompt_is_local_error() {
        let mut state = ThemeState::default();
        assert!(state.begin("").is_none());
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some(EMPTY_PROMPT_MESSAGE));
    }
}
