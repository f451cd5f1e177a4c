use log::Level;
use serde::{Deserialize, Deserializer};

use crate::error::FxError;
use crate::geometry::{Length, ObserverOptions, RootMargin};

/// Id of the optional `<script type="application/json">` element that
/// overrides the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "page-fx-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose wiring logs when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    pub particle_count: usize,
    /// Minimum viewport width for particles.
    pub particle_min_width: u32,
    /// Minimum viewport width for the scroll spy.
    pub desktop_min_width: u32,
    /// Throttle interval shared by parallax and timeline, ~60fps.
    pub frame_interval_ms: f64,
    pub parallax_range: f64,
    pub reveal_selector: String,
    #[serde(deserialize_with = "reveal_options")]
    pub reveal: ObserverOptions,
    #[serde(deserialize_with = "scroll_spy_options")]
    pub scroll_spy: ObserverOptions,
    pub timeline_lead_in: f64,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            particle_count: 12,
            particle_min_width: 768,
            desktop_min_width: 769,
            frame_interval_ms: 16.0,
            parallax_range: 20.0,
            reveal_selector: ".guideline-card, .about-content, .advisory-card".to_string(),
            reveal: ObserverOptions::new(
                0.2,
                RootMargin {
                    top: Length::Px(0.0),
                    right: Length::Px(0.0),
                    bottom: Length::Px(-100.0),
                    left: Length::Px(0.0),
                },
            ),
            scroll_spy: ObserverOptions::new(
                0.3,
                RootMargin {
                    top: Length::Px(-100.0),
                    right: Length::Px(0.0),
                    bottom: Length::Percent(-60.0),
                    left: Length::Px(0.0),
                },
            ),
            timeline_lead_in: 20.0,
        }
    }
}

impl FxConfig {
    /// Parses a partial JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, FxError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn particle_media_query(&self) -> String {
        format!("(min-width: {}px)", self.particle_min_width)
    }

    pub fn desktop_media_query(&self) -> String {
        format!("(min-width: {}px)", self.desktop_min_width)
    }
}

/// Observer settings as written in JSON; absent fields keep the effect's
/// own default.
#[derive(Deserialize)]
struct ObserverOverride {
    threshold: Option<f64>,
    root_margin: Option<RootMargin>,
}

impl ObserverOverride {
    fn onto(self, base: ObserverOptions) -> ObserverOptions {
        ObserverOptions::new(
            self.threshold.unwrap_or(base.threshold),
            self.root_margin.unwrap_or(base.root_margin),
        )
    }
}

fn reveal_options<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<ObserverOptions, D::Error> {
    Ok(ObserverOverride::deserialize(deserializer)?.onto(FxConfig::default().reveal))
}

fn scroll_spy_options<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<ObserverOptions, D::Error> {
    Ok(ObserverOverride::deserialize(deserializer)?.onto(FxConfig::default().scroll_spy))
}

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
