//! Render configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VisualizerError;

/// Direction in which layers follow each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Layers left to right, neurons stacked vertically.
    Horizontal,
    /// Layers top to bottom, neurons side by side.
    #[default]
    Vertical,
}

impl FromStr for Orientation {
    type Err = VisualizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "horiz" | "h" => Ok(Orientation::Horizontal),
            "vertical" | "vert" | "v" => Ok(Orientation::Vertical),
            _ => Err(VisualizerError::InvalidOrientation(s.to_string())),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

impl Serialize for Orientation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How a network is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub orientation: Orientation,
    /// Elide the middle of layers wider than `max_neurons_display`.
    pub summarized: bool,
    /// Slots drawn for an elided layer, ellipsis included.
    pub max_neurons_display: usize,
    /// Place the technical annotation next to each non-input layer.
    pub show_layer_info: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            summarized: true,
            max_neurons_display: 19,
            show_layer_info: true,
        }
    }
}

/// Smallest display cap that still shows one neuron on each side of the ellipsis.
pub const MIN_DISPLAY: usize = 3;

/// Rounds a display cap up to an odd number, never below [`MIN_DISPLAY`].
///
/// An odd cap splits evenly into two halves around the ellipsis slot.
pub fn normalize_max_display(requested: usize) -> usize {
    let max = requested.max(MIN_DISPLAY);
    if max % 2 == 0 { max + 1 } else { max }
}

impl RenderConfig {
    /// `max_neurons_display` after [`normalize_max_display`].
    pub fn effective_max_display(&self) -> usize {
        normalize_max_display(self.max_neurons_display)
    }

    /// Display cap to pass to the summarizer, or `None` when every neuron is drawn.
    pub fn display_cap(&self) -> Option<usize> {
        self.summarized.then(|| self.effective_max_display())
    }
}
