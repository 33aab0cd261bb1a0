use crate::animation::Easing;
use crate::rotation::RotateOptions;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use std::time::Duration;

/// Tunable motion constants. Every field has a default so partial config
/// tables deserialize cleanly.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fraction of the remaining gap closed per 60 Hz frame by `tick`.
    pub damping: f64,
    /// Radians under which `tick` snaps onto the target.
    pub settle_epsilon: f64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "rotate_ms")]
    pub rotate_duration: Duration,
    pub rotate_easing: Easing,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "snap_ms")]
    pub snap_duration: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "highlight_ms")]
    pub highlight_duration: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "submenu_show_ms")]
    pub submenu_show: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "submenu_hide_ms")]
    pub submenu_hide: Duration,
    /// After an explicit selection, automatic front highlighting stays quiet
    /// this long.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "debounce_ms")]
    pub selection_debounce: Duration,
    pub animate_selection: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            damping: 0.18,
            settle_epsilon: 0.005,
            rotate_duration: Duration::from_millis(450),
            rotate_easing: Easing::CubicOut,
            snap_duration: Duration::from_millis(180),
            highlight_duration: Duration::from_millis(250),
            submenu_show: Duration::from_millis(300),
            submenu_hide: Duration::from_millis(220),
            selection_debounce: Duration::from_millis(500),
            animate_selection: true,
        }
    }
}

impl Tuning {
    pub fn rotate_options(&self, animate: bool) -> RotateOptions {
        if animate {
            RotateOptions::animated(self.rotate_duration, self.rotate_easing)
        } else {
            RotateOptions::snap()
        }
    }

    pub fn snap_options(&self) -> RotateOptions {
        RotateOptions::animated(self.snap_duration, Easing::QuadInOut)
    }
}
