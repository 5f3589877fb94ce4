// src/ui/format.rs

//! Readout formatting shared by the panel widgets
use crate::state::{ApplicationState, PipeName, PipeState, BATHTUB_VOLUME};

/// Debit as a whole percentage of the pipe's maximum, e.g. `40%`.
pub fn debit_percent(pipe: PipeName, state: &PipeState) -> String {
    format!("{:.0}%", state.debit_or_zero() / pipe.max_debit() * 100.0)
}

pub fn temperature(state: &PipeState) -> String {
    format!("{}°C", state.temperature_or_default())
}

pub fn volume(state: &ApplicationState) -> String {
    format!("{} / {}", state.current_volume, BATHTUB_VOLUME)
}

/// Fill ratio for the volume gauge, always inside `0.0..=1.0`.
pub fn volume_ratio(state: &ApplicationState) -> f64 {
    let ratio = state.current_volume / BATHTUB_VOLUME;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

pub fn water_quality(state: &ApplicationState) -> &'static str {
    if state.bad_water_quality { "Bad" } else { "Good" }
}

pub fn on_off(state: &PipeState) -> &'static str {
    if state.is_on { "On" } else { "Off" }
}
