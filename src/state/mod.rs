// src/state/mod.rs

//! Application State - last-known snapshot of both pipes and the tub readouts
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod store;
mod update;

pub use store::StateStore;

/// Bathtub capacity in liters, display only.
pub const BATHTUB_VOLUME: f64 = 300.0;
/// Maximum bath debit, liters/second.
pub const BATH_MAX_DEBIT: f64 = 0.25;
/// Maximum shower debit, liters/second.
pub const SHOWER_MAX_DEBIT: f64 = 0.2;
pub const MIN_WATER_TEMPERATURE: f64 = 5.0;
pub const MAX_WATER_TEMPERATURE: f64 = 50.0;
/// Temperature assumed when the device has not reported one yet.
pub const DEFAULT_TEMPERATURE: f64 = 20.0;

pub const DEBIT_STEP: f64 = 0.01;
pub const TEMPERATURE_STEP: f64 = 1.0;

/// A controllable water source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipeName {
    Bath,
    Shower,
}

impl PipeName {
    pub const ALL: [PipeName; 2] = [PipeName::Bath, PipeName::Shower];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipeName::Bath => "bath",
            PipeName::Shower => "shower",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipeName::Bath => "Bathtub",
            PipeName::Shower => "Shower",
        }
    }

    pub fn max_debit(&self) -> f64 {
        match self {
            PipeName::Bath => BATH_MAX_DEBIT,
            PipeName::Shower => SHOWER_MAX_DEBIT,
        }
    }

    pub fn other(&self) -> PipeName {
        match self {
            PipeName::Bath => PipeName::Shower,
            PipeName::Shower => PipeName::Bath,
        }
    }
}

impl fmt::Display for PipeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bath" => Ok(PipeName::Bath),
            "shower" => Ok(PipeName::Shower),
            other => Err(format!("unknown pipe '{}'", other)),
        }
    }
}

/// State of the bath or the shower.
///
/// `is_on` and `debit` are independent fields; which one drives the other
/// when the user edits debit is decided by [`crate::dispatch::DebitPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipeState {
    pub is_on: bool,
    /// Flow rate. `None` until the first local edit or device report.
    pub debit: Option<f64>,
    /// `None` until the first local edit or device report.
    pub temperature: Option<f64>,
}

impl PipeState {
    pub fn debit_or_zero(&self) -> f64 {
        self.debit.unwrap_or(0.0)
    }

    pub fn temperature_or_default(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// Root record. Replaced wholesale on every transition, never mutated in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApplicationState {
    pub bath: PipeState,
    pub shower: PipeState,
    pub current_volume: f64,
    pub bad_water_quality: bool,
}

impl ApplicationState {
    pub fn pipe(&self, name: PipeName) -> &PipeState {
        match name {
            PipeName::Bath => &self.bath,
            PipeName::Shower => &self.shower,
        }
    }
}
