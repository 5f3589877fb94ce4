// src/dispatch/mod.rs

//! Message Dispatcher - turns local intent into outbound commands plus an
//! optimistic state update, and folds inbound device messages into state.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::state::{
    PipeName, StateStore, DEBIT_STEP, MAX_WATER_TEMPERATURE, MIN_WATER_TEMPERATURE,
    TEMPERATURE_STEP,
};
use crate::util::io::broker::Publisher;

pub mod command;
pub mod message;
mod apply_message;
mod set_pipe_property;
mod toggle_pipe;

pub use command::PipeCommand;
pub use message::{InboundMessage, MessageError};

/// How a direct debit edit affects `is_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebitPolicy {
    /// A nonzero debit switches the pipe on, zero switches it off.
    #[default]
    DeriveOnOff,
    /// Debit edits never touch `is_on`; a pipe may be on with zero debit.
    Independent,
}

/// A slider-backed field of a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeProperty {
    Debit,
    Temperature,
}

/// Bounds and step of a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Decimal places the step resolves to (`0.01` -> 2, `1` -> 0).
    pub fn decimals(&self) -> usize {
        if self.step >= 1.0 {
            0
        } else {
            (-self.step.log10()).ceil() as usize
        }
    }

    /// Slider value as the text a range input would report.
    pub fn format(&self, value: f64) -> String {
        format!("{:.*}", self.decimals(), value)
    }

    /// Position of `value` along the track, `0.0..=1.0`.
    pub fn ratio(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl PipeProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipeProperty::Debit => "debit",
            PipeProperty::Temperature => "temperature",
        }
    }

    pub fn range(&self, pipe: PipeName) -> SliderRange {
        match self {
            PipeProperty::Debit => SliderRange {
                min: 0.0,
                max: pipe.max_debit(),
                step: DEBIT_STEP,
            },
            PipeProperty::Temperature => SliderRange {
                min: MIN_WATER_TEMPERATURE,
                max: MAX_WATER_TEMPERATURE,
                step: TEMPERATURE_STEP,
            },
        }
    }

    pub fn other(&self) -> PipeProperty {
        match self {
            PipeProperty::Debit => PipeProperty::Temperature,
            PipeProperty::Temperature => PipeProperty::Debit,
        }
    }
}

impl fmt::Display for PipeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns no state of its own: every operation goes through the [`StateStore`]
/// and, for local intent, the [`Publisher`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: StateStore,
    publisher: Arc<dyn Publisher>,
    publish_topic: String,
    policy: DebitPolicy,
}

impl Dispatcher {
    pub fn new(
        store: StateStore,
        publisher: Arc<dyn Publisher>,
        publish_topic: String,
        policy: DebitPolicy,
    ) -> Self {
        Self {
            store,
            publisher,
            publish_topic,
            policy,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_ranges() {
        let bath = PipeProperty::Debit.range(PipeName::Bath);
        assert_eq!((bath.min, bath.max, bath.step), (0.0, 0.25, 0.01));

        let shower = PipeProperty::Debit.range(PipeName::Shower);
        assert_eq!(shower.max, 0.2);

        let temp = PipeProperty::Temperature.range(PipeName::Shower);
        assert_eq!((temp.min, temp.max, temp.step), (5.0, 50.0, 1.0));
        assert_eq!(temp.clamp(80.0), 50.0);
        assert_eq!(temp.clamp(-3.0), 5.0);
    }

    #[test]
    fn test_slider_value_text() {
        let debit = PipeProperty::Debit.range(PipeName::Bath);
        assert_eq!(debit.decimals(), 2);
        assert_eq!(debit.format(0.07 + 0.01), "0.08");
        assert_eq!(debit.ratio(0.125), 0.5);

        let temp = PipeProperty::Temperature.range(PipeName::Bath);
        assert_eq!(temp.decimals(), 0);
        assert_eq!(temp.format(21.0), "21");
        assert_eq!(temp.ratio(5.0), 0.0);
    }
}
