use std::fmt;

use crate::state::{PipeName, PipeState};

/// Outbound command, rendered on the wire as
/// `setPipe/<pipe>/on/<debit>[/<temperature>]` or `setPipe/<pipe>/off`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipeCommand {
    On {
        pipe: PipeName,
        debit: f64,
        temperature: Option<f64>,
    },
    Off {
        pipe: PipeName,
    },
}

impl PipeCommand {
    /// Command describing the full state of a pipe, temperature included.
    pub fn for_state(pipe: PipeName, state: &PipeState) -> Self {
        if state.is_on {
            PipeCommand::On {
                pipe,
                debit: state.debit_or_zero(),
                temperature: Some(state.temperature_or_default()),
            }
        } else {
            PipeCommand::Off { pipe }
        }
    }
}

impl fmt::Display for PipeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeCommand::On { pipe, debit, temperature: Some(t) } => {
                write!(f, "setPipe/{}/on/{}/{}", pipe, debit, t)
            }
            PipeCommand::On { pipe, debit, temperature: None } => {
                write!(f, "setPipe/{}/on/{}", pipe, debit)
            }
            PipeCommand::Off { pipe } => write!(f, "setPipe/{}/off", pipe),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let on = PipeCommand::On { pipe: PipeName::Shower, debit: 0.15, temperature: Some(38.0) };
        assert_eq!(on.to_string(), "setPipe/shower/on/0.15/38");

        let bare = PipeCommand::On { pipe: PipeName::Bath, debit: 0.025, temperature: None };
        assert_eq!(bare.to_string(), "setPipe/bath/on/0.025");

        assert_eq!(PipeCommand::Off { pipe: PipeName::Bath }.to_string(), "setPipe/bath/off");
    }

    #[test]
    fn test_for_state_fills_missing_readings() {
        let state = PipeState { is_on: true, debit: None, temperature: None };

        let command = PipeCommand::for_state(PipeName::Bath, &state);

        assert_eq!(command.to_string(), "setPipe/bath/on/0/20");
    }

    #[test]
    fn test_for_state_off_ignores_readings() {
        let state = PipeState { is_on: false, debit: Some(0.1), temperature: Some(30.0) };

        assert_eq!(
            PipeCommand::for_state(PipeName::Shower, &state),
            PipeCommand::Off { pipe: PipeName::Shower }
        );
    }
}
