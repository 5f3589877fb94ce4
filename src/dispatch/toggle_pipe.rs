use crate::error::Result;
use crate::{log_error, log_info};
use crate::state::PipeName;

use super::{Dispatcher, PipeCommand};

/// Share of the pipe's maximum debit a freshly opened pipe starts at.
const TOGGLE_ON_DEBIT_RATIO: f64 = 0.1;

impl Dispatcher {
    /// Flips the pipe. Opening starts at 10% of the pipe's maximum debit and
    /// sends no temperature; closing forces debit to zero.
    pub fn toggle_pipe(&self, pipe: PipeName) -> Result<PipeCommand> {
        let mut command = PipeCommand::Off { pipe };
        self.store.update(|state| {
            let mut next = *state.pipe(pipe);
            next.is_on = !next.is_on;

            if next.is_on {
                let debit = TOGGLE_ON_DEBIT_RATIO * pipe.max_debit();
                next.debit = Some(debit);
                command = PipeCommand::On { pipe, debit, temperature: None };
            } else {
                next.debit = Some(0.0);
                command = PipeCommand::Off { pipe };
            }

            Some(state.with_pipe(pipe, next))
        });

        log_info!("🚿 Toggled {} ({})", pipe, command);

        if let Err(e) = self.publish(&command) {
            log_error!("Failed to publish '{}': {}", command, e);
            return Err(e);
        }
        Ok(command)
    }
}
