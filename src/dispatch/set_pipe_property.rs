use crate::error::Result;
use crate::{log_error, log_info};
use crate::state::PipeName;

use super::{DebitPolicy, Dispatcher, PipeCommand, PipeProperty};

impl Dispatcher {
    /// Applies a slider edit. `raw_value` is not validated: anything that
    /// does not parse as a finite float lands in state as NaN.
    ///
    /// The store is updated before publishing and is not rolled back if the
    /// publish fails.
    pub fn set_pipe_property(
        &self,
        pipe: PipeName,
        property: PipeProperty,
        raw_value: &str,
    ) -> Result<PipeCommand> {
        let value = raw_value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(f64::NAN);
        let policy = self.policy;

        let mut command = PipeCommand::Off { pipe };
        self.store.update(|state| {
            let mut next = *state.pipe(pipe);
            match property {
                PipeProperty::Debit => {
                    next.debit = Some(value);
                    if policy == DebitPolicy::DeriveOnOff {
                        next.is_on = value != 0.0;
                    }
                }
                PipeProperty::Temperature => next.temperature = Some(value),
            }
            command = PipeCommand::for_state(pipe, &next);
            Some(state.with_pipe(pipe, next))
        });

        log_info!("🛁 {} {} -> {} ({})", pipe, property, value, command);

        if let Err(e) = self.publish(&command) {
            log_error!("Failed to publish '{}': {}", command, e);
            return Err(e);
        }
        Ok(command)
    }

    pub(super) fn publish(&self, command: &PipeCommand) -> Result<()> {
        self.publisher.publish(&self.publish_topic, command.to_string())
    }
}
