use crate::{log_debug, log_info, log_warn};
use crate::state::PipeState;

use super::{Dispatcher, InboundMessage, MessageError};

impl Dispatcher {
    /// Folds one inbound payload into the store. Messages are applied in
    /// arrival order, last write wins. Unparseable payloads leave the state
    /// untouched and come back as the error for the caller to ignore.
    pub fn apply_message(&self, payload: &str) -> Result<InboundMessage, MessageError> {
        let message = match InboundMessage::parse(payload) {
            Ok(message) => message,
            Err(e) if e.is_unknown_kind() => {
                log_debug!("Ignoring inbound message '{}': {}", payload.trim(), e);
                return Err(e);
            }
            Err(e) => {
                log_warn!("Dropping inbound message '{}': {}", payload.trim(), e);
                return Err(e);
            }
        };

        log_info!("📥 {}", message.kind());

        self.store.update(|state| {
            Some(match message {
                InboundMessage::CurrentVolume(volume) => state.with_current_volume(volume),
                InboundMessage::PipeOn { pipe, debit, temperature } => state.with_pipe(
                    pipe,
                    PipeState {
                        is_on: true,
                        debit: Some(debit),
                        temperature: Some(temperature),
                    },
                ),
                InboundMessage::PipeOff { pipe } => state.with_pipe(
                    pipe,
                    PipeState {
                        is_on: false,
                        debit: Some(0.0),
                        temperature: state.pipe(pipe).temperature,
                    },
                ),
                InboundMessage::WaterQuality { bad } => state.with_bad_water_quality(bad),
            })
        });

        Ok(message)
    }
}
