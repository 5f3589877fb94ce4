// src/dispatch/message.rs

//! Inbound wire grammar. Payloads are slash-delimited, the first segment is
//! the message kind:
//!
//! - `currentVolume/<float>`
//! - `pipe/<name>/on/<debit>/<temperature>`
//! - `pipe/<name>/off`
//! - `waterQuality/<0|1>` (`1` is good water)
use thiserror::Error;

use crate::state::PipeName;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MessageError {
    #[error("unknown message kind '{0}'")]
    UnknownKind(String),

    #[error("unknown pipe '{0}'")]
    UnknownPipe(String),

    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),

    #[error("bad number '{value}' for <{field}>")]
    BadNumber { field: &'static str, value: String },

    #[error("bad pipe mode '{0}', expected 'on' or 'off'")]
    BadPipeMode(String),
}

impl MessageError {
    /// Traffic this panel does not consume, such as its own `setPipe` echo.
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, MessageError::UnknownKind(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InboundMessage {
    CurrentVolume(f64),
    PipeOn {
        pipe: PipeName,
        debit: f64,
        temperature: f64,
    },
    PipeOff {
        pipe: PipeName,
    },
    WaterQuality {
        bad: bool,
    },
}

impl InboundMessage {
    pub fn parse(payload: &str) -> Result<Self, MessageError> {
        let mut segments = payload.trim().split('/');
        let kind = segments.next().unwrap_or_default();

        match kind {
            "currentVolume" => {
                let volume = number(segments.next(), "volume")?;
                Ok(InboundMessage::CurrentVolume(volume))
            }
            "pipe" => {
                let name = segments.next().ok_or(MessageError::MissingArgument("pipeName"))?;
                let pipe = name
                    .parse::<PipeName>()
                    .map_err(|_| MessageError::UnknownPipe(name.to_string()))?;

                match segments.next() {
                    Some("on") => {
                        let debit = number(segments.next(), "debit")?;
                        let temperature = number(segments.next(), "temperature")?;
                        Ok(InboundMessage::PipeOn { pipe, debit, temperature })
                    }
                    Some("off") => Ok(InboundMessage::PipeOff { pipe }),
                    Some(other) => Err(MessageError::BadPipeMode(other.to_string())),
                    None => Err(MessageError::MissingArgument("on|off")),
                }
            }
            // anything but an explicit "1" counts as bad water
            "waterQuality" => Ok(InboundMessage::WaterQuality {
                bad: segments.next() != Some("1"),
            }),
            other => Err(MessageError::UnknownKind(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::CurrentVolume(_) => "currentVolume",
            InboundMessage::PipeOn { .. } | InboundMessage::PipeOff { .. } => "pipe",
            InboundMessage::WaterQuality { .. } => "waterQuality",
        }
    }
}

fn number(segment: Option<&str>, field: &'static str) -> Result<f64, MessageError> {
    let raw = segment.ok_or(MessageError::MissingArgument(field))?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MessageError::BadNumber {
            field,
            value: raw.to_string(),
        }),
    }
}
