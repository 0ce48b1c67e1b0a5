//! Time resolution for the sentinel date field.
//!
//! A [`TimeSource`] supplies an authoritative UTC instant (normally [`NtpClient`]).
//! [`TimeResolver`] shifts it by the configured offset and falls back to the local
//! clock whenever the source fails. [`DatePreview`] runs the same resolution on a
//! background task for live form previews.

mod ntp;
mod preview;
mod resolver;

pub use ntp::*;
pub use preview::*;
pub use resolver::*;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Something that can tell the current UTC time, possibly over the network.
pub trait TimeSource: Send + Sync {
    fn now_utc(&self) -> impl Future<Output = Result<DateTime<Utc>, TimeError>> + Send;
}

/// Why a time source could not produce an instant. Never reaches users:
/// the resolver logs it and uses the local clock instead.
#[derive(Error, Debug)]
pub enum TimeError {
    #[error("time query timed out after {0:?}")]
    Timeout(Duration),

    #[error("time server '{0}' could not be resolved")]
    Unresolvable(String),

    #[error("time query transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed time reply: {0}")]
    MalformedReply(String),
}
