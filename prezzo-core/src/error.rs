use thiserror::Error;

/// Which validation stage rejected a date input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorKind {
    /// The textual shape did not match `YYYY-MM-DD HH:MM:SS`.
    Format,
    /// The shape was right but the fields name no real calendar instant.
    Calendar,
    /// Some other argument was rejected (empty token, bad config, ...).
    Argument,
}

impl std::fmt::Display for InputErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Format => "format",
            Self::Calendar => "calendar",
            Self::Argument => "argument",
        })
    }
}

/// Unified error type for the prezzo workspace.
///
/// Ordinary provider absence is a value (`NoData`), never a panic; genuinely
/// unexpected faults are panics and are not represented here.
#[derive(Debug, Error)]
pub enum PrezzoError {
    /// Input was rejected before any cache or network activity.
    #[error("invalid input ({kind}): {msg}")]
    InvalidInput {
        /// Which validation stage rejected the input.
        kind: InputErrorKind,
        /// Human-readable rejection message.
        msg: String,
    },

    /// The normalized instant lies after the current wall-clock time.
    #[error("instant {instant_ms} is in the future")]
    FutureInstant {
        /// The rejected instant in epoch milliseconds.
        instant_ms: i64,
    },

    /// The pacing guard stayed busy through the bounded retry budget.
    #[error("rate-limit guard busy after waiting {waited_ms}ms")]
    RateLimitBusy {
        /// Total time spent waiting across every attempt.
        waited_ms: u64,
    },

    /// A provider had no usable data for the request; the fallback chain
    /// proceeds past this.
    #[error("no data: {what}")]
    NoData {
        /// Description of what was missing, e.g. "candles for xmr".
        what: String,
    },

    /// An individual connector failed transiently (HTTP, venue-side error).
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An individual provider call exceeded the configured timeout.
    #[error("provider timed out: {connector}")]
    ProviderTimeout {
        /// Connector name that timed out.
        connector: String,
    },

    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// Capability label describing what was requested.
        capability: &'static str,
    },

    /// A payload arrived but could not be decoded into the expected shape.
    #[error("data issue: {0}")]
    Data(String),
}

impl PrezzoError {
    /// Helper: build a format-stage `InvalidInput`.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            kind: InputErrorKind::Format,
            msg: msg.into(),
        }
    }

    /// Helper: build a calendar-stage `InvalidInput`.
    pub fn calendar(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            kind: InputErrorKind::Calendar,
            msg: msg.into(),
        }
    }

    /// Helper: build an argument-stage `InvalidInput`.
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            kind: InputErrorKind::Argument,
            msg: msg.into(),
        }
    }

    /// Helper: build a `NoData` error for a description of the missing data.
    pub fn no_data(what: impl Into<String>) -> Self {
        Self::NoData { what: what.into() }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
        }
    }

    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub const fn unsupported(capability: &'static str) -> Self {
        Self::Unsupported { capability }
    }

    /// Whether the fallback walk may continue past this failure.
    ///
    /// Absence, transient connector trouble, timeouts, and undecodable
    /// payloads leave the next provider untouched; everything else is
    /// terminal to the query.
    #[must_use]
    pub const fn continues_fallback(&self) -> bool {
        matches!(
            self,
            Self::NoData { .. }
                | Self::Connector { .. }
                | Self::ProviderTimeout { .. }
                | Self::Unsupported { .. }
                | Self::Data(_)
        )
    }
}
