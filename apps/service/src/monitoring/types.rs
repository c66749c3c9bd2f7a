use serde::{Deserialize, Serialize};

/// Up/down classification of a monitored service.
///
/// `Unknown` means no check has ever completed; the first recorded outcome
/// establishes the baseline without counting as a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Unknown,
    Up,
    Down,
}

impl ServiceStatus {
    pub fn from_is_up(is_up: bool) -> Self {
        if is_up { ServiceStatus::Up } else { ServiceStatus::Down }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, ServiceStatus::Unknown)
    }
}

/// Result of a single reachability probe. Ephemeral: consumed by the status
/// tracker right after the probe and never persisted as its own record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub is_up: bool,
    /// HTTP status code of the response, 0 when the target was unreachable.
    pub status_code: u16,
}

impl ProbeOutcome {
    /// Classify a response: anything below 400 counts as up.
    pub fn from_status_code(status_code: u16) -> Self {
        Self { is_up: status_code < 400, status_code }
    }

    /// The outcome for any transport-level failure (DNS, refused, TLS,
    /// timeout, malformed URL). The failure is the signal, not an error.
    pub fn unreachable() -> Self {
        Self { is_up: false, status_code: 0 }
    }

    pub fn status(self) -> ServiceStatus {
        ServiceStatus::from_is_up(self.is_up)
    }
}

/// Per-service entry in a cycle's result set.
#[derive(Debug, Clone)]
pub struct ServiceCheck {
    pub service_id: i64,
    pub name: String,
    pub url: String,
    pub owner: String,
    pub outcome: ProbeOutcome,
    pub transitioned: bool,
    /// Infrastructure fault for this entry (persistence failure or a
    /// crashed check task). Probe failures are not errors.
    pub error: Option<String>,
}
