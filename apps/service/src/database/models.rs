use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::monitoring::types::ServiceStatus;

/// A user-registered endpoint under monitoring.
///
/// `last_checked`, `last_status` and `is_active` are mutated exclusively by
/// the status tracker after each probe; the registration surface only ever
/// touches `name`, `url` and `check_interval`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredService {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Opaque identifier of the registering user (a chat id); notifications
    /// for this service are addressed to it.
    pub owner: String,
    pub is_active: bool,
    /// Desired seconds between checks. Minimum 60, default 300.
    pub check_interval: u64,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_status: ServiceStatus,
    pub created_at: DateTime<Utc>,
}

impl MonitoredService {
    /// Convert a timestamp to the unix-seconds column representation.
    pub fn timestamp_to_i64(time: DateTime<Utc>) -> i64 {
        time.timestamp()
    }

    /// Convert a unix-seconds column value back to a timestamp.
    pub fn i64_to_timestamp(timestamp: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
    }

    /// Tri-state status from its nullable column (NULL until first check).
    pub fn status_from_column(value: Option<i64>) -> ServiceStatus {
        match value {
            None => ServiceStatus::Unknown,
            Some(0) => ServiceStatus::Down,
            Some(_) => ServiceStatus::Up,
        }
    }
}
