//! Registration-time validation for monitor targets and intervals.

use url::Url;

use crate::error::ValidationError;

/// Seconds between checks when the owner does not pick one.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;

/// Hard floor for per-service check intervals.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 60;

/// Structural validity check for a monitor URL.
///
/// Accepts http, https and ftp schemes with any resolvable-looking host
/// (hostname, IP or localhost) plus optional port and path. Owners monitor
/// their own endpoints, so private and loopback hosts are allowed.
pub fn validate_endpoint(target: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidUrl {
        url: target.to_string(),
        reason: reason.to_string(),
    };

    if target.trim().is_empty() {
        return Err(invalid("url cannot be empty"));
    }

    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(_) if !target.contains("://") => {
            return Err(invalid("url must include a scheme (http:// or https://)"));
        }
        Err(err) => {
            return Err(ValidationError::InvalidUrl {
                url: target.to_string(),
                reason: err.to_string(),
            });
        }
    };

    match url.scheme() {
        "http" | "https" | "ftp" => {}
        other => return Err(invalid(&format!("unsupported scheme '{other}'"))),
    }

    if url.host_str().is_none() {
        return Err(invalid("url must have a host"));
    }

    Ok(())
}

/// Enforce the per-service interval floor.
pub fn validate_check_interval(seconds: u64) -> Result<(), ValidationError> {
    if seconds < MIN_CHECK_INTERVAL_SECS {
        return Err(ValidationError::IntervalTooShort {
            seconds,
            minimum: MIN_CHECK_INTERVAL_SECS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_endpoints() {
        assert!(validate_endpoint("https://example.com").is_ok());
        assert!(validate_endpoint("http://example.com:8080/health").is_ok());
        assert!(validate_endpoint("ftp://files.example.com").is_ok());
        assert!(validate_endpoint("http://localhost:3000").is_ok());
        assert!(validate_endpoint("http://192.168.1.10/status").is_ok());
    }

    #[test]
    fn rejects_malformed_endpoints() {
        assert!(validate_endpoint("").is_err());
        assert!(validate_endpoint("   ").is_err());
        assert!(validate_endpoint("example.com").is_err()); // missing scheme
        assert!(validate_endpoint("gopher://example.com").is_err());
        assert!(validate_endpoint("https://").is_err()); // no host
        assert!(validate_endpoint("not a url").is_err());
    }

    #[test]
    fn interval_floor_is_sixty_seconds() {
        assert!(validate_check_interval(30).is_err());
        assert!(validate_check_interval(59).is_err());
        assert!(validate_check_interval(60).is_ok());
        assert!(validate_check_interval(120).is_ok());
        assert!(validate_check_interval(86400).is_ok());
    }
}
