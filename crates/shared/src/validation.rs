//! Common validation utilities.

use chrono::{DateTime, Utc};
use std::net::{IpAddr, SocketAddr};
use validator::ValidationError;

/// Maximum length of a single target-audience label.
const MAX_LABEL_LENGTH: usize = 50;

/// Maximum number of target-audience labels on one announcement.
pub const MAX_AUDIENCE_LABELS: usize = 10;

lazy_static::lazy_static! {
    static ref HOSTNAME_REGEX: regex::Regex = regex::Regex::new(
        r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$"
    )
    .unwrap();
}

/// Validates that a text value contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a client network address.
///
/// Accepts an IPv4/IPv6 address, a socket address (`host:port`) or a DNS hostname.
pub fn validate_network_address(address: &str) -> Result<(), ValidationError> {
    if address.parse::<IpAddr>().is_ok()
        || address.parse::<SocketAddr>().is_ok()
        || (address.len() <= 253 && HOSTNAME_REGEX.is_match(address))
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("network_address");
        err.message = Some("Network address must be an IP address or hostname".into());
        Err(err)
    }
}

/// Validates that an expiration date falls strictly after the publish date.
pub fn validate_date_order(
    publish_date: DateTime<Utc>,
    expiration_date: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if expiration_date > publish_date {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_order");
        err.message = Some("Expiration date must be after the publish date".into());
        Err(err)
    }
}

/// Validates target-audience labels: bounded count, each non-blank and short.
pub fn validate_audience_labels(labels: &[String]) -> Result<(), ValidationError> {
    if labels.len() > MAX_AUDIENCE_LABELS {
        let mut err = ValidationError::new("audience_count");
        err.message = Some(format!("At most {} audience labels are allowed", MAX_AUDIENCE_LABELS).into());
        return Err(err);
    }

    for label in labels {
        if label.trim().is_empty() || label.chars().count() > MAX_LABEL_LENGTH {
            let mut err = ValidationError::new("audience_label");
            err.message = Some(
                format!(
                    "Audience labels must be between 1 and {} characters",
                    MAX_LABEL_LENGTH
                )
                .into(),
            );
            return Err(err);
        }
    }

    Ok(())
}
