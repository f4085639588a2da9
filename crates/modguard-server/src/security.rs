//! Outbound endpoint validation
//!
//! Every URL the service calls on its own (classifier, chat webhook, e-mail
//! provider) comes from configuration. These checks keep a bad config from
//! pointing the service at loopback, private networks or cloud metadata.

use crate::config::ServerConfig;
use std::net::IpAddr;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("{name}: invalid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },

    #[error("{name}: URL scheme '{scheme}' is not allowed, only HTTPS is permitted")]
    InvalidScheme { name: &'static str, scheme: String },

    #[error("{name}: host '{host}' is blocked: internal/private addresses are not allowed")]
    BlockedHost { name: &'static str, host: String },

    #[error("{name}: URL must have a host")]
    MissingHost { name: &'static str },
}

/// Hostnames never accepted as outbound endpoints
const BLOCKED_HOSTNAMES: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "ip6-localhost",
    "ip6-loopback",
    // Cloud metadata services
    "metadata.google.internal",
    "metadata.goog",
    "169.254.169.254",
    "fd00:ec2::254",
];

/// Validate a single outbound URL. `name` identifies it in errors.
pub fn validate_endpoint_url(name: &'static str, raw: &str) -> Result<Url, SecurityError> {
    let url = Url::parse(raw).map_err(|source| SecurityError::InvalidUrl { name, source })?;

    if url.scheme() != "https" {
        return Err(SecurityError::InvalidScheme {
            name,
            scheme: url.scheme().to_string(),
        });
    }

    let host = url.host_str().ok_or(SecurityError::MissingHost { name })?;
    let host_lower = host.trim_start_matches('[').trim_end_matches(']').to_lowercase();
    let blocked = || SecurityError::BlockedHost {
        name,
        host: host.to_string(),
    };

    for hostname in BLOCKED_HOSTNAMES {
        if host_lower == *hostname || host_lower.ends_with(&format!(".{}", hostname)) {
            return Err(blocked());
        }
    }

    if let Ok(ip) = host_lower.parse::<IpAddr>() {
        if ip.is_loopback() || ip.is_unspecified() || is_private_ip(&ip) || is_link_local(&ip) {
            return Err(blocked());
        }
    }

    Ok(url)
}

/// Validate every configured outbound endpoint.
///
/// Skipped entirely when `allow_insecure_endpoints` is set.
pub fn validate_outbound_endpoints(config: &ServerConfig) -> Result<(), SecurityError> {
    if config.allow_insecure_endpoints {
        return Ok(());
    }

    validate_endpoint_url("classifier.base_url", &config.classifier.base_url)?;
    if let Some(webhook) = config.alerts.slack_webhook_url.as_deref() {
        validate_endpoint_url("alerts.slack_webhook_url", webhook)?;
    }
    if config.alerts.brevo_api_key.is_some() {
        validate_endpoint_url("alerts.email_endpoint", &config.alerts.email_endpoint)?;
    }
    Ok(())
}

/// RFC 1918, carrier-grade NAT, "this network" and IPv6 unique-local ranges
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            v4.is_private() || (octets[0] == 100 && (octets[1] & 0xC0) == 64) || octets[0] == 0
        }
        IpAddr::V6(v6) => (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

fn is_link_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_https_endpoints_pass() {
        assert!(validate_endpoint_url("x", "https://api.perplexity.ai").is_ok());
        assert!(validate_endpoint_url("x", "https://hooks.slack.com/services/T/B/C").is_ok());
    }

    #[test]
    fn test_plain_http_is_rejected() {
        let err = validate_endpoint_url("x", "http://api.example.com").unwrap_err();
        assert!(matches!(err, SecurityError::InvalidScheme { .. }));
    }

    #[test]
    fn test_internal_hosts_are_rejected() {
        for url in [
            "https://localhost:8080",
            "https://127.0.0.1",
            "https://10.0.0.5",
            "https://192.168.1.10",
            "https://169.254.169.254/latest/meta-data",
            "https://metadata.google.internal",
            "https://[::1]",
            "https://[fd12::1]",
            "https://100.64.0.1",
        ] {
            let err = validate_endpoint_url("x", url).unwrap_err();
            assert!(matches!(err, SecurityError::BlockedHost { .. }), "{}", url);
        }
    }

    #[test]
    fn test_garbage_is_invalid() {
        let err = validate_endpoint_url("x", "not a url").unwrap_err();
        assert!(matches!(err, SecurityError::InvalidUrl { .. }));
    }

    #[test]
    fn test_config_check_covers_webhook() {
        let mut config = ServerConfig::default();
        config.alerts.slack_webhook_url = Some("https://10.1.2.3/hook".to_string());
        assert!(validate_outbound_endpoints(&config).is_err());

        config.allow_insecure_endpoints = true;
        assert!(validate_outbound_endpoints(&config).is_ok());
    }
}
