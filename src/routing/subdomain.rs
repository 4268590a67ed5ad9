//! Subdomain extraction from the request host.
//!
//! # Responsibilities
//! - Normalize the host (strip port)
//! - Pick the leftmost label when the host has more labels than the base domain
//!
//! # Design Decisions
//! - The base domain is the last `offset` labels (2 by default)
//! - IP literals never carry a subdomain
//! - No lowercasing: route names are matched case-sensitively

use std::net::IpAddr;

/// Strip the port from a host/authority string.
///
/// Bracketed IPv6 literals keep their brackets.
pub fn hostname(host: &str) -> &str {
    let host = host.trim();
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Return the candidate route name carried by `host`, if any.
///
/// `offset` is the number of trailing labels forming the base domain.
pub fn extract_subdomain(host: &str, offset: usize) -> Option<&str> {
    let name = hostname(host);
    if name.is_empty() || name.starts_with('[') || name.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() <= offset {
        return None;
    }

    labels.first().copied().filter(|label| !label.is_empty())
}
