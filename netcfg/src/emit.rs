//! Command emission helpers shared by all entities.
//!
//! ## Address and port values
//!
//! A value that parses as an IP address, a CIDR block or an address range is
//! emitted as a plain `address` command; anything else is taken to be an
//! address-group name. Ports work the same way: numbers, ranges and
//! comma-separated lists of those are plain, anything else names a port
//! group.

use std::net::IpAddr;

use command_diff_core::{quote, quote_description};
use ipnet::IpNet;
use serde_yaml::Value;

use crate::attributes::field_text;

/// True for an IP address, a CIDR block, or an `a-b` address range.
pub fn is_plain_address(value: &str) -> bool {
    let value = value.strip_prefix('!').unwrap_or(value);
    if value.parse::<IpAddr>().is_ok() || value.parse::<IpNet>().is_ok() {
        return true;
    }
    match value.split_once('-') {
        Some((start, end)) => start.parse::<IpAddr>().is_ok() && end.parse::<IpAddr>().is_ok(),
        None => false,
    }
}

/// True for a port number, a `a-b` range, or a comma list of those.
pub fn is_plain_port(value: &str) -> bool {
    !value.is_empty()
        && value.split(',').all(|part| match part.split_once('-') {
            Some((start, end)) => is_port_number(start) && is_port_number(end),
            None => is_port_number(part),
        })
}

fn is_port_number(value: &str) -> bool {
    value.parse::<u16>().is_ok_and(|p| p > 0)
}

/// Command path from `words`, each emitted as a shell-safe token.
pub fn path(words: &[&str]) -> String {
    words
        .iter()
        .map(|word| quote(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<prefix> description <quoted>` for a description attribute.
pub fn description(prefix: &str, text: &str) -> String {
    format!("{prefix} description {}", quote_description(text))
}

/// `<prefix> <name> <value>` with the value emitted as a shell-safe token.
pub fn scalar(prefix: &str, name: &str, value: &str) -> String {
    format!("{prefix} {name} {}", quote(value))
}

pub fn enable(flag: bool) -> &'static str {
    if flag {
        "enable"
    } else {
        "disable"
    }
}

/// Commands for one side (`source`, `destination`, `inside-address`) of a rule.
pub fn endpoint(prefix: &str, side: &str, value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(address) = field_text(value, "address") {
        if is_plain_address(&address) {
            out.push(format!("{prefix} {side} address {}", quote(&address)));
        } else {
            out.push(format!(
                "{prefix} {side} group address-group {}",
                quote(&address)
            ));
        }
    }
    if let Some(port) = field_text(value, "port") {
        if is_plain_port(&port) {
            out.push(format!("{prefix} {side} port {}", quote(&port)));
        } else {
            out.push(format!("{prefix} {side} group port-group {}", quote(&port)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{endpoint, is_plain_address, is_plain_port};

    #[test]
    fn recognises_plain_addresses() {
        assert!(is_plain_address("10.0.0.1"));
        assert!(is_plain_address("10.0.0.0/24"));
        assert!(is_plain_address("10.0.0.10-10.0.0.20"));
        assert!(is_plain_address("!192.168.1.0/24"));
        assert!(is_plain_address("fd00::1"));
        assert!(!is_plain_address("external-addresses"));
    }

    #[test]
    fn recognises_plain_ports() {
        assert!(is_plain_port("22"));
        assert!(is_plain_port("8000-8080"));
        assert!(is_plain_port("80,443,8000-8010"));
        assert!(!is_plain_port("web-ports"));
        assert!(!is_plain_port("0"));
        assert!(!is_plain_port(""));
    }

    #[test]
    fn endpoint_uses_groups_for_names() {
        let value = serde_yaml::from_str("{address: media-hosts, port: 8080}").expect("yaml");
        assert_eq!(
            endpoint("firewall name lan-in rule 10", "destination", &value),
            vec![
                "firewall name lan-in rule 10 destination group address-group media-hosts",
                "firewall name lan-in rule 10 destination port 8080",
            ]
        );
    }
}
