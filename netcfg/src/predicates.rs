//! Attribute predicates used by entity schemas.
//!
//! Every predicate receives the raw YAML value. A missing attribute is passed
//! as `null`, so optional attributes are expressed by the schema (not declared)
//! rather than by the predicate.

use std::net::IpAddr;

use ipnet::IpNet;
use serde_yaml::Value;

use crate::attributes::scalar_text;
use crate::emit::{is_plain_address, is_plain_port};

pub const STATE_FLAGS: [&str; 4] = ["new", "invalid", "related", "established"];

/// Highest firewall or NAT rule number a device accepts.
pub const RULE_NUMBER_MAX: u32 = 9999;

const FIREWALL_ACTIONS: &[&str] = &["accept", "drop", "reject"];
const PROTOCOLS: &[&str] = &[
    "all", "tcp", "udp", "tcp_udp", "icmp", "icmpv6", "gre", "esp", "ah", "ipv6",
];
const NAT_TYPES: &[&str] = &["source", "destination", "masquerade"];

const ENDPOINT_KEYS: &[&str] = &["address", "port"];

pub fn any(_: &Value) -> bool {
    true
}

/// Non-empty scalar.
pub fn text(value: &Value) -> bool {
    scalar_text(value).is_some_and(|s| !s.trim().is_empty())
}

pub fn flag(value: &Value) -> bool {
    value.is_bool()
}

pub fn positive_int(value: &Value) -> bool {
    value
        .as_u64()
        .is_some_and(|n| n > 0 && n <= u64::from(u32::MAX))
}

pub fn rule_number(value: &Value) -> bool {
    value
        .as_u64()
        .is_some_and(|n| (1..=u64::from(RULE_NUMBER_MAX)).contains(&n))
}

pub fn firewall_action(value: &Value) -> bool {
    one_of(value, FIREWALL_ACTIONS)
}

pub fn protocol(value: &Value) -> bool {
    one_of(value, PROTOCOLS) || value.as_u64().is_some_and(|n| n <= 255)
}

pub fn nat_type(value: &Value) -> bool {
    one_of(value, NAT_TYPES)
}

pub fn ip_address(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.parse::<IpAddr>().is_ok())
}

pub fn cidr(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.parse::<IpNet>().is_ok())
}

/// Interface address: CIDR form or the literal `dhcp`.
pub fn interface_address(value: &Value) -> bool {
    cidr(value) || value.as_str() == Some("dhcp")
}

pub fn mac_address(value: &Value) -> bool {
    let Some(mac) = value.as_str() else {
        return false;
    };
    let parts = mac.split(':').collect::<Vec<_>>();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}

pub fn interface_name(value: &Value) -> bool {
    value.as_str().is_some_and(is_name)
}

pub fn mtu(value: &Value) -> bool {
    value.as_u64().is_some_and(|n| (68..=9000).contains(&n))
}

pub fn ip_list(value: &Value) -> bool {
    sequence_of(value, ip_address)
}

pub fn address_list(value: &Value) -> bool {
    sequence_of(value, |v| value_str(v).is_some_and(|s| is_plain_address(&s)))
}

/// Ports, port ranges or named services.
pub fn port_list(value: &Value) -> bool {
    sequence_of(value, |v| {
        value_str(v).is_some_and(|p| is_plain_port(&p) || is_name(&p))
    })
}

pub fn name_list(value: &Value) -> bool {
    sequence_of(value, |v| v.as_str().is_some_and(is_name))
}

/// `{address, port}` where each side is a plain value or a group name.
pub fn endpoint(value: &Value) -> bool {
    let Some(map) = value.as_mapping() else {
        return false;
    };
    map.iter().all(|(k, v)| {
        let Some(key) = k.as_str() else {
            return false;
        };
        ENDPOINT_KEYS.contains(&key) && value_str(v).is_some_and(|s| is_plain_port(&s) || is_token(&s))
    })
}

pub fn state(value: &Value) -> bool {
    let Some(map) = value.as_mapping() else {
        return false;
    };
    map.iter()
        .all(|(k, v)| k.as_str().is_some_and(|k| STATE_FLAGS.contains(&k)) && v.is_bool())
}

pub fn connections(value: &Value) -> bool {
    sequence_of(value, |entry| {
        let Some(map) = entry.as_mapping() else {
            return false;
        };
        map.iter().all(|(k, v)| match k.as_str() {
            Some("allow" | "log") => flag(v),
            Some("rule") => rule_number(v),
            Some("description") => text(v),
            Some("protocol") => protocol(v),
            Some("source" | "destination") => endpoint(v),
            Some("state") => state(v),
            _ => false,
        })
    })
}

/// Port, port-group name, or a single `{external: internal}` pair.
pub fn forward_ports(value: &Value) -> bool {
    sequence_of(value, |entry| match entry {
        Value::Mapping(map) => {
            map.len() == 1
                && map.iter().all(|(k, v)| {
                    value_str(k).is_some_and(|s| is_plain_port(&s))
                        && value_str(v).is_some_and(|s| is_plain_port(&s))
                })
        }
        other => value_str(other).is_some_and(|s| is_plain_port(&s) || is_name(&s)),
    })
}

pub fn hairpin_ports(value: &Value) -> bool {
    sequence_of(value, |entry| {
        let Some(map) = entry.as_mapping() else {
            return false;
        };
        let has_destination = entry
            .get("connection")
            .and_then(|c| c.get("destination"))
            .is_some_and(endpoint);
        has_destination
            && map.iter().all(|(k, v)| match k.as_str() {
                Some("connection") => v
                    .as_mapping()
                    .is_some_and(|c| c.iter().all(|(k, _)| k.as_str() == Some("destination"))),
                Some("description") => text(v),
                Some("interface") => interface_name(v),
                Some("rule") => rule_number(v),
                _ => false,
            })
    })
}

fn one_of(value: &Value, allowed: &[&str]) -> bool {
    value.as_str().is_some_and(|s| allowed.contains(&s))
}

fn sequence_of(value: &Value, item: impl Fn(&Value) -> bool) -> bool {
    value
        .as_sequence()
        .is_some_and(|items| items.iter().all(item))
}

fn value_str(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) => scalar_text(value),
        _ => None,
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).expect("yaml")
    }

    #[test]
    fn mac_address_requires_six_hex_pairs() {
        assert!(mac_address(&yaml("'00:11:22:aa:BB:cc'")));
        assert!(!mac_address(&yaml("'00:11:22:aa:BB'")));
        assert!(!mac_address(&yaml("'00:11:22:aa:BB:zz'")));
    }

    #[test]
    fn connections_accept_known_keys_only() {
        assert!(connections(&yaml(
            "- {allow: true, rule: 20, source: {address: 10.0.0.5}, destination: {port: 22}}"
        )));
        assert!(!connections(&yaml("- {allow: yes-please}")));
        assert!(!connections(&yaml("- {allow: true, colour: red}")));
    }

    #[test]
    fn forward_ports_accept_ports_groups_and_pairs() {
        assert!(forward_ports(&yaml("[80, '443', web-ports, {8022: 22}]")));
        assert!(!forward_ports(&yaml("[{8022: 22, 8023: 23}]")));
    }

    #[test]
    fn hairpin_ports_require_destination() {
        assert!(hairpin_ports(&yaml(
            "- {connection: {destination: {address: external-addresses, port: 443}}, interface: eth1}"
        )));
        assert!(!hairpin_ports(&yaml("- {description: missing}")));
    }

    #[test]
    fn protocol_accepts_names_and_numbers() {
        assert!(protocol(&yaml("tcp_udp")));
        assert!(protocol(&yaml("47")));
        assert!(!protocol(&yaml("smtp")));
    }
}
