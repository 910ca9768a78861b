//! Duplicate detection over flat value collections.

use std::collections::BTreeMap;

use crate::model::{ExternalAddresses, PortGroup};
use crate::verify_networks::VerifyFinding;

/// Values that occur more than once, sorted and reported once each.
pub fn duplicates<T, I>(items: I) -> Vec<T>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_insert(0usize) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(item, _)| item)
        .collect()
}

pub fn external_address_findings(external: &ExternalAddresses) -> Vec<VerifyFinding> {
    duplicates(external.addresses())
        .into_iter()
        .map(|address| {
            VerifyFinding::error(
                "duplicate_external_address",
                format!("ExternalAddresses: address {address} is listed more than once"),
            )
        })
        .collect()
}

pub fn port_group_findings(groups: &[PortGroup]) -> Vec<VerifyFinding> {
    let mut out = Vec::new();
    for group in groups {
        for port in duplicates(group.ports()) {
            out.push(VerifyFinding::error(
                "duplicate_port",
                format!("{group}: port {port} is listed more than once"),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{duplicates, port_group_findings};
    use crate::model::PortGroup;

    #[test]
    fn reports_each_duplicate_once_in_sorted_order() {
        let found = duplicates(["a", "bc", "ab", "ab", "cd", "ab", "a"]);
        assert_eq!(found, vec!["a", "ab"]);
    }

    #[test]
    fn no_duplicates_is_empty() {
        assert!(duplicates([1, 2, 3]).is_empty());
    }

    #[test]
    fn flags_repeated_ports() {
        let attrs = serde_yaml::from_str("ports: [80, 443, 80]").expect("yaml");
        let findings = port_group_findings(&[PortGroup::new("web", attrs)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "PortGroup web: port 80 is listed more than once");
    }
}
