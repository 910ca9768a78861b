//! Port-group catalog: the set of port groups a configuration may reference.

use std::path::Path;

use crate::error::Result;
use crate::model::PortGroup;

/// A named port group as seen by reference checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortGroupEntry {
    pub name: String,
    pub ports: Vec<String>,
}

pub trait PortGroupCatalog {
    fn port_groups(&self) -> Vec<PortGroupEntry>;

    fn has_port_group(&self, name: &str) -> bool {
        self.port_groups().iter().any(|group| group.name == name)
    }
}

impl PortGroupCatalog for Vec<PortGroupEntry> {
    fn port_groups(&self) -> Vec<PortGroupEntry> {
        self.clone()
    }

    fn has_port_group(&self, name: &str) -> bool {
        self.iter().any(|group| group.name == name)
    }
}

impl From<&PortGroup> for PortGroupEntry {
    fn from(group: &PortGroup) -> Self {
        Self {
            name: group.name().to_string(),
            ports: group.ports(),
        }
    }
}

/// Read `<config_path>/port-groups/` without loading the rest of the tree.
pub fn port_group_catalog(config_path: &Path) -> Result<Vec<PortGroupEntry>> {
    Ok(PortGroup::load_all(&config_path.join("port-groups"))?
        .iter()
        .map(PortGroupEntry::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{port_group_catalog, PortGroupCatalog};

    #[test]
    fn reads_port_groups_sorted_by_name() {
        let dir = tempdir().expect("tempdir");
        let groups = dir.path().join("port-groups");
        fs::create_dir_all(&groups).expect("mkdir");
        fs::write(groups.join("web.yaml"), "[80, 443]\n").expect("write");
        fs::write(groups.join("dns.yaml"), "description: DNS\nports: [53]\n").expect("write");

        let catalog = port_group_catalog(dir.path()).expect("catalog");
        let names = catalog.iter().map(|g| g.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["dns", "web"]);
        assert_eq!(catalog[1].ports, vec!["80", "443"]);
        assert!(catalog.has_port_group("web"));
        assert!(!catalog.has_port_group("ssh"));
    }

    #[test]
    fn missing_directory_is_an_empty_catalog() {
        let dir = tempdir().expect("tempdir");
        assert!(port_group_catalog(dir.path()).expect("catalog").is_empty());
    }
}
