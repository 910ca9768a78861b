use std::path::{Path, PathBuf};

use command_diff_core::CommandSet;
use tracing::{debug, info};

use super::external::ExternalAddresses;
use super::global::GlobalSettings;
use super::nat::Nat;
use super::network::Network;
use super::port_group::PortGroup;
use crate::attributes::Attributes;
use crate::catalog::{PortGroupCatalog, PortGroupEntry};
use crate::error::Result;
use crate::loader::{list_configured_subdirectories, load_attributes};
use crate::verify::consistency_findings;
use crate::verify_networks::{FindingSeverity, VerifyFinding};

/// A whole device configuration loaded from one directory.
#[derive(Debug, Clone)]
pub struct RootNode {
    path: PathBuf,
    global: GlobalSettings,
    external: ExternalAddresses,
    port_groups: Vec<PortGroup>,
    nat: Nat,
    networks: Vec<Network>,
    findings: Vec<VerifyFinding>,
}

impl RootNode {
    /// Build the tree under `path`, synthesizing host policy as networks load.
    pub fn load(path: &Path) -> Result<Self> {
        let global_path = path.join("global.yaml");
        let global = if global_path.is_file() {
            load_attributes(&global_path)?
        } else {
            Attributes::new()
        };
        let mut root = Self {
            path: path.to_path_buf(),
            global: GlobalSettings::new(global),
            external: ExternalAddresses::load(&path.join("external-addresses.yaml"))?,
            port_groups: PortGroup::load_all(&path.join("port-groups"))?,
            nat: Nat::load(&path.join("nat"))?,
            networks: Vec::new(),
            findings: Vec::new(),
        };
        root.port_groups.sort_by(|a, b| a.name().cmp(b.name()));
        for dir in list_configured_subdirectories(&[path.join("networks")])? {
            let network = Network::load(&dir, &mut root.nat)?;
            root.networks.push(network);
        }
        debug!(
            path = %path.display(),
            networks = root.networks.len(),
            port_groups = root.port_groups.len(),
            nat_rules = root.nat.rules().len(),
            "loaded configuration"
        );
        Ok(root)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn global(&self) -> &GlobalSettings {
        &self.global
    }

    pub fn external(&self) -> &ExternalAddresses {
        &self.external
    }

    pub fn port_groups(&self) -> &[PortGroup] {
        &self.port_groups
    }

    pub fn nat(&self) -> &Nat {
        &self.nat
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Structural validation of every entity, then the consistency checks
    /// against this tree's own port groups.
    pub fn validate(&mut self) -> bool {
        let catalog = <Self as PortGroupCatalog>::port_groups(self);
        self.validate_with(&catalog)
    }

    /// Same as [`validate`](Self::validate) with an external port-group catalog.
    pub fn validate_with(&mut self, catalog: &dyn PortGroupCatalog) -> bool {
        let mut valid = self.global.validate();
        valid &= self.external.validate();
        for group in &mut self.port_groups {
            valid &= group.validate();
        }
        valid &= self.nat.validate();
        for network in &mut self.networks {
            valid &= network.validate();
        }

        let findings = consistency_findings(self, catalog);
        self.findings = findings;
        let consistent = !self
            .findings
            .iter()
            .any(|f| f.severity == FindingSeverity::Error);
        info!(
            structural = valid,
            consistent,
            findings = self.findings.len(),
            "validated configuration"
        );
        valid && consistent
    }

    /// Errors accumulated by every entity's attribute validation.
    pub fn structural_errors(&self) -> Vec<String> {
        let mut out = self.global.errors().to_vec();
        out.extend(self.external.errors().iter().cloned());
        for group in &self.port_groups {
            out.extend(group.errors().iter().cloned());
        }
        out.extend(self.nat.errors());
        for network in &self.networks {
            out.extend(network.errors());
        }
        out
    }

    /// Consistency findings from the last validation.
    pub fn findings(&self) -> &[VerifyFinding] {
        &self.findings
    }

    /// Structural errors followed by consistency errors.
    pub fn errors(&self) -> Vec<String> {
        let mut out = self.structural_errors();
        out.extend(
            self.findings
                .iter()
                .filter(|f| f.severity == FindingSeverity::Error)
                .map(|f| f.message.clone()),
        );
        out
    }

    /// External addresses and port groups, global settings, NAT, then each
    /// network's groups.
    pub fn commands(&self) -> CommandSet {
        let mut groups = self.external.commands();
        for group in &self.port_groups {
            groups.extend(group.commands());
        }
        let mut set = CommandSet::new();
        set.push_group(groups);
        set.push_group(self.global.commands());
        set.push_group(self.nat.commands());
        for network in &self.networks {
            set.append(network.commands());
        }
        set
    }

    /// Batches that bring a device from `previous` to this tree.
    pub fn commands_to_run<P: AsRef<str>>(
        &self,
        previous: &[P],
        apply_difference_only: bool,
    ) -> Result<Vec<Vec<String>>> {
        Ok(command_diff_core::commands_to_run(
            &self.commands(),
            previous,
            apply_difference_only,
        )?)
    }
}

impl PortGroupCatalog for RootNode {
    fn port_groups(&self) -> Vec<PortGroupEntry> {
        self.port_groups.iter().map(PortGroupEntry::from).collect()
    }
}
