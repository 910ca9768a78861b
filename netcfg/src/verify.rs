use serde::Serialize;

use crate::catalog::PortGroupCatalog;
use crate::model::RootNode;
use crate::verify_dupes::{external_address_findings, port_group_findings};
use crate::verify_networks::{network_findings, FindingSeverity, VerifyFinding};
use crate::verify_refs::{external_group_findings, port_group_reference_findings};
use crate::verify_rules::{host_rule_findings, nat_rule_findings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifySeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyIssue {
    pub severity: VerifySeverity,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub config: String,
    pub networks: usize,
    pub errors: usize,
    pub warnings: usize,
    pub issues: Vec<VerifyIssue>,
}

/// Every cross-entity check over a loaded tree. No check stops another.
pub fn consistency_findings(root: &RootNode, catalog: &dyn PortGroupCatalog) -> Vec<VerifyFinding> {
    let mut out = network_findings(root.networks());
    out.extend(external_address_findings(root.external()));
    out.extend(port_group_findings(root.port_groups()));
    for network in root.networks() {
        out.extend(host_rule_findings(network));
        out.extend(port_group_reference_findings(network, catalog));
    }
    out.extend(nat_rule_findings(root.nat()));
    out.extend(external_group_findings(root.networks(), root.external()));
    out
}

/// Validate `root` against its own port groups and summarize the outcome.
pub fn build_verify_report(root: &mut RootNode) -> VerifyReport {
    root.validate();
    report_from(root)
}

pub fn build_verify_report_with_catalog(
    root: &mut RootNode,
    catalog: &dyn PortGroupCatalog,
) -> VerifyReport {
    root.validate_with(catalog);
    report_from(root)
}

fn report_from(root: &RootNode) -> VerifyReport {
    let mut issues = root
        .structural_errors()
        .into_iter()
        .map(|message| VerifyIssue {
            severity: VerifySeverity::Error,
            code: "invalid_attribute".to_string(),
            message,
        })
        .collect::<Vec<_>>();
    issues.extend(root.findings().iter().cloned().map(map_finding));

    let errors = issues
        .iter()
        .filter(|i| i.severity == VerifySeverity::Error)
        .count();
    let warnings = issues.len() - errors;

    VerifyReport {
        config: root.path().display().to_string(),
        networks: root.networks().len(),
        errors,
        warnings,
        issues,
    }
}

pub fn render_verify_text(report: &VerifyReport) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "verify config={} networks={}",
        report.config, report.networks
    ));
    out.push(format!(
        "result errors={} warnings={}",
        report.errors, report.warnings
    ));
    out.push("issues".to_string());
    if report.issues.is_empty() {
        out.push("- none".to_string());
        return out.join("\n");
    }
    for issue in &report.issues {
        let sev = match issue.severity {
            VerifySeverity::Error => "error",
            VerifySeverity::Warning => "warning",
        };
        out.push(format!("- [{sev}] {}: {}", issue.code, issue.message));
    }
    out.join("\n")
}

fn map_finding(finding: VerifyFinding) -> VerifyIssue {
    VerifyIssue {
        severity: match finding.severity {
            FindingSeverity::Error => VerifySeverity::Error,
            FindingSeverity::Warning => VerifySeverity::Warning,
        },
        code: finding.code,
        message: finding.message,
    }
}

#[cfg(test)]
mod tests {
    use super::{render_verify_text, VerifyIssue, VerifyReport, VerifySeverity};

    #[test]
    fn renders_clean_report() {
        let report = VerifyReport {
            config: "site".to_string(),
            networks: 2,
            errors: 0,
            warnings: 0,
            issues: Vec::new(),
        };
        assert_eq!(
            render_verify_text(&report),
            "verify config=site networks=2\nresult errors=0 warnings=0\nissues\n- none"
        );
    }

    #[test]
    fn renders_issue_lines() {
        let report = VerifyReport {
            config: "site".to_string(),
            networks: 1,
            errors: 1,
            warnings: 0,
            issues: vec![VerifyIssue {
                severity: VerifySeverity::Error,
                code: "duplicate_mac".to_string(),
                message: "Network lan: MAC aa:bb:cc:dd:ee:ff is used by more than one host".to_string(),
            }],
        };
        let text = render_verify_text(&report);
        assert!(text.ends_with(
            "- [error] duplicate_mac: Network lan: MAC aa:bb:cc:dd:ee:ff is used by more than one host"
        ));
    }
}
