use anyhow::{bail, Context, Result};
use netcfg::catalog::port_group_catalog;
use netcfg::model::RootNode;
use netcfg::verify::{build_verify_report_with_catalog, render_verify_text};

use crate::cli::{OutputFormat, ValidateArgs};

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let mut root = RootNode::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let catalog = port_group_catalog(&args.config)
        .with_context(|| format!("failed to read port groups of {}", args.config.display()))?;
    let report = build_verify_report_with_catalog(&mut root, &catalog);

    match args.format {
        OutputFormat::Text => println!("{}", render_verify_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.errors > 0 {
        bail!("validation failed: {} errors", report.errors);
    }
    if args.strict && report.warnings > 0 {
        bail!("validation failed in strict mode: {} warnings", report.warnings);
    }
    Ok(())
}
