use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use netcfg::catalog::port_group_catalog;
use netcfg::deploy::{load_deploy_config, DeployConfig};
use netcfg::model::RootNode;
use netcfg::report::render_batches;
use netcfg::script::{render_script, script_name};
use netcfg::snapshot::{load_previous, write_snapshot, SNAPSHOT_FILE};
use tracing::{info, warn};

use crate::cli::PlanArgs;

pub fn run_plan(args: PlanArgs) -> Result<()> {
    let mut root = RootNode::load(&args.current)
        .with_context(|| format!("failed to load {}", args.current.display()))?;
    let catalog = port_group_catalog(&args.current)
        .with_context(|| format!("failed to read port groups of {}", args.current.display()))?;
    if !root.validate_with(&catalog) {
        for error in root.errors() {
            eprintln!("{error}");
        }
        bail!("refusing to plan an invalid configuration");
    }

    let deploy = match &args.deploy_config {
        Some(path) => load_deploy_config(path)
            .with_context(|| format!("failed to load deploy config {}", path.display()))?,
        None => DeployConfig::default(),
    };
    let difference_only = args.difference_only || deploy.apply_difference_only;

    let previous = match &args.previous {
        Some(path) => load_previous(path)
            .with_context(|| format!("failed to load previous {}", path.display()))?,
        None => Vec::new(),
    };
    let batches = root
        .commands_to_run(&previous, difference_only)
        .context("failed to sequence batches")?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    remove_stale_scripts(&args.output)?;
    for (idx, batch) in batches.iter().enumerate() {
        if batch.is_empty() {
            continue;
        }
        let path = args.output.join(script_name(idx));
        fs::write(&path, render_script(batch, &deploy))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    let snapshot = args.output.join(SNAPSHOT_FILE);
    write_snapshot(&snapshot, &root.commands().flat)
        .with_context(|| format!("failed to write {}", snapshot.display()))?;

    let written = batches.iter().filter(|b| !b.is_empty()).count();
    let commands = batches.iter().map(Vec::len).sum::<usize>();
    info!(batches = written, commands, difference_only, "planned deployment");
    if written == 0 {
        warn!("no changes to apply");
    }
    if args.print {
        println!("{}", render_batches(&batches));
    }
    println!(
        "plan batches={} commands={} output={}",
        written,
        commands,
        args.output.display()
    );
    Ok(())
}

fn remove_stale_scripts(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        let is_script = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("batch-") && n.ends_with(".sh"));
        if is_script {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}
