use anyhow::{Context, Result};
use clap::Parser;
use command_diff_core::{diff_configurations, format_json};
use netcfg::model::RootNode;
use netcfg::report::{render_difference, render_summary};
use netcfg::snapshot::load_previous;
use tracing_subscriber::EnvFilter;

mod cli;
mod plan_cmd;
mod validate_cmd;

use cli::{Cli, Command, CommandsArgs, DiffArgs, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Validate(args) => validate_cmd::run_validate(args),
        Command::Commands(args) => run_commands(args),
        Command::Diff(args) => run_diff(args),
        Command::Plan(args) => plan_cmd::run_plan(args),
    }
}

fn run_commands(args: CommandsArgs) -> Result<()> {
    let root = RootNode::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let set = root.commands();

    if !args.grouped {
        for line in &set.flat {
            println!("{line}");
        }
        return Ok(());
    }
    for (idx, group) in set.groups.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        println!("# group {idx}");
        for line in group {
            println!("{line}");
        }
    }
    Ok(())
}

fn run_diff(args: DiffArgs) -> Result<()> {
    let current = RootNode::load(&args.current)
        .with_context(|| format!("failed to load {}", args.current.display()))?;
    let previous = load_previous(&args.previous)
        .with_context(|| format!("failed to load {}", args.previous.display()))?;
    let difference = diff_configurations(&current.commands().flat, &previous)
        .context("failed to compare commands")?;

    if args.summary {
        println!("{}", render_summary(&difference));
        return Ok(());
    }

    match args.format {
        OutputFormat::Text => {
            let text = render_difference(&difference, args.verbose);
            if !text.is_empty() {
                println!("{text}");
            }
            println!("{}", render_summary(&difference));
        }
        OutputFormat::Json => println!("{}", format_json(&difference)),
    }
    Ok(())
}
