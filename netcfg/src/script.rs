//! Shell scripts that apply one batch of commands on the device.
//!
//! Each script opens a configuration session, runs every command through a
//! `run` helper and commits. `run` captures the command's output; on failure
//! it prints the command and that output to stderr, optionally discards the
//! pending changes, ends the session and exits non-zero.

use command_diff_core::quote;

use crate::deploy::DeployConfig;

/// Render the script for one batch.
pub fn render_script(batch: &[String], config: &DeployConfig) -> String {
    let wrapper = quote(&config.wrapper);
    let mut out = Vec::new();
    out.push(format!("#!{}", config.shell));
    out.push(format!("WRAPPER={wrapper}"));
    out.push(String::new());
    out.push("run() {".to_string());
    out.push("    output=$(\"$WRAPPER\" \"$@\" 2>&1)".to_string());
    out.push("    status=$?".to_string());
    out.push("    if [ $status -ne 0 ]; then".to_string());
    out.push("        echo \"command failed: $*\" >&2".to_string());
    out.push("        echo \"$output\" >&2".to_string());
    if config.rollback {
        out.push("        \"$WRAPPER\" discard >/dev/null 2>&1".to_string());
    }
    out.push("        \"$WRAPPER\" end >/dev/null 2>&1".to_string());
    out.push("        exit $status".to_string());
    out.push("    fi".to_string());
    out.push("}".to_string());
    out.push(String::new());
    out.push("run begin".to_string());
    for command in batch {
        out.push(format!("run {command}"));
    }
    match config.commit_confirm {
        Some(minutes) => out.push(format!("run commit-confirm {minutes}")),
        None => out.push("run commit".to_string()),
    }
    if config.save {
        out.push("run save".to_string());
    }
    out.push("run end".to_string());
    out.push(String::new());
    out.join("\n")
}

/// File name for batch `index`.
pub fn script_name(index: usize) -> String {
    format!("batch-{index:03}.sh")
}
