//! Flat command snapshots kept between runs.
//!
//! A snapshot file holds one command per line. Blank lines and lines starting
//! with `#` are ignored when reading.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::model::RootNode;

pub const SNAPSHOT_FILE: &str = "commands.snapshot";

pub fn parse_snapshot(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_snapshot(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    Ok(parse_snapshot(&text))
}

pub fn write_snapshot(path: &Path, commands: &[String]) -> Result<()> {
    let mut text = commands.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    fs::write(path, text).map_err(|e| ConfigError::io(path, e))
}

/// Previous flat commands from a configuration directory or a snapshot file.
pub fn load_previous(path: &Path) -> Result<Vec<String>> {
    if path.is_dir() {
        debug!(path = %path.display(), "loading previous configuration tree");
        return Ok(RootNode::load(path)?.commands().flat);
    }
    debug!(path = %path.display(), "loading previous snapshot");
    load_snapshot(path)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::{load_previous, parse_snapshot, write_snapshot};

    #[test]
    fn skips_blank_and_comment_lines() {
        let text = "# taken 2024-05-01\nfirewall name lan-in default-action drop\n\n  system host-name r1  \n";
        assert_eq!(
            parse_snapshot(text),
            vec!["firewall name lan-in default-action drop", "system host-name r1"]
        );
    }

    #[test]
    fn written_snapshot_reads_back() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("commands.snapshot");
        let commands = vec![
            "system host-name r1".to_string(),
            "firewall name lan-in description 'LAN inbound'".to_string(),
        ];
        write_snapshot(&path, &commands).expect("write");
        assert_eq!(load_previous(&path).expect("load"), commands);
    }
}
