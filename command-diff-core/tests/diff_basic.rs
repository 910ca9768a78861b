use std::collections::BTreeMap;

use command_diff_core::{
    diff_configurations, format_json, format_summary, format_text, keyed, CommandError,
};
use pretty_assertions::assert_eq;

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn current() -> Vec<&'static str> {
    vec![
        "command 1",
        "firewall 2",
        r#"description "d""#,
        "some stuff",
        "foo bar",
    ]
}

fn previous() -> Vec<&'static str> {
    vec![
        "some thing",
        r#"description "d""#,
        "foo baz",
        "firewall 2",
        "obsolete interface",
    ]
}

#[test]
fn diff_classifies_added_removed_changed_preserved() {
    let diff = diff_configurations(&current(), &previous()).expect("diff");

    assert_eq!(diff.added, map(&[("command", "1")]));
    assert_eq!(diff.removed, map(&[("obsolete", "interface")]));
    assert_eq!(diff.changed, map(&[("some", "stuff"), ("foo", "bar")]));
    assert_eq!(diff.preserved, map(&[("description", "d"), ("firewall", "2")]));
}

#[test]
fn diff_against_itself_preserves_everything() {
    let commands = vec![
        "firewall name lan-in default-action drop",
        "firewall name lan-in description 'LAN inbound'",
        "firewall name lan-in rule 10 action accept",
        "service nat rule 10 type destination",
    ];
    let diff = diff_configurations(&commands, &commands).expect("diff");

    assert!(diff.added.is_empty());
    assert!(diff.removed.is_empty());
    assert!(diff.changed.is_empty());
    assert_eq!(diff.preserved, keyed(&commands).expect("keyed"));
}

#[test]
fn formatters_render_every_class() {
    let diff = diff_configurations(&current(), &previous()).expect("diff");

    let text = format_text(&diff, false);
    assert!(text.contains("+ command 1"));
    assert!(text.contains("- obsolete interface"));
    assert!(text.contains("~ foo bar"));
    assert!(!text.contains("= firewall 2"));
    assert!(format_text(&diff, true).contains("= firewall 2"));

    assert_eq!(
        format_summary(&diff),
        "added=1 removed=1 changed=2 preserved=2"
    );
    assert!(format_json(&diff).contains("\"preserved\""));
}

#[test]
fn command_without_value_is_rejected() {
    let err = diff_configurations(&["ok 1", ""], &["ok 1"]).expect_err("empty command");
    assert!(matches!(err, CommandError::MissingValue { .. }));
}
