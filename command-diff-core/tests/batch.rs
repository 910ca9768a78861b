use command_diff_core::{commands_to_run, format_batches, CommandSet};
use pretty_assertions::assert_eq;

fn current() -> CommandSet {
    vec![
        vec!["firewall 2".to_string(), r#"description "d""#.to_string()],
        vec!["command 1".to_string(), "some stuff".to_string()],
        vec!["foo bar".to_string()],
    ]
    .into_iter()
    .collect()
}

fn previous() -> Vec<String> {
    [
        "some thing",
        r#"description "d""#,
        "foo baz",
        "firewall 2",
        "obsolete interface",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

#[test]
fn removals_come_first_and_everything_else_is_set() {
    let batches = commands_to_run(&current(), &previous(), false).expect("batches");

    assert_eq!(
        batches,
        vec![
            vec!["delete obsolete interface".to_string()],
            vec![
                "set firewall 2".to_string(),
                r#"set description "d""#.to_string()
            ],
            vec!["set command 1".to_string(), "set some stuff".to_string()],
            vec!["set foo bar".to_string()],
        ]
    );
}

#[test]
fn difference_only_drops_batches_left_empty() {
    let batches = commands_to_run(&current(), &previous(), true).expect("batches");

    assert_eq!(
        batches,
        vec![
            vec!["delete obsolete interface".to_string()],
            vec!["set command 1".to_string(), "set some stuff".to_string()],
            vec!["set foo bar".to_string()],
        ]
    );
}

#[test]
fn difference_only_is_idempotent() {
    let first = commands_to_run(&current(), &previous(), true).expect("first");
    let second = commands_to_run(&current(), &previous(), true).expect("second");
    assert_eq!(first, second);

    let unchanged = commands_to_run(&current(), &current().flat, true).expect("unchanged");
    assert_eq!(unchanged, vec![Vec::<String>::new()]);
}

#[test]
fn removal_batch_is_always_first() {
    let current: CommandSet = vec![vec!["system host-name r2".to_string()]]
        .into_iter()
        .collect();
    let previous = vec!["system host-name r1".to_string()];
    let batches = commands_to_run(&current, &previous, true).expect("batches");
    assert_eq!(
        batches,
        vec![Vec::new(), vec!["set system host-name r2".to_string()]]
    );
}

#[test]
fn deletions_keep_quoted_key_words() {
    let previous = vec!["firewall group port-group 'web ports' port 443".to_string()];
    let batches = commands_to_run(&CommandSet::new(), &previous, false).expect("batches");
    assert_eq!(
        batches,
        vec![vec![
            "delete firewall group port-group 'web ports' port 443".to_string()
        ]]
    );
}

#[test]
fn deletions_requote_multi_word_values() {
    let previous = vec!["firewall name lan-in description 'LAN inbound'".to_string()];
    let batches = commands_to_run(&CommandSet::new(), &previous, false).expect("batches");
    assert_eq!(
        batches,
        vec![vec![
            "delete firewall name lan-in description 'LAN inbound'".to_string()
        ]]
    );
    assert!(format_batches(&batches).starts_with("# batch 0\n"));
}
