use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use super::{ChangeCategory, TransformEngine, TransformResult};

fn apply(line: &str) -> TransformResult {
    TransformEngine::new().apply(line)
}

fn assert_idempotent(line: &str) {
    let engine = TransformEngine::new();
    let first = engine.apply(line);
    let second = engine.apply(&first.transformed_line);
    assert!(
        !second.changed,
        "second pass should be a no-op for '{line}', got {:?}",
        second.changes
    );
    assert_eq!(second.transformed_line, first.transformed_line);
}

#[test]
fn output_type_csv_becomes_json() {
    let result = apply("usacloud server list --output-type=csv");

    assert!(result.changed);
    assert_eq!(result.transformed_line, "usacloud server list --output-type=json");
    assert_eq!(result.changes.len(), 1);
    let change = &result.changes[0];
    assert_eq!(change.category, ChangeCategory::OutputFormat);
    assert_eq!(change.before, "--output-type=csv");
    assert_eq!(change.after, "--output-type=json");
    assert_eq!(
        &result.original_line[change.span_start..change.span_end],
        "--output-type=csv"
    );
}

#[test]
fn output_type_rewrite_is_idempotent() {
    let first = apply("usacloud server list --output-type=csv");
    let second = apply(&first.transformed_line);
    assert!(!second.changed);
    assert!(second.changes.is_empty());
}

#[test]
fn output_type_spaced_and_short_forms_keep_their_shape() {
    assert_eq!(
        apply("usacloud disk list --output-type TSV").transformed_line,
        "usacloud disk list --output-type json"
    );
    assert_eq!(
        apply("usacloud disk list -o csv -q").transformed_line,
        "usacloud disk list -o json -q"
    );
}

#[test]
fn selector_name_becomes_positional_argument() {
    let result = apply("usacloud disk read --selector name=mydisk");

    assert_eq!(result.transformed_line, "usacloud disk read mydisk");
    assert_eq!(result.changes.len(), 1);
    assert_eq!(
        result.changes[0].category,
        ChangeCategory::SelectorMigration
    );
    assert_eq!(result.changes[0].before, "--selector name=mydisk");
    assert_eq!(result.changes[0].after, "mydisk");
}

#[test]
fn selector_id_tag_and_bare_values_all_migrate() {
    assert_eq!(
        apply("usacloud server boot --selector id=1234567890").transformed_line,
        "usacloud server boot 1234567890"
    );
    assert_eq!(
        apply("usacloud server shutdown --selector=tag=web --selector db").transformed_line,
        "usacloud server shutdown web db"
    );
}

#[test]
fn summary_is_replaced_by_a_terminal_comment() {
    let result = apply("usacloud summary");

    assert!(result.changed);
    assert!(result.transformed_line.starts_with("# usacloud-update:"));
    assert!(result.transformed_line.ends_with(": usacloud summary"));
    assert_eq!(result.changes.len(), 1);
    let change = &result.changes[0];
    assert_eq!(change.category, ChangeCategory::DeprecatedCommand);
    assert_eq!(change.rule_name, "unsupported-command");
    assert_eq!((change.span_start, change.span_end), (0, result.original_line.len()));
}

#[test]
fn terminal_comment_keeps_indentation() {
    let result = apply("    usacloud object-storage list");
    assert!(result.transformed_line.starts_with("    # usacloud-update:"));
}

#[test]
fn terminal_rule_runs_after_in_place_normalization() {
    // Deprecation is judged on the canonical line, and the in-place fixes stay on record.
    let result = apply("usacloud --zone IS1A summary --output-type=csv");

    let categories = result
        .changes
        .iter()
        .map(|change| change.category)
        .collect::<Vec<_>>();
    assert_eq!(
        categories,
        vec![
            ChangeCategory::OutputFormat,
            ChangeCategory::ZoneNormalize,
            ChangeCategory::DeprecatedCommand,
        ]
    );
    assert!(result.transformed_line.starts_with('#'));
    assert!(
        result
            .transformed_line
            .ends_with("usacloud --zone IS1A summary --output-type=csv")
    );
}

#[test]
fn in_place_rules_accumulate_on_one_line() {
    let result = apply("usacloud product-disk list --zone = TK1A --output-type=tsv");

    assert_eq!(
        result.transformed_line,
        "usacloud disk-plan list --zone=tk1a --output-type=json"
    );
    let categories = result
        .changes
        .iter()
        .map(|change| change.category)
        .collect::<Vec<_>>();
    assert_eq!(
        categories,
        vec![
            ChangeCategory::OutputFormat,
            ChangeCategory::ZoneNormalize,
            ChangeCategory::ProductAlias,
        ]
    );
}

#[test]
fn spans_point_into_the_original_line_after_length_changes() {
    let line = "usacloud iso-image read --selector name=ubuntu --zone IS1B";
    let result = apply(line);

    assert_eq!(result.transformed_line, "usacloud cdrom read ubuntu --zone=is1b");
    for change in &result.changes {
        assert!(change.span_start <= change.span_end);
        assert!(change.span_end <= line.len());
    }
    let zone = result
        .changes
        .iter()
        .find(|change| change.category == ChangeCategory::ZoneNormalize)
        .expect("zone change should be recorded");
    assert_eq!(&line[zone.span_start..zone.span_end], "--zone IS1B");
    let rename = result
        .changes
        .iter()
        .find(|change| change.category == ChangeCategory::ResourceRename)
        .expect("rename change should be recorded");
    assert_eq!(&line[rename.span_start..rename.span_end], "iso-image");
}

#[test]
fn every_invocation_in_a_pipeline_is_rewritten() {
    let result = apply(
        "usacloud server list --output-type=csv | tee out.csv && usacloud ipv4 list -o tsv",
    );
    assert_eq!(
        result.transformed_line,
        "usacloud server list --output-type=json | tee out.csv && usacloud ipaddress list -o json"
    );
    assert_eq!(result.changes.len(), 3);
}

#[test]
fn lines_without_an_invocation_pass_through() {
    for line in [
        "",
        "#!/bin/bash",
        "echo --output-type=csv",
        "# usacloud summary",
        r#"echo "usacloud summary""#,
        "set -euo pipefail",
    ] {
        let result = apply(line);
        assert!(!result.changed, "'{line}' should not change");
        assert_eq!(result.transformed_line, line);
    }
}

#[test]
fn current_syntax_is_left_alone() {
    for line in [
        "usacloud server list --output-type=json",
        "usacloud disk read mydisk --zone=is1a",
        "usacloud server-plan list",
        "usacloud version",
    ] {
        assert!(!apply(line).changed, "'{line}' should already be current");
    }
}

#[test]
fn rules_are_ordered_with_the_terminal_rule_last() {
    let engine = TransformEngine::new();
    let rules = engine.rules();
    let last = rules.last().expect("engine should have rules");
    assert!(last.is_terminal());
    assert!(rules[..rules.len() - 1].iter().all(|rule| !rule.is_terminal()));
}

#[test]
fn change_reasons_are_keyed_by_category() {
    let result = apply("usacloud server list -o csv --zone IS1A");
    for change in &result.changes {
        assert_eq!(change.reason, change.category.reason());
    }
    assert_eq!(
        serde_json::to_value(ChangeCategory::SelectorMigration)
            .expect("category should serialize"),
        serde_json::json!("selector-migration")
    );
}

#[test]
fn selector_removal_exposing_other_legacy_options_settles_in_one_pass() {
    assert_idempotent("usacloud server list -o --selector csv");
    assert_idempotent("usacloud server list --zone --selector is1a");
    assert_idempotent("usacloud --selector iso-image list");
    assert_idempotent("usacloud disk read --selector --selector mydisk");
    assert_idempotent("usacloud disk read --selector --selector --selector=name=mydisk -o --selector csv");
}

#[test]
fn repeated_selector_collapses_into_one_argument() {
    let result = apply("usacloud disk read --selector --selector mydisk");
    assert_eq!(result.transformed_line, "usacloud disk read mydisk");
    assert_eq!(result.changes.len(), 1);
    assert_eq!(result.changes[0].before, "--selector --selector mydisk");
}

#[test]
fn quoted_argument_text_is_never_rewritten() {
    let line = r#"usacloud note create --name n --content "echo -o csv and --zone IS1A" -o csv"#;
    let result = apply(line);
    assert_eq!(
        result.transformed_line,
        r#"usacloud note create --name n --content "echo -o csv and --zone IS1A" -o json"#
    );
    assert_eq!(result.changes.len(), 1);

    let single = "usacloud note create --content '--selector web --output-type=tsv'";
    assert!(!apply(single).changed);
    assert_idempotent(line);
}

#[test]
fn concurrent_application_is_deterministic() {
    let engine = Arc::new(TransformEngine::new());
    let line = "usacloud product-server list --selector tag=web --zone IS1A -o csv";
    let expected = engine.apply(line);

    let handles = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.apply(line))
        })
        .collect::<Vec<_>>();
    for handle in handles {
        let result = handle.join().expect("worker thread should not panic");
        assert_eq!(result, expected);
    }
}

fn legacy_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("usacloud".to_string()),
        Just("server".to_string()),
        Just("disk".to_string()),
        Just("list".to_string()),
        Just("read".to_string()),
        Just("summary".to_string()),
        Just("ojs".to_string()),
        Just("iso-image".to_string()),
        Just("product-license".to_string()),
        Just("--output-type=csv".to_string()),
        Just("--output-type".to_string()),
        Just("-o".to_string()),
        Just("tsv".to_string()),
        Just("--selector".to_string()),
        Just("--selector --selector".to_string()),
        Just("name=web".to_string()),
        Just("--selector=id=42".to_string()),
        Just("--zone".to_string()),
        Just("=".to_string()),
        Just("IS1A".to_string()),
        Just("--zone=Tk1a".to_string()),
        Just("\"quoted value\"".to_string()),
        Just("\"-o csv --zone IS1A\"".to_string()),
        Just("'--selector web'".to_string()),
        Just("|".to_string()),
        Just("&&".to_string()),
        Just("jq".to_string()),
        Just("#".to_string()),
        "[a-z0-9-]{1,8}",
    ]
}

fn legacy_line() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(legacy_token(), 0..10),
        "[ \t]{0,2}",
        prop::bool::ANY,
    )
        .prop_map(|(tokens, indent, with_invocation)| {
            let body = tokens.join(" ");
            if with_invocation {
                format!("{indent}usacloud {body}")
            } else {
                format!("{indent}{body}")
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_apply_is_idempotent(line in legacy_line()) {
        let engine = TransformEngine::new();
        let first = engine.apply(&line);
        let second = engine.apply(&first.transformed_line);
        prop_assert!(!second.changed, "second pass changed {:?} -> {:?}", first.transformed_line, second.transformed_line);
        prop_assert_eq!(second.transformed_line, first.transformed_line);
    }

    #[test]
    fn prop_change_spans_stay_inside_the_original_line(line in legacy_line()) {
        let result = TransformEngine::new().apply(&line);
        prop_assert_eq!(result.changed, !result.changes.is_empty());
        for change in &result.changes {
            prop_assert!(change.span_start <= change.span_end);
            prop_assert!(change.span_end <= line.len());
            prop_assert!(line.is_char_boundary(change.span_start));
            prop_assert!(line.is_char_boundary(change.span_end));
        }
    }

    #[test]
    fn prop_apply_is_deterministic(line in legacy_line()) {
        let engine = TransformEngine::new();
        prop_assert_eq!(engine.apply(&line), TransformEngine::new().apply(&line));
    }

    #[test]
    fn prop_terminal_change_is_always_last(line in legacy_line()) {
        let result = TransformEngine::new().apply(&line);
        if let Some(position) = result
            .changes
            .iter()
            .position(|change| change.category == ChangeCategory::DeprecatedCommand)
        {
            prop_assert_eq!(position, result.changes.len() - 1);
            prop_assert!(result.transformed_line.trim_start().starts_with('#'));
        }
    }
}
