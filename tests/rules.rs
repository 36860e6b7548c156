#![forbid(unsafe_code)]
use lutin::{load_rules_file, parse_rules, Rule, RuleError};
use std::fs;
use tempfile::tempdir;

#[test]
fn gets_means_must_match() {
    let rules = parse_rules(r#"dept "Sales" gets dept "Marketing""#).unwrap();
    assert_eq!(rules, vec![Rule::new("dept", "Sales", "dept", "Marketing", true)]);
}

#[test]
fn any_other_mode_means_must_not_match() {
    let rules = parse_rules(r#"dept "Sales" excludes dept "Sales""#).unwrap();
    assert_eq!(rules, vec![Rule::new("dept", "Sales", "dept", "Sales", false)]);
}

#[test]
fn comments_blank_lines_and_colons() {
    let text = "\
# règles 2026

site:\"Lyon: Part-Dieu\":never:site:\"Lyon: Part-Dieu\"
   team Ops gets team Dev
";
    let rules = parse_rules(text).unwrap();
    assert_eq!(
        rules,
        vec![
            Rule::new("site", "Lyon: Part-Dieu", "site", "Lyon: Part-Dieu", false),
            Rule::new("team", "Ops", "team", "Dev", true),
        ]
    );
}

#[test]
fn one_malformed_line_rejects_the_whole_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.txt");
    fs::write(&path, "team Ops gets team Dev\nteam Ops gets\n").unwrap();
    let err = load_rules_file(&path).unwrap_err();
    assert!(matches!(err, RuleError::Malformed { line: 2, found: 3, .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load_rules_file(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, RuleError::Io { .. }));
}

#[test]
fn extra_tokens_are_rejected() {
    let err = parse_rules("team Ops gets team Dev Paris\n").unwrap_err();
    assert!(matches!(err, RuleError::Malformed { line: 1, found: 6, .. }));
    assert!(err.to_string().contains("found 6"));
}
