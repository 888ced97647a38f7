use std::fs;

use nestplan::config::{Settings, SettingsError};

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join(format!("nestplan-file-settings-{}.toml", std::process::id()));
    fs::write(
        &path,
        r#"
[resolver]
max_depth = 5

[render]
label_side_queries = true
"#,
    )
    .unwrap();

    let settings = Settings::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(settings.resolver.max_depth, 5);
    assert!(settings.render.label_side_queries);
    assert!(settings.render.inline_parent_lookups);
    assert_eq!(settings.planner, Settings::default().planner);
}

#[test]
fn test_missing_file() {
    let err = Settings::from_file("/definitely/not/here/nestplan.toml").unwrap_err();
    assert!(matches!(err, SettingsError::FileNotFound(_)));
}

#[test]
fn test_invalid_values_rejected() {
    for toml in [
        "[planner]\nmax_nesting_depth = 3",
        "[planner]\nmax_nesting_depth = 0",
        "[resolver]\nmax_depth = 0",
        "[planner]\nid_field = \"\"",
    ] {
        let err = Settings::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidConfig(_)), "{}", toml);
    }
}

#[test]
fn test_malformed_toml() {
    let err = Settings::from_toml_str("[planner\nid_field = ").unwrap_err();
    assert!(matches!(err, SettingsError::ParseError(_)));
}
