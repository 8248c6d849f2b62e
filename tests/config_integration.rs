use std::path::PathBuf;

use photogrid::config::{ConfigFlags, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".photogridrc");
    let content = r#"
# comment
--no-thumbnails

--page-size 10
   
--history-file=history.json
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.no_thumbnails);
    assert_eq!(flags.page_size, Some(10));
    assert_eq!(flags.history_file, Some(PathBuf::from("history.json")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".photogridrc");
    let content = "--no-thumbnails\n--rows 3\n--latency-ms 200\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "photogrid".to_string(),
        "--rows".to_string(),
        "8".to_string(),
        "--perf".to_string(),
        "catalog.json".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.no_thumbnails, "file flags should remain enabled");
    assert!(effective.perf, "cli flags should be applied");
    assert_eq!(effective.rows(), 8, "cli should override rows");
    assert_eq!(
        effective.latency_ms(),
        200,
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "photogrid".to_string(),
        "--prefetch-distance=0".to_string(),
        "--columns=6".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.prefetch_distance, Some(0));
    assert_eq!(flags.prefetch_distance(), 0);
    assert_eq!(flags.columns(), 6);
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        no_thumbnails: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        perf: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.no_thumbnails);
    assert!(merged.perf);
}

#[test]
fn test_zero_sizes_are_clamped() {
    let args = vec![
        "--page-size".to_string(),
        "0".to_string(),
        "--columns".to_string(),
        "0".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.page_size(), 1);
    assert_eq!(flags.columns(), 1);
}
