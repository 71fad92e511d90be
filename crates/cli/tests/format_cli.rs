use std::fs;
use std::path::Path;
use std::process::Command;

// 2024-03-05T15:04:09Z
const SAMPLE: &str = "1709651049";

fn run(config_dir: &Path, args: &[&str]) -> std::process::Output {
    let config = config_dir.join("chatline.toml");
    if !config.exists() {
        fs::write(&config, "").expect("write empty config");
    }
    Command::new(env!("CARGO_BIN_EXE_chatline"))
        .args(args)
        .env("CHATLINE_CONFIG", &config)
        .env_remove("RUST_LOG")
        .output()
        .expect("run chatline")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn format_renders_each_code_in_utc() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cases = [
        ("t", "03:04 PM"),
        ("T", "03:04:09 PM"),
        ("d", "3/5/2024"),
        ("D", "3/5/2024, 03:04 PM"),
        ("f", "March 5th, 2024 at 03:04:09 PM GMT+00:00"),
        ("F", "Tuesday, March 5th, 2024 at 03:04:09 PM GMT+00:00"),
        ("x", "3/5/2024, 3:04:09 PM"),
    ];
    for (code, expected) in cases {
        let output = run(dir.path(), &["format", SAMPLE, "--style", code, "--utc"]);
        assert!(output.status.success(), "code {code}: {output:?}");
        assert_eq!(stdout(&output), expected, "code {code}");
    }
}

#[test]
fn format_uses_configured_default_style() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("chatline.toml"),
        "[timestamps]\ndefault_format = \"d\"\ntime_zone = \"utc\"\n",
    )
    .expect("write config");

    let output = run(dir.path(), &["format", SAMPLE]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "3/5/2024");
}

#[test]
fn format_rejects_non_numeric_timestamp() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(dir.path(), &["format", "yesterday", "--utc"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr: {stderr}");
    assert!(stderr.contains("yesterday"), "stderr: {stderr}");
}

#[test]
fn markup_tokens_are_replaced_in_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(
        dir.path(),
        &[
            "markup",
            "standup at <t:1709651049:t>, broken <t:soon:t>",
            "--utc",
        ],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "standup at 03:04 PM, broken <t:soon:t>");
}

#[test]
fn missing_explicit_config_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_chatline"))
        .args(["format", SAMPLE, "--utc", "--config"])
        .arg(dir.path().join("absent.toml"))
        .output()
        .expect("run chatline");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read config"));
}

#[test]
fn config_command_prints_effective_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("chatline.toml"),
        "[timeline]\ngrouping_range = 90\n",
    )
    .expect("write config");

    let output = run(dir.path(), &["config"]);
    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("sequential_window_secs = 90"), "{text}");
    assert!(text.contains("locale = \"en-US\""), "{text}");
}
