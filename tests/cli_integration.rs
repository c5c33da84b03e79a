use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

const NOW: &str = "2024-01-03T12:00:00Z";

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write test file");
}

/// Isolated home with empty Claude and Codex roots
struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(root.path().join("home")).expect("create home");
        fs::create_dir_all(root.path().join("claude/projects")).expect("create claude root");
        fs::create_dir_all(root.path().join("codex/sessions")).expect("create codex root");
        Fixture { root }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    fn claude_log(&self, rel: &str, lines: &[&str]) {
        write_file(&self.path("claude/projects").join(rel), &lines.join("\n"));
    }

    fn codex_log(&self, rel: &str, lines: &[&str]) {
        write_file(&self.path("codex/sessions").join(rel), &lines.join("\n"));
    }

    fn run(&self, args: &[&str]) -> (bool, String, String) {
        let home = self.path("home");
        let output = Command::new(env!("CARGO_BIN_EXE_tokenbar"))
            .args(args)
            .env_remove("TOKENBAR_LOG")
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("CLAUDE_CONFIG_DIR", self.path("claude"))
            .env("CODEX_HOME", self.path("codex"))
            .output()
            .expect("run tokenbar");
        (
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        )
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json", "--timezone", "UTC", "--now", NOW];
        full.extend_from_slice(args);
        let (ok, stdout, stderr) = self.run(&full);
        assert!(ok, "stderr: {stderr}");
        serde_json::from_str(&stdout).expect("json")
    }
}

fn cost(value: &Value) -> f64 {
    value
        .as_str()
        .expect("cost is a decimal string")
        .parse()
        .expect("cost parses")
}

fn period<'a>(snapshot: &'a Value, name: &str) -> &'a Value {
    snapshot["periods"]
        .as_array()
        .expect("periods array")
        .iter()
        .find(|p| p["period"] == name)
        .map(|p| &p["metrics"])
        .expect("period present")
}

#[test]
fn summary_json_counts_recorded_cost_and_dedups() {
    let fx = Fixture::new();
    let line = r#"{"timestamp":"2024-01-03T10:00:00.000Z","sessionId":"sess-1","requestId":"req-1","costUSD":0.5,"message":{"id":"msg-1","model":"claude-sonnet-4","usage":{"input_tokens":1000,"output_tokens":500,"cache_creation_input_tokens":100,"cache_read_input_tokens":50}}}"#;
    fx.claude_log("proj/sess-1.jsonl", &[line, line]);

    let snapshot = fx.run_json(&["--offline"]);
    assert_eq!(snapshot["sources"], serde_json::json!(["claude"]));

    let today = period(&snapshot, "today");
    assert_eq!(today["input_tokens"].as_u64(), Some(1000));
    assert_eq!(today["output_tokens"].as_u64(), Some(500));
    assert_eq!(today["cache_tokens"].as_u64(), Some(150));
    assert_eq!(today["session_count"].as_u64(), Some(1));
    assert!((cost(&today["cost_usd"]) - 0.5).abs() < 1e-9);

    let models = snapshot["model_breakdown_today"].as_array().unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["model_name"], "claude-sonnet-4");
}

#[test]
fn pricing_file_prices_requests() {
    let fx = Fixture::new();
    let prices = fx.path("prices.json");
    write_file(
        &prices,
        r#"{
  "sample_spec": {"max_tokens": "set to max output tokens"},
  "claude-sonnet-4-20250514": {"input_cost_per_token": 0.000003, "output_cost_per_token": 0.000015}
}"#,
    );
    fx.claude_log(
        "proj/a.jsonl",
        &[
            r#"{"timestamp":"2024-01-03T09:00:00Z","message":{"model":"claude-sonnet-4-20250514","usage":{"input_tokens":1000,"output_tokens":500}}}"#,
            r#"{"timestamp":"2024-01-03T09:05:00Z","message":{"model":"some-unknown-model","usage":{"input_tokens":1000}}}"#,
        ],
    );

    let snapshot = fx.run_json(&["--pricing-file", prices.to_str().unwrap()]);
    let today = period(&snapshot, "today");
    assert_eq!(today["input_tokens"].as_u64(), Some(2000));
    // unknown models cost nothing
    assert!((cost(&today["cost_usd"]) - 0.0105).abs() < 1e-9);
}

#[test]
fn sessions_json_uses_project_names() {
    let fx = Fixture::new();
    fx.claude_log(
        "proj/one.jsonl",
        &[
            r#"{"timestamp":"2024-01-03T08:00:00Z","sessionId":"sess-old","cwd":"/Users/test/MyProject","gitBranch":"main","message":{"usage":{"input_tokens":10}}}"#,
            r#"{"timestamp":"2024-01-03T11:00:00Z","sessionId":"abcdef-0123456789","message":{"usage":{"input_tokens":20}}}"#,
        ],
    );

    let sessions = fx.run_json(&["sessions", "--offline"]);
    let sessions = sessions.as_array().expect("array output");
    assert_eq!(sessions.len(), 2);
    // most recent first
    assert_eq!(sessions[0]["display_name"], "Session 23456789");
    assert_eq!(sessions[1]["display_name"], "MyProject (main)");
    assert_eq!(sessions[1]["request_count"].as_u64(), Some(1));
}

#[test]
fn week_start_moves_the_week_window() {
    let fx = Fixture::new();
    // 2023-12-31 is a Sunday; NOW is Wednesday 2024-01-03
    fx.claude_log(
        "proj/w.jsonl",
        &[r#"{"timestamp":"2023-12-31T12:00:00Z","sessionId":"s","message":{"usage":{"input_tokens":100}}}"#],
    );

    let monday = fx.run_json(&["--offline"]);
    assert_eq!(period(&monday, "week")["input_tokens"].as_u64(), Some(0));
    assert_eq!(period(&monday, "month")["input_tokens"].as_u64(), Some(0));

    let sunday = fx.run_json(&["--offline", "--week-start", "sunday"]);
    assert_eq!(period(&sunday, "week")["input_tokens"].as_u64(), Some(100));
}

#[test]
fn codex_source_reconstructs_deltas() {
    let fx = Fixture::new();
    fx.codex_log(
        "2024/01/03/rollout-abc.jsonl",
        &[
            r#"{"timestamp":"2024-01-03T09:00:00Z","type":"turn_context","payload":{"model":"gpt-5"}}"#,
            r#"{"timestamp":"2024-01-03T09:00:01Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":100,"output_tokens":50,"total_tokens":150}}}}"#,
            r#"{"timestamp":"2024-01-03T09:05:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":300,"output_tokens":120,"total_tokens":420}}}}"#,
        ],
    );

    let snapshot = fx.run_json(&["--source", "codex", "--offline"]);
    let today = period(&snapshot, "today");
    assert_eq!(today["input_tokens"].as_u64(), Some(300));
    assert_eq!(today["output_tokens"].as_u64(), Some(120));
    assert_eq!(cost(&today["cost_usd"]), 0.0);

    let models = snapshot["model_breakdown_today"].as_array().unwrap();
    assert_eq!(models[0]["model_name"], "gpt-5");
    let sessions = snapshot["session_breakdown_today"].as_array().unwrap();
    assert_eq!(sessions[0]["session_id"], "rollout-abc");
}

#[test]
fn source_all_combines_both_tools() {
    let fx = Fixture::new();
    fx.claude_log(
        "p/a.jsonl",
        &[r#"{"timestamp":"2024-01-03T09:00:00Z","message":{"usage":{"input_tokens":10}}}"#],
    );
    fx.codex_log(
        "rollout-x.jsonl",
        &[r#"{"timestamp":"2024-01-03T09:30:00Z","type":"event_msg","payload":{"info":{"last_token_usage":{"input_tokens":5,"output_tokens":1}}}}"#],
    );

    let snapshot = fx.run_json(&["--source", "all", "--offline"]);
    assert_eq!(snapshot["sources"], serde_json::json!(["claude", "codex"]));
    let today = period(&snapshot, "today");
    assert_eq!(today["input_tokens"].as_u64(), Some(15));
    assert_eq!(today["session_count"].as_u64(), Some(2));
}

#[test]
fn statusline_text_output() {
    let fx = Fixture::new();
    fx.claude_log(
        "p/a.jsonl",
        &[r#"{"timestamp":"2024-01-03T09:00:00Z","costUSD":1.234,"message":{"usage":{"input_tokens":1500000,"output_tokens":2000}}}"#],
    );

    let (ok, stdout, stderr) = fx.run(&[
        "statusline",
        "--offline",
        "--timezone",
        "UTC",
        "--now",
        NOW,
    ]);
    assert!(ok, "stderr: {stderr}");
    assert_eq!(
        stdout.trim(),
        "Claude Code: $1.23 | In: 1.5M Out: 2.0K | Week: $1.23 | Month: $1.23"
    );
}

#[test]
fn summary_table_renders_periods() {
    let fx = Fixture::new();
    fx.claude_log(
        "p/a.jsonl",
        &[r#"{"timestamp":"2024-01-03T09:00:00Z","costUSD":2.5,"message":{"model":"claude-opus-4","usage":{"input_tokens":1234}}}"#],
    );

    let (ok, stdout, stderr) = fx.run(&[
        "--offline",
        "--no-color",
        "--timezone",
        "UTC",
        "--now",
        NOW,
    ]);
    assert!(ok, "stderr: {stderr}");
    assert!(stdout.contains("Today (2024-01-03)"));
    assert!(stdout.contains("This Week (W01)"));
    assert!(stdout.contains("claude-opus-4"));
    assert!(stdout.contains("1,234"));
    assert!(stdout.contains("$2.50"));
}

#[test]
fn no_logs_gives_zero_snapshot() {
    let fx = Fixture::new();
    let snapshot = fx.run_json(&["--source", "all", "--offline"]);
    for name in ["today", "week", "month"] {
        let metrics = period(&snapshot, name);
        assert_eq!(metrics["input_tokens"].as_u64(), Some(0));
        assert_eq!(metrics["session_count"].as_u64(), Some(0));
    }
    assert_eq!(snapshot["updated_at"], NOW);
}

#[test]
fn invalid_timezone_exits_with_error() {
    let fx = Fixture::new();
    let (ok, stdout, stderr) = fx.run(&["--offline", "--timezone", "Mars/Olympus"]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Invalid timezone: Mars/Olympus"), "stderr: {stderr}");
}

#[test]
fn unknown_source_exits_with_error() {
    let fx = Fixture::new();
    let (ok, _, stderr) = fx.run(&["--offline", "--source", "gemini"]);
    assert!(!ok);
    assert!(stderr.contains("Unknown source"), "stderr: {stderr}");
}

#[test]
fn config_file_is_honoured() {
    let fx = Fixture::new();
    write_file(
        &fx.path("home/.tokenbar.toml"),
        "offline = true\nsource = \"codex\"\n",
    );
    fx.codex_log(
        "rollout-cfg.jsonl",
        &[r#"{"timestamp":"2024-01-03T09:30:00Z","type":"event_msg","payload":{"info":{"last_token_usage":{"input_tokens":7}}}}"#],
    );

    let snapshot = fx.run_json(&[]);
    assert_eq!(snapshot["sources"], serde_json::json!(["codex"]));
    assert_eq!(period(&snapshot, "today")["input_tokens"].as_u64(), Some(7));
}
