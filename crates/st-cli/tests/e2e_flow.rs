//! End-to-end tests driving the `st` binary against a temporary database.
//!
//! Each test gets its own HOME and config file so nothing leaks in from the
//! developer's machine.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn st_binary() -> String {
    env!("CARGO_BIN_EXE_st").to_string()
}

struct Env {
    temp: TempDir,
    config: PathBuf,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        let db_path = temp.path().join("st.db");
        std::fs::write(
            &config,
            format!(
                "database_path = {:?}\npomodoro_minutes = 25\n",
                db_path.display().to_string()
            ),
        )
        .unwrap();
        Self { temp, config }
    }

    fn home(&self) -> &Path {
        self.temp.path()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(st_binary());
        cmd.env("HOME", self.home())
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("XDG_DATA_HOME")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config)
            .args(args);
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("failed to run st")
    }

    /// Runs a command that must succeed and returns its stdout.
    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "st {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&self.ok(args)).unwrap()
    }
}

#[test]
fn test_auth_flow() {
    let env = Env::new();

    assert_eq!(env.ok(&["auth", "whoami"]), "Not signed in.\n");
    assert_eq!(
        env.ok(&["auth", "sign-up", "ada"]),
        "Created account ada and signed in.\n"
    );
    assert_eq!(env.ok(&["auth", "whoami"]), "ada\n");

    let duplicate = env.run(&["auth", "sign-up", "ada"]);
    assert!(!duplicate.status.success());
    assert!(String::from_utf8_lossy(&duplicate.stderr).contains("username already taken"));

    assert_eq!(env.ok(&["auth", "sign-out"]), "Signed out.\n");
    assert_eq!(env.ok(&["auth", "sign-in", "ada"]), "Signed in as ada.\n");
}

#[test]
fn test_logging_requires_sign_in() {
    let env = Env::new();

    let output = env.run(&["log", "add", "--subject", "Physics", "--minutes", "30"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not signed in"));
}

#[test]
fn test_log_add_list_delete_and_stats() {
    let env = Env::new();
    env.ok(&["auth", "sign-up", "ada"]);

    env.ok(&["log", "add", "-s", "Physics", "-m", "45", "-n", "problem set"]);
    env.ok(&["log", "add", "-s", "Mathematics", "-m", "30"]);
    env.ok(&["log", "add", "-s", "Physics", "-m", "15"]);

    let rejected = env.run(&["log", "add", "-s", "Physics", "-m", "0"]);
    assert!(!rejected.status.success());

    let listed = env.json(&["log", "list", "--json"]);
    let logs = listed["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(listed["total_minutes"], 90);
    // Newest first
    assert_eq!(logs[0]["duration"], 15);
    assert_eq!(logs[2]["notes"], "problem set");

    let stats = env.json(&["stats", "--json"]);
    assert_eq!(stats["total_secs"], 5400);
    assert_eq!(stats["total"], "1h 30m");
    assert_eq!(stats["sessions"], 3);
    assert_eq!(stats["most_studied"], "Physics");
    assert_eq!(stats["streak_days"], 1);
    assert_eq!(stats["subjects"][0]["subject"], "Physics");
    assert_eq!(stats["subjects"][0]["secs"], 3600);

    let id = logs[0]["id"].as_str().unwrap();
    assert_eq!(env.ok(&["log", "delete", id]), format!("Deleted log {id}\n"));
    assert_eq!(
        env.ok(&["log", "delete", id]),
        format!("No log with ID {id}; nothing to delete.\n")
    );

    let stats = env.json(&["stats", "--json"]);
    assert_eq!(stats["total_secs"], 4500);
}

#[test]
fn test_logs_are_scoped_to_the_signed_in_user() {
    let env = Env::new();
    env.ok(&["auth", "sign-up", "ada"]);
    env.ok(&["log", "add", "-s", "Physics", "-m", "45"]);
    let listed = env.json(&["log", "list", "--json"]);
    let ada_log = listed["logs"][0]["id"].as_str().unwrap().to_string();

    env.ok(&["auth", "sign-up", "grace"]);
    let stats = env.json(&["stats", "--json"]);
    assert_eq!(stats["total_secs"], 0);
    assert!(stats["most_studied"].is_null());

    let text = env.ok(&["stats"]);
    assert!(text.contains("Most studied:      N/A"));

    assert_eq!(
        env.ok(&["log", "delete", &ada_log]),
        format!("No log with ID {ada_log}; nothing to delete.\n")
    );
    env.ok(&["auth", "sign-out"]);
    let output = env.run(&["log", "delete", &ada_log]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not signed in"));

    env.ok(&["auth", "sign-in", "ada"]);
    assert_eq!(env.json(&["stats", "--json"])["total_secs"], 2700);
}

#[test]
fn test_subjects_persist_and_last_cannot_be_removed() {
    let env = Env::new();

    let added = env.ok(&["subjects", "add", "Biology"]);
    assert!(added.starts_with("Added Biology (#FFC107) with ID "));

    let listed = env.ok(&["subjects", "list"]);
    assert_eq!(listed.lines().count(), 5);
    assert!(listed.contains("Biology"));

    for id in ["1", "2", "3"] {
        env.ok(&["subjects", "remove", id]);
    }
    let listed = env.ok(&["subjects", "list"]);
    assert_eq!(listed.lines().count(), 2);

    let biology_id = listed.lines().nth(1).unwrap().split_whitespace().next().unwrap();
    let output = env.run(&["subjects", "remove", biology_id]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("at least one subject must remain"));
}

#[test]
fn test_timer_completes_from_stdin_and_is_saved() {
    let env = Env::new();
    env.ok(&["auth", "sign-up", "ada"]);

    let mut child = env
        .command(&["timer", "--subject", "mathematics", "--mode", "stopwatch"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"c\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "timer failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Session complete: "));
    assert!(stdout.contains(" of Mathematics (stopwatch)"));
    assert!(stdout.contains("Saved as log "));

    let listed = env.json(&["log", "list", "--json"]);
    assert_eq!(listed["logs"][0]["subject"], "Mathematics");
    assert_eq!(listed["logs"][0]["notes"], "stopwatch session");
}

#[test]
fn test_timer_quit_discards_session() {
    let env = Env::new();
    env.ok(&["auth", "sign-up", "ada"]);

    let mut child = env
        .command(&["timer", "--subject", "Physics"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"p\np\nq\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "Session discarded.\n");

    let listed = env.json(&["log", "list", "--json"]);
    assert_eq!(listed["logs"].as_array().unwrap().len(), 0);
}

#[test]
fn test_timer_rejects_unknown_subject() {
    let env = Env::new();
    let output = env.run(&["timer", "--subject", "Astronomy"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown subject: Astronomy"));
}

#[test]
fn test_goals_and_status() {
    let env = Env::new();

    let goals = env.ok(&["goals"]);
    assert!(goals.contains("Complete Calculus Module"));
    assert!(goals.contains("[x] Physics Lab Reports"));

    env.ok(&["auth", "sign-up", "ada"]);
    env.ok(&["log", "add", "-s", "Chemistry", "-m", "20"]);
    let status = env.ok(&["status"]);
    assert!(status.contains("Pomodoro: 25 min"));
    assert!(status.contains("Signed in as: ada"));
    assert!(status.contains("Study logs: 1"));
}
