//! Shared helpers for specs.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::TempDir;

pub const STATE_FILE: &str = "esxi_operations.json";

pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as u64
}

/// `ot` with an isolated state dir that is discarded afterwards.
pub fn cli() -> CliBuilder {
    let project = Project::empty();
    let mut builder = project.ot();
    builder._project = Some(project);
    builder
}

/// A temp state directory.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> PathBuf {
        self.path().join(STATE_FILE)
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Write a state file holding the given `(type, id, status, progress)`
    /// records, stamped `age_ms` in the past.
    pub fn seed(&self, records: &[(&str, &str, &str, u8)], age_ms: u64) {
        let stamp = now_ms() - age_ms;
        let mut table = serde_json::Map::new();
        for (kind, id, status, progress) in records {
            table.insert(
                format!("{kind}_{id}"),
                serde_json::json!({
                    "type": kind,
                    "id": id,
                    "progress": progress,
                    "status": status,
                    "message": "",
                    "lastUpdate": stamp,
                }),
            );
        }
        self.file(STATE_FILE, &serde_json::to_string(&table).unwrap());
    }

    pub fn state(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(self.state_path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    pub fn ot(&self) -> CliBuilder {
        let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_ot"));
        cmd.env("OT_STATE_DIR", self.path())
            .env("NO_COLOR", "1")
            .env("OT_POLL_INTERVAL_MS", "10")
            .env("OT_FETCH_TIMEOUT_MS", "2000")
            .env_remove("COLOR")
            .env_remove("OT_API_URL")
            .env_remove("OT_API_TOKEN")
            .env_remove("OT_REMOVAL_GRACE_MS")
            .timeout(std::time::Duration::from_secs(30));
        CliBuilder { cmd, _project: None }
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
    _project: Option<Project>,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn run(mut self) -> RunAssert {
        let Output { status, stdout, stderr } = self.cmd.output().unwrap();
        RunAssert {
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        }
    }

    /// Run and expect exit code 0.
    pub fn passes(self) -> RunAssert {
        let run = self.run();
        assert_eq!(run.code, Some(0), "expected success\nstdout:\n{}\nstderr:\n{}", run.stdout, run.stderr);
        run
    }

    /// Run and expect the given exit code.
    pub fn exits(self, code: i32) -> RunAssert {
        let run = self.run();
        assert_eq!(run.code, Some(code), "stdout:\n{}\nstderr:\n{}", run.stdout, run.stderr);
        run
    }

    /// Run and expect exit code 1.
    pub fn fails(self) -> RunAssert {
        self.exits(1)
    }
}

pub struct RunAssert {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl RunAssert {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {needle:?}:\n{}", self.stderr);
        self
    }
}

/// Minimal stand-in for the backend's progress endpoint.
///
/// Answers each request with the next scripted `(status code, body)`; the
/// last one repeats. Records request heads.
pub struct StubServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn serve(script: &[(u16, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let script: Vec<(u16, String)> = script.iter().map(|(c, b)| (*c, b.to_string())).collect();

        std::thread::spawn(move || {
            let mut step = 0;
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut head = String::new();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                    head.push_str(&line);
                }
                seen.lock().unwrap().push(head);

                let (code, body) = &script[step.min(script.len() - 1)];
                step += 1;
                let response = format!(
                    "HTTP/1.1 {code} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { port, requests }
    }

    /// URL template for `ot --url`.
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/api/progress/{{id}}/", self.port)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}
