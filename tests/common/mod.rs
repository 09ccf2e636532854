//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Isolated home + work directory for driving the `genoflow` binary.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("home")).expect("create home");
        Self { dir }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn home(&self) -> PathBuf {
        self.path("home")
    }

    /// Run the binary with `GENOFLOW_HOME` pointed into the sandbox.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_genoflow"))
            .args(args)
            .current_dir(self.dir.path())
            .env("GENOFLOW_HOME", self.home())
            .env_remove("GENOFLOW_DAEMON_BIN")
            .env_remove("GENOFLOW_LOG")
            .output()
            .expect("run genoflow")
    }

    pub fn write_input(&self, name: &str) -> PathBuf {
        let path = self.path("inputs").join(name);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create inputs");
        std::fs::write(&path, ">contig_1\nACGTACGT\n").expect("write input");
        path
    }

    /// Shell-script daemon that writes an assembly result per dataset and
    /// fails with 7 when its `--json` config is not reachable from its cwd.
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn fake_daemon(&self, exit_code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = self.path(&format!("fake-daemon-{exit_code}"));
        let body = format!(
            r#"#!/bin/sh
root="$3"
if [ "$5" = "--json" ] && [ ! -f "$6" ]; then
  echo "config not found: $6" >&2
  exit 7
fi
mkdir -p "$root/data/assembly"
for meta in "$root"/metadata/*.json; do
  [ -e "$meta" ] || continue
  name=$(basename "$meta" .json)
  printf '{{"stats":{{"n50":[2000,"bp"]}}}}' > "$root/data/assembly/$name.json"
  echo "processed $name"
done
exit {exit_code}
"#
        );
        std::fs::write(&path, body).expect("write daemon");
        let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod daemon");
        path
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[allow(dead_code)]
pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("read json");
    serde_json::from_str(&text).expect("parse json")
}
