//! Shared test helpers for integration tests
//!
//! Every `Desk` owns a temp directory holding the database and stands in for
//! the user's config directory, so host configuration never leaks in.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a tdesk command with no ambient environment
pub fn tdesk() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tdesk"));
    cmd.env_remove("TDESK_USER")
        .env_remove("TDESK_DB")
        .env_remove("TDESK_LOG");
    cmd
}

/// A scratch database plus the ids created in it
pub struct Desk {
    pub tmp: TempDir,
}

impl Desk {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    /// A command bound to this desk's database
    pub fn cmd(&self) -> Command {
        let mut cmd = tdesk();
        cmd.current_dir(self.tmp.path())
            .env("HOME", self.tmp.path())
            .env("XDG_CONFIG_HOME", self.tmp.path())
            .arg("--db")
            .arg(self.tmp.path().join("tdesk.db"));
        cmd
    }

    /// A command acting as `user`
    pub fn as_user(&self, user: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["--user", user]);
        cmd
    }

    /// Run and return trimmed stdout, asserting success
    pub fn id_of(&self, mut cmd: Command) -> String {
        let output = cmd.args(["--format", "id"]).output().unwrap();
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn employee(&self, username: &str) {
        self.cmd()
            .args(["employee", "new", username])
            .assert()
            .success();
    }

    pub fn org(&self, name: &str) -> String {
        let mut cmd = self.cmd();
        cmd.args(["org", "new", name]);
        self.id_of(cmd)
    }

    pub fn member(&self, org: &str, username: &str) {
        self.cmd()
            .args(["org", "add-member", org, username])
            .assert()
            .success();
    }

    /// A `Created` tender owned by `org`
    pub fn tender(&self, user: &str, org: &str, name: &str) -> String {
        let mut cmd = self.as_user(user);
        cmd.args([
            "tender",
            "new",
            "--name",
            name,
            "--description",
            "Test tender",
            "--service-type",
            "Construction",
            "--org",
            org,
        ]);
        self.id_of(cmd)
    }

    pub fn publish(&self, user: &str, tender: &str) {
        self.as_user(user)
            .args(["tender", "set-status", tender, "Published"])
            .assert()
            .success();
    }

    pub fn bid(&self, user: &str, tender: &str, name: &str) -> String {
        let mut cmd = self.as_user(user);
        cmd.args([
            "bid",
            "new",
            "--name",
            name,
            "--description",
            "Test bid",
            "--tender",
            tender,
        ]);
        self.id_of(cmd)
    }
}

/// Two organizations: `acme` with alice, `bolt` with bob; carol belongs nowhere
pub struct Seeded {
    pub desk: Desk,
    pub acme: String,
    pub bolt: String,
}

pub fn seeded_desk() -> Seeded {
    let desk = Desk::new();
    for user in ["alice", "bob", "carol"] {
        desk.employee(user);
    }
    let acme = desk.org("Acme");
    let bolt = desk.org("Bolt");
    desk.member(&acme, "alice");
    desk.member(&bolt, "bob");
    Seeded { desk, acme, bolt }
}
