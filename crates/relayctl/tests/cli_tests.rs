//! End-to-end tests for the relayctl binary
//!
//! Each test points the CLI at a scratch runtime config and override paths,
//! so no network access or systemd is needed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ─── Helpers ───────────────────────────────────────────────────────────────

const OVERRIDE_VARS: [(&str, &str); 4] = [
    ("RELAYCTL_DNSTT_SERVER_PATH", "dnstt-server"),
    ("RELAYCTL_SLIPSTREAM_SERVER_PATH", "slipstream-server"),
    ("RELAYCTL_SSSERVER_PATH", "ssserver"),
    ("RELAYCTL_MICROSOCKS_PATH", "microsocks"),
];

const TUNNELS: &str = r#"
tunnels:
  - tag: slip-socks
    transport: slipstream
    backend: socks
    domain: s.example.com
    port: 5310
  - tag: dns-ss
    transport: dnstt
    backend: ss
    domain: d.example.com
    port: 5311
backends:
  - tag: socks
    kind: socks
  - tag: ss
    kind: shadowsocks
    shadowsocks:
      password: hunter2
"#;

struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let base = root.path();

        fs::create_dir_all(base.join("overrides")).unwrap();
        for (_, name) in OVERRIDE_VARS {
            fs::write(base.join("overrides").join(name), b"#!/bin/sh\n").unwrap();
        }

        let material = base.join("material").join("s.example.com");
        fs::create_dir_all(&material).unwrap();
        fs::write(material.join("cert.pem"), "CERT").unwrap();
        fs::write(material.join("key.pem"), "KEY").unwrap();

        fs::write(base.join("tunnels.yaml"), TUNNELS).unwrap();

        let runtime = format!(
            "paths:\n  bin-dir: {b}/bin\n  config-dir: {b}/etc\n  manifest: {b}/etc/versions.json\n  \
             tunnels: {b}/tunnels.yaml\n  material-dir: {b}/material\n  self-install-path: {b}/relayctl\n\
             service:\n  user: relayctl\n  unit-dir: {b}/units\n  name-prefix: relayctl\n",
            b = base.display()
        );
        fs::write(base.join("runtime.yaml"), runtime).unwrap();

        Self { root }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn runtime_config(&self) -> PathBuf {
        self.path().join("runtime.yaml")
    }

    fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_relayctl"));
        cmd.arg("--config").arg(self.runtime_config()).args(args);
        for (var, name) in OVERRIDE_VARS {
            cmd.env(var, self.path().join("overrides").join(name));
        }
        cmd.output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[test]
fn test_version_json_needs_no_config() {
    let output = Command::new(env!("CARGO_BIN_EXE_relayctl"))
        .args(["--config", "/nonexistent/runtime.yaml", "version", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_missing_runtime_config_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_relayctl"))
        .args(["--config", "/nonexistent/runtime.yaml", "binaries", "list"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[cfg(target_os = "linux")]
#[test]
fn test_binaries_list_reports_overrides() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["binaries", "list"]);

    assert!(output.status.success(), "{:?}", output);
    let out = stdout(&output);
    assert!(out.contains("dnstt-server"));
    assert!(out.contains("override"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_update_check_skips_overridden_binaries() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["update", "--check"]);

    assert!(output.status.success(), "{:?}", output);
    assert!(stdout(&output).contains("overridden"));
    assert!(!sandbox.path().join("etc").join("versions.json").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_tunnel_render_prints_unit() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["tunnel", "render", "slip-socks", "--port", "53"]);

    assert!(output.status.success(), "{:?}", output);
    let out = stdout(&output);
    assert!(out.contains("--dns-listen-port 53"));
    assert!(out.contains("--target-address 127.0.0.1:1080"));
    assert!(out.contains("AmbientCapabilities=CAP_NET_BIND_SERVICE"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_tunnel_render_rejects_shadowsocks_over_dnstt() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["tunnel", "render", "dns-ss"]);

    assert!(!output.status.success());
    assert!(!sandbox.path().join("etc").join("tunnels").join("dns-ss").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_tunnel_render_unknown_tag() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["tunnel", "render", "nope"]);

    assert!(!output.status.success());
}
