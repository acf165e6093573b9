//! Test constants

use relayctl_binaries::{Arch, Libc, Os, Platform};

pub const FAKE_BINARY_CONTENT: &[u8] = b"#!/bin/sh\necho relay\n";

pub const TEST_DNSTT_OVERRIDE: &str = "RELAYCTL_TEST_DNSTT_SERVER_PATH";
pub const TEST_SSSERVER_OVERRIDE: &str = "RELAYCTL_TEST_SSSERVER_PATH";
pub const TEST_MICROSOCKS_OVERRIDE: &str = "RELAYCTL_TEST_MICROSOCKS_PATH";

pub const DNSTT_VERSION: &str = "v2026.01.29";
pub const SSSERVER_VERSION: &str = "v1.23.5";

pub fn linux_amd64() -> Platform {
    Platform::new(Os::Linux, Arch::Amd64, Libc::Glibc)
}

pub fn darwin_arm64() -> Platform {
    Platform::new(Os::Darwin, Arch::Arm64, Libc::Glibc)
}
