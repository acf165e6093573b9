//! Catalog and archive fixtures

use flate2::write::GzEncoder;
use flate2::Compression;
use relayctl_binaries::{
    Arch, ArchiveEntry, ArchiveFormat, BinaryDefinition, BinaryType, Catalog, NamingFamily, Os,
};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use tar::{Builder, EntryType, Header};

use super::constants::*;

fn linux_only(arches: &[Arch]) -> BTreeMap<Os, BTreeSet<Arch>> {
    BTreeMap::from([(Os::Linux, arches.iter().copied().collect())])
}

/// Plain-download definition served from `base_url`
pub fn plain_definition(
    binary_type: BinaryType,
    base_url: &str,
    override_env: &str,
    pinned_version: &str,
) -> BinaryDefinition {
    BinaryDefinition {
        binary_type,
        override_env: override_env.to_string(),
        url_template: format!("{}/{{version}}/{}-{{os}}-{{arch}}{{ext}}", base_url, binary_type),
        archive: None,
        naming: NamingFamily::Generic,
        platforms: linux_only(&[Arch::Amd64, Arch::Arm64]),
        pinned_version: pinned_version.to_string(),
        skip_update: false,
    }
}

/// `ssserver`-style tar.gz definition served from `base_url`
pub fn archive_definition(base_url: &str, pinned_version: &str) -> BinaryDefinition {
    BinaryDefinition {
        binary_type: BinaryType::SsServer,
        override_env: TEST_SSSERVER_OVERRIDE.to_string(),
        url_template: format!("{}/{{version}}/shadowsocks.{{ssarch}}.tar.gz", base_url),
        archive: Some(ArchiveEntry {
            format: ArchiveFormat::TarGz,
            entry_name: "ssserver".to_string(),
        }),
        naming: NamingFamily::RustTriple,
        platforms: linux_only(&[Arch::Amd64]),
        pinned_version: pinned_version.to_string(),
        skip_update: false,
    }
}

/// Catalog with dnstt-server as a plain download and ssserver as an archive
pub fn test_catalog(base_url: &str) -> Catalog {
    Catalog::new(vec![
        plain_definition(
            BinaryType::DnsttServer,
            base_url,
            TEST_DNSTT_OVERRIDE,
            DNSTT_VERSION,
        ),
        archive_definition(base_url, SSSERVER_VERSION),
    ])
    .unwrap()
}

/// Build a tar.gz with the given `(path, type, contents)` entries
pub fn tar_gz(entries: &[(&str, EntryType, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, kind, data) in entries {
        let mut header = Header::new_gnu();
        header.set_entry_type(*kind);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Build a tar.xz with the given `(path, contents)` regular files
pub fn tar_xz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    let tar = builder.into_inner().unwrap();

    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(&tar).unwrap();
    encoder.finish().unwrap()
}
