//! Release archive extraction

use flate2::read::GzDecoder;
use std::ffi::OsStr;
use std::io::{self, Read, Write};
use tar::Archive;
use tracing::debug;
use xz2::read::XzDecoder;

use crate::catalog::ArchiveFormat;

/// Copy the first regular file whose base name is `entry_name` into `out`
///
/// The containing directory inside the archive is ignored. Returns `false`
/// after a full scan without a match; nothing is written in that case.
pub fn extract_entry<W: Write>(
    format: ArchiveFormat,
    data: &[u8],
    entry_name: &str,
    out: &mut W,
) -> io::Result<bool> {
    let reader: Box<dyn Read + '_> = match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(data)),
        ArchiveFormat::TarXz => Box::new(XzDecoder::new(data)),
    };

    let mut archive = Archive::new(reader);
    let wanted = OsStr::new(entry_name);

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let matches = entry.path()?.file_name() == Some(wanted);
        if matches {
            debug!("Extracting {} from archive", entry.path()?.display());
            io::copy(&mut entry, out)?;
            return Ok(true);
        }
    }

    Ok(false)
}
