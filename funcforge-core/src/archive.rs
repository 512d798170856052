// SPDX-License-Identifier: Apache-2.0

//! Archive extraction for uploaded function bundles.
//!
//! Unpacks a zip byte stream into a per-request working directory,
//! preserving directory structure and unix permissions. Entries that
//! would resolve outside the extraction root are rejected before
//! anything is written.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use zip::ZipArchive;

use crate::error::ArchiveError;

/// Extract every entry of the zip archive in `bytes` under `dest_root`.
///
/// The invariant enforced here: every resolved entry path stays a
/// descendant of `dest_root`. Absolute entry names and names with `..`
/// components fail with [`ArchiveError::UnsafeEntryPath`].
pub fn extract_archive(bytes: &[u8], dest_root: &Path) -> Result<(), ArchiveError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ArchiveError::Open {
            reason: e.to_string(),
        })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| ArchiveError::Entry {
            index,
            reason: e.to_string(),
        })?;

        // enclosed_name() yields None for absolute paths and for names
        // whose `..` components would climb out of the root.
        let raw_name = entry.name().to_string();
        let Some(relative) = entry.enclosed_name() else {
            return Err(ArchiveError::UnsafeEntryPath { name: raw_name });
        };
        let dest = dest_root.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| ArchiveError::Write {
                path: dest.clone(),
                source: e,
            })?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut out = fs::File::create(&dest).map_err(|e| ArchiveError::Write {
            path: dest.clone(),
            source: e,
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|e| ArchiveError::Write {
            path: dest.clone(),
            source: e,
        })?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode)).map_err(|e| {
                ArchiveError::Write {
                    path: dest.clone(),
                    source: e,
                }
            })?;
        }
    }

    Ok(())
}
