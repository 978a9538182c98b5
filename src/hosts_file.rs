// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciler for the target hosts file.
//!
//! [`HostsFile`] owns the managed fragment at the end of the target file and
//! never touches the content before it. The original content is captured once
//! when the reconciler is opened so it can be put back on shutdown.
//!
//! # Write strategy
//!
//! Every write goes to a temporary file in the target's directory, which is
//! then renamed over the target. A reader therefore sees either the old or the
//! new content, never a truncated file. The temporary file takes the target's
//! permission bits, owner and group before the rename. Some targets cannot be
//! replaced by a rename:
//!
//! - a bind-mounted `/etc/hosts` inside a container (`EBUSY`)
//! - a directory the process may not create files in
//! - a symlink, which would be replaced by a regular file
//! - a file with more than one hard link, which the rename would split off
//! - a file owned by another user the process cannot `chown` to
//!
//! For those the file is truncated and rewritten in place. The rename creates
//! a new inode, so extended attributes (including SELinux labels) are not
//! carried over.
//!
//! The file content is handled as raw bytes. Only the managed fragment is
//! generated text; the unmanaged prefix is never decoded.

use crate::aggregator::AddressBook;
use crate::errors::{HostsError, Result};
use crate::fragment::{render, strip_managed};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::{chown, MetadataExt};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Mode used when the target has to be created during an in-place write
#[cfg(unix)]
const HOSTS_FILE_MODE: u32 = 0o640;

/// Reconciler for one target file.
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
    original: Vec<u8>,
}

impl HostsFile {
    /// Open the target file and capture its original (unmanaged) content.
    ///
    /// If a previous run left a fragment behind, it is not part of the
    /// captured content.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::FileAccess`] if the file does not exist or cannot
    /// be read, and [`HostsError::MalformedFile`] if it cannot be split.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let original = read_original(&path)?;
        info!(
            path = %path.display(),
            bytes = original.len(),
            "Captured original hosts file content"
        );
        Ok(Self { path, original })
    }

    /// Path of the target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unmanaged content captured when the reconciler was opened.
    #[must_use]
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Re-read the target and return its current unmanaged content.
    ///
    /// # Errors
    ///
    /// Same as [`HostsFile::open`].
    pub fn capture_original(&self) -> Result<Vec<u8>> {
        read_original(&self.path)
    }

    /// Regenerate the managed fragment from `book`.
    ///
    /// The unmanaged content is re-read first, so edits made to it while the
    /// controller runs are kept.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::FileAccess`] if the file cannot be read or
    /// written, and [`HostsError::MalformedFile`] if it cannot be split.
    pub fn reconcile(&self, book: &AddressBook) -> Result<()> {
        let mut content = self.capture_original()?;
        content.extend_from_slice(render(book).as_bytes());

        self.commit(&content)
            .map_err(|source| HostsError::FileAccess {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            addresses = book.len(),
            "Wrote managed fragment"
        );
        Ok(())
    }

    /// Write back the content captured at startup, removing the fragment.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Cleanup`] if the file cannot be written.
    pub fn restore_original(&self) -> Result<()> {
        self.commit(&self.original)
            .map_err(|source| HostsError::Cleanup {
                path: self.path.clone(),
                source,
            })?;

        info!(path = %self.path.display(), "Restored original hosts file content");
        Ok(())
    }

    fn commit(&self, bytes: &[u8]) -> io::Result<()> {
        let is_symlink = fs::symlink_metadata(&self.path)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);

        if !is_symlink {
            match self.write_atomic(bytes) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!(
                        path = %self.path.display(),
                        error = %e,
                        "Atomic replace failed, rewriting in place"
                    );
                }
            }
        }

        self.write_in_place(bytes)
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let metadata = fs::metadata(&self.path)?;

        #[cfg(unix)]
        if metadata.nlink() > 1 {
            return Err(io::Error::other("target has more than one hard link"));
        }

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        fs::set_permissions(tmp.path(), metadata.permissions())?;

        #[cfg(unix)]
        chown(tmp.path(), Some(metadata.uid()), Some(metadata.gid()))?;

        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn write_in_place(&self, bytes: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(HOSTS_FILE_MODE);
        }

        let mut file = options.open(&self.path).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Cannot open hosts file for write");
        })?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

fn read_original(path: &Path) -> Result<Vec<u8>> {
    let content = fs::read(path).map_err(|source| HostsError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    strip_managed(&content).map(<[u8]>::to_vec)
}
