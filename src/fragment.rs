// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Codec for the managed fragment embedded in the target file.
//!
//! The fragment is everything from [`FRAGMENT_DELIMITER`] to end-of-file:
//!
//! ```text
//! <unmanaged content>
//!
//! ##BEGIN K8S HOSTS##
//! 10.0.0.1	 a.example.com b.example.com
//! 10.0.0.2	 c.example.com
//! ```
//!
//! Each line is the IP, a tab, then every hostname preceded by a single
//! space. This is the only module that knows about the delimiter; the file
//! reconciler goes through [`render`] and [`strip_managed`].

use crate::aggregator::AddressBook;
use crate::constants::{FRAGMENT_DELIMITER, IP_HOST_SEPARATOR};
use crate::errors::{HostsError, Result};

/// Render an address book into the managed fragment text.
///
/// Output always starts with the delimiter, even for an empty book.
#[must_use]
pub fn render(book: &AddressBook) -> String {
    let mut out = String::from(FRAGMENT_DELIMITER);

    for (ip, hosts) in book.iter() {
        out.push_str(ip);
        out.push(IP_HOST_SEPARATOR);
        for host in hosts {
            out.push(' ');
            out.push_str(host);
        }
        out.push('\n');
    }

    out
}

/// Return the bytes that precede the managed fragment.
///
/// The target file is not required to be UTF-8, so splitting works on raw
/// bytes. Content without a delimiter is returned unchanged (first run).
///
/// # Errors
///
/// Returns [`HostsError::MalformedFile`] if splitting yields no segment.
pub fn strip_managed(content: &[u8]) -> Result<&[u8]> {
    let end = find_delimiter(content).unwrap_or(content.len());
    content
        .get(..end)
        .ok_or_else(|| HostsError::MalformedFile {
            reason: "no result from splitting on the fragment delimiter".to_string(),
        })
}

/// Return the managed fragment (delimiter included), if one is present.
#[must_use]
pub fn extract_managed(content: &[u8]) -> Option<&[u8]> {
    find_delimiter(content).map(|start| &content[start..])
}

/// Offset of the first delimiter occurrence.
fn find_delimiter(content: &[u8]) -> Option<usize> {
    content
        .windows(FRAGMENT_DELIMITER.len())
        .position(|window| window == FRAGMENT_DELIMITER.as_bytes())
}
