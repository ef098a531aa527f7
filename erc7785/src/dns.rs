//! DNS wire-format encoding of names, as required by the `name` argument of
//! the [ENSIP-10] `resolve(bytes,bytes)` entrypoint.
//!
//! [ENSIP-10]: https://docs.ens.domains/ensip/10

use alloy::primitives::Bytes;

use crate::error::{Error, Result};

/// Longest label the wire format can carry.
pub const MAX_LABEL_LEN: usize = 63;

/// Longest encoded name the wire format allows, terminator included.
pub const MAX_NAME_LEN: usize = 255;

/// Encode a dot-separated name into length-prefixed DNS wire format.
///
/// Each label is emitted as one length byte followed by its UTF-8 bytes and
/// the sequence is terminated by a zero byte. The empty name encodes to a
/// single zero byte. `max_len` is capped at [`MAX_NAME_LEN`].
///
/// # Errors
///
/// Returns [`Error::LabelTooLong`] when a label exceeds 63 bytes,
/// [`Error::InvalidLabel`] for an empty inner label (e.g. `"a..b"`), and
/// [`Error::NameTooLong`] when the output would exceed the ceiling.
pub fn dns_encode(name: &str, max_len: usize) -> Result<Bytes> {
    let max = max_len.min(MAX_NAME_LEN);
    if name.is_empty() {
        return Ok(Bytes::from_static(&[0]));
    }

    let mut out = Vec::with_capacity(name.len() + 2);
    for label in name.split('.') {
        let len = label.len();
        if len == 0 {
            return Err(Error::InvalidLabel {
                label: name.to_owned(),
                reason: "empty label",
            });
        }
        let prefix = u8::try_from(len)
            .ok()
            .filter(|&n| usize::from(n) <= MAX_LABEL_LEN)
            .ok_or_else(|| Error::LabelTooLong {
                label: label.to_owned(),
                len,
            })?;
        out.push(prefix);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);

    if out.len() > max {
        return Err(Error::NameTooLong {
            len: out.len(),
            max,
        });
    }
    Ok(out.into())
}

/// Split a DNS wire-format name back into its labels.
///
/// # Errors
///
/// Returns [`Error::MalformedDnsName`] if a length byte points past the end
/// of the buffer, a label is not UTF-8, the terminator is missing, or bytes
/// follow the terminator.
pub fn dns_decode(wire: &[u8]) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    let mut rest = wire;
    loop {
        let Some((&len, tail)) = rest.split_first() else {
            return Err(Error::MalformedDnsName("missing terminator"));
        };
        if len == 0 {
            if !tail.is_empty() {
                return Err(Error::MalformedDnsName("trailing bytes after terminator"));
            }
            return Ok(labels);
        }
        let len = usize::from(len);
        if len > MAX_LABEL_LEN {
            return Err(Error::MalformedDnsName("label length above 63"));
        }
        let Some((label, tail)) = tail.split_at_checked(len) else {
            return Err(Error::MalformedDnsName("label runs past end of buffer"));
        };
        let label = std::str::from_utf8(label)
            .map_err(|_| Error::MalformedDnsName("label is not UTF-8"))?;
        labels.push(label.to_owned());
        rest = tail;
    }
}
