use bytes::Bytes;
use std::fmt;

/// Default ceiling for the number of bytes held in memory per request (10 MiB).
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Prefix of a remote resource together with what the server declared about it.
///
/// `bytes` always starts at offset 0 of the remote resource and is never
/// longer than the configured safe limit nor than `total_size`.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub bytes: Bytes,
    /// Filename from `Content-Disposition`, or the request URL when absent.
    pub declared_filename: String,
    /// Value of the `Content-Length` header on the HEAD response.
    pub total_size: u64,
}

impl FetchResult {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the prefix covers the whole remote resource.
    pub fn is_complete(&self) -> bool {
        self.bytes.len() as u64 >= self.total_size
    }
}

impl fmt::Debug for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResult")
            .field("declared_filename", &self.declared_filename)
            .field("total_size", &self.total_size)
            .field("buffered", &self.bytes.len())
            .finish()
    }
}
