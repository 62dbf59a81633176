//! Codec error kinds.

use thiserror::Error;

/// Failures reported by the per-type codec operations.
///
/// Exactly one kind accompanies every failure, so callers can tell a
/// retryable short read from a fatal stream.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The record continues beyond the supplied octets. Recoverable:
    /// append more input and retry.
    #[error("colfer: incomplete record")]
    Incomplete,

    /// A record or list breaches the configured size or element limit,
    /// or nesting exceeds the decode budget.
    #[error("colfer: size limit breach")]
    SizeOverflow,

    /// The octet matches no tag expected by the schema, or the
    /// terminator is absent. Fatal for this record.
    #[error("colfer: schema mismatch on octet {0:#04x}")]
    SchemaMismatch(u8),
}
