//! Runtime support for the Colfer binary serialization format.
//!
//! # Overview
//!
//! A Colfer record serializes as its fields that differ from their zero
//! value, in ascending tag order. Each present field contributes one tag
//! octet (low seven bits the field index, high bit a per-type variant)
//! followed by its payload, and a single `0x7F` octet closes the record.
//! Absent fields cost nothing; an empty record is the terminator alone.
//!
//! This crate carries what every record type shares: the [`Record`]
//! trait with the three per-type operations, the [`Error`] kinds, the
//! [`Timestamp`] value type, the octet-level helpers in [`wire`], and
//! the default safety limits. The record types themselves, struct
//! definitions plus codec bodies, are rendered from a schema model by
//! the `colfer-gen` crate.
//!
//! # Example
//!
//! Generated types implement [`Record`]; a minimal hand-written one
//! shows the shape:
//!
//! ```
//! use colfer::{Error, Record};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Flag {
//!     up: bool,
//! }
//!
//! impl Record for Flag {
//!     fn marshal_len(&self) -> Result<usize, Error> {
//!         Ok(1 + usize::from(self.up))
//!     }
//!
//!     fn marshal(&self, buf: &mut [u8]) -> usize {
//!         let mut i = 0;
//!         if self.up {
//!             buf[i] = 0;
//!             i += 1;
//!         }
//!         buf[i] = 0x7f;
//!         i + 1
//!     }
//!
//!     fn unmarshal_next(&mut self, data: &[u8], _depth: usize) -> Result<usize, Error> {
//!         let end = data.len().min(colfer::SIZE_MAX);
//!         let mut i = 0;
//!         if i >= end {
//!             return Err(Error::Incomplete);
//!         }
//!         let mut header = data[i];
//!         i += 1;
//!         if header == 0 {
//!             self.up = true;
//!             if i >= end {
//!                 return Err(Error::Incomplete);
//!             }
//!             header = data[i];
//!             i += 1;
//!         }
//!         if header != 0x7f {
//!             return Err(Error::SchemaMismatch(header));
//!         }
//!         Ok(i)
//!     }
//! }
//!
//! let flag = Flag { up: true };
//! let serial = flag.marshal_bytes()?;
//! assert_eq!(&serial[..], &[0x00, 0x7f]);
//!
//! let mut decoded = Flag::default();
//! assert_eq!(decoded.unmarshal(&serial)?, 2);
//! assert_eq!(decoded, flag);
//! # Ok::<(), colfer::Error>(())
//! ```

mod error;
mod timestamp;
pub mod wire;

pub use error::Error;
pub use timestamp::Timestamp;

use bytes::BytesMut;

/// The default upper limit for serial octet sizes.
///
/// Generated modules re-declare this bound from their schema options;
/// this value seeds the default.
pub const SIZE_MAX: usize = 16 * 1024 * 1024;

/// The default upper limit for the number of elements in a list.
pub const LIST_MAX: usize = 64 * 1024;

/// The nesting budget for record decoding.
///
/// Optional references permit cyclic schemas, so a crafted input can
/// nest records arbitrarily deep. Decoding charges one level per nested
/// record and rejects anything deeper as a size breach.
pub const DEPTH_MAX: usize = 512;

/// A Colfer record.
///
/// The three required operations are generated per type. `marshal_len`
/// and `marshal` agree octet-for-octet on every value `marshal_len`
/// accepts, and `unmarshal` of a `marshal` output reproduces the value.
pub trait Record: Default {
    /// Returns the exact serial octet size of this value.
    ///
    /// Fails with [`Error::SizeOverflow`] when the serial would exceed
    /// the size limit or any list exceeds the element limit.
    fn marshal_len(&self) -> Result<usize, Error>;

    /// Encodes this value into `buf` and returns the number of octets
    /// written.
    ///
    /// The caller provides at least [`marshal_len`](Self::marshal_len)
    /// octets; limits are not re-checked here. Never allocates.
    fn marshal(&self, buf: &mut [u8]) -> usize;

    /// Decodes one record from `data` with `depth` nesting levels
    /// remaining, returning the number of octets read.
    ///
    /// Generated code calls this for nested records; use
    /// [`unmarshal`](Self::unmarshal) at the top level. On failure the
    /// record may be partially populated; fields the decoder did not
    /// commit are released.
    fn unmarshal_next(&mut self, data: &[u8], depth: usize) -> Result<usize, Error>;

    /// Decodes one record from `data` into this default-initialized
    /// value and returns the number of octets read.
    ///
    /// Input is consumed up to the record's size limit or `data`'s
    /// length, whichever ends first; octets past the terminator are
    /// left untouched.
    fn unmarshal(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.unmarshal_next(data, DEPTH_MAX)
    }

    /// Encodes this value into a freshly allocated buffer.
    fn marshal_bytes(&self) -> Result<BytesMut, Error> {
        let len = self.marshal_len()?;
        let mut buf = BytesMut::zeroed(len);
        let n = self.marshal(&mut buf);
        assert_eq!(n, len);
        Ok(buf)
    }
}
