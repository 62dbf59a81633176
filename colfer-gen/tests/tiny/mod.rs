// Code generated by colfer-gen for package tiny. DO NOT EDIT.

use bytes::Bytes;
use colfer::{Error, Record, wire};

/// The upper limit for serial octet sizes.
pub const SIZE_MAX: usize = 32;

/// The upper limit for the number of elements in a list.
pub const LIST_MAX: usize = 2;

/// Note is a bounded chat line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Note {
    /// Body is the message payload.
    pub body: Bytes,
    /// Tags label the note.
    pub tags: Vec<Bytes>,
    /// Next continues the thread.
    pub next: Option<Box<Note>>,
}

impl Record for Note {
    fn marshal_len(&self) -> Result<usize, Error> {
        let mut l = 1;

        if self.body.len() > SIZE_MAX {
            return Err(Error::SizeOverflow);
        }
        if !self.body.is_empty() {
            l += 1 + wire::varint_len(self.body.len() as u64) + self.body.len();
        }

        if !self.tags.is_empty() {
            if self.tags.len() > LIST_MAX {
                return Err(Error::SizeOverflow);
            }
            for b in &self.tags {
                if b.len() > SIZE_MAX {
                    return Err(Error::SizeOverflow);
                }
                l += wire::varint_len(b.len() as u64) + b.len();
            }
            l += 1 + wire::varint_len(self.tags.len() as u64);
            if l > SIZE_MAX {
                return Err(Error::SizeOverflow);
            }
        }

        if let Some(v) = &self.next {
            l += 1 + v.marshal_len()?;
        }

        if l > SIZE_MAX {
            return Err(Error::SizeOverflow);
        }
        Ok(l)
    }

    fn marshal(&self, buf: &mut [u8]) -> usize {
        let mut i = 0;

        if !self.body.is_empty() {
            buf[i] = 0;
            i = wire::put_varint(buf, i + 1, self.body.len() as u64);
            buf[i..i + self.body.len()].copy_from_slice(&self.body);
            i += self.body.len();
        }

        if !self.tags.is_empty() {
            buf[i] = 1;
            i = wire::put_varint(buf, i + 1, self.tags.len() as u64);
            for b in &self.tags {
                i = wire::put_varint(buf, i, b.len() as u64);
                buf[i..i + b.len()].copy_from_slice(b);
                i += b.len();
            }
        }

        if let Some(v) = &self.next {
            buf[i] = 2;
            i += 1;
            i += v.marshal(&mut buf[i..]);
        }

        buf[i] = 0x7f;
        i + 1
    }

    fn unmarshal_next(&mut self, data: &[u8], depth: usize) -> Result<usize, Error> {
        let Some(depth) = depth.checked_sub(1) else {
            return Err(Error::SizeOverflow);
        };
        let (end, end_err) = if data.len() < SIZE_MAX {
            (data.len(), Error::Incomplete)
        } else {
            (SIZE_MAX, Error::SizeOverflow)
        };
        let mut i = 0;
        if i >= end {
            return Err(end_err);
        }
        let mut header = data[i];
        i += 1;

        if header == 0 {
            if i >= end {
                return Err(end_err);
            }
            let mut n = usize::from(data[i]);
            i += 1;
            if n > 0x7f {
                n &= 0x7f;
                let mut shift = 7;
                loop {
                    if i >= end {
                        return Err(end_err);
                    }
                    let b = usize::from(data[i]);
                    i += 1;
                    if b <= 0x7f || shift == 56 {
                        n |= b.checked_shl(shift).unwrap_or(0);
                        break;
                    }
                    n |= (b & 0x7f).checked_shl(shift).unwrap_or(0);
                    shift += 7;
                }
            }
            if n > SIZE_MAX {
                return Err(Error::SizeOverflow);
            }
            if i + n >= end {
                return Err(end_err);
            }
            self.body = Bytes::copy_from_slice(&data[i..i + n]);
            header = data[i + n];
            i += n + 1;
        }

        if header == 1 {
            if i >= end {
                return Err(end_err);
            }
            let mut n = usize::from(data[i]);
            i += 1;
            if n > 0x7f {
                n &= 0x7f;
                let mut shift = 7;
                loop {
                    if i >= end {
                        return Err(end_err);
                    }
                    let b = usize::from(data[i]);
                    i += 1;
                    if b <= 0x7f || shift == 56 {
                        n |= b.checked_shl(shift).unwrap_or(0);
                        break;
                    }
                    n |= (b & 0x7f).checked_shl(shift).unwrap_or(0);
                    shift += 7;
                }
            }
            if n > LIST_MAX {
                return Err(Error::SizeOverflow);
            }
            let mut list = Vec::with_capacity(n);
            for _ in 0..n {
                if i >= end {
                    return Err(end_err);
                }
                let mut len = usize::from(data[i]);
                i += 1;
                if len > 0x7f {
                    len &= 0x7f;
                    let mut shift = 7;
                    loop {
                        if i >= end {
                            return Err(end_err);
                        }
                        let b = usize::from(data[i]);
                        i += 1;
                        if b <= 0x7f || shift == 56 {
                            len |= b.checked_shl(shift).unwrap_or(0);
                            break;
                        }
                        len |= (b & 0x7f).checked_shl(shift).unwrap_or(0);
                        shift += 7;
                    }
                }
                if len > SIZE_MAX {
                    return Err(Error::SizeOverflow);
                }
                if i + len >= end {
                    return Err(end_err);
                }
                list.push(Bytes::copy_from_slice(&data[i..i + len]));
                i += len;
            }
            self.tags = list;
            if i >= end {
                return Err(end_err);
            }
            header = data[i];
            i += 1;
        }

        if header == 2 {
            let mut v = Note::default();
            match v.unmarshal_next(&data[i..end], depth) {
                Ok(read) => i += read,
                Err(Error::Incomplete) => return Err(end_err),
                Err(e) => return Err(e),
            }
            self.next = Some(Box::new(v));
            if i >= end {
                return Err(end_err);
            }
            header = data[i];
            i += 1;
        }

        if header != 0x7f {
            return Err(Error::SchemaMismatch(header));
        }
        Ok(i)
    }
}
