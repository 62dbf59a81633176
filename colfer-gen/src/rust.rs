//! The Rust backend.
//!
//! Renders a validated [`Package`] as one module of record types: a
//! struct definition per schema struct plus a `colfer::Record` impl
//! whose three bodies walk the fields in tag order. The emitted decode
//! bodies inline their varint loops; the three integer families differ
//! on purpose (32-bit reads discard bits past the word, 64-bit reads
//! treat the octet at shift 56 as final, signed 32-bit reads stop after
//! shift 28) and the bounds checks select the caller's error kind.

use crate::schema::{Field, Kind, Package, SchemaError, Struct};
use std::fmt::{self, Write};

/// Backend options.
///
/// The limits land in the generated module as constants, so a package
/// pins its accept/reject boundaries at generation time.
#[derive(Clone, Debug)]
pub struct Options {
    /// Upper limit for serial octet sizes.
    pub size_max: usize,
    /// Upper limit for the number of elements in a list.
    pub list_max: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            size_max: colfer::SIZE_MAX,
            list_max: colfer::LIST_MAX,
        }
    }
}

/// Renders `package` as one module of record types.
///
/// The module opens with a generated-code banner, declares the limits
/// from `options`, and is ready to be written to a file in a crate that
/// depends on `colfer` and `bytes`.
pub fn generate(package: &Package, options: &Options) -> Result<String, SchemaError> {
    package.validate()?;
    let mut out = String::new();
    render(&mut out, package, options).expect("string formatting does not fail");
    Ok(out)
}

fn render(w: &mut String, p: &Package, opts: &Options) -> fmt::Result {
    let fields = || p.structs.iter().flat_map(|s| s.fields.iter());
    let has_blob = fields().any(|f| matches!(f.kind, Kind::Text | Kind::Binary));
    let has_time = fields().any(|f| matches!(f.kind, Kind::Timestamp));
    let has_list = fields().any(|f| f.list);
    let has_wire = fields().any(|f| {
        f.list
            || !matches!(
                f.kind,
                Kind::Bool | Kind::Uint8 | Kind::Uint16 | Kind::Ref(_)
            )
    });

    writeln!(
        w,
        "// Code generated by colfer-gen for package {}. DO NOT EDIT.",
        p.name
    )?;
    writeln!(w)?;
    if has_blob {
        writeln!(w, "use bytes::Bytes;")?;
    }
    let mut items = vec!["Error", "Record"];
    if has_time {
        items.push("Timestamp");
    }
    if has_wire {
        items.push("wire");
    }
    writeln!(w, "use colfer::{{{}}};", items.join(", "))?;
    writeln!(w)?;
    writeln!(w, "/// The upper limit for serial octet sizes.")?;
    writeln!(w, "pub const SIZE_MAX: usize = {};", opts.size_max)?;
    if has_list {
        writeln!(w)?;
        writeln!(
            w,
            "/// The upper limit for the number of elements in a list."
        )?;
        writeln!(w, "pub const LIST_MAX: usize = {};", opts.list_max)?;
    }
    for s in &p.structs {
        render_struct(w, s)?;
    }
    Ok(())
}

fn render_struct(w: &mut String, s: &Struct) -> fmt::Result {
    let name = type_name(&s.name);
    writeln!(w)?;
    for line in &s.docs {
        writeln!(w, "/// {line}")?;
    }
    writeln!(w, "#[derive(Clone, Debug, Default, PartialEq)]")?;
    writeln!(w, "pub struct {name} {{")?;
    for f in &s.fields {
        for line in &f.docs {
            writeln!(w, "    /// {line}")?;
        }
        writeln!(w, "    pub {}: {},", field_ident(&f.name), field_type(f))?;
    }
    writeln!(w, "}}")?;
    writeln!(w)?;
    writeln!(w, "impl Record for {name} {{")?;
    render_marshal_len(w, s)?;
    writeln!(w)?;
    render_marshal(w, s)?;
    writeln!(w)?;
    render_unmarshal(w, s)?;
    writeln!(w, "}}")?;
    Ok(())
}

fn render_marshal_len(w: &mut String, s: &Struct) -> fmt::Result {
    writeln!(w, "    fn marshal_len(&self) -> Result<usize, Error> {{")?;
    if s.fields.is_empty() {
        writeln!(w, "        Ok(1)")?;
        writeln!(w, "    }}")?;
        return Ok(());
    }
    writeln!(w, "        let mut l = 1;")?;
    for f in &s.fields {
        writeln!(w)?;
        marshal_len_field(w, f)?;
    }
    writeln!(w)?;
    writeln!(
        w,
        "        if l > SIZE_MAX {{
            return Err(Error::SizeOverflow);
        }}
        Ok(l)
    }}"
    )?;
    Ok(())
}

fn marshal_len_field(w: &mut String, f: &Field) -> fmt::Result {
    let n = field_ident(&f.name);
    if f.list {
        return marshal_len_list(w, f, &n);
    }
    match &f.kind {
        Kind::Bool => writeln!(
            w,
            "        if self.{n} {{
            l += 1;
        }}"
        ),
        Kind::Uint8 => writeln!(
            w,
            "        if self.{n} != 0 {{
            l += 2;
        }}"
        ),
        Kind::Uint16 => writeln!(
            w,
            "        if self.{n} != 0 {{
            l += if self.{n} < 256 {{ 2 }} else {{ 3 }};
        }}"
        ),
        Kind::Uint32 => writeln!(
            w,
            "        if self.{n} != 0 {{
            if self.{n} >= 1 << 21 {{
                l += 5;
            }} else {{
                l += 1 + wire::varint_len(u64::from(self.{n}));
            }}
        }}"
        ),
        Kind::Uint64 => writeln!(
            w,
            "        if self.{n} != 0 {{
            if self.{n} >= 1 << 49 {{
                l += 9;
            }} else {{
                l += 1 + wire::varint_len(self.{n});
            }}
        }}"
        ),
        Kind::Int32 => writeln!(
            w,
            "        if self.{n} != 0 {{
            l += 1 + wire::varint_len(u64::from(self.{n}.unsigned_abs()));
        }}"
        ),
        Kind::Int64 => writeln!(
            w,
            "        if self.{n} != 0 {{
            l += 1 + wire::varint_len_capped(self.{n}.unsigned_abs());
        }}"
        ),
        Kind::Float32 => writeln!(
            w,
            "        if self.{n} != 0.0 {{
            l += 5;
        }}"
        ),
        Kind::Float64 => writeln!(
            w,
            "        if self.{n} != 0.0 {{
            l += 9;
        }}"
        ),
        Kind::Timestamp => writeln!(
            w,
            "        if !self.{n}.is_zero() {{
            let (s, _) = self.{n}.normalized();
            l += if s >= 0 && s < 1 << 32 {{ 9 }} else {{ 13 }};
        }}"
        ),
        Kind::Text | Kind::Binary => writeln!(
            w,
            "        if self.{n}.len() > SIZE_MAX {{
            return Err(Error::SizeOverflow);
        }}
        if !self.{n}.is_empty() {{
            l += 1 + wire::varint_len(self.{n}.len() as u64) + self.{n}.len();
        }}"
        ),
        Kind::Ref(_) => writeln!(
            w,
            "        if let Some(v) = &self.{n} {{
            l += 1 + v.marshal_len()?;
        }}"
        ),
    }
}

fn marshal_len_list(w: &mut String, f: &Field, n: &str) -> fmt::Result {
    match &f.kind {
        Kind::Float32 | Kind::Float64 => {
            let width = fixed_width(&f.kind);
            writeln!(
                w,
                "        if !self.{n}.is_empty() {{
            if self.{n}.len() > LIST_MAX {{
                return Err(Error::SizeOverflow);
            }}
            l += 1 + wire::varint_len(self.{n}.len() as u64) + self.{n}.len() * {width};
        }}"
            )
        }
        Kind::Text | Kind::Binary => writeln!(
            w,
            "        if !self.{n}.is_empty() {{
            if self.{n}.len() > LIST_MAX {{
                return Err(Error::SizeOverflow);
            }}
            for b in &self.{n} {{
                if b.len() > SIZE_MAX {{
                    return Err(Error::SizeOverflow);
                }}
                l += wire::varint_len(b.len() as u64) + b.len();
            }}
            l += 1 + wire::varint_len(self.{n}.len() as u64);
            if l > SIZE_MAX {{
                return Err(Error::SizeOverflow);
            }}
        }}"
        ),
        Kind::Ref(_) => writeln!(
            w,
            "        if !self.{n}.is_empty() {{
            if self.{n}.len() > LIST_MAX {{
                return Err(Error::SizeOverflow);
            }}
            for v in &self.{n} {{
                l += v.marshal_len()?;
            }}
            l += 1 + wire::varint_len(self.{n}.len() as u64);
            if l > SIZE_MAX {{
                return Err(Error::SizeOverflow);
            }}
        }}"
        ),
        _ => unreachable!("validated list kind"),
    }
}

fn render_marshal(w: &mut String, s: &Struct) -> fmt::Result {
    writeln!(w, "    fn marshal(&self, buf: &mut [u8]) -> usize {{")?;
    if s.fields.is_empty() {
        writeln!(w, "        buf[0] = 0x7f;")?;
        writeln!(w, "        1")?;
        writeln!(w, "    }}")?;
        return Ok(());
    }
    writeln!(w, "        let mut i = 0;")?;
    for f in &s.fields {
        writeln!(w)?;
        marshal_field(w, f)?;
    }
    writeln!(w)?;
    writeln!(
        w,
        "        buf[i] = 0x7f;
        i + 1
    }}"
    )?;
    Ok(())
}

fn marshal_field(w: &mut String, f: &Field) -> fmt::Result {
    let n = field_ident(&f.name);
    let i = f.index;
    if f.list {
        return marshal_list(w, f, &n, i);
    }
    match &f.kind {
        Kind::Bool => writeln!(
            w,
            "        if self.{n} {{
            buf[i] = {i};
            i += 1;
        }}"
        ),
        Kind::Uint8 => writeln!(
            w,
            "        if self.{n} != 0 {{
            buf[i] = {i};
            buf[i + 1] = self.{n};
            i += 2;
        }}"
        ),
        Kind::Uint16 => writeln!(
            w,
            "        if self.{n} != 0 {{
            if self.{n} < 256 {{
                buf[i] = {i} | 0x80;
                buf[i + 1] = self.{n} as u8;
                i += 2;
            }} else {{
                buf[i] = {i};
                buf[i + 1] = (self.{n} >> 8) as u8;
                buf[i + 2] = self.{n} as u8;
                i += 3;
            }}
        }}"
        ),
        Kind::Uint32 => writeln!(
            w,
            "        if self.{n} != 0 {{
            if self.{n} < 1 << 21 {{
                buf[i] = {i};
                i = wire::put_varint(buf, i + 1, u64::from(self.{n}));
            }} else {{
                buf[i] = {i} | 0x80;
                i = wire::put_u32(buf, i + 1, self.{n});
            }}
        }}"
        ),
        Kind::Uint64 => writeln!(
            w,
            "        if self.{n} != 0 {{
            if self.{n} < 1 << 49 {{
                buf[i] = {i};
                i = wire::put_varint(buf, i + 1, self.{n});
            }} else {{
                buf[i] = {i} | 0x80;
                i = wire::put_u64(buf, i + 1, self.{n});
            }}
        }}"
        ),
        Kind::Int32 => writeln!(
            w,
            "        if self.{n} != 0 {{
            buf[i] = if self.{n} < 0 {{ {i} | 0x80 }} else {{ {i} }};
            i = wire::put_varint(buf, i + 1, u64::from(self.{n}.unsigned_abs()));
        }}"
        ),
        Kind::Int64 => writeln!(
            w,
            "        if self.{n} != 0 {{
            buf[i] = if self.{n} < 0 {{ {i} | 0x80 }} else {{ {i} }};
            i = wire::put_varint_capped(buf, i + 1, self.{n}.unsigned_abs());
        }}"
        ),
        Kind::Float32 => writeln!(
            w,
            "        if self.{n} != 0.0 {{
            buf[i] = {i};
            i = wire::put_u32(buf, i + 1, self.{n}.to_bits());
        }}"
        ),
        Kind::Float64 => writeln!(
            w,
            "        if self.{n} != 0.0 {{
            buf[i] = {i};
            i = wire::put_u64(buf, i + 1, self.{n}.to_bits());
        }}"
        ),
        Kind::Timestamp => writeln!(
            w,
            "        if !self.{n}.is_zero() {{
            let (s, ns) = self.{n}.normalized();
            if s >= 0 && s < 1 << 32 {{
                buf[i] = {i};
                i = wire::put_u32(buf, i + 1, s as u32);
            }} else {{
                buf[i] = {i} | 0x80;
                i = wire::put_u64(buf, i + 1, s as u64);
            }}
            i = wire::put_u32(buf, i, ns);
        }}"
        ),
        Kind::Text | Kind::Binary => writeln!(
            w,
            "        if !self.{n}.is_empty() {{
            buf[i] = {i};
            i = wire::put_varint(buf, i + 1, self.{n}.len() as u64);
            buf[i..i + self.{n}.len()].copy_from_slice(&self.{n});
            i += self.{n}.len();
        }}"
        ),
        Kind::Ref(_) => writeln!(
            w,
            "        if let Some(v) = &self.{n} {{
            buf[i] = {i};
            i += 1;
            i += v.marshal(&mut buf[i..]);
        }}"
        ),
    }
}

fn marshal_list(w: &mut String, f: &Field, n: &str, i: u8) -> fmt::Result {
    match &f.kind {
        Kind::Float32 | Kind::Float64 => {
            let put = fixed_put(&f.kind);
            writeln!(
                w,
                "        if !self.{n}.is_empty() {{
            buf[i] = {i};
            i = wire::put_varint(buf, i + 1, self.{n}.len() as u64);
            for x in &self.{n} {{
                i = wire::{put}(buf, i, x.to_bits());
            }}
        }}"
            )
        }
        Kind::Text | Kind::Binary => writeln!(
            w,
            "        if !self.{n}.is_empty() {{
            buf[i] = {i};
            i = wire::put_varint(buf, i + 1, self.{n}.len() as u64);
            for b in &self.{n} {{
                i = wire::put_varint(buf, i, b.len() as u64);
                buf[i..i + b.len()].copy_from_slice(b);
                i += b.len();
            }}
        }}"
        ),
        Kind::Ref(_) => writeln!(
            w,
            "        if !self.{n}.is_empty() {{
            buf[i] = {i};
            i = wire::put_varint(buf, i + 1, self.{n}.len() as u64);
            for v in &self.{n} {{
                i += v.marshal(&mut buf[i..]);
            }}
        }}"
        ),
        _ => unreachable!("validated list kind"),
    }
}

fn render_unmarshal(w: &mut String, s: &Struct) -> fmt::Result {
    let has_ref = s.fields.iter().any(|f| matches!(f.kind, Kind::Ref(_)));
    let depth = if has_ref { "depth" } else { "_depth" };
    writeln!(
        w,
        "    fn unmarshal_next(&mut self, data: &[u8], {depth}: usize) -> Result<usize, Error> {{"
    )?;
    if has_ref {
        writeln!(
            w,
            "        let Some(depth) = depth.checked_sub(1) else {{
            return Err(Error::SizeOverflow);
        }};"
        )?;
    }
    writeln!(
        w,
        "        let (end, end_err) = if data.len() < SIZE_MAX {{
            (data.len(), Error::Incomplete)
        }} else {{
            (SIZE_MAX, Error::SizeOverflow)
        }};
        let mut i = 0;
        if i >= end {{
            return Err(end_err);
        }}"
    )?;
    if s.fields.is_empty() {
        writeln!(w, "        let header = data[i];")?;
    } else {
        writeln!(w, "        let mut header = data[i];")?;
    }
    writeln!(w, "        i += 1;")?;
    for f in &s.fields {
        writeln!(w)?;
        unmarshal_field(w, f)?;
    }
    writeln!(w)?;
    writeln!(
        w,
        "        if header != 0x7f {{
            return Err(Error::SchemaMismatch(header));
        }}
        Ok(i)
    }}"
    )?;
    Ok(())
}

fn unmarshal_field(w: &mut String, f: &Field) -> fmt::Result {
    let n = field_ident(&f.name);
    let i = f.index;
    if f.list {
        return unmarshal_list(w, f, &n, i);
    }
    match &f.kind {
        Kind::Bool => writeln!(
            w,
            "        if header == {i} {{
            self.{n} = true;
            if i >= end {{
                return Err(end_err);
            }}
            header = data[i];
            i += 1;
        }}"
        ),
        Kind::Uint8 => writeln!(
            w,
            "        if header == {i} {{
            if i + 1 >= end {{
                return Err(end_err);
            }}
            self.{n} = data[i];
            header = data[i + 1];
            i += 2;
        }}"
        ),
        Kind::Uint16 => writeln!(
            w,
            "        if header == {i} {{
            if i + 2 >= end {{
                return Err(end_err);
            }}
            self.{n} = u16::from(data[i]) << 8 | u16::from(data[i + 1]);
            header = data[i + 2];
            i += 3;
        }} else if header == ({i} | 0x80) {{
            if i + 1 >= end {{
                return Err(end_err);
            }}
            self.{n} = u16::from(data[i]);
            header = data[i + 1];
            i += 2;
        }}"
        ),
        Kind::Uint32 => writeln!(
            w,
            "        if header == {i} {{
            if i + 1 >= end {{
                return Err(end_err);
            }}
            let mut x = u32::from(data[i]);
            i += 1;
            if x > 0x7f {{
                x &= 0x7f;
                let mut shift = 7;
                loop {{
                    let b = u32::from(data[i]);
                    i += 1;
                    if i >= end {{
                        return Err(end_err);
                    }}
                    if b <= 0x7f {{
                        x |= b.checked_shl(shift).unwrap_or(0);
                        break;
                    }}
                    x |= (b & 0x7f).checked_shl(shift).unwrap_or(0);
                    shift += 7;
                }}
            }}
            self.{n} = x;
            header = data[i];
            i += 1;
        }} else if header == ({i} | 0x80) {{
            if i + 4 >= end {{
                return Err(end_err);
            }}
            self.{n} = wire::get_u32(data, i);
            header = data[i + 4];
            i += 5;
        }}"
        ),
        Kind::Uint64 => writeln!(
            w,
            "        if header == {i} {{
            if i + 1 >= end {{
                return Err(end_err);
            }}
            let mut x = u64::from(data[i]);
            i += 1;
            if x > 0x7f {{
                x &= 0x7f;
                let mut shift = 7;
                loop {{
                    let b = u64::from(data[i]);
                    i += 1;
                    if i >= end {{
                        return Err(end_err);
                    }}
                    if b <= 0x7f || shift == 56 {{
                        x |= b << shift;
                        break;
                    }}
                    x |= (b & 0x7f) << shift;
                    shift += 7;
                }}
            }}
            self.{n} = x;
            header = data[i];
            i += 1;
        }} else if header == ({i} | 0x80) {{
            if i + 8 >= end {{
                return Err(end_err);
            }}
            self.{n} = wire::get_u64(data, i);
            header = data[i + 8];
            i += 9;
        }}"
        ),
        Kind::Int32 => writeln!(
            w,
            "        if (header & 0x7f) == {i} {{
            if i + 1 >= end {{
                return Err(end_err);
            }}
            let mut x = u32::from(data[i]);
            i += 1;
            if x > 0x7f {{
                x &= 0x7f;
                let mut shift = 7;
                while shift < 35 {{
                    let b = u32::from(data[i]);
                    i += 1;
                    if i >= end {{
                        return Err(end_err);
                    }}
                    if b <= 0x7f {{
                        x |= b.checked_shl(shift).unwrap_or(0);
                        break;
                    }}
                    x |= (b & 0x7f).checked_shl(shift).unwrap_or(0);
                    shift += 7;
                }}
            }}
            if (header & 0x80) != 0 {{
                x = x.wrapping_neg();
            }}
            self.{n} = x as i32;
            header = data[i];
            i += 1;
        }}"
        ),
        Kind::Int64 => writeln!(
            w,
            "        if (header & 0x7f) == {i} {{
            if i + 1 >= end {{
                return Err(end_err);
            }}
            let mut x = u64::from(data[i]);
            i += 1;
            if x > 0x7f {{
                x &= 0x7f;
                let mut shift = 7;
                loop {{
                    let b = u64::from(data[i]);
                    i += 1;
                    if i >= end {{
                        return Err(end_err);
                    }}
                    if b <= 0x7f || shift == 56 {{
                        x |= b << shift;
                        break;
                    }}
                    x |= (b & 0x7f) << shift;
                    shift += 7;
                }}
            }}
            if (header & 0x80) != 0 {{
                x = x.wrapping_neg();
            }}
            self.{n} = x as i64;
            header = data[i];
            i += 1;
        }}"
        ),
        Kind::Float32 => writeln!(
            w,
            "        if header == {i} {{
            if i + 4 >= end {{
                return Err(end_err);
            }}
            self.{n} = f32::from_bits(wire::get_u32(data, i));
            header = data[i + 4];
            i += 5;
        }}"
        ),
        Kind::Float64 => writeln!(
            w,
            "        if header == {i} {{
            if i + 8 >= end {{
                return Err(end_err);
            }}
            self.{n} = f64::from_bits(wire::get_u64(data, i));
            header = data[i + 8];
            i += 9;
        }}"
        ),
        Kind::Timestamp => writeln!(
            w,
            "        if (header & 0x7f) == {i} {{
            if (header & 0x80) != 0 {{
                if i + 12 >= end {{
                    return Err(end_err);
                }}
                self.{n}.seconds = wire::get_u64(data, i) as i64;
                i += 8;
            }} else {{
                if i + 8 >= end {{
                    return Err(end_err);
                }}
                self.{n}.seconds = i64::from(wire::get_u32(data, i));
                i += 4;
            }}
            self.{n}.nanos = wire::get_u32(data, i) as i32;
            header = data[i + 4];
            i += 5;
        }}"
        ),
        Kind::Text | Kind::Binary => {
            writeln!(w, "        if header == {i} {{")?;
            length_varint(w, "            ", "n")?;
            writeln!(
                w,
                "            if n > SIZE_MAX {{
                return Err(Error::SizeOverflow);
            }}
            if i + n >= end {{
                return Err(end_err);
            }}
            self.{n} = Bytes::copy_from_slice(&data[i..i + n]);
            header = data[i + n];
            i += n + 1;
        }}"
            )
        }
        Kind::Ref(target) => {
            let t = type_name(target);
            writeln!(
                w,
                "        if header == {i} {{
            let mut v = {t}::default();
            match v.unmarshal_next(&data[i..end], depth) {{
                Ok(read) => i += read,
                Err(Error::Incomplete) => return Err(end_err),
                Err(e) => return Err(e),
            }}
            self.{n} = Some(Box::new(v));
            if i >= end {{
                return Err(end_err);
            }}
            header = data[i];
            i += 1;
        }}"
            )
        }
    }
}

fn unmarshal_list(w: &mut String, f: &Field, n: &str, i: u8) -> fmt::Result {
    writeln!(w, "        if header == {i} {{")?;
    length_varint(w, "            ", "n")?;
    writeln!(
        w,
        "            if n > LIST_MAX {{
                return Err(Error::SizeOverflow);
            }}"
    )?;
    match &f.kind {
        Kind::Float32 | Kind::Float64 => {
            let width = fixed_width(&f.kind);
            let get = fixed_get(&f.kind);
            let elem = if matches!(f.kind, Kind::Float32) {
                "f32"
            } else {
                "f64"
            };
            writeln!(
                w,
                "            if i + n * {width} >= end {{
                return Err(end_err);
            }}
            let mut list = Vec::with_capacity(n);
            for _ in 0..n {{
                list.push({elem}::from_bits(wire::{get}(data, i)));
                i += {width};
            }}
            self.{n} = list;
            header = data[i];
            i += 1;
        }}"
            )
        }
        Kind::Text | Kind::Binary => {
            writeln!(
                w,
                "            let mut list = Vec::with_capacity(n);
            for _ in 0..n {{"
            )?;
            length_varint(w, "                ", "len")?;
            writeln!(
                w,
                "                if len > SIZE_MAX {{
                    return Err(Error::SizeOverflow);
                }}
                if i + len >= end {{
                    return Err(end_err);
                }}
                list.push(Bytes::copy_from_slice(&data[i..i + len]));
                i += len;
            }}
            self.{n} = list;
            if i >= end {{
                return Err(end_err);
            }}
            header = data[i];
            i += 1;
        }}"
            )
        }
        Kind::Ref(target) => {
            let t = type_name(target);
            writeln!(
                w,
                "            let mut list = Vec::with_capacity(n);
            for _ in 0..n {{
                let mut v = {t}::default();
                match v.unmarshal_next(&data[i..end], depth) {{
                    Ok(read) => i += read,
                    Err(Error::Incomplete) => return Err(end_err),
                    Err(e) => return Err(e),
                }}
                list.push(v);
            }}
            self.{n} = list;
            if i >= end {{
                return Err(end_err);
            }}
            header = data[i];
            i += 1;
        }}"
            )
        }
        _ => unreachable!("validated list kind"),
    }
}

/// Emits a bounds-checked length read: a varint into `usize` where the
/// octet at shift 56 is final regardless of its continuation bit, so
/// crafted overlong lengths saturate into the limit checks instead of
/// wrapping.
fn length_varint(w: &mut String, pad: &str, var: &str) -> fmt::Result {
    writeln!(w, "{pad}if i >= end {{")?;
    writeln!(w, "{pad}    return Err(end_err);")?;
    writeln!(w, "{pad}}}")?;
    writeln!(w, "{pad}let mut {var} = usize::from(data[i]);")?;
    writeln!(w, "{pad}i += 1;")?;
    writeln!(w, "{pad}if {var} > 0x7f {{")?;
    writeln!(w, "{pad}    {var} &= 0x7f;")?;
    writeln!(w, "{pad}    let mut shift = 7;")?;
    writeln!(w, "{pad}    loop {{")?;
    writeln!(w, "{pad}        if i >= end {{")?;
    writeln!(w, "{pad}            return Err(end_err);")?;
    writeln!(w, "{pad}        }}")?;
    writeln!(w, "{pad}        let b = usize::from(data[i]);")?;
    writeln!(w, "{pad}        i += 1;")?;
    writeln!(w, "{pad}        if b <= 0x7f || shift == 56 {{")?;
    writeln!(w, "{pad}            {var} |= b.checked_shl(shift).unwrap_or(0);")?;
    writeln!(w, "{pad}            break;")?;
    writeln!(w, "{pad}        }}")?;
    writeln!(
        w,
        "{pad}        {var} |= (b & 0x7f).checked_shl(shift).unwrap_or(0);"
    )?;
    writeln!(w, "{pad}        shift += 7;")?;
    writeln!(w, "{pad}    }}")?;
    writeln!(w, "{pad}}}")?;
    Ok(())
}

fn fixed_width(kind: &Kind) -> usize {
    match kind {
        Kind::Float32 => 4,
        Kind::Float64 => 8,
        _ => unreachable!("fixed-width kind"),
    }
}

fn fixed_put(kind: &Kind) -> &'static str {
    match kind {
        Kind::Float32 => "put_u32",
        Kind::Float64 => "put_u64",
        _ => unreachable!("fixed-width kind"),
    }
}

fn fixed_get(kind: &Kind) -> &'static str {
    match kind {
        Kind::Float32 => "get_u32",
        Kind::Float64 => "get_u64",
        _ => unreachable!("fixed-width kind"),
    }
}

fn field_type(f: &Field) -> String {
    let elem = match &f.kind {
        Kind::Bool => "bool",
        Kind::Uint8 => "u8",
        Kind::Uint16 => "u16",
        Kind::Uint32 => "u32",
        Kind::Uint64 => "u64",
        Kind::Int32 => "i32",
        Kind::Int64 => "i64",
        Kind::Float32 => "f32",
        Kind::Float64 => "f64",
        Kind::Timestamp => "Timestamp",
        Kind::Text | Kind::Binary => "Bytes",
        Kind::Ref(target) => {
            let t = type_name(target);
            return if f.list {
                format!("Vec<{t}>")
            } else {
                format!("Option<Box<{t}>>")
            };
        }
    };
    if f.list {
        format!("Vec<{elem}>")
    } else {
        elem.to_owned()
    }
}

/// Reserved words that cannot name a field verbatim.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Renders a schema field name as a Rust field identifier.
fn field_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    if KEYWORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// Renders a schema struct name as a Rust type name.
fn type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if c == '_' {
            upper = true;
            continue;
        }
        if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
