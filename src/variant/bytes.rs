//! Byte-sequence interpretation: `fetch_real` (numeric reinterpretation) and
//! `fetch_string` (text decoding) over a raw byte-sequence variant.

use crate::error::{ErrorKind, HvmlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Numeric reinterpretation formats for `fetch_real`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealFormat {
    I8,
    U8,
    I16(Endian),
    U16(Endian),
    I32(Endian),
    U32(Endian),
    I64(Endian),
    U64(Endian),
    F32(Endian),
    F64(Endian),
    /// 80-bit x87 extended precision, stored in a 12-byte (96-bit) slot with
    /// two padding bytes — the platform's `long double` layout.
    F96(Endian),
}

impl RealFormat {
    pub fn width(&self) -> usize {
        match self {
            RealFormat::I8 | RealFormat::U8 => 1,
            RealFormat::I16(_) | RealFormat::U16(_) => 2,
            RealFormat::I32(_) | RealFormat::U32(_) | RealFormat::F32(_) => 4,
            RealFormat::I64(_) | RealFormat::U64(_) | RealFormat::F64(_) => 8,
            RealFormat::F96(_) => 12,
        }
    }
}

/// Resolve a (possibly negative, counting back from the end) offset against a
/// byte sequence of length `len`. Negative values address from the tail:
/// `-1` is the last byte.
fn resolve_offset(len: usize, offset: isize) -> Result<usize, HvmlError> {
    if offset >= 0 {
        Ok(offset as usize)
    } else {
        let back = offset.unsigned_abs();
        len.checked_sub(back)
            .ok_or_else(|| HvmlError::new(ErrorKind::InvalidValue))
    }
}

/// Reinterpret `width(format)` bytes at `offset` in `bytes` as a real number.
/// Offset may be negative to address from the tail of `bytes`.
///
/// Returns `InvalidValue` if the window falls outside `bytes`.
pub fn fetch_real(bytes: &[u8], format: RealFormat, offset: isize) -> Result<f64, HvmlError> {
    let width = format.width();
    let offset = resolve_offset(bytes.len(), offset)?;
    let end = offset
        .checked_add(width)
        .ok_or_else(|| HvmlError::new(ErrorKind::InvalidValue))?;
    let window = bytes
        .get(offset..end)
        .ok_or_else(|| HvmlError::new(ErrorKind::InvalidValue))?;

    Ok(match format {
        RealFormat::I8 => window[0] as i8 as f64,
        RealFormat::U8 => window[0] as f64,
        RealFormat::I16(e) => read_int::<2>(window, e, true) as f64,
        RealFormat::U16(e) => read_int::<2>(window, e, false) as f64,
        RealFormat::I32(e) => read_int::<4>(window, e, true) as f64,
        RealFormat::U32(e) => read_int::<4>(window, e, false) as f64,
        RealFormat::I64(e) => read_int::<8>(window, e, true) as f64,
        RealFormat::U64(e) => read_int::<8>(window, e, false) as u64 as f64,
        RealFormat::F32(e) => {
            let bits = read_int::<4>(window, e, false) as u32;
            f32::from_bits(bits) as f64
        }
        RealFormat::F64(e) => {
            let bits = read_int::<8>(window, e, false) as u64;
            f64::from_bits(bits)
        }
        RealFormat::F96(e) => decode_f96(window, e),
    })
}

fn read_int<const N: usize>(window: &[u8], endian: Endian, signed: bool) -> i64 {
    let mut buf = [0u8; 8];
    match endian {
        Endian::Little => buf[..N].copy_from_slice(&window[..N]),
        Endian::Big => {
            for i in 0..N {
                buf[i] = window[N - 1 - i];
            }
        }
    }
    let raw = u64::from_le_bytes(buf);
    if signed && N < 8 {
        let shift = 64 - N * 8;
        (((raw << shift) as i64) >> shift) as i64
    } else {
        raw as i64
    }
}

/// Decode the 80-bit x87 extended-precision layout: 1 sign bit, 15 exponent
/// bits (bias 16383), 64-bit explicit-leading-bit mantissa, stored in the
/// first 10 of the 12 provided bytes.
fn decode_f96(window: &[u8], endian: Endian) -> f64 {
    let mut le = [0u8; 10];
    match endian {
        Endian::Little => le.copy_from_slice(&window[..10]),
        Endian::Big => {
            for i in 0..10 {
                le[i] = window[9 - i];
            }
        }
    }
    let mantissa = u64::from_le_bytes(le[0..8].try_into().unwrap());
    let sign_exp = u16::from_le_bytes([le[8], le[9]]);
    let sign = if sign_exp & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = (sign_exp & 0x7fff) as i32 - 16383;

    if sign_exp & 0x7fff == 0 && mantissa == 0 {
        return 0.0 * sign;
    }
    // mantissa's top bit is the explicit integer bit (no implicit-1 here).
    let frac = mantissa as f64 / (1u64 << 63) as f64;
    sign * frac * 2f64.powi(exponent)
}

/// Text decoding schemes for `fetch_string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Utf8,
    Utf16(Option<Endian>),
    Utf32(Option<Endian>),
}

/// Decode up to `max_chars` characters (0 = unbounded) of `bytes` starting at
/// `offset` (negative counts back from the tail), using `encoding`. A missing
/// explicit endianness for UTF-16/32 honors a leading byte-order mark,
/// defaulting to big-endian if absent.
pub fn fetch_string(
    bytes: &[u8],
    encoding: StringEncoding,
    offset: isize,
    max_chars: usize,
) -> Result<String, HvmlError> {
    let offset = resolve_offset(bytes.len(), offset)?;
    let slice = bytes
        .get(offset..)
        .ok_or_else(|| HvmlError::new(ErrorKind::InvalidValue))?;

    match encoding {
        StringEncoding::Utf8 => {
            let s = std::str::from_utf8(slice)
                .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
            Ok(take_chars(s, max_chars))
        }
        StringEncoding::Utf16(endian) => {
            let (endian, body) = resolve_bom16(slice, endian);
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| match endian {
                    Endian::Little => u16::from_le_bytes([pair[0], pair[1]]),
                    Endian::Big => u16::from_be_bytes([pair[0], pair[1]]),
                })
                .collect();
            let s = String::from_utf16(&units)
                .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
            Ok(take_chars(&s, max_chars))
        }
        StringEncoding::Utf32(endian) => {
            let (endian, body) = resolve_bom32(slice, endian);
            let mut out = String::new();
            for (i, chunk) in body.chunks_exact(4).enumerate() {
                if max_chars != 0 && i >= max_chars {
                    break;
                }
                let code = match endian {
                    Endian::Little => u32::from_le_bytes(chunk.try_into().unwrap()),
                    Endian::Big => u32::from_be_bytes(chunk.try_into().unwrap()),
                };
                let ch = char::from_u32(code)
                    .ok_or_else(|| HvmlError::new(ErrorKind::InvalidValue))?;
                out.push(ch);
            }
            return Ok(out);
        }
    }
}

fn take_chars(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

fn resolve_bom16(slice: &[u8], endian: Option<Endian>) -> (Endian, &[u8]) {
    if let Some(e) = endian {
        return (e, slice);
    }
    if slice.len() >= 2 {
        if slice[0..2] == [0xFF, 0xFE] {
            return (Endian::Little, &slice[2..]);
        }
        if slice[0..2] == [0xFE, 0xFF] {
            return (Endian::Big, &slice[2..]);
        }
    }
    (Endian::Big, slice)
}

fn resolve_bom32(slice: &[u8], endian: Option<Endian>) -> (Endian, &[u8]) {
    if let Some(e) = endian {
        return (e, slice);
    }
    if slice.len() >= 4 {
        if slice[0..4] == [0xFF, 0xFE, 0x00, 0x00] {
            return (Endian::Little, &slice[4..]);
        }
        if slice[0..4] == [0x00, 0x00, 0xFE, 0xFF] {
            return (Endian::Big, &slice[4..]);
        }
    }
    (Endian::Big, slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_real_i32_little_endian() {
        let bytes = [0x01, 0x00, 0x00, 0x00];
        assert_eq!(
            fetch_real(&bytes, RealFormat::I32(Endian::Little), 0).unwrap(),
            1.0
        );
    }

    #[test]
    fn fetch_real_negative_i16() {
        let bytes = (-5i16).to_le_bytes();
        assert_eq!(
            fetch_real(&bytes, RealFormat::I16(Endian::Little), 0).unwrap(),
            -5.0
        );
    }

    #[test]
    fn fetch_real_out_of_range_is_invalid_value() {
        let bytes = [0u8; 2];
        let err = fetch_real(&bytes, RealFormat::I32(Endian::Little), 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn fetch_string_utf8_roundtrip() {
        let bytes = "caf\u{e9}".as_bytes();
        assert_eq!(fetch_string(bytes, StringEncoding::Utf8, 0, 0).unwrap(), "café");
    }

    #[test]
    fn fetch_real_negative_offset_counts_from_tail() {
        let bytes = [0x00, 0x00, 0x00, 0x2a];
        assert_eq!(
            fetch_real(&bytes, RealFormat::U8, -1).unwrap(),
            0x2a as f64
        );
    }

    #[test]
    fn fetch_string_utf16_le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for u in "hi".encode_utf16() {
            bytes.extend_from_slice(&u.to_le_bytes());
        }
        assert_eq!(
            fetch_string(&bytes, StringEncoding::Utf16(None), 0, 0).unwrap(),
            "hi"
        );
    }
}
