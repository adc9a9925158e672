//! EJSON serialize/parse: serialize then parse reproduces the original
//! value for every non-dynamic, non-native member. EJSON extends JSON with
//! longint/ulongint/longdouble numeric suffixes, an atomstring bareword
//! form, and a handful of byte-sequence literal forms.

use crate::error::{ErrorKind, HvmlError};
use crate::variant::container::{ArrayData, ObjectData, SetData, TupleData};
use crate::variant::Value;
use base64::Engine;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealRepr {
    /// Plain JSON numbers; longint/ulongint/longdouble lose their distinct
    /// tag and round-trip back as `Value::Number`.
    Json,
    /// EJSON numeric suffixes (`123L`, `123UL`, `1.5FL`) preserve the exact
    /// variant kind across a round trip.
    Ejson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BseqRepr {
    HexString,
    Hex,
    Bin,
    BinDots,
    Base64,
}

#[derive(Debug, Clone, Copy)]
pub struct SerializeFlags {
    pub real: RealRepr,
    pub bseq: BseqRepr,
    /// Runtime-only object members (e.g. backing a native) are rendered as
    /// a string placeholder rather than recursed into.
    pub runtime_string: bool,
    /// Compact, no extraneous whitespace.
    pub plain: bool,
}

impl Default for SerializeFlags {
    fn default() -> Self {
        Self {
            real: RealRepr::Ejson,
            bseq: BseqRepr::HexString,
            runtime_string: false,
            plain: true,
        }
    }
}

pub fn serialize(value: &Value, flags: &SerializeFlags) -> String {
    let mut out = String::new();
    write_value(value, flags, &mut out);
    out
}

fn write_value(value: &Value, flags: &SerializeFlags, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Undefined => out.push_str("undefined"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Exception(a) => {
            out.push('!');
            out.push_str(&a.as_str());
        }
        Value::Number(n) => write_number(*n, out),
        Value::LongInt(n) => match flags.real {
            RealRepr::Ejson => out.push_str(&format!("{n}L")),
            RealRepr::Json => write_number(*n as f64, out),
        },
        Value::ULongInt(n) => match flags.real {
            RealRepr::Ejson => out.push_str(&format!("{n}UL")),
            RealRepr::Json => write_number(*n as f64, out),
        },
        Value::LongDouble(n) => match flags.real {
            RealRepr::Ejson => out.push_str(&format!("{}FL", fmt_f64(*n))),
            RealRepr::Json => write_number(*n, out),
        },
        Value::AtomString(a) => {
            out.push('$');
            write_json_string(&a.as_str(), out);
        }
        Value::String(s) => write_json_string(s, out),
        Value::ByteSequence(bytes) => write_bseq(bytes, flags.bseq, out),
        Value::Dynamic(_) => out.push_str("\"<dynamic>\""),
        Value::Native(_) => {
            if flags.runtime_string {
                out.push_str("\"<native>\"");
            } else {
                out.push_str("\"<native>\"");
            }
        }
        Value::Object(obj) => {
            out.push('{');
            for (i, (k, v)) in obj.borrow().entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(k, out);
                out.push(':');
                write_value(v, flags, out);
            }
            out.push('}');
        }
        Value::Array(arr) => {
            out.push('[');
            for (i, v) in arr.borrow().items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(v, flags, out);
            }
            out.push(']');
        }
        Value::Set(set) => {
            out.push_str("[!");
            for (i, v) in set.borrow().items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(v, flags, out);
            }
            out.push(']');
        }
        Value::Tuple(tuple) => {
            out.push_str("[t");
            for v in &tuple.borrow().items {
                out.push(',');
                write_value(v, flags, out);
            }
            out.push(']');
        }
    }
}

fn fmt_f64(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}

fn write_number(n: f64, out: &mut String) {
    out.push_str(&fmt_f64(n));
}

fn write_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_bseq(bytes: &[u8], repr: BseqRepr, out: &mut String) {
    match repr {
        BseqRepr::HexString => {
            out.push_str("h'");
            for b in bytes {
                out.push_str(&format!("{b:02x}"));
            }
            out.push('\'');
        }
        BseqRepr::Hex => {
            out.push_str("x'");
            for b in bytes {
                out.push_str(&format!("{b:02x}"));
            }
            out.push('\'');
        }
        BseqRepr::Bin => {
            out.push_str("b'");
            for b in bytes {
                out.push_str(&format!("{b:08b}"));
            }
            out.push('\'');
        }
        BseqRepr::BinDots => {
            out.push_str("b'");
            for (i, b) in bytes.iter().enumerate() {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(&format!("{b:08b}"));
            }
            out.push('\'');
        }
        BseqRepr::Base64 => {
            out.push_str("b64'");
            out.push_str(&base64::engine::general_purpose::STANDARD.encode(bytes));
            out.push('\'');
        }
    }
}

fn base64_decode(s: &str) -> Result<Vec<u8>, HvmlError> {
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))
}

/// A small recursive-descent EJSON parser, sufficient to round-trip
/// everything [`serialize`] produces for non-dynamic, non-native values.
pub fn parse(input: &str) -> Result<Value, HvmlError> {
    let mut p = Parser {
        bytes: input.as_bytes(),
        pos: 0,
    };
    p.skip_ws();
    let v = p.parse_value()?;
    p.skip_ws();
    if p.pos != p.bytes.len() {
        return Err(HvmlError::new(ErrorKind::InvalidValue));
    }
    Ok(v)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, b: u8) -> Result<(), HvmlError> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(HvmlError::new(ErrorKind::InvalidValue))
        }
    }

    fn parse_value(&mut self) -> Result<Value, HvmlError> {
        self.skip_ws();
        match self.peek() {
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'u') => self.parse_literal("undefined", Value::Undefined),
            Some(b't') => self.parse_literal("true", Value::Boolean(true)),
            Some(b'f') => self.parse_literal("false", Value::Boolean(false)),
            Some(b'"') => Ok(Value::String(Rc::from(self.parse_json_string()?.as_str()))),
            Some(b'$') => {
                self.pos += 1;
                let s = self.parse_json_string()?;
                Ok(Value::AtomString(crate::atom::Atom::new(&s)))
            }
            Some(b'!') => {
                self.pos += 1;
                let s = self.parse_bareword();
                Ok(Value::Exception(crate::atom::Atom::new(&s)))
            }
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array_like(),
            Some(c) if c == b'h' || c == b'x' || c == b'b' => self.parse_bseq(),
            Some(c) if c.is_ascii_digit() || c == b'-' => self.parse_number(),
            _ => Err(HvmlError::new(ErrorKind::InvalidValue)),
        }
    }

    fn parse_literal(&mut self, lit: &str, value: Value) -> Result<Value, HvmlError> {
        if self.bytes[self.pos..].starts_with(lit.as_bytes()) {
            self.pos += lit.len();
            Ok(value)
        } else {
            Err(HvmlError::new(ErrorKind::InvalidValue))
        }
    }

    fn parse_bareword(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_' || c == b':')
        {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    fn parse_json_string(&mut self) -> Result<String, HvmlError> {
        self.expect(b'"')?;
        let mut s = String::new();
        loop {
            match self.peek() {
                None => return Err(HvmlError::new(ErrorKind::InvalidValue)),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'"') => {
                            s.push('"');
                            self.pos += 1;
                        }
                        Some(b'\\') => {
                            s.push('\\');
                            self.pos += 1;
                        }
                        Some(b'n') => {
                            s.push('\n');
                            self.pos += 1;
                        }
                        Some(b't') => {
                            s.push('\t');
                            self.pos += 1;
                        }
                        Some(b'r') => {
                            s.push('\r');
                            self.pos += 1;
                        }
                        Some(b'u') => {
                            self.pos += 1;
                            let hex = std::str::from_utf8(&self.bytes[self.pos..self.pos + 4])
                                .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
                            let code = u32::from_str_radix(hex, 16)
                                .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
                            s.push(
                                char::from_u32(code)
                                    .ok_or_else(|| HvmlError::new(ErrorKind::InvalidValue))?,
                            );
                            self.pos += 4;
                        }
                        _ => return Err(HvmlError::new(ErrorKind::InvalidValue)),
                    }
                }
                Some(_) => {
                    let rest = std::str::from_utf8(&self.bytes[self.pos..])
                        .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
                    let c = rest.chars().next().unwrap();
                    s.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        Ok(s)
    }

    fn parse_number(&mut self) -> Result<Value, HvmlError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == b'.' || c == b'e' || c == b'E' || c == b'+' || c == b'-')
        {
            self.pos += 1;
        }
        let digits = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap();
        let suffix_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let suffix = std::str::from_utf8(&self.bytes[suffix_start..self.pos]).unwrap();
        let n: f64 = digits
            .parse()
            .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
        Ok(match suffix {
            "" => Value::Number(n),
            "L" => Value::LongInt(n as i64),
            "UL" => Value::ULongInt(n as u64),
            "FL" => Value::LongDouble(n),
            _ => return Err(HvmlError::new(ErrorKind::InvalidValue)),
        })
    }

    fn parse_bseq(&mut self) -> Result<Value, HvmlError> {
        let tag_start = self.pos;
        while matches!(self.peek(), Some(c) if c != b'\'') {
            self.pos += 1;
        }
        let tag = std::str::from_utf8(&self.bytes[tag_start..self.pos]).unwrap().to_string();
        self.expect(b'\'')?;
        let body_start = self.pos;
        while self.peek() != Some(b'\'') {
            if self.peek().is_none() {
                return Err(HvmlError::new(ErrorKind::InvalidValue));
            }
            self.pos += 1;
        }
        let body = std::str::from_utf8(&self.bytes[body_start..self.pos]).unwrap();
        self.pos += 1;

        let bytes = match tag.as_str() {
            "h" | "x" => {
                let clean: String = body.chars().filter(|c| !c.is_whitespace()).collect();
                (0..clean.len())
                    .step_by(2)
                    .map(|i| {
                        u8::from_str_radix(&clean[i..i + 2], 16)
                            .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))
                    })
                    .collect::<Result<Vec<u8>, _>>()?
            }
            "b" => {
                let clean: String = body.chars().filter(|&c| c == '0' || c == '1').collect();
                clean
                    .as_bytes()
                    .chunks(8)
                    .map(|chunk| {
                        let s = std::str::from_utf8(chunk).unwrap();
                        u8::from_str_radix(s, 2).unwrap_or(0)
                    })
                    .collect()
            }
            "b64" => base64_decode(body)?,
            _ => return Err(HvmlError::new(ErrorKind::InvalidValue)),
        };
        Ok(Value::ByteSequence(Rc::new(bytes)))
    }

    fn parse_object(&mut self) -> Result<Value, HvmlError> {
        self.expect(b'{')?;
        let mut data = ObjectData::default();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Object(Rc::new(RefCell::new(data))));
        }
        loop {
            self.skip_ws();
            let key = self.parse_json_string()?;
            self.skip_ws();
            self.expect(b':')?;
            let value = self.parse_value()?;
            data.set(key, value)
                .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(HvmlError::new(ErrorKind::InvalidValue)),
            }
        }
        Ok(Value::Object(Rc::new(RefCell::new(data))))
    }

    fn parse_array_like(&mut self) -> Result<Value, HvmlError> {
        self.expect(b'[')?;
        self.skip_ws();
        let is_set = self.peek() == Some(b'!');
        if is_set {
            self.pos += 1;
        }
        let is_tuple = !is_set && self.peek() == Some(b't') && self.bytes.get(self.pos + 1) == Some(&b',');
        if is_tuple {
            self.pos += 1;
        }

        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
        } else {
            loop {
                if is_tuple || !items.is_empty() || is_set {
                    self.skip_ws();
                }
                let v = self.parse_value()?;
                items.push(v);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                    }
                    Some(b']') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(HvmlError::new(ErrorKind::InvalidValue)),
                }
            }
        }

        if is_set {
            let mut set = SetData::anonymous();
            for v in items {
                set.insert(v)
                    .map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
            }
            Ok(Value::Set(Rc::new(RefCell::new(set))))
        } else if is_tuple {
            Ok(Value::Tuple(Rc::new(RefCell::new(TupleData::new(items)))))
        } else {
            let mut arr = ArrayData::default();
            for v in items {
                arr.push(v).map_err(|_| HvmlError::new(ErrorKind::InvalidValue))?;
            }
            Ok(Value::Array(Rc::new(RefCell::new(arr))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_scalars() {
        for v in [
            Value::Null,
            Value::Undefined,
            Value::Boolean(true),
            Value::number(3.5),
            Value::LongInt(-7),
            Value::ULongInt(7),
            Value::string("hi \"there\""),
        ] {
            let s = serialize(&v, &SerializeFlags::default());
            let back = parse(&s).unwrap();
            assert!(crate::variant::isequal(&v, &back), "{s}");
        }
    }

    #[test]
    fn roundtrip_bseq_hex_string() {
        let v = Value::ByteSequence(Rc::new(vec![0xde, 0xad, 0xbe, 0xef]));
        let s = serialize(&v, &SerializeFlags::default());
        assert_eq!(s, "h'deadbeef'");
        let back = parse(&s).unwrap();
        assert!(crate::variant::isequal(&v, &back));
    }

    #[test]
    fn roundtrip_object_and_array() {
        let arr = Value::array(vec![Value::number(1.0), Value::string("x")]);
        let mut obj = ObjectData::default();
        obj.set("a", arr.clone()).unwrap();
        let v = Value::Object(Rc::new(RefCell::new(obj)));
        let s = serialize(&v, &SerializeFlags::default());
        let back = parse(&s).unwrap();
        assert!(crate::variant::isequal(&v, &back));
    }
}
