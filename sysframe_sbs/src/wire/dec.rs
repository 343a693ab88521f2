use crate::error::DecodeError;
use crate::value::Value;
use crate::wire::lengths::read_le;
use crate::wire::tags::{Tag, TagByte};
use crate::wire::MAX_NEST_DEPTH;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use std::collections::VecDeque;
use std::str;
use uuid::Uuid;

/// A cursor over an encoded buffer. Every read is preceded by a bounds
/// check; a failed check aborts the decode with no partial result.
///
/// The low-level readers and the scalar body parsers are shared with the
/// legacy decoder, which walks the same byte stream under an older tag
/// table.
pub(super) struct Decoder<'a> {
    bytes: &'a [u8],
    offset: usize,
    nests: usize,
}

impl<'a> Decoder<'a> {
    pub(super) fn new(bytes: &'a [u8], offset: usize) -> Self {
        Self {
            bytes,
            offset,
            nests: 0,
        }
    }

    /// Decode one value; anything after it is ignored.
    pub(super) fn decode_single(mut self) -> Result<Value, DecodeError> {
        self.value()
    }

    pub(super) fn offset(&self) -> usize {
        self.offset
    }

    pub(super) fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        match self.offset.checked_add(needed) {
            Some(end) if end <= self.bytes.len() => Ok(()),
            _ => Err(DecodeError::Truncated {
                offset: self.offset,
                needed,
                len: self.bytes.len(),
            }),
        }
    }

    pub(super) fn take(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(count)?;
        let bytes = &self.bytes[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    pub(super) fn take_byte(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    /// Read a little-endian length spanning `width` bytes. A length wider
    /// than the platform can address can never be satisfied by the buffer,
    /// so it is reported as a truncation.
    pub(super) fn read_len(&mut self, width: usize) -> Result<usize, DecodeError> {
        let at = self.offset;
        let bytes = self.take(width)?;
        read_le(bytes).ok_or(DecodeError::Truncated {
            offset: at,
            needed: usize::MAX,
            len: self.bytes.len(),
        })
    }

    /// Dynamic-1 length: one width byte, then that many length bytes.
    pub(super) fn dyn1_len(&mut self) -> Result<usize, DecodeError> {
        let width = self.take_byte()? as usize;
        self.read_len(width)
    }

    /// Dynamic-2 length: a width-of-width byte, the width, then the length.
    pub(super) fn dyn2_len(&mut self) -> Result<usize, DecodeError> {
        let width_width = self.take_byte()? as usize;
        let width = self.read_len(width_width)?;
        self.read_len(width)
    }

    /// Length of an `E`/`1`/`2`/`D1`/`D2` family member, read according to
    /// the tag's distance from its family base.
    fn family_len(&mut self, tag: Tag) -> Result<usize, DecodeError> {
        match tag as u8 - tag.family_base() {
            0 => Ok(0),
            width @ (1 | 2) => self.read_len(width as usize),
            3 => self.dyn1_len(),
            _ => self.dyn2_len(),
        }
    }

    pub(super) fn enter_nest(&mut self) -> Result<(), DecodeError> {
        self.nests += 1;
        if self.nests > MAX_NEST_DEPTH {
            return Err(DecodeError::NestDepth);
        }
        Ok(())
    }

    pub(super) fn leave_nest(&mut self) {
        self.nests -= 1;
    }

    fn value(&mut self) -> Result<Value, DecodeError> {
        let tag_offset = self.offset;
        let raw = TagByte::from(self.take_byte()?);
        let tag = raw.decode().ok_or(DecodeError::InvalidTag {
            tag: *raw,
            offset: tag_offset,
        })?;

        let value = match tag {
            Tag::StrE | Tag::Str1 | Tag::Str2 | Tag::StrD1 | Tag::StrD2 => {
                let len = self.family_len(tag)?;
                Value::Str(self.str_body(len)?)
            }

            Tag::Int1 => Value::Int(self.int_body(1)?),
            Tag::Int2 => Value::Int(self.int_body(2)?),
            Tag::Int3 => Value::Int(self.int_body(3)?),
            Tag::Int4 => Value::Int(self.int_body(4)?),
            Tag::Int5 => Value::Int(self.int_body(5)?),
            Tag::IntD1 => {
                let num_bytes = self.take_byte()? as usize;
                Value::Int(self.int_body(num_bytes)?)
            }
            Tag::IntD2 => {
                let width = self.take_byte()? as usize;
                let num_bytes = self.read_len(width)?;
                Value::Int(self.int_body(num_bytes)?)
            }

            Tag::Float => Value::Float(self.f64_body()?),
            Tag::BoolTrue => Value::Bool(true),
            Tag::BoolFalse => Value::Bool(false),
            Tag::Complex => {
                let real = self.f64_body()?;
                let imag = self.f64_body()?;
                Value::Complex { real, imag }
            }
            Tag::None => Value::None,
            Tag::Ellipsis => Value::Ellipsis,

            Tag::BytesE | Tag::Bytes1 | Tag::Bytes2 | Tag::BytesD1 | Tag::BytesD2 => {
                let len = self.family_len(tag)?;
                Value::Bytes(self.take(len)?.to_vec())
            }
            Tag::ByteArrayE
            | Tag::ByteArray1
            | Tag::ByteArray2
            | Tag::ByteArrayD1
            | Tag::ByteArrayD2 => {
                let len = self.family_len(tag)?;
                Value::ByteArray(self.take(len)?.to_vec())
            }
            Tag::MemoryViewE
            | Tag::MemoryView1
            | Tag::MemoryView2
            | Tag::MemoryViewD1
            | Tag::MemoryViewD2 => {
                let len = self.family_len(tag)?;
                Value::MemoryView(self.take(len)?.to_vec())
            }

            Tag::DateTime => Value::DateTime(self.datetime_body()?),
            Tag::Date => Value::Date(self.date_body()?),
            Tag::Time => Value::Time(self.time_body()?),
            Tag::TimeDelta => {
                let days = self.i32_body()?;
                let seconds = self.i32_body()?;
                let micros = self.i32_body()?;
                Value::TimeDelta {
                    days,
                    seconds,
                    micros,
                }
            }

            Tag::Uuid => Value::Uuid(self.uuid_body()?),

            Tag::Decimal1 | Tag::Decimal2 | Tag::DecimalD1 | Tag::DecimalD2 => {
                let len = self.family_len(tag)?;
                Value::Decimal(self.decimal_body(len)?)
            }

            Tag::Range => {
                let start = self.int_value("range bound")?;
                let stop = self.int_value("range bound")?;
                let step = self.int_value("range bound")?;
                Value::Range { start, stop, step }
            }

            Tag::ListE | Tag::List1 | Tag::List2 | Tag::ListD1 | Tag::ListD2 => {
                let count = self.family_len(tag)?;
                Value::List(self.items(count)?)
            }
            Tag::TupleE | Tag::Tuple1 | Tag::Tuple2 | Tag::TupleD1 | Tag::TupleD2 => {
                let count = self.family_len(tag)?;
                Value::Tuple(self.items(count)?)
            }
            Tag::SetE | Tag::Set1 | Tag::Set2 | Tag::SetD1 | Tag::SetD2 => {
                let count = self.family_len(tag)?;
                Value::Set(self.items(count)?)
            }
            Tag::FrozenSetE
            | Tag::FrozenSet1
            | Tag::FrozenSet2
            | Tag::FrozenSetD1
            | Tag::FrozenSetD2 => {
                let count = self.family_len(tag)?;
                Value::FrozenSet(self.items(count)?)
            }
            Tag::DequeE | Tag::Deque1 | Tag::Deque2 | Tag::DequeD1 | Tag::DequeD2 => {
                let count = self.family_len(tag)?;
                Value::Deque(VecDeque::from(self.items(count)?))
            }

            Tag::DictE | Tag::Dict1 | Tag::Dict2 | Tag::DictD1 | Tag::DictD2 => {
                let count = self.family_len(tag)?;
                Value::Dict(self.pairs(count)?)
            }
            Tag::CounterE | Tag::Counter1 | Tag::Counter2 | Tag::CounterD1 | Tag::CounterD2 => {
                let count = self.family_len(tag)?;
                Value::Counter(self.counts(count)?)
            }

            Tag::NamedTupleE
            | Tag::NamedTuple1
            | Tag::NamedTuple2
            | Tag::NamedTupleD1
            | Tag::NamedTupleD2 => {
                let count = self.family_len(tag)?;
                self.named_tuple(count)?
            }
        };

        Ok(value)
    }

    /* Scalar bodies, shared with the legacy decoder. */

    pub(super) fn str_body(&mut self, len: usize) -> Result<String, DecodeError> {
        let bytes = self.take(len)?;
        str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| DecodeError::InvalidEncoding("UTF-8 text"))
    }

    pub(super) fn int_body(&mut self, num_bytes: usize) -> Result<BigInt, DecodeError> {
        let bytes = self.take(num_bytes)?;
        Ok(BigInt::from_signed_bytes_le(bytes))
    }

    pub(super) fn f64_body(&mut self) -> Result<f64, DecodeError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(f64::from_le_bytes(bytes))
    }

    pub(super) fn i32_body(&mut self) -> Result<i32, DecodeError> {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(i32::from_le_bytes(bytes))
    }

    /// One length byte, then ISO-8601 text.
    fn iso_body(&mut self) -> Result<String, DecodeError> {
        let len = self.take_byte()? as usize;
        let bytes = self.take(len)?;
        str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| DecodeError::InvalidEncoding("ISO-8601 text"))
    }

    pub(super) fn datetime_body(&mut self) -> Result<NaiveDateTime, DecodeError> {
        let text = self.iso_body()?;
        text.parse().map_err(|e| construct("datetime", e))
    }

    pub(super) fn date_body(&mut self) -> Result<NaiveDate, DecodeError> {
        let text = self.iso_body()?;
        text.parse().map_err(|e| construct("date", e))
    }

    pub(super) fn time_body(&mut self) -> Result<NaiveTime, DecodeError> {
        let text = self.iso_body()?;
        text.parse().map_err(|e| construct("time", e))
    }

    pub(super) fn uuid_body(&mut self) -> Result<Uuid, DecodeError> {
        let hex = str::from_utf8(self.take(32)?)
            .map_err(|_| DecodeError::InvalidEncoding("UUID hex"))?;
        Uuid::parse_str(hex).map_err(|e| construct("uuid", e))
    }

    pub(super) fn decimal_body(&mut self, len: usize) -> Result<String, DecodeError> {
        let text = self.str_body(len)?;
        if !valid_decimal(&text) {
            return Err(DecodeError::Construct {
                kind: "decimal",
                reason: format!("not a decimal literal: {text:?}"),
            });
        }
        Ok(text)
    }

    /* Composite bodies of the current protocol. */

    fn int_value(&mut self, what: &'static str) -> Result<BigInt, DecodeError> {
        match self.value()? {
            Value::Int(i) => Ok(i),
            other => Err(DecodeError::Construct {
                kind: what,
                reason: format!("expected an integer, decoded {other:?}"),
            }),
        }
    }

    fn str_value(&mut self, what: &'static str) -> Result<String, DecodeError> {
        match self.value()? {
            Value::Str(s) => Ok(s),
            other => Err(DecodeError::Construct {
                kind: what,
                reason: format!("expected a string, decoded {other:?}"),
            }),
        }
    }

    fn items(&mut self, count: usize) -> Result<Vec<Value>, DecodeError> {
        /* Every element takes at least one byte, so the count itself must
        fit in the remaining buffer. */
        self.ensure(count)?;
        self.enter_nest()?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.value()?);
        }
        self.leave_nest();
        Ok(items)
    }

    fn pairs(&mut self, count: usize) -> Result<Vec<(Value, Value)>, DecodeError> {
        self.ensure(count.saturating_mul(2))?;
        self.enter_nest()?;
        let mut pairs = Vec::with_capacity(count);
        for _ in 0..count {
            let key = self.value()?;
            let value = self.value()?;
            pairs.push((key, value));
        }
        self.leave_nest();
        Ok(pairs)
    }

    fn counts(&mut self, count: usize) -> Result<Vec<(Value, BigInt)>, DecodeError> {
        self.ensure(count.saturating_mul(2))?;
        self.enter_nest()?;
        let mut pairs = Vec::with_capacity(count);
        for _ in 0..count {
            let key = self.value()?;
            let n = self.int_value("counter count")?;
            pairs.push((key, n));
        }
        self.leave_nest();
        Ok(pairs)
    }

    fn named_tuple(&mut self, count: usize) -> Result<Value, DecodeError> {
        self.ensure(count.saturating_mul(2))?;
        self.enter_nest()?;
        let type_name = self.str_value("named tuple type name")?;
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            let name = self.str_value("named tuple field name")?;
            let value = self.value()?;
            fields.push((name, value));
        }
        self.leave_nest();
        Ok(Value::NamedTuple { type_name, fields })
    }
}

pub(super) fn construct(kind: &'static str, err: impl std::fmt::Display) -> DecodeError {
    DecodeError::Construct {
        kind,
        reason: err.to_string(),
    }
}

/// Accepts the literals an arbitrary-precision decimal constructor accepts:
/// an optional sign, digits with at most one dot, an optional exponent, or
/// one of the special values.
fn valid_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let lower = unsigned.to_ascii_lowercase();
    if matches!(lower.as_str(), "inf" | "infinity" | "nan" | "snan") {
        return true;
    }

    let (mantissa, exponent) = match lower.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (lower.as_str(), None),
    };

    let mut digits = 0;
    let mut dots = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }

    if let Some(exponent) = exponent {
        let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    true
}
