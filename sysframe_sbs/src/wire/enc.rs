use crate::error::EncodeError;
use crate::value::Value;
use crate::wire::lengths::{byte_width, push_le};
use crate::wire::tags::{Tag, TagByte, PROT_V2};
use crate::wire::MAX_NEST_DEPTH;
use num_bigint::BigInt;

/// Headroom added to the initial estimate, and the minimum step the buffer
/// grows by afterwards.
const ALLOC_SIZE: usize = 128;

pub(super) fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut enc = Encoder::new(estimate(value) + ALLOC_SIZE)?;
    enc.buf.push(PROT_V2);
    enc.value(value)?;
    Ok(enc.buf)
}

/// A shallow guess at the encoded footprint. The buffer grows on demand;
/// the estimate only curbs early reallocations.
fn estimate(value: &Value) -> usize {
    match value {
        Value::Str(s) => s.len() + 3,
        Value::Int(i) => i.bits() as usize / 8 + 3,
        Value::Float(_) => 9,
        Value::Bool(_) | Value::None | Value::Ellipsis => 1,
        Value::Complex { .. } => 17,
        Value::Bytes(b) | Value::ByteArray(b) | Value::MemoryView(b) => b.len() + 3,
        Value::Decimal(s) => s.len() + 3,
        Value::Uuid(_) => 33,
        Value::DateTime(_) | Value::Date(_) | Value::Time(_) => 34,
        Value::TimeDelta { .. } => 13,
        Value::Range { .. } => 32,
        Value::List(items)
        | Value::Tuple(items)
        | Value::Set(items)
        | Value::FrozenSet(items) => items.len() * 4 + 3,
        Value::Deque(items) => items.len() * 4 + 3,
        Value::NamedTuple { type_name, fields } => type_name.len() + fields.len() * 8 + 6,
        Value::Dict(pairs) => pairs.len() * 8 + 3,
        Value::Counter(pairs) => pairs.len() * 8 + 3,
    }
}

struct Encoder {
    buf: Vec<u8>,
    nests: usize,
}

impl Encoder {
    fn new(capacity: usize) -> Result<Self, EncodeError> {
        let mut buf = Vec::new();
        buf.try_reserve(capacity).map_err(|_| EncodeError::NoMemory)?;
        Ok(Self { buf, nests: 0 })
    }

    fn reserve(&mut self, additional: usize) -> Result<(), EncodeError> {
        if self.buf.len() + additional > self.buf.capacity() {
            self.buf
                .try_reserve(additional.max(ALLOC_SIZE))
                .map_err(|_| EncodeError::NoMemory)?;
        }
        Ok(())
    }

    fn push_tag(&mut self, tag: Tag) {
        self.buf.push(*TagByte::from(tag));
    }

    fn enter_nest(&mut self) -> Result<(), EncodeError> {
        self.nests += 1;
        if self.nests > MAX_NEST_DEPTH {
            return Err(EncodeError::NestDepth);
        }
        Ok(())
    }

    fn leave_nest(&mut self) {
        self.nests -= 1;
    }

    /// Write the tag and length of an `E`/`1`/`2`/`D1`/`D2` family, picking
    /// the narrowest variant that holds `len`, then the payload if one was
    /// given. Composites pass `None` and emit their elements themselves.
    ///
    /// Only call this for families that have an empty form; the `E` branch
    /// is taken whenever `len` is zero.
    fn write_e12d(
        &mut self,
        empty_tag: u8,
        len: usize,
        payload: Option<&[u8]>,
    ) -> Result<(), EncodeError> {
        let payload_len = payload.map_or(0, <[u8]>::len);
        let width = byte_width(len);
        match width {
            0 => {
                self.reserve(1)?;
                self.buf.push(empty_tag);
                return Ok(());
            }
            1 | 2 => {
                self.reserve(1 + width + payload_len)?;
                self.buf.push(empty_tag + width as u8);
                push_le(&mut self.buf, len, width);
            }
            3..=255 => {
                self.reserve(2 + width + payload_len)?;
                self.buf.push(empty_tag + 3);
                self.buf.push(width as u8);
                push_le(&mut self.buf, len, width);
            }
            _ => {
                /* A length run wider than 255 bytes cannot arise from an
                in-memory size, but the rule is total. */
                let width_width = byte_width(width);
                if width_width > 255 {
                    return Err(EncodeError::UnrepresentableLength(len));
                }
                self.reserve(2 + width_width + width + payload_len)?;
                self.buf.push(empty_tag + 4);
                self.buf.push(width_width as u8);
                push_le(&mut self.buf, width, width_width);
                push_le(&mut self.buf, len, width);
            }
        }
        if let Some(payload) = payload {
            self.buf.extend_from_slice(payload);
        }
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), EncodeError> {
        self.write_e12d(*TagByte::from(Tag::StrE), s.len(), Some(s.as_bytes()))
    }

    /// Integers get their own width ladder: the payload is the minimal
    /// two's-complement little-endian run, and the first five widths have
    /// dedicated tags instead of length bytes.
    fn write_int(&mut self, i: &BigInt) -> Result<(), EncodeError> {
        let payload = i.to_signed_bytes_le();
        let num_bytes = payload.len();
        if num_bytes <= 5 {
            self.reserve(1 + num_bytes)?;
            self.buf
                .push(*TagByte::from(Tag::Int1) + (num_bytes - 1) as u8);
        } else if num_bytes < 256 {
            self.reserve(2 + num_bytes)?;
            self.push_tag(Tag::IntD1);
            self.buf.push(num_bytes as u8);
        } else {
            let width = byte_width(num_bytes);
            if width > 255 {
                return Err(EncodeError::UnrepresentableLength(num_bytes));
            }
            self.reserve(2 + width + num_bytes)?;
            self.push_tag(Tag::IntD2);
            self.buf.push(width as u8);
            push_le(&mut self.buf, num_bytes, width);
        }
        self.buf.extend_from_slice(&payload);
        Ok(())
    }

    /// A tag, one length byte, then ISO-8601 text.
    fn write_iso(&mut self, tag: Tag, text: &str) -> Result<(), EncodeError> {
        if text.len() > 255 {
            return Err(EncodeError::UnrepresentableLength(text.len()));
        }
        self.reserve(2 + text.len())?;
        self.push_tag(tag);
        self.buf.push(text.len() as u8);
        self.buf.extend_from_slice(text.as_bytes());
        Ok(())
    }

    fn write_static(&mut self, tag: Tag) -> Result<(), EncodeError> {
        self.reserve(1)?;
        self.push_tag(tag);
        Ok(())
    }

    fn value(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Str(s) => self.write_str(s)?,
            Value::Int(i) => self.write_int(i)?,
            Value::Float(f) => {
                self.reserve(9)?;
                self.push_tag(Tag::Float);
                self.buf.extend_from_slice(&f.to_le_bytes());
            }
            Value::Bool(true) => self.write_static(Tag::BoolTrue)?,
            Value::Bool(false) => self.write_static(Tag::BoolFalse)?,
            Value::Complex { real, imag } => {
                self.reserve(17)?;
                self.push_tag(Tag::Complex);
                self.buf.extend_from_slice(&real.to_le_bytes());
                self.buf.extend_from_slice(&imag.to_le_bytes());
            }
            Value::None => self.write_static(Tag::None)?,
            Value::Ellipsis => self.write_static(Tag::Ellipsis)?,
            Value::Bytes(b) => self.write_e12d(*TagByte::from(Tag::BytesE), b.len(), Some(b))?,
            Value::ByteArray(b) => {
                self.write_e12d(*TagByte::from(Tag::ByteArrayE), b.len(), Some(b))?
            }
            Value::MemoryView(b) => {
                self.write_e12d(*TagByte::from(Tag::MemoryViewE), b.len(), Some(b))?
            }
            Value::Decimal(s) => {
                /* Decimal has no empty form. A zero-length literal still
                gets the `1` tag with a zero length byte; anything other
                than a decimal literal is rejected at decode. */
                if s.is_empty() {
                    self.reserve(2)?;
                    self.push_tag(Tag::Decimal1);
                    self.buf.push(0);
                } else {
                    /* The family base sits one code below the `1` tag. */
                    self.write_e12d(
                        *TagByte::from(Tag::Decimal1) - 1,
                        s.len(),
                        Some(s.as_bytes()),
                    )?;
                }
            }
            Value::Uuid(u) => {
                self.reserve(33)?;
                self.push_tag(Tag::Uuid);
                let mut hex = [0u8; 32];
                u.simple().encode_lower(&mut hex);
                self.buf.extend_from_slice(&hex);
            }
            Value::DateTime(dt) => {
                self.write_iso(Tag::DateTime, &dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())?
            }
            Value::Date(d) => self.write_iso(Tag::Date, &d.format("%Y-%m-%d").to_string())?,
            Value::Time(t) => self.write_iso(Tag::Time, &t.format("%H:%M:%S%.f").to_string())?,
            Value::TimeDelta {
                days,
                seconds,
                micros,
            } => {
                self.reserve(13)?;
                self.push_tag(Tag::TimeDelta);
                self.buf.extend_from_slice(&days.to_le_bytes());
                self.buf.extend_from_slice(&seconds.to_le_bytes());
                self.buf.extend_from_slice(&micros.to_le_bytes());
            }
            Value::Range { start, stop, step } => {
                /* The bounds are full encoded integers in sequence, not a
                length-delimited block. */
                self.write_static(Tag::Range)?;
                self.write_int(start)?;
                self.write_int(stop)?;
                self.write_int(step)?;
            }
            Value::List(items) => self.write_seq(Tag::ListE, items)?,
            Value::Tuple(items) => self.write_seq(Tag::TupleE, items)?,
            Value::Set(items) => self.write_seq(Tag::SetE, items)?,
            Value::FrozenSet(items) => self.write_seq(Tag::FrozenSetE, items)?,
            Value::Deque(items) => {
                self.enter_nest()?;
                self.write_e12d(*TagByte::from(Tag::DequeE), items.len(), None)?;
                for item in items {
                    self.value(item)?;
                }
                self.leave_nest();
            }
            Value::NamedTuple { type_name, fields } => {
                self.enter_nest()?;
                self.write_e12d(*TagByte::from(Tag::NamedTupleE), fields.len(), None)?;
                /* The type name follows the count even when there are no
                fields. */
                self.write_str(type_name)?;
                for (name, value) in fields {
                    self.write_str(name)?;
                    self.value(value)?;
                }
                self.leave_nest();
            }
            Value::Dict(pairs) => {
                self.enter_nest()?;
                self.write_e12d(*TagByte::from(Tag::DictE), pairs.len(), None)?;
                for (key, value) in pairs {
                    self.value(key)?;
                    self.value(value)?;
                }
                self.leave_nest();
            }
            Value::Counter(pairs) => {
                self.enter_nest()?;
                self.write_e12d(*TagByte::from(Tag::CounterE), pairs.len(), None)?;
                for (key, count) in pairs {
                    self.value(key)?;
                    self.write_int(count)?;
                }
                self.leave_nest();
            }
        }
        Ok(())
    }

    fn write_seq(&mut self, empty_tag: Tag, items: &[Value]) -> Result<(), EncodeError> {
        self.enter_nest()?;
        self.write_e12d(*TagByte::from(empty_tag), items.len(), None)?;
        for item in items {
            self.value(item)?;
        }
        self.leave_nest();
        Ok(())
    }
}
