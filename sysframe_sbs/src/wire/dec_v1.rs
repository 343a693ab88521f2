//! Read-only decoder for the legacy protocol.
//!
//! The old grammar shares the current protocol's philosophy but carries its
//! own tag table: most families have a single dynamic width variant `D`
//! (one width byte, then that many length bytes) instead of `D1`/`D2`, the
//! codes sit at different numbers, and the Range, NamedTuple, Deque, and
//! Counter families do not exist yet. Buffers in this protocol are still
//! decoded; they are never produced.

use super::dec::Decoder;
use crate::error::DecodeError;
use crate::value::Value;

/* The frozen legacy tag table. */

const STR_E: u8 = 0;
const STR_1: u8 = 1;
const STR_2: u8 = 2;
const STR_D: u8 = 3;

const INT_1: u8 = 4;
const INT_2: u8 = 5;
const INT_3: u8 = 6;
const INT_4: u8 = 7;
const INT_5: u8 = 8;
const INT_D1: u8 = 9;
const INT_D2: u8 = 10;

const FLOAT_S: u8 = 11;
const BOOL_T: u8 = 12;
const BOOL_F: u8 = 13;
const COMPLEX_S: u8 = 14;
const NONE_S: u8 = 15;
const ELLIPSIS_S: u8 = 16;

const BYTES_E: u8 = 17;
const BYTES_1: u8 = 18;
const BYTES_2: u8 = 19;
const BYTES_D: u8 = 20;

const BYTEARR_E: u8 = 21;
const BYTEARR_1: u8 = 22;
const BYTEARR_2: u8 = 23;
const BYTEARR_D: u8 = 24;

const LIST_E: u8 = 25;
const LIST_1: u8 = 26;
const LIST_2: u8 = 27;
const LIST_D: u8 = 28;

const SET_E: u8 = 29;
const SET_1: u8 = 30;
const SET_2: u8 = 31;
const SET_D: u8 = 32;

const TUPLE_E: u8 = 33;
const TUPLE_1: u8 = 34;
const TUPLE_2: u8 = 35;
const TUPLE_D: u8 = 36;

const DICT_E: u8 = 37;
const DICT_1: u8 = 38;
const DICT_2: u8 = 39;
const DICT_D: u8 = 40;

const FSET_E: u8 = 41;
const FSET_1: u8 = 42;
const FSET_2: u8 = 43;
const FSET_D: u8 = 44;

const DATETIME_DT: u8 = 45;
const DATETIME_TD: u8 = 46;
const DATETIME_D: u8 = 47;
const DATETIME_T: u8 = 48;

const UUID_S: u8 = 49;

const MEMVIEW_E: u8 = 50;
const MEMVIEW_1: u8 = 51;
const MEMVIEW_2: u8 = 52;
const MEMVIEW_D: u8 = 53;

const DECIMAL_1: u8 = 54;
const DECIMAL_2: u8 = 55;
const DECIMAL_D: u8 = 56;

pub(super) fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut d = Decoder::new(bytes, 1);
    value(&mut d)
}

fn value(d: &mut Decoder<'_>) -> Result<Value, DecodeError> {
    let tag_offset = d.offset();
    let tag = d.take_byte()?;

    let value = match tag {
        STR_E => Value::Str(String::new()),
        STR_1 | STR_2 | STR_D => {
            let len = family_len(d, tag - STR_E)?;
            Value::Str(d.str_body(len)?)
        }

        INT_1..=INT_5 => Value::Int(d.int_body((tag - INT_1) as usize + 1)?),
        INT_D1 => {
            let num_bytes = d.take_byte()? as usize;
            Value::Int(d.int_body(num_bytes)?)
        }
        INT_D2 => {
            /* The legacy dynamic-2 integer always spends exactly two bytes
            on the payload length. */
            let num_bytes = d.read_len(2)?;
            Value::Int(d.int_body(num_bytes)?)
        }

        FLOAT_S => Value::Float(d.f64_body()?),
        BOOL_T => Value::Bool(true),
        BOOL_F => Value::Bool(false),
        COMPLEX_S => {
            let real = d.f64_body()?;
            let imag = d.f64_body()?;
            Value::Complex { real, imag }
        }
        NONE_S => Value::None,
        ELLIPSIS_S => Value::Ellipsis,

        BYTES_E..=BYTES_D => {
            let len = family_len(d, tag - BYTES_E)?;
            Value::Bytes(d.take(len)?.to_vec())
        }
        BYTEARR_E..=BYTEARR_D => {
            let len = family_len(d, tag - BYTEARR_E)?;
            Value::ByteArray(d.take(len)?.to_vec())
        }

        LIST_E..=LIST_D => {
            let count = family_len(d, tag - LIST_E)?;
            Value::List(items(d, count)?)
        }
        SET_E..=SET_D => {
            let count = family_len(d, tag - SET_E)?;
            Value::Set(items(d, count)?)
        }
        TUPLE_E..=TUPLE_D => {
            let count = family_len(d, tag - TUPLE_E)?;
            Value::Tuple(items(d, count)?)
        }
        DICT_E..=DICT_D => {
            let count = family_len(d, tag - DICT_E)?;
            Value::Dict(pairs(d, count)?)
        }
        FSET_E..=FSET_D => {
            let count = family_len(d, tag - FSET_E)?;
            Value::FrozenSet(items(d, count)?)
        }

        DATETIME_DT => Value::DateTime(d.datetime_body()?),
        DATETIME_TD => {
            let days = d.i32_body()?;
            let seconds = d.i32_body()?;
            let micros = d.i32_body()?;
            Value::TimeDelta {
                days,
                seconds,
                micros,
            }
        }
        DATETIME_D => Value::Date(d.date_body()?),
        DATETIME_T => Value::Time(d.time_body()?),

        UUID_S => Value::Uuid(d.uuid_body()?),

        MEMVIEW_E..=MEMVIEW_D => {
            let len = family_len(d, tag - MEMVIEW_E)?;
            Value::MemoryView(d.take(len)?.to_vec())
        }

        DECIMAL_1 | DECIMAL_2 | DECIMAL_D => {
            let len = family_len(d, tag - (DECIMAL_1 - 1))?;
            Value::Decimal(d.decimal_body(len)?)
        }

        unknown => {
            return Err(DecodeError::InvalidTag {
                tag: unknown,
                offset: tag_offset,
            })
        }
    };

    Ok(value)
}

/// Length of an `E`/`1`/`2`/`D` family member given the tag's distance from
/// its family base.
fn family_len(d: &mut Decoder<'_>, variant: u8) -> Result<usize, DecodeError> {
    match variant {
        0 => Ok(0),
        width @ (1 | 2) => d.read_len(width as usize),
        _ => d.dyn1_len(),
    }
}

fn items(d: &mut Decoder<'_>, count: usize) -> Result<Vec<Value>, DecodeError> {
    d.ensure(count)?;
    d.enter_nest()?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(value(d)?);
    }
    d.leave_nest();
    Ok(items)
}

fn pairs(d: &mut Decoder<'_>, count: usize) -> Result<Vec<(Value, Value)>, DecodeError> {
    d.ensure(count.saturating_mul(2))?;
    d.enter_nest()?;
    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        let key = value(d)?;
        let val = value(d)?;
        pairs.push((key, val));
    }
    d.leave_nest();
    Ok(pairs)
}
