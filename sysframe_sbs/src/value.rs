use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use std::collections::VecDeque;
use uuid::Uuid;

/// The closed set of values the wire format can carry.
///
/// Composites that carry element order (`List`, `Tuple`, `Deque`,
/// `NamedTuple`, `Dict`, `Counter`) keep it through a round-trip. `Set` and
/// `FrozenSet` hold their elements in whatever order the producer iterated
/// them; the order is emitted as-is and never normalized.
///
/// Mappings are pair vectors rather than hashed maps: keys may be any
/// `Value` (including floats, which rule out `Eq`/`Hash`), and the producer
/// is responsible for not constructing duplicate keys.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Str(String),
    Int(BigInt),
    Float(f64),
    Bool(bool),
    Complex { real: f64, imag: f64 },
    None,
    Ellipsis,
    Bytes(Vec<u8>),
    ByteArray(Vec<u8>),
    /// An opaque byte-addressable view. Only the content round-trips.
    MemoryView(Vec<u8>),
    /// A decimal number literal, e.g. `"3.1415926"`. Kept as text so
    /// precision is never silently lost.
    Decimal(String),
    Uuid(Uuid),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    TimeDelta {
        days: i32,
        seconds: i32,
        micros: i32,
    },
    Range {
        start: BigInt,
        stop: BigInt,
        step: BigInt,
    },
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Deque(VecDeque<Value>),
    NamedTuple {
        type_name: String,
        fields: Vec<(String, Value)>,
    },
    Set(Vec<Value>),
    FrozenSet(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    /// Counts are integers by construction; there is no way to build a
    /// counter with a non-integer count.
    Counter(Vec<(Value, BigInt)>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(String::from(s))
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(BigInt::from(i))
    }
}
impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Value::Int(i)
    }
}
impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
