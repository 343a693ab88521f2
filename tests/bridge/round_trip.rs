use super::unique_name;
use anyhow::Result;
use chrono::NaiveDate;
use num_bigint::BigInt;
use std::collections::VecDeque;
use std::str::FromStr;
use sysframe::{create_memory, read_memory, remove_memory, write_memory, Value};
use uuid::Uuid;

fn corpus_values() -> Vec<Value> {
    vec![
        Value::from("Hello, world!"),
        Value::from(""),
        Value::Str("\t\n!@#$%^&*()~`_+-=[]{}|\",./<>?".repeat(1000)),
        Value::from(12345i64),
        Value::Int(-BigInt::from_str(&format!("1{}", "0".repeat(1000))).unwrap()),
        Value::from(3.142),
        Value::from(true),
        Value::None,
        Value::Ellipsis,
        Value::Complex {
            real: 3.0,
            imag: 2.0,
        },
        Value::Bytes(b"Hello, world!".repeat(5000)),
        Value::ByteArray(b"ba".to_vec()),
        Value::MemoryView(b"mv".to_vec()),
        Value::Decimal(String::from("3.1415926535897932384626433832795028841")),
        Value::Uuid(Uuid::new_v4()),
        Value::DateTime(
            NaiveDate::from_ymd_opt(2008, 6, 8)
                .unwrap()
                .and_hms_opt(23, 53, 0)
                .unwrap(),
        ),
        Value::TimeDelta {
            days: 5,
            seconds: 14,
            micros: 12,
        },
        Value::Range {
            start: BigInt::from(0),
            stop: BigInt::from(100),
            step: BigInt::from(2),
        },
        Value::NamedTuple {
            type_name: String::from("point"),
            fields: vec![
                (String::from("x"), Value::from(1i64)),
                (String::from("y"), Value::from(2i64)),
            ],
        },
        Value::Deque(VecDeque::from(vec![Value::from(1i64), Value::from(2i64)])),
        Value::Counter(vec![(Value::from("a"), BigInt::from(3))]),
        Value::List(vec![
            Value::from(3.142),
            Value::None,
            Value::List(vec![Value::from("nested")]),
        ]),
        Value::Dict(vec![(
            Value::from("key"),
            Value::Tuple(vec![Value::from(9009i64), Value::from("banananana")]),
        )]),
        Value::Set(vec![Value::from("only")]),
        Value::FrozenSet(vec![Value::from(1i64), Value::from(2i64)]),
    ]
}

/// Every supported value survives a write-then-read through one segment.
pub fn corpus() -> Result<()> {
    let name = unique_name("corpus");
    create_memory(&name, 0, false)?;

    for value in corpus_values() {
        assert!(write_memory(&name, &value, true)?);
        let read_back = read_memory(&name)?;
        assert_eq!(value, read_back);
    }

    // The whole corpus as one value as well.
    let all = Value::List(corpus_values());
    write_memory(&name, &all, true)?;
    assert_eq!(all, read_memory(&name)?);

    assert!(remove_memory(&name, true)?);
    Ok(())
}

/// A value larger than the segment's capacity grows the segment; the next
/// read returns the whole value.
pub fn growth() -> Result<()> {
    let name = unique_name("growth");
    create_memory(&name, 8, false)?;

    let value = Value::Bytes(b"grow".repeat(50_000));
    write_memory(&name, &value, false)?;
    assert_eq!(value, read_memory(&name)?);

    assert!(remove_memory(&name, true)?);
    Ok(())
}

/// A short value written over a longer one leaves stale tail bytes in the
/// payload; the self-delimiting decode never reads them.
pub fn stale_tail() -> Result<()> {
    let name = unique_name("stale");

    let long = Value::Str("x".repeat(10_000));
    write_memory(&name, &long, true)?;

    let short = Value::from(7i64);
    write_memory(&name, &short, false)?;
    assert_eq!(short, read_memory(&name)?);

    assert!(remove_memory(&name, true)?);
    Ok(())
}

/// A segment created with no capacity and never written reads as the
/// canonical none value.
pub fn empty_segment_reads_as_none() -> Result<()> {
    let name = unique_name("empty");
    create_memory(&name, 0, false)?;

    assert_eq!(Value::None, read_memory(&name)?);

    assert!(remove_memory(&name, true)?);
    Ok(())
}
