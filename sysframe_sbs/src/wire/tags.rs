use derive_more::{Deref, From};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};

/* Markers count down from 255 so future additions never collide with the
type tags, which count up from 0. */

/// Reserved for the day a single byte no longer suffices.
pub const EXT_MARKER: u8 = 255;
/// The legacy protocol. Decoded, never emitted.
pub const PROT_V1: u8 = 254;
/// The current protocol; every encoded buffer starts with this byte.
pub const PROT_V2: u8 = 253;

/// A raw tag byte, as read off the wire or about to be written to it.
#[derive(From, Deref, Clone, Copy)]
pub struct TagByte(u8);

impl From<Tag> for TagByte {
    fn from(tag: Tag) -> Self {
        let byte = tag.to_u8().unwrap();
        Self(byte)
    }
}

impl TagByte {
    pub fn decode(self) -> Option<Tag> {
        Tag::from_u8(self.0)
    }
}

/// The closed tag table of the current protocol.
///
/// Most families span five consecutive codes, one per length-width variant:
/// `E` (empty), `1` (one length byte), `2` (two length bytes), `D1` (a
/// width byte, then that many length bytes), and `D2` (a width-of-width
/// byte, then the width, then the length bytes). `Int` trades the empty
/// slot for five fixed payload widths; `Decimal` has no empty form.
///
/// Wire bytes are assigned manually because the table is frozen by the
/// format, and because an automatic discriminant may change with enum
/// definition changes, according to the [`std::mem::discriminant()`] doc.
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum Tag {
    StrE = 0,
    Str1 = 1,
    Str2 = 2,
    StrD1 = 3,
    StrD2 = 4,

    /* The fixed Int tags give the payload width directly: Int1 holds a
    one-byte integer, Int5 a five-byte one. */
    Int1 = 5,
    Int2 = 6,
    Int3 = 7,
    Int4 = 8,
    Int5 = 9,
    IntD1 = 10,
    IntD2 = 11,

    Float = 12,

    BoolTrue = 13,
    BoolFalse = 14,

    Complex = 15,

    None = 16,
    Ellipsis = 17,

    BytesE = 18,
    Bytes1 = 19,
    Bytes2 = 20,
    BytesD1 = 21,
    BytesD2 = 22,

    ByteArrayE = 23,
    ByteArray1 = 24,
    ByteArray2 = 25,
    ByteArrayD1 = 26,
    ByteArrayD2 = 27,

    ListE = 28,
    List1 = 29,
    List2 = 30,
    ListD1 = 31,
    ListD2 = 32,

    SetE = 33,
    Set1 = 34,
    Set2 = 35,
    SetD1 = 36,
    SetD2 = 37,

    TupleE = 38,
    Tuple1 = 39,
    Tuple2 = 40,
    TupleD1 = 41,
    TupleD2 = 42,

    DictE = 43,
    Dict1 = 44,
    Dict2 = 45,
    DictD1 = 46,
    DictD2 = 47,

    FrozenSetE = 48,
    FrozenSet1 = 49,
    FrozenSet2 = 50,
    FrozenSetD1 = 51,
    FrozenSetD2 = 52,

    DateTime = 53,
    TimeDelta = 54,
    Date = 55,
    Time = 56,

    Uuid = 57,

    MemoryViewE = 58,
    MemoryView1 = 59,
    MemoryView2 = 60,
    MemoryViewD1 = 61,
    MemoryViewD2 = 62,

    /* Decimal has no empty form; its block starts one code below where the
    generic empty slot would sit. */
    Decimal1 = 63,
    Decimal2 = 64,
    DecimalD1 = 65,
    DecimalD2 = 66,

    Range = 67,

    NamedTupleE = 68,
    NamedTuple1 = 69,
    NamedTuple2 = 70,
    NamedTupleD1 = 71,
    NamedTupleD2 = 72,

    DequeE = 73,
    Deque1 = 74,
    Deque2 = 75,
    DequeD1 = 76,
    DequeD2 = 77,

    CounterE = 78,
    Counter1 = 79,
    Counter2 = 80,
    CounterD1 = 81,
    CounterD2 = 82,
}

impl Tag {
    /// The `E` tag opening this tag's family block. Width variants are the
    /// empty tag plus 1, 2, 3 (`D1`), or 4 (`D2`).
    pub fn family_base(self) -> u8 {
        let byte = self as u8;
        match byte {
            0..=4 => Tag::StrE as u8,
            18..=22 => Tag::BytesE as u8,
            23..=27 => Tag::ByteArrayE as u8,
            28..=32 => Tag::ListE as u8,
            33..=37 => Tag::SetE as u8,
            38..=42 => Tag::TupleE as u8,
            43..=47 => Tag::DictE as u8,
            48..=52 => Tag::FrozenSetE as u8,
            58..=62 => Tag::MemoryViewE as u8,
            63..=66 => Tag::Decimal1 as u8 - 1,
            68..=72 => Tag::NamedTupleE as u8,
            73..=77 => Tag::DequeE as u8,
            78..=82 => Tag::CounterE as u8,
            _ => byte,
        }
    }
}
