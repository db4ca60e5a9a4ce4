// Rule data model shared by the resolver, matcher and evaluator

use mime::Mime;
use crate::endian::Endianness;
use crate::error::OffsetError;

pub mod offset;
pub mod check;
pub mod render;
pub mod level;
pub mod tree;

/// A single magic rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Nesting depth. A level N rule only runs if the most recent level N-1
    /// rule on the same page matched.
    pub level: u32,
    pub offset: Offset,
    pub kind: Kind,
    /// printf-style template, see `render`.
    pub description: Vec<u8>,
    pub mime: Option<Mime>,
}

impl Rule {
    pub fn new<D: Into<Vec<u8>>>(level: u32, offset: Offset, kind: Kind, description: D) -> Rule {
        Rule {
            level: level,
            offset: offset,
            kind: kind,
            description: description.into(),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: Mime) -> Rule {
        self.mime = Some(mime);
        self
    }
}

/// Where to look to compare something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offset {
    pub offset_type: OffsetType,
    /// Add the running cursor to the final position.
    pub is_relative: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffsetType {
    /// Offset directly specified by the rule
    Direct(i64),
    /// Offset read from somewhere in the buffer
    Indirect(Box<IndirectOffset>),
}

impl Offset {
    pub fn direct(offset: i64) -> Offset {
        Offset {
            offset_type: OffsetType::Direct(offset),
            is_relative: false,
        }
    }

    pub fn indirect(indirect: IndirectOffset) -> Offset {
        Offset {
            offset_type: OffsetType::Indirect(Box::new(indirect)),
            is_relative: false,
        }
    }

    /// Same offset, counted from the cursor instead of the buffer start.
    pub fn relative(mut self) -> Offset {
        self.is_relative = true;
        self
    }
}

/// Where in the buffer to find the real offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectOffset {
    /// `offset_address` is counted from the cursor.
    pub is_relative: bool,
    pub byte_width: u8,
    pub endianness: Endianness,
    pub offset_address: i64,
    pub adjustment: OffsetAdjustment,
    /// The cursor is added to the adjustment operand before applying it.
    pub adjustment_is_relative: bool,
}

impl IndirectOffset {
    pub fn new(offset_address: i64, byte_width: u8, endianness: Endianness) -> IndirectOffset {
        IndirectOffset {
            is_relative: false,
            byte_width: byte_width,
            endianness: endianness,
            offset_address: offset_address,
            adjustment: OffsetAdjustment::None,
            adjustment_is_relative: false,
        }
    }

    pub fn adjusted(mut self, adjustment: OffsetAdjustment) -> IndirectOffset {
        self.adjustment = adjustment;
        self
    }

    pub fn relative(mut self) -> IndirectOffset {
        self.is_relative = true;
        self
    }

    pub fn relative_adjustment(mut self) -> IndirectOffset {
        self.adjustment_is_relative = true;
        self
    }
}

/// Arithmetic applied to a pointer read by an indirect offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetAdjustment {
    None,
    Add(i64),
    Sub(i64),
    Mul(i64),
    Div(i64),
}

impl OffsetAdjustment {
    /// Applies the adjustment to `pointer`, with `bias` added to the operand.
    pub fn apply(self, pointer: i64, bias: i64) -> Result<i64, OffsetError> {
        let operand = |v: i64| v.checked_add(bias).ok_or(OffsetError::Overflow);

        let adjusted = match self {
            OffsetAdjustment::None => Some(pointer),
            OffsetAdjustment::Add(v) => pointer.checked_add(operand(v)?),
            OffsetAdjustment::Sub(v) => pointer.checked_sub(operand(v)?),
            OffsetAdjustment::Mul(v) => pointer.checked_mul(operand(v)?),
            OffsetAdjustment::Div(v) => {
                let divisor = operand(v)?;
                if divisor == 0 {
                    return Err(OffsetError::DivideByZero);
                }
                pointer.checked_div(divisor)
            }
        };
        adjusted.ok_or(OffsetError::Overflow)
    }
}

/// The test a rule performs, one case per family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Integer(IntegerKind),
    String(StringKind),
    Search(SearchKind),
    /// Succeeds if nothing else matched on this level
    Default,
    /// Resets the matched flag for this level
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindFamily {
    Integer,
    String,
    Search,
    Default,
    Clear,
}

impl Kind {
    pub fn family(&self) -> KindFamily {
        match *self {
            Kind::Integer(_) => KindFamily::Integer,
            Kind::String(_) => KindFamily::String,
            Kind::Search(_) => KindFamily::Search,
            Kind::Default => KindFamily::Default,
            Kind::Clear => KindFamily::Clear,
        }
    }

    pub fn string<V: Into<Vec<u8>>>(value: V) -> Kind {
        Kind::String(StringKind::new(value))
    }

    pub fn search<V: Into<Vec<u8>>>(value: V, max_len: usize) -> Kind {
        Kind::Search(SearchKind {
            value: value.into(),
            max_len: max_len,
        })
    }
}

/// How to test an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerKind {
    pub byte_width: u8,
    pub endianness: Endianness,
    pub signed: bool,
    /// Mask applied after decoding, before comparing.
    pub and_value: Option<u64>,
    pub test: IntegerTest,
    pub value: i64,
    /// Match whatever the decoded value is.
    pub match_any: bool,
}

impl IntegerKind {
    pub fn new(byte_width: u8, endianness: Endianness, test: IntegerTest, value: i64) -> IntegerKind {
        IntegerKind {
            byte_width: byte_width,
            endianness: endianness,
            signed: false,
            and_value: None,
            test: test,
            value: value,
            match_any: false,
        }
    }

    /// Matches any value that can be read, for printing it.
    pub fn any(byte_width: u8, endianness: Endianness) -> IntegerKind {
        let mut kind = IntegerKind::new(byte_width, endianness, IntegerTest::Equal, 0);
        kind.match_any = true;
        kind
    }

    pub fn signed(mut self) -> IntegerKind {
        self.signed = true;
        self
    }

    pub fn masked(mut self, and_value: u64) -> IntegerKind {
        self.and_value = Some(and_value);
        self
    }
}

impl From<IntegerKind> for Kind {
    fn from(kind: IntegerKind) -> Kind {
        Kind::Integer(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerTest {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
}

/// How to match a string pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringKind {
    pub value: Vec<u8>,
    pub negate: bool,
    pub flags: StringFlags,
}

impl StringKind {
    pub fn new<V: Into<Vec<u8>>>(value: V) -> StringKind {
        StringKind {
            value: value.into(),
            negate: false,
            flags: StringFlags::default(),
        }
    }

    pub fn negated(mut self) -> StringKind {
        self.negate = true;
        self
    }

    pub fn with_flags(mut self, flags: StringFlags) -> StringKind {
        self.flags = flags;
        self
    }
}

impl From<StringKind> for Kind {
    fn from(kind: StringKind) -> Kind {
        Kind::String(kind)
    }
}

/// Textual comparison modifiers. All unset means exact byte comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StringFlags {
    /// Whitespace in the pattern matches one or more whitespace bytes
    pub compact_whitespace: bool,
    /// Whitespace in the pattern matches zero or more whitespace bytes
    pub optional_blanks: bool,
    /// Lowercase pattern letters match either case
    pub lower_matches_both: bool,
    /// Uppercase pattern letters match either case
    pub upper_matches_both: bool,
    /// Hint for a rule compiler that the data is text; comparison ignores it
    pub force_text: bool,
    /// Hint for a rule compiler that the data is binary; comparison ignores it
    pub force_binary: bool,
}

/// Looks for a fixed pattern within a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKind {
    pub value: Vec<u8>,
    /// Number of start positions tried
    pub max_len: usize,
}
