use crate::endian;
use crate::error::{MatchError, ReadError};
use super::{IntegerKind, IntegerTest, Kind, SearchKind, StringFlags, StringKind};

/// Value captured by a successful test, substituted into the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    None,
    Signed(i64),
    Unsigned(u64),
    Bytes(&'a [u8]),
}

/// What a successful test found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome<'a> {
    pub value: Value<'a>,
    /// Bytes covered from the tested position, for advancing the cursor
    pub consumed: usize,
}

/// Signature of a kind matcher, so the evaluator can be handed another one.
pub type MatchFn =
	for<'a> fn(&Kind, &'a [u8], usize) -> Result<Option<MatchOutcome<'a>>, MatchError>;

/// Performs the test described by `kind` at `position`.
///
/// `Ok(None)` means no match, including when the buffer is too short.
/// `Clear` never matches; `Default` always does, the evaluator decides
/// whether it may run at all.
pub fn match_kind<'a>(
	kind: &Kind,
	buffer: &'a [u8],
	position: usize
) -> Result<Option<MatchOutcome<'a>>, MatchError> {
	match *kind {
		Kind::Integer(ref integer) => match_integer(integer, buffer, position),
		Kind::String(ref string) => Ok(match_string(string, buffer, position)),
		Kind::Search(ref search) => Ok(match_search(search, buffer, position)),
		Kind::Default => Ok(Some(MatchOutcome { value: Value::None, consumed: 0 })),
		Kind::Clear => Ok(None),
	}
}

fn compare<T: Ord>(test: IntegerTest, found: T, expected: T) -> bool {
	match test {
		IntegerTest::Equal => found == expected,
		IntegerTest::NotEqual => found != expected,
		IntegerTest::LessThan => found < expected,
		IntegerTest::GreaterThan => found > expected,
	}
}

fn match_integer<'a>(
	kind: &IntegerKind,
	buffer: &'a [u8],
	position: usize
) -> Result<Option<MatchOutcome<'a>>, MatchError> {
	let width = kind.byte_width;

	let raw = match endian::read_uint(buffer, position, width, kind.endianness) {
		Ok(x) => x,
		Err(ReadError::OutOfBounds { .. }) => return Ok(None),
		Err(ReadError::UnsupportedWidth(w)) => return Err(MatchError::UnsupportedWidth(w)),
	};

	let raw = match kind.and_value {
		Some(mask) => raw & mask & endian::width_mask(width),
		None => raw,
	};

	let (value, matched) = if kind.signed {
		let found = endian::sign_extend(raw, width);
		let expected = endian::sign_extend(kind.value as u64 & endian::width_mask(width), width);
		(Value::Signed(found), compare(kind.test, found, expected))
	} else {
		let expected = kind.value as u64 & endian::width_mask(width);
		(Value::Unsigned(raw), compare(kind.test, raw, expected))
	};

	if !(matched || kind.match_any) {
		return Ok(None);
	}

	Ok(Some(MatchOutcome { value: value, consumed: width as usize }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
	/// Pattern matched, covering this many target bytes
	Match(usize),
	Mismatch,
	/// Target ended before the pattern did
	Truncated,
}

// Same set as C isspace
fn is_space(b: u8) -> bool {
	match b {
		b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => true,
		_ => false,
	}
}

fn compare_string(target: &[u8], pattern: &[u8], flags: &StringFlags) -> Comparison {
	let mut t = 0;

	for (i, &p) in pattern.iter().enumerate() {
		if is_space(p) && flags.compact_whitespace {
			match target.get(t) {
				None => return Comparison::Truncated,
				Some(&b) if !is_space(b) => return Comparison::Mismatch,
				Some(_) => t += 1,
			}
			// Swallow the run unless the pattern spells it out itself
			let next_is_space = pattern.get(i + 1).map_or(false, |&n| is_space(n));
			if !next_is_space {
				while target.get(t).map_or(false, |&b| is_space(b)) {
					t += 1;
				}
			}
			continue;
		}

		if is_space(p) && flags.optional_blanks {
			while target.get(t).map_or(false, |&b| is_space(b)) {
				t += 1;
			}
			continue;
		}

		let b = match target.get(t) {
			Some(&b) => b,
			None => return Comparison::Truncated,
		};

		let equal = if flags.lower_matches_both && p.is_ascii_lowercase() {
			b.to_ascii_lowercase() == p
		} else if flags.upper_matches_both && p.is_ascii_uppercase() {
			b.to_ascii_uppercase() == p
		} else {
			b == p
		};

		if !equal {
			return Comparison::Mismatch;
		}
		t += 1;
	}

	Comparison::Match(t)
}

fn match_string<'a>(kind: &StringKind, buffer: &'a [u8], position: usize) -> Option<MatchOutcome<'a>> {
	if position > buffer.len() {
		return None;
	}
	let target = &buffer[position..];

	match compare_string(target, &kind.value, &kind.flags) {
		Comparison::Match(n) if !kind.negate => Some(MatchOutcome {
			value: Value::Bytes(&target[..n]),
			consumed: n,
		}),
		// A negated test still needs the whole window to be there
		Comparison::Mismatch if kind.negate && target.len() >= kind.value.len() => {
			let n = kind.value.len();
			Some(MatchOutcome {
				value: Value::Bytes(&target[..n]),
				consumed: n,
			})
		}
		_ => None,
	}
}

fn match_search<'a>(kind: &SearchKind, buffer: &'a [u8], position: usize) -> Option<MatchOutcome<'a>> {
	if kind.max_len == 0 || position > buffer.len() {
		return None;
	}

	let val_len = kind.value.len();
	if val_len == 0 {
		return Some(MatchOutcome { value: Value::Bytes(&buffer[position..position]), consumed: 0 });
	}

	// Every start position in the window, plus
	// room for the pattern after the last one
	let last_start = position.saturating_add(kind.max_len - 1);
	let bound_max = std::cmp::min(last_start.saturating_add(val_len), buffer.len());
	let testarea = &buffer[position..bound_max];

	// First hit wins
	testarea
		.windows(val_len)
		.position(|x| x == &kind.value[..])
		.map(|start| MatchOutcome {
			value: Value::Bytes(&testarea[start..start + val_len]),
			consumed: start + val_len,
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::endian::Endianness;

	fn flags() -> StringFlags {
		StringFlags::default()
	}

	#[test]
	fn integer_equal_le() {
		let kind = Kind::Integer(IntegerKind::new(4, Endianness::Little, IntegerTest::Equal, 1));
		let hit = match_kind(&kind, &[1, 0, 0, 0], 0).unwrap().unwrap();
		assert_eq!(hit.value, Value::Unsigned(1));
		assert_eq!(hit.consumed, 4);
		assert_eq!(match_kind(&kind, &[2, 0, 0, 0], 0), Ok(None));
	}

	#[test]
	fn integer_short_buffer_never_matches() {
		let any = Kind::Integer(IntegerKind::any(8, Endianness::Big));
		for len in 0..8 {
			let buf = vec![0u8; len];
			assert_eq!(match_kind(&any, &buf, 0), Ok(None));
		}
		let buf = [0u8; 8];
		assert!(match_kind(&any, &buf, 0).unwrap().is_some());
		assert_eq!(match_kind(&any, &buf, 1), Ok(None));
		assert_eq!(match_kind(&any, &buf, 100), Ok(None));
	}

	#[test]
	fn integer_mask() {
		let eq = |v| Kind::Integer(IntegerKind::new(1, Endianness::Little, IntegerTest::Equal, v).masked(0x0f));
		assert!(match_kind(&eq(0x0f), &[0xff], 0).unwrap().is_some());
		assert_eq!(match_kind(&eq(0xff), &[0xff], 0), Ok(None));
	}

	#[test]
	fn integer_signedness() {
		let lt = |signed| {
			let kind = IntegerKind::new(1, Endianness::Little, IntegerTest::LessThan, 0);
			Kind::Integer(if signed { kind.signed() } else { kind })
		};
		// 0x80 is -128 signed, 128 unsigned
		assert!(match_kind(&lt(true), &[0x80], 0).unwrap().is_some());
		assert_eq!(match_kind(&lt(false), &[0x80], 0), Ok(None));

		let gt = Kind::Integer(IntegerKind::new(2, Endianness::Big, IntegerTest::GreaterThan, 0x00ff));
		assert!(match_kind(&gt, &[0x01, 0x00], 0).unwrap().is_some());
		let ne = Kind::Integer(IntegerKind::new(2, Endianness::Big, IntegerTest::NotEqual, 0x0100));
		assert_eq!(match_kind(&ne, &[0x01, 0x00], 0), Ok(None));
	}

	#[test]
	fn integer_unsigned_compares_truncated_value() {
		let kind = Kind::Integer(IntegerKind::new(1, Endianness::Little, IntegerTest::Equal, -1));
		assert!(match_kind(&kind, &[0xff], 0).unwrap().is_some());
	}

	#[test]
	fn integer_signed_compares_value_at_width() {
		let eq = |v| Kind::Integer(IntegerKind::new(1, Endianness::Little, IntegerTest::Equal, v).signed());
		let hit = match_kind(&eq(0xff), &[0xff], 0).unwrap().unwrap();
		assert_eq!(hit.value, Value::Signed(-1));
		assert!(match_kind(&eq(-1), &[0xff], 0).unwrap().is_some());

		let short = Kind::Integer(IntegerKind::new(2, Endianness::Big, IntegerTest::Equal, 0x8000).signed());
		assert!(match_kind(&short, &[0x80, 0x00], 0).unwrap().is_some());
		let lt = Kind::Integer(IntegerKind::new(1, Endianness::Little, IntegerTest::LessThan, 0xfe).signed());
		// 0xfe is -2 at this width, so -3 is below it and 0 is not
		assert!(match_kind(&lt, &[0xfd], 0).unwrap().is_some());
		assert_eq!(match_kind(&lt, &[0x00], 0), Ok(None));
	}

	#[test]
	fn hint_flags_leave_comparison_alone() {
		let hinted = StringFlags { force_text: true, force_binary: true, ..flags() };
		let kind = Kind::String(StringKind::new("Ab").with_flags(hinted));
		assert!(match_kind(&kind, b"Ab", 0).unwrap().is_some());
		assert_eq!(match_kind(&kind, b"ab", 0), Ok(None));
	}

	#[test]
	fn integer_bad_width() {
		let kind = Kind::Integer(IntegerKind::new(3, Endianness::Little, IntegerTest::Equal, 0));
		assert_eq!(match_kind(&kind, &[0; 8], 0), Err(MatchError::UnsupportedWidth(3)));
	}

	#[test]
	fn string_exact() {
		let kind = Kind::string("GIF8");
		let hit = match_kind(&kind, b"xGIF89a", 1).unwrap().unwrap();
		assert_eq!(hit.value, Value::Bytes(b"GIF8"));
		assert_eq!(hit.consumed, 4);
		assert_eq!(match_kind(&kind, b"GIF", 0), Ok(None));
		assert_eq!(match_kind(&kind, b"gif8", 0), Ok(None));
	}

	#[test]
	fn string_negate() {
		let kind = Kind::String(StringKind::new("7a").negated());
		assert_eq!(match_kind(&kind, b"7a", 0), Ok(None));
		assert!(match_kind(&kind, b"9a", 0).unwrap().is_some());
		// Not enough bytes left to say anything
		assert_eq!(match_kind(&kind, b"9", 0), Ok(None));
	}

	#[test]
	fn string_case_flags() {
		let lower = StringFlags { lower_matches_both: true, ..flags() };
		let kind = Kind::String(StringKind::new("<!doctype html").with_flags(lower));
		assert!(match_kind(&kind, b"<!DOCTYPE HTML>", 0).unwrap().is_some());
		assert!(match_kind(&kind, b"<!doctype html>", 0).unwrap().is_some());

		let upper = StringFlags { upper_matches_both: true, ..flags() };
		let kind = Kind::String(StringKind::new("BEGIN").with_flags(upper));
		assert!(match_kind(&kind, b"begin", 0).unwrap().is_some());
		// lowercase pattern letters stay exact
		let kind = Kind::String(StringKind::new("Begin").with_flags(upper));
		assert_eq!(match_kind(&kind, b"BEGIN", 0), Ok(None));
	}

	#[test]
	fn string_whitespace_flags() {
		let compact = StringFlags { compact_whitespace: true, ..flags() };
		let kind = Kind::String(StringKind::new("a b").with_flags(compact));
		let hit = match_kind(&kind, b"a   b", 0).unwrap().unwrap();
		assert_eq!(hit.consumed, 5);
		assert_eq!(match_kind(&kind, b"ab", 0), Ok(None));

		let optional = StringFlags { optional_blanks: true, ..flags() };
		let kind = Kind::String(StringKind::new("#! /bin/sh").with_flags(optional));
		assert_eq!(match_kind(&kind, b"#!/bin/sh\n", 0).unwrap().unwrap().consumed, 9);
		assert_eq!(match_kind(&kind, b"#!  /bin/sh\n", 0).unwrap().unwrap().consumed, 11);
	}

	#[test]
	fn search_window() {
		let kind = Kind::search("<svg", 16);
		let buf = b"<?xml?>\n<svg width=\"1\">";
		let hit = match_kind(&kind, buf, 0).unwrap().unwrap();
		assert_eq!(hit.value, Value::Bytes(b"<svg"));
		assert_eq!(hit.consumed, 12);

		// Pattern starts just past the window
		let kind = Kind::search("<svg", 8);
		assert_eq!(match_kind(&kind, buf, 0), Ok(None));
		let kind = Kind::search("<svg", 9);
		assert!(match_kind(&kind, buf, 0).unwrap().is_some());
	}

	#[test]
	fn search_edges() {
		assert_eq!(match_kind(&Kind::search("abc", 0), b"abc", 0), Ok(None));
		assert_eq!(match_kind(&Kind::search("abc", 10), b"ab", 0), Ok(None));
		assert_eq!(match_kind(&Kind::search("abc", 10), b"abc", 4), Ok(None));
		let hit = match_kind(&Kind::search("", 10), b"abc", 3).unwrap().unwrap();
		assert_eq!(hit.consumed, 0);
	}

	#[test]
	fn default_and_clear() {
		assert_eq!(
			match_kind(&Kind::Default, b"", 0),
			Ok(Some(MatchOutcome { value: Value::None, consumed: 0 }))
		);
		assert_eq!(match_kind(&Kind::Clear, b"abc", 0), Ok(None));
	}
}
