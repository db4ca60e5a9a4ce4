//! printf-style rendering of rule descriptions.
//!
//! A description such as `"\x08, version %d.%d"` is copied byte for byte,
//! except for `%` directives which are replaced by the value the rule
//! matched. Directives that do not parse are copied as they are.

use std::str;
use nom::{digit, IResult};
use super::check::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
	left: bool,
	zero: bool,
	plus: bool,
	space: bool,
	alternate: bool,
	width: Option<usize>,
	precision: Option<usize>,
	conversion: char,
}

fn buf_to_usize(s: &[u8]) -> Option<usize> {
	str::from_utf8(s).ok().and_then(|t| t.parse().ok())
}

// Format: %[flags][width][.precision][length]conversion
named!(directive<Directive>,
	do_parse!(
		char!('%') >>
		_flags: many0!(one_of!(&b"-+ #0"[..])) >>
		_width: opt!(digit) >>
		_precision: opt!(preceded!(char!('.'), digit)) >>
		many0!(one_of!(&b"hlLqjzt"[..])) >>
		_conversion: one_of!(&b"diuoxXcs%"[..]) >>
		(Directive {
			left: _flags.contains(&'-'),
			zero: _flags.contains(&'0'),
			plus: _flags.contains(&'+'),
			space: _flags.contains(&' '),
			alternate: _flags.contains(&'#'),
			width: _width.and_then(buf_to_usize),
			precision: _precision.and_then(buf_to_usize),
			conversion: _conversion
		})
	)
);

/// Renders `template`, substituting `value` for each directive.
pub fn render(template: &[u8], value: &Value) -> Vec<u8> {
	let mut out = Vec::<u8>::with_capacity(template.len());
	let mut rest = template;

	while !rest.is_empty() {
		let percent = match rest.iter().position(|&b| b == b'%') {
			Some(i) => i,
			None => {
				out.extend_from_slice(rest);
				break;
			}
		};
		out.extend_from_slice(&rest[..percent]);
		rest = &rest[percent..];

		match directive(rest) {
			IResult::Done(remaining, d) => {
				format_directive(&mut out, &d, value);
				rest = remaining;
			}
			// Not a directive after all, keep the percent sign
			_ => {
				out.push(b'%');
				rest = &rest[1..];
			}
		}
	}

	out
}

fn format_directive(out: &mut Vec<u8>, d: &Directive, value: &Value) {
	if d.conversion == '%' {
		out.push(b'%');
		return;
	}

	let body: Vec<u8> = match (d.conversion, *value) {
		(_, Value::None) => return,
		('s', Value::Bytes(b)) => {
			let n = d.precision.map_or(b.len(), |p| p.min(b.len()));
			b[..n].to_vec()
		}
		('c', Value::Bytes(b)) => b.iter().take(1).cloned().collect(),
		('c', Value::Signed(v)) => vec![v as u8],
		('c', Value::Unsigned(v)) => vec![v as u8],
		(_, Value::Bytes(b)) => b.to_vec(),
		(conv, Value::Signed(v)) => number(d, conv, v < 0, v.wrapping_abs() as u64, v as u64),
		(conv, Value::Unsigned(v)) => number(d, conv, false, v, v),
	};

	pad(out, d, body);
}

/// Formats a number; `magnitude` is used by the decimal conversions and
/// `bits` by the unsigned and radix ones.
fn number(d: &Directive, conversion: char, negative: bool, magnitude: u64, bits: u64) -> Vec<u8> {
	let (digits, prefix) = match conversion {
		'd' | 'i' | 's' => {
			let sign = if negative {
				"-"
			} else if d.plus {
				"+"
			} else if d.space {
				" "
			} else {
				""
			};
			(magnitude.to_string(), sign)
		}
		'u' => (bits.to_string(), ""),
		'x' => (format!("{:x}", bits), if d.alternate && bits != 0 { "0x" } else { "" }),
		'X' => (format!("{:X}", bits), if d.alternate && bits != 0 { "0X" } else { "" }),
		'o' => (format!("{:o}", bits), if d.alternate && bits != 0 { "0" } else { "" }),
		_ => (bits.to_string(), ""),
	};

	let mut body = prefix.as_bytes().to_vec();
	if let Some(p) = d.precision {
		for _ in digits.len()..p {
			body.push(b'0');
		}
	}
	body.extend_from_slice(digits.as_bytes());

	// Zero padding goes between the sign and the digits
	if let (true, false, None, Some(w)) = (d.zero, d.left, d.precision, d.width) {
		let mut padded = prefix.as_bytes().to_vec();
		for _ in body.len()..w {
			padded.push(b'0');
		}
		padded.extend_from_slice(&body[prefix.len()..]);
		return padded;
	}
	body
}

fn pad(out: &mut Vec<u8>, d: &Directive, body: Vec<u8>) {
	let fill = d.width.map_or(0, |w| w.saturating_sub(body.len()));
	if !d.left {
		out.extend(std::iter::repeat(b' ').take(fill));
	}
	out.extend_from_slice(&body);
	if d.left {
		out.extend(std::iter::repeat(b' ').take(fill));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn r(template: &str, value: Value) -> String {
		String::from_utf8(render(template.as_bytes(), &value)).unwrap()
	}

	#[test]
	fn plain_text() {
		assert_eq!(r("PNG image data", Value::Unsigned(1)), "PNG image data");
		assert_eq!(r("", Value::None), "");
	}

	#[test]
	fn integers() {
		assert_eq!(r("%d x %d", Value::Unsigned(640)), "640 x 640");
		assert_eq!(r("v%ld", Value::Signed(-3)), "v-3");
		assert_eq!(r("%u", Value::Signed(-1)), "18446744073709551615");
		assert_eq!(r("%x", Value::Unsigned(255)), "ff");
		assert_eq!(r("%#X", Value::Unsigned(255)), "0XFF");
		assert_eq!(r("%o", Value::Unsigned(8)), "10");
		assert_eq!(r("%+d", Value::Signed(5)), "+5");
		assert_eq!(r("%c", Value::Unsigned(0x41)), "A");
	}

	#[test]
	fn widths() {
		assert_eq!(r("[%4d]", Value::Unsigned(7)), "[   7]");
		assert_eq!(r("[%-4d]", Value::Unsigned(7)), "[7   ]");
		assert_eq!(r("[%04x]", Value::Unsigned(0xa)), "[000a]");
		assert_eq!(r("[%05d]", Value::Signed(-42)), "[-0042]");
		assert_eq!(r("[%.3d]", Value::Unsigned(5)), "[005]");
	}

	#[test]
	fn strings() {
		assert_eq!(r("name \"%s\"", Value::Bytes(b"hello")), "name \"hello\"");
		assert_eq!(r("%.2s", Value::Bytes(b"hello")), "he");
		assert_eq!(r("%s", Value::Unsigned(12)), "12");
		assert_eq!(r("version %c", Value::Bytes(b"1.4")), "version 1");
	}

	#[test]
	fn no_value_drops_directives() {
		assert_eq!(r("unknown %d type", Value::None), "unknown  type");
		assert_eq!(r("100%%", Value::None), "100%");
	}

	#[test]
	fn malformed_directives_are_literal() {
		assert_eq!(r("50%!", Value::Unsigned(1)), "50%!");
		assert_eq!(r("trailing %", Value::Unsigned(1)), "trailing %");
		assert_eq!(r("%5", Value::Unsigned(1)), "%5");
		assert_eq!(r("%y%d", Value::Unsigned(2)), "%y2");
	}
}
