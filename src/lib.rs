//! `wizardry` evaluates "magic" rules against a byte buffer to describe what
//! kind of data it holds.
//!
//! # About
//! A magic rule says where to look in a buffer (directly, or through a
//! pointer stored in the buffer itself), what to compare there, and what to
//! print if the comparison succeeds. Rules are nested in levels: a level N+1
//! rule is only tried if the level N rule above it matched, so a page of
//! rules reads like a decision tree that refines its answer as it goes
//! deeper ("ELF" -> "64-bit" -> "LSB" -> "executable").
//!
//! Rules live in a [`Spellbook`], grouped in named pages. The unnamed page
//! `""` is where evaluation starts.
//!
//! # Features
//! - Direct, indirect, relative and arithmetically adjusted offsets.
//! - Integer (any width, either byte order, masked, signed or not), string
//!   (with case and whitespace modifiers), bounded search, default and clear
//!   tests.
//! - printf-style descriptions that print the matched value.
//! - Optional MIME type per rule.
//! - A small bundled rule set for common formats.
//!
//! # Feature flags
//! `cli`: Enable building of the `wizard` binary
//!
//! # Example
//! ```rust
//! use wizardry::spell::{IntegerKind, IntegerTest, Offset, Rule};
//! use wizardry::{Endianness, Spellbook};
//!
//! let mut book = Spellbook::new();
//! let one = IntegerKind::new(4, Endianness::Little, IntegerTest::Equal, 1);
//! book.add_rule("", Rule::new(0, Offset::direct(0), one.into(), "a one"));
//!
//! let found = book.identify(None, &[1, 0, 0, 0]).unwrap();
//! assert_eq!(found, Some(b"a one".to_vec()));
//!
//! // The bundled rules know about GIF files
//! let gif = b"GIF89a\x0a\x00\x14\x00";
//! assert_eq!(wizardry::from_u8(gif).unwrap(), "GIF image data, version 89a, 10 x 20");
//! ```

#[macro_use] extern crate nom;
#[macro_use] extern crate lazy_static;

use mime::Mime;
use tracing::warn;

pub mod endian;
pub mod error;
pub mod spell;
pub mod spellbook;
pub mod builtin;

pub use crate::builtin::BUILTIN;
pub use crate::endian::Endianness;
pub use crate::error::{Error, Result};
pub use crate::spell::level::{Options, Outcome};
pub use crate::spellbook::{identify, Spellbook, ROOT_PAGE};

/// Evaluation settings for the bundled spellbook: one answer per buffer.
const BUILTIN_OPTIONS: Options = Options { first_match: true };

fn builtin_outcome(bytes: &[u8]) -> Option<Outcome> {
    match BUILTIN.identify_with(None, bytes, &BUILTIN_OPTIONS) {
        Ok(outcome) if outcome.matched => Some(outcome),
        Ok(_) => None,
        Err(e) => {
            // Only a broken bundled rule can get here
            warn!(error = %e, "bundled spellbook failed");
            None
        }
    }
}

/// Describes a byte stream using the bundled spellbook.
///
/// Returns `None` if no rule recognized it.
///
/// # Examples
/// ```rust
/// let input = b"%PDF-1.7\n";
/// assert_eq!(wizardry::from_u8(input).unwrap(), "PDF document, version 1.7");
/// ```
pub fn from_u8(bytes: &[u8]) -> Option<String> {
    builtin_outcome(bytes).map(|o| String::from_utf8_lossy(&o.description).into_owned())
}

/// MIME type of a byte stream according to the bundled spellbook.
///
/// # Examples
/// ```rust
/// let input = b"\x89PNG\r\n\x1a\n";
/// assert_eq!(wizardry::from_u8_mime(input).unwrap(), mime::IMAGE_PNG);
/// ```
pub fn from_u8_mime(bytes: &[u8]) -> Option<Mime> {
    builtin_outcome(bytes).and_then(|o| o.mime)
}
