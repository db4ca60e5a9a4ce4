//! Rule set bundled in the crate
//!
//! Covers a handful of common formats. Built once, through the same
//! construction API an external rule compiler would use.

use mime::Mime;
use crate::endian::Endianness::{self, Big, Little};
use crate::spell::IntegerTest::Equal;
use crate::spell::{
    IndirectOffset, IntegerKind, Kind, Offset, OffsetAdjustment, Rule, StringFlags, StringKind,
};
use crate::spellbook::{Spellbook, ROOT_PAGE};

lazy_static! {
    /// The bundled spellbook, built on first use.
    pub static ref BUILTIN: Spellbook = spellbook();
}

fn mime_type(name: &str) -> Mime {
    name.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

fn at(offset: i64) -> Offset {
    Offset::direct(offset)
}

fn byte(value: i64) -> Kind {
    IntegerKind::new(1, Little, Equal, value).into()
}

fn short(endianness: Endianness, value: i64) -> Kind {
    IntegerKind::new(2, endianness, Equal, value).into()
}

fn any(width: u8, endianness: Endianness) -> Kind {
    IntegerKind::any(width, endianness).into()
}

fn images(book: &mut Spellbook) {
    let mut add = |rule: Rule| book.add_rule(ROOT_PAGE, rule);

    add(Rule::new(0, at(0), Kind::string(&b"\x89PNG\r\n\x1a\n"[..]), "PNG image data").with_mime(mime_type("image/png")));
    add(Rule::new(1, at(16), any(4, Big), "\x08, %d x"));
    add(Rule::new(1, at(20), any(4, Big), "%d"));

    add(Rule::new(0, at(0), Kind::string("GIF8"), "GIF image data").with_mime(mime_type("image/gif")));
    add(Rule::new(1, at(4), Kind::string("7a"), "\x08, version 87a"));
    add(Rule::new(1, at(4), Kind::string("9a"), "\x08, version 89a"));
    add(Rule::new(1, at(6), any(2, Little), "\x08, %d x"));
    add(Rule::new(1, at(8), any(2, Little), "%d"));

    add(Rule::new(0, at(0), Kind::string(&b"\xff\xd8\xff"[..]), "JPEG image data").with_mime(mime_type("image/jpeg")));
    add(Rule::new(1, at(3), byte(0xe0), "\x08, JFIF standard"));
    add(Rule::new(1, at(3), byte(0xe1), "\x08, Exif standard"));

    // TIFF comes in both byte orders, with the first IFD offset at 4
    for &big in &[false, true] {
        let order = Little.maybe_swapped(big);
        let (magic, name): (&[u8], &str) = if big {
            (&b"MM\x00\x2a"[..], "TIFF image data, big-endian")
        } else {
            (&b"II\x2a\x00"[..], "TIFF image data, little-endian")
        };
        add(Rule::new(0, at(0), Kind::string(magic), name).with_mime(mime_type("image/tiff")));
        add(Rule::new(1, Offset::indirect(IndirectOffset::new(4, 4, order)), any(2, order), "\x08, %d directory entries"));
    }

    add(Rule::new(0, at(0), Kind::search("<svg", 1024), "SVG Scalable Vector Graphics image").with_mime(mime_type("image/svg+xml")));
}

fn documents(book: &mut Spellbook) {
    let mut add = |rule: Rule| book.add_rule(ROOT_PAGE, rule);

    add(Rule::new(0, at(0), Kind::string("%PDF-"), "PDF document").with_mime(mime_type("application/pdf")));
    add(Rule::new(1, at(5), any(1, Little), "\x08, version %c"));
    add(Rule::new(1, at(7), any(1, Little), "\x08.%c"));

    let either_case = StringFlags { lower_matches_both: true, ..StringFlags::default() };
    add(Rule::new(0, at(0), StringKind::new("<!doctype html").with_flags(either_case).into(), "HTML document text").with_mime(mime_type("text/html")));

    let blanks = StringFlags { optional_blanks: true, ..StringFlags::default() };
    add(Rule::new(0, at(0), StringKind::new("#! /bin/sh").with_flags(blanks).into(), "POSIX shell script text executable").with_mime(mime_type("text/x-shellscript")));
    add(Rule::new(0, at(0), StringKind::new("#! /usr/bin/env python").with_flags(blanks).into(), "Python script text executable").with_mime(mime_type("text/x-python")));
}

fn archives(book: &mut Spellbook) {
    let mut add = |rule: Rule| book.add_rule(ROOT_PAGE, rule);

    add(Rule::new(0, at(0), Kind::string("PK\x03\x04"), "Zip archive data").with_mime(mime_type("application/zip")));
    add(Rule::new(1, at(30), Kind::string("mimetype"), ""));
    add(Rule::new(2, at(38), Kind::string("application/epub+zip"), "\x08, EPUB document").with_mime(mime_type("application/epub+zip")));

    add(Rule::new(0, at(0), Kind::string(&b"\x1f\x8b"[..]), "gzip compressed data").with_mime(mime_type("application/gzip")));
    add(Rule::new(1, at(2), byte(8), "\x08, deflated"));
    add(Rule::new(1, at(3), IntegerKind::new(1, Little, Equal, 0x08).masked(0x08).into(), "\x08, original name"));
    add(Rule::new(1, at(3), IntegerKind::new(1, Little, Equal, 0x01).masked(0x01).into(), "\x08, ASCII"));
}

fn executables(book: &mut Spellbook) {
    let mut add = |rule: Rule| book.add_rule(ROOT_PAGE, rule);

    add(Rule::new(0, at(0), Kind::string("\x7fELF"), "ELF").with_mime(mime_type("application/x-executable")));
    add(Rule::new(1, at(4), byte(1), "32-bit"));
    add(Rule::new(1, at(4), byte(2), "64-bit"));
    for &(class, order, name) in &[(1, Little, "LSB"), (2, Big, "MSB")] {
        add(Rule::new(1, at(5), byte(class), name));
        add(Rule::new(2, at(16), short(order, 1), "relocatable"));
        add(Rule::new(2, at(16), short(order, 2), "executable"));
        add(Rule::new(2, at(16), short(order, 3), "shared object"));
        add(Rule::new(2, at(16), Kind::Default, "unknown type"));
        add(Rule::new(2, at(0), Kind::Clear, ""));
        add(Rule::new(2, at(18), short(order, 3), "\x08, Intel 80386"));
        add(Rule::new(2, at(18), short(order, 62), "\x08, x86-64"));
        add(Rule::new(2, at(18), short(order, 183), "\x08, ARM aarch64"));
        add(Rule::new(2, at(18), Kind::Default, "\x08, unknown machine"));
    }

    // The PE header offset sits at 0x3c
    add(Rule::new(0, at(0), Kind::string("MZ"), "MS-DOS executable").with_mime(mime_type("application/x-dosexec")));
    add(Rule::new(1, Offset::indirect(IndirectOffset::new(0x3c, 4, Little)), Kind::string(&b"PE\0\0"[..]), "\x08, PE executable"));
    add(Rule::new(2, at(0).relative(), short(Little, 0x14c), "\x08 for Intel 80386"));
    add(Rule::new(2, Offset::indirect(IndirectOffset::new(0x3c, 4, Little).adjusted(OffsetAdjustment::Add(4))), short(Little, 0x8664), "\x08 for x86-64"));
}

/// Builds the bundled spellbook. Prefer `BUILTIN`, which builds it once.
pub fn spellbook() -> Spellbook {
    let mut book = Spellbook::new();
    images(&mut book);
    documents(&mut book);
    archives(&mut book);
    executables(&mut book);
    book
}
