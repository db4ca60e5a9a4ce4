#[macro_use]
extern crate bencher;
extern crate wizardry;

use bencher::Bencher;
use wizardry::spell::check::match_kind;
use wizardry::spell::{IntegerKind, IntegerTest, Kind, StringFlags, StringKind};
use wizardry::Endianness;

fn integer(b: &mut Bencher) {
    let kind: Kind = IntegerKind::new(4, Endianness::Big, IntegerTest::Equal, 0x0000_0280).into();
    let buffer = [0u8, 0, 0x02, 0x80];
    b.iter(|| match_kind(&kind, &buffer, 0));
}

fn string_exact(b: &mut Bencher) {
    let kind = Kind::string("<!doctype html");
    let buffer = b"<!doctype html><html></html>";
    b.iter(|| match_kind(&kind, buffer, 0));
}

fn string_folded(b: &mut Bencher) {
    let flags = StringFlags { lower_matches_both: true, compact_whitespace: true, ..StringFlags::default() };
    let kind: Kind = StringKind::new("<!doctype html").with_flags(flags).into();
    let buffer = b"<!DOCTYPE    HTML><html></html>";
    b.iter(|| match_kind(&kind, buffer, 0));
}

/// Worst case: the pattern is not there and the whole window is scanned
fn search_miss(b: &mut Bencher) {
    let kind = Kind::search("<svg", 4096);
    let buffer = vec![b'x'; 4096];
    b.iter(|| match_kind(&kind, &buffer, 0));
}

benchmark_group!(benches, integer, string_exact, string_folded, search_miss);
benchmark_main!(benches);
