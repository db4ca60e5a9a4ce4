//! `wizard`: print what the bundled spellbook thinks of some files.

use std::fs::File;
use std::io::prelude::*;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::{App, Arg};
use scoped_threadpool::Pool;
use tabwriter::TabWriter;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use wizardry::{Options, BUILTIN};

/// How much of each file the rules get to see
const READ_LIMIT: u64 = 4096;

fn read_bytes(filepath: &Path, limit: u64) -> io::Result<Vec<u8>> {
    let f = File::open(filepath)?;
    let r = BufReader::new(f);
    let mut b = Vec::<u8>::new();
    r.take(limit).read_to_end(&mut b)?;
    Ok(b)
}

fn describe(filepath: &Path, page: Option<&str>, options: &Options, want_mime: bool) -> String {
    let b = match read_bytes(filepath, READ_LIMIT) {
        Ok(x) => x,
        Err(e) => return format!("cannot open ({})", e),
    };

    match BUILTIN.identify_with(page, b.as_slice(), options) {
        Ok(outcome) => {
            if want_mime {
                match outcome.mime {
                    Some(m) => m.to_string(),
                    None => mime::APPLICATION_OCTET_STREAM.to_string(),
                }
            } else if outcome.matched {
                String::from_utf8_lossy(&outcome.description).into_owned()
            } else {
                "data".to_string()
            }
        }
        Err(e) => format!("error: {}", e),
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = App::new("wizard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Determines the type of files from their contents.")
        .arg(Arg::with_name("file")
            .required(true)
            .multiple(true)
            .help("List of files or folders to check"))
        .arg(Arg::with_name("recursive")
            .short("r")
            .long("recursive")
            .help("Check folders recursively"))
        .arg(Arg::with_name("keep-going")
            .short("k")
            .long("keep-going")
            .help("Keep evaluating after the first match"))
        .arg(Arg::with_name("mime")
            .short("i")
            .long("mime")
            .help("Print MIME types instead of descriptions"))
        .arg(Arg::with_name("page")
            .short("p")
            .long("page")
            .takes_value(true)
            .help("Evaluate this page instead of the root one"))
        .get_matches();

    let mut files = Vec::<PathBuf>::new();
    for arg in args.values_of("file").into_iter().flatten() {
        if args.is_present("recursive") {
            for entry in WalkDir::new(arg).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(PathBuf::from(arg));
        }
    }

    let options = Options { first_match: !args.is_present("keep-going") };
    let page = args.value_of("page");
    let want_mime = args.is_present("mime");

    let mut results = vec![String::new(); files.len()];
    let mut pool = Pool::new(num_cpus::get() as u32);
    pool.scoped(|scope| {
        for (filepath, result) in files.iter().zip(results.iter_mut()) {
            let options = &options;
            scope.execute(move || {
                *result = describe(filepath, page, options, want_mime);
            });
        }
    });

    let mut tw = TabWriter::new(io::stdout());
    for (filepath, result) in files.iter().zip(results.iter()) {
        writeln!(tw, "{}:\t{}", filepath.display(), result)?;
    }
    tw.flush()
}
