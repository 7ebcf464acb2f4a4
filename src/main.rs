use anyhow::{Context, Result};
use rson::{Documents, Formatter, IoStream, Limits};
use std::fs::File;
use std::io::{stdin, stdout, Read, Write};
use tracing_subscriber::EnvFilter;

#[macro_use]
extern crate clap;
use clap::App;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let yaml = load_yaml!("main.yml");
    let matches = App::from_yaml(yaml).get_matches();
    let mut limits = Limits::default();
    if let Some(depth) = matches.value_of("max_depth") {
        limits.max_nesting_depth = depth
            .parse()
            .with_context(|| format!("invalid --max-depth `{}`", depth))?;
    }
    if let Some(path) = matches.value_of_os("json_file") {
        let f = File::open(path).with_context(|| format!("cannot open {:?}", path))?;
        let result = format(f, limits)?;
        if matches.is_present("in_place") {
            let mut f = File::create(path)?;
            f.write_all(&result)?;
        } else {
            stdout().write_all(&result)?;
        }
    } else {
        let stdin = stdin();
        let result = format(stdin.lock(), limits)?;
        stdout().write_all(&result)?;
    }
    Ok(())
}

// Every document in the input, canonicalized, one per line.
fn format<R: Read>(reader: R, limits: Limits) -> Result<Vec<u8>> {
    let mut stream = IoStream::new(reader);
    let formatter = Formatter::new();
    let mut out = Vec::new();
    for doc in Documents::with_limits(&mut stream, limits) {
        out.extend_from_slice(&formatter.format(&doc?)?);
        out.push(b'\n');
    }
    if let Some(e) = stream.take_error() {
        return Err(e).context("failed to read input");
    }
    Ok(out)
}
