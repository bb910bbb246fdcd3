#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs::{self, File};
use std::io::prelude::*;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use asm10::{preprocess, AssembleError};

#[derive(Debug)]
enum IOErrorContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Assemble(AssembleError),
    Io(std::io::Error, IOErrorContext, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadInput => "Reading input",
                    IOErrorContext::WriteOutput => "Writing output",
                },
                path.display(),
                err
            ),
            Error::Assemble(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("FILES")
                .help("Source files to assemble, without the .as extension")
                .required(true)
                .multiple(true),
        )
        .get_matches();

    let files: Vec<&str> = matches.values_of("FILES").unwrap().collect();
    let mut any_failed = false;

    for name in files {
        if let Err(err) = assemble_one(name) {
            eprintln!("{}: {}", name, err);
            any_failed = true;
        }
    }

    if any_failed {
        std::process::exit(1);
    }
}

/// Runs the full pipeline for one file: preprocess `<name>.as` into
/// `<name>.am`, then assemble and write `<name>.ob`, `<name>.ent`, and
/// `<name>.ext`. A single file's failure is reported and does not stop
/// the remaining files in the argument list from being processed.
fn assemble_one(name: &str) -> Result<(), Error> {
    let source_path = PathBuf::from(format!("{}.as", name));
    let source = read_to_string(&source_path)?;

    let mut diagnostics = Vec::new();
    let pre = preprocess(&source, &mut diagnostics);

    let am_path = PathBuf::from(format!("{}.am", name));
    write_string(&am_path, &pre.text)?;

    if !diagnostics.is_empty() {
        let _ = fs::remove_file(&am_path);
        return Err(Error::Assemble(AssembleError::new(diagnostics)));
    }

    let state = asm10::assemble(&pre.text).map_err(Error::Assemble)?;

    let ob_path = PathBuf::from(format!("{}.ob", name));
    let ob_file = File::create(&ob_path).map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, ob_path.clone()))?;
    let mut ob_writer = BufWriter::new(ob_file);
    asm10::writer::write_object(&state, &mut ob_writer)
        .map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, ob_path))?;

    let ent_path = PathBuf::from(format!("{}.ent", name));
    write_optional(&ent_path, |w| asm10::writer::write_entries(&state, w))?;

    let ext_path = PathBuf::from(format!("{}.ext", name));
    write_optional(&ext_path, |w| asm10::writer::write_externals(&state, w))?;

    Ok(())
}

fn read_to_string(path: &Path) -> Result<String, Error> {
    let file = File::open(path).map_err(|err| Error::Io(err, IOErrorContext::ReadInput, path.to_owned()))?;
    let mut reader = std::io::BufReader::new(file);
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, path.to_owned()))?;
    Ok(buf)
}

fn write_string(path: &Path, text: &str) -> Result<(), Error> {
    let mut file = File::create(path).map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, path.to_owned()))?;
    file.write_all(text.as_bytes())
        .map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, path.to_owned()))
}

/// Writes a file via `writer`, but removes it again if `writer` reports
/// nothing was written, so a file with no entries/externals never gets
/// an empty file left behind.
fn write_optional(
    path: &Path,
    writer: impl FnOnce(&mut dyn Write) -> std::io::Result<bool>,
) -> Result<(), Error> {
    let file = File::create(path).map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, path.to_owned()))?;
    let mut buffered = BufWriter::new(file);
    let wrote = writer(&mut buffered).map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, path.to_owned()))?;
    drop(buffered);
    if !wrote {
        let _ = fs::remove_file(path);
    }
    Ok(())
}
