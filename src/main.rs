use javaserial::dump::{Dump, DumpWriter};
use javaserial::*;

use clap::{value_parser, Arg, ArgMatches, Command};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Ways running the tool can go wrong
#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Decode(Error),
    Encode(EncodeError),

    /// Re-encoding a stream did not reproduce it (first differing byte offset)
    RoundTripMismatch(usize),

    MissingArgument(&'static str),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> CliError {
        CliError::Io(err)
    }
}

impl From<Error> for CliError {
    fn from(err: Error) -> CliError {
        CliError::Decode(err)
    }
}

impl From<EncodeError> for CliError {
    fn from(err: EncodeError) -> CliError {
        CliError::Encode(err)
    }
}

fn main() -> Result<(), CliError> {
    env_logger::init();

    let input = Arg::new("INPUT")
        .help("Sets the input serialization stream file to use")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .index(1);

    let matches = Command::new("Java serialization stream tool")
        .version(clap::crate_version!())
        .author("Alec Theriault <alec.theriault@gmail.com>")
        .about("Inspect and re-encode Java object serialization streams")
        .subcommand_required(true)
        .arg(
            Arg::new("max class depth")
                .long("max-class-depth")
                .value_name("DEPTH")
                .required(false)
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Maximum number of classes in a class hierarchy"),
        )
        .arg(
            Arg::new("max nesting depth")
                .long("max-nesting-depth")
                .value_name("DEPTH")
                .required(false)
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Maximum nesting of records inside records"),
        )
        .subcommand(
            Command::new("dump")
                .about("Print the records of a stream")
                .arg(input.clone()),
        )
        .subcommand(
            Command::new("reencode")
                .about("Decode then encode a stream, checking that the bytes are reproduced")
                .arg(input)
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_name("FILE")
                        .required(false)
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write the re-encoded stream to this file"),
                ),
        )
        .get_matches();

    let mut settings = Settings::new();
    if let Some(depth) = matches.get_one::<usize>("max class depth") {
        settings.max_class_depth = *depth;
    }
    if let Some(depth) = matches.get_one::<usize>("max nesting depth") {
        settings.max_nesting_depth = *depth;
    }

    match matches.subcommand() {
        Some(("dump", dump_matches)) => dump(dump_matches, settings),
        Some(("reencode", reencode_matches)) => reencode(reencode_matches, settings),
        _ => Err(CliError::MissingArgument("subcommand")),
    }
}

fn read_input(matches: &ArgMatches, settings: Settings) -> Result<(Vec<u8>, SerializedStream), CliError> {
    let input_file = matches
        .get_one::<PathBuf>("INPUT")
        .ok_or(CliError::MissingArgument("INPUT"))?;
    log::info!("Reading and decoding '{}'", input_file.display());
    let bytes = fs::read(input_file)?;
    let stream = SerializedStream::decode_with(&bytes, settings)?;
    Ok((bytes, stream))
}

fn dump(matches: &ArgMatches, settings: Settings) -> Result<(), CliError> {
    let (_, stream) = read_input(matches, settings)?;
    let stdout = io::stdout();
    let mut writer = DumpWriter::new(stdout.lock());
    stream.dump(&mut writer)?;
    writer.close()?;
    Ok(())
}

fn reencode(matches: &ArgMatches, settings: Settings) -> Result<(), CliError> {
    let (bytes, stream) = read_input(matches, settings.clone())?;
    let encoded = stream.encode_with(vec![], settings)?;

    if let Some(output_file) = matches.get_one::<PathBuf>("output") {
        log::info!("Writing '{}'", output_file.display());
        fs::write(output_file, &encoded)?;
    }

    if encoded != bytes {
        let offset = encoded
            .iter()
            .zip(&bytes)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| encoded.len().min(bytes.len()));
        log::error!("Re-encoded stream first differs at index {}", offset);
        return Err(CliError::RoundTripMismatch(offset));
    }
    log::info!("Re-encoded {} bytes identically", encoded.len());
    Ok(())
}
