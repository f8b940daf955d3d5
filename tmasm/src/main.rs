#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum IoContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Compile(tmasm::Error),
    Io(std::io::Error, IoContext, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => writeln!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IoContext::ReadInput => "Reading input",
                    IoContext::WriteOutput => "Writing output",
                },
                path.display(),
                err
            ),
            Error::Compile(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the source file to compile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Sets the machine file to write to"),
        )
        .arg(
            Arg::with_name("assembly")
                .short("a")
                .long("assembly")
                .takes_value(true)
                .value_name("ASSEMBLY")
                .help("Also writes the intermediate assembly to this file"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("output");
    let assembly = matches.value_of("assembly");

    if let Err(err) = tmasm_main(input, output, assembly) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, Error> {
    let file = File::open(path)
        .map_err(|err| Error::Io(err, IoContext::ReadInput, path.to_owned()))?;
    let mut source = String::new();
    BufReader::new(file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, IoContext::ReadInput, path.to_owned()))?;
    Ok(source.lines().map(str::to_owned).collect())
}

fn tmasm_main(input: &str, output: Option<&str>, assembly: Option<&str>) -> Result<(), Error> {
    let input_path = Path::new(input);
    let source = read_lines(input_path)?;

    let lowered = tmasm::source_to_assembly(&source).map_err(Error::Compile)?;

    if let Some(asm_path_str) = assembly {
        let asm_path = PathBuf::from(asm_path_str);
        write_assembly(&lowered, &asm_path)
            .map_err(|err| Error::Io(err, IoContext::WriteOutput, asm_path))?;
    }

    let machine = tmasm::assembly_to_machine(&lowered).map_err(Error::Compile)?;

    let output_path: PathBuf = output
        .map(PathBuf::from)
        .unwrap_or_else(|| input_path.with_extension("tmm"));
    tmfile::write_file(&output_path, &machine)
        .map_err(|err| Error::Io(err, IoContext::WriteOutput, output_path))?;

    Ok(())
}

fn write_assembly(assembly: &[String], path: &Path) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in assembly {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}
