//! Compile-and-run front end over [tmasm](../tmasm/index.html) and
//! [tmvm](../tmvm/index.html): feed a source program and its input integers
//! in, get the decoded output integers and the step count back.

use num::bigint::BigInt;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tmasm::OUTPUT_TAPE;
use tmvm::{decode_output, encode_input, MultiTapeMachine, RunResult};

#[derive(Debug)]
pub enum Error {
    Compile(tmasm::Error),
    Io(std::io::Error, PathBuf),
    BadInput(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Compile(err) => write!(f, "{}", err),
            Error::Io(err, path) => write!(f, "{}: {}", path.display(), err),
            Error::BadInput(what) => write!(f, "Bad input: {}", what),
        }
    }
}

impl From<tmasm::Error> for Error {
    fn from(err: tmasm::Error) -> Error {
        Error::Compile(err)
    }
}

/// What a finished (or cut off) run produced.
#[derive(Debug, PartialEq)]
pub struct Outcome {
    pub output: Vec<BigInt>,
    pub steps: u64,
    pub halted: bool,
}

/// Feed `input` to a built machine and run it to halt or `max_steps`.
pub fn run_machine(
    machine: &mut MultiTapeMachine,
    input: &[BigInt],
    max_steps: Option<u64>,
) -> Result<Outcome, Error> {
    machine
        .set_input(&encode_input(input))
        .map_err(|err| Error::BadInput(err.to_string()))?;

    let result = machine.run(max_steps);

    let output = decode_output(&machine.tape(OUTPUT_TAPE).contents())
        .map_err(|err| Error::BadInput(err.to_string()))?;

    Ok(Outcome {
        output,
        steps: machine.steps(),
        halted: result == RunResult::Halted,
    })
}

/// Compile source lines and run them on the given input.
pub fn run_source(
    source: &[String],
    input: &[BigInt],
    max_steps: Option<u64>,
) -> Result<Outcome, Error> {
    let mut machine = tmasm::compile(source)?;
    run_machine(&mut machine, input, max_steps)
}

/// Compile a source file into a runnable machine.
pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<MultiTapeMachine, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| Error::Io(err, path.to_owned()))?;
    let mut source = String::new();
    BufReader::new(file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, path.to_owned()))?;

    let lines: Vec<String> = source.lines().map(str::to_owned).collect();
    Ok(tmasm::compile(&lines)?)
}

/// Compile a source file and run it on the given input.
pub fn run_file<P: AsRef<Path>>(
    path: P,
    input: &[BigInt],
    max_steps: Option<u64>,
) -> Result<Outcome, Error> {
    let mut machine = compile_file(path)?;
    run_machine(&mut machine, input, max_steps)
}

/// Load a machine file produced by `tmasm` and run it on the given input.
pub fn run_machine_file<P: AsRef<Path>>(
    path: P,
    input: &[BigInt],
    max_steps: Option<u64>,
) -> Result<Outcome, Error> {
    let path = path.as_ref();
    let mut machine = tmfile::read_file(path).map_err(|err| Error::Io(err, path.to_owned()))?;
    run_machine(&mut machine, input, max_steps)
}
