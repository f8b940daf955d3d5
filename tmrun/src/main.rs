#[macro_use]
extern crate clap;

use clap::Arg;
use num::bigint::BigInt;
use std::path::PathBuf;
use std::str::FromStr;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("SOURCE")
                .help("Sets the source file to compile and run")
                .index(1),
        )
        .arg(
            Arg::with_name("machine")
                .short("p")
                .long("machine")
                .takes_value(true)
                .value_name("MACHINE")
                .help("Runs a prebuilt machine file instead of compiling"),
        )
        .arg(
            Arg::with_name("machine_out")
                .short("o")
                .long("machine-out")
                .takes_value(true)
                .value_name("MACHINE_OUT")
                .help("Writes the compiled machine to this file before running"),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("INPUT")
                .help("Whitespace-separated integers fed to the program"),
        )
        .arg(
            Arg::with_name("max_steps")
                .short("s")
                .long("max-steps")
                .takes_value(true)
                .value_name("STEPS")
                .help("Stops the simulation after this many steps"),
        )
        .get_matches();

    let input: Result<Vec<BigInt>, _> = matches
        .value_of("input")
        .unwrap_or("")
        .split_whitespace()
        .map(BigInt::from_str)
        .collect();
    let input = match input {
        Ok(values) => values,
        Err(_) => {
            eprintln!("Input must be whitespace-separated integers");
            std::process::exit(1);
        }
    };

    let max_steps = match matches.value_of("max_steps") {
        None => None,
        Some(raw) => match raw.parse::<u64>() {
            Ok(limit) => Some(limit),
            Err(err) => {
                eprintln!("Bad step limit: {}", err);
                std::process::exit(1);
            }
        },
    };

    let outcome = match (matches.value_of("SOURCE"), matches.value_of("machine")) {
        (Some(source), _) => tmrun::compile_file(source).and_then(|mut machine| {
            if let Some(out_path) = matches.value_of("machine_out") {
                tmfile::write_file(out_path, &machine)
                    .map_err(|err| tmrun::Error::Io(err, PathBuf::from(out_path)))?;
            }
            tmrun::run_machine(&mut machine, &input, max_steps)
        }),
        (None, Some(machine)) => tmrun::run_machine_file(machine, &input, max_steps),
        (None, None) => {
            eprintln!("Either a source file or --machine is required");
            std::process::exit(1);
        }
    };

    match outcome {
        Ok(outcome) => {
            let printed: Vec<String> = outcome.output.iter().map(|v| v.to_string()).collect();
            println!("{}", printed.join(" "));
            if outcome.halted {
                println!("Halted after {} steps", outcome.steps);
            } else {
                println!("Step limit reached after {} steps", outcome.steps);
            }
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}
