//! Binary serialization of built [tmvm](../tmvm/index.html) machines.
//!
//! The format is a fixed header (state count, tape count, initial and halt
//! state), one record per tape (signed window start, signed head offset and
//! the cell string between the first and last non-blank cell), then the
//! transition count and one record per transition: source and target state,
//! the serialized read and write rule strings, and one signed byte per tape
//! for the head shifts. Writing a partially-run machine and reading it back
//! reproduces every tape's contents and head position.

use byteorder::{ReadBytesExt, WriteBytesExt};
use num_traits::{FromPrimitive, ToPrimitive};
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter, Error, ErrorKind};
use std::path::Path;
use tmvm::{
    parse_cells, read_patterns_from_str, write_rules_from_str, MultiTapeMachine, Shift, Transition,
};
use util::Endian;

fn invalid_data<E: std::fmt::Display>(err: E) -> Error {
    Error::new(ErrorKind::InvalidData, err.to_string())
}

fn write_str<W: Write>(writer: &mut W, s: &str) -> std::io::Result<()> {
    writer.write_u32::<Endian>(s.len() as u32)?;
    writer.write_all(s.as_bytes())
}

fn read_str<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let len = reader.read_u32::<Endian>()?;
    let mut bytes = vec![0; len as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(invalid_data)
}

pub fn write<W: Write>(writer: &mut W, machine: &MultiTapeMachine) -> std::io::Result<()> {
    writer.write_u32::<Endian>(machine.num_states() as u32)?;
    writer.write_u32::<Endian>(machine.num_tapes() as u32)?;
    writer.write_u32::<Endian>(machine.initial() as u32)?;
    writer.write_u32::<Endian>(machine.halt() as u32)?;

    for index in 0..machine.num_tapes() {
        let tape = machine.tape(index);
        writer.write_i64::<Endian>(tape.contents_start())?;
        writer.write_i64::<Endian>(tape.head())?;
        write_str(writer, &tape.contents())?;
    }

    let transitions: Vec<&Transition> = machine.transitions().collect();
    writer.write_u32::<Endian>(transitions.len() as u32)?;

    for transition in transitions {
        writer.write_u32::<Endian>(transition.from as u32)?;
        writer.write_u32::<Endian>(transition.to as u32)?;
        write_str(writer, &transition.read_string())?;
        write_str(writer, &transition.write_string())?;
        for shift in transition.shifts.iter() {
            writer.write_i8(shift.to_i8().unwrap_or(0))?;
        }
    }

    Ok(())
}

pub fn read<R: Read>(reader: &mut R) -> std::io::Result<MultiTapeMachine> {
    let num_states = reader.read_u32::<Endian>()? as usize;
    let num_tapes = reader.read_u32::<Endian>()? as usize;
    let initial = reader.read_u32::<Endian>()? as usize;
    let halt = reader.read_u32::<Endian>()? as usize;

    let mut tapes = Vec::with_capacity(num_tapes);
    for _ in 0..num_tapes {
        let start = reader.read_i64::<Endian>()?;
        let head = reader.read_i64::<Endian>()?;
        let cells = parse_cells(&read_str(reader)?).map_err(invalid_data)?;
        tapes.push((start, head, cells));
    }

    let count = reader.read_u32::<Endian>()? as usize;

    let mut transitions = Vec::with_capacity(count);
    for _ in 0..count {
        let from = reader.read_u32::<Endian>()? as usize;
        let to = reader.read_u32::<Endian>()? as usize;

        let read_rules = read_patterns_from_str(&read_str(reader)?).map_err(invalid_data)?;
        let write_rules = write_rules_from_str(&read_str(reader)?).map_err(invalid_data)?;

        let mut shifts = Vec::with_capacity(num_tapes);
        for _ in 0..num_tapes {
            let raw = reader.read_i8()?;
            let shift = Shift::from_i8(raw)
                .ok_or_else(|| invalid_data(format!("invalid shift {}", raw)))?;
            shifts.push(shift);
        }

        if read_rules.len() != num_tapes || write_rules.len() != num_tapes {
            return Err(invalid_data("transition rule arity mismatch"));
        }
        if from >= num_states || to >= num_states {
            return Err(invalid_data("transition state out of range"));
        }

        transitions.push(Transition::new(from, read_rules, to, write_rules, shifts));
    }

    let mut machine = MultiTapeMachine::new(num_states, num_tapes, initial, halt, transitions);
    for (index, (start, head, cells)) in tapes.into_iter().enumerate() {
        machine.tape_mut(index).restore(start, &cells, head);
    }
    Ok(machine)
}

pub trait ReadMachineExt: Read + Sized {
    fn read_machine(&mut self) -> std::io::Result<MultiTapeMachine> {
        read(self)
    }
}

impl<R: Read + Sized> ReadMachineExt for R {}

pub trait WriteMachineExt: Write + Sized {
    fn write_machine(&mut self, machine: &MultiTapeMachine) -> std::io::Result<()> {
        write(self, machine)
    }
}

impl<W: Write + Sized> WriteMachineExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> std::io::Result<MultiTapeMachine> {
    BufReader::new(File::open(path)?).read_machine()
}

pub fn write_file<P: AsRef<Path>>(path: P, machine: &MultiTapeMachine) -> std::io::Result<()> {
    BufWriter::new(File::create(path)?).write_machine(machine)
}

#[cfg(test)]
mod test;
