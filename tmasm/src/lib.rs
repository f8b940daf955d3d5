//! Compiler from a small C-like language to a multi-tape Turing machine.
//!
//! The main entry point is [`compile`](fn.compile.html), which accepts the
//! source as a vector of lines and returns a fully built
//! [`MultiTapeMachine`](../tmvm/struct.MultiTapeMachine.html). It is the
//! composition of [`source_to_assembly`](fn.source_to_assembly.html), a chain
//! of source-to-source rewrites ending in a flat jump-based assembly, and
//! [`assembly_to_machine`](fn.assembly_to_machine.html), which emits one
//! block of transitions per assembly line.
//!
//! # Source language
//!
//! Types are `int` (arbitrary precision) and `bool`. There is one global,
//! the unbounded integer array `MEM`, and three I/O primitives `nextInt()`,
//! `printInt(int)` and `printSpace()`. Control flow is `if`/`else`, `while`,
//! three-clause `for`, `break`, `continue` and `return`; `main` is the
//! required entry point. Operators:
//!
//!  Kind        | Operators
//! -------------|----------------------------------------
//!  arithmetic  | `+ - * / %` and unary `-`
//!  comparison  | `< <= > >= == !=`
//!  logical     | `! && \|\|` (short-circuiting)
//!  bitwise     | `^`
//!  assignment  | `= += -= *= /= %= &= \|= ^=`
//!
//! Functions take parameters by value, may recurse, and must have names
//! distinct from every variable. User globals, pointers, arrays other than
//! `MEM`, strings and `++`/`--` do not exist.
//!
//! # Assembly
//!
//! The intermediate assembly is plain text, one instruction per line,
//! space-separated and `;`-terminated:
//!
//!  Form                              | Meaning
//! -----------------------------------|---------------------------------------
//! `nop ;`                            | jump target, does nothing
//! `jmp N ;`                          | unconditional jump to line `N`
//! `jf T N ;`                         | jump to `N` when tape `T` holds false
//! `call N ;`                         | push frames, save IP, jump to `N`
//! `call !FUNC_LIB_f T... ;`          | inlined machine primitive
//! `return ;`                         | pop frames, restore IP
//! `push T !TAPE_PARAMS ;`            | push `T` onto the parameter stack
//! `pop !TAPE_PARAMS T ;`             | pop the parameter stack into `T`
//! `pop !TAPE_RAX T ;`                | copy the return value into `T`
//! `Td Ts = ;`                        | copy tape to tape
//! `Td lit = ;`                       | write a literal
//! `Ta ! = Td ;`                      | logical not
//! `Ta Tb && = Td ;` (and `\|\|`)     | logical and / or
//!
//! Integers live on tapes as a sign cell followed by magnitude bits,
//! least-significant first; the instruction pointer is a block of two's
//! complement cells mirrored onto per-bit scratch tapes so transitions can
//! match on it.

mod calls;
mod control;
mod error;
mod exprs;
mod lexer;
mod link;
mod names;
pub mod parser;
mod temps;
mod words;

pub mod codegen;


pub use crate::codegen::{assembly_to_machine, INPUT_TAPE, OUTPUT_TAPE};
pub use crate::error::{Error, Result};

use crate::words::{all_words, find_matching, find_next, TYPES};
use tmvm::MultiTapeMachine;

/// Source of fresh temporaries; numbering is monotone across the whole
/// compilation and renumbered per function later.
pub(crate) struct TempGen {
    next: usize,
}

impl TempGen {
    pub(crate) fn new() -> TempGen {
        TempGen { next: 0 }
    }

    pub(crate) fn fresh(&mut self) -> String {
        let name = format!("{}{}", names::TEMP_PREFIX, self.next);
        self.next += 1;
        name
    }
}

/// Syntactic pre-check on the normalized token stream: balanced brackets,
/// braced bodies after every control header, no redeclared runtime names,
/// and a `main` to jump to.
fn precheck(program: &[String]) -> Result<()> {
    let tokens = all_words(program);

    let mut stack: Vec<&str> = Vec::new();
    for token in &tokens {
        match token.as_str() {
            "(" | "[" | "{" => stack.push(token),
            ")" | "]" | "}" => {
                let expected = match token.as_str() {
                    ")" => "(",
                    "]" => "[",
                    _ => "{",
                };
                if stack.pop() != Some(expected) {
                    return Err(Error::Precheck(format!("unbalanced `{}`", token)));
                }
            }
            _ => {}
        }
    }
    if let Some(open) = stack.pop() {
        return Err(Error::Precheck(format!("unclosed `{}`", open)));
    }

    for i in 0..tokens.len() {
        match tokens[i].as_str() {
            "if" | "while" | "for" => {
                let braced = find_next(&tokens, "(", i)
                    .filter(|&open| open == i + 1)
                    .and_then(|open| find_matching(&tokens, open))
                    .map_or(false, |close| {
                        tokens.get(close + 1).map(String::as_str) == Some("{")
                    });
                if !braced {
                    return Err(Error::Precheck(format!(
                        "`{}` needs a parenthesized head and a braced body",
                        tokens[i]
                    )));
                }
            }
            "else" => {
                let next = tokens.get(i + 1).map(String::as_str);
                if next != Some("{") && next != Some("if") {
                    return Err(Error::Precheck(
                        "`else` needs a braced body".to_owned(),
                    ));
                }
            }
            _ => {}
        }
    }

    let mut has_main = false;
    for i in 1..tokens.len() {
        if TYPES.contains(&tokens[i - 1].as_str()) {
            let name = tokens[i].as_str();
            if name == "MEM" || names::LIB_VOCAB.contains(&name) {
                return Err(Error::Precheck(format!("`{}` is reserved", name)));
            }
            if name == "main" {
                has_main = true;
            }
        }
    }
    if !has_main {
        return Err(Error::Precheck("no `main` function".to_owned()));
    }

    Ok(())
}

/// Lower the source program to the flat assembly described in the crate
/// documentation. Passes run in a fixed order, each re-reading its
/// predecessor's token stream.
pub fn source_to_assembly(source: &[String]) -> Result<Vec<String>> {
    let mut temps = TempGen::new();

    let p = lexer::strip_comments(source)?;
    let p = lexer::space_operators(&p);
    let p = lexer::reformat(&p);
    precheck(&p)?;

    let p = names::resolve_user_names(&p, names::USER_FUNC);
    let p = names::resolve_library_names(&p);
    let p = lexer::reformat(&p);
    names::check_resolved(&p)?;

    let p = names::prepend_library(p)?;

    let p = control::for_to_while(&p);
    let p = control::expand_else_if(&p);
    let p = lexer::reformat(&p);

    let p = control::lower_while_conditions(&p);
    let p = lexer::reformat(&p);

    let p = control::append_void_returns(&p);
    let p = lexer::reformat(&p);

    let p = control::parenthesize_returns(&p);
    let p = lexer::reformat(&p);

    let p = control::split_declarations(&p);
    let p = lexer::reformat(&p);

    let p = exprs::simplify_expressions(&p, &mut temps)?;
    let p = lexer::reformat(&p);

    let p = exprs::lower_compound_assignments(&p, &mut temps);
    let p = lexer::reformat(&p);

    let p = exprs::replace_operators(&p);
    let p = lexer::reformat(&p);

    let p = exprs::materialize_arguments(&p, &mut temps);
    let p = lexer::reformat(&p);

    let p = exprs::lower_memory_access(&p, &mut temps);
    let p = lexer::reformat(&p);

    let p = temps::reuse_temporaries(&p);
    let p = lexer::reformat(&p);

    let p = temps::hoist_declarations(&p);
    let p = lexer::reformat(&p);

    let p = temps::lower_returns(&p);
    let p = lexer::reformat(&p);

    let p = calls::lower_calling_convention(&p);
    let p = lexer::reformat(&p);

    let p = calls::map_variables_to_tapes(&p);
    let p = lexer::reformat(&p);

    let p = link::link_jumps(&p);
    Ok(lexer::reformat(&p))
}

/// Compile source lines all the way down to a runnable machine.
pub fn compile(source: &[String]) -> Result<MultiTapeMachine> {
    let assembly = source_to_assembly(source)?;
    assembly_to_machine(&assembly)
}
