//! Pest-based parser for the assembly produced by the lowering passes,
//! turning each line into a typed [`Instr`](../codegen/enum.Instr.html)
//! before transition emission.

use crate::codegen::{Instr, Primitive, TapeRef};
use crate::{Error, Result};
use matches::debug_assert_matches;
use num::bigint::BigInt;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use std::str::FromStr;

#[derive(Parser)]
#[grammar = "asm.pest"]
pub struct AsmParser;

fn bad(line: usize, message: String) -> Error {
    Error::BadAssembly { line, message }
}

fn next_pair<'i>(inner: &mut Pairs<'i, Rule>, line: usize, what: &str) -> Result<Pair<'i, Rule>> {
    inner
        .next()
        .ok_or_else(|| bad(line, format!("missing {}", what)))
}

fn parse_tape(pair: Pair<Rule>, line: usize) -> Result<TapeRef> {
    debug_assert_matches!(pair.as_rule(), Rule::tape);
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| bad(line, "empty tape reference".to_owned()))?;
    match inner.as_rule() {
        Rule::tape_rax => Ok(TapeRef::Rax),
        Rule::tape_var => {
            let digits = inner
                .into_inner()
                .next()
                .ok_or_else(|| bad(line, "tape reference without index".to_owned()))?;
            let index = digits
                .as_str()
                .parse::<usize>()
                .map_err(|e| bad(line, format!("bad tape index: {}", e)))?;
            Ok(TapeRef::Var(index))
        }
        _ => Err(bad(line, "unrecognized tape reference".to_owned())),
    }
}

fn parse_target(pair: Pair<Rule>, line: usize) -> Result<usize> {
    pair.as_str()
        .parse::<usize>()
        .map_err(|e| bad(line, format!("bad jump target: {}", e)))
}

/// Parse one assembly line. Grammar failures surface as `Error::Parse`,
/// structural problems (unknown primitive name, bad index) as
/// `Error::BadAssembly`, both carrying the line number.
pub(crate) fn parse_line(text: &str, line: usize) -> Result<Instr> {
    let trimmed = text.trim();
    let mut pairs = AsmParser::parse(Rule::line, trimmed).map_err(|e| Error::Parse {
        line,
        source: Box::new(e),
    })?;

    let instr = pairs
        .next()
        .and_then(|p| p.into_inner().next())
        .and_then(|p| p.into_inner().next())
        .ok_or_else(|| bad(line, "empty instruction".to_owned()))?;

    let rule = instr.as_rule();
    let mut inner = instr.into_inner();

    match rule {
        Rule::instr_nop => Ok(Instr::Nop),
        Rule::instr_jmp => Ok(Instr::Jmp(parse_target(
            next_pair(&mut inner, line, "target")?,
            line,
        )?)),
        Rule::instr_jf => {
            let tape = parse_tape(next_pair(&mut inner, line, "tape")?, line)?;
            let target = parse_target(next_pair(&mut inner, line, "target")?, line)?;
            Ok(Instr::Jf { tape, target })
        }
        Rule::instr_call_lib => {
            let func = next_pair(&mut inner, line, "library function")?;
            let name_pair = func
                .into_inner()
                .next()
                .ok_or_else(|| bad(line, "missing library function name".to_owned()))?;
            let name = Primitive::from_str(name_pair.as_str())
                .map_err(|e| bad(line, e.to_string()))?;
            let mut args = Vec::new();
            for pair in inner {
                args.push(parse_tape(pair, line)?);
            }
            Ok(Instr::CallPrimitive { name, args })
        }
        Rule::instr_call => Ok(Instr::Call(parse_target(
            next_pair(&mut inner, line, "target")?,
            line,
        )?)),
        Rule::instr_return => Ok(Instr::Return),
        Rule::instr_push => Ok(Instr::Push {
            src: parse_tape(next_pair(&mut inner, line, "source tape")?, line)?,
        }),
        Rule::instr_pop_params => {
            let _params = next_pair(&mut inner, line, "parameter stack")?;
            Ok(Instr::PopParam {
                dst: parse_tape(next_pair(&mut inner, line, "destination tape")?, line)?,
            })
        }
        Rule::instr_pop_rax => Ok(Instr::PopResult {
            dst: parse_tape(next_pair(&mut inner, line, "destination tape")?, line)?,
        }),
        Rule::instr_not => {
            let arg = parse_tape(next_pair(&mut inner, line, "argument")?, line)?;
            let dst = parse_tape(next_pair(&mut inner, line, "destination")?, line)?;
            Ok(Instr::Not { arg, dst })
        }
        Rule::instr_and => {
            let a = parse_tape(next_pair(&mut inner, line, "first argument")?, line)?;
            let b = parse_tape(next_pair(&mut inner, line, "second argument")?, line)?;
            let dst = parse_tape(next_pair(&mut inner, line, "destination")?, line)?;
            Ok(Instr::And { a, b, dst })
        }
        Rule::instr_or => {
            let a = parse_tape(next_pair(&mut inner, line, "first argument")?, line)?;
            let b = parse_tape(next_pair(&mut inner, line, "second argument")?, line)?;
            let dst = parse_tape(next_pair(&mut inner, line, "destination")?, line)?;
            Ok(Instr::Or { a, b, dst })
        }
        Rule::instr_true => Ok(Instr::SetTrue {
            dst: parse_tape(next_pair(&mut inner, line, "destination")?, line)?,
        }),
        Rule::instr_false => Ok(Instr::SetFalse {
            dst: parse_tape(next_pair(&mut inner, line, "destination")?, line)?,
        }),
        Rule::instr_lit => {
            let dst = parse_tape(next_pair(&mut inner, line, "destination")?, line)?;
            let literal = next_pair(&mut inner, line, "literal")?;
            let value = BigInt::from_str(literal.as_str())
                .map_err(|_| bad(line, format!("bad integer literal `{}`", literal.as_str())))?;
            Ok(Instr::SetInt { dst, value })
        }
        Rule::instr_copy => {
            let dst = parse_tape(next_pair(&mut inner, line, "destination")?, line)?;
            let src = parse_tape(next_pair(&mut inner, line, "source")?, line)?;
            Ok(Instr::Copy { dst, src })
        }
        _ => Err(bad(line, "unrecognized instruction".to_owned())),
    }
}
