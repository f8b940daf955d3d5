//! Name resolution: tag user identifiers and the library vocabulary with
//! their namespace prefixes, and splice the bundled library in front of the
//! user program.

use crate::words::{all_words, is_integer_literal, one_line, TYPES};
use crate::{lexer, Error, Result};
use std::collections::HashSet;

pub(crate) const USER_VAR: &str = "!VAR_USER_";
pub(crate) const USER_FUNC: &str = "!FUNC_USER_";
pub(crate) const LIB_FUNC: &str = "!FUNC_LIB_";
pub(crate) const LIB_MEM: &str = "!VAR_LIB_MEM";
pub(crate) const TAPE_RAX: &str = "!TAPE_RAX";
pub(crate) const TAPE_PARAMS: &str = "!TAPE_PARAMS";
pub(crate) const TAPE_PREFIX: &str = "!TAPE_tape";
pub(crate) const TEMP_PREFIX: &str = "!VAR_TEMP_temp";

/// Identifiers owned by the runtime; redeclaring them is rejected up front.
pub(crate) const LIB_VOCAB: &[&str] = &[
    "nextInt",
    "printInt",
    "printSpace",
    "isZero",
    "isNeg",
    "isPos",
    "basic_add",
    "basic_sub",
    "basic_xor",
    "basic_eq",
    "basic_lt",
    "basic_neg",
    "basic_mul2",
    "basic_div2",
    "isEven",
    "isOdd",
    "getMemBitIndex",
    "setMemBitIndex",
    "moveMemHeadRight",
    "moveMemHeadLeft",
    "setMemBitZero",
    "setMemBitOne",
    "setMemBitBlank",
    "memBitIsZero",
    "memBitIsOne",
    "memBitIsBlank",
];

/// Find every identifier declared with a type and prefix each of its
/// occurrences. A declared name followed by `(` is a function, otherwise a
/// variable. The function prefix is a parameter so the bundled library can be
/// tagged `!FUNC_LIB_` instead of `!FUNC_USER_`.
pub(crate) fn resolve_user_names(program: &[String], func_prefix: &str) -> Vec<String> {
    let tokens = all_words(program);

    let mut func_names = HashSet::new();
    let mut var_names = HashSet::new();
    for i in 1..tokens.len() {
        if TYPES.contains(&tokens[i - 1].as_str()) {
            if tokens.get(i + 1).map(String::as_str) == Some("(") {
                func_names.insert(tokens[i].clone());
            } else {
                var_names.insert(tokens[i].clone());
            }
        }
    }

    let renamed: Vec<String> = tokens
        .into_iter()
        .map(|token| {
            if func_names.contains(&token) {
                format!("{}{}", func_prefix, token)
            } else if var_names.contains(&token) {
                format!("{}{}", USER_VAR, token)
            } else {
                token
            }
        })
        .collect();

    one_line(&renamed)
}

/// Tag `MEM` and the primitive vocabulary.
pub(crate) fn resolve_library_names(program: &[String]) -> Vec<String> {
    let renamed: Vec<String> = all_words(program)
        .into_iter()
        .map(|token| {
            if token == "MEM" {
                LIB_MEM.to_owned()
            } else if LIB_VOCAB.contains(&token.as_str()) {
                format!("{}{}", LIB_FUNC, token)
            } else {
                token
            }
        })
        .collect();

    one_line(&renamed)
}

const KEYWORDS: &[&str] = &[
    "void", "int", "bool", "if", "else", "while", "for", "break", "continue", "return", "true",
    "false",
];

/// After tagging, every token must be a tagged name, a keyword, a literal or
/// an operator. A bare identifier left over is a use of a name that was
/// never declared anywhere.
pub(crate) fn check_resolved(program: &[String]) -> Result<()> {
    for token in all_words(program) {
        if token.starts_with('!')
            || KEYWORDS.contains(&token.as_str())
            || is_integer_literal(&token)
        {
            continue;
        }

        let mut chars = token.chars();
        let is_operator = match (chars.next(), chars.next()) {
            (Some(c), None) => lexer::ONE_CHAR_OPS.contains(&c),
            _ => lexer::TWO_CHAR_OPS.contains(&token.as_str()),
        };
        if !is_operator {
            return Err(Error::UnknownToken { name: token });
        }
    }
    Ok(())
}

/// Normalize the bundled library source, tag its functions as `!FUNC_LIB_`,
/// and emit it ahead of the user program so later passes see one stream.
pub(crate) fn prepend_library(program: Vec<String>) -> Result<Vec<String>> {
    let lib: Vec<String> = include_str!("lib.tm").lines().map(str::to_owned).collect();

    let lib = lexer::strip_comments(&lib)?;
    let lib = lexer::space_operators(&lib);
    let lib = lexer::reformat(&lib);
    let lib = resolve_user_names(&lib, LIB_FUNC);
    let lib = resolve_library_names(&lib);

    let mut out = lexer::reformat(&lib);
    out.extend(program);
    Ok(out)
}
