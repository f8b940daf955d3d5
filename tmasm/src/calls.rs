//! Calling-convention lowering and variable-to-tape mapping.

use crate::codegen::Primitive;
use crate::names::{LIB_FUNC, TAPE_PARAMS, TAPE_PREFIX, TAPE_RAX};
use crate::words::{all_words, find_matching, find_next, join, one_line, words, TYPES};
use std::collections::HashMap;
use std::str::FromStr;

/// Machine-level primitives keep their arguments inline on the `call` line;
/// everything else goes through the parameter stack.
fn is_primitive(token: &str) -> bool {
    token.starts_with(LIB_FUNC) && Primitive::from_str(&token[LIB_FUNC.len()..]).is_ok()
}

/// Function entries pop their parameters off the parameter stack; call sites
/// push arguments (last first) and collect a result from the RAX tape.
pub(crate) fn lower_calling_convention(program: &[String]) -> Vec<String> {
    let mut lines: Vec<Vec<String>> = program.iter().map(|l| words(l)).collect();
    let mut out: Vec<String> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let w = lines[i].clone();

        let is_header = !w.is_empty()
            && TYPES.contains(&w[0].as_str())
            && w.last().map(String::as_str) == Some("{");

        if is_header {
            let mut param_names: Vec<String> = Vec::new();
            if let Some(open) = find_next(&w, "(", 1) {
                let mut j = open + 1;
                while j + 1 < w.len() && TYPES.contains(&w[j].as_str()) {
                    param_names.push(w[j + 1].clone());
                    j += 3;
                }
            }

            out.push(format!("{} {} {{", w[0], w[1]));
            for j in 0..param_names.len() {
                out.push(format!("pop {} {}{} ;", TAPE_PARAMS, TAPE_PREFIX, j));
            }

            // the parameters become the first entries of the declare list,
            // so parameter k lands on tape k
            if i + 1 < lines.len() && lines[i + 1].first().map(String::as_str) == Some("declare") {
                let mut declare = lines[i + 1].clone();
                declare.splice(1..1, param_names.into_iter());
                lines[i + 1] = declare;
            }
        } else {
            let func_index = if w.len() >= 2 && w[w.len() - 2].starts_with("!FUNC") {
                Some(w.len() - 2)
            } else if w.len() >= 4 && w[w.len() - 4].starts_with("!FUNC") {
                Some(w.len() - 4)
            } else {
                None
            };

            match func_index {
                None => out.push(join(&w)),
                Some(fi) => {
                    let returns_value = fi + 4 == w.len();

                    if is_primitive(&w[fi]) {
                        let mut call = vec!["call".to_owned(), w[fi].clone()];
                        call.extend(w[..fi].iter().cloned());
                        call.push(";".to_owned());
                        out.push(join(&call));
                    } else {
                        for j in (0..fi).rev() {
                            out.push(format!("push {} {} ;", w[j], TAPE_PARAMS));
                        }
                        out.push(format!("call {} ;", w[fi]));
                    }

                    if returns_value {
                        out.push(format!("pop {} {} ;", TAPE_RAX, w[w.len() - 2]));
                    }
                }
            }
        }

        i += 1;
    }

    one_line(&all_words(&out))
}

/// Use each function's `declare` list to map its variables onto numbered
/// tapes, then drop the list.
pub(crate) fn map_variables_to_tapes(program: &[String]) -> Vec<String> {
    let mut tokens = all_words(program);

    let mut open = find_next(&tokens, "{", 0);
    while let Some(open_index) = open {
        let close_index = match find_matching(&tokens, open_index) {
            Some(c) => c,
            None => break,
        };

        let declare = find_next(&tokens, "declare", open_index).filter(|&d| d < close_index);
        if let Some(d) = declare {
            if let Some(semi) = find_next(&tokens, ";", d) {
                let mut mapping: HashMap<String, String> = HashMap::new();
                for (k, name) in tokens[d + 1..semi].iter().enumerate() {
                    mapping.insert(name.clone(), format!("{}{}", TAPE_PREFIX, k));
                }

                for token in tokens[semi + 1..close_index].iter_mut() {
                    if let Some(tape) = mapping.get(token) {
                        *token = tape.clone();
                    }
                }

                for token in tokens[d..=semi].iter_mut() {
                    token.clear();
                }
            }
        }

        open = find_next(&tokens, "{", close_index + 1);
    }

    let kept: Vec<String> = tokens.into_iter().filter(|t| !t.is_empty()).collect();
    one_line(&kept)
}
