//! Expression lowering: shunting-yard into postfix, three-address expansion
//! with fresh temporaries, short-circuit branching for `&&`/`||`, compound
//! assignment expansion, operator-to-library renaming, argument
//! materialization and `MEM` access lowering.

use crate::names::{LIB_FUNC, LIB_MEM};
use crate::words::{all_words, is_integer_literal, join, one_line, words, TYPES};
use crate::{Error, Result, TempGen};
use std::collections::{HashMap, HashSet};

/// Name, parameter types and return type of everything callable: operators,
/// machine primitives and the functions declared in the program itself.
pub(crate) struct FuncSig {
    pub name: String,
    pub params: Vec<String>,
    pub ret: String,
}

fn sig(name: &str, params: &[&str], ret: &str) -> FuncSig {
    FuncSig {
        name: name.to_owned(),
        params: params.iter().map(|p| (*p).to_owned()).collect(),
        ret: ret.to_owned(),
    }
}

pub(crate) fn signatures(program: &[String]) -> Vec<FuncSig> {
    let mut funcs = vec![
        sig("!", &["bool"], "bool"),
        sig("u-", &["int"], "int"),
        sig("+", &["int", "int"], "int"),
        sig("-", &["int", "int"], "int"),
        sig("*", &["int", "int"], "int"),
        sig("/", &["int", "int"], "int"),
        sig("%", &["int", "int"], "int"),
        sig("<", &["int", "int"], "bool"),
        sig(">", &["int", "int"], "bool"),
        sig("<=", &["int", "int"], "bool"),
        sig(">=", &["int", "int"], "bool"),
        sig("==", &["int", "int"], "bool"),
        sig("!=", &["int", "int"], "bool"),
        sig("&&", &["bool", "bool"], "bool"),
        sig("||", &["bool", "bool"], "bool"),
        sig("^", &["bool", "bool"], "bool"),
        sig("=", &["int", "int"], "int"),
        sig("+=", &["int", "int"], "int"),
        sig("-=", &["int", "int"], "int"),
        sig("*=", &["int", "int"], "int"),
        sig("/=", &["int", "int"], "int"),
        sig("%=", &["int", "int"], "int"),
        sig("&=", &["bool", "bool"], "bool"),
        sig("|=", &["bool", "bool"], "bool"),
        sig("^=", &["bool", "bool"], "bool"),
        sig("!FUNC_LIB_printInt", &["int"], "void"),
        sig("!FUNC_LIB_printSpace", &[], "void"),
        sig("!FUNC_LIB_nextInt", &[], "int"),
        sig("!FUNC_LIB_isZero", &["int"], "bool"),
        sig("!FUNC_LIB_isNeg", &["int"], "bool"),
        sig("!FUNC_LIB_isPos", &["int"], "bool"),
        sig("!FUNC_LIB_basic_add", &["int", "int"], "int"),
        sig("!FUNC_LIB_basic_sub", &["int", "int"], "int"),
        sig("!FUNC_LIB_basic_xor", &["int", "int"], "int"),
        sig("!FUNC_LIB_basic_eq", &["int", "int"], "bool"),
        sig("!FUNC_LIB_basic_lt", &["int", "int"], "bool"),
        sig("!FUNC_LIB_basic_neg", &["int"], "int"),
        sig("!FUNC_LIB_basic_mul2", &["int"], "int"),
        sig("!FUNC_LIB_basic_div2", &["int"], "int"),
        sig("!FUNC_LIB_isEven", &["int"], "bool"),
        sig("!FUNC_LIB_isOdd", &["int"], "bool"),
        sig("!FUNC_LIB_getMemBitIndex", &[], "int"),
        sig("!FUNC_LIB_setMemBitIndex", &["int"], "void"),
        sig("!FUNC_LIB_moveMemHeadRight", &[], "void"),
        sig("!FUNC_LIB_moveMemHeadLeft", &[], "void"),
        sig("!FUNC_LIB_setMemBitZero", &[], "void"),
        sig("!FUNC_LIB_setMemBitOne", &[], "void"),
        sig("!FUNC_LIB_setMemBitBlank", &[], "void"),
        sig("!FUNC_LIB_memBitIsZero", &[], "bool"),
        sig("!FUNC_LIB_memBitIsOne", &[], "bool"),
        sig("!FUNC_LIB_memBitIsBlank", &[], "bool"),
    ];

    for line in program {
        let w = words(line);
        if w.len() >= 3 && TYPES.contains(&w[0].as_str()) && w[1].starts_with("!FUNC") {
            let close = crate::words::find_next(&w, "(", 1)
                .and_then(|open| crate::words::find_matching(&w, open));
            if let Some(close) = close {
                let params: Vec<String> = w[..close]
                    .iter()
                    .skip(3)
                    .filter(|t| TYPES.contains(&t.as_str()))
                    .cloned()
                    .collect();
                funcs.push(FuncSig {
                    name: w[1].clone(),
                    params,
                    ret: w[0].clone(),
                });
            }
        }
    }

    funcs
}

fn precedence_of(word: &str) -> Option<i32> {
    let level = match word {
        "!" | "u-" => 14,
        "*" | "/" | "%" => 12,
        "+" | "-" => 11,
        "<" | "<=" | ">" | ">=" => 9,
        "==" | "!=" => 8,
        "^" => 6,
        "&&" => 4,
        "||" => 3,
        "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "&=" | "|=" | "^=" => 1,
        _ => return None,
    };
    Some(level)
}

fn pop_unary_minus(stack: &mut Vec<String>, output: &mut Vec<String>) {
    if stack.last().map(String::as_str) == Some("u-") {
        if let Some(op) = stack.pop() {
            output.push(op);
        }
    }
}

/// Dijkstra's shunting-yard over a single statement's tokens. `MEM`, tagged
/// function names and the keywords `if`/`while`/`return` ride the operator
/// stack like function identifiers; commas are discarded. Levels 14 and 1
/// associate right-to-left.
pub(crate) fn shunting_yard(input: &[String]) -> Result<Vec<String>> {
    let mut output: Vec<String> = Vec::new();
    let mut stack: Vec<String> = Vec::new();

    for i in 0..input.len() {
        let mut word = input[i].clone();

        if word == LIB_MEM {
            stack.push(word);
        } else if word.starts_with("!VAR") {
            output.push(word);
            pop_unary_minus(&mut stack, &mut output);
        } else if word == ")" || word == "]" {
            let opener = if word == ")" { "(" } else { "[" };
            loop {
                match stack.pop() {
                    None => {
                        return Err(Error::UnbalancedExpression {
                            statement: join(input),
                        });
                    }
                    Some(top) => {
                        if top == opener {
                            break;
                        }
                        output.push(top);
                    }
                }
            }
            pop_unary_minus(&mut stack, &mut output);
            if let Some(top) = stack.last() {
                if top.starts_with("!FUNC")
                    || top == LIB_MEM
                    || top == "while"
                    || top == "if"
                    || top == "return"
                {
                    if let Some(op) = stack.pop() {
                        output.push(op);
                    }
                }
            }
            pop_unary_minus(&mut stack, &mut output);
        } else if precedence_of(&word).is_some() {
            // a minus is unary unless it follows a value
            let follows_value = i > 0
                && (input[i - 1] == ")" || input[i - 1] == "]" || input[i - 1].starts_with("!VAR"));
            if word == "-" && !follows_value {
                word = "u-".to_owned();
            }
            let level = precedence_of(&word).unwrap_or(0);

            while let Some(top) = stack.last() {
                let top_level = match precedence_of(top) {
                    Some(l) => l,
                    None => break,
                };
                let pops = top_level > level || (top_level == level && level != 14 && level != 1);
                if !pops {
                    break;
                }
                if let Some(op) = stack.pop() {
                    output.push(op);
                }
            }
            stack.push(word);
        } else if word == "("
            || word == "["
            || word.starts_with("!FUNC")
            || word == "while"
            || word == "if"
            || word == "return"
        {
            stack.push(word);
        }
        // commas fall through
    }

    while let Some(top) = stack.pop() {
        if top == "(" || top == "[" {
            return Err(Error::UnbalancedExpression {
                statement: join(input),
            });
        }
        output.push(top);
    }

    Ok(output)
}

fn is_operand(token: &str) -> bool {
    token.starts_with("!VAR") || token.starts_with("!TAPE")
}

fn is_simple_value(token: &str) -> bool {
    is_operand(token) || token == "true" || token == "false" || is_integer_literal(token)
}

// Every token of `args` is a plain operand, with `index MEM` pairs counting
// as one argument; `true` when exactly `arity` arguments are present.
fn simple_arguments(args: &[String], arity: usize) -> bool {
    let mut count = 0;
    let mut i = 0;
    while i < args.len() {
        if !is_operand(&args[i]) {
            return false;
        }
        if args.get(i + 1).map(String::as_str) == Some(LIB_MEM) {
            i += 2;
        } else {
            i += 1;
        }
        count += 1;
    }
    count == arity
}

/// Already in lowered postfix form? The simplifier's own output — simple
/// copies, literal writes, single-operator statements and bare calls — must
/// pass through unchanged, so running the simplifier twice is a no-op.
fn already_simple(w: &[String], num_params: &HashMap<&str, usize>) -> bool {
    if w.last().map(String::as_str) != Some(";") {
        return false;
    }
    let body = &w[..w.len() - 1];

    // `dst src = ;` — copy or literal write
    if body.len() == 3 && body[2] == "=" && is_operand(&body[0]) && is_simple_value(&body[1]) {
        return true;
    }

    // `args... op = dst ;` — single operator with destination
    if body.len() >= 3 && body[body.len() - 2] == "=" && is_operand(&body[body.len() - 1]) {
        let op = &body[body.len() - 3];
        if let Some(&arity) = num_params.get(op.as_str()) {
            return op != "=" && simple_arguments(&body[..body.len() - 3], arity);
        }
    }

    // `args... op ;` — void call or bare compound assignment
    if let Some(op) = body.last() {
        if op != "=" {
            if let Some(&arity) = num_params.get(op.as_str()) {
                return simple_arguments(&body[..body.len() - 1], arity);
            }
        }
    }

    // postfix MEM forms (`i MEM x = ;` and friends), lowered further by the
    // memory-access pass
    if body.last().map(String::as_str) == Some("=")
        && body.iter().any(|t| t == LIB_MEM)
        && body
            .iter()
            .all(|t| is_operand(t) || t == LIB_MEM || t == "=")
    {
        return true;
    }

    false
}

/// Lower one statement to single-operator form. Literals are hoisted into
/// fresh temporaries first; then the postfix form is reduced operator by
/// operator, each intermediate result landing in its own declared temporary.
pub(crate) fn simplify_statement(
    line: &str,
    funcs: &[FuncSig],
    num_params: &HashMap<&str, usize>,
    temps: &mut TempGen,
) -> Result<Vec<String>> {
    let mut w = words(line);

    if w.is_empty() {
        return Ok(vec![line.to_owned()]);
    }

    // function headers and plain structural lines pass through untouched
    if w.len() >= 3 && TYPES.contains(&w[0].as_str()) && w[1].starts_with("!FUNC") && w[2] == "(" {
        return Ok(vec![line.to_owned()]);
    }
    match w[0].as_str() {
        "continue" | "break" | "else" | "}" | "while" => return Ok(vec![line.to_owned()]),
        _ => {}
    }
    if w.len() == 3 && TYPES.contains(&w[0].as_str()) && w[1].starts_with("!VAR") && w[2] == ";" {
        return Ok(vec![line.to_owned()]);
    }
    if already_simple(&w, num_params) {
        return Ok(vec![line.to_owned()]);
    }

    let mut out: Vec<String> = Vec::new();

    for word in w.iter_mut() {
        if *word == "true" || *word == "false" {
            let temp = temps.fresh();
            out.push(format!("bool {} ;", temp));
            out.push(format!("{} {} = ;", temp, word));
            *word = temp;
        } else if is_integer_literal(word) {
            let temp = temps.fresh();
            out.push(format!("int {} ;", temp));
            out.push(format!("{} {} = ;", temp, word));
            *word = temp;
        }
    }

    let ends_with_brace = w.last().map(String::as_str) == Some("{");
    let ends_with_semi = w.last().map(String::as_str) == Some(";");
    if ends_with_brace || ends_with_semi {
        w.pop();
    }

    // a bare `;` (an empty `for` clause, say) has nothing left to lower
    if w.is_empty() {
        return Ok(out);
    }

    let mut postfix = shunting_yard(&w)?;

    let mut num_ops = postfix
        .iter()
        .filter(|t| num_params.contains_key(t.as_str()))
        .count();

    while num_ops > 1 {
        let op = match postfix
            .iter()
            .position(|t| num_params.contains_key(t.as_str()))
        {
            Some(i) => i,
            None => break,
        };
        num_ops -= 1;

        let arity = num_params[postfix[op].as_str()];
        let mut start = op;
        for _ in 0..arity {
            start = start.checked_sub(1).ok_or_else(|| Error::UnbalancedExpression {
                statement: line.to_owned(),
            })?;
            // an `index MEM` pair is one operand
            if postfix[start] == LIB_MEM {
                start = start.checked_sub(1).ok_or_else(|| Error::UnbalancedExpression {
                    statement: line.to_owned(),
                })?;
            }
        }

        let ret = funcs
            .iter()
            .find(|f| f.name == postfix[op])
            .map(|f| f.ret.clone())
            .unwrap_or_else(|| "int".to_owned());
        let temp = temps.fresh();
        out.push(format!("{} {} ;", ret, temp));
        out.push(format!("{} = {} ;", join(&postfix[start..=op]), temp));

        postfix.splice(start..=op, Some(temp));
    }

    // a trailing `if`/`return` consumes whatever single value is left
    let last = postfix.last().cloned().unwrap_or_default();
    if last == "if" || last == "return" {
        if postfix.len() > 2 {
            let temp = temps.fresh();
            out.push(format!("bool {} ;", temp));
            out.push(format!(
                "{} = {} ;",
                join(&postfix[..postfix.len() - 1]),
                temp
            ));
            postfix = vec![format!("{} {}", temp, last)];
        } else if postfix.len() == 2 && postfix[0].starts_with("!FUNC") {
            let temp = temps.fresh();
            out.push(format!("bool {} ;", temp));
            out.push(format!("{} = {} ;", postfix[0], temp));
            postfix[0] = temp;
        }
    }

    let mut final_line = join(&postfix);
    if ends_with_brace {
        final_line.push_str(" {");
    } else if ends_with_semi {
        final_line.push_str(" ;");
    }
    out.push(final_line);

    Ok(lower_short_circuit(&out))
}

/// Replace `a b && = r` (and the `||` twin) with explicit branches so the
/// right operand's defining statements only run when the left operand does
/// not already decide the result.
fn lower_short_circuit(lines: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for line in lines {
        let w = words(line);

        let mut op_index = None;
        let mut is_and = false;
        for (j, word) in w.iter().enumerate() {
            if word == "&&" {
                is_and = true;
                op_index = Some(j);
            } else if word == "||" {
                is_and = false;
                op_index = Some(j);
            }
        }
        let op_index = match op_index {
            Some(j) if j >= 2 && j + 2 < w.len() => j,
            _ => {
                out.push(line.clone());
                continue;
            }
        };

        // shape: arg1 arg2 && = result ;
        let arg1 = w[op_index - 2].clone();
        let arg2 = w[op_index - 1].clone();
        let result = w[op_index + 2].clone();

        // peel off the statements that computed arg2; they move into a branch
        let mut arg2_lines: Vec<String> = Vec::new();
        loop {
            let prev = match out.last() {
                Some(p) => p.clone(),
                None => break,
            };
            let prev_words = words(&prev);
            if prev_words.iter().any(|t| *t == arg1) {
                break;
            }
            if prev_words.first().map(String::as_str) == Some("}") {
                break;
            }
            out.pop();
            arg2_lines.push(prev);
        }
        arg2_lines.reverse();

        out.push(format!("{} if {{", arg1));
        if is_and {
            out.extend(arg2_lines.iter().cloned());
            out.push(format!("{} {} = ;", result, arg2));
            out.push("}".to_owned());
            out.push("else {".to_owned());
            out.push(format!("{} {} = ;", result, arg1));
            out.push("}".to_owned());
        } else {
            out.push(format!("{} {} = ;", result, arg1));
            out.push("}".to_owned());
            out.push("else {".to_owned());
            out.extend(arg2_lines.iter().cloned());
            out.push(format!("{} {} = ;", result, arg2));
            out.push("}".to_owned());
        }
    }

    out
}

pub(crate) fn simplify_expressions(program: &[String], temps: &mut TempGen) -> Result<Vec<String>> {
    let funcs = signatures(program);
    let num_params: HashMap<&str, usize> = funcs
        .iter()
        .map(|f| (f.name.as_str(), f.params.len()))
        .collect();

    let mut out: Vec<String> = Vec::new();
    for line in program {
        out.extend(simplify_statement(line, &funcs, &num_params, temps)?);
    }

    Ok(one_line(&all_words(&out)))
}

fn compound_op(word: &str) -> Option<&'static str> {
    let plain = match word {
        "+=" => "+",
        "-=" => "-",
        "*=" => "*",
        "/=" => "/",
        "%=" => "%",
        "|=" => "||",
        "&=" => "&&",
        "^=" => "^",
        _ => return None,
    };
    Some(plain)
}

/// `A B += ;` desugars to `t = A + B ; A = t ;` (postfix spelling), with an
/// extra copy when the compound assignment's own value was used.
pub(crate) fn lower_compound_assignments(program: &[String], temps: &mut TempGen) -> Vec<String> {
    let mut reversed: Vec<String> = Vec::new();

    for line in program.iter().rev() {
        let w = words(line);
        let found = w
            .iter()
            .enumerate()
            .find(|(_, t)| compound_op(t).is_some())
            .map(|(j, _)| j);
        let op_index = match found {
            Some(j) if j >= 2 => j,
            _ => {
                reversed.push(line.clone());
                continue;
            }
        };

        let plain = compound_op(&w[op_index]).unwrap_or("+");
        let ty = match w[op_index].as_str() {
            "|=" | "&=" | "^=" => "bool",
            _ => "int",
        };

        let mut index = op_index - 1;
        let b = if w[index] == LIB_MEM && index >= 1 {
            index -= 1;
            format!("{} {}", w[index], w[index + 1])
        } else {
            w[index].clone()
        };
        let a = if index >= 1 {
            index -= 1;
            if w[index] == LIB_MEM && index >= 1 {
                index -= 1;
                format!("{} {}", w[index], w[index + 1])
            } else {
                w[index].clone()
            }
        } else {
            w[index].clone()
        };

        let temp = temps.fresh();
        let mut expansion = vec![
            format!("{} {} ;", ty, temp),
            format!("{} {} {} = {} ;", a, b, plain, temp),
            format!("{} {} = ;", a, temp),
        ];
        if w.len() >= 3 && w[w.len() - 3] == "=" {
            expansion.push(format!("{} {} = ;", w[w.len() - 2], a));
        }
        for l in expansion.into_iter().rev() {
            reversed.push(l);
        }
    }

    let lines: Vec<String> = reversed.into_iter().rev().collect();
    one_line(&all_words(&lines))
}

/// Rename every remaining operator except `!`, `&&`, `||` and `=` to its
/// library function.
pub(crate) fn replace_operators(program: &[String]) -> Vec<String> {
    let renamed: Vec<String> = all_words(program)
        .into_iter()
        .map(|token| {
            let name = match token.as_str() {
                "+" => "add",
                "-" => "sub",
                "*" => "mul",
                "/" => "div",
                "%" => "mod",
                "u-" => "neg",
                "<" => "lt",
                "<=" => "leq",
                ">" => "gt",
                ">=" => "geq",
                "==" => "eq",
                "!=" => "neq",
                "^" => "eor",
                _ => return token,
            };
            format!("{}{}", LIB_FUNC, name)
        })
        .collect();

    one_line(&renamed)
}

/// Copy every argument of a multi-argument call into its own fresh temporary
/// so no two arguments of one call ever live on the same tape.
pub(crate) fn materialize_arguments(program: &[String], temps: &mut TempGen) -> Vec<String> {
    let funcs = signatures(program);
    let num_params: HashMap<&str, usize> = funcs
        .iter()
        .map(|f| (f.name.as_str(), f.params.len()))
        .collect();

    let mut var_types: HashMap<String, String> = HashMap::new();
    let mut out: Vec<String> = Vec::new();

    for line in program {
        let w = words(line);
        if w.is_empty() {
            continue;
        }

        let op_index = w.iter().position(|t| {
            t != "=" && num_params.get(t.as_str()).map_or(false, |&n| n > 1)
        });
        let is_header = w.last().map(String::as_str) == Some("{");

        if is_header || op_index.is_none() {
            out.push(line.clone());
            if w.len() >= 2 && TYPES.contains(&w[0].as_str()) {
                var_types.insert(w[1].clone(), w[0].clone());
                if is_header {
                    let mut j = 3;
                    while j + 1 < w.len() && TYPES.contains(&w[j].as_str()) {
                        var_types.insert(w[j + 1].clone(), w[j].clone());
                        j += 3;
                    }
                }
            }
            continue;
        }

        let op_index = op_index.unwrap_or(0);
        let arity = num_params[w[op_index].as_str()];

        let mut pos = op_index;
        let mut params_rev: Vec<String> = Vec::new();
        let mut malformed = false;
        for _ in 0..arity {
            match pos.checked_sub(1) {
                None => {
                    malformed = true;
                    break;
                }
                Some(p) => pos = p,
            }
            if w[pos] == LIB_MEM {
                match pos.checked_sub(1) {
                    None => {
                        malformed = true;
                        break;
                    }
                    Some(p) => pos = p,
                }
                params_rev.push(format!("{} {}", w[pos], w[pos + 1]));
            } else {
                params_rev.push(w[pos].clone());
            }
        }
        if malformed {
            out.push(line.clone());
            continue;
        }

        let mut fixed: Vec<String> = Vec::new();
        for param in params_rev.into_iter().rev() {
            let is_temp = param.starts_with("!VAR_TEMP");
            let is_mem_pair = param.ends_with(LIB_MEM);
            if is_temp && !is_mem_pair {
                fixed.push(param);
                continue;
            }
            let ty = if is_mem_pair {
                "int".to_owned()
            } else {
                var_types
                    .get(&param)
                    .cloned()
                    .unwrap_or_else(|| "int".to_owned())
            };
            let temp = temps.fresh();
            out.push(format!("{} {} ;", ty, temp));
            out.push(format!("{} {} = ;", temp, param));
            fixed.push(temp);
        }

        let mut rebuilt: Vec<String> = w[..pos].to_vec();
        rebuilt.extend(fixed);
        rebuilt.extend(w[op_index..].iter().cloned());
        out.push(join(&rebuilt));
    }

    one_line(&all_words(&out))
}

/// Lower `MEM` accesses to `memset`/`memget` calls, materializing reads that
/// appear as arguments of other calls first.
pub(crate) fn lower_memory_access(program: &[String], temps: &mut TempGen) -> Vec<String> {
    // chained assignment `A B = = C ;` means `A = B ; C = A ;`
    let mut unchained: Vec<String> = Vec::new();
    for line in program {
        let w = words(line);
        if w.len() >= 6 && w[w.len() - 4] == "=" && w[w.len() - 3] == "=" {
            let mut index = w.len() - 5;
            let b = if w[index] == LIB_MEM && index >= 1 {
                index -= 1;
                format!("{} {}", w[index], w[index + 1])
            } else {
                w[index].clone()
            };
            index = index.saturating_sub(1);
            let a = if w[index] == LIB_MEM && index >= 1 {
                index -= 1;
                format!("{} {}", w[index], w[index + 1])
            } else {
                w[index].clone()
            };
            let c = w[w.len() - 2].clone();
            unchained.push(format!("{} {} = ;", a, b));
            unchained.push(format!("{} {} = ;", c, a));
        } else {
            unchained.push(line.clone());
        }
    }

    // a MEM read used as a call argument goes through a temporary
    let funcs = signatures(program);
    let names: HashSet<&str> = funcs.iter().map(|f| f.name.as_str()).collect();

    let mut flattened: Vec<String> = Vec::new();
    for line in &unchained {
        let mut w = words(line);
        let func_index = w
            .iter()
            .position(|t| t != "=" && names.contains(t.as_str()));
        let mut fi = match func_index {
            Some(fi) => fi,
            None => {
                flattened.push(line.clone());
                continue;
            }
        };

        let mut j = 0;
        while j < fi {
            if w[j] == LIB_MEM && j >= 1 {
                let index_token = w[j - 1].clone();
                let temp = temps.fresh();
                flattened.push(format!("int {} ;", temp));
                flattened.push(format!("{} {} {} = ;", temp, index_token, LIB_MEM));
                w[j - 1] = temp;
                w.remove(j);
                fi -= 1;
            } else {
                j += 1;
            }
        }
        flattened.push(join(&w));
    }

    // the four direct forms
    let mut out: Vec<String> = Vec::new();
    for line in &flattened {
        let w = words(line);
        if w.len() == 6 && w[1] == LIB_MEM && w[3] == LIB_MEM && w[4] == "=" {
            // MEM[a] = MEM[b]
            let temp = temps.fresh();
            out.push(format!("int {} ;", temp));
            out.push(format!("{} {}memget = {} ;", w[2], LIB_FUNC, temp));
            out.push(format!("{} {} {}memset ;", w[0], temp, LIB_FUNC));
        } else if w.len() == 5 && w[2] == LIB_MEM && w[3] == "=" {
            // x = MEM[i]
            out.push(format!("{} {}memget = {} ;", w[1], LIB_FUNC, w[0]));
        } else if w.len() == 5 && w[1] == LIB_MEM && w[3] == "=" {
            // MEM[i] = x
            out.push(format!("{} {} {}memset ;", w[0], w[2], LIB_FUNC));
        } else if w.len() == 5 && w[1] == LIB_MEM && w[2] == "=" {
            // flipped spelling of x = MEM[i]
            out.push(format!("{} {}memget = {} ;", w[0], LIB_FUNC, w[3]));
        } else {
            out.push(line.clone());
        }
    }

    one_line(&all_words(&out))
}
