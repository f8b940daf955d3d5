//! Jump linking: flatten the remaining structure (`if`/`else`, `while`,
//! `break`/`continue`, function bodies and calls) into `jmp`/`jf`/`call`
//! lines with resolved line numbers, prefixed by a jump to `main`.

use crate::names::USER_FUNC;
use crate::words::{all_words, find_matching, find_next, join, words, TYPES};
use std::collections::HashMap;

/// Line number of every token; `;`, `{` and `}` terminate lines, matching
/// the formatter's output.
fn number_tokens(tokens: &[String]) -> Vec<usize> {
    let mut numbers = Vec::with_capacity(tokens.len());
    let mut current = 0;
    for token in tokens {
        numbers.push(current);
        if token == ";" || token == "{" || token == "}" {
            current += 1;
        }
    }
    numbers
}

fn rebuild_lines(tokens: &[String], token_lines: &[usize]) -> Vec<String> {
    let count = token_lines.last().map(|&l| l + 1).unwrap_or(0);
    let mut grouped: Vec<Vec<String>> = vec![Vec::new(); count];
    for (token, &line) in tokens.iter().zip(token_lines.iter()) {
        if line < count {
            grouped[line].push(token.clone());
        }
    }
    grouped.into_iter().map(|w| join(&w)).collect()
}

fn lower_ifs(p: &mut Vec<String>, tokens: &[String], token_lines: &[usize]) {
    for i in 0..tokens.len() {
        if i + 2 >= tokens.len() || tokens[i + 1] != "if" {
            continue;
        }
        let body = find_next(tokens, "{", i + 1).and_then(|open| {
            find_matching(tokens, open).map(|close| (open, close))
        });
        let (open, close) = match body {
            Some(b) => b,
            None => continue,
        };

        if tokens.get(close + 1).map(String::as_str) != Some("else") {
            p[token_lines[open]] = format!("jf {} {} ;", tokens[i], token_lines[close]);
            p[token_lines[close]] = "nop ;".to_owned();
        } else {
            let else_index = close + 1;
            let close2 = match find_matching(tokens, else_index + 1) {
                Some(c) => c,
                None => continue,
            };
            p[token_lines[open]] = format!("jf {} {} ;", tokens[i], token_lines[else_index]);
            p[token_lines[close]] = format!("jmp {} ;", token_lines[close2]);
            p[token_lines[else_index]] = "nop ;".to_owned();
            p[token_lines[close2]] = "nop ;".to_owned();
        }
    }
}

fn lower_whiles(p: &mut Vec<String>, tokens: &[String], token_lines: &[usize]) {
    // open/close brace pairs of every while, keyed by token index
    let mut opens: HashMap<usize, usize> = HashMap::new();
    let mut closes: HashMap<usize, usize> = HashMap::new();
    for i in 0..tokens.len() {
        if tokens[i] == "while" {
            if let Some(open) = find_next(tokens, "{", i) {
                if let Some(close) = find_matching(tokens, open) {
                    opens.insert(open, close);
                    closes.insert(close, open);
                }
            }
        }
    }

    let mut active: Vec<usize> = Vec::new();
    for i in 0..tokens.len() {
        match tokens[i].as_str() {
            "{" if opens.contains_key(&i) => active.push(i),
            "}" if closes.contains_key(&i) => {
                active.pop();
            }
            "break" => {
                if let Some(&open) = active.last() {
                    if let Some(&close) = opens.get(&open) {
                        p[token_lines[i]] = format!("jmp {} ;", token_lines[close] + 1);
                    }
                }
            }
            "continue" => {
                if let Some(&open) = active.last() {
                    p[token_lines[i]] = format!("jmp {} ;", token_lines[open]);
                }
            }
            _ => {}
        }
    }

    for (&open, &close) in opens.iter() {
        p[token_lines[open]] = "nop ;".to_owned();
        p[token_lines[close]] = format!("jmp {} ;", token_lines[open]);
    }
}

fn lower_functions(p: &mut Vec<String>, tokens: &[String], token_lines: &[usize]) {
    let mut func_lines: HashMap<String, usize> = HashMap::new();
    for i in 0..tokens.len() {
        if i + 2 < tokens.len()
            && TYPES.contains(&tokens[i].as_str())
            && tokens[i + 1].starts_with("!FUNC")
            && tokens[i + 2] == "{"
        {
            func_lines.insert(tokens[i + 1].clone(), token_lines[i]);
        }
    }

    for &line in func_lines.values() {
        p[line] = "nop ;".to_owned();
    }

    // the only close braces left are function ends
    for line in p.iter_mut() {
        if line.trim() == "}" {
            *line = "nop ;".to_owned();
        }
    }

    // calls to machine primitives keep their names; the code generator
    // inlines them
    for i in 0..tokens.len().saturating_sub(1) {
        if tokens[i] == "call" && tokens[i + 1].starts_with("!FUNC") {
            if let Some(&target) = func_lines.get(&tokens[i + 1]) {
                p[token_lines[i]] = format!("call {} ;", target);
            }
        }
    }
}

pub(crate) fn link_jumps(program: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::with_capacity(program.len() + 1);
    lines.push("jmp # ;".to_owned());
    lines.extend(program.iter().cloned());

    let mut tokens = all_words(&lines);

    // split each while-closing brace into a back-jump plus a nop, so break
    // has a landing line
    let mut while_closes: Vec<usize> = Vec::new();
    for i in 0..tokens.len() {
        if tokens[i] == "while" {
            if let Some(open) = find_next(&tokens, "{", i) {
                if let Some(close) = find_matching(&tokens, open) {
                    while_closes.push(close);
                }
            }
        }
    }
    while_closes.sort();
    while_closes.dedup();
    for &close in while_closes.iter().rev() {
        tokens.insert(close + 1, ";".to_owned());
        tokens.insert(close + 1, "nop".to_owned());
    }

    let token_lines = number_tokens(&tokens);
    let mut p = rebuild_lines(&tokens, &token_lines);

    // patch the entry jump to main's body
    let main_header = format!("{}main", USER_FUNC);
    let main_line = p.iter().position(|line| {
        let w = words(line);
        w.len() == 3 && w[0] == "int" && w[1] == main_header && w[2] == "{"
    });
    if let Some(line) = main_line {
        p[0] = format!("jmp {} ;", line);
    }

    lower_ifs(&mut p, &tokens, &token_lines);
    lower_whiles(&mut p, &tokens, &token_lines);
    lower_functions(&mut p, &tokens, &token_lines);

    p
}
