//! Temporary reuse and declaration hoisting.

use crate::lexer::reformat;
use crate::names::{TAPE_RAX, TEMP_PREFIX};
use crate::words::{all_words, find_matching, join, one_line, words, TYPES};
use std::collections::{BTreeMap, HashMap};

fn temp_number(word: &str) -> Option<usize> {
    if word.starts_with(TEMP_PREFIX) {
        word[TEMP_PREFIX.len()..].parse().ok()
    } else {
        None
    }
}

fn is_declaration(w: &[String]) -> bool {
    w.len() == 3 && TYPES.contains(&w[0].as_str()) && w[1].starts_with("!VAR") && w[2] == ";"
}

/// Interval-based renumbering of one function body's temporaries: each temp
/// lives from its first to its last non-declaration use, and overlapping
/// lifetimes get distinct low numbers.
fn recolor(lines: &mut Vec<String>) {
    let mut first_use: HashMap<usize, usize> = HashMap::new();
    let mut last_use: HashMap<usize, usize> = HashMap::new();

    for (line_num, line) in lines.iter().enumerate() {
        let w = words(line);
        if is_declaration(&w) {
            continue;
        }
        for token in &w {
            if let Some(n) = temp_number(token) {
                first_use.entry(n).or_insert(line_num);
                last_use.insert(n, line_num);
            }
        }
    }

    let mut starts: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut ends: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (&n, &line) in first_use.iter() {
        starts.entry(line).or_insert_with(Vec::new).push(n);
    }
    for (&n, &line) in last_use.iter() {
        ends.entry(line).or_insert_with(Vec::new).push(n);
    }

    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut busy: Vec<bool> = Vec::new();

    let lines_with_events: Vec<usize> = starts.keys().chain(ends.keys()).cloned().collect();
    let mut event_lines: Vec<usize> = lines_with_events;
    event_lines.sort();
    event_lines.dedup();

    for line in event_lines {
        if let Some(opening) = starts.get(&line) {
            let mut opening = opening.clone();
            opening.sort();
            for n in opening {
                let color = match busy.iter().position(|b| !b) {
                    Some(c) => c,
                    None => {
                        busy.push(false);
                        busy.len() - 1
                    }
                };
                busy[color] = true;
                remap.insert(n, color);
            }
        }
        if let Some(closing) = ends.get(&line) {
            let mut closing = closing.clone();
            closing.sort();
            for n in closing {
                if let Some(&color) = remap.get(&n) {
                    busy[color] = false;
                }
            }
        }
    }

    for line in lines.iter_mut() {
        let mut w = words(line);
        let mut changed = false;
        for token in w.iter_mut() {
            if let Some(n) = temp_number(token) {
                if let Some(&color) = remap.get(&n) {
                    if color != n {
                        *token = format!("{}{}", TEMP_PREFIX, color);
                        changed = true;
                    }
                }
            }
        }
        if changed {
            *line = join(&w);
        }
    }
}

/// Renumber temporaries independently per function so each function only
/// needs as many temp slots as its deepest overlap.
pub(crate) fn reuse_temporaries(program: &[String]) -> Vec<String> {
    let headers: Vec<String> = program
        .iter()
        .filter(|line| {
            let w = words(line);
            !w.is_empty()
                && TYPES.contains(&w[0].as_str())
                && w.last().map(String::as_str) == Some("{")
        })
        .cloned()
        .collect();

    let tokens = all_words(program);
    let mut bodies: Vec<Vec<String>> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == "{" {
            let close = match find_matching(&tokens, i) {
                Some(c) => c,
                None => break,
            };
            let body = join(&tokens[i + 1..close]);
            let mut body_lines = reformat(&[body]);
            recolor(&mut body_lines);
            bodies.push(body_lines);
            i = close + 1;
        } else {
            i += 1;
        }
    }

    let mut out: Vec<String> = Vec::new();
    for (header, body) in headers.iter().zip(bodies.iter()) {
        out.push(header.clone());
        out.extend(body.iter().cloned());
        out.push("}".to_owned());
    }

    one_line(&all_words(&out))
}

/// Delete in-body declarations and give every function a `declare` header
/// line listing its variables in first-appearance order.
pub(crate) fn hoist_declarations(program: &[String]) -> Vec<String> {
    let mut header_lines: Vec<usize> = Vec::new();
    let mut declared: HashMap<usize, Vec<String>> = HashMap::new();

    for (i, line) in program.iter().enumerate() {
        let w = words(line);
        if w.is_empty() || !TYPES.contains(&w[0].as_str()) {
            continue;
        }
        if w.len() >= 2 && w[1].starts_with("!FUNC") {
            header_lines.push(i);
        } else if is_declaration(&w) {
            if let Some(&header) = header_lines.last() {
                let names = declared.entry(header).or_insert_with(Vec::new);
                if !names.contains(&w[1]) {
                    names.push(w[1].clone());
                }
            }
        }
    }

    let mut out: Vec<String> = Vec::new();
    for (i, line) in program.iter().enumerate() {
        let w = words(line);
        if is_declaration(&w) {
            continue;
        }
        out.push(line.clone());
        if header_lines.contains(&i) {
            let mut declare = vec!["declare".to_owned()];
            if let Some(names) = declared.get(&i) {
                declare.extend(names.iter().cloned());
            }
            declare.push(";".to_owned());
            out.push(join(&declare));
        }
    }

    one_line(&all_words(&out))
}

/// `x return ;` becomes a copy into the return-value tape followed by a bare
/// `return ;`.
pub(crate) fn lower_returns(program: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in program {
        let w = words(line);
        if w.len() >= 3 && w[w.len() - 2] == "return" {
            out.push(format!("{} {} = ;", TAPE_RAX, w[w.len() - 3]));
            out.push("return ;".to_owned());
        } else {
            out.push(line.clone());
        }
    }
    one_line(&all_words(&out))
}
