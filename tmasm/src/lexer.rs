//! Lexical normalization: comment removal, operator spacing and reformatting
//! into one statement per line.

use crate::words::all_words;
use crate::{Error, Result};

pub(crate) const ONE_CHAR_OPS: &[char] = &[
    '+', '-', '*', '/', '%', '!', '=', '(', ')', ',', '^', '>', '<', '[', ']', ';', '{', '}',
];
pub(crate) const TWO_CHAR_OPS: &[&str] = &[
    "+=", "-=", "*=", "/=", "%=", "!=", "|=", "&=", "^=", "&&", "||", "==", "<=", ">=",
];

/// Remove `//` and `/* ... */` comments, dropping lines left empty.
/// An unclosed block comment is reported with its starting line.
pub(crate) fn strip_comments(program: &[String]) -> Result<Vec<String>> {
    let text: Vec<char> = program
        .iter()
        .flat_map(|line| line.chars().chain(Some('\n')))
        .collect();

    let mut out = Vec::new();
    let mut current = String::new();
    let mut line_num = 1;

    let flush = |out: &mut Vec<String>, current: &mut String| {
        if !current.trim().is_empty() {
            out.push(current.clone());
        }
        current.clear();
    };

    let mut i = 0;
    while i < text.len() {
        let c = text[i];
        if c == '\n' {
            line_num += 1;
            flush(&mut out, &mut current);
            i += 1;
        } else if c == '/' && text.get(i + 1) == Some(&'/') {
            while i < text.len() && text[i] != '\n' {
                i += 1;
            }
        } else if c == '/' && text.get(i + 1) == Some(&'*') {
            let start_line = line_num;
            i += 2;
            let mut closed = false;
            while i < text.len() {
                if text[i] == '\n' {
                    line_num += 1;
                } else if text[i] == '*' && text.get(i + 1) == Some(&'/') {
                    i += 2;
                    closed = true;
                    break;
                }
                i += 1;
            }
            if !closed {
                return Err(Error::UnterminatedComment { line: start_line });
            }
        } else {
            current.push(c);
            i += 1;
        }
    }
    flush(&mut out, &mut current);

    Ok(out)
}

/// Surround every operator with spaces, re-coalescing two-character operators
/// that the one-character pass would otherwise split apart. The result is a
/// single long line; [`reformat`](fn.reformat.html) restores line structure.
pub(crate) fn space_operators(program: &[String]) -> Vec<String> {
    let mut letters: Vec<char> = Vec::new();

    for line in program {
        for c in line.chars() {
            if c == '\n' {
                continue;
            }
            letters.push(c);

            if letters.len() >= 2 {
                let pair: String = letters[letters.len() - 2..].iter().collect();
                if TWO_CHAR_OPS.contains(&pair.as_str()) {
                    letters.truncate(letters.len() - 2);
                    letters.push(' ');
                    letters.extend(pair.chars());
                    letters.push(' ');
                    continue;
                }
            }

            let last = letters[letters.len() - 1];
            if ONE_CHAR_OPS.contains(&last) {
                if letters.len() >= 3 && letters[letters.len() - 2] == ' ' {
                    let pair: String = [letters[letters.len() - 3], last].iter().collect();
                    if TWO_CHAR_OPS.contains(&pair.as_str()) {
                        // the previous character was the first half of a
                        // two-character operator; glue them back together
                        letters.truncate(letters.len() - 2);
                        letters.push(last);
                        letters.push(' ');
                        continue;
                    }
                }
                letters.pop();
                letters.push(' ');
                letters.push(last);
                letters.push(' ');
            }
        }
    }

    vec![letters.into_iter().collect()]
}

/// Re-emit the token stream with one statement per line and brace-based
/// indentation. `for` headers keep their two semicolons on one line.
pub(crate) fn reformat(program: &[String]) -> Vec<String> {
    let tokens = all_words(program);

    let mut out = Vec::new();
    let mut line = String::new();
    let mut indent = 0usize;
    let mut in_for_header = false;
    let mut at_line_start = true;

    for token in tokens {
        if at_line_start {
            for _ in 0..indent {
                line.push('\t');
            }
            at_line_start = false;
        }

        match token.as_str() {
            "}" => {
                line.pop();
                line.push('}');
                out.push(line.clone());
                line.clear();
                indent = indent.saturating_sub(1);
                at_line_start = true;
            }
            ";" if !in_for_header => {
                line.push(';');
                out.push(line.clone());
                line.clear();
                at_line_start = true;
            }
            "{" => {
                line.push('{');
                out.push(line.clone());
                line.clear();
                indent += 1;
                at_line_start = true;
                in_for_header = false;
            }
            _ => {
                line.push_str(&token);
                line.push(' ');
                if token == "for" {
                    in_for_header = true;
                }
            }
        }
    }

    if !line.trim().is_empty() {
        out.push(line);
    }

    out
}
