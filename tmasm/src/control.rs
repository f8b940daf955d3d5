//! Structured control flow rewrites: `for` loops, `else if` chains, `while`
//! conditions, implicit `void` returns, return parenthesization and
//! declaration defaults.

use crate::words::{all_words, find_matching, find_next, join, one_line, words, TYPES};

/// Rewrite each `for (init; cond; update) { body }` as
/// `init ; while (cond) { body' update ; }` where `body'` has the update
/// statement spliced in front of every `continue` belonging to this loop.
pub(crate) fn for_to_while(program: &[String]) -> Vec<String> {
    let mut tokens = all_words(program);

    loop {
        let pos = match tokens.iter().position(|t| t == "for") {
            Some(p) => p,
            None => break,
        };

        let header = (|| {
            let open_paren = find_next(&tokens, "(", pos)?;
            let close_paren = find_matching(&tokens, open_paren)?;
            let semi1 = find_next(&tokens, ";", open_paren + 1).filter(|&i| i < close_paren)?;
            let semi2 = find_next(&tokens, ";", semi1 + 1).filter(|&i| i < close_paren)?;
            let open_brace = find_next(&tokens, "{", close_paren)?;
            let close_brace = find_matching(&tokens, open_brace)?;
            Some((open_paren, close_paren, semi1, semi2, open_brace, close_brace))
        })();
        let (open_paren, close_paren, semi1, semi2, open_brace, close_brace) = match header {
            Some(h) => h,
            None => break,
        };

        let init: Vec<String> = tokens[open_paren + 1..semi1].to_vec();
        let mut cond: Vec<String> = tokens[semi1 + 1..semi2].to_vec();
        let update: Vec<String> = tokens[semi2 + 1..close_paren].to_vec();
        if cond.is_empty() {
            cond.push("true".to_owned());
        }

        // `continue`s at this loop's own nesting level; inner loops keep theirs
        let mut continues = Vec::new();
        let mut i = open_brace + 1;
        while i < close_brace {
            match tokens[i].as_str() {
                "for" | "while" => {
                    let skipped = find_next(&tokens, "{", i)
                        .and_then(|b| find_matching(&tokens, b))
                        .filter(|&c| c < close_brace);
                    match skipped {
                        Some(c) => i = c + 1,
                        None => i += 1,
                    }
                }
                "continue" => {
                    continues.push(i);
                    i += 1;
                }
                _ => i += 1,
            }
        }

        let mut update_stmt = update.clone();
        if !update.is_empty() {
            update_stmt.push(";".to_owned());
        }

        // splice from the back so earlier indices stay valid
        if !update.is_empty() {
            tokens.splice(close_brace..close_brace, update_stmt.iter().cloned());
            for &c in continues.iter().rev() {
                tokens.splice(c..c, update_stmt.iter().cloned());
            }
        }

        let mut replacement = init;
        replacement.push(";".to_owned());
        replacement.push("while".to_owned());
        replacement.push("(".to_owned());
        replacement.extend(cond);
        replacement.push(")".to_owned());
        tokens.splice(pos..=close_paren, replacement);
    }

    one_line(&tokens)
}

/// Give every `else if` its own braces, turning the chain into nested
/// `if { } else { if { } ... }` blocks.
pub(crate) fn expand_else_if(program: &[String]) -> Vec<String> {
    let mut tokens = all_words(program);

    let mut i = 0;
    while i + 1 < tokens.len() {
        if tokens[i] == "else" && tokens[i + 1] == "if" {
            let tail = (|| {
                let mut open = find_next(&tokens, "{", i + 1)?;
                let mut close = find_matching(&tokens, open)?;
                while tokens.get(close + 1).map(String::as_str) == Some("else") {
                    open = find_next(&tokens, "{", close + 1)?;
                    close = find_matching(&tokens, open)?;
                }
                Some(close)
            })();
            if let Some(last_close) = tail {
                tokens.insert(last_close + 1, "}".to_owned());
                tokens.insert(i + 1, "{".to_owned());
            }
        }
        i += 1;
    }

    one_line(&tokens)
}

/// Replace `while (E)` by `while (true)` with a leading
/// `if (!(E)) { break ; }` in the body.
pub(crate) fn lower_while_conditions(program: &[String]) -> Vec<String> {
    let mut lines: Vec<Vec<String>> = program.iter().map(|l| words(l)).collect();

    for i in (0..lines.len()).rev() {
        if lines[i].first().map(String::as_str) != Some("while") {
            continue;
        }
        let mut header = lines[i].clone();
        let bounds = find_next(&header, "(", 0)
            .and_then(|open| find_matching(&header, open).map(|close| (open, close)));
        let (open, close) = match bounds {
            Some(b) => b,
            None => continue,
        };

        let condition: Vec<String> = header[open + 1..close].to_vec();
        header.splice(open + 1..close, Some("true".to_owned()));
        lines[i] = header;

        let mut guard: Vec<String> = vec![
            "if".to_owned(),
            "(".to_owned(),
            "!".to_owned(),
            "(".to_owned(),
        ];
        guard.extend(condition);
        guard.push(")".to_owned());
        guard.push(")".to_owned());
        guard.push("{".to_owned());

        lines.insert(i + 1, guard);
        lines.insert(i + 2, vec!["break".to_owned(), ";".to_owned()]);
        lines.insert(i + 3, vec!["}".to_owned()]);
    }

    let flat: Vec<String> = lines.into_iter().map(|w| join(&w)).collect();
    one_line(&all_words(&flat))
}

/// Append `return ;` to every `void` function body that does not already end
/// with one.
pub(crate) fn append_void_returns(program: &[String]) -> Vec<String> {
    let mut tokens = all_words(program);

    let mut i = 0;
    while i + 1 < tokens.len() {
        if tokens[i] == "void" && tokens[i + 1].starts_with("!FUNC") {
            let body = find_next(&tokens, "{", i).and_then(|open| find_matching(&tokens, open));
            if let Some(close) = body {
                let ends_with_return =
                    close >= 2 && tokens[close - 1] == ";" && tokens[close - 2] == "return";
                if !ends_with_return {
                    tokens.insert(close, ";".to_owned());
                    tokens.insert(close, "return".to_owned());
                }
                i = close;
            }
        }
        i += 1;
    }

    one_line(&tokens)
}

/// `return x ;` becomes `return ( x ) ;` so the expression simplifier always
/// sees the returned expression as a parenthesized operand of `return`.
pub(crate) fn parenthesize_returns(program: &[String]) -> Vec<String> {
    let tokens = all_words(program);
    let mut out: Vec<String> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == "return" && tokens.get(i + 1).map(String::as_str) != Some(";") {
            out.push("return".to_owned());
            out.push("(".to_owned());
            let mut j = i + 1;
            while j < tokens.len() && tokens[j] != ";" {
                out.push(tokens[j].clone());
                j += 1;
            }
            out.push(")".to_owned());
            i = j;
            continue;
        }
        out.push(tokens[i].clone());
        i += 1;
    }

    one_line(&out)
}

/// Split initialized declarations in two and give bare declarations their
/// zero value: `int x = e ;` becomes `int x ; x = e ;` and `int x ;` becomes
/// `int x ; x = 0 ;`.
pub(crate) fn split_declarations(program: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for line in program {
        let w = words(line);
        let is_decl = w.len() >= 3
            && (w[0] == "int" || w[0] == "bool")
            && w[1].starts_with("!VAR");
        if !is_decl {
            out.push(line.clone());
            continue;
        }

        let default = if w[0] == "int" { "0" } else { "false" };
        let mut rewritten = vec![w[0].clone(), w[1].clone(), ";".to_owned()];
        if w[2] == ";" {
            rewritten.push(w[1].clone());
            rewritten.push("=".to_owned());
            rewritten.push(default.to_owned());
            rewritten.push(";".to_owned());
        } else {
            rewritten.extend(w[1..].iter().cloned());
        }
        out.push(join(&rewritten));
    }

    one_line(&all_words(&out))
}
