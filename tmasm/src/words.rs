//! Helpers over the whitespace-delimited token streams the passes rewrite.

pub(crate) const TYPES: &[&str] = &["void", "int", "bool"];

pub(crate) fn words(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

pub(crate) fn all_words(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| line.split_whitespace())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn join(words: &[String]) -> String {
    words.join(" ")
}

/// Collapse a token list back into the single-line form passes hand around.
pub(crate) fn one_line(words: &[String]) -> Vec<String> {
    vec![join(words)]
}

pub(crate) fn find_next(words: &[String], target: &str, from: usize) -> Option<usize> {
    (from..words.len()).find(|&i| words[i] == target)
}

/// Index of the bracket closing the one at `open`.
pub(crate) fn find_matching(words: &[String], open: usize) -> Option<usize> {
    let close = match words.get(open).map(String::as_str) {
        Some("{") => "}",
        Some("(") => ")",
        Some("[") => "]",
        _ => return None,
    };
    let open_token = words[open].clone();

    let mut depth = 0i32;
    for i in open..words.len() {
        if words[i] == open_token {
            depth += 1;
        } else if words[i] == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

pub(crate) fn is_integer_literal(word: &str) -> bool {
    let digits = if word.starts_with('-') { &word[1..] } else { word };
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
