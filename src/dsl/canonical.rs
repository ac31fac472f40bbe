/// Stands in for a space inside `[ ... ]` so a bracketed argument list
/// survives whitespace splitting as one token.
pub const SENTINEL: char = '|';

/// Single-line, single-space script text whose bracketed argument lists
/// contain no spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical(String);

impl Canonical {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whitespace-separated tokens, empty fragments dropped.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }
}

/// Normalize raw script text in five forward passes:
/// strip `{...}` comments, pad brackets, flatten tabs and line breaks,
/// collapse space runs, then hide spaces inside brackets behind [`SENTINEL`].
pub fn canonicalize(source: &str) -> Canonical {
    let stripped = strip_comments(source);

    let mut padded = String::with_capacity(stripped.len() + 8);
    for ch in stripped.chars() {
        match ch {
            '[' => padded.push_str(" ["),
            ']' => padded.push_str("] "),
            '\t' | '\n' | '\r' => padded.push(' '),
            other => padded.push(other),
        }
    }

    let mut collapsed = String::with_capacity(padded.len());
    let mut last_space = false;
    for ch in padded.chars() {
        if ch == ' ' {
            if !last_space {
                collapsed.push(' ');
            }
            last_space = true;
        } else {
            collapsed.push(ch);
            last_space = false;
        }
    }

    let mut result = String::with_capacity(collapsed.len());
    let mut in_brackets = false;
    for ch in collapsed.chars() {
        match ch {
            ']' => {
                in_brackets = false;
                result.push(ch);
            }
            '[' => {
                in_brackets = true;
                result.push(ch);
            }
            ' ' if in_brackets => result.push(SENTINEL),
            other => result.push(other),
        }
    }

    Canonical(result)
}

/// Comments are not nestable: the first `}` after a `{` closes it, an
/// unmatched `{` swallows the rest of the text, and a stray `}` is kept.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_comment = false;
    for ch in source.chars() {
        if ch == '{' {
            in_comment = true;
        }
        if !in_comment {
            out.push(ch);
        } else if ch == '}' {
            in_comment = false;
        }
    }
    out
}

/// True for tokens that carry (part of) a bracketed argument list.
pub fn is_bracket_fragment(token: &str) -> bool {
    token.contains('[') || token.contains(']')
}

/// Turn a canonical token back into argument text: brackets removed,
/// sentinels restored to spaces, outer whitespace trimmed.
pub fn argument_text(token: &str) -> String {
    token
        .chars()
        .filter(|c| *c != '[' && *c != ']')
        .map(|c| if c == SENTINEL { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Convenience for callers that only need the token list.
pub fn tokenize(source: &str) -> Vec<String> {
    canonicalize(source).tokens().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(s: &str) -> Vec<String> {
        tokenize(s)
    }

    #[test]
    fn bracket_lists_stay_whole() {
        assert_eq!(tok("plane [1 2 3] [0 0 1]"), vec!["plane", "[1|2|3]", "[0|0|1]"]);
    }

    #[test]
    fn fused_brackets_are_split() {
        assert_eq!(tok("plane[1 2 3][0 0 1]"), tok("plane [1 2 3] [0 0 1]"));
        assert_eq!(tok("paper[square]new"), vec!["paper", "[square]", "new"]);
    }

    #[test]
    fn comments_are_removed() {
        assert_eq!(
            tok("plane {comment} [1 2 3] [0 0 1]"),
            tok("plane [1 2 3] [0 0 1]")
        );
    }

    #[test]
    fn text_without_braces_is_unchanged_by_stripping() {
        let text = "paper [a4] new plane [0 0 0] [1 0 0] reflect";
        assert_eq!(strip_comments(text), text);
    }

    #[test]
    fn comments_do_not_nest() {
        // the first `}` closes the comment, the second one is ordinary text
        assert_eq!(tok("a {x {y} b} c"), vec!["a", "b}", "c"]);
    }

    #[test]
    fn unmatched_open_brace_strips_to_end() {
        assert_eq!(tok("new {never closed rotate"), vec!["new"]);
    }

    #[test]
    fn whitespace_is_flattened_and_collapsed() {
        let c = canonicalize("paper\t[square]\n\n  new\r\nundo");
        assert_eq!(c.as_str(), "paper [square] new undo");
    }

    #[test]
    fn spaces_padding_brackets_become_sentinels() {
        assert_eq!(tok("target [ 1  2 ]"), vec!["target", "[|1|2|]"]);
        assert_eq!(argument_text("[|1|2|]"), "1 2");
    }

    #[test]
    fn argument_text_restores_spaces() {
        assert_eq!(argument_text("[my|file.txt]"), "my file.txt");
        assert_eq!(argument_text("90"), "90");
    }

    #[test]
    fn fragment_detection() {
        assert!(is_bracket_fragment("[1|2]"));
        assert!(is_bracket_fragment("b}]"));
        assert!(!is_bracket_fragment("rotate"));
    }
}
