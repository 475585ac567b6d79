//! JSONC comment stripping
//!
//! Turns a JSON document annotated with `//` and `/* */` comments into
//! text a strict JSON parser accepts. The scan tracks string literals so
//! comment markers inside strings (URLs, shell commands) are left alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString,
    InStringEscape,
    LineComment,
    BlockComment,
}

/// Remove comments from a JSONC document.
///
/// Never fails: anything that is still not valid JSON is reported later by
/// the JSON parser. Newlines inside block comments are kept so parser
/// diagnostics point at the right source line, and a closed block comment
/// leaves a single space behind.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        state = match state {
            ScanState::Normal => match c {
                '"' => {
                    out.push(c);
                    ScanState::InString
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    ScanState::LineComment
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    ScanState::BlockComment
                }
                _ => {
                    out.push(c);
                    ScanState::Normal
                }
            },
            ScanState::InString => {
                out.push(c);
                match c {
                    '\\' => ScanState::InStringEscape,
                    '"' => ScanState::Normal,
                    _ => ScanState::InString,
                }
            }
            ScanState::InStringEscape => {
                out.push(c);
                ScanState::InString
            }
            ScanState::LineComment => {
                if c == '\n' {
                    out.push(c);
                    ScanState::Normal
                } else {
                    ScanState::LineComment
                }
            }
            ScanState::BlockComment => match c {
                '*' if chars.peek() == Some(&'/') => {
                    // A comment separates tokens like any other whitespace
                    chars.next();
                    out.push(' ');
                    ScanState::Normal
                }
                '\n' => {
                    out.push(c);
                    ScanState::BlockComment
                }
                _ => ScanState::BlockComment,
            },
        };
    }

    out
}
