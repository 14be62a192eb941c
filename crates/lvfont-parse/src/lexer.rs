//! Tokenizer for generated C font sources.
//!
//! Produces a flat [`Token`] stream covering the subset of C that
//! `lv_font_conv` emits: identifiers, integer literals, string and
//! character literals, and punctuation. Comments and preprocessor lines
//! are removed from the stream; comment text is kept separately because
//! the generator writes metadata (`Size: 16 px`, `Bpp: 4`) there.

/// Kind and payload of one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword (e.g., `static`, `glyph_bitmap`, `NULL`).
    Ident(String),
    /// Integer literal with suffixes stripped (e.g., `0x1F`, `12u`). Character
    /// literals also lex as integers.
    Int(i64),
    /// String literal contents, escapes kept verbatim.
    Str(String),
    /// Single punctuation character (`{`, `}`, `=`, `,`, `.`, `&`, `-`, `;`, ...).
    Punct(char),
    /// Text that looked like a literal but could not be read as one
    /// (floating point numbers, out-of-range integers).
    Invalid(String),
}

/// A token with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    /// Returns true if this token is the punctuation `c`.
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    /// Identifier text, if this token is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// A comment's text without its delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub line: usize,
}

/// Output of [`tokenize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

/// Split C source text into tokens and comments.
///
/// Unterminated comments and literals run to the end of the input. The
/// lexer never fails; anything it cannot classify becomes a
/// [`TokenKind::Punct`] or [`TokenKind::Invalid`] token for the scanner
/// to reject.
pub fn tokenize(source: &str) -> Lexed {
    let input = source.as_bytes();
    let mut lexed = Lexed::default();
    let mut pos = 0;
    let mut line = 1;
    let mut at_line_start = true;

    while pos < input.len() {
        let b = input[pos];
        match b {
            b'\n' => {
                line += 1;
                at_line_start = true;
                pos += 1;
                continue;
            }
            b' ' | b'\t' | b'\r' | 0x0C => {
                pos += 1;
                continue;
            }
            b'/' if input.get(pos + 1) == Some(&b'*') => {
                let start_line = line;
                let text = block_comment(input, &mut pos, &mut line);
                lexed.comments.push(Comment {
                    text,
                    line: start_line,
                });
                continue;
            }
            b'/' if input.get(pos + 1) == Some(&b'/') => {
                let text = line_comment(input, &mut pos);
                lexed.comments.push(Comment { text, line });
                continue;
            }
            b'#' if at_line_start => {
                skip_directive(input, &mut pos, &mut line);
                continue;
            }
            _ => {}
        }

        at_line_start = false;
        let token_line = line;
        let kind = match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => TokenKind::Ident(identifier(input, &mut pos)),
            b'0'..=b'9' => number(input, &mut pos),
            b'"' => TokenKind::Str(quoted(input, &mut pos, b'"')),
            b'\'' => char_literal(input, &mut pos),
            _ => {
                // Multi-byte UTF-8 outside comments and strings is not valid C;
                // take the whole character so the scanner can reject it.
                match source.get(pos..).and_then(|rest| rest.chars().next()) {
                    Some(c) => {
                        pos += c.len_utf8();
                        TokenKind::Punct(c)
                    }
                    None => {
                        pos += 1;
                        TokenKind::Punct('\u{FFFD}')
                    }
                }
            }
        };
        lexed.tokens.push(Token {
            kind,
            line: token_line,
        });
    }

    lexed
}

fn block_comment(input: &[u8], pos: &mut usize, line: &mut usize) -> String {
    *pos += 2;
    let start = *pos;
    while *pos < input.len() {
        if input[*pos] == b'*' && input.get(*pos + 1) == Some(&b'/') {
            let text = String::from_utf8_lossy(&input[start..*pos]).into_owned();
            *pos += 2;
            return text;
        }
        if input[*pos] == b'\n' {
            *line += 1;
        }
        *pos += 1;
    }
    String::from_utf8_lossy(&input[start..]).into_owned()
}

fn line_comment(input: &[u8], pos: &mut usize) -> String {
    *pos += 2;
    let start = *pos;
    while *pos < input.len() && input[*pos] != b'\n' {
        *pos += 1;
    }
    String::from_utf8_lossy(&input[start..*pos]).into_owned()
}

/// Skip a preprocessor line, following backslash continuations.
fn skip_directive(input: &[u8], pos: &mut usize, line: &mut usize) {
    while *pos < input.len() {
        match input[*pos] {
            b'\\' if input.get(*pos + 1) == Some(&b'\n') => {
                *line += 1;
                *pos += 2;
            }
            b'\\' if input.get(*pos + 1) == Some(&b'\r') && input.get(*pos + 2) == Some(&b'\n') => {
                *line += 1;
                *pos += 3;
            }
            b'\n' => return,
            _ => *pos += 1,
        }
    }
}

fn identifier(input: &[u8], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < input.len() && (input[*pos].is_ascii_alphanumeric() || input[*pos] == b'_') {
        *pos += 1;
    }
    String::from_utf8_lossy(&input[start..*pos]).into_owned()
}

/// Integer literal: decimal, `0x` hex, `0b` binary or leading-zero octal,
/// with optional `u`/`l` suffixes.
fn number(input: &[u8], pos: &mut usize) -> TokenKind {
    let start = *pos;
    while *pos < input.len() && (input[*pos].is_ascii_alphanumeric() || input[*pos] == b'_') {
        *pos += 1;
    }
    // A fractional part makes this a float, which the grammar does not accept.
    let mut is_float = false;
    if input.get(*pos) == Some(&b'.') {
        is_float = true;
        *pos += 1;
        while *pos < input.len() && (input[*pos].is_ascii_alphanumeric() || input[*pos] == b'_') {
            *pos += 1;
        }
    }
    let text = String::from_utf8_lossy(&input[start..*pos]).into_owned();
    if is_float {
        return TokenKind::Invalid(text);
    }

    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    let parsed = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2)
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse::<i64>()
    };
    match parsed {
        Ok(value) => TokenKind::Int(value),
        Err(_) => TokenKind::Invalid(text),
    }
}

/// Contents of a quoted literal, escapes kept as written.
fn quoted(input: &[u8], pos: &mut usize, quote: u8) -> String {
    *pos += 1;
    let start = *pos;
    while *pos < input.len() {
        match input[*pos] {
            b'\\' => *pos += 2,
            // Unterminated on this line; stop so the next line lexes normally.
            b'\n' => break,
            c if c == quote => {
                let text = String::from_utf8_lossy(&input[start..*pos]).into_owned();
                *pos += 1;
                return text;
            }
            _ => *pos += 1,
        }
    }
    *pos = (*pos).min(input.len());
    String::from_utf8_lossy(&input[start..*pos]).into_owned()
}

fn char_literal(input: &[u8], pos: &mut usize) -> TokenKind {
    let text = quoted(input, pos, b'\'');
    let value = match text.as_bytes() {
        [b'\\', b'n'] => Some(i64::from(b'\n')),
        [b'\\', b't'] => Some(i64::from(b'\t')),
        [b'\\', b'0'] => Some(0),
        [b'\\', c] => Some(i64::from(*c)),
        _ => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(i64::from(u32::from(c))),
                _ => None,
            }
        }
    };
    match value {
        Some(v) => TokenKind::Int(v),
        None => TokenKind::Invalid(format!("'{text}'")),
    }
}
