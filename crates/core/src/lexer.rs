//! Tokenizer for declaration files.
//!
//! Recognises just enough of the host syntax to pull literal tuples out of
//! arbitrary surrounding code: string and integer literals, identifiers and
//! single-character punctuation. Comments are skipped. Anything unexpected
//! becomes a punctuation token so the caller can step over it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Str(String),
    Int(i64),
    Ident(String),
    Punct(char),
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        matches!(self, Token::Punct(p) if *p == c)
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Token::Ident(i) if i == name)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Splits `input` into tokens.
///
/// An unterminated string or block comment ends the stream; the tokens
/// produced before it are still returned.
pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if c == '/' && chars.get(i + 1) == Some(&'*') {
            match skip_block_comment(&chars, i) {
                Some(next) => i = next,
                None => break,
            }
        } else if c == '"' {
            match read_string(&chars, i + 1) {
                Some((value, next)) => {
                    tokens.push(Token::Str(value));
                    i = next;
                }
                None => break,
            }
        } else if c == '\'' {
            i = skip_quote(&chars, i, &mut tokens);
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let digits: String = chars[start..i].iter().collect();
            // type suffixes such as `10u8`
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            match digits.parse::<i64>() {
                Ok(n) => tokens.push(Token::Int(n)),
                Err(_) => tokens.push(Token::Ident(digits)),
            }
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            if ident == "r" || ident == "br" {
                if let Some((hashes, body)) = raw_string_open(&chars, i) {
                    match read_raw_string(&chars, body, hashes) {
                        Some((value, next)) => {
                            tokens.push(Token::Str(value));
                            i = next;
                            continue;
                        }
                        None => break,
                    }
                }
            }
            tokens.push(Token::Ident(ident));
        } else {
            tokens.push(Token::Punct(c));
            i += 1;
        }
    }

    tokens
}

/// Returns the index just past the comment, or `None` if it never closes.
fn skip_block_comment(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < chars.len() {
        if chars[i] == '/' && chars[i + 1] == '*' {
            depth += 1;
            i += 2;
        } else if chars[i] == '*' && chars[i + 1] == '/' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return Some(i);
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Reads a string body starting after the opening quote.
fn read_string(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '"' => return Some((value, i + 1)),
            '\\' => {
                let escaped = *chars.get(i + 1)?;
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '0' => value.push('\0'),
                    // line continuation
                    '\n' => {
                        i += 2;
                        while i < chars.len() && chars[i].is_whitespace() {
                            i += 1;
                        }
                        continue;
                    }
                    other => value.push(other),
                }
                i += 2;
            }
            other => {
                value.push(other);
                i += 1;
            }
        }
    }
    None
}

/// Matches `#*"` at `start`; returns the hash count and the body start.
fn raw_string_open(chars: &[char], start: usize) -> Option<(usize, usize)> {
    let mut i = start;
    while chars.get(i) == Some(&'#') {
        i += 1;
    }
    if chars.get(i) == Some(&'"') {
        Some((i - start, i + 1))
    } else {
        None
    }
}

/// Reads a raw string body verbatim up to `"` followed by `hashes` hashes.
fn read_raw_string(chars: &[char], start: usize, hashes: usize) -> Option<(String, usize)> {
    let mut i = start;
    while i < chars.len() {
        if chars[i] == '"' {
            let end = i + 1 + hashes;
            if end <= chars.len() && chars[i + 1..end].iter().all(|c| *c == '#') {
                return Some((chars[start..i].iter().collect(), end));
            }
        }
        i += 1;
    }
    None
}

/// Handles `'`: char literals are dropped, a lifetime tick becomes punctuation.
fn skip_quote(chars: &[char], start: usize, tokens: &mut Vec<Token>) -> usize {
    match (chars.get(start + 1), chars.get(start + 2), chars.get(start + 3)) {
        (Some('\\'), Some(_), Some('\'')) => start + 4,
        (Some(c), Some('\''), _) if *c != '\\' => start + 3,
        _ => {
            tokens.push(Token::Punct('\''));
            start + 1
        }
    }
}
