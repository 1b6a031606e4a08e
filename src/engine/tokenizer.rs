//! Line lexer.
//!
//! Source is tokenized one line at a time; no token ever spans lines.
//! Whitespace and commas separate tokens, `;` starts a comment running to
//! the end of the line, and words are lowercased as they are read, which is
//! what makes the whole language case-insensitive.

use crate::engine::errors::ExecError;

/// One lexical token plus the 0-based line it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

/// Lexical shape of a token.
///
/// Character literals are indistinguishable from the integer they encode by
/// the time they leave the tokenizer. Word characters are ASCII letters and
/// `_` only; a digit ends a word, so `r1` reads as the word `r` followed by
/// the integer `1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, stored lowercased.
    Word(String),
    /// Integer or character literal.
    Int(i64),
    /// String literal with escapes applied.
    Str(String),
    /// `[word]`, an address held in a register.
    PointerWord(String),
    /// `[int]`, a literal address.
    PointerInt(i64),
    /// Any other single character.
    Symbol(char),
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Tokenizes one source line.
pub fn tokenize(line: &str, line_no: u32) -> Result<Vec<Token>, ExecError> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let mut push = |kind: TokenKind| tokens.push(Token { kind, line: line_no });

    while i < chars.len() {
        let c = chars[i];

        if matches!(c, ' ' | '\t' | '\r' | ',') {
            i += 1;
            continue;
        }
        if c == ';' {
            break;
        }

        // Character literal: the payload is read, then one presumed closing
        // quote is skipped without being checked.
        if c == '\'' {
            i += 1;
            let Some(&payload) = chars.get(i) else {
                return Err(ExecError::UnterminatedChar { line: line_no });
            };
            i += 1;
            let value = if payload == '\\' {
                let Some(&escaped) = chars.get(i) else {
                    return Err(ExecError::UnterminatedChar { line: line_no });
                };
                i += 1;
                match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                }
            } else {
                payload
            };
            i += 1;
            push(TokenKind::Int(value as u32 as i64));
            continue;
        }

        if c == '"' {
            i += 1;
            let mut text = String::new();
            let mut closed = false;
            while i < chars.len() {
                let ch = chars[i];
                if ch == '\\' {
                    i += 1;
                    let Some(&escaped) = chars.get(i) else {
                        break;
                    };
                    text.push(if escaped == 'n' { '\n' } else { escaped });
                    i += 1;
                    continue;
                }
                i += 1;
                if ch == '"' {
                    closed = true;
                    break;
                }
                text.push(ch);
            }
            if !closed {
                return Err(ExecError::UnterminatedString { line: line_no });
            }
            push(TokenKind::Str(text));
            continue;
        }

        if c.is_ascii_digit()
            || (c == '[' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()))
        {
            let bracketed = c == '[';
            if bracketed {
                i += 1;
            }
            let mut value: i64 = 0;
            while i < chars.len() && chars[i].is_ascii_digit() {
                let digit = (chars[i] as u8 - b'0') as i64;
                value = value.wrapping_mul(10).wrapping_add(digit);
                i += 1;
            }
            if bracketed {
                if chars.get(i) != Some(&']') {
                    return Err(ExecError::UnclosedPointer { line: line_no });
                }
                i += 1;
                push(TokenKind::PointerInt(value));
            } else {
                push(TokenKind::Int(value));
            }
            continue;
        }

        if is_word_char(c) || (c == '[' && chars.get(i + 1).copied().is_some_and(is_word_char)) {
            let bracketed = c == '[';
            if bracketed {
                i += 1;
            }
            let mut word = String::new();
            while i < chars.len() && is_word_char(chars[i]) {
                word.push(chars[i].to_ascii_lowercase());
                i += 1;
            }
            if bracketed {
                if chars.get(i) != Some(&']') {
                    return Err(ExecError::UnclosedPointer { line: line_no });
                }
                i += 1;
                push(TokenKind::PointerWord(word));
            } else {
                push(TokenKind::Word(word));
            }
            continue;
        }

        push(TokenKind::Symbol(c));
        i += 1;
    }

    Ok(tokens)
}
