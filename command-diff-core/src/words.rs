//! Shell-word quoting and splitting.
//!
//! Commands are stored and compared as single lines of text, so every free-text
//! value that ends up in a command must survive a round trip through a POSIX
//! shell. Quoting follows the usual single-quote convention; splitting is the
//! matching POSIX word splitter.

use std::borrow::Cow;

use crate::command::CommandError;

/// Quote `word` so a POSIX shell reads it back as exactly one word.
///
/// Words made only of alphanumerics and `@%+=:,./-_` are returned unchanged.
/// Anything else is wrapped in single quotes, with embedded single quotes
/// written as `'"'"'`. The empty string becomes `''`.
pub fn quote(word: &str) -> Cow<'_, str> {
    if word.is_empty() {
        return Cow::Borrowed("''");
    }
    if word.chars().all(is_safe) {
        return Cow::Borrowed(word);
    }
    Cow::Owned(format!("'{}'", word.replace('\'', r#"'"'"'"#)))
}

/// Quote a description so it is always visibly quoted.
///
/// Multi-word text keeps the single quotes from [`quote`]; a bare safe token
/// is wrapped in double quotes instead.
pub fn quote_description(text: &str) -> String {
    match quote(text) {
        Cow::Borrowed(bare) if bare == text => format!("\"{bare}\""),
        quoted => quoted.into_owned(),
    }
}

/// Split a line into words using POSIX shell rules.
///
/// Single quotes preserve everything literally, double quotes honour `\"` and
/// `\\` escapes, and a backslash outside quotes escapes the next character.
pub fn split(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated(line)),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(unterminated(line)),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated(line)),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(ch) => current.push(ch),
                    None => {
                        return Err(CommandError::TrailingEscape {
                            line: line.to_string(),
                        })
                    }
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-' | '_')
}

fn unterminated(line: &str) -> CommandError {
    CommandError::UnterminatedQuote {
        line: line.to_string(),
    }
}
