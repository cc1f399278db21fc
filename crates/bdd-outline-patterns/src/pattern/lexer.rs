//! Lexer splitting a step-definition pattern into literals and placeholders.

use crate::errors::PatternError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Literal(String),
    Placeholder {
        name: &'a str,
        hint: Option<&'a str>,
    },
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Parse the placeholder opening at byte `start`, returning it and the byte
/// index just past its closing brace.
fn placeholder(pattern: &str, start: usize) -> Result<(Token<'_>, usize), PatternError> {
    let body_start = start + 1;
    let rest = pattern.get(body_start..).unwrap_or_default();
    let close = rest
        .find('}')
        .ok_or(PatternError::Unclosed { position: start })?;
    let body = rest.get(..close).unwrap_or_default();
    let (name, hint) = match body.split_once(':') {
        Some((name, hint)) => (name, Some(hint)),
        None => (body, None),
    };
    if !is_valid_name(name) {
        return Err(PatternError::InvalidName {
            name: name.to_string(),
            position: start,
        });
    }
    Ok((Token::Placeholder { name, hint }, body_start + close + 1))
}

/// Split `pattern` into tokens.
///
/// `{{` and `}}` are literal braces and a backslash makes the next
/// character literal. Any other brace must belong to a placeholder.
pub(crate) fn lex_pattern(pattern: &str) -> Result<Vec<Token<'_>>, PatternError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => literal.push(chars.next().map_or('\\', |(_, next)| next)),
            '{' | '}' if chars.next_if(|&(_, next)| next == c).is_some() => literal.push(c),
            '{' => {
                let (token, end) = placeholder(pattern, pos)?;
                while chars.next_if(|&(idx, _)| idx < end).is_some() {}
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(token);
            }
            '}' => return Err(PatternError::StrayBrace { position: pos }),
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}
