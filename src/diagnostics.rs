//! Diagnostics accumulated by each pipeline stage.

use crate::token::Token;
use std::fmt;

/// Which stage raised a [`Diagnostic`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DiagnosticKind {
    Lex,
    Parse,
    Validate,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lex => "lex",
            Self::Parse => "parse",
            Self::Validate => "validate",
        })
    }
}

/// A single diagnostic message, optionally pinned to the token that triggered it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub token: Option<Token>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, token: Option<Token>) -> Self {
        Self { kind, message: message.into(), token }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(tok) if !tok.pos.is_none() => {
                write!(f, "{}: {} ({:?} {:?} @ {})", self.kind, self.message, tok.kind, tok.text, tok.pos)
            }
            Some(tok) => write!(f, "{}: {} ({:?} {:?})", self.kind, self.message, tok.kind, tok.text),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_position_when_present() {
        use crate::token::{Position, TokenKind};
        let tok = Token::new(TokenKind::Unknown, "@", Position::START, 1);
        let d = Diagnostic::new(DiagnosticKind::Lex, "Unknown character found while lexing!", Some(tok));
        let s = d.to_string();
        assert!(s.contains("Unknown character found while lexing!"));
        assert!(s.contains("1:1"));
    }
}
