//! Recovers the declaration order of abstract methods from Java source text.
//!
//! This is deliberately not a Java parser: a tolerant [`Lexer`] feeds a
//! brace-counting scanner that only understands type bodies and body-less
//! method declarations. Callers must validate the result against the members
//! they expect; see [`DeclarationOrder::is_complete`].

#![forbid(unsafe_code)]

mod lexer;
mod scanner;

pub use lexer::{is_keyword, tokenize, Lexer, Token, TokenKind};
pub use scanner::{extract_declaration_order, DeclarationOrder};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("source ends inside an unterminated literal or comment (at byte {offset})")]
    Truncated { offset: usize },
    #[error("unbalanced braces in source")]
    Unbalanced,
}

/// Lexes and scans `text`, failing if the token stream was truncated or the
/// braces did not balance.
pub fn scan_source(text: &str, root_package: &str) -> Result<DeclarationOrder, ScanError> {
    let mut lexer = tokenize(text);
    let order = extract_declaration_order(lexer.by_ref(), root_package);
    if lexer.is_truncated() {
        return Err(ScanError::Truncated {
            offset: lexer.offset(),
        });
    }
    if !order.is_complete() {
        return Err(ScanError::Unbalanced);
    }
    Ok(order)
}
