pub mod ast;
mod error;
mod lexer;
mod parser;

pub use error::{LexError, ParseError, ParseErrorKind};
pub use lexer::{tokenize, Token, TokenKind};

/// Parses one command line. `source_name` only labels errors.
pub fn parse(source_name: &str, input: &str) -> Result<ast::Command, ParseError> {
    parser::Parser::new(source_name, input)?.parse()
}
