use super::error::LexError;
use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token("...")]
    Ellipsis,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("=")]
    Equal,
    #[token("<>")]
    NotEqual,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,

    #[regex("[dD]")]
    D,
    #[regex("[bB]")]
    B,
    #[regex("[rR]")]
    R,
    #[regex("[uU]")]
    U,
    #[regex("[cC]")]
    Calc,
    #[regex("[sS]")]
    Secret,

    /// `choice[...]` together with the rest of the line.
    #[regex(r"[cC][hH][oO][iI][cC][eE]\[[^\]\n]*\][^\n]*")]
    Choice,
    #[regex(r"[cC][hH][oO][iI][cC][eE]\[[^\]\n]*")]
    ErrUnterminatedChoice,

    Eof,

    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub const COMPARISON_OPS: &'static [Self] = &[
        Self::Equal,
        Self::NotEqual,
        Self::LessThan,
        Self::GreaterThan,
        Self::LessEqual,
        Self::GreaterEqual,
    ];

    pub const ROLL_OPS: &'static [Self] = &[Self::D, Self::B, Self::R, Self::U];

    /// Tokens that may begin a roll operand.
    pub const OPERAND_START: &'static [Self] =
        &[Self::Integer, Self::LeftParen, Self::LeftBracket];

    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            Comma => "','",
            Ellipsis => "'...'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Equal => "'='",
            NotEqual => "'<>'",
            LessThan => "'<'",
            GreaterThan => "'>'",
            LessEqual => "'<='",
            GreaterEqual => "'>='",
            D => "'D'",
            B => "'B'",
            R => "'R'",
            U => "'U'",
            Calc => "'C'",
            Secret => "'S'",
            Choice => "<choice>",
            Eof => "end of input",
            ErrUnterminatedChoice | Error => "<error>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }
}

/// Splits `input` into tokens, ending with a single [`TokenKind::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        match kind {
            TokenKind::Error => {
                let found = input
                    .get(span.start..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(LexError::UnexpectedCharacter {
                    position: span.start,
                    found,
                });
            }
            TokenKind::ErrUnterminatedChoice => {
                return Err(LexError::UnterminatedBracket {
                    position: span.start,
                })
            }
            _ => tokens.push(Token::new(kind, lexer.slice(), span)),
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "", input.len()..input.len()));
    Ok(tokens)
}
