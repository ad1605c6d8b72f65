//! Tokenizer for EQL.
//!
//! Produces a flat token stream over an already trimmed query. Keywords are
//! only recognised at a clause boundary: `FROM`, `WHERE`, `ON` and `>>` must
//! be preceded by whitespace and followed by whitespace or the end of the
//! input, so `FROMAGE` or `a>>b` stay ordinary tokens. `GET` is left to the
//! parser since it can only ever open a query.

use std::ops::Range;

// used to split a query into words, operators and punctuation
use logos::Logos;
use tracing::trace;

use crate::schema::Keyword;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Keyword(Keyword),
    Operator,
    Comma,
    OpenParen,
    CloseParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'q> {
    pub kind: TokenKind,
    pub text: &'q str,
    /// Byte range into the tokenized input.
    pub span: Range<usize>,
    pub spaced_before: bool,
}

impl Token<'_> {
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }
    /// A word made only of ASCII letters, digits and underscores.
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Word
            && self.text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"\s+")]
enum Lexeme {
    #[token(",")]
    Comma,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[regex(r"[=!<>]+")]
    Operator,

    #[regex(r"[^\s,()=!<>]+")]
    Word,
}

impl From<Lexeme> for TokenKind {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::Comma => TokenKind::Comma,
            Lexeme::OpenParen => TokenKind::OpenParen,
            Lexeme::CloseParen => TokenKind::CloseParen,
            Lexeme::Operator => TokenKind::Operator,
            Lexeme::Word => TokenKind::Word,
        }
    }
}

fn delimiter_keyword(token: &Token) -> Option<Keyword> {
    match (token.kind, token.text) {
        (TokenKind::Word, "FROM") => Some(Keyword::From),
        (TokenKind::Word, "WHERE") => Some(Keyword::Where),
        (TokenKind::Word, "ON") => Some(Keyword::On),
        (TokenKind::Operator, ">>") => Some(Keyword::Dump),
        _ => None,
    }
}

pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexeme::lexer(input);
    let mut tokens: Vec<Token> = Vec::new();
    let mut previous_end = 0;
    while let Some(lexeme) = lexer.next() {
        let span = lexer.span();
        // every character falls in some class, so an error is never produced
        let kind = lexeme.map_or(TokenKind::Word, TokenKind::from);
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            spaced_before: span.start > previous_end,
            span: span.clone(),
        });
        previous_end = span.end;
    }
    // a keyword needs whitespace on both sides (or the end of input after it)
    for i in 0..tokens.len() {
        let followed_by_space = tokens.get(i + 1).is_none_or(|next| next.spaced_before);
        if tokens[i].spaced_before && followed_by_space {
            if let Some(keyword) = delimiter_keyword(&tokens[i]) {
                trace!(%keyword, at = tokens[i].span.start, "clause keyword");
                tokens[i].kind = TokenKind::Keyword(keyword);
            }
        }
    }
    tokens
}
