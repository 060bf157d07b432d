//! Tokenizer for the purl expression language.
//!
//! Turns source text into a flat `Vec<Token>` (including trivia: whitespace
//! and comments). The parser's lookahead skips trivia transparently but it
//! stays in the stream so the CST built on top of it is lossless.

mod cursor;

use purl_common::span::Span;
use purl_common::token::{Token, TokenKind};

use cursor::Cursor;

/// Tokenize a complete source file.
///
/// Always terminates with a single `TokenKind::Eof` token whose span is
/// zero-length at the end of the source, so callers never need to special-
/// case "ran out of tokens".
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer<'src> {
    cursor: Cursor<'src>,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while !self.cursor.is_eof() {
            self.lex_one();
        }
        let end = self.cursor.pos();
        self.tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
        self.tokens
    }

    fn push(&mut self, kind: TokenKind, start: u32) {
        let end = self.cursor.pos();
        self.tokens.push(Token::new(kind, Span::new(start, end)));
    }

    fn lex_one(&mut self) {
        let start = self.cursor.pos();
        let c = match self.cursor.peek() {
            Some(c) => c,
            None => return,
        };

        match c {
            c if c.is_whitespace() => {
                self.cursor.eat_while(|c| c.is_whitespace());
                self.push(TokenKind::Whitespace, start);
            }
            '-' if self.cursor.peek_next() == Some('-') => {
                self.lex_line_comment(start);
            }
            '{' if self.cursor.peek_next() == Some('-') => {
                self.lex_block_comment(start);
            }
            '(' => {
                self.cursor.advance();
                self.push(TokenKind::LParen, start);
            }
            ')' => {
                self.cursor.advance();
                self.push(TokenKind::RParen, start);
            }
            '[' => {
                self.cursor.advance();
                self.push(TokenKind::LBracket, start);
            }
            ']' => {
                self.cursor.advance();
                self.push(TokenKind::RBracket, start);
            }
            '{' => self.lex_lbrace(start),
            '}' => {
                self.cursor.advance();
                self.push(TokenKind::RBrace, start);
            }
            ',' => {
                self.cursor.advance();
                self.push(TokenKind::Comma, start);
            }
            ';' => {
                self.cursor.advance();
                self.push(TokenKind::Semicolon, start);
            }
            '\\' => {
                self.cursor.advance();
                self.push(TokenKind::Backslash, start);
            }
            '\'' => self.lex_char(start),
            '"' => self.lex_string(start),
            '=' => self.lex_equals(start),
            '-' => self.lex_minus(start),
            '*' => {
                self.cursor.advance();
                self.push(TokenKind::Star, start);
            }
            '/' => self.lex_slash(start),
            '+' => self.lex_plus(start),
            ':' => self.lex_colon(start),
            '|' => self.lex_pipe(start),
            '.' => self.lex_dot(start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '&' => self.lex_amp(start),
            c if c.is_ascii_digit() => self.lex_number(start),
            '_' => self.lex_underscore(start),
            c if c.is_alphabetic() => self.lex_ident(start),
            _ => {
                self.cursor.advance();
                self.push(TokenKind::Error, start);
            }
        }
    }

    fn lex_line_comment(&mut self, start: u32) {
        self.cursor.eat_while(|c| c != '\n');
        self.push(TokenKind::LineComment, start);
    }

    /// Nested `{- ... -}` block comments.
    fn lex_block_comment(&mut self, start: u32) {
        self.cursor.advance(); // {
        self.cursor.advance(); // -
        let mut depth = 1u32;
        while depth > 0 {
            match (self.cursor.peek(), self.cursor.peek_next()) {
                (Some('{'), Some('-')) => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth += 1;
                }
                (Some('-'), Some('}')) => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth -= 1;
                }
                (Some(_), _) => {
                    self.cursor.advance();
                }
                (None, _) => break, // unterminated; caller sees the span, no error token
            }
        }
        self.push(TokenKind::BlockComment, start);
    }

    /// `{`, `{|`, or the whole-token `{..}`.
    fn lex_lbrace(&mut self, start: u32) {
        self.cursor.advance(); // {
        if self.cursor.peek() == Some('|') {
            self.cursor.advance();
            self.push(TokenKind::LBracePipe, start);
            return;
        }
        if self.cursor.peek() == Some('.') && self.cursor.peek_next() == Some('.') {
            self.cursor.advance(); // .
            self.cursor.advance(); // .
            if self.cursor.peek() == Some('}') {
                self.cursor.advance();
                self.push(TokenKind::RecordWildcardTok, start);
                return;
            }
            // `{..` not followed by `}` isn't valid syntax; report as error
            // token covering what we consumed so the parser can recover.
            self.push(TokenKind::Error, start);
            return;
        }
        self.push(TokenKind::LBrace, start);
    }

    fn lex_equals(&mut self, start: u32) {
        self.cursor.advance(); // =
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.push(TokenKind::EqEq, start);
            }
            Some('>') => {
                self.cursor.advance();
                self.push(TokenKind::FatArrow, start);
            }
            _ => self.push(TokenKind::Equals, start),
        }
    }

    fn lex_minus(&mut self, start: u32) {
        self.cursor.advance(); // -
        if self.cursor.peek() == Some('>') {
            self.cursor.advance();
            self.push(TokenKind::Arrow, start);
        } else {
            self.push(TokenKind::Minus, start);
        }
    }

    fn lex_slash(&mut self, start: u32) {
        self.cursor.advance(); // /
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.push(TokenKind::SlashEquals, start);
        } else {
            self.push(TokenKind::Slash, start);
        }
    }

    fn lex_plus(&mut self, start: u32) {
        self.cursor.advance(); // +
        if self.cursor.peek() == Some('+') {
            self.cursor.advance();
            self.push(TokenKind::PlusPlus, start);
        } else {
            self.push(TokenKind::Plus, start);
        }
    }

    fn lex_colon(&mut self, start: u32) {
        self.cursor.advance(); // :
        match self.cursor.peek() {
            Some(':') => {
                self.cursor.advance();
                self.push(TokenKind::ColonColon, start);
            }
            Some('=') => {
                self.cursor.advance();
                self.push(TokenKind::ColonEquals, start);
            }
            _ => self.push(TokenKind::Colon, start),
        }
    }

    fn lex_pipe(&mut self, start: u32) {
        self.cursor.advance(); // |
        match self.cursor.peek() {
            Some('|') => {
                self.cursor.advance();
                self.push(TokenKind::PipePipe, start);
            }
            Some('}') => {
                self.cursor.advance();
                self.push(TokenKind::RBracePipe, start);
            }
            Some('>') => {
                self.cursor.advance();
                self.push(TokenKind::PipeGt, start);
            }
            _ => self.push(TokenKind::Pipe, start),
        }
    }

    fn lex_dot(&mut self, start: u32) {
        self.cursor.advance(); // .
        self.push(TokenKind::Dot, start);
    }

    fn lex_lt(&mut self, start: u32) {
        self.cursor.advance(); // <
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.push(TokenKind::LtEq, start);
            }
            Some('<') => {
                self.cursor.advance();
                self.push(TokenKind::LtLt, start);
            }
            Some('|') => {
                self.cursor.advance();
                self.push(TokenKind::LtPipe, start);
            }
            Some('>') => {
                self.cursor.advance();
                self.push(TokenKind::Diamond, start);
            }
            _ => self.push(TokenKind::Lt, start),
        }
    }

    fn lex_gt(&mut self, start: u32) {
        self.cursor.advance(); // >
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.push(TokenKind::GtEq, start);
            }
            Some('>') => {
                self.cursor.advance();
                self.push(TokenKind::GtGt, start);
            }
            _ => self.push(TokenKind::Gt, start),
        }
    }

    fn lex_amp(&mut self, start: u32) {
        self.cursor.advance(); // &
        if self.cursor.peek() == Some('&') {
            self.cursor.advance();
            self.push(TokenKind::AmpAmp, start);
        } else {
            self.push(TokenKind::Error, start);
        }
    }

    fn lex_number(&mut self, start: u32) {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.cursor.peek() == Some('.') {
            if let Some(next) = self.cursor.peek_next() {
                if next.is_ascii_digit() {
                    is_float = true;
                    self.cursor.advance(); // .
                    self.cursor.eat_while(|c| c.is_ascii_digit());
                }
            }
        }

        if matches!(self.cursor.peek(), Some('e') | Some('E')) && self.exponent_has_digit() {
            self.cursor.advance(); // e/E
            if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                self.cursor.advance();
            }
            is_float = true;
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        self.push(
            if is_float {
                TokenKind::FloatLiteral
            } else {
                TokenKind::IntLiteral
            },
            start,
        );
    }

    /// Whether the `e`/`E` at the cursor starts a valid exponent (optional
    /// sign, then at least one digit) without consuming anything.
    fn exponent_has_digit(&self) -> bool {
        match self.cursor.peek_next() {
            Some(d) if d.is_ascii_digit() => true,
            Some('+') | Some('-') => matches!(self.cursor.peek_at(2), Some(d) if d.is_ascii_digit()),
            _ => false,
        }
    }

    fn lex_char(&mut self, start: u32) {
        self.cursor.advance(); // opening '
        if self.cursor.peek() == Some('\\') {
            self.cursor.advance();
            self.cursor.advance(); // escaped char
        } else {
            self.cursor.advance(); // the char itself
        }
        if self.cursor.peek() == Some('\'') {
            self.cursor.advance();
        }
        self.push(TokenKind::CharLiteral, start);
    }

    fn lex_string(&mut self, start: u32) {
        self.cursor.advance(); // opening "
        loop {
            match self.cursor.peek() {
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some(_) => {
                    self.cursor.advance();
                }
                None => break, // unterminated
            }
        }
        self.push(TokenKind::StringLiteral, start);
    }

    fn lex_underscore(&mut self, start: u32) {
        self.cursor.advance(); // _
        // `_` followed by an identifier continuation char is an ordinary
        // lower identifier (`_foo`), not the wildcard token.
        if matches!(self.cursor.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '\'') {
            self.cursor.eat_while(|c| c.is_alphanumeric() || c == '_' || c == '\'');
            self.push(TokenKind::LowerIdent, start);
        } else {
            self.push(TokenKind::Wildcard, start);
        }
    }

    fn lex_ident(&mut self, start: u32) {
        let first = self.cursor.peek().unwrap();
        self.cursor.advance();
        self.cursor.eat_while(|c| c.is_alphanumeric() || c == '_' || c == '\'');
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end);

        let kind = if first.is_uppercase() {
            TokenKind::upper_keyword_from_str(text).unwrap_or(TokenKind::UpperIdent)
        } else {
            TokenKind::keyword_from_str(text).unwrap_or(TokenKind::LowerIdent)
        };
        self.push(kind, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    fn significant_kinds(source: &str) -> Vec<TokenKind> {
        kinds(source)
            .into_iter()
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn lambda_and_application() {
        assert_eq!(
            significant_kinds(r"\x -> x"),
            vec![
                TokenKind::Backslash,
                TokenKind::LowerIdent,
                TokenKind::Arrow,
                TokenKind::LowerIdent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_recognized() {
        assert_eq!(
            significant_kinds("let in if then else case of forall type import override"),
            vec![
                TokenKind::Let,
                TokenKind::In,
                TokenKind::If,
                TokenKind::Then,
                TokenKind::Else,
                TokenKind::Case,
                TokenKind::Of,
                TokenKind::Forall,
                TokenKind::Type,
                TokenKind::Import,
                TokenKind::Override,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn upper_keywords_recognized() {
        assert_eq!(
            significant_kinds("True False Eq Ord Num Ctor"),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eq,
                TokenKind::Ord,
                TokenKind::Num,
                TokenKind::UpperIdent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn record_punctuation() {
        assert_eq!(
            significant_kinds("{ x = 1, y := 2 | r } \\ z {..}"),
            vec![
                TokenKind::LBrace,
                TokenKind::LowerIdent,
                TokenKind::Equals,
                TokenKind::IntLiteral,
                TokenKind::Comma,
                TokenKind::LowerIdent,
                TokenKind::ColonEquals,
                TokenKind::IntLiteral,
                TokenKind::Pipe,
                TokenKind::LowerIdent,
                TokenKind::RBrace,
                TokenKind::Backslash,
                TokenKind::LowerIdent,
                TokenKind::RecordWildcardTok,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn difference_record_and_variant_embed() {
        assert_eq!(
            significant_kinds("{| x |} <| Foo, Bar |>"),
            vec![
                TokenKind::LBracePipe,
                TokenKind::LowerIdent,
                TokenKind::RBracePipe,
                TokenKind::LtPipe,
                TokenKind::UpperIdent,
                TokenKind::Comma,
                TokenKind::UpperIdent,
                TokenKind::PipeGt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numeric_literals() {
        let toks = tokenize("42 3.14 1e10 2.5e-3");
        let significant: Vec<_> = toks.into_iter().filter(|t| !t.kind.is_trivia()).collect();
        assert_eq!(significant[0].kind, TokenKind::IntLiteral);
        assert_eq!(significant[1].kind, TokenKind::FloatLiteral);
        assert_eq!(significant[2].kind, TokenKind::FloatLiteral);
        assert_eq!(significant[3].kind, TokenKind::FloatLiteral);
    }

    #[test]
    fn nested_block_comments() {
        assert_eq!(
            significant_kinds("{- outer {- inner -} still outer -} 1"),
            vec![TokenKind::IntLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn line_comment() {
        assert_eq!(
            significant_kinds("1 -- trailing comment\n2"),
            vec![TokenKind::IntLiteral, TokenKind::IntLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn char_and_string_literals() {
        let toks = tokenize(r#"'a' "hello \"world\"" '\n'"#);
        let significant: Vec<_> = toks.into_iter().filter(|t| !t.kind.is_trivia()).collect();
        assert_eq!(significant[0].kind, TokenKind::CharLiteral);
        assert_eq!(significant[1].kind, TokenKind::StringLiteral);
        assert_eq!(significant[2].kind, TokenKind::CharLiteral);
    }

    #[test]
    fn wildcard_vs_underscore_ident() {
        assert_eq!(
            significant_kinds("_ _foo"),
            vec![TokenKind::Wildcard, TokenKind::LowerIdent, TokenKind::Eof]
        );
    }

    #[test]
    fn composition_and_comparison_operators() {
        assert_eq!(
            significant_kinds(">> << == /= > >= < <= && || :: := =>"),
            vec![
                TokenKind::GtGt,
                TokenKind::LtLt,
                TokenKind::EqEq,
                TokenKind::SlashEquals,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::ColonColon,
                TokenKind::ColonEquals,
                TokenKind::FatArrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn diamond_and_semicolon() {
        assert_eq!(
            significant_kinds("a <> b; c"),
            vec![
                TokenKind::LowerIdent,
                TokenKind::Diamond,
                TokenKind::LowerIdent,
                TokenKind::Semicolon,
                TokenKind::LowerIdent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn every_token_has_a_nonnegative_length_span() {
        for tok in tokenize("let x = 1 in x + 2") {
            assert!(tok.span.start <= tok.span.end);
        }
    }
}
