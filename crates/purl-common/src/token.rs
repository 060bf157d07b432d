use serde::Serialize;

use crate::span::Span;

/// Every lexeme the lexer can produce.
///
/// Reserved words and reserved operators are closed sets per the lexer spec;
/// there is no user-definable fixity or operator declaration in this
/// language, so every operator lexeme the grammar cares about gets its own
/// variant rather than a generic "Op(String)" bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Reserved words ──────────────────────────────────────────────
    Let,
    In,
    If,
    Then,
    Else,
    Case,
    Of,
    True,
    False,
    Forall,
    Eq,
    Ord,
    Num,
    Type,
    Import,
    Override,

    // ── Reserved operators ──────────────────────────────────────────
    /// `->`
    Arrow,
    /// `=`
    Equals,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `+`
    Plus,
    /// `++`
    PlusPlus,
    /// `::`
    ColonColon,
    /// `|`
    Pipe,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `\`
    Backslash,
    /// `{|`
    LBracePipe,
    /// `|}`
    RBracePipe,
    /// `:=`
    ColonEquals,
    /// `{..}`
    RecordWildcardTok,
    /// `==`
    EqEq,
    /// `/=`
    SlashEquals,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `:`
    Colon,
    /// `=>`
    FatArrow,
    /// `>>` (forward composition)
    GtGt,
    /// `<<` (backward composition)
    LtLt,
    /// `<|` (variant embed open)
    LtPipe,
    /// `|>` (variant embed close)
    PipeGt,
    /// `<>` (text append)
    Diamond,

    // ── Delimiters ───────────────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // ── Literals ─────────────────────────────────────────────────────
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,

    // ── Identifiers ──────────────────────────────────────────────────
    /// Lower-start identifier: term variable, record label, row tyvar.
    LowerIdent,
    /// Upper-start identifier: variant label, synonym name, class name.
    UpperIdent,
    /// `_`
    Wildcard,

    // ── Trivia ───────────────────────────────────────────────────────
    LineComment,
    BlockComment,
    Whitespace,

    // ── Special ──────────────────────────────────────────────────────
    Eof,
    /// Lexer could not classify the input at this position.
    Error,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::Whitespace
        )
    }

    /// Map a lower-start identifier's text to a reserved word, if any.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        Some(match s {
            "let" => TokenKind::Let,
            "in" => TokenKind::In,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "case" => TokenKind::Case,
            "of" => TokenKind::Of,
            "forall" => TokenKind::Forall,
            "type" => TokenKind::Type,
            "import" => TokenKind::Import,
            "override" => TokenKind::Override,
            _ => return None,
        })
    }

    /// Map an upper-start identifier's text to a reserved word, if any.
    /// `True`/`False`/`Eq`/`Ord`/`Num` are reserved even though they look
    /// like ordinary constructor/class names.
    pub fn upper_keyword_from_str(s: &str) -> Option<TokenKind> {
        Some(match s {
            "True" => TokenKind::True,
            "False" => TokenKind::False,
            "Eq" => TokenKind::Eq,
            "Ord" => TokenKind::Ord,
            "Num" => TokenKind::Num,
            _ => return None,
        })
    }
}

/// A single lexeme: its kind and the byte-offset span it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
