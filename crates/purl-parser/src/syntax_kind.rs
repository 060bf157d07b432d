//! SyntaxKind enum for the purl CST.
//!
//! A superset of `TokenKind` (mapped to SCREAMING_SNAKE_CASE) plus composite
//! node kinds produced by the parser.

use purl_common::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    TOMBSTONE = 0,
    ERROR_NODE = 1,

    // ── Keywords ───────────────────────────────────────────────────────
    LET_KW,
    IN_KW,
    IF_KW,
    THEN_KW,
    ELSE_KW,
    CASE_KW,
    OF_KW,
    TRUE_KW,
    FALSE_KW,
    FORALL_KW,
    EQ_KW,
    ORD_KW,
    NUM_KW,
    TYPE_KW,
    IMPORT_KW,
    OVERRIDE_KW,

    // ── Operators ────────────────────────────────────────────────────
    ARROW,
    EQUALS,
    MINUS,
    STAR,
    SLASH,
    PLUS,
    PLUS_PLUS,
    COLON_COLON,
    PIPE,
    COMMA,
    SEMICOLON,
    DOT,
    BACKSLASH,
    L_BRACE_PIPE,
    R_BRACE_PIPE,
    COLON_EQUALS,
    RECORD_WILDCARD_TOK,
    EQ_EQ,
    SLASH_EQUALS,
    GT,
    GT_EQ,
    LT,
    LT_EQ,
    AMP_AMP,
    PIPE_PIPE,
    COLON,
    FAT_ARROW,
    GT_GT,
    LT_LT,
    LT_PIPE,
    PIPE_GT,
    DIAMOND,

    // ── Delimiters ───────────────────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,

    // ── Literals ───────────────────────────────────────────────────────
    INT_LITERAL,
    FLOAT_LITERAL,
    CHAR_LITERAL,
    STRING_LITERAL,

    // ── Identifiers ──────────────────────────────────────────────────
    LOWER_IDENT,
    UPPER_IDENT,
    WILDCARD,

    // ── Trivia ───────────────────────────────────────────────────────
    LINE_COMMENT,
    BLOCK_COMMENT,
    WHITESPACE,

    // ── Special ────────────────────────────────────────────────────────
    EOF,
    ERROR,

    // ── Composite node kinds ───────────────────────────────────────────
    /// Root: zero or more synonym decls followed by one expression.
    SOURCE_FILE,
    SYNONYM_DECL,
    TYPE_PARAM_LIST,

    LAMBDA_EXPR,
    LAMBDA_BINDER,
    ARG_BINDER,
    REC_ARG_BINDER,
    REC_ARG_FIELD,
    REC_WILDCARD_BINDER,

    LET_EXPR,
    LET_BINDING,

    IF_EXPR,

    CASE_EXPR,
    CASE_ARM,
    OVERRIDE_ARM,

    APP_EXPR,
    BINARY_EXPR,
    UNARY_EXPR,
    PAREN_EXPR,

    FIELD_ACCESS_EXPR,
    RECORD_RESTRICT_EXPR,

    RECORD_LITERAL,
    RECORD_FIELD,
    RECORD_FIELD_PUN,
    RECORD_UPDATE_FIELD,
    DIFFERENCE_RECORD_EXPR,

    VARIANT_CTOR_EXPR,
    VARIANT_EMBED_EXPR,

    LIST_LITERAL,

    LITERAL_EXPR,
    NAME_REF_EXPR,
    IMPORT_EXPR,

    SIGNATURE_SECTION_EXPR,
    ANN_EXPR,

    // ── Type-expression node kinds ───────────────────────────────────
    TYPE_ANN,
    FORALL_TYPE,
    CONSTRAINT_LIST,
    CLASS_CONSTRAINT,
    ROW_CONSTRAINT,
    FUN_TYPE,
    APP_TYPE,
    LIST_TYPE,
    RECORD_TYPE,
    VARIANT_TYPE,
    ROW_FIELD,
    ROW_TAIL_VAR,
    VAR_TYPE,
    WILDCARD_TYPE,
    CON_TYPE,
    PAREN_TYPE,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE | SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::In => SyntaxKind::IN_KW,
            TokenKind::If => SyntaxKind::IF_KW,
            TokenKind::Then => SyntaxKind::THEN_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::Case => SyntaxKind::CASE_KW,
            TokenKind::Of => SyntaxKind::OF_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Forall => SyntaxKind::FORALL_KW,
            TokenKind::Eq => SyntaxKind::EQ_KW,
            TokenKind::Ord => SyntaxKind::ORD_KW,
            TokenKind::Num => SyntaxKind::NUM_KW,
            TokenKind::Type => SyntaxKind::TYPE_KW,
            TokenKind::Import => SyntaxKind::IMPORT_KW,
            TokenKind::Override => SyntaxKind::OVERRIDE_KW,

            TokenKind::Arrow => SyntaxKind::ARROW,
            TokenKind::Equals => SyntaxKind::EQUALS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::PlusPlus => SyntaxKind::PLUS_PLUS,
            TokenKind::ColonColon => SyntaxKind::COLON_COLON,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Backslash => SyntaxKind::BACKSLASH,
            TokenKind::LBracePipe => SyntaxKind::L_BRACE_PIPE,
            TokenKind::RBracePipe => SyntaxKind::R_BRACE_PIPE,
            TokenKind::ColonEquals => SyntaxKind::COLON_EQUALS,
            TokenKind::RecordWildcardTok => SyntaxKind::RECORD_WILDCARD_TOK,
            TokenKind::EqEq => SyntaxKind::EQ_EQ,
            TokenKind::SlashEquals => SyntaxKind::SLASH_EQUALS,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::AmpAmp => SyntaxKind::AMP_AMP,
            TokenKind::PipePipe => SyntaxKind::PIPE_PIPE,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::FatArrow => SyntaxKind::FAT_ARROW,
            TokenKind::GtGt => SyntaxKind::GT_GT,
            TokenKind::LtLt => SyntaxKind::LT_LT,
            TokenKind::LtPipe => SyntaxKind::LT_PIPE,
            TokenKind::PipeGt => SyntaxKind::PIPE_GT,
            TokenKind::Diamond => SyntaxKind::DIAMOND,

            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,

            TokenKind::IntLiteral => SyntaxKind::INT_LITERAL,
            TokenKind::FloatLiteral => SyntaxKind::FLOAT_LITERAL,
            TokenKind::CharLiteral => SyntaxKind::CHAR_LITERAL,
            TokenKind::StringLiteral => SyntaxKind::STRING_LITERAL,

            TokenKind::LowerIdent => SyntaxKind::LOWER_IDENT,
            TokenKind::UpperIdent => SyntaxKind::UPPER_IDENT,
            TokenKind::Wildcard => SyntaxKind::WILDCARD,

            TokenKind::LineComment => SyntaxKind::LINE_COMMENT,
            TokenKind::BlockComment => SyntaxKind::BLOCK_COMMENT,
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,

            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}
