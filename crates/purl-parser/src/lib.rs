//! purl parser: CST construction, AST lowering, and import resolution.
//!
//! This crate turns the token stream from `purl-lexer` into a lossless
//! `rowan` concrete syntax tree, then lowers that tree into the primitive
//! AST (`Expr`/`Bind`/`Prim`/`TypeExpr`/`Synonym`) that `purl-typeck`
//! performs inference over. All surface sugar is compiled away during
//! lowering; the typechecker never sees a record literal or a `case`.

pub mod ast;
pub mod cst;
pub mod error;
pub mod lower;
mod parser;
pub mod resolve;
pub mod syntax_kind;

pub use cst::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use lower::{Bind, Expr, Prim, Synonym, TypeExpr};
pub use syntax_kind::SyntaxKind;

use parser::Parser;

/// Result of parsing a single source file into a CST, before lowering.
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a single source file's text into a lossless CST.
///
/// This only builds the syntax tree; it neither lowers sugar nor resolves
/// imports. Use [`lower::lower_source_file`] on the result to get the
/// primitive AST, and [`resolve::resolve_imports`] to splice in imports
/// before inference.
pub fn parse(source: &str) -> Parse {
    let tokens = purl_lexer::tokenize(source);
    let mut p = Parser::new(tokens, source);
    parser::source_file(&mut p);
    let (green, errors) = p.build_tree();
    Parse { green, errors }
}
