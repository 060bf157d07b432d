//! Rowan-based concrete syntax tree types for purl.

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PurlLanguage {}

impl rowan::Language for PurlLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        // Safety: SyntaxKind is #[repr(u16)] and rowan only ever hands back
        // kinds we previously gave it via kind_to_raw.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<PurlLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<PurlLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<PurlLanguage>;
