//! Event-based parser for purl.
//!
//! The parser consumes a token stream and produces events (Open/Close/Advance)
//! that are later converted into a rowan green tree, decoupling parsing logic
//! from tree construction (matklad's approach, as in rust-analyzer).
//!
//! Whitespace and comments are trivia everywhere -- the lexer spec is
//! layout-free, so unlike whitespace-sensitive languages there is no
//! delimiter-depth bookkeeping here: `current()`/`nth()` simply skip trivia.

pub(crate) mod expr;
pub(crate) mod types;

use purl_common::token::{Token, TokenKind};

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug)]
enum Event {
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    Close,
    Advance,
    Error { message: String },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

pub(crate) struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    source: &'src str,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        let mut pos = self.pos;
        let mut remaining = n;
        while pos < self.tokens.len() {
            let kind = self.tokens[pos].kind;
            if kind.is_trivia() {
                pos += 1;
                continue;
            }
            if remaining == 0 {
                return SyntaxKind::from(kind);
            }
            remaining -= 1;
            pos += 1;
        }
        SyntaxKind::EOF
    }

    pub(crate) fn current_text(&self) -> &'src str {
        let pos = self.skip_to_significant(self.pos);
        if pos < self.tokens.len() {
            let span = self.tokens[pos].span;
            &self.source[span.start as usize..span.end as usize]
        } else {
            ""
        }
    }

    pub(crate) fn current_span(&self) -> purl_common::Span {
        let pos = self.skip_to_significant(self.pos);
        if pos < self.tokens.len() {
            self.tokens[pos].span
        } else {
            let end = self.source.len() as u32;
            purl_common::Span::new(end, end)
        }
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn skip_to_significant(&self, mut pos: usize) -> usize {
        while pos < self.tokens.len() && self.tokens[pos].kind.is_trivia() {
            pos += 1;
        }
        pos
    }

    // ── Node management ──────────────────────────────────────────────

    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open { kind: slot, .. } = &mut self.events[m.index] {
            *slot = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Token consumption ──────────────────────────────────────────────

    pub(crate) fn advance(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) {
        if self.eat(kind) {
            return;
        }
        self.error(&format!(
            "expected {:?}, found {:?} (`{}`)",
            kind,
            self.current(),
            self.current_text()
        ));
    }

    pub(crate) fn error(&mut self, message: &str) {
        self.errors.push(ParseError {
            message: message.to_string(),
            span: self.current_span(),
        });
        self.events.push(Event::Error {
            message: message.to_string(),
        });
        // Consume one token so error recovery always makes progress.
        if !self.at(SyntaxKind::EOF) {
            let m = self.open();
            self.advance();
            self.close(m, SyntaxKind::ERROR_NODE);
        }
    }

    pub(crate) fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    // ── Tree building ──────────────────────────────────────────────────

    pub(crate) fn build_tree(self) -> (rowan::GreenNode, Vec<ParseError>) {
        let source = self.source;
        let mut tokens = self.tokens.into_iter();
        let events = self.events;
        let mut builder = rowan::GreenNodeBuilder::new();

        // Events already consumed as part of a forward-parent chain must not
        // be processed again when the main loop reaches their own index.
        let mut consumed = vec![false; events.len()];

        for i in 0..events.len() {
            if consumed[i] {
                continue;
            }
            match &events[i] {
                Event::Open { kind, forward_parent } => {
                    if *kind == SyntaxKind::TOMBSTONE && forward_parent.is_none() {
                        continue;
                    }
                    // Walk the forward-parent chain, collecting kinds from
                    // innermost (this event) to outermost.
                    let mut chain = vec![i];
                    let mut next = *forward_parent;
                    while let Some(idx) = next {
                        chain.push(idx);
                        next = match &events[idx] {
                            Event::Open { forward_parent, .. } => *forward_parent,
                            _ => None,
                        };
                    }
                    // Emit outermost first so it becomes the parent node.
                    for &idx in chain.iter().rev() {
                        consumed[idx] = true;
                        if let Event::Open { kind, .. } = &events[idx] {
                            if *kind != SyntaxKind::TOMBSTONE {
                                builder.start_node(rowan::SyntaxKind(*kind as u16));
                            }
                        }
                    }
                }
                Event::Close => builder.finish_node(),
                Event::Advance => {
                    let token = tokens.next().expect("advance without matching token");
                    let kind = SyntaxKind::from(token.kind);
                    let text = &source[token.span.start as usize..token.span.end as usize];
                    builder.token(rowan::SyntaxKind(kind as u16), text);
                }
                Event::Error { .. } => {}
            }
        }

        (builder.finish(), self.errors)
    }
}

// ── Grammar entry point ─────────────────────────────────────────────────

/// `(type C a b … = T;)* expr` -- zero or more synonym declarations
/// followed by exactly one top-level expression.
pub(crate) fn source_file(p: &mut Parser) {
    let m = p.open();
    while p.at(SyntaxKind::TYPE_KW) {
        synonym_decl(p);
    }
    expr::expr(p);
    p.close(m, SyntaxKind::SOURCE_FILE);
}

fn synonym_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // type
    p.expect(SyntaxKind::UPPER_IDENT);

    let params = p.open();
    while p.at(SyntaxKind::LOWER_IDENT) {
        p.advance();
    }
    p.close(params, SyntaxKind::TYPE_PARAM_LIST);

    p.expect(SyntaxKind::EQUALS);
    types::type_expr(p);
    p.expect(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::SYNONYM_DECL);
}
