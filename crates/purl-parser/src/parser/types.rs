//! Type-annotation parser for purl.
//!
//! Parses the surface syntax of `forall a b. (C, …) => T`, row/record/
//! variant types, and the function-arrow grammar. Unlike the expression
//! parser this has no operator precedence to speak of beyond the arrow
//! being right-associative and application binding tighter than `->`.

use crate::syntax_kind::SyntaxKind;

use super::{MarkClosed, Parser};

/// Entry point: `[forall a b. (constraints) =>] T`.
pub(crate) fn type_expr(p: &mut Parser) {
    if p.at(SyntaxKind::FORALL_KW) {
        forall_type(p);
        return;
    }
    fun_type(p);
}

fn forall_type(p: &mut Parser) {
    let m = p.open();
    p.advance(); // forall

    let params = p.open();
    while p.at(SyntaxKind::LOWER_IDENT) {
        p.advance();
    }
    p.close(params, SyntaxKind::TYPE_PARAM_LIST);

    p.expect(SyntaxKind::DOT);

    if p.at(SyntaxKind::L_PAREN) {
        constraint_list(p);
        p.expect(SyntaxKind::FAT_ARROW);
    }

    fun_type(p);
    p.close(m, SyntaxKind::FORALL_TYPE);
}

/// `(C₁, C₂, …)` where each `Cᵢ` is a class constraint (`Eq a`, `Ord a`,
/// `Num a`) or a row constraint (`a \ ℓ`).
fn constraint_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (

    if !p.at(SyntaxKind::R_PAREN) {
        constraint(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_PAREN) {
                break;
            }
            constraint(p);
        }
    }

    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::CONSTRAINT_LIST);
}

fn constraint(p: &mut Parser) {
    match p.current() {
        SyntaxKind::EQ_KW | SyntaxKind::ORD_KW | SyntaxKind::NUM_KW => {
            let m = p.open();
            p.advance(); // Eq | Ord | Num
            p.expect(SyntaxKind::LOWER_IDENT);
            p.close(m, SyntaxKind::CLASS_CONSTRAINT);
        }
        SyntaxKind::LOWER_IDENT => {
            let m = p.open();
            p.advance(); // tyvar
            p.expect(SyntaxKind::BACKSLASH);
            p.expect(SyntaxKind::LOWER_IDENT);
            p.close(m, SyntaxKind::ROW_CONSTRAINT);
        }
        _ => p.error("expected a class or row constraint"),
    }
}

/// `A -> B -> C`, right-associative. Only wraps a `FUN_TYPE` node when an
/// arrow is actually present, so a plain application/atom type doesn't
/// grow a spurious parent.
fn fun_type(p: &mut Parser) {
    let lhs = app_type(p);

    if p.eat(SyntaxKind::ARROW) {
        let m = p.open_before(lhs);
        fun_type(p);
        p.close(m, SyntaxKind::FUN_TYPE);
    }
}

/// Type application: `Pair a b`, left-associative, tighter than `->`. Only
/// wraps an `APP_TYPE` node when there is more than one atom, so a lone
/// type atom keeps its own node kind instead of an artificial parent.
fn app_type(p: &mut Parser) -> MarkClosed {
    let mut lhs = atom_type(p);

    while is_type_atom_start(p.current()) {
        let m = p.open_before(lhs);
        atom_type(p);
        lhs = p.close(m, SyntaxKind::APP_TYPE);
    }

    lhs
}

fn is_type_atom_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LOWER_IDENT
            | SyntaxKind::UPPER_IDENT
            | SyntaxKind::WILDCARD
            | SyntaxKind::L_PAREN
            | SyntaxKind::L_BRACKET
            | SyntaxKind::L_BRACE
            | SyntaxKind::LT
    )
}

fn atom_type(p: &mut Parser) -> MarkClosed {
    match p.current() {
        SyntaxKind::LOWER_IDENT => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::VAR_TYPE)
        }
        SyntaxKind::WILDCARD => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::WILDCARD_TYPE)
        }
        SyntaxKind::UPPER_IDENT => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::CON_TYPE)
        }
        SyntaxKind::L_BRACKET => {
            let m = p.open();
            p.advance(); // [
            fun_type(p);
            p.expect(SyntaxKind::R_BRACKET);
            p.close(m, SyntaxKind::LIST_TYPE)
        }
        SyntaxKind::L_BRACE => {
            let m = p.open();
            p.advance(); // {
            row_body(p);
            p.expect(SyntaxKind::R_BRACE);
            p.close(m, SyntaxKind::RECORD_TYPE)
        }
        SyntaxKind::LT => {
            let m = p.open();
            p.advance(); // <
            row_body(p);
            p.expect(SyntaxKind::GT);
            p.close(m, SyntaxKind::VARIANT_TYPE)
        }
        SyntaxKind::L_PAREN => {
            let m = p.open();
            p.advance(); // (
            fun_type(p);
            p.expect(SyntaxKind::R_PAREN);
            p.close(m, SyntaxKind::PAREN_TYPE)
        }
        _ => {
            let m = p.open();
            p.error("expected a type");
            p.close(m, SyntaxKind::ERROR_NODE)
        }
    }
}

/// `ℓ₁:T₁, …, ℓₙ:Tₙ | r` or just `r` or nothing (empty row).
fn row_body(p: &mut Parser) {
    if p.at(SyntaxKind::LOWER_IDENT) && p.nth(1) == SyntaxKind::COLON {
        row_field(p);
        while p.eat(SyntaxKind::COMMA) {
            row_field(p);
        }
        if p.eat(SyntaxKind::PIPE) {
            row_tail(p);
        }
    } else if p.at(SyntaxKind::LOWER_IDENT) {
        row_tail(p);
    }
    // else: empty row, nothing to parse before the closing delimiter.
}

fn row_field(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::LOWER_IDENT);
    p.expect(SyntaxKind::COLON);
    fun_type(p);
    p.close(m, SyntaxKind::ROW_FIELD);
}

fn row_tail(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::LOWER_IDENT);
    p.close(m, SyntaxKind::ROW_TAIL_VAR);
}
