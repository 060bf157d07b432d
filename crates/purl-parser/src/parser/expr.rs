//! Pratt expression parser for purl.
//!
//! Implements operator-precedence parsing over the binding-power tables
//! below. The CST this produces still contains every surface sugar form
//! (records, variants, sections, case/override, sugared lambdas); lowering
//! into the primitive `Var/Prim/App/Lam/Let/Ann*` AST happens afterwards in
//! `crate::lower`, not here.

use crate::syntax_kind::SyntaxKind;

use super::types::type_expr;
use super::{MarkClosed, Parser};

// ── Binding Power Tables ────────────────────────────────────────────────
//
// The surface grammar's own section 4.2 table, read literally, lists
// prefix `-` as the loosest operator and `||` as the tightest. That is
// backwards from every operator-precedence convention this language
// otherwise follows, so the table below deliberately inverts it: boolean
// connectives bind loosest, comparisons and the append/cons operators
// next, arithmetic tighter still, and the `>>`/`<<` composition operators
// tightest of the infix tier, with prefix `-` tighter than any infix
// operator. See "binding power table inversion" in DESIGN.md.
//
// Precedence as implemented, lowest to highest: right `||`; right `&&`;
// left `==`, `/=`, `>`, `>=`, `<`, `<=`; left `++`, right `::`, left `<>`;
// left `+`, `-`; left `*`, `/`; right `>>`, `<<`. Application is
// left-associative and tighter than any operator; field projection `.` is
// tighter than application; record restriction `\` binds to the whole
// atom suffix built so far.

fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8)> {
    match op {
        SyntaxKind::PIPE_PIPE => Some((3, 2)), // || : right-assoc, highest of the binary tiers
        SyntaxKind::AMP_AMP => Some((5, 4)),   // && : right-assoc

        SyntaxKind::EQ_EQ
        | SyntaxKind::SLASH_EQUALS
        | SyntaxKind::GT
        | SyntaxKind::GT_EQ
        | SyntaxKind::LT
        | SyntaxKind::LT_EQ => Some((6, 7)), // comparisons : left-assoc

        SyntaxKind::PLUS_PLUS | SyntaxKind::DIAMOND => Some((8, 9)), // ++ <> : left-assoc
        SyntaxKind::COLON_COLON => Some((9, 8)), // :: : right-assoc

        SyntaxKind::PLUS | SyntaxKind::MINUS => Some((10, 11)), // + - : left-assoc
        SyntaxKind::STAR | SyntaxKind::SLASH => Some((12, 13)), // * / : left-assoc

        SyntaxKind::GT_GT | SyntaxKind::LT_LT => Some((15, 14)), // >> << : right-assoc, lowest binary tier

        _ => None,
    }
}

fn prefix_binding_power(op: SyntaxKind) -> Option<((), u8)> {
    match op {
        SyntaxKind::MINUS => Some(((), 17)),
        _ => None,
    }
}

/// Juxtaposed function application: `f x`. Left-associative, tighter than
/// every infix operator.
const APPLICATION_BP: (u8, u8) = (19, 20);
/// Record restriction `e \ ℓ`. Shares the application tier: it applies
/// after an atom's own application/projection chain has been built.
const RESTRICTION_BP: u8 = 19;
/// Field projection `r.ℓ`, tighter than application.
const PROJECTION_BP: u8 = 21;

fn is_atom_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LOWER_IDENT
            | SyntaxKind::UPPER_IDENT
            | SyntaxKind::INT_LITERAL
            | SyntaxKind::FLOAT_LITERAL
            | SyntaxKind::CHAR_LITERAL
            | SyntaxKind::STRING_LITERAL
            | SyntaxKind::TRUE_KW
            | SyntaxKind::FALSE_KW
            | SyntaxKind::L_PAREN
            | SyntaxKind::L_BRACE
            | SyntaxKind::L_BRACE_PIPE
            | SyntaxKind::LT_PIPE
            | SyntaxKind::L_BRACKET
            | SyntaxKind::IF_KW
            | SyntaxKind::LET_KW
            | SyntaxKind::CASE_KW
            | SyntaxKind::IMPORT_KW
    )
}

fn is_binder_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LOWER_IDENT
            | SyntaxKind::L_BRACE
            | SyntaxKind::RECORD_WILDCARD_TOK
            | SyntaxKind::L_PAREN
    )
}

// ── Expression Entry Point ──────────────────────────────────────────────

/// Parse a top-level expression, including a trailing `: T` annotation.
/// Annotation binds looser than every operator in the precedence table, so
/// it is applied outside the Pratt loop entirely.
pub(crate) fn expr(p: &mut Parser) {
    let Some(parsed) = expr_bp(p, 0) else {
        return;
    };
    if p.at(SyntaxKind::COLON) {
        let m = p.open_before(parsed);
        p.advance(); // :
        type_expr(p);
        p.close(m, SyntaxKind::ANN_EXPR);
    }
}

fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = atom(p)?;

    loop {
        if p.has_error() {
            break;
        }

        let current = p.current();

        if current == SyntaxKind::DOT && PROJECTION_BP >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // .
            p.expect(SyntaxKind::LOWER_IDENT);
            lhs = p.close(m, SyntaxKind::FIELD_ACCESS_EXPR);
            continue;
        }

        if current == SyntaxKind::BACKSLASH {
            let next = p.nth(1);
            // Restriction is exactly `\` followed by one bare label; a
            // lambda's first binder is always followed by another binder
            // or `->`. Anything shaped like a binder that isn't a
            // restriction is therefore a lambda being used as an argument.
            let restriction_shaped = next == SyntaxKind::LOWER_IDENT
                && p.nth(2) != SyntaxKind::ARROW
                && !is_binder_start(p.nth(2));
            let looks_like_lambda = is_binder_start(next) && !restriction_shaped;

            if restriction_shaped && RESTRICTION_BP >= min_bp {
                let m = p.open_before(lhs);
                p.advance(); // \
                p.expect(SyntaxKind::LOWER_IDENT);
                lhs = p.close(m, SyntaxKind::RECORD_RESTRICT_EXPR);
                continue;
            }
            if looks_like_lambda && APPLICATION_BP.0 >= min_bp {
                let m = p.open_before(lhs);
                lambda_expr(p);
                lhs = p.close(m, SyntaxKind::APP_EXPR);
                continue;
            }
            break;
        }

        if is_atom_start(current) && APPLICATION_BP.0 >= min_bp {
            let m = p.open_before(lhs);
            expr_bp(p, APPLICATION_BP.1);
            lhs = p.close(m, SyntaxKind::APP_EXPR);
            continue;
        }

        if let Some((l_bp, r_bp)) = infix_binding_power(current) {
            if l_bp < min_bp {
                break;
            }
            let m = p.open_before(lhs);
            p.advance(); // operator
            expr_bp(p, r_bp);
            lhs = p.close(m, SyntaxKind::BINARY_EXPR);
            continue;
        }

        break;
    }

    Some(lhs)
}

// ── Atoms ────────────────────────────────────────────────────────────────

fn atom(p: &mut Parser) -> Option<MarkClosed> {
    let current = p.current();

    if let Some(((), r_bp)) = prefix_binding_power(current) {
        let m = p.open();
        p.advance(); // -
        expr_bp(p, r_bp);
        return Some(p.close(m, SyntaxKind::UNARY_EXPR));
    }

    match current {
        SyntaxKind::INT_LITERAL
        | SyntaxKind::FLOAT_LITERAL
        | SyntaxKind::CHAR_LITERAL
        | SyntaxKind::STRING_LITERAL
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL_EXPR))
        }

        SyntaxKind::LOWER_IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::NAME_REF_EXPR))
        }

        SyntaxKind::UPPER_IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::VARIANT_CTOR_EXPR))
        }

        SyntaxKind::IF_KW => Some(if_expr(p)),
        SyntaxKind::LET_KW => Some(let_expr(p)),
        SyntaxKind::CASE_KW => Some(case_expr(p)),
        SyntaxKind::BACKSLASH => Some(lambda_expr(p)),
        SyntaxKind::IMPORT_KW => Some(import_expr(p)),
        SyntaxKind::L_BRACE => Some(record_literal(p)),
        SyntaxKind::L_BRACE_PIPE => Some(difference_record(p)),
        SyntaxKind::LT_PIPE => Some(variant_embed(p)),
        SyntaxKind::L_BRACKET => Some(list_literal(p)),
        SyntaxKind::L_PAREN => Some(paren_or_section(p)),

        _ => {
            p.error("expected expression");
            None
        }
    }
}

fn if_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // if
    expr(p);
    p.expect(SyntaxKind::THEN_KW);
    expr(p);
    p.expect(SyntaxKind::ELSE_KW);
    expr(p);
    p.close(m, SyntaxKind::IF_EXPR)
}

/// `let x₁=e₁; x₂=e₂; … in b`. Bindings are collected flat as siblings;
/// lowering right-folds them into nested `Let`s, so a later binding may
/// not see an earlier one except through that nesting.
fn let_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // let

    let_binding(p);
    while p.eat(SyntaxKind::SEMICOLON) {
        if p.at(SyntaxKind::IN_KW) {
            break; // trailing `;`
        }
        let_binding(p);
    }

    p.expect(SyntaxKind::IN_KW);
    expr(p);
    p.close(m, SyntaxKind::LET_EXPR)
}

fn let_binding(p: &mut Parser) {
    let binding = p.open();
    binder(p);
    if p.eat(SyntaxKind::COLON) {
        type_expr(p);
    }
    p.expect(SyntaxKind::EQUALS);
    expr(p);
    p.close(binding, SyntaxKind::LET_BINDING);
}

fn case_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // case
    expr(p);
    p.expect(SyntaxKind::OF_KW);
    p.expect(SyntaxKind::L_BRACE);

    if !p.at(SyntaxKind::R_BRACE) {
        case_arm(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_BRACE) {
                break;
            }
            case_arm(p);
        }
    }

    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::CASE_EXPR)
}

fn case_arm(p: &mut Parser) {
    if p.at(SyntaxKind::OVERRIDE_KW) {
        let m = p.open();
        p.advance(); // override
        p.expect(SyntaxKind::UPPER_IDENT);
        p.expect(SyntaxKind::ARROW);
        expr(p);
        p.close(m, SyntaxKind::OVERRIDE_ARM);
    } else {
        let m = p.open();
        p.expect(SyntaxKind::UPPER_IDENT);
        p.expect(SyntaxKind::ARROW);
        expr(p);
        p.close(m, SyntaxKind::CASE_ARM);
    }
}

fn lambda_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // backslash

    binder(p);
    while is_binder_start(p.current()) {
        binder(p);
    }

    p.expect(SyntaxKind::ARROW);
    expr(p);
    p.close(m, SyntaxKind::LAMBDA_EXPR)
}

/// A single lambda/let binder: a bare name, a record pattern, a record
/// wildcard, or a parenthesised annotated form of any of those.
fn binder(p: &mut Parser) {
    let m = p.open();

    if p.eat(SyntaxKind::L_PAREN) {
        binder_inner(p);
        if p.eat(SyntaxKind::COLON) {
            let ann = p.open();
            type_expr(p);
            p.close(ann, SyntaxKind::TYPE_ANN);
        }
        p.expect(SyntaxKind::R_PAREN);
    } else {
        binder_inner(p);
    }

    p.close(m, SyntaxKind::LAMBDA_BINDER);
}

fn binder_inner(p: &mut Parser) {
    match p.current() {
        SyntaxKind::LOWER_IDENT => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::ARG_BINDER);
        }
        SyntaxKind::RECORD_WILDCARD_TOK => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::REC_WILDCARD_BINDER);
        }
        SyntaxKind::L_BRACE => {
            let m = p.open();
            p.advance(); // {
            if !p.at(SyntaxKind::R_BRACE) {
                rec_arg_field(p);
                while p.eat(SyntaxKind::COMMA) {
                    if p.at(SyntaxKind::R_BRACE) {
                        break;
                    }
                    rec_arg_field(p);
                }
            }
            p.expect(SyntaxKind::R_BRACE);
            p.close(m, SyntaxKind::REC_ARG_BINDER);
        }
        _ => {
            p.error("expected a binder");
        }
    }
}

/// `ℓ` (bind to local name `ℓ`) or `ℓ = name` (bind to a renamed local).
fn rec_arg_field(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::LOWER_IDENT);
    if p.eat(SyntaxKind::EQUALS) {
        p.expect(SyntaxKind::LOWER_IDENT);
    }
    p.close(m, SyntaxKind::REC_ARG_FIELD);
}

fn import_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // import
    p.expect(SyntaxKind::STRING_LITERAL);
    p.close(m, SyntaxKind::IMPORT_EXPR)
}

/// `{ℓ₁=e₁, ℓ₂, ℓ₃:=e₃, … | r}` -- field list with an optional tail.
fn record_literal(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // {

    if !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::PIPE) {
        record_field(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_BRACE) || p.at(SyntaxKind::PIPE) {
                break;
            }
            record_field(p);
        }
    }

    if p.eat(SyntaxKind::PIPE) {
        expr(p);
    }

    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::RECORD_LITERAL)
}

fn record_field(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::LOWER_IDENT);
    if p.eat(SyntaxKind::EQUALS) {
        expr(p);
        p.close(m, SyntaxKind::RECORD_FIELD);
    } else if p.eat(SyntaxKind::COLON_EQUALS) {
        expr(p);
        p.close(m, SyntaxKind::RECORD_UPDATE_FIELD);
    } else {
        p.close(m, SyntaxKind::RECORD_FIELD_PUN);
    }
}

/// `{| ℓ₁=e₁, ℓ₂, … |}` -- desugars to `λ #r → {…| #r}` during lowering.
fn difference_record(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // {|

    if !p.at(SyntaxKind::R_BRACE_PIPE) {
        record_field(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_BRACE_PIPE) {
                break;
            }
            record_field(p);
        }
    }

    p.expect(SyntaxKind::R_BRACE_PIPE);
    p.close(m, SyntaxKind::DIFFERENCE_RECORD_EXPR)
}

/// `<| C₁, C₂ |>` -- desugars to `λ #r → VariantEmbed C₁ (VariantEmbed C₂ #r)`.
fn variant_embed(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // <|

    if !p.at(SyntaxKind::PIPE_GT) {
        p.expect(SyntaxKind::UPPER_IDENT);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::PIPE_GT) {
                break;
            }
            p.expect(SyntaxKind::UPPER_IDENT);
        }
    }

    p.expect(SyntaxKind::PIPE_GT);
    p.close(m, SyntaxKind::VARIANT_EMBED_EXPR)
}

fn list_literal(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // [

    if !p.at(SyntaxKind::R_BRACKET) {
        expr(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_BRACKET) {
                break;
            }
            expr(p);
        }
    }

    p.expect(SyntaxKind::R_BRACKET);
    p.close(m, SyntaxKind::LIST_LITERAL)
}

/// `(e)` grouping, or the signature section `(: T)`.
fn paren_or_section(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // (

    if p.eat(SyntaxKind::COLON) {
        type_expr(p);
        p.expect(SyntaxKind::R_PAREN);
        return p.close(m, SyntaxKind::SIGNATURE_SECTION_EXPR);
    }

    expr(p);
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::PAREN_EXPR)
}
