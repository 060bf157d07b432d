//! Desugaring pass: typed AST (with surface sugar) to primitive AST.
//!
//! Every node here mirrors a row of the desugaring table: record literals,
//! puns, updates, difference records, variant embeds, case arms, list
//! literals, and sections all compile down to `Var`/`Prim`/`App`/`Lam`/`Let`
//! before `purl-typeck` ever sees the tree. No new primitive is introduced
//! here that isn't already in [`Prim`]; extending the surface language means
//! extending that enum and this module together, never desugaring to an ad
//! hoc runtime call.

use std::sync::Arc;

use purl_common::{LineIndex, Pos, Span};

use crate::ast::{
    self, AnnExpr, AppExpr, AppType, BinaryExpr, CaseArm, CaseExpr, ClassConstraint, ConType,
    DifferenceRecordExpr, FieldAccessExpr, ForallType, FunType, IfExpr, ImportExpr,
    LambdaBinder, LambdaExpr, LetExpr, ListLiteral, ListType, LiteralExpr, NameRefExpr,
    OverrideArm, ParenExpr, RecArgField, RecordField, RecordFieldPun, RecordLiteral,
    RecordRestrictExpr, RecordUpdateField, RecordType, RowConstraint, RowField, RowTailVar,
    SignatureSectionExpr, SynonymDecl, UnaryExpr, VariantCtorExpr, VariantEmbedExpr, VariantType,
    AstNode, ExprNode, TypeNode,
};
use crate::syntax_kind::SyntaxKind;
use crate::SyntaxNode;

/// Hidden binder name used for the row argument of difference records,
/// variant embeds, and `case`'s implicit fallthrough continuation. `#` is
/// outside the lexer's identifier grammar, so no surface program can ever
/// write or shadow it.
const SENTINEL: &str = "#r";

/// Placeholder name substituted for a child a malformed tree is missing.
/// Also unwritable by surface syntax, so it can't be confused with a real
/// unbound-variable error once inference runs.
const MISSING: &str = "#error";

/// A locally introduced name pattern. See the data model's `Bind`.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Arg(String),
    RecArg(Vec<(String, String)>),
    RecWildcard,
}

/// The closed, finite primitive tag set (§4.7 of the data model).
#[derive(Debug, Clone, PartialEq)]
pub enum Prim {
    // literal injectors
    Int(i64),
    Dbl(f64),
    Char(char),
    Bool(bool),
    Text(String),
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Mod,
    Abs,
    Floor,
    Ceiling,
    Double,
    // relational
    Eq,
    NEq,
    RGT,
    RGTE,
    RLT,
    RLTE,
    // logical
    And,
    Or,
    Not,
    // conditional
    Cond,
    // list
    ListEmpty,
    ListCons,
    ListUncons,
    ListAppend,
    ListFoldr,
    ListNull,
    // text
    TextAppend,
    Pack,
    Unpack,
    Show,
    // record
    RecordEmpty,
    RecordSelect(String),
    RecordExtend(String),
    RecordRestrict(String),
    // variant
    VariantInject(String),
    VariantEmbed(String),
    VariantElim(String),
    Absurd,
    // composition
    FwdComp,
    BwdComp,
    // fixed point
    FixPrim,
    // diagnostic
    ErrorPrim,
    Trace,
}

/// A class constraint (`Eq`/`Ord`/`Num`) or a row `lacks` constraint
/// attached to a `forall`-bound type variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassName {
    Eq,
    Ord,
    Num,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Class(ClassName, String),
    Lacks(String, String),
}

/// A row's linearised fields plus an optional tail variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub fields: Vec<(String, TypeExpr)>,
    pub tail: Option<String>,
}

/// An elaborated type annotation. Distinct from `purl-typeck`'s internal
/// `Ty`: this is what the parser hands the inferencer before fresh
/// variables, kinds, and constraints get allocated for it.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Int(Pos),
    Dbl(Pos),
    Bool(Pos),
    Char(Pos),
    Text(Pos),
    List(Pos, Box<TypeExpr>),
    Fun(Pos, Box<TypeExpr>, Box<TypeExpr>),
    Record(Pos, Row),
    Variant(Pos, Row),
    /// A type-synonym reference, possibly applied to arguments. Since user
    /// data declarations other than synonyms are a non-goal, every
    /// upper-identifier type head that isn't a ground constructor is one
    /// of these.
    Synonym(Pos, String, Vec<TypeExpr>),
    Var(Pos, String),
    Wildcard(Pos),
    Forall(Pos, Vec<String>, Vec<Constraint>, Box<TypeExpr>),
}

impl TypeExpr {
    pub fn pos(&self) -> &Pos {
        match self {
            TypeExpr::Int(p)
            | TypeExpr::Dbl(p)
            | TypeExpr::Bool(p)
            | TypeExpr::Char(p)
            | TypeExpr::Text(p)
            | TypeExpr::List(p, _)
            | TypeExpr::Fun(p, _, _)
            | TypeExpr::Record(p, _)
            | TypeExpr::Variant(p, _)
            | TypeExpr::Synonym(p, _, _)
            | TypeExpr::Var(p, _)
            | TypeExpr::Wildcard(p)
            | TypeExpr::Forall(p, _, _, _) => p,
        }
    }
}

/// A top-level `type C a b … = T;` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Synonym {
    pub pos: Pos,
    pub name: String,
    pub params: Vec<String>,
    pub body: TypeExpr,
}

/// The elaborated, sugar-free AST that `purl-typeck` runs inference over.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Var(Pos, String),
    Prim(Pos, Prim),
    App(Pos, Box<Expr>, Box<Expr>),
    Lam(Pos, Bind, Box<Expr>),
    Let(Pos, Bind, Box<Expr>, Box<Expr>),
    AnnLam(Pos, Bind, TypeExpr, Box<Expr>),
    AnnLet(Pos, Bind, TypeExpr, Box<Expr>, Box<Expr>),
    Ann(Pos, Box<Expr>, TypeExpr),
    Import(Pos, String),
}

impl Expr {
    pub fn pos(&self) -> &Pos {
        match self {
            Expr::Var(p, _)
            | Expr::Prim(p, _)
            | Expr::App(p, _, _)
            | Expr::Lam(p, _, _)
            | Expr::Let(p, _, _, _)
            | Expr::AnnLam(p, _, _, _)
            | Expr::AnnLet(p, _, _, _, _)
            | Expr::Ann(p, _, _)
            | Expr::Import(p, _) => p,
        }
    }
}

/// Lowercase identifiers with no dedicated surface operator still name a
/// primitive (`mod`, `show`, `fix`, …). This table is the parser's only
/// source of truth for their spelling; `purl-typeck` never sees the name,
/// only the `Prim` it resolved to.
fn builtin_prim(name: &str) -> Option<Prim> {
    Some(match name {
        "mod" => Prim::Mod,
        "abs" => Prim::Abs,
        "floor" => Prim::Floor,
        "ceiling" => Prim::Ceiling,
        "double" => Prim::Double,
        "not" => Prim::Not,
        "pack" => Prim::Pack,
        "unpack" => Prim::Unpack,
        "show" => Prim::Show,
        "listUncons" => Prim::ListUncons,
        "listFoldr" => Prim::ListFoldr,
        "listNull" => Prim::ListNull,
        "fix" => Prim::FixPrim,
        "error" => Prim::ErrorPrim,
        "trace" => Prim::Trace,
        _ => return None,
    })
}

fn binary_prim(op: SyntaxKind) -> Option<Prim> {
    Some(match op {
        SyntaxKind::PLUS => Prim::Add,
        SyntaxKind::MINUS => Prim::Sub,
        SyntaxKind::STAR => Prim::Mul,
        SyntaxKind::SLASH => Prim::Div,
        SyntaxKind::EQ_EQ => Prim::Eq,
        SyntaxKind::SLASH_EQUALS => Prim::NEq,
        SyntaxKind::GT => Prim::RGT,
        SyntaxKind::GT_EQ => Prim::RGTE,
        SyntaxKind::LT => Prim::RLT,
        SyntaxKind::LT_EQ => Prim::RLTE,
        SyntaxKind::AMP_AMP => Prim::And,
        SyntaxKind::PIPE_PIPE => Prim::Or,
        SyntaxKind::GT_GT => Prim::FwdComp,
        SyntaxKind::LT_LT => Prim::BwdComp,
        SyntaxKind::PLUS_PLUS => Prim::ListAppend,
        SyntaxKind::COLON_COLON => Prim::ListCons,
        SyntaxKind::DIAMOND => Prim::TextAppend,
        _ => return None,
    })
}

fn unescape_body(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn unescape_char(text: &str) -> char {
    unescape_body(text.trim_matches('\'')).chars().next().unwrap_or('\0')
}

fn unescape_string(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text);
    unescape_body(inner)
}

/// One field of a record literal or difference record, after its surface
/// form (plain/pun/update) has been identified but before it's folded into
/// the `RecordExtend` chain.
enum FieldForm {
    Field(String, Expr),
    Pun(String, Expr),
    Update(String, Expr),
}

/// A case expression's arms in document order, whichever surface kind
/// (`Ctor -> e` or `override Ctor -> e`) each one is.
enum CaseBranch {
    Plain(CaseArm),
    Override(OverrideArm),
}

struct Lowerer {
    file: Arc<str>,
    index: LineIndex,
}

impl Lowerer {
    fn pos_of(&self, range: rowan::TextRange) -> Pos {
        let span = Span::new(range.start().into(), range.end().into());
        Pos::from_span(self.file.clone(), &self.index, span)
    }

    fn missing_expr(&self, pos: Pos) -> Expr {
        Expr::Var(pos, MISSING.to_string())
    }

    fn app2(&self, pos: Pos, f: Expr, a: Expr, b: Expr) -> Expr {
        Expr::App(
            pos.clone(),
            Box::new(Expr::App(pos.clone(), Box::new(f), Box::new(a))),
            Box::new(b),
        )
    }

    fn app3(&self, pos: Pos, f: Expr, a: Expr, b: Expr, c: Expr) -> Expr {
        Expr::App(pos.clone(), Box::new(self.app2(pos, f, a, b)), Box::new(c))
    }

    // ── Synonyms ─────────────────────────────────────────────────────

    fn lower_synonym(&self, decl: &SynonymDecl) -> Synonym {
        let pos = self.pos_of(decl.syntax().text_range());
        let name = decl.name().map(|t| t.text().to_string()).unwrap_or_default();
        let params = decl.params().iter().map(|t| t.text().to_string()).collect();
        let body = decl
            .body()
            .map(|t| self.lower_type(&t))
            .unwrap_or_else(|| TypeExpr::Wildcard(pos.clone()));
        Synonym { pos, name, params, body }
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn lower_expr(&self, expr: &ExprNode) -> Expr {
        match expr {
            ExprNode::Literal(e) => self.lower_literal(e),
            ExprNode::NameRef(e) => self.lower_name_ref(e),
            ExprNode::VariantCtor(e) => self.lower_variant_ctor(e),
            ExprNode::Unary(e) => self.lower_unary(e),
            ExprNode::Binary(e) => self.lower_binary(e),
            ExprNode::App(e) => self.lower_app(e),
            ExprNode::Paren(e) => self.lower_paren(e),
            ExprNode::FieldAccess(e) => self.lower_field_access(e),
            ExprNode::RecordRestrict(e) => self.lower_record_restrict(e),
            ExprNode::Lambda(e) => self.lower_lambda(e),
            ExprNode::Let(e) => self.lower_let(e),
            ExprNode::If(e) => self.lower_if(e),
            ExprNode::Case(e) => self.lower_case(e),
            ExprNode::RecordLiteral(e) => self.lower_record_literal(e),
            ExprNode::DifferenceRecord(e) => self.lower_difference_record(e),
            ExprNode::VariantEmbed(e) => self.lower_variant_embed(e),
            ExprNode::List(e) => self.lower_list(e),
            ExprNode::Import(e) => self.lower_import(e),
            ExprNode::SignatureSection(e) => self.lower_signature_section(e),
            ExprNode::Ann(e) => self.lower_ann(e),
            ExprNode::Error(e) => self.missing_expr(self.pos_of(e.syntax().text_range())),
        }
    }

    fn lower_literal(&self, lit: &LiteralExpr) -> Expr {
        let pos = self.pos_of(lit.syntax().text_range());
        let token = match lit.token() {
            Some(t) => t,
            None => return self.missing_expr(pos),
        };
        let text = token.text();
        match token.kind() {
            SyntaxKind::INT_LITERAL => Expr::Prim(pos, Prim::Int(text.parse().unwrap_or(0))),
            SyntaxKind::FLOAT_LITERAL => Expr::Prim(pos, Prim::Dbl(text.parse().unwrap_or(0.0))),
            SyntaxKind::CHAR_LITERAL => Expr::Prim(pos, Prim::Char(unescape_char(text))),
            SyntaxKind::STRING_LITERAL => Expr::Prim(pos, Prim::Text(unescape_string(text))),
            SyntaxKind::TRUE_KW => Expr::Prim(pos, Prim::Bool(true)),
            SyntaxKind::FALSE_KW => Expr::Prim(pos, Prim::Bool(false)),
            _ => self.missing_expr(pos),
        }
    }

    fn lower_name_ref(&self, nr: &NameRefExpr) -> Expr {
        let pos = self.pos_of(nr.syntax().text_range());
        let name = nr.name().map(|t| t.text().to_string()).unwrap_or_default();
        match builtin_prim(&name) {
            Some(p) => Expr::Prim(pos, p),
            None => Expr::Var(pos, name),
        }
    }

    fn lower_variant_ctor(&self, vc: &VariantCtorExpr) -> Expr {
        let pos = self.pos_of(vc.syntax().text_range());
        let name = vc.name().map(|t| t.text().to_string()).unwrap_or_default();
        Expr::Prim(pos, Prim::VariantInject(name))
    }

    fn lower_unary(&self, u: &UnaryExpr) -> Expr {
        let pos = self.pos_of(u.syntax().text_range());
        let operand = u
            .operand()
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        Expr::App(
            pos.clone(),
            Box::new(Expr::Prim(pos, Prim::Neg)),
            Box::new(operand),
        )
    }

    fn lower_binary(&self, b: &BinaryExpr) -> Expr {
        let pos = self.pos_of(b.syntax().text_range());
        let (lhs, rhs) = b.operands();
        let lhs = lhs
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let rhs = rhs
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let prim = b.operator().and_then(binary_prim).unwrap_or(Prim::Add);
        self.app2(pos.clone(), Expr::Prim(pos, prim), lhs, rhs)
    }

    fn lower_app(&self, a: &AppExpr) -> Expr {
        let pos = self.pos_of(a.syntax().text_range());
        let (f, x) = a.operands();
        let f = f
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let x = x
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        Expr::App(pos, Box::new(f), Box::new(x))
    }

    fn lower_paren(&self, p: &ParenExpr) -> Expr {
        match p.inner() {
            Some(inner) => self.lower_expr(&inner),
            None => self.missing_expr(self.pos_of(p.syntax().text_range())),
        }
    }

    fn lower_field_access(&self, fa: &FieldAccessExpr) -> Expr {
        let pos = self.pos_of(fa.syntax().text_range());
        let base = fa
            .base()
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let label = fa.label().map(|t| t.text().to_string()).unwrap_or_default();
        Expr::App(
            pos.clone(),
            Box::new(Expr::Prim(pos, Prim::RecordSelect(label))),
            Box::new(base),
        )
    }

    fn lower_record_restrict(&self, rr: &RecordRestrictExpr) -> Expr {
        let pos = self.pos_of(rr.syntax().text_range());
        let base = rr
            .base()
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let label = rr.label().map(|t| t.text().to_string()).unwrap_or_default();
        Expr::App(
            pos.clone(),
            Box::new(Expr::Prim(pos, Prim::RecordRestrict(label))),
            Box::new(base),
        )
    }

    fn lower_binder(&self, binder: &LambdaBinder) -> Bind {
        if let Some(arg) = binder.arg() {
            Bind::Arg(arg.name().map(|t| t.text().to_string()).unwrap_or_default())
        } else if let Some(rec) = binder.rec_arg() {
            let fields = rec
                .fields()
                .map(|f| self.lower_rec_arg_field(&f))
                .collect();
            Bind::RecArg(fields)
        } else {
            Bind::RecWildcard
        }
    }

    fn lower_rec_arg_field(&self, f: &RecArgField) -> (String, String) {
        let (label, local) = f.label_and_local();
        let label = label.map(|t| t.text().to_string()).unwrap_or_default();
        let local = local
            .map(|t| t.text().to_string())
            .unwrap_or_else(|| label.clone());
        (label, local)
    }

    fn lower_lambda(&self, lam: &LambdaExpr) -> Expr {
        let pos = self.pos_of(lam.syntax().text_range());
        let body = lam
            .body()
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let binders: Vec<_> = lam.binders().collect();
        binders.into_iter().rev().fold(body, |acc, binder| {
            let bpos = self.pos_of(binder.syntax().text_range());
            let bind = self.lower_binder(&binder);
            match binder.annotation() {
                Some(ann) => {
                    let ty = ann
                        .type_node()
                        .map(|t| self.lower_type(&t))
                        .unwrap_or_else(|| TypeExpr::Wildcard(bpos.clone()));
                    Expr::AnnLam(bpos, bind, ty, Box::new(acc))
                }
                None => Expr::Lam(bpos, bind, Box::new(acc)),
            }
        })
    }

    fn lower_let(&self, let_expr: &LetExpr) -> Expr {
        let pos = self.pos_of(let_expr.syntax().text_range());
        let body = let_expr
            .body()
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let bindings: Vec<_> = let_expr.bindings().collect();
        bindings.into_iter().rev().fold(body, |acc, binding| {
            let bpos = self.pos_of(binding.syntax().text_range());
            let bind = binding
                .binder()
                .map(|b| self.lower_binder(&b))
                .unwrap_or(Bind::RecWildcard);
            let value = binding
                .value()
                .map(|e| self.lower_expr(&e))
                .unwrap_or_else(|| self.missing_expr(bpos.clone()));
            match binding.annotation() {
                Some(ann) => {
                    let ty = ann
                        .type_node()
                        .map(|t| self.lower_type(&t))
                        .unwrap_or_else(|| TypeExpr::Wildcard(bpos.clone()));
                    Expr::AnnLet(bpos, bind, ty, Box::new(value), Box::new(acc))
                }
                None => Expr::Let(bpos, bind, Box::new(value), Box::new(acc)),
            }
        })
    }

    fn lower_if(&self, if_: &IfExpr) -> Expr {
        let pos = self.pos_of(if_.syntax().text_range());
        let (c, t, e) = if_.branches();
        let c = c
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let t = t
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let e = e
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        self.app3(pos.clone(), Expr::Prim(pos, Prim::Cond), c, t, e)
    }

    fn lower_case(&self, case: &CaseExpr) -> Expr {
        let pos = self.pos_of(case.syntax().text_range());
        let scrutinee = case
            .scrutinee()
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));

        let branches: Vec<CaseBranch> = case
            .syntax()
            .children()
            .filter_map(|n| match n.kind() {
                SyntaxKind::CASE_ARM => CaseArm::cast(n).map(CaseBranch::Plain),
                SyntaxKind::OVERRIDE_ARM => OverrideArm::cast(n).map(CaseBranch::Override),
                _ => None,
            })
            .collect();

        let mut acc = Expr::Prim(pos.clone(), Prim::Absurd);
        for branch in branches.into_iter().rev() {
            acc = match branch {
                CaseBranch::Plain(arm) => {
                    let apos = self.pos_of(arm.syntax().text_range());
                    let ctor = arm.ctor().map(|t| t.text().to_string()).unwrap_or_default();
                    let f = arm
                        .body()
                        .map(|e| self.lower_expr(&e))
                        .unwrap_or_else(|| self.missing_expr(apos.clone()));
                    self.app2(apos.clone(), Expr::Prim(apos, Prim::VariantElim(ctor)), f, acc)
                }
                CaseBranch::Override(arm) => {
                    let apos = self.pos_of(arm.syntax().text_range());
                    let ctor = arm.ctor().map(|t| t.text().to_string()).unwrap_or_default();
                    let f = arm
                        .body()
                        .map(|e| self.lower_expr(&e))
                        .unwrap_or_else(|| self.missing_expr(apos.clone()));
                    let embedded = Expr::App(
                        apos.clone(),
                        Box::new(Expr::Prim(apos.clone(), Prim::VariantEmbed(ctor.clone()))),
                        Box::new(Expr::Var(apos.clone(), SENTINEL.to_string())),
                    );
                    let continuation = Expr::App(apos.clone(), Box::new(acc), Box::new(embedded));
                    let handler = Expr::Lam(
                        apos.clone(),
                        Bind::Arg(SENTINEL.to_string()),
                        Box::new(continuation),
                    );
                    self.app2(apos.clone(), Expr::Prim(apos, Prim::VariantElim(ctor)), f, handler)
                }
            };
        }
        Expr::App(pos, Box::new(acc), Box::new(scrutinee))
    }

    fn collect_fields(
        &self,
        nodes: impl Iterator<Item = SyntaxNode>,
        pos: &Pos,
    ) -> Vec<FieldForm> {
        nodes
            .filter_map(|n| match n.kind() {
                SyntaxKind::RECORD_FIELD => RecordField::cast(n).map(|f| {
                    let label = f.label().map(|t| t.text().to_string()).unwrap_or_default();
                    let value = f
                        .value()
                        .map(|e| self.lower_expr(&e))
                        .unwrap_or_else(|| self.missing_expr(pos.clone()));
                    FieldForm::Field(label, value)
                }),
                SyntaxKind::RECORD_FIELD_PUN => RecordFieldPun::cast(n).map(|f| {
                    let label = f.label().map(|t| t.text().to_string()).unwrap_or_default();
                    let value = Expr::Var(pos.clone(), label.clone());
                    FieldForm::Pun(label, value)
                }),
                SyntaxKind::RECORD_UPDATE_FIELD => RecordUpdateField::cast(n).map(|f| {
                    let label = f.label().map(|t| t.text().to_string()).unwrap_or_default();
                    let value = f
                        .value()
                        .map(|e| self.lower_expr(&e))
                        .unwrap_or_else(|| self.missing_expr(pos.clone()));
                    FieldForm::Update(label, value)
                }),
                _ => None,
            })
            .collect()
    }

    /// Right-fold `RecordExtend`/`RecordRestrict` over `tail`, per the
    /// record-literal and difference-record desugarings.
    fn build_record(&self, pos: Pos, fields: Vec<FieldForm>, tail: Expr) -> Expr {
        fields.into_iter().rev().fold(tail, |acc, field| match field {
            FieldForm::Field(label, value) | FieldForm::Pun(label, value) => self.app2(
                pos.clone(),
                Expr::Prim(pos.clone(), Prim::RecordExtend(label)),
                value,
                acc,
            ),
            FieldForm::Update(label, value) => {
                let restricted = Expr::App(
                    pos.clone(),
                    Box::new(Expr::Prim(pos.clone(), Prim::RecordRestrict(label.clone()))),
                    Box::new(acc),
                );
                self.app2(
                    pos.clone(),
                    Expr::Prim(pos.clone(), Prim::RecordExtend(label)),
                    value,
                    restricted,
                )
            }
        })
    }

    fn lower_record_literal(&self, rl: &RecordLiteral) -> Expr {
        let pos = self.pos_of(rl.syntax().text_range());
        let fields = self.collect_fields(rl.fields(), &pos);
        let tail = rl
            .tail()
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| Expr::Prim(pos.clone(), Prim::RecordEmpty));
        self.build_record(pos, fields, tail)
    }

    fn lower_difference_record(&self, dr: &DifferenceRecordExpr) -> Expr {
        let pos = self.pos_of(dr.syntax().text_range());
        let fields = self.collect_fields(dr.fields(), &pos);
        let tail = Expr::Var(pos.clone(), SENTINEL.to_string());
        let body = self.build_record(pos.clone(), fields, tail);
        Expr::Lam(pos, Bind::Arg(SENTINEL.to_string()), Box::new(body))
    }

    fn lower_variant_embed(&self, ve: &VariantEmbedExpr) -> Expr {
        let pos = self.pos_of(ve.syntax().text_range());
        let ctors: Vec<String> = ve.ctors().map(|t| t.text().to_string()).collect();
        let base = Expr::Var(pos.clone(), SENTINEL.to_string());
        let body = ctors.into_iter().rev().fold(base, |acc, ctor| {
            Expr::App(
                pos.clone(),
                Box::new(Expr::Prim(pos.clone(), Prim::VariantEmbed(ctor))),
                Box::new(acc),
            )
        });
        Expr::Lam(pos, Bind::Arg(SENTINEL.to_string()), Box::new(body))
    }

    fn lower_list(&self, ll: &ListLiteral) -> Expr {
        let pos = self.pos_of(ll.syntax().text_range());
        let elems: Vec<Expr> = ll.elements().map(|e| self.lower_expr(&e)).collect();
        elems.into_iter().rev().fold(Expr::Prim(pos.clone(), Prim::ListEmpty), |acc, e| {
            self.app2(pos.clone(), Expr::Prim(pos.clone(), Prim::ListCons), e, acc)
        })
    }

    fn lower_import(&self, imp: &ImportExpr) -> Expr {
        let pos = self.pos_of(imp.syntax().text_range());
        let path = imp
            .path()
            .map(|t| unescape_string(t.text()))
            .unwrap_or_default();
        Expr::Import(pos, path)
    }

    fn lift_to_fun(&self, pos: Pos, t: TypeExpr) -> TypeExpr {
        match t {
            TypeExpr::Forall(fpos, vars, cs, body) => {
                let fun = TypeExpr::Fun(pos, Box::new((*body).clone()), body);
                TypeExpr::Forall(fpos, vars, cs, Box::new(fun))
            }
            other => TypeExpr::Fun(pos, Box::new(other.clone()), Box::new(other)),
        }
    }

    fn lower_signature_section(&self, sec: &SignatureSectionExpr) -> Expr {
        let pos = self.pos_of(sec.syntax().text_range());
        let ty = sec
            .type_ann()
            .map(|t| self.lower_type(&t))
            .unwrap_or_else(|| TypeExpr::Wildcard(pos.clone()));
        let lifted = self.lift_to_fun(pos.clone(), ty);
        let identity = Expr::Lam(
            pos.clone(),
            Bind::Arg("x".to_string()),
            Box::new(Expr::Var(pos.clone(), "x".to_string())),
        );
        Expr::Ann(pos, Box::new(identity), lifted)
    }

    fn lower_ann(&self, ann: &AnnExpr) -> Expr {
        let pos = self.pos_of(ann.syntax().text_range());
        let value = ann
            .value()
            .map(|e| self.lower_expr(&e))
            .unwrap_or_else(|| self.missing_expr(pos.clone()));
        let ty = ann
            .type_ann()
            .map(|t| self.lower_type(&t))
            .unwrap_or_else(|| TypeExpr::Wildcard(pos.clone()));
        Expr::Ann(pos, Box::new(value), ty)
    }

    // ── Types ────────────────────────────────────────────────────────

    fn lower_type(&self, node: &TypeNode) -> TypeExpr {
        match node {
            TypeNode::Forall(t) => self.lower_forall(t),
            TypeNode::Fun(t) => self.lower_fun_type(t),
            TypeNode::App(t) => self.lower_app_type(t),
            TypeNode::List(t) => self.lower_list_type(t),
            TypeNode::Record(t) => self.lower_record_type(t),
            TypeNode::Variant(t) => self.lower_variant_type(t),
            TypeNode::Var(t) => TypeExpr::Var(
                self.pos_of(t.syntax().text_range()),
                t.name().map(|n| n.text().to_string()).unwrap_or_default(),
            ),
            TypeNode::Wildcard(t) => TypeExpr::Wildcard(self.pos_of(t.syntax().text_range())),
            TypeNode::Con(t) => self.lower_con(t, Vec::new()),
            TypeNode::Paren(t) => t
                .inner()
                .map(|inner| self.lower_type(&inner))
                .unwrap_or_else(|| TypeExpr::Wildcard(self.pos_of(t.syntax().text_range()))),
        }
    }

    fn lower_con(&self, ct: &ConType, args: Vec<TypeExpr>) -> TypeExpr {
        let pos = self.pos_of(ct.syntax().text_range());
        let name = ct.name().map(|t| t.text().to_string()).unwrap_or_default();
        match name.as_str() {
            "Int" if args.is_empty() => TypeExpr::Int(pos),
            "Dbl" if args.is_empty() => TypeExpr::Dbl(pos),
            "Bool" if args.is_empty() => TypeExpr::Bool(pos),
            "Char" if args.is_empty() => TypeExpr::Char(pos),
            "Text" if args.is_empty() => TypeExpr::Text(pos),
            _ => TypeExpr::Synonym(pos, name, args),
        }
    }

    fn lower_app_type(&self, at: &AppType) -> TypeExpr {
        let mut parts: Vec<TypeNode> = at.parts().collect();
        if parts.len() < 2 {
            return parts
                .pop()
                .map(|n| self.lower_type(&n))
                .unwrap_or_else(|| TypeExpr::Wildcard(self.pos_of(at.syntax().text_range())));
        }
        let rhs = parts.pop().expect("checked len >= 2");
        let lhs = parts.pop().expect("checked len >= 2");
        let arg = self.lower_type(&rhs);
        // A bare constructor name (including a ground type like `Int`) is
        // only ever lowered with an empty argument list by `lower_type`'s
        // `Con` arm; route it back through `lower_con` with this argument
        // attached so a name like `Int` that isn't actually a synonym falls
        // out of the existing `TypeExpr::Synonym` arity/lookup machinery
        // instead of silently losing the argument.
        if let TypeNode::Con(ct) = &lhs {
            return self.lower_con(ct, vec![arg]);
        }
        match self.lower_type(&lhs) {
            TypeExpr::Synonym(pos, name, mut existing_args) => {
                existing_args.push(arg);
                TypeExpr::Synonym(pos, name, existing_args)
            }
            // Application onto any other shape (a record/variant/list/fun
            // type, a bound type variable, a wildcard, ...) has no meaning
            // in this type language. There's no dedicated error for "not
            // applicable" here, so route it through the same unknown-name
            // lookup a misspelled synonym would hit, using the head's own
            // source text as the name -- it is never a legal synonym name,
            // so elaboration always rejects it with a positioned error
            // instead of quietly dropping the argument.
            other => {
                let pos = other.pos().clone();
                TypeExpr::Synonym(pos, lhs.syntax().text().to_string(), vec![arg])
            }
        }
    }

    fn lower_fun_type(&self, ft: &FunType) -> TypeExpr {
        let pos = self.pos_of(ft.syntax().text_range());
        let (a, b) = ft.operands();
        let a = a
            .map(|t| self.lower_type(&t))
            .unwrap_or_else(|| TypeExpr::Wildcard(pos.clone()));
        let b = b
            .map(|t| self.lower_type(&t))
            .unwrap_or_else(|| TypeExpr::Wildcard(pos.clone()));
        TypeExpr::Fun(pos, Box::new(a), Box::new(b))
    }

    fn lower_list_type(&self, lt: &ListType) -> TypeExpr {
        let pos = self.pos_of(lt.syntax().text_range());
        let el = lt
            .element()
            .map(|t| self.lower_type(&t))
            .unwrap_or_else(|| TypeExpr::Wildcard(pos.clone()));
        TypeExpr::List(pos, Box::new(el))
    }

    fn lower_row(&self, fields: impl Iterator<Item = RowField>, tail: Option<RowTailVar>) -> Row {
        let fields = fields
            .map(|f| {
                let label = f.label().map(|t| t.text().to_string()).unwrap_or_default();
                let ty = f
                    .type_node()
                    .map(|t| self.lower_type(&t))
                    .unwrap_or_else(|| TypeExpr::Wildcard(Pos::synthetic()));
                (label, ty)
            })
            .collect();
        let tail = tail.and_then(|t| t.name()).map(|t| t.text().to_string());
        Row { fields, tail }
    }

    fn lower_record_type(&self, rt: &RecordType) -> TypeExpr {
        let pos = self.pos_of(rt.syntax().text_range());
        TypeExpr::Record(pos, self.lower_row(rt.fields(), rt.tail()))
    }

    fn lower_variant_type(&self, vt: &VariantType) -> TypeExpr {
        let pos = self.pos_of(vt.syntax().text_range());
        TypeExpr::Variant(pos, self.lower_row(vt.fields(), vt.tail()))
    }

    fn lower_forall(&self, ft: &ForallType) -> TypeExpr {
        let pos = self.pos_of(ft.syntax().text_range());
        let params: Vec<String> = ft.params().iter().map(|t| t.text().to_string()).collect();
        let constraints: Vec<Constraint> =
            ft.constraints().filter_map(|n| self.lower_constraint(n)).collect();
        let body = ft
            .body()
            .map(|t| self.lower_type(&t))
            .unwrap_or_else(|| TypeExpr::Wildcard(pos.clone()));
        TypeExpr::Forall(pos, params, constraints, Box::new(body))
    }

    fn lower_constraint(&self, node: SyntaxNode) -> Option<Constraint> {
        match node.kind() {
            SyntaxKind::CLASS_CONSTRAINT => {
                let cc = ClassConstraint::cast(node)?;
                let class = match cc.class_kw()? {
                    SyntaxKind::EQ_KW => ClassName::Eq,
                    SyntaxKind::ORD_KW => ClassName::Ord,
                    SyntaxKind::NUM_KW => ClassName::Num,
                    _ => return None,
                };
                let tyvar = cc.tyvar()?.text().to_string();
                Some(Constraint::Class(class, tyvar))
            }
            SyntaxKind::ROW_CONSTRAINT => {
                let rc = RowConstraint::cast(node)?;
                let tyvar = rc.tyvar()?.text().to_string();
                let label = rc.label()?.text().to_string();
                Some(Constraint::Lacks(tyvar, label))
            }
            _ => None,
        }
    }
}

/// Lower a parsed source file into its synonym declarations and its
/// (sugar-free) top-level expression. `file` names the source for
/// positions; `source` is the same text that was handed to [`crate::parse`].
pub fn lower_source_file(
    file: Arc<str>,
    source: &str,
    root: &ast::SourceFile,
) -> (Vec<Synonym>, Expr) {
    let lowerer = Lowerer { file, index: LineIndex::new(source) };
    let synonyms = root.synonyms().map(|d| lowerer.lower_synonym(&d)).collect();
    let expr = root
        .expr()
        .map(|e| lowerer.lower_expr(&e))
        .unwrap_or_else(|| Expr::Var(Pos::synthetic(), MISSING.to_string()));
    (synonyms, expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceFile;

    fn lower(src: &str) -> (Vec<Synonym>, Expr) {
        let parsed = crate::parse(src);
        assert!(parsed.ok(), "unexpected parse errors: {:?}", parsed.errors());
        let root = SourceFile::cast(parsed.syntax()).expect("root is a SOURCE_FILE");
        lower_source_file(Arc::from("test.pr"), src, &root)
    }

    #[test]
    fn identity_lambda() {
        let (_, e) = lower("\\x -> x");
        match e {
            Expr::Lam(_, Bind::Arg(name), body) => {
                assert_eq!(name, "x");
                assert!(matches!(*body, Expr::Var(_, n) if n == "x"));
            }
            other => panic!("expected Lam, got {other:?}"),
        }
    }

    #[test]
    fn binary_plus_desugars_to_add_application() {
        let (_, e) = lower("1 + 2");
        match e {
            Expr::App(_, f, b) => {
                assert!(matches!(*b, Expr::Prim(_, Prim::Int(2))));
                match *f {
                    Expr::App(_, g, a) => {
                        assert!(matches!(*g, Expr::Prim(_, Prim::Add)));
                        assert!(matches!(*a, Expr::Prim(_, Prim::Int(1))));
                    }
                    other => panic!("expected nested App, got {other:?}"),
                }
            }
            other => panic!("expected App, got {other:?}"),
        }
    }

    #[test]
    fn if_desugars_to_cond_application() {
        let (_, e) = lower("if True then 1 else 2");
        // Cond c t e == App(App(App(Prim Cond, c), t), e)
        let mut depth = 0;
        let mut cur = &e;
        loop {
            match cur {
                Expr::App(_, f, _) => {
                    depth += 1;
                    cur = f;
                }
                Expr::Prim(_, Prim::Cond) => break,
                other => panic!("expected Cond spine, hit {other:?}"),
            }
        }
        assert_eq!(depth, 3);
    }

    #[test]
    fn record_literal_right_folds_record_extend() {
        let (_, e) = lower("{ x = 1, y = True }");
        // Outermost extend is the first field written (x).
        match e {
            Expr::App(_, f, value) => {
                assert!(matches!(*value, Expr::Prim(_, Prim::Int(1))));
                match *f {
                    Expr::App(_, prim, _) => {
                        assert!(matches!(*prim, Expr::Prim(_, Prim::RecordExtend(ref l)) if l == "x"));
                    }
                    other => panic!("expected App, got {other:?}"),
                }
            }
            other => panic!("expected App, got {other:?}"),
        }
    }

    #[test]
    fn field_pun_becomes_self_named_var() {
        let (_, e) = lower("\\r -> { x | r }");
        match e {
            Expr::Lam(_, _, body) => match *body {
                Expr::App(_, f, value) => {
                    assert!(matches!(*value, Expr::Var(_, ref n) if n == "x"));
                    assert!(matches!(*f, Expr::App(_, ref prim, _)
                        if matches!(**prim, Expr::Prim(_, Prim::RecordExtend(ref l)) if l == "x")));
                }
                other => panic!("expected App, got {other:?}"),
            },
            other => panic!("expected Lam, got {other:?}"),
        }
    }

    #[test]
    fn list_literal_right_folds_list_cons() {
        let (_, e) = lower("[1, 2, 3]");
        let mut count = 0;
        let mut cur = e;
        let tail = loop {
            match cur {
                Expr::App(_, f, tail_box) => match *f {
                    Expr::App(_, g, _head) => {
                        assert!(matches!(*g, Expr::Prim(_, Prim::ListCons)));
                        count += 1;
                        cur = *tail_box;
                    }
                    other => panic!("expected nested App, got {other:?}"),
                },
                other => break other,
            }
        };
        assert_eq!(count, 3);
        assert!(matches!(tail, Expr::Prim(_, Prim::ListEmpty)));
    }

    #[test]
    fn string_literal_unescapes() {
        let (_, e) = lower("\"a\\nb\"");
        assert!(matches!(e, Expr::Prim(_, Prim::Text(ref s)) if s == "a\nb"));
    }

    #[test]
    fn builtin_lowercase_name_resolves_to_prim() {
        let (_, e) = lower("show");
        assert!(matches!(e, Expr::Prim(_, Prim::Show)));
    }

    #[test]
    fn plain_name_ref_stays_a_var() {
        let (_, e) = lower("frobnicate");
        assert!(matches!(e, Expr::Var(_, ref n) if n == "frobnicate"));
    }

    #[test]
    fn synonym_declaration_lowers_with_params() {
        let (synonyms, _) = lower("type Pair a b = { fst: a, snd: b }; {}");
        assert_eq!(synonyms.len(), 1);
        assert_eq!(synonyms[0].name, "Pair");
        assert_eq!(synonyms[0].params, vec!["a".to_string(), "b".to_string()]);
        assert!(matches!(synonyms[0].body, TypeExpr::Record(_, _)));
    }
}
