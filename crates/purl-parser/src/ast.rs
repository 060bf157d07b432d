//! Typed AST layer on top of the rowan CST.
//!
//! Zero-cost newtype wrappers around `SyntaxNode`/`SyntaxToken` with typed
//! accessors, following the same `AstNode`/`ast_node!` pattern used for
//! every production-grade rowan-based parser: `cast` is a single kind
//! check, accessors walk the tree directly, nothing is copied.

use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

pub trait AstNode: Sized {
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub(crate) syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == SyntaxKind::$kind {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

pub fn child_node<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

pub fn child_nodes<N: AstNode>(parent: &SyntaxNode) -> impl Iterator<Item = N> + '_ {
    parent.children().filter_map(N::cast)
}

pub fn child_token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| it.kind() == kind)
}

pub fn child_tokens(parent: &SyntaxNode, kind: SyntaxKind) -> impl Iterator<Item = SyntaxToken> + '_ {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(move |it| it.kind() == kind)
}

/// The operator token of a binary/unary expression: the first token child
/// that isn't itself the left-hand operand's subtree.
pub fn operator_token(parent: &SyntaxNode) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| !it.kind().is_trivia())
}

// ── Top level ────────────────────────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);
ast_node!(SynonymDecl, SYNONYM_DECL);
ast_node!(TypeParamList, TYPE_PARAM_LIST);

impl SourceFile {
    pub fn synonyms(&self) -> impl Iterator<Item = SynonymDecl> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn expr(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl SynonymDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::UPPER_IDENT)
    }

    pub fn params(&self) -> Vec<SyntaxToken> {
        child_node::<TypeParamList>(&self.syntax)
            .map(|list| child_tokens(&list.syntax, SyntaxKind::LOWER_IDENT).collect())
            .unwrap_or_default()
    }

    pub fn body(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

// ── Expression nodes ─────────────────────────────────────────────────────

ast_node!(LiteralExpr, LITERAL_EXPR);
ast_node!(NameRefExpr, NAME_REF_EXPR);
ast_node!(VariantCtorExpr, VARIANT_CTOR_EXPR);
ast_node!(UnaryExpr, UNARY_EXPR);
ast_node!(BinaryExpr, BINARY_EXPR);
ast_node!(AppExpr, APP_EXPR);
ast_node!(ParenExpr, PAREN_EXPR);
ast_node!(FieldAccessExpr, FIELD_ACCESS_EXPR);
ast_node!(RecordRestrictExpr, RECORD_RESTRICT_EXPR);
ast_node!(LambdaExpr, LAMBDA_EXPR);
ast_node!(LambdaBinder, LAMBDA_BINDER);
ast_node!(ArgBinder, ARG_BINDER);
ast_node!(RecArgBinder, REC_ARG_BINDER);
ast_node!(RecArgField, REC_ARG_FIELD);
ast_node!(RecWildcardBinder, REC_WILDCARD_BINDER);
ast_node!(LetExpr, LET_EXPR);
ast_node!(LetBinding, LET_BINDING);
ast_node!(IfExpr, IF_EXPR);
ast_node!(CaseExpr, CASE_EXPR);
ast_node!(CaseArm, CASE_ARM);
ast_node!(OverrideArm, OVERRIDE_ARM);
ast_node!(RecordLiteral, RECORD_LITERAL);
ast_node!(RecordField, RECORD_FIELD);
ast_node!(RecordFieldPun, RECORD_FIELD_PUN);
ast_node!(RecordUpdateField, RECORD_UPDATE_FIELD);
ast_node!(DifferenceRecordExpr, DIFFERENCE_RECORD_EXPR);
ast_node!(VariantEmbedExpr, VARIANT_EMBED_EXPR);
ast_node!(ListLiteral, LIST_LITERAL);
ast_node!(ImportExpr, IMPORT_EXPR);
ast_node!(SignatureSectionExpr, SIGNATURE_SECTION_EXPR);
ast_node!(AnnExpr, ANN_EXPR);
ast_node!(TypeAnn, TYPE_ANN);
ast_node!(ErrorNode, ERROR_NODE);

/// Any expression-producing node. Mirrors the primitive-sugar split in the
/// data model: every variant here still carries surface sugar, which
/// `crate::lower` compiles away.
#[derive(Debug, Clone)]
pub enum ExprNode {
    Literal(LiteralExpr),
    NameRef(NameRefExpr),
    VariantCtor(VariantCtorExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    App(AppExpr),
    Paren(ParenExpr),
    FieldAccess(FieldAccessExpr),
    RecordRestrict(RecordRestrictExpr),
    Lambda(LambdaExpr),
    Let(LetExpr),
    If(IfExpr),
    Case(CaseExpr),
    RecordLiteral(RecordLiteral),
    DifferenceRecord(DifferenceRecordExpr),
    VariantEmbed(VariantEmbedExpr),
    List(ListLiteral),
    Import(ImportExpr),
    SignatureSection(SignatureSectionExpr),
    Ann(AnnExpr),
    Error(ErrorNode),
}

impl ExprNode {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LITERAL_EXPR => Some(Self::Literal(LiteralExpr { syntax: node })),
            SyntaxKind::NAME_REF_EXPR => Some(Self::NameRef(NameRefExpr { syntax: node })),
            SyntaxKind::VARIANT_CTOR_EXPR => {
                Some(Self::VariantCtor(VariantCtorExpr { syntax: node }))
            }
            SyntaxKind::UNARY_EXPR => Some(Self::Unary(UnaryExpr { syntax: node })),
            SyntaxKind::BINARY_EXPR => Some(Self::Binary(BinaryExpr { syntax: node })),
            SyntaxKind::APP_EXPR => Some(Self::App(AppExpr { syntax: node })),
            SyntaxKind::PAREN_EXPR => Some(Self::Paren(ParenExpr { syntax: node })),
            SyntaxKind::FIELD_ACCESS_EXPR => {
                Some(Self::FieldAccess(FieldAccessExpr { syntax: node }))
            }
            SyntaxKind::RECORD_RESTRICT_EXPR => {
                Some(Self::RecordRestrict(RecordRestrictExpr { syntax: node }))
            }
            SyntaxKind::LAMBDA_EXPR => Some(Self::Lambda(LambdaExpr { syntax: node })),
            SyntaxKind::LET_EXPR => Some(Self::Let(LetExpr { syntax: node })),
            SyntaxKind::IF_EXPR => Some(Self::If(IfExpr { syntax: node })),
            SyntaxKind::CASE_EXPR => Some(Self::Case(CaseExpr { syntax: node })),
            SyntaxKind::RECORD_LITERAL => Some(Self::RecordLiteral(RecordLiteral { syntax: node })),
            SyntaxKind::DIFFERENCE_RECORD_EXPR => {
                Some(Self::DifferenceRecord(DifferenceRecordExpr { syntax: node }))
            }
            SyntaxKind::VARIANT_EMBED_EXPR => {
                Some(Self::VariantEmbed(VariantEmbedExpr { syntax: node }))
            }
            SyntaxKind::LIST_LITERAL => Some(Self::List(ListLiteral { syntax: node })),
            SyntaxKind::IMPORT_EXPR => Some(Self::Import(ImportExpr { syntax: node })),
            SyntaxKind::SIGNATURE_SECTION_EXPR => {
                Some(Self::SignatureSection(SignatureSectionExpr { syntax: node }))
            }
            SyntaxKind::ANN_EXPR => Some(Self::Ann(AnnExpr { syntax: node })),
            SyntaxKind::ERROR_NODE => Some(Self::Error(ErrorNode { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Literal(n) => &n.syntax,
            Self::NameRef(n) => &n.syntax,
            Self::VariantCtor(n) => &n.syntax,
            Self::Unary(n) => &n.syntax,
            Self::Binary(n) => &n.syntax,
            Self::App(n) => &n.syntax,
            Self::Paren(n) => &n.syntax,
            Self::FieldAccess(n) => &n.syntax,
            Self::RecordRestrict(n) => &n.syntax,
            Self::Lambda(n) => &n.syntax,
            Self::Let(n) => &n.syntax,
            Self::If(n) => &n.syntax,
            Self::Case(n) => &n.syntax,
            Self::RecordLiteral(n) => &n.syntax,
            Self::DifferenceRecord(n) => &n.syntax,
            Self::VariantEmbed(n) => &n.syntax,
            Self::List(n) => &n.syntax,
            Self::Import(n) => &n.syntax,
            Self::SignatureSection(n) => &n.syntax,
            Self::Ann(n) => &n.syntax,
            Self::Error(n) => &n.syntax,
        }
    }
}

impl LiteralExpr {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl NameRefExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }
}

impl VariantCtorExpr {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::UPPER_IDENT)
    }
}

impl UnaryExpr {
    pub fn operand(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl BinaryExpr {
    pub fn operator(&self) -> Option<SyntaxKind> {
        operator_token(&self.syntax).map(|t| t.kind())
    }

    pub fn operands(&self) -> (Option<ExprNode>, Option<ExprNode>) {
        let mut children = self.syntax.children().filter_map(ExprNode::cast);
        (children.next(), children.next())
    }
}

impl AppExpr {
    /// `(function, argument)` -- built left-associatively, so nested
    /// `AppExpr`s on the function side represent multi-argument calls.
    pub fn operands(&self) -> (Option<ExprNode>, Option<ExprNode>) {
        let mut children = self.syntax.children().filter_map(ExprNode::cast);
        (children.next(), children.next())
    }
}

impl ParenExpr {
    pub fn inner(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl FieldAccessExpr {
    pub fn base(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }

    pub fn label(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }
}

impl RecordRestrictExpr {
    pub fn base(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }

    pub fn label(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }
}

impl LambdaExpr {
    pub fn binders(&self) -> impl Iterator<Item = LambdaBinder> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn body(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl LambdaBinder {
    pub fn arg(&self) -> Option<ArgBinder> {
        child_node(&self.syntax)
    }

    pub fn rec_arg(&self) -> Option<RecArgBinder> {
        child_node(&self.syntax)
    }

    pub fn rec_wildcard(&self) -> Option<RecWildcardBinder> {
        child_node(&self.syntax)
    }

    pub fn annotation(&self) -> Option<TypeAnn> {
        child_node(&self.syntax)
    }
}

impl ArgBinder {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }
}

impl RecArgBinder {
    pub fn fields(&self) -> impl Iterator<Item = RecArgField> + '_ {
        child_nodes(&self.syntax)
    }
}

impl RecArgField {
    /// `(label, local_name)`: `{ℓ}` binds `ℓ` to itself, `{ℓ = name}` binds
    /// it to `name`.
    pub fn label_and_local(&self) -> (Option<SyntaxToken>, Option<SyntaxToken>) {
        let mut idents = self
            .syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::LOWER_IDENT);
        let label = idents.next();
        let local = idents.next();
        (label, local)
    }
}

impl LetExpr {
    pub fn bindings(&self) -> impl Iterator<Item = LetBinding> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn body(&self) -> Option<ExprNode> {
        self.syntax.children().filter_map(ExprNode::cast).last()
    }
}

impl LetBinding {
    pub fn binder(&self) -> Option<LambdaBinder> {
        child_node(&self.syntax)
    }

    pub fn annotation(&self) -> Option<TypeAnn> {
        child_node(&self.syntax)
    }

    pub fn value(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl IfExpr {
    pub fn branches(&self) -> (Option<ExprNode>, Option<ExprNode>, Option<ExprNode>) {
        let mut children = self.syntax.children().filter_map(ExprNode::cast);
        (children.next(), children.next(), children.next())
    }
}

impl CaseExpr {
    pub fn scrutinee(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }

    pub fn arms(&self) -> impl Iterator<Item = CaseArm> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn override_arms(&self) -> impl Iterator<Item = OverrideArm> + '_ {
        child_nodes(&self.syntax)
    }
}

impl CaseArm {
    pub fn ctor(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::UPPER_IDENT)
    }

    pub fn body(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl OverrideArm {
    pub fn ctor(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::UPPER_IDENT)
    }

    pub fn body(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl RecordLiteral {
    pub fn fields(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax.children().filter(|n| {
            matches!(
                n.kind(),
                SyntaxKind::RECORD_FIELD
                    | SyntaxKind::RECORD_FIELD_PUN
                    | SyntaxKind::RECORD_UPDATE_FIELD
            )
        })
    }

    /// The `| r` tail, if present. Field nodes (`RECORD_FIELD` etc.) are
    /// not themselves `ExprNode`s, so the only direct child that casts is
    /// the trailing tail expression, if the literal has one.
    pub fn tail(&self) -> Option<ExprNode> {
        child_node_expr(&self.syntax)
    }
}

impl RecordField {
    pub fn label(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }

    pub fn value(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl RecordFieldPun {
    pub fn label(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }
}

impl RecordUpdateField {
    pub fn label(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }

    pub fn value(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }
}

impl DifferenceRecordExpr {
    pub fn fields(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax.children().filter(|n| {
            matches!(
                n.kind(),
                SyntaxKind::RECORD_FIELD
                    | SyntaxKind::RECORD_FIELD_PUN
                    | SyntaxKind::RECORD_UPDATE_FIELD
            )
        })
    }
}

impl VariantEmbedExpr {
    pub fn ctors(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        child_tokens(&self.syntax, SyntaxKind::UPPER_IDENT)
    }
}

impl ListLiteral {
    pub fn elements(&self) -> impl Iterator<Item = ExprNode> + '_ {
        child_nodes_expr(&self.syntax)
    }
}

/// `ExprNode` isn't an `AstNode` impl (it's a hand-rolled sum over several
/// kinds), so it gets its own small helpers instead of the generic ones.
fn child_nodes_expr(parent: &SyntaxNode) -> impl Iterator<Item = ExprNode> + '_ {
    parent.children().filter_map(ExprNode::cast)
}

fn child_node_expr(parent: &SyntaxNode) -> Option<ExprNode> {
    parent.children().find_map(ExprNode::cast)
}

impl ImportExpr {
    pub fn path(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::STRING_LITERAL)
    }
}

impl SignatureSectionExpr {
    pub fn type_ann(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

impl AnnExpr {
    pub fn value(&self) -> Option<ExprNode> {
        self.syntax.children().find_map(ExprNode::cast)
    }

    pub fn type_ann(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

impl TypeAnn {
    pub fn type_node(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

// ── Type nodes ───────────────────────────────────────────────────────────

ast_node!(ForallType, FORALL_TYPE);
ast_node!(ConstraintList, CONSTRAINT_LIST);
ast_node!(ClassConstraint, CLASS_CONSTRAINT);
ast_node!(RowConstraint, ROW_CONSTRAINT);
ast_node!(FunType, FUN_TYPE);
ast_node!(AppType, APP_TYPE);
ast_node!(ListType, LIST_TYPE);
ast_node!(RecordType, RECORD_TYPE);
ast_node!(VariantType, VARIANT_TYPE);
ast_node!(RowField, ROW_FIELD);
ast_node!(RowTailVar, ROW_TAIL_VAR);
ast_node!(VarType, VAR_TYPE);
ast_node!(WildcardType, WILDCARD_TYPE);
ast_node!(ConType, CON_TYPE);
ast_node!(ParenType, PAREN_TYPE);

#[derive(Debug, Clone)]
pub enum TypeNode {
    Forall(ForallType),
    Fun(FunType),
    App(AppType),
    List(ListType),
    Record(RecordType),
    Variant(VariantType),
    Var(VarType),
    Wildcard(WildcardType),
    Con(ConType),
    Paren(ParenType),
}

impl TypeNode {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FORALL_TYPE => Some(Self::Forall(ForallType { syntax: node })),
            SyntaxKind::FUN_TYPE => Some(Self::Fun(FunType { syntax: node })),
            SyntaxKind::APP_TYPE => Some(Self::App(AppType { syntax: node })),
            SyntaxKind::LIST_TYPE => Some(Self::List(ListType { syntax: node })),
            SyntaxKind::RECORD_TYPE => Some(Self::Record(RecordType { syntax: node })),
            SyntaxKind::VARIANT_TYPE => Some(Self::Variant(VariantType { syntax: node })),
            SyntaxKind::VAR_TYPE => Some(Self::Var(VarType { syntax: node })),
            SyntaxKind::WILDCARD_TYPE => Some(Self::Wildcard(WildcardType { syntax: node })),
            SyntaxKind::CON_TYPE => Some(Self::Con(ConType { syntax: node })),
            SyntaxKind::PAREN_TYPE => Some(Self::Paren(ParenType { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Forall(n) => &n.syntax,
            Self::Fun(n) => &n.syntax,
            Self::App(n) => &n.syntax,
            Self::List(n) => &n.syntax,
            Self::Record(n) => &n.syntax,
            Self::Variant(n) => &n.syntax,
            Self::Var(n) => &n.syntax,
            Self::Wildcard(n) => &n.syntax,
            Self::Con(n) => &n.syntax,
            Self::Paren(n) => &n.syntax,
        }
    }
}

fn child_types(parent: &SyntaxNode) -> impl Iterator<Item = TypeNode> + '_ {
    parent.children().filter_map(TypeNode::cast)
}

impl ForallType {
    pub fn params(&self) -> Vec<SyntaxToken> {
        child_node::<TypeParamList>(&self.syntax)
            .map(|list| child_tokens(&list.syntax, SyntaxKind::LOWER_IDENT).collect())
            .unwrap_or_default()
    }

    pub fn constraints(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        child_node::<ConstraintList>(&self.syntax)
            .into_iter()
            .flat_map(|list| list.syntax.children().collect::<Vec<_>>())
    }

    pub fn body(&self) -> Option<TypeNode> {
        child_types(&self.syntax).next()
    }
}

impl ClassConstraint {
    pub fn class_kw(&self) -> Option<SyntaxKind> {
        operator_token(&self.syntax).map(|t| t.kind())
    }

    pub fn tyvar(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }
}

impl RowConstraint {
    pub fn tyvar(&self) -> Option<SyntaxToken> {
        child_tokens(&self.syntax, SyntaxKind::LOWER_IDENT).next()
    }

    pub fn label(&self) -> Option<SyntaxToken> {
        child_tokens(&self.syntax, SyntaxKind::LOWER_IDENT).nth(1)
    }
}

impl FunType {
    pub fn operands(&self) -> (Option<TypeNode>, Option<TypeNode>) {
        let mut children = child_types(&self.syntax);
        (children.next(), children.next())
    }
}

impl AppType {
    pub fn parts(&self) -> impl Iterator<Item = TypeNode> + '_ {
        child_types(&self.syntax)
    }
}

impl ListType {
    pub fn element(&self) -> Option<TypeNode> {
        child_types(&self.syntax).next()
    }
}

impl RecordType {
    pub fn fields(&self) -> impl Iterator<Item = RowField> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn tail(&self) -> Option<RowTailVar> {
        child_node(&self.syntax)
    }
}

impl VariantType {
    pub fn fields(&self) -> impl Iterator<Item = RowField> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn tail(&self) -> Option<RowTailVar> {
        child_node(&self.syntax)
    }
}

impl RowField {
    pub fn label(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }

    pub fn type_node(&self) -> Option<TypeNode> {
        child_types(&self.syntax).next()
    }
}

impl RowTailVar {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }
}

impl VarType {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_IDENT)
    }
}

impl ConType {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::UPPER_IDENT)
    }
}

impl ParenType {
    pub fn inner(&self) -> Option<TypeNode> {
        child_types(&self.syntax).next()
    }
}
