//! Algorithm W: type inference over the elaborated, sugar-free AST.
//!
//! Mirrors the reference compiler's `ti`/`tiBinds`/`tiPrim` split
//! (`mesh-typeck::infer`) and its top-level `typeInference` entry point,
//! generalized for row-kinded variables and the closed primitive table this
//! front end actually has (no structs, actor spawns, or pattern matching to
//! type).

use std::collections::BTreeSet;

use purl_common::Pos;
use purl_parser::lower::{Bind, ClassName, Constraint as SynConstraint, Expr, Prim, Row as RowExpr, Synonym, TypeExpr};
use rustc_hash::FxHashMap;

use crate::env::TypeEnv;
use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::{mk_row, row_to_list, Constraint, Kind, Row, Scheme, Ty};
use crate::unify::InferCtx;

/// Run inference on a top-level expression and generalize the result.
///
/// `synonyms` should hold every `type C a b … = T;` declaration visible to
/// `expr`, keyed by name -- exactly what [`crate::resolve`]'s accumulator
/// collects, made available here as a lookup table instead of a list.
pub fn type_inference(
    expr: &Expr,
    env: &mut TypeEnv,
    synonyms: &FxHashMap<String, Synonym>,
) -> Result<Scheme, TypeError> {
    let mut ctx = InferCtx::new();
    let ty = ti(expr, env, synonyms, &mut ctx)?;
    Ok(ctx.generalise(env, ty))
}

fn ti(
    expr: &Expr,
    env: &mut TypeEnv,
    synonyms: &FxHashMap<String, Synonym>,
    ctx: &mut InferCtx,
) -> Result<Ty, TypeError> {
    match expr {
        Expr::Var(pos, name) => env
            .lookup(name)
            .map(|scheme| ctx.instantiate(&scheme))
            .ok_or_else(|| TypeError::UnboundVariable { name: name.clone(), pos: pos.clone() }),

        Expr::Prim(pos, prim) => Ok(ti_prim(pos, prim, ctx)),

        Expr::App(_pos, f, x) => {
            let t1 = ti(f, env, synonyms, ctx)?;
            let t2 = ti(x, env, synonyms, ctx)?;
            let alpha = ctx.fresh_var();
            // Expected: a function from the argument's type to some result,
            // required by the argument at `x`. Found: the callee's actual
            // type, produced at `f`. The two are frequently on different
            // lines (`f` bound far from its use).
            ctx.unify(
                Ty::fun(t2, alpha.clone()),
                t1,
                ConstraintOrigin::Application { pos: x.pos().clone() },
                ConstraintOrigin::Application { pos: f.pos().clone() },
            )?;
            Ok(alpha)
        }

        Expr::Lam(pos, bind, body) => {
            let alpha = ctx.fresh_var();
            env.push_scope();
            let bindings = ti_binds(bind, alpha.clone(), pos, ctx)?;
            for (name, ty) in bindings {
                env.insert(name, Scheme::mono(ty));
            }
            let result = ti(body, env, synonyms, ctx);
            env.pop_scope();
            Ok(Ty::fun(alpha, result?))
        }

        Expr::Let(pos, bind, value, body) => {
            let t1 = ti(value, env, synonyms, ctx)?;
            env.push_scope();
            let bindings = ti_binds(bind, t1, pos, ctx)?;
            for (name, ty) in bindings {
                let scheme = ctx.generalise(env, ty);
                env.insert(name, scheme);
            }
            let result = ti(body, env, synonyms, ctx);
            env.pop_scope();
            result
        }

        Expr::AnnLam(pos, bind, annotation, body) => {
            let alpha = ctx.fresh_var();
            let annotated = ty_of_annotation(annotation, synonyms, ctx)?;
            // Expected: the written annotation, at its own position. Found:
            // the binder's inferred shape, at the lambda's position --
            // distinct when the annotation disagrees with how the binder
            // destructures further down.
            ctx.unify(
                annotated,
                alpha.clone(),
                ConstraintOrigin::Annotation { pos: annotation.pos().clone() },
                ConstraintOrigin::Annotation { pos: pos.clone() },
            )?;
            env.push_scope();
            let bindings = ti_binds(bind, alpha.clone(), pos, ctx)?;
            for (name, ty) in bindings {
                env.insert(name, Scheme::mono(ty));
            }
            let result = ti(body, env, synonyms, ctx);
            env.pop_scope();
            Ok(Ty::fun(alpha, result?))
        }

        Expr::AnnLet(pos, bind, annotation, value, body) => {
            let t1 = ti(value, env, synonyms, ctx)?;
            let annotated = ty_of_annotation(annotation, synonyms, ctx)?;
            // Expected: the annotation, at its own position. Found: the
            // bound value's inferred type, at the value expression's own
            // position.
            ctx.unify(
                annotated,
                t1.clone(),
                ConstraintOrigin::Annotation { pos: annotation.pos().clone() },
                ConstraintOrigin::Annotation { pos: value.pos().clone() },
            )?;
            env.push_scope();
            let bindings = ti_binds(bind, t1, pos, ctx)?;
            for (name, ty) in bindings {
                let scheme = ctx.generalise(env, ty);
                env.insert(name, scheme);
            }
            let result = ti(body, env, synonyms, ctx);
            env.pop_scope();
            result
        }

        Expr::Ann(_pos, value, annotation) => {
            let t = ti(value, env, synonyms, ctx)?;
            let annotated = ty_of_annotation(annotation, synonyms, ctx)?;
            ctx.unify(
                annotated,
                t.clone(),
                ConstraintOrigin::Annotation { pos: annotation.pos().clone() },
                ConstraintOrigin::Annotation { pos: value.pos().clone() },
            )?;
            Ok(ctx.resolve(t))
        }

        Expr::Import(pos, _) => {
            unreachable!("type inference runs only after import resolution ({})", pos)
        }
    }
}

/// `tiBinds(b, ty)`.
fn ti_binds(bind: &Bind, ty: Ty, pos: &Pos, ctx: &mut InferCtx) -> Result<Vec<(String, Ty)>, TypeError> {
    match bind {
        Bind::Arg(name) => Ok(vec![(name.clone(), ty)]),

        Bind::RecArg(fields) => {
            let field_tys: Vec<(String, Ty)> =
                fields.iter().map(|(label, _)| (label.clone(), ctx.fresh_var())).collect();
            let tail = ctx.fresh_var_with(Kind::Row, Constraint::None);
            let Ty::Var(tail_var) = tail else { unreachable!() };
            let row = mk_row(Row::Var(tail_var), field_tys.clone());
            ctx.unify(
                Ty::Record(row),
                ty,
                ConstraintOrigin::Binding { pos: pos.clone() },
                ConstraintOrigin::Binding { pos: pos.clone() },
            )?;
            Ok(fields
                .iter()
                .zip(field_tys)
                .map(|((_, local), (_, field_ty))| (local.clone(), field_ty))
                .collect())
        }

        Bind::RecWildcard => {
            let resolved = ctx.resolve(ty);
            match &resolved {
                Ty::Record(row) => {
                    let (fields, tail) = row_to_list(row);
                    if tail.is_some() {
                        Err(TypeError::RecordWildcardNotARecord { ty: resolved.clone(), pos: pos.clone() })
                    } else {
                        Ok(fields)
                    }
                }
                _ => Err(TypeError::RecordWildcardNotARecord { ty: resolved, pos: pos.clone() }),
            }
        }
    }
}

/// `tiPrim(pos, p)`: the primitive typing table of §4.7, verbatim.
fn ti_prim(_pos: &Pos, prim: &Prim, ctx: &mut InferCtx) -> Ty {
    match prim {
        Prim::Int(_) => Ty::Int,
        Prim::Dbl(_) => Ty::Dbl,
        Prim::Char(_) => Ty::Char,
        Prim::Bool(_) => Ty::Bool,
        Prim::Text(_) => Ty::Text,

        Prim::Neg => Ty::fun(Ty::Int, Ty::Int),
        Prim::Add | Prim::Sub | Prim::Mul | Prim::Div | Prim::Mod => {
            Ty::fun(Ty::Int, Ty::fun(Ty::Int, Ty::Int))
        }
        Prim::Abs => {
            let a = ctx.fresh_var();
            Ty::fun(a.clone(), a)
        }
        Prim::Double => Ty::fun(Ty::Int, Ty::Dbl),
        Prim::Floor | Prim::Ceiling => Ty::fun(Ty::Dbl, Ty::Int),

        Prim::Eq | Prim::NEq | Prim::RGT | Prim::RGTE | Prim::RLT | Prim::RLTE => {
            let a = ctx.fresh_var();
            Ty::fun(a.clone(), Ty::fun(a, Ty::Bool))
        }

        Prim::And | Prim::Or => Ty::fun(Ty::Bool, Ty::fun(Ty::Bool, Ty::Bool)),
        Prim::Not => Ty::fun(Ty::Bool, Ty::Bool),

        Prim::Cond => {
            let a = ctx.fresh_var();
            Ty::fun(Ty::Bool, Ty::fun(a.clone(), Ty::fun(a.clone(), a)))
        }

        Prim::FwdComp => {
            let a = ctx.fresh_var();
            let b = ctx.fresh_var();
            let c = ctx.fresh_var();
            Ty::fun(Ty::fun(a.clone(), b.clone()), Ty::fun(Ty::fun(b, c.clone()), Ty::fun(a, c)))
        }
        Prim::BwdComp => {
            let a = ctx.fresh_var();
            let b = ctx.fresh_var();
            let c = ctx.fresh_var();
            Ty::fun(Ty::fun(b.clone(), c.clone()), Ty::fun(Ty::fun(a.clone(), b), Ty::fun(a, c)))
        }

        Prim::FixPrim => {
            let a = ctx.fresh_var();
            Ty::fun(Ty::fun(a.clone(), a.clone()), a)
        }

        Prim::ListEmpty => Ty::list(ctx.fresh_var()),
        Prim::ListCons => {
            let a = ctx.fresh_var();
            Ty::fun(a.clone(), Ty::fun(Ty::list(a.clone()), Ty::list(a)))
        }
        Prim::ListUncons => {
            let a = ctx.fresh_var();
            let cons_fields = Row::Extend(
                "head".to_string(),
                Box::new(a.clone()),
                Box::new(Row::Extend("tail".to_string(), Box::new(Ty::list(a.clone())), Box::new(Row::Empty))),
            );
            let variant = Row::Extend(
                "Nil".to_string(),
                Box::new(Ty::Record(Row::Empty)),
                Box::new(Row::Extend("Cons".to_string(), Box::new(Ty::Record(cons_fields)), Box::new(Row::Empty))),
            );
            Ty::fun(Ty::list(a), Ty::Variant(variant))
        }
        Prim::ListAppend => {
            let a = ctx.fresh_var();
            Ty::fun(Ty::list(a.clone()), Ty::fun(Ty::list(a.clone()), Ty::list(a)))
        }
        Prim::ListFoldr => {
            let a = ctx.fresh_var();
            let b = ctx.fresh_var();
            Ty::fun(
                Ty::fun(a.clone(), Ty::fun(b.clone(), b.clone())),
                Ty::fun(b.clone(), Ty::fun(Ty::list(a), b)),
            )
        }
        Prim::ListNull => {
            let a = ctx.fresh_var();
            Ty::fun(Ty::list(a), Ty::Bool)
        }

        Prim::TextAppend => Ty::fun(Ty::Text, Ty::fun(Ty::Text, Ty::Text)),
        Prim::Pack => Ty::fun(Ty::list(Ty::Char), Ty::Text),
        Prim::Unpack => Ty::fun(Ty::Text, Ty::list(Ty::Char)),
        Prim::Show => {
            let a = ctx.fresh_var();
            Ty::fun(a, Ty::Text)
        }

        Prim::RecordEmpty => Ty::Record(Row::Empty),
        Prim::RecordSelect(label) => {
            let a = ctx.fresh_var();
            let r = ctx.fresh_var_with(Kind::Row, Constraint::lacks_one(label));
            let Ty::Var(r) = r else { unreachable!() };
            Ty::fun(Ty::Record(Row::Extend(label.clone(), Box::new(a.clone()), Box::new(Row::Var(r)))), a)
        }
        Prim::RecordExtend(label) => {
            let a = ctx.fresh_var();
            let r = ctx.fresh_var_with(Kind::Row, Constraint::lacks_one(label));
            let Ty::Var(r) = r else { unreachable!() };
            Ty::fun(
                a.clone(),
                Ty::fun(
                    Ty::Record(Row::Var(r)),
                    Ty::Record(Row::Extend(label.clone(), Box::new(a), Box::new(Row::Var(r)))),
                ),
            )
        }
        Prim::RecordRestrict(label) => {
            let a = ctx.fresh_var();
            let r = ctx.fresh_var_with(Kind::Row, Constraint::lacks_one(label));
            let Ty::Var(r) = r else { unreachable!() };
            Ty::fun(Ty::Record(Row::Extend(label.clone(), Box::new(a), Box::new(Row::Var(r)))), Ty::Record(Row::Var(r)))
        }

        Prim::VariantInject(label) => {
            let a = ctx.fresh_var();
            let r = ctx.fresh_var_with(Kind::Row, Constraint::lacks_one(label));
            let Ty::Var(r) = r else { unreachable!() };
            Ty::fun(a.clone(), Ty::Variant(Row::Extend(label.clone(), Box::new(a), Box::new(Row::Var(r)))))
        }
        Prim::VariantEmbed(label) => {
            let r = ctx.fresh_var_with(Kind::Row, Constraint::lacks_one(label));
            let Ty::Var(r) = r else { unreachable!() };
            let a = ctx.fresh_var();
            Ty::fun(
                Ty::Variant(Row::Var(r)),
                Ty::Variant(Row::Extend(label.clone(), Box::new(a), Box::new(Row::Var(r)))),
            )
        }
        Prim::VariantElim(label) => {
            let a = ctx.fresh_var();
            let b = ctx.fresh_var();
            let r = ctx.fresh_var_with(Kind::Row, Constraint::lacks_one(label));
            let Ty::Var(r) = r else { unreachable!() };
            Ty::fun(
                Ty::fun(a.clone(), b.clone()),
                Ty::fun(
                    Ty::fun(Ty::Variant(Row::Var(r)), b.clone()),
                    Ty::fun(Ty::Variant(Row::Extend(label.clone(), Box::new(a), Box::new(Row::Var(r)))), b),
                ),
            )
        }
        Prim::Absurd => {
            let b = ctx.fresh_var();
            Ty::fun(Ty::Variant(Row::Empty), b)
        }

        Prim::ErrorPrim => {
            let a = ctx.fresh_var();
            Ty::fun(Ty::Text, a)
        }
        Prim::Trace => {
            let a = ctx.fresh_var();
            Ty::fun(Ty::fun(Ty::Text, a.clone()), a)
        }
    }
}

// ── Type annotation elaboration ─────────────────────────────────────────

/// Elaborate a surface `TypeExpr` (no bound scope) into a `Ty`, allocating
/// fresh variables for any top-level `forall` and wildcard.
pub fn ty_of_annotation(
    te: &TypeExpr,
    synonyms: &FxHashMap<String, Synonym>,
    ctx: &mut InferCtx,
) -> Result<Ty, TypeError> {
    elaborate(te, &FxHashMap::default(), synonyms, ctx)
}

fn elaborate(
    te: &TypeExpr,
    scope: &FxHashMap<String, Ty>,
    synonyms: &FxHashMap<String, Synonym>,
    ctx: &mut InferCtx,
) -> Result<Ty, TypeError> {
    match te {
        TypeExpr::Int(_) => Ok(Ty::Int),
        TypeExpr::Dbl(_) => Ok(Ty::Dbl),
        TypeExpr::Bool(_) => Ok(Ty::Bool),
        TypeExpr::Char(_) => Ok(Ty::Char),
        TypeExpr::Text(_) => Ok(Ty::Text),
        TypeExpr::List(_, elem) => Ok(Ty::list(elaborate(elem, scope, synonyms, ctx)?)),
        TypeExpr::Fun(_, a, b) => {
            Ok(Ty::fun(elaborate(a, scope, synonyms, ctx)?, elaborate(b, scope, synonyms, ctx)?))
        }
        TypeExpr::Record(pos, row) => Ok(Ty::Record(elaborate_row(pos, row, scope, synonyms, ctx)?)),
        TypeExpr::Variant(pos, row) => Ok(Ty::Variant(elaborate_row(pos, row, scope, synonyms, ctx)?)),
        TypeExpr::Var(pos, name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| TypeError::UnboundTypeVariable { name: name.clone(), pos: pos.clone() }),
        TypeExpr::Wildcard(_) => Ok(ctx.fresh_var()),
        TypeExpr::Synonym(pos, name, args) => {
            let syn = synonyms
                .get(name)
                .ok_or_else(|| TypeError::UnknownSynonym { name: name.clone(), pos: pos.clone() })?;
            if syn.params.len() != args.len() {
                return Err(TypeError::SynonymArityMismatch {
                    name: name.clone(),
                    expected: syn.params.len(),
                    found: args.len(),
                    pos: pos.clone(),
                });
            }
            let mut inner_scope = FxHashMap::default();
            for (param, arg) in syn.params.iter().zip(args) {
                inner_scope.insert(param.clone(), elaborate(arg, scope, synonyms, ctx)?);
            }
            elaborate(&syn.body, &inner_scope, synonyms, ctx)
        }
        TypeExpr::Forall(pos, vars, constraints, body) => {
            elaborate_forall(pos, vars, constraints, body, scope, synonyms, ctx)
        }
    }
}

fn elaborate_row(
    pos: &Pos,
    row: &RowExpr,
    scope: &FxHashMap<String, Ty>,
    synonyms: &FxHashMap<String, Synonym>,
    ctx: &mut InferCtx,
) -> Result<Row, TypeError> {
    let mut fields = Vec::with_capacity(row.fields.len());
    for (label, field_te) in &row.fields {
        fields.push((label.clone(), elaborate(field_te, scope, synonyms, ctx)?));
    }
    let tail = match &row.tail {
        Some(name) => match scope.get(name) {
            Some(Ty::Var(v)) => Row::Var(*v),
            _ => return Err(TypeError::UnboundTypeVariable { name: name.clone(), pos: pos.clone() }),
        },
        None => Row::Empty,
    };
    Ok(mk_row(tail, fields))
}

fn elaborate_forall(
    pos: &Pos,
    vars: &[String],
    constraints: &[SynConstraint],
    body: &TypeExpr,
    outer_scope: &FxHashMap<String, Ty>,
    synonyms: &FxHashMap<String, Synonym>,
    ctx: &mut InferCtx,
) -> Result<Ty, TypeError> {
    for c in constraints {
        let var_name = match c {
            SynConstraint::Class(_, v) => v,
            SynConstraint::Lacks(v, _) => v,
        };
        if !vars.iter().any(|v| v == var_name) {
            return Err(TypeError::UnknownConstraintVariable { name: var_name.clone(), pos: pos.clone() });
        }
    }

    let kinds = classify_var_kinds(vars, body);
    let mut scope = outer_scope.clone();
    for name in vars {
        let kind = kinds.get(name).copied().unwrap_or(Kind::Star);
        let constraint = match kind {
            Kind::Row => {
                let labels: BTreeSet<String> = constraints
                    .iter()
                    .filter_map(|c| match c {
                        SynConstraint::Lacks(v, label) if v == name => Some(label.clone()),
                        _ => None,
                    })
                    .collect();
                if labels.is_empty() { Constraint::None } else { Constraint::Lacks(labels) }
            }
            Kind::Star => {
                let classes: Vec<String> = constraints
                    .iter()
                    .filter_map(|c| match c {
                        SynConstraint::Class(class_name, v) if v == name => Some(class_name_str(*class_name)),
                        _ => None,
                    })
                    .collect();
                if classes.is_empty() { Constraint::None } else { Constraint::Class(classes) }
            }
        };
        let fresh = ctx.fresh_var_with(kind, constraint);
        scope.insert(name.clone(), fresh);
    }
    elaborate(body, &scope, synonyms, ctx)
}

fn class_name_str(name: ClassName) -> String {
    match name {
        ClassName::Eq => "Eq".to_string(),
        ClassName::Ord => "Ord".to_string(),
        ClassName::Num => "Num".to_string(),
    }
}

/// Determine which `forall`-bound names are used as a row's open tail
/// anywhere in `body`; everything else defaults to `Star`. A name used as a
/// row tail is unambiguously `Row`-kinded -- nothing else can appear there.
fn classify_var_kinds(vars: &[String], body: &TypeExpr) -> FxHashMap<String, Kind> {
    let mut kinds: FxHashMap<String, Kind> = vars.iter().map(|v| (v.clone(), Kind::Star)).collect();
    mark_row_tails(body, &mut kinds);
    kinds
}

fn mark_row_tails(te: &TypeExpr, kinds: &mut FxHashMap<String, Kind>) {
    match te {
        TypeExpr::List(_, t) => mark_row_tails(t, kinds),
        TypeExpr::Fun(_, a, b) => {
            mark_row_tails(a, kinds);
            mark_row_tails(b, kinds);
        }
        TypeExpr::Record(_, row) | TypeExpr::Variant(_, row) => {
            if let Some(name) = &row.tail {
                if let Some(k) = kinds.get_mut(name) {
                    *k = Kind::Row;
                }
            }
            for (_, field_ty) in &row.fields {
                mark_row_tails(field_ty, kinds);
            }
        }
        TypeExpr::Synonym(_, _, args) => {
            for arg in args {
                mark_row_tails(arg, kinds);
            }
        }
        TypeExpr::Forall(_, _, _, inner_body) => mark_row_tails(inner_body, kinds),
        TypeExpr::Int(_)
        | TypeExpr::Dbl(_)
        | TypeExpr::Bool(_)
        | TypeExpr::Char(_)
        | TypeExpr::Text(_)
        | TypeExpr::Var(_, _)
        | TypeExpr::Wildcard(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purl_common::Pos;
    use std::sync::Arc;

    fn pos() -> Pos {
        Pos::new(Arc::from("test.pr"), 1, 1)
    }

    fn no_synonyms() -> FxHashMap<String, Synonym> {
        FxHashMap::default()
    }

    #[test]
    fn identity_lambda_has_polymorphic_type() {
        let expr = Expr::Lam(pos(), Bind::Arg("x".into()), Box::new(Expr::Var(pos(), "x".into())));
        let mut env = TypeEnv::new();
        let scheme = type_inference(&expr, &mut env, &no_synonyms()).unwrap();
        assert_eq!(scheme.vars.len(), 1);
        assert!(matches!(scheme.ty, Ty::Fun(_, _)));
    }

    #[test]
    fn application_of_non_function_is_a_type_error() {
        let expr = Expr::App(
            pos(),
            Box::new(Expr::Prim(pos(), Prim::Int(1))),
            Box::new(Expr::Prim(pos(), Prim::Int(2))),
        );
        let mut env = TypeEnv::new();
        let err = type_inference(&expr, &mut env, &no_synonyms()).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn record_field_access_infers_open_row_argument() {
        // \r -> r.x  =>  App (Prim (RecordSelect "x")) (Var "r")
        let select = Expr::Prim(pos(), Prim::RecordSelect("x".into()));
        let body = Expr::App(pos(), Box::new(select), Box::new(Expr::Var(pos(), "r".into())));
        let expr = Expr::Lam(pos(), Bind::Arg("r".into()), Box::new(body));
        let mut env = TypeEnv::new();
        let scheme = type_inference(&expr, &mut env, &no_synonyms()).unwrap();
        // forall a r. {x: a | r} -> a
        assert_eq!(scheme.vars.len(), 2);
    }

    #[test]
    fn self_application_fails_occurs_check() {
        // \x -> x x
        let body = Expr::App(
            pos(),
            Box::new(Expr::Var(pos(), "x".into())),
            Box::new(Expr::Var(pos(), "x".into())),
        );
        let expr = Expr::Lam(pos(), Bind::Arg("x".into()), Box::new(body));
        let mut env = TypeEnv::new();
        let err = type_inference(&expr, &mut env, &no_synonyms()).unwrap_err();
        assert!(matches!(err, TypeError::OccursCheck { .. }));
    }

    #[test]
    fn let_generalises_identity_over_two_uses() {
        // let id = \x -> x in { a = id 1, b = id True }
        // modelled directly via RecordExtend/RecordEmpty primitives.
        let id_lam = Expr::Lam(pos(), Bind::Arg("x".into()), Box::new(Expr::Var(pos(), "x".into())));
        let id_app_int = Expr::App(
            pos(),
            Box::new(Expr::Var(pos(), "id".into())),
            Box::new(Expr::Prim(pos(), Prim::Int(1))),
        );
        let id_app_bool = Expr::App(
            pos(),
            Box::new(Expr::Var(pos(), "id".into())),
            Box::new(Expr::Prim(pos(), Prim::Bool(true))),
        );
        let record = Expr::App(
            pos(),
            Box::new(Expr::App(
                pos(),
                Box::new(Expr::Prim(pos(), Prim::RecordExtend("a".into()))),
                Box::new(id_app_int),
            )),
            Box::new(Expr::App(
                pos(),
                Box::new(Expr::App(
                    pos(),
                    Box::new(Expr::Prim(pos(), Prim::RecordExtend("b".into()))),
                    Box::new(id_app_bool),
                )),
                Box::new(Expr::Prim(pos(), Prim::RecordEmpty)),
            )),
        );
        let expr = Expr::Let(pos(), Bind::Arg("id".into()), Box::new(id_lam), Box::new(record));
        let mut env = TypeEnv::new();
        let scheme = type_inference(&expr, &mut env, &no_synonyms()).unwrap();
        assert!(scheme.vars.is_empty(), "the record's fields are fully monomorphic");
        match scheme.ty {
            Ty::Record(row) => {
                let (fields, tail) = row_to_list(&row);
                assert!(tail.is_none());
                assert!(fields.contains(&("a".to_string(), Ty::Int)));
                assert!(fields.contains(&("b".to_string(), Ty::Bool)));
            }
            other => panic!("expected a record type, got {other}"),
        }
    }

    #[test]
    fn annotation_mismatch_is_rejected() {
        let expr = Expr::Ann(pos(), Box::new(Expr::Prim(pos(), Prim::Int(1))), TypeExpr::Bool(pos()));
        let mut env = TypeEnv::new();
        let err = type_inference(&expr, &mut env, &no_synonyms()).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn unknown_synonym_reference_errors() {
        let te = TypeExpr::Synonym(pos(), "Undefined".into(), vec![]);
        let mut ctx = InferCtx::new();
        let err = ty_of_annotation(&te, &no_synonyms(), &mut ctx).unwrap_err();
        assert!(matches!(err, TypeError::UnknownSynonym { .. }));
    }

    #[test]
    fn synonym_arity_mismatch_errors() {
        let mut synonyms = FxHashMap::default();
        synonyms.insert(
            "Pair".to_string(),
            Synonym { pos: pos(), name: "Pair".to_string(), params: vec!["a".to_string()], body: TypeExpr::Int(pos()) },
        );
        let te = TypeExpr::Synonym(pos(), "Pair".into(), vec![]);
        let mut ctx = InferCtx::new();
        let err = ty_of_annotation(&te, &synonyms, &mut ctx).unwrap_err();
        assert!(matches!(err, TypeError::SynonymArityMismatch { .. }));
    }

    #[test]
    fn forall_constraint_on_undeclared_variable_errors() {
        let te = TypeExpr::Forall(
            pos(),
            vec!["a".to_string()],
            vec![SynConstraint::Lacks("r".to_string(), "x".to_string())],
            Box::new(TypeExpr::Var(pos(), "a".to_string())),
        );
        let mut ctx = InferCtx::new();
        let err = ty_of_annotation(&te, &no_synonyms(), &mut ctx).unwrap_err();
        assert!(matches!(err, TypeError::UnknownConstraintVariable { .. }));
    }
}
