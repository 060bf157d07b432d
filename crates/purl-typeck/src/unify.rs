//! Row-aware unification engine.
//!
//! Follows the reference compiler's `InferCtx` shape (`mesh-typeck::unify`):
//! one context owns the `ena` union-find table, exposes `resolve`/`unify`/
//! `generalize` as `&mut self` methods, and accumulates nothing on success
//! -- callers propagate `Result` rather than reading an error list back off
//! the context. What's new here relative to the reference compiler is the
//! row machinery (`rewrite_row`, `var_bind_row`, `unionConstraints`) needed
//! for extensible records and polymorphic variants, which the reference
//! compiler's nominal struct/enum type system never required.

use std::collections::BTreeSet;

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;

use crate::env::TypeEnv;
use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::{mk_row, row_to_list, Constraint, Kind, Row, Scheme, Ty, TyVar};

/// Owns the unification table and the kind/constraint metadata for every
/// variable allocated during one `typeInference` call.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
    /// Indexed by `TyVar.0`; metadata `ena`'s table itself has no room for.
    var_info: Vec<(Kind, Constraint)>,
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl InferCtx {
    pub fn new() -> Self {
        InferCtx { table: InPlaceUnificationTable::new(), var_info: Vec::new() }
    }

    // ── Variable creation ────────────────────────────────────────────────

    pub fn fresh_var(&mut self) -> Ty {
        self.fresh_var_with(Kind::Star, Constraint::None)
    }

    pub fn fresh_var_with(&mut self, kind: Kind, constraint: Constraint) -> Ty {
        let v = self.table.new_key(None);
        while self.var_info.len() <= v.0 as usize {
            self.var_info.push((Kind::Star, Constraint::None));
        }
        self.var_info[v.0 as usize] = (kind, constraint);
        Ty::Var(v)
    }

    fn kind_of(&self, v: TyVar) -> Kind {
        self.var_info.get(v.0 as usize).map(|(k, _)| *k).unwrap_or(Kind::Star)
    }

    fn constraint_of(&self, v: TyVar) -> Constraint {
        self.var_info.get(v.0 as usize).cloned().map(|(_, c)| c).unwrap_or_default()
    }

    // ── Resolution ───────────────────────────────────────────────────────

    /// Apply the current (implicit, union-find) substitution to a type.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::Fun(a, b) => Ty::Fun(Box::new(self.resolve(*a)), Box::new(self.resolve(*b))),
            Ty::List(t) => Ty::List(Box::new(self.resolve(*t))),
            Ty::Record(row) => Ty::Record(self.resolve_row(row)),
            Ty::Variant(row) => Ty::Variant(self.resolve_row(row)),
            Ty::RowVal(row) => Ty::RowVal(self.resolve_row(row)),
            other => other,
        }
    }

    fn resolve_row(&mut self, row: Row) -> Row {
        match row {
            Row::Empty => Row::Empty,
            Row::Var(v) => match self.table.probe_value(v) {
                Some(Ty::RowVal(inner)) => self.resolve_row(inner),
                Some(_) | None => Row::Var(self.table.find(v)),
            },
            Row::Extend(label, ty, rest) => {
                Row::Extend(label, Box::new(self.resolve(*ty)), Box::new(self.resolve_row(*rest)))
            }
        }
    }

    // ── Free variables ───────────────────────────────────────────────────

    pub fn ftv(&mut self, ty: &Ty) -> BTreeSet<TyVar> {
        let resolved = self.resolve(ty.clone());
        let mut out = BTreeSet::new();
        collect_ftv(&resolved, &mut out);
        out
    }

    // ── Occurs check ─────────────────────────────────────────────────────

    fn occurs_in(&mut self, v: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(u) => {
                if *u == v {
                    return true;
                }
                match self.table.probe_value(*u) {
                    Some(inner) => self.occurs_in(v, &inner),
                    None => false,
                }
            }
            Ty::Int | Ty::Dbl | Ty::Bool | Ty::Char | Ty::Text => false,
            Ty::Fun(a, b) => self.occurs_in(v, a) || self.occurs_in(v, b),
            Ty::List(t) => self.occurs_in(v, t),
            Ty::Record(row) | Ty::Variant(row) | Ty::RowVal(row) => self.row_occurs(v, row),
        }
    }

    fn row_occurs(&mut self, v: TyVar, row: &Row) -> bool {
        match row {
            Row::Empty => false,
            Row::Var(u) => {
                if *u == v {
                    return true;
                }
                match self.table.probe_value(*u) {
                    Some(Ty::RowVal(inner)) => self.row_occurs(v, &inner),
                    Some(_) | None => false,
                }
            }
            Row::Extend(_, ty, rest) => self.occurs_in(v, ty) || self.row_occurs(v, rest),
        }
    }

    // ── Unification ──────────────────────────────────────────────────────

    /// `mgu`: the nine cases of §4.6, in order. `expected_origin` and
    /// `found_origin` track `t1`'s and `t2`'s provenance independently, so a
    /// resulting [`TypeError::Mismatch`] can point at both -- they're
    /// carried through every recursive call unchanged, since a mismatch
    /// found three levels into a function or row type still has the same
    /// two source positions responsible for it.
    pub fn unify(
        &mut self,
        t1: Ty,
        t2: Ty,
        expected_origin: ConstraintOrigin,
        found_origin: ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let r1 = self.resolve(t1);
        let r2 = self.resolve(t2);
        match (r1.clone(), r2.clone()) {
            (Ty::Fun(a1, b1), Ty::Fun(a2, b2)) => {
                self.unify(*a1, *a2, expected_origin.clone(), found_origin.clone())?;
                let b1 = self.resolve(*b1);
                let b2 = self.resolve(*b2);
                self.unify(b1, b2, expected_origin, found_origin)
            }
            (Ty::Var(u), Ty::Var(v)) if u == v => Ok(()),
            (Ty::Var(u), Ty::Var(v)) => self.union_constraints(u, v, expected_origin),
            (Ty::Var(v), t) | (t, Ty::Var(v)) => self.var_bind(v, t, expected_origin),
            (Ty::Int, Ty::Int)
            | (Ty::Dbl, Ty::Dbl)
            | (Ty::Bool, Ty::Bool)
            | (Ty::Char, Ty::Char)
            | (Ty::Text, Ty::Text) => Ok(()),
            (Ty::List(a), Ty::List(b)) => self.unify(*a, *b, expected_origin, found_origin),
            (Ty::Record(row1), Ty::Record(row2)) => self.unify_row(row1, row2, expected_origin),
            (Ty::Variant(row1), Ty::Variant(row2)) => self.unify_row(row1, row2, expected_origin),
            _ => Err(TypeError::Mismatch { expected: r1, expected_origin, found: r2, found_origin }),
        }
    }

    fn var_bind(&mut self, v: TyVar, ty: Ty, origin: ConstraintOrigin) -> Result<(), TypeError> {
        if self.occurs_in(v, &ty) {
            return Err(TypeError::OccursCheck { var: v, ty, origin });
        }
        self.table
            .unify_var_value(v, Some(ty))
            .expect("binding a var to a concrete type after occurs check should not fail");
        Ok(())
    }

    fn union_constraints(&mut self, u: TyVar, v: TyVar, origin: ConstraintOrigin) -> Result<(), TypeError> {
        if u == v {
            return Ok(());
        }
        match (self.kind_of(u), self.kind_of(v)) {
            (Kind::Star, Kind::Star) => {
                self.table
                    .unify_var_var(u, v)
                    .expect("unifying two unbound star vars should not fail");
                Ok(())
            }
            (Kind::Row, Kind::Row) => {
                let constraint = self.constraint_of(u).union(&self.constraint_of(v));
                let fresh = self.fresh_var_with(Kind::Row, constraint);
                let Ty::Var(fresh_var) = fresh else { unreachable!() };
                self.table
                    .unify_var_value(u, Some(Ty::RowVal(Row::Var(fresh_var))))
                    .expect("binding u to a fresh row var should not fail");
                self.table
                    .unify_var_value(v, Some(Ty::RowVal(Row::Var(fresh_var))))
                    .expect("binding v to a fresh row var should not fail");
                Ok(())
            }
            _ => Err(TypeError::KindMismatch { origin }),
        }
    }

    /// `mgu` case 6/8 for rows: `{ℓ:t|r} ~ row` via `rewrite_row`, plus the
    /// base cases (`{} ~ {}`, and the two variable cases).
    fn unify_row(&mut self, r1: Row, r2: Row, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let r1 = self.resolve_row(r1);
        let r2 = self.resolve_row(r2);
        match (r1, r2) {
            (Row::Empty, Row::Empty) => Ok(()),
            (Row::Var(a), Row::Var(b)) if a == b => Ok(()),
            (Row::Var(a), Row::Var(b)) => self.union_constraints(a, b, origin),
            (Row::Var(a), other) | (other, Row::Var(a)) => self.var_bind_row(a, other, origin),
            (Row::Extend(l1, t1, rest1), row2) => {
                let (t2, rest2, bound) = self.rewrite_row(row2, &l1, origin.clone())?;
                if let Row::Var(tail_var) = rest1.as_ref() {
                    if bound.contains(tail_var) {
                        return Err(TypeError::RecursiveRowType { origin });
                    }
                }
                self.unify(*t1, t2, origin.clone(), origin.clone())?;
                self.unify_row(*rest1, rest2, origin)
            }
            (row1, Row::Extend(l2, t2, rest2)) => {
                let (t1, rest1, bound) = self.rewrite_row(row1, &l2, origin.clone())?;
                if let Row::Var(tail_var) = rest2.as_ref() {
                    if bound.contains(tail_var) {
                        return Err(TypeError::RecursiveRowType { origin });
                    }
                }
                self.unify(t1, *t2, origin.clone(), origin.clone())?;
                self.unify_row(rest1, *rest2, origin)
            }
        }
    }

    /// `rewriteRow(row, ℓ)`: find `ℓ`'s type and the rest of `row`, allocating
    /// fresh variables (and binding them into the table) if `row` is open at
    /// a variable that doesn't yet mention `ℓ`. Returns the variables bound
    /// in the process, so the caller can check for row recursion.
    fn rewrite_row(
        &mut self,
        row: Row,
        label: &str,
        origin: ConstraintOrigin,
    ) -> Result<(Ty, Row, Vec<TyVar>), TypeError> {
        let row = self.resolve_row(row);
        match row {
            Row::Empty => Err(TypeError::LabelCannotBeInserted { label: label.to_string(), origin }),
            Row::Var(v) => {
                let (field_ty, beta) = self.split_open_row(v, label);
                Ok((field_ty, Row::Var(beta), vec![v]))
            }
            Row::Extend(l, t, rest) => {
                if l == label {
                    Ok((*t, *rest, Vec::new()))
                } else {
                    match *rest {
                        Row::Var(alpha) => {
                            let (field_ty, beta) = self.split_open_row(alpha, label);
                            Ok((field_ty, Row::Extend(l, t, Box::new(Row::Var(beta))), vec![alpha]))
                        }
                        other => {
                            let (field_ty, rest2, bound) = self.rewrite_row(other, label, origin)?;
                            Ok((field_ty, Row::Extend(l, t, Box::new(rest2)), bound))
                        }
                    }
                }
            }
        }
    }

    /// Bind an open row variable `v` to `{label: γ | β}` for fresh `γ, β`,
    /// carrying forward `v`'s own `lacks` constraint onto `β` alongside
    /// `lacks {label}`. Returns `γ` and `β`.
    fn split_open_row(&mut self, v: TyVar, label: &str) -> (Ty, TyVar) {
        let merged = self.constraint_of(v).union(&Constraint::lacks_one(label));
        let beta = self.fresh_var_with(Kind::Row, merged);
        let Ty::Var(beta_var) = beta else { unreachable!() };
        let gamma = self.fresh_var_with(Kind::Star, Constraint::None);
        self.table
            .unify_var_value(v, Some(Ty::RowVal(Row::Extend(label.to_string(), Box::new(gamma.clone()), Box::new(Row::Var(beta_var))))))
            .expect("binding a fresh open row should not fail");
        (gamma, beta_var)
    }

    /// `varBindRow(u, t)`.
    fn var_bind_row(&mut self, v: TyVar, row: Row, origin: ConstraintOrigin) -> Result<(), TypeError> {
        if self.row_occurs(v, &row) {
            return Err(TypeError::OccursCheck { var: v, ty: Ty::RowVal(row), origin });
        }
        let (fields, tail) = row_to_list(&row);
        let v_lacks = self.constraint_of(v).labels();
        let field_labels: BTreeSet<String> = fields.iter().map(|(l, _)| l.clone()).collect();
        let collision: Vec<String> = v_lacks.intersection(&field_labels).cloned().collect();
        if !collision.is_empty() {
            return Err(TypeError::RepeatedLabels { labels: collision, origin });
        }
        let final_row = match tail {
            Some(tail_var) => {
                let merged = v_lacks.union(&self.constraint_of(tail_var).labels()).cloned().collect::<BTreeSet<_>>();
                let merged_constraint = if merged.is_empty() { Constraint::None } else { Constraint::Lacks(merged) };
                let fresh = self.fresh_var_with(Kind::Row, merged_constraint);
                let Ty::Var(fresh_var) = fresh else { unreachable!() };
                self.table
                    .unify_var_value(tail_var, Some(Ty::RowVal(Row::Var(fresh_var))))
                    .expect("binding a row tail to a fresh var should not fail");
                mk_row(Row::Var(fresh_var), fields)
            }
            None => mk_row(Row::Empty, fields),
        };
        self.table
            .unify_var_value(v, Some(Ty::RowVal(final_row)))
            .expect("binding a row var after occurs/label checks should not fail");
        Ok(())
    }

    // ── Instantiation & generalization ──────────────────────────────────

    /// `instantiate(scheme)`: replace each quantified var with a fresh one
    /// of the same kind and constraint.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        let mut mapping: FxHashMap<TyVar, TyVar> = FxHashMap::default();
        for v in &scheme.vars {
            let (kind, constraint) = self.var_info.get(v.0 as usize).cloned().unwrap_or_default_info();
            let fresh = self.fresh_var_with(kind, constraint);
            let Ty::Var(fresh_var) = fresh else { unreachable!() };
            mapping.insert(*v, fresh_var);
        }
        substitute_vars(&scheme.ty, &mapping)
    }

    /// `generalise(t)`: quantify over `ftv(t') \ ftv(env')` after applying
    /// the current substitution to both.
    pub fn generalise(&mut self, env: &TypeEnv, ty: Ty) -> Scheme {
        let resolved = self.resolve(ty);
        let ty_vars = self.ftv(&resolved);
        let mut env_vars = BTreeSet::new();
        let scheme_tys: Vec<(Vec<TyVar>, Ty)> =
            env.schemes().map(|s| (s.vars.clone(), s.ty.clone())).collect();
        for (bound, ty) in scheme_tys {
            for v in self.ftv(&ty) {
                if !bound.contains(&v) {
                    env_vars.insert(v);
                }
            }
        }
        let vars: Vec<TyVar> = ty_vars.difference(&env_vars).copied().collect();
        Scheme { vars, ty: resolved }
    }
}

trait OrDefaultInfo {
    fn unwrap_or_default_info(self) -> (Kind, Constraint);
}

impl OrDefaultInfo for Option<(Kind, Constraint)> {
    fn unwrap_or_default_info(self) -> (Kind, Constraint) {
        self.unwrap_or((Kind::Star, Constraint::None))
    }
}

fn collect_ftv(ty: &Ty, out: &mut BTreeSet<TyVar>) {
    match ty {
        Ty::Var(v) => {
            out.insert(*v);
        }
        Ty::Fun(a, b) => {
            collect_ftv(a, out);
            collect_ftv(b, out);
        }
        Ty::List(t) => collect_ftv(t, out),
        Ty::Record(row) | Ty::Variant(row) | Ty::RowVal(row) => collect_ftv_row(row, out),
        Ty::Int | Ty::Dbl | Ty::Bool | Ty::Char | Ty::Text => {}
    }
}

fn collect_ftv_row(row: &Row, out: &mut BTreeSet<TyVar>) {
    match row {
        Row::Empty => {}
        Row::Var(v) => {
            out.insert(*v);
        }
        Row::Extend(_, ty, rest) => {
            collect_ftv(ty, out);
            collect_ftv_row(rest, out);
        }
    }
}

fn substitute_vars(ty: &Ty, mapping: &FxHashMap<TyVar, TyVar>) -> Ty {
    match ty {
        Ty::Var(v) => Ty::Var(*mapping.get(v).unwrap_or(v)),
        Ty::Fun(a, b) => Ty::Fun(Box::new(substitute_vars(a, mapping)), Box::new(substitute_vars(b, mapping))),
        Ty::List(t) => Ty::List(Box::new(substitute_vars(t, mapping))),
        Ty::Record(row) => Ty::Record(substitute_vars_row(row, mapping)),
        Ty::Variant(row) => Ty::Variant(substitute_vars_row(row, mapping)),
        Ty::RowVal(row) => Ty::RowVal(substitute_vars_row(row, mapping)),
        other => other.clone(),
    }
}

fn substitute_vars_row(row: &Row, mapping: &FxHashMap<TyVar, TyVar>) -> Row {
    match row {
        Row::Empty => Row::Empty,
        Row::Var(v) => Row::Var(*mapping.get(v).unwrap_or(v)),
        Row::Extend(label, ty, rest) => Row::Extend(
            label.clone(),
            Box::new(substitute_vars(ty, mapping)),
            Box::new(substitute_vars_row(rest, mapping)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purl_common::Pos;

    fn origin() -> ConstraintOrigin {
        ConstraintOrigin::Builtin { pos: Pos::synthetic() }
    }

    #[test]
    fn unifies_function_types() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var();
        let fun1 = Ty::fun(a.clone(), Ty::Int);
        let fun2 = Ty::fun(Ty::Bool, Ty::Int);
        assert!(ctx.unify(fun1, fun2, origin(), origin()).is_ok());
        assert_eq!(ctx.resolve(a), Ty::Bool);
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var();
        let Ty::Var(v) = a.clone() else { unreachable!() };
        let self_referential = Ty::fun(a.clone(), Ty::Int);
        let err = ctx.unify(a, self_referential, origin(), origin()).unwrap_err();
        assert!(matches!(err, TypeError::OccursCheck { var, .. } if var == v));
    }

    #[test]
    fn unifies_records_with_differently_ordered_labels() {
        let mut ctx = InferCtx::new();
        let row1 = Row::Extend("a".into(), Box::new(Ty::Int), Box::new(Row::Extend("b".into(), Box::new(Ty::Bool), Box::new(Row::Empty))));
        let row2 = Row::Extend("b".into(), Box::new(Ty::Bool), Box::new(Row::Extend("a".into(), Box::new(Ty::Int), Box::new(Row::Empty))));
        assert!(ctx.unify(Ty::Record(row1), Ty::Record(row2), origin(), origin()).is_ok());
    }

    #[test]
    fn unifies_open_record_by_inferring_missing_field() {
        let mut ctx = InferCtx::new();
        let r = ctx.fresh_var_with(Kind::Row, Constraint::None);
        let Ty::Var(rv) = r else { unreachable!() };
        let open = Ty::Record(Row::Extend("a".into(), Box::new(Ty::Int), Box::new(Row::Var(rv))));
        let closed = Ty::Record(Row::Extend(
            "a".into(),
            Box::new(Ty::Int),
            Box::new(Row::Extend("b".into(), Box::new(Ty::Bool), Box::new(Row::Empty))),
        ));
        assert!(ctx.unify(open, closed, origin(), origin()).is_ok());
        let resolved = ctx.resolve(Ty::Var(rv));
        assert_eq!(resolved, Ty::RowVal(Row::Extend("b".into(), Box::new(Ty::Bool), Box::new(Row::Empty))));
    }

    #[test]
    fn repeated_label_is_rejected_when_row_lacks_it() {
        let mut ctx = InferCtx::new();
        let r = ctx.fresh_var_with(Kind::Row, Constraint::lacks_one("a"));
        let Ty::Var(rv) = r else { unreachable!() };
        let row = Row::Extend("a".into(), Box::new(Ty::Int), Box::new(Row::Empty));
        let err = ctx.var_bind_row(rv, row, origin()).unwrap_err();
        assert!(matches!(err, TypeError::RepeatedLabels { .. }));
    }

    #[test]
    fn mismatched_ground_types_fail() {
        let mut ctx = InferCtx::new();
        let err = ctx.unify(Ty::Int, Ty::Bool, origin(), origin()).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn generalise_quantifies_over_vars_not_in_env() {
        let mut ctx = InferCtx::new();
        let env = TypeEnv::new();
        let a = ctx.fresh_var();
        let scheme = ctx.generalise(&env, Ty::fun(a.clone(), a));
        assert_eq!(scheme.vars.len(), 1);
    }

    #[test]
    fn instantiate_produces_fresh_unbound_vars() {
        let mut ctx = InferCtx::new();
        let env = TypeEnv::new();
        let a = ctx.fresh_var();
        let scheme = ctx.generalise(&env, Ty::fun(a.clone(), a));
        let t1 = ctx.instantiate(&scheme);
        let t2 = ctx.instantiate(&scheme);
        assert_ne!(t1, t2, "two instantiations should allocate distinct variables");
    }
}
