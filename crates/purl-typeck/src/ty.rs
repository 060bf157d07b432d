//! Type representation: monomorphic types, extensible rows, and
//! polymorphic type schemes.
//!
//! Mirrors the reference compiler's `Ty`/`TyVar`/`Scheme` split (see its
//! `mesh-typeck::ty`), generalized with a second variable kind (`Row`, for
//! extensible records and polymorphic variants) and row types in place of
//! the reference compiler's `App`/`Tuple` container types, which this
//! front end's closed primitive set has no use for.

use std::collections::BTreeSet;
use std::fmt;

/// A type variable, identified by a `u32` index into the unification table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TyVar(pub u32);

/// The two sorts of type variable this system quantifies over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Star,
    Row,
}

/// A constraint carried by a type variable.
///
/// `Lacks` restricts a `Row`-kinded variable to rows that do not already
/// contain the given labels, so it is safe to extend with them. `Class`
/// constraints come from a user-written `forall` and are recorded on the
/// variable but, per the inferencer, not otherwise enforced.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Constraint {
    #[default]
    None,
    Lacks(BTreeSet<String>),
    Class(Vec<String>),
}

impl Constraint {
    pub fn lacks_one(label: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(label.into());
        Constraint::Lacks(set)
    }

    pub fn labels(&self) -> BTreeSet<String> {
        match self {
            Constraint::Lacks(labels) => labels.clone(),
            Constraint::None | Constraint::Class(_) => BTreeSet::new(),
        }
    }

    /// Union two row constraints together; used by `unionConstraints` and
    /// `varBindRow` when two row variables collapse into one.
    pub fn union(&self, other: &Constraint) -> Constraint {
        let merged = self
            .labels()
            .union(&other.labels())
            .cloned()
            .collect::<BTreeSet<_>>();
        if merged.is_empty() {
            Constraint::None
        } else {
            Constraint::Lacks(merged)
        }
    }
}

/// An extensible row: an ordered spine of labeled fields, closed by
/// `Empty` or left open at a row variable.
///
/// Field order in the spine is insertion order, not a canonical one --
/// `unify`'s `rewriteRow` is what lets two rows with differently-ordered
/// labels still unify.
#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    Empty,
    Extend(String, Box<Ty>, Box<Row>),
    Var(TyVar),
}

/// A purl type. The primitive AST's closed `Prim` set only ever needs
/// these six shapes -- there is no user-defined nominal type constructor
/// beyond the transparent synonyms elaborated away before inference sees
/// them.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    Var(TyVar),
    Int,
    Dbl,
    Bool,
    Char,
    Text,
    Fun(Box<Ty>, Box<Ty>),
    List(Box<Ty>),
    Record(Row),
    Variant(Row),
    /// A bare row, bound only to a `Row`-kinded variable. Never appears as
    /// the argument of `Fun`, `List`, or anywhere but a unification binding.
    RowVal(Row),
}

impl Ty {
    pub fn fun(arg: Ty, ret: Ty) -> Ty {
        Ty::Fun(Box::new(arg), Box::new(ret))
    }

    pub fn list(elem: Ty) -> Ty {
        Ty::List(Box::new(elem))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "t{}", v.0),
            Ty::Int => write!(f, "Int"),
            Ty::Dbl => write!(f, "Dbl"),
            Ty::Bool => write!(f, "Bool"),
            Ty::Char => write!(f, "Char"),
            Ty::Text => write!(f, "Text"),
            Ty::Fun(a, b) => write!(f, "({} -> {})", a, b),
            Ty::List(t) => write!(f, "[{}]", t),
            Ty::Record(row) => write!(f, "{{{}}}", row),
            Ty::Variant(row) => write!(f, "<{}>", row),
            Ty::RowVal(row) => write!(f, "{}", row),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fields, tail) = row_to_list(self);
        for (i, (label, ty)) in fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", label, ty)?;
        }
        match tail {
            Some(v) => {
                if !fields.is_empty() {
                    write!(f, " | ")?;
                }
                write!(f, "t{}", v.0)
            }
            None => Ok(()),
        }
    }
}

/// Linearize a row spine into its fields (in spine order) and an optional
/// open tail variable. The dual of [`mk_row`].
pub fn row_to_list(row: &Row) -> (Vec<(String, Ty)>, Option<TyVar>) {
    let mut fields = Vec::new();
    let mut cur = row;
    loop {
        match cur {
            Row::Empty => return (fields, None),
            Row::Var(v) => return (fields, Some(*v)),
            Row::Extend(label, ty, rest) => {
                fields.push((label.clone(), (**ty).clone()));
                cur = rest;
            }
        }
    }
}

/// Build a canonical right-nested row spine from a tail and a field list.
pub fn mk_row(tail: Row, fields: Vec<(String, Ty)>) -> Row {
    fields
        .into_iter()
        .rev()
        .fold(tail, |acc, (label, ty)| Row::Extend(label, Box::new(ty), Box::new(acc)))
}

/// The `label -> type` mapping of a row, rejecting duplicate labels.
pub fn row_to_map(row: &Row) -> Result<rustc_hash::FxHashMap<String, Ty>, String> {
    let (fields, _) = row_to_list(row);
    let mut map = rustc_hash::FxHashMap::default();
    for (label, ty) in fields {
        if map.insert(label.clone(), ty).is_some() {
            return Err(label);
        }
    }
    Ok(map)
}

/// A polymorphic type scheme: a type with universally quantified
/// variables, each possibly `Row`-kinded and possibly `lacks`-constrained.
#[derive(Clone, Debug, PartialEq)]
pub struct Scheme {
    pub vars: Vec<TyVar>,
    pub ty: Ty,
}

impl Scheme {
    pub fn mono(ty: Ty) -> Self {
        Scheme { vars: Vec::new(), ty }
    }
}

// ── ena trait implementations ───────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_round_trips_through_list_and_mk() {
        let row = Row::Extend(
            "a".to_string(),
            Box::new(Ty::Int),
            Box::new(Row::Extend("b".to_string(), Box::new(Ty::Bool), Box::new(Row::Var(TyVar(0))))),
        );
        let (fields, tail) = row_to_list(&row);
        assert_eq!(fields, vec![("a".to_string(), Ty::Int), ("b".to_string(), Ty::Bool)]);
        assert_eq!(tail, Some(TyVar(0)));

        let rebuilt = mk_row(Row::Var(TyVar(0)), fields);
        assert_eq!(rebuilt, row);
    }

    #[test]
    fn row_to_map_rejects_duplicate_labels() {
        let row = Row::Extend(
            "a".to_string(),
            Box::new(Ty::Int),
            Box::new(Row::Extend("a".to_string(), Box::new(Ty::Bool), Box::new(Row::Empty))),
        );
        assert_eq!(row_to_map(&row), Err("a".to_string()));
    }

    #[test]
    fn display_renders_open_record() {
        let row = Row::Extend("x".to_string(), Box::new(Ty::Int), Box::new(Row::Var(TyVar(3))));
        let ty = Ty::Record(row);
        assert_eq!(ty.to_string(), "{x: Int | t3}");
    }
}
