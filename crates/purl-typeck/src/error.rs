//! Type error types with provenance tracking.
//!
//! Every type error carries a [`ConstraintOrigin`] recording where the
//! constraint it violates was generated, the same provenance-tracking
//! discipline as the reference compiler's `mesh-typeck::error`, scaled down
//! to the handful of constraint sites this smaller expression language
//! actually has (no pattern matching, structs, or actor blocks to report
//! on, per the feature non-goals).

use std::fmt;

use purl_common::Pos;

use crate::ty::{Ty, TyVar};

/// Where a unification constraint came from, for attributing an error to a
/// specific source location and shape of explanation.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintOrigin {
    /// `App e1 e2`: the argument's type must match the function's domain.
    Application { pos: Pos },
    /// An explicit `e : T` / `(b : T) -> e` / `let (b : T) = e1 in e2` annotation.
    Annotation { pos: Pos },
    /// `tiBinds` unifying a lambda or let binder's shape against its value type.
    Binding { pos: Pos },
    /// A primitive's built-in type (e.g. `Cond`'s branches, `Add`'s operands).
    Builtin { pos: Pos },
}

impl ConstraintOrigin {
    pub fn pos(&self) -> &Pos {
        match self {
            ConstraintOrigin::Application { pos }
            | ConstraintOrigin::Annotation { pos }
            | ConstraintOrigin::Binding { pos }
            | ConstraintOrigin::Builtin { pos } => pos,
        }
    }
}

/// A type error encountered during inference, unification, or annotation
/// elaboration. Every variant carries enough information to explain the
/// failure and point at a source position.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// Two types that should be equal are not. `expected` and `found` each
    /// carry their own origin -- per §7, unification failures must be able
    /// to point at where the expected type was required and, separately,
    /// where the found type was actually inferred, since those are
    /// frequently two different source positions (e.g. an annotation on
    /// one line and the value it disagrees with on another).
    Mismatch { expected: Ty, expected_origin: ConstraintOrigin, found: Ty, found_origin: ConstraintOrigin },
    /// A type variable occurs in the type it is being bound to.
    OccursCheck { var: TyVar, ty: Ty, origin: ConstraintOrigin },
    /// A `Star`-kinded variable met a `Row`-kinded one (or vice versa).
    KindMismatch { origin: ConstraintOrigin },
    /// `varBindRow` found labels both already present in the row being
    /// bound to and excluded by the variable's `lacks` constraint.
    RepeatedLabels { labels: Vec<String>, origin: ConstraintOrigin },
    /// `rewriteRow` reached an empty row while still looking for a label.
    LabelCannotBeInserted { label: String, origin: ConstraintOrigin },
    /// Case 8 of `mgu`: a row variable's tail would have to contain itself.
    RecursiveRowType { origin: ConstraintOrigin },
    /// `Var x` referenced a name with no binding in scope.
    UnboundVariable { name: String, pos: Pos },
    /// A `forall` or synonym body referenced a type variable never bound
    /// by an enclosing `forall`.
    UnboundTypeVariable { name: String, pos: Pos },
    /// A `forall`'s constraint clause named a type variable its own
    /// parameter list never introduced.
    UnknownConstraintVariable { name: String, pos: Pos },
    /// A record wildcard binder (`{..}`) was used against a type that
    /// never resolves to a closed record.
    RecordWildcardNotARecord { ty: Ty, pos: Pos },
    /// A type synonym was referenced with the wrong number of arguments.
    SynonymArityMismatch { name: String, expected: usize, found: usize, pos: Pos },
    /// A type synonym name has no declaration in scope.
    UnknownSynonym { name: String, pos: Pos },
}

impl TypeError {
    pub fn pos(&self) -> &Pos {
        match self {
            TypeError::Mismatch { expected_origin, .. } => expected_origin.pos(),
            TypeError::OccursCheck { origin, .. }
            | TypeError::KindMismatch { origin }
            | TypeError::RepeatedLabels { origin, .. }
            | TypeError::LabelCannotBeInserted { origin, .. }
            | TypeError::RecursiveRowType { origin } => origin.pos(),
            TypeError::UnboundVariable { pos, .. }
            | TypeError::UnboundTypeVariable { pos, .. }
            | TypeError::UnknownConstraintVariable { pos, .. }
            | TypeError::RecordWildcardNotARecord { pos, .. }
            | TypeError::SynonymArityMismatch { pos, .. }
            | TypeError::UnknownSynonym { pos, .. } => pos,
        }
    }

    /// The second position of a [`TypeError::Mismatch`], where `found` was
    /// actually inferred. `None` for every other variant.
    pub fn found_pos(&self) -> Option<&Pos> {
        match self {
            TypeError::Mismatch { found_origin, .. } => Some(found_origin.pos()),
            _ => None,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Mismatch { expected, found, .. } => {
                write!(f, "type mismatch: expected `{}`, found `{}`", expected, found)
            }
            TypeError::OccursCheck { var, ty, .. } => {
                write!(f, "infinite type: `t{}` occurs in `{}`", var.0, ty)
            }
            TypeError::KindMismatch { .. } => write!(f, "kind mismatch between a type and a row variable"),
            TypeError::RepeatedLabels { labels, .. } => {
                write!(f, "repeated label(s): {}", labels.join(", "))
            }
            TypeError::LabelCannotBeInserted { label, .. } => {
                write!(f, "label `{}` cannot be inserted into a closed row", label)
            }
            TypeError::RecursiveRowType { .. } => write!(f, "recursive row type"),
            TypeError::UnboundVariable { name, .. } => write!(f, "unbound variable `{}`", name),
            TypeError::UnboundTypeVariable { name, .. } => write!(f, "unbound type variable `{}`", name),
            TypeError::UnknownConstraintVariable { name, .. } => {
                write!(f, "constraint references unknown type variable `{}`", name)
            }
            TypeError::RecordWildcardNotARecord { ty, .. } => {
                write!(f, "record wildcard cannot bind to type: `{}`", ty)
            }
            TypeError::SynonymArityMismatch { name, expected, found, .. } => {
                write!(f, "type synonym `{}` expects {} argument(s), found {}", name, expected, found)
            }
            TypeError::UnknownSynonym { name, .. } => write!(f, "unknown type synonym `{}`", name),
        }
    }
}

impl std::error::Error for TypeError {}
