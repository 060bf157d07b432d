//! Row-polymorphic Hindley-Milner type inference.
//!
//! Takes the elaborated, import-resolved AST `purl-parser` produces and
//! assigns it a principal type scheme, or fails with a positioned
//! [`error::TypeError`]. See [`infer::type_inference`] for the entry point.

pub mod diagnostics;
pub mod env;
pub mod error;
pub mod infer;
pub mod ty;
pub mod unify;

pub use env::TypeEnv;
pub use error::{ConstraintOrigin, TypeError};
pub use infer::{ty_of_annotation, type_inference};
pub use ty::{Constraint, Kind, Row, Scheme, Ty, TyVar};
pub use unify::InferCtx;
