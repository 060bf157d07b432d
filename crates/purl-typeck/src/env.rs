//! Lexical scoping for term-level bindings.
//!
//! Mirrors the reference compiler's scope-stack `TypeEnv` (`mesh-typeck::env`,
//! threaded through its inferencer as `env: &mut TypeEnv`): a stack of
//! name -> scheme maps, searched innermost scope first. `Lam`/`Let` push a
//! scope before extending it and pop on the way back out, rather than
//! saving and restoring individual bindings.

use rustc_hash::FxHashMap;

use crate::ty::Scheme;

#[derive(Debug)]
pub struct TypeEnv {
    scopes: Vec<FxHashMap<String, Scheme>>,
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeEnv {
    pub fn new() -> Self {
        TypeEnv { scopes: vec![FxHashMap::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the root scope");
    }

    pub fn insert(&mut self, name: String, scheme: Scheme) {
        self.scopes.last_mut().expect("at least one scope").insert(name, scheme);
    }

    pub fn lookup(&self, name: &str) -> Option<Scheme> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).cloned())
    }

    /// Every scheme currently visible, across all open scopes. Used by
    /// `generalise` to compute `ftv(env)`.
    pub fn schemes(&self) -> impl Iterator<Item = &Scheme> {
        self.scopes.iter().flat_map(|scope| scope.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Ty;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut env = TypeEnv::new();
        env.insert("x".to_string(), Scheme::mono(Ty::Int));
        env.push_scope();
        env.insert("x".to_string(), Scheme::mono(Ty::Bool));
        assert_eq!(env.lookup("x").unwrap().ty, Ty::Bool);
        env.pop_scope();
        assert_eq!(env.lookup("x").unwrap().ty, Ty::Int);
    }

    #[test]
    fn missing_name_is_none() {
        let env = TypeEnv::new();
        assert!(env.lookup("nope").is_none());
    }
}
