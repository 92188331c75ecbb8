//! Scope chain used during analysis

use std::collections::HashMap;
use crate::error::{PanicResult, SourceLocation, semantic_error};
use crate::ir::EntityId;

/// Ambient facts inherited by nested scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScopeFlags {
    pub in_loop: bool,
    pub function: Option<EntityId>,
    pub class: Option<EntityId>,
}

#[derive(Debug, Default)]
struct Scope {
    names: HashMap<String, EntityId>,
    flags: ScopeFlags,
}

#[derive(Debug)]
pub struct Context {
    scopes: Vec<Scope>,
}

impl Context {
    /// Root scope seeded with the standard library.
    pub fn root<'a>(library: impl IntoIterator<Item = (&'a str, EntityId)>) -> Self {
        let names = library
            .into_iter()
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        Self { scopes: vec![Scope { names, flags: ScopeFlags::default() }] }
    }

    /// Enters a child scope. Callers derive `flags` from [`Context::flags`]
    /// with their overrides applied.
    pub fn push(&mut self, flags: ScopeFlags) {
        self.scopes.push(Scope { names: HashMap::new(), flags });
    }

    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn flags(&self) -> ScopeFlags {
        self.scopes.last().map(|s| s.flags).unwrap_or_default()
    }

    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.scopes.iter().rev().find_map(|s| s.names.get(name).copied())
    }

    pub fn lookup_local(&self, name: &str) -> Option<EntityId> {
        self.scopes.last().and_then(|s| s.names.get(name).copied())
    }

    /// Binds `name` in the innermost scope; shadowing outer scopes is fine.
    pub fn declare(&mut self, name: &str, id: EntityId, loc: SourceLocation) -> PanicResult<()> {
        if self.lookup_local(name).is_some() {
            return Err(semantic_error(loc, format!("Identifier {} already declared", name)));
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.names.insert(name.to_string(), id);
        }
        Ok(())
    }
}
