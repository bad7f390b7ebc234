//! The lexical context stack.
//!
//! Name resolution happens while parsing: the parser keeps a stack of
//! frames, each mapping simple names to declarations. A frame is pushed
//! per namespace body, struct body, function (parameters and body share
//! one frame), and per declaration attempt (holding template parameters).
//!
//! Pushing duplicates the current top frame, so a new scope starts with
//! every visible name already bound — which also means re-declaring any
//! visible name inside the new frame is a duplicate, not a shadow.
//! Lookup still scans frames top-down so that bindings added to an outer
//! frame after a push (a function registered beneath its own body frame,
//! for recursion) remain visible.
//!
//! The stack is `Clone`; speculative parse rules snapshot it wholesale
//! and restore the copy on failure, which makes rollback of provisional
//! registrations exact.

use crate::ast::{DeclId, Symbol};
use rustc_hash::FxHashMap;

type Frame = FxHashMap<Symbol, DeclId>;

/// Binding already present in the top frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateName;

/// Name not bound in the top frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotBound;

/// A stack of name-to-declaration frames.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    /// Bottom first; the top of the stack is the last element.
    frames: Vec<Frame>,
}

impl ContextStack {
    /// A context with a single empty root frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a new frame, inheriting every binding visible in the current
    /// top frame.
    pub fn push(&mut self) {
        let top = self.frames.last().cloned().unwrap_or_default();
        self.frames.push(top);
    }

    /// Drop the top frame.
    pub fn pop(&mut self) {
        debug_assert!(!self.frames.is_empty(), "context stack underflow");
        self.frames.pop();
    }

    /// Drop frames until the stack is `depth` deep again.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    /// Bind `name` in the top frame.
    pub fn add(&mut self, name: Symbol, decl: DeclId) -> Result<(), DuplicateName> {
        let top = self.frames.len() - 1;
        self.add_in_frame(top, name, decl)
    }

    /// Bind `name` in the frame at `index` (0 = bottom).
    ///
    /// Used to register a function in its enclosing frame while its
    /// parameter/body frame is already on top, so the body can resolve
    /// recursive calls.
    pub fn add_in_frame(
        &mut self,
        index: usize,
        name: Symbol,
        decl: DeclId,
    ) -> Result<(), DuplicateName> {
        let frame = &mut self.frames[index];
        if frame.contains_key(&name) {
            return Err(DuplicateName);
        }
        frame.insert(name, decl);
        Ok(())
    }

    /// Unbind `name` from the top frame.
    pub fn remove(&mut self, name: Symbol) -> Result<(), NotBound> {
        let frame = self.frames.last_mut().expect("context stack underflow");
        match frame.remove(&name) {
            Some(_) => Ok(()),
            None => Err(NotBound),
        }
    }

    /// Find the first binding for `name`, scanning frames top-down.
    pub fn lookup_simple(&self, name: Symbol) -> Option<DeclId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::ast::{Decl, DeclKind, Type, VarDecl, VarInit};
    use crate::span::Location;
    use string_interner::DefaultStringInterner;

    fn var(arena: &mut Arena<Decl>, name: Symbol) -> DeclId {
        arena.alloc(Decl {
            name,
            loc: Location::UNKNOWN,
            kind: DeclKind::Var(VarDecl {
                ty: Type::Int,
                init: VarInit::None,
            }),
        })
    }

    #[test]
    fn test_add_then_lookup() {
        let mut interner: DefaultStringInterner = DefaultStringInterner::new();
        let mut arena = Arena::new();
        let mut ctx = ContextStack::new();

        let x = interner.get_or_intern("x");
        let decl = var(&mut arena, x);
        ctx.add(x, decl).unwrap();
        assert_eq!(ctx.lookup_simple(x), Some(decl));
    }

    #[test]
    fn test_duplicate_in_one_frame_rejected() {
        let mut interner: DefaultStringInterner = DefaultStringInterner::new();
        let mut arena = Arena::new();
        let mut ctx = ContextStack::new();

        let x = interner.get_or_intern("x");
        let first = var(&mut arena, x);
        let second = var(&mut arena, x);
        ctx.add(x, first).unwrap();
        assert_eq!(ctx.add(x, second), Err(DuplicateName));
    }

    #[test]
    fn test_push_inherits_and_rejects_shadowing() {
        let mut interner: DefaultStringInterner = DefaultStringInterner::new();
        let mut arena = Arena::new();
        let mut ctx = ContextStack::new();

        let x = interner.get_or_intern("x");
        let outer = var(&mut arena, x);
        ctx.add(x, outer).unwrap();

        ctx.push();
        // Inherited binding is visible and counts as a duplicate.
        assert_eq!(ctx.lookup_simple(x), Some(outer));
        let inner = var(&mut arena, x);
        assert_eq!(ctx.add(x, inner), Err(DuplicateName));
        ctx.pop();
        assert_eq!(ctx.lookup_simple(x), Some(outer));
    }

    #[test]
    fn test_binding_below_top_is_visible() {
        let mut interner: DefaultStringInterner = DefaultStringInterner::new();
        let mut arena = Arena::new();
        let mut ctx = ContextStack::new();

        ctx.push();
        let f = interner.get_or_intern("f");
        let decl = var(&mut arena, f);
        // Bind in the enclosing frame while a fresh frame is on top.
        ctx.add_in_frame(0, f, decl).unwrap();
        assert_eq!(ctx.lookup_simple(f), Some(decl));
        ctx.pop();
        assert_eq!(ctx.lookup_simple(f), Some(decl));
    }

    #[test]
    fn test_remove_unbinds_top_only() {
        let mut interner: DefaultStringInterner = DefaultStringInterner::new();
        let mut arena = Arena::new();
        let mut ctx = ContextStack::new();

        let x = interner.get_or_intern("x");
        let decl = var(&mut arena, x);
        ctx.add(x, decl).unwrap();
        assert_eq!(ctx.remove(x), Ok(()));
        assert_eq!(ctx.lookup_simple(x), None);
        assert_eq!(ctx.remove(x), Err(NotBound));
    }

    #[test]
    fn test_truncate_restores_depth() {
        let mut ctx = ContextStack::new();
        let depth = ctx.depth();
        ctx.push();
        ctx.push();
        ctx.truncate(depth);
        assert_eq!(ctx.depth(), depth);
    }
}
