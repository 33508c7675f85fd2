/// The stack of enclosing command identifiers at a point in the tree.
///
/// A scope is an immutable value: `push` returns a child that borrows its
/// parent, so descending into a command never copies the stack and never
/// disturbs the scope seen by siblings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    ident: Option<&'a str>,
    parent: Option<&'a Scope<'a>>,
    depth: usize,
}

impl<'a> Scope<'a> {
    pub fn root() -> Self {
        Self::default()
    }

    /// Child scope with `ident` as the innermost command.
    pub fn push<'s>(&'s self, ident: &'s str) -> Scope<'s> {
        Scope {
            ident: Some(ident),
            parent: Some(self),
            depth: self.depth + 1,
        }
    }

    /// Number of enclosing commands.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn innermost(&self) -> Option<&'a str> {
        self.ident
    }

    /// Enclosing identifiers, innermost first.
    pub fn idents(&self) -> impl Iterator<Item = &'a str> + '_ {
        std::iter::successors(Some(self), |scope| scope.parent).filter_map(|scope| scope.ident)
    }

    pub fn is_descendant_of(&self, name: &str) -> bool {
        self.idents().any(|ident| ident == name)
    }
}
