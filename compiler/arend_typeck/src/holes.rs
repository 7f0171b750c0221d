//! Holes and their solutions.

use arend_ir::Span;

use crate::term::{HoleId, Term};

#[derive(Clone, Debug)]
struct HoleEntry {
    ty: Term,
    span: Span,
    solution: Option<Term>,
}

/// Holes created while elaborating one definition.
#[derive(Clone, Debug, Default)]
pub struct Holes {
    entries: Vec<HoleEntry>,
}

impl Holes {
    pub fn fresh(&mut self, ty: Term, span: Span) -> HoleId {
        let id = HoleId::new(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.entries.push(HoleEntry {
            ty,
            span,
            solution: None,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ty(&self, hole: HoleId) -> Option<&Term> {
        self.entries.get(hole.index()).map(|entry| &entry.ty)
    }

    pub fn span(&self, hole: HoleId) -> Option<Span> {
        self.entries.get(hole.index()).map(|entry| entry.span)
    }

    pub fn solution(&self, hole: HoleId) -> Option<&Term> {
        self.entries.get(hole.index())?.solution.as_ref()
    }

    pub fn solve(&mut self, hole: HoleId, value: Term) {
        if let Some(entry) = self.entries.get_mut(hole.index()) {
            tracing::trace!(hole = hole.raw(), "solved");
            entry.solution = Some(value);
        }
    }

    /// Replace solved holes, recursively, by their solutions.
    pub fn zonk(&self, term: &Term) -> Term {
        term.map_holes(&mut |hole| self.solution(hole).map(|solution| self.zonk(solution)))
    }

    /// Unsolved holes created at or after `from`.
    pub fn unsolved_since(&self, from: usize) -> impl Iterator<Item = HoleId> + '_ {
        self.entries
            .iter()
            .enumerate()
            .skip(from)
            .filter(|(_, entry)| entry.solution.is_none())
            .map(|(index, _)| HoleId::new(u32::try_from(index).unwrap_or(u32::MAX)))
    }
}
