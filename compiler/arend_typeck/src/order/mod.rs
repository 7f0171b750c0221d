//! Dependency ordering.
//!
//! Tarjan's algorithm over the unit dependency graph. Components come out in
//! topological order: every component appears after each component it
//! depends on, so checking them in order never needs a signature that has
//! not been checked yet.

use arend_ir::DefId;
use arend_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet};

/// Strongly connected components of the units reachable from `roots`,
/// dependencies first. Members of a component are sorted.
///
/// `deps` lists the outgoing edges of a unit. Roots are explored in order,
/// so the components reachable from the first root come first.
pub fn components<F>(roots: &[DefId], deps: F) -> Vec<Vec<DefId>>
where
    F: Fn(DefId) -> Vec<DefId>,
{
    let mut finder = ComponentFinder::new(deps);
    for root in roots {
        finder.connect(*root);
    }
    finder.components
}

/// Like [`components`], but the components `focus` reaches come first.
pub fn components_with_focus<F>(roots: &[DefId], focus: Option<DefId>, deps: F) -> Vec<Vec<DefId>>
where
    F: Fn(DefId) -> Vec<DefId>,
{
    match focus {
        Some(focus) => {
            let mut ordered = Vec::with_capacity(roots.len() + 1);
            ordered.push(focus);
            ordered.extend(roots.iter().copied().filter(|root| *root != focus));
            components(&ordered, deps)
        }
        None => components(roots, deps),
    }
}

struct ComponentFinder<F> {
    deps: F,
    index: usize,

    indices: FxHashMap<DefId, usize>,
    lowlinks: FxHashMap<DefId, usize>,

    stack: Vec<DefId>,
    on_stack: FxHashSet<DefId>,

    components: Vec<Vec<DefId>>,
}

impl<F> ComponentFinder<F>
where
    F: Fn(DefId) -> Vec<DefId>,
{
    fn new(deps: F) -> Self {
        ComponentFinder {
            deps,
            index: 0,
            indices: FxHashMap::default(),
            lowlinks: FxHashMap::default(),
            stack: Vec::new(),
            on_stack: FxHashSet::default(),
            components: Vec::new(),
        }
    }

    fn connect(&mut self, vertex: DefId) {
        if self.indices.contains_key(&vertex) {
            return;
        }
        ensure_sufficient_stack(|| self.visit(vertex));
    }

    fn visit(&mut self, vertex: DefId) {
        let index = self.index;
        self.indices.insert(vertex, index);
        self.lowlinks.insert(vertex, index);
        self.index += 1;

        self.stack.push(vertex);
        self.on_stack.insert(vertex);

        for child in (self.deps)(vertex) {
            if let Some(&child_index) = self.indices.get(&child) {
                if self.on_stack.contains(&child) {
                    self.lower(vertex, child_index);
                }
            } else {
                self.connect(child);
                let child_low = self.lowlinks.get(&child).copied().unwrap_or(usize::MAX);
                self.lower(vertex, child_low);
            }
        }

        if self.lowlinks.get(&vertex) == Some(&index) {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(&member);
                component.push(member);
                if member == vertex {
                    break;
                }
            }
            component.sort_unstable();
            self.components.push(component);
        }
    }

    fn lower(&mut self, vertex: DefId, candidate: usize) {
        if let Some(low) = self.lowlinks.get_mut(&vertex) {
            *low = (*low).min(candidate);
        }
    }
}
