use crate::search::{GroundAction, GroundAxiom};
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;
use tracing::debug;

/// Notifications from the binding generators. All hooks default to no-ops;
/// implementors observe, they cannot veto.
pub trait BindingEventHandler: Debug {
    /// A candidate binding survived the consistency-graph search but failed
    /// full validation (or raised a numeric error). Observational only: the
    /// binding is dropped, the generation continues.
    fn on_invalid_binding(&mut self, binding: &[usize]) {
        let _ = binding;
    }
}

#[derive(Debug, Default)]
pub struct DefaultBindingEventHandler;

impl BindingEventHandler for DefaultBindingEventHandler {}

/// Notifications from the lifted applicable-action generator.
pub trait LaagEventHandler: Debug {
    fn on_start_generating_applicable_actions(&mut self) {}

    fn on_ground_action(&mut self, action: &GroundAction) {
        let _ = action;
    }

    fn on_ground_action_cache_hit(&mut self) {}

    fn on_ground_action_cache_miss(&mut self) {}

    fn on_end_generating_applicable_actions(&mut self) {}

    fn on_finish_search_layer(&mut self) {}

    fn on_end_search(&mut self) {}
}

#[derive(Debug, Default)]
pub struct DefaultLaagEventHandler;

impl LaagEventHandler for DefaultLaagEventHandler {}

/// Notifications from the axiom evaluator.
pub trait AxiomEventHandler: Debug {
    fn on_start_generating_applicable_axioms(&mut self) {}

    fn on_ground_axiom(&mut self, axiom: &GroundAxiom) {
        let _ = axiom;
    }

    fn on_ground_axiom_cache_hit(&mut self) {}

    fn on_ground_axiom_cache_miss(&mut self) {}

    fn on_end_generating_applicable_axioms(&mut self) {}
}

#[derive(Debug, Default)]
pub struct DefaultAxiomEventHandler;

impl AxiomEventHandler for DefaultAxiomEventHandler {}

/// Counters shared between a [`CountingEventHandler`] and the code that
/// wants to read them after the generators have taken ownership of the
/// handler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerationCounts {
    pub ground_actions: usize,
    pub action_cache_hits: usize,
    pub action_cache_misses: usize,
    pub ground_axioms: usize,
    pub axiom_cache_hits: usize,
    pub axiom_cache_misses: usize,
    pub invalid_bindings: usize,
}

#[derive(Debug, Default, Clone)]
pub struct SharedGenerationCounts {
    inner: Rc<RefCell<GenerationCounts>>,
}

impl SharedGenerationCounts {
    pub fn snapshot(&self) -> GenerationCounts {
        *self.inner.borrow()
    }
}

/// An event handler that counts what it sees and reports the totals at the
/// end of every generation round.
#[derive(Debug)]
pub struct CountingEventHandler {
    counts: SharedGenerationCounts,
}

impl CountingEventHandler {
    pub fn new(counts: SharedGenerationCounts) -> Self {
        Self { counts }
    }
}

impl BindingEventHandler for CountingEventHandler {
    fn on_invalid_binding(&mut self, _binding: &[usize]) {
        self.counts.inner.borrow_mut().invalid_bindings += 1;
    }
}

impl LaagEventHandler for CountingEventHandler {
    fn on_ground_action(&mut self, _action: &GroundAction) {
        self.counts.inner.borrow_mut().ground_actions += 1;
    }

    fn on_ground_action_cache_hit(&mut self) {
        self.counts.inner.borrow_mut().action_cache_hits += 1;
    }

    fn on_ground_action_cache_miss(&mut self) {
        self.counts.inner.borrow_mut().action_cache_misses += 1;
    }

    fn on_end_generating_applicable_actions(&mut self) {
        let counts = self.counts.snapshot();
        debug!(
            "Generated {} ground actions so far ({} cache hits, {} cache misses, {} invalid bindings)",
            counts.ground_actions,
            counts.action_cache_hits,
            counts.action_cache_misses,
            counts.invalid_bindings
        );
    }
}

impl AxiomEventHandler for CountingEventHandler {
    fn on_ground_axiom(&mut self, _axiom: &GroundAxiom) {
        self.counts.inner.borrow_mut().ground_axioms += 1;
    }

    fn on_ground_axiom_cache_hit(&mut self) {
        self.counts.inner.borrow_mut().axiom_cache_hits += 1;
    }

    fn on_ground_axiom_cache_miss(&mut self) {
        self.counts.inner.borrow_mut().axiom_cache_misses += 1;
    }

    fn on_end_generating_applicable_axioms(&mut self) {
        let counts = self.counts.snapshot();
        debug!(
            "Generated {} ground axioms so far ({} cache hits, {} cache misses)",
            counts.ground_axioms, counts.axiom_cache_hits, counts.axiom_cache_misses
        );
    }
}
