use crate::formalism::{AxiomSchema, Predicate, PredicateCategory, StructuralError};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// How one derived predicate may be placed relative to another for the
/// axioms to have a well-founded reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Dependency {
    Unconstrained,
    /// A positive body occurrence: the body predicate must be defined no
    /// later than the head predicate.
    LowerOrEqual,
    /// A negative body occurrence: the body predicate must be fully defined
    /// strictly before the head predicate.
    StrictlyLower,
}

/// One stratum of the axiom set, with the per-stratum metadata the evaluator
/// needs.
#[derive(Debug)]
pub struct AxiomPartition {
    /// Axiom indices of the stratum, ascending.
    axioms: Vec<usize>,
    /// Axioms whose body mentions no derived predicate defined in this
    /// stratum; only they can fire before the stratum has produced anything.
    initially_relevant_axioms: Vec<usize>,
    /// For each derived predicate defined in this stratum, the axioms of the
    /// stratum whose body mentions it positively. Deriving a new atom of the
    /// predicate wakes exactly these.
    axioms_by_body_predicate: HashMap<usize, Vec<usize>>,
}

impl AxiomPartition {
    pub fn axioms(&self) -> &[usize] {
        &self.axioms
    }

    pub fn initially_relevant_axioms(&self) -> &[usize] {
        &self.initially_relevant_axioms
    }

    pub fn axioms_with_body_predicate(&self, predicate_index: usize) -> &[usize] {
        self.axioms_by_body_predicate
            .get(&predicate_index)
            .map_or(&[], |axioms| axioms.as_slice())
    }
}

/// Partition the axioms into strata admitting a well-founded evaluation
/// order: within a stratum all body dependencies are on the same or earlier
/// strata, and negative dependencies only cross strata. Axioms land in the
/// stratum of their head predicate. Fails iff some predicate transitively
/// requires itself to be strictly lower, i.e. there is a cycle through a
/// negation.
///
/// This is the textbook stratification of Thiébaux, Hoffmann and Nebel
/// ("In Defense of PDDL Axioms", IJCAI 2003), run on the derived-predicate
/// dependency matrix.
pub fn compute_axiom_partitioning(
    axioms: &[AxiomSchema],
    derived_predicates: &[Predicate],
) -> Result<Vec<AxiomPartition>, StructuralError> {
    let num_predicates = derived_predicates.len();
    let mut dependency = vec![vec![Dependency::Unconstrained; num_predicates]; num_predicates];

    for axiom in axioms {
        let head = axiom.head().predicate_index();
        for literal in axiom.body().all_literals(PredicateCategory::Derived) {
            let body = literal.predicate_index();
            let strength = if literal.is_negated() {
                Dependency::StrictlyLower
            } else {
                Dependency::LowerOrEqual
            };
            dependency[body][head] = dependency[body][head].max(strength);
        }
    }

    // Transitive closure; a path is strict if any of its edges is.
    for j in 0..num_predicates {
        for i in 0..num_predicates {
            if dependency[i][j] == Dependency::Unconstrained {
                continue;
            }
            for k in 0..num_predicates {
                if dependency[j][k] == Dependency::Unconstrained {
                    continue;
                }
                let through = dependency[i][j].max(dependency[j][k]);
                dependency[i][k] = dependency[i][k].max(through);
            }
        }
    }

    if (0..num_predicates).any(|i| dependency[i][i] == Dependency::StrictlyLower) {
        return Err(StructuralError::Unstratifiable);
    }

    // Peel off strata: a predicate can go into the current stratum when no
    // remaining predicate must be strictly below it.
    let mut remaining: BTreeSet<usize> = (0..num_predicates).collect();
    let mut predicate_strata: Vec<BTreeSet<usize>> = Vec::new();
    while !remaining.is_empty() {
        let stratum: BTreeSet<usize> = remaining
            .iter()
            .copied()
            .filter(|&i| {
                remaining
                    .iter()
                    .all(|&j| dependency[j][i] != Dependency::StrictlyLower)
            })
            .collect();
        assert!(
            !stratum.is_empty(),
            "a non-empty stratum always exists once the cycle check passed"
        );
        for index in &stratum {
            remaining.remove(index);
        }
        predicate_strata.push(stratum);
    }

    // Axioms follow their head predicate; strata without axioms vanish.
    let mut partitions = Vec::new();
    for stratum_predicates in &predicate_strata {
        let stratum_axioms: Vec<usize> = axioms
            .iter()
            .filter(|axiom| stratum_predicates.contains(&axiom.head().predicate_index()))
            .map(|axiom| axiom.index)
            .collect();
        if stratum_axioms.is_empty() {
            continue;
        }

        let mut initially_relevant_axioms = Vec::new();
        let mut axioms_by_body_predicate: HashMap<usize, Vec<usize>> = HashMap::new();
        for &axiom_index in &stratum_axioms {
            let axiom = &axioms[axiom_index];
            let mut depends_on_own_stratum = false;
            for literal in axiom.body().all_literals(PredicateCategory::Derived) {
                let body = literal.predicate_index();
                if stratum_predicates.contains(&body) {
                    depends_on_own_stratum = true;
                    if !literal.is_negated() {
                        let watchers = axioms_by_body_predicate.entry(body).or_default();
                        if !watchers.contains(&axiom_index) {
                            watchers.push(axiom_index);
                        }
                    }
                }
            }
            if !depends_on_own_stratum {
                initially_relevant_axioms.push(axiom_index);
            }
        }

        partitions.push(AxiomPartition {
            axioms: stratum_axioms,
            initially_relevant_axioms,
            axioms_by_body_predicate,
        });
    }

    debug!(
        "Stratified {} axioms over {} derived predicates into {} strata",
        axioms.len(),
        num_predicates,
        partitions.len()
    );

    Ok(partitions)
}
