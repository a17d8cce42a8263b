//! Shared task fixtures for tests. Tasks are built through the `formalism`
//! API; object, predicate and schema indices are handed back alongside the
//! problem so assertions can name things.

use crate::formalism::{
    ConjunctiveCondition, ConjunctiveEffect, DomainBuilder, FunctionExpression, Literal, Parameter,
    PredicateCategory, Problem, ProblemBuilder, Term,
};
use crate::formalism::raw_binding;
use std::rc::Rc;

/// Install a test subscriber once; later calls are no-ops. Run tests with
/// `RUST_LOG=cliquelift=trace` to see the generator logs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn positive(category: PredicateCategory, predicate: usize, terms: Vec<Term>) -> Literal {
    Literal::new_literal(false, category, predicate, terms)
}

fn negative(category: PredicateCategory, predicate: usize, terms: Vec<Term>) -> Literal {
    Literal::new_literal(true, category, predicate, terms)
}

/// The classic two-ball, two-room, two-gripper task.
pub struct Gripper {
    pub problem: Rc<Problem>,
    pub at_robby: usize,
    pub at: usize,
    pub free: usize,
    pub carry: usize,
    pub rooma: usize,
    pub roomb: usize,
    pub ball1: usize,
    pub ball2: usize,
    pub left: usize,
    pub right: usize,
    pub move_schema: usize,
    pub pick_schema: usize,
    pub drop_schema: usize,
}

pub fn gripper() -> Gripper {
    use PredicateCategory::Fluent;

    let mut domain = DomainBuilder::new("gripper");
    let object = domain.object_type();
    let room = domain.add_type("room", Some(object));
    let ball = domain.add_type("ball", Some(object));
    let gripper = domain.add_type("gripper", Some(object));

    let at_robby = domain.add_predicate(Fluent, "at-robby", &[room]);
    let at = domain.add_predicate(Fluent, "at", &[ball, room]);
    let free = domain.add_predicate(Fluent, "free", &[gripper]);
    let carry = domain.add_predicate(Fluent, "carry", &[ball, gripper]);

    let move_schema = domain.add_action_schema(
        "move",
        ConjunctiveCondition::new(
            vec![Parameter::new(0, room), Parameter::new(1, room)],
            vec![positive(Fluent, at_robby, vec![Term::variable(0)])],
            Vec::new(),
        ),
        ConjunctiveEffect::new(
            vec![
                positive(Fluent, at_robby, vec![Term::variable(1)]),
                negative(Fluent, at_robby, vec![Term::variable(0)]),
            ],
            Vec::new(),
        ),
        Vec::new(),
        Vec::new(),
        FunctionExpression::Number(1.0),
    );

    let pick_schema = domain.add_action_schema(
        "pick",
        ConjunctiveCondition::new(
            vec![
                Parameter::new(0, ball),
                Parameter::new(1, room),
                Parameter::new(2, gripper),
            ],
            vec![
                positive(Fluent, at, vec![Term::variable(0), Term::variable(1)]),
                positive(Fluent, at_robby, vec![Term::variable(1)]),
                positive(Fluent, free, vec![Term::variable(2)]),
            ],
            Vec::new(),
        ),
        ConjunctiveEffect::new(
            vec![
                positive(Fluent, carry, vec![Term::variable(0), Term::variable(2)]),
                negative(Fluent, at, vec![Term::variable(0), Term::variable(1)]),
                negative(Fluent, free, vec![Term::variable(2)]),
            ],
            Vec::new(),
        ),
        Vec::new(),
        Vec::new(),
        FunctionExpression::Number(1.0),
    );

    let drop_schema = domain.add_action_schema(
        "drop",
        ConjunctiveCondition::new(
            vec![
                Parameter::new(0, ball),
                Parameter::new(1, room),
                Parameter::new(2, gripper),
            ],
            vec![
                positive(Fluent, carry, vec![Term::variable(0), Term::variable(2)]),
                positive(Fluent, at_robby, vec![Term::variable(1)]),
            ],
            Vec::new(),
        ),
        ConjunctiveEffect::new(
            vec![
                positive(Fluent, at, vec![Term::variable(0), Term::variable(1)]),
                positive(Fluent, free, vec![Term::variable(2)]),
                negative(Fluent, carry, vec![Term::variable(0), Term::variable(2)]),
            ],
            Vec::new(),
        ),
        Vec::new(),
        Vec::new(),
        FunctionExpression::Number(1.0),
    );

    let domain = Rc::new(domain.finish());

    let mut problem = ProblemBuilder::new(Rc::clone(&domain), "gripper-2");
    let rooma = problem.add_object("rooma", vec![room]);
    let roomb = problem.add_object("roomb", vec![room]);
    let ball1 = problem.add_object("ball1", vec![ball]);
    let ball2 = problem.add_object("ball2", vec![ball]);
    let left = problem.add_object("left", vec![gripper]);
    let right = problem.add_object("right", vec![gripper]);

    problem.add_initial_atom(Fluent, at_robby, raw_binding![rooma]);
    problem.add_initial_atom(Fluent, free, raw_binding![left]);
    problem.add_initial_atom(Fluent, free, raw_binding![right]);
    problem.add_initial_atom(Fluent, at, raw_binding![ball1, rooma]);
    problem.add_initial_atom(Fluent, at, raw_binding![ball2, rooma]);

    problem.set_goal(
        vec![
            positive(Fluent, at, vec![Term::object(ball1), Term::object(roomb)]),
            positive(Fluent, at, vec![Term::object(ball2), Term::object(roomb)]),
        ],
        Vec::new(),
    );

    Gripper {
        problem: Rc::new(problem.finish().expect("gripper problem is well-formed")),
        at_robby,
        at,
        free,
        carry,
        rooma,
        roomb,
        ball1,
        ball2,
        left,
        right,
        move_schema,
        pick_schema,
        drop_schema,
    }
}

/// A chain-reachability task: static `adjacent` edges, a derived `reachable`
/// predicate defined from the domain constant `a`, and no actions.
pub struct Reachability {
    pub problem: Rc<Problem>,
    pub reachable: usize,
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
}

pub fn reachability_chain() -> Reachability {
    use PredicateCategory::{Derived, Static};

    let mut domain = DomainBuilder::new("reachability");
    let object = domain.object_type();
    let node = domain.add_type("node", Some(object));
    let adjacent = domain.add_predicate(Static, "adjacent", &[node, node]);
    let reachable = domain.add_predicate(Derived, "reachable", &[node]);
    let a = domain.add_constant("a", vec![node]);

    // reachable(x) <- adjacent(a, x)
    domain.add_axiom_schema(
        ConjunctiveCondition::new(
            vec![Parameter::new(0, node)],
            vec![positive(
                Static,
                adjacent,
                vec![Term::object(a), Term::variable(0)],
            )],
            Vec::new(),
        ),
        positive(Derived, reachable, vec![Term::variable(0)]),
    );

    // reachable(x) <- reachable(y), adjacent(y, x)
    domain.add_axiom_schema(
        ConjunctiveCondition::new(
            vec![Parameter::new(0, node), Parameter::new(1, node)],
            vec![
                positive(Derived, reachable, vec![Term::variable(1)]),
                positive(
                    Static,
                    adjacent,
                    vec![Term::variable(1), Term::variable(0)],
                ),
            ],
            Vec::new(),
        ),
        positive(Derived, reachable, vec![Term::variable(0)]),
    );

    let domain = Rc::new(domain.finish());

    let mut problem = ProblemBuilder::new(Rc::clone(&domain), "chain-4");
    let b = problem.add_object("b", vec![node]);
    let c = problem.add_object("c", vec![node]);
    let d = problem.add_object("d", vec![node]);

    problem.add_initial_atom(Static, adjacent, raw_binding![a, b]);
    problem.add_initial_atom(Static, adjacent, raw_binding![b, c]);
    problem.add_initial_atom(Static, adjacent, raw_binding![c, d]);

    Reachability {
        problem: Rc::new(problem.finish().expect("reachability problem is well-formed")),
        reachable,
        a,
        b,
        c,
        d,
    }
}

