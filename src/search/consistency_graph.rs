use crate::formalism::{Literal, Parameter, Problem};
use crate::search::assignment_set::AssignmentSet;

/// A vertex `[parameter/object]` in the consistency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    index: usize,
    parameter_index: usize,
    object_index: usize,
}

impl Vertex {
    pub fn new(index: usize, parameter_index: usize, object_index: usize) -> Self {
        Self {
            index,
            parameter_index,
            object_index,
        }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub fn parameter_index(&self) -> usize {
        self.parameter_index
    }

    #[inline(always)]
    pub fn object_index(&self) -> usize {
        self.object_index
    }
}

/// An undirected edge between two vertices of different partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    src: Vertex,
    dst: Vertex,
}

impl Edge {
    pub fn new(src: Vertex, dst: Vertex) -> Self {
        debug_assert_ne!(src.parameter_index(), dst.parameter_index());
        Self { src, dst }
    }

    #[inline(always)]
    pub fn src(&self) -> &Vertex {
        &self.src
    }

    #[inline(always)]
    pub fn dst(&self) -> &Vertex {
        &self.dst
    }
}

/// The consistency graph of the *static* literals of a condition: one vertex
/// per type-consistent (parameter, object) pair that survives the static
/// vertex test, and one edge per cross-partition pair that survives the
/// static edge test. Since only static information is consulted, the graph
/// over-approximates the per-state consistency graph and is built once at
/// load time.
///
/// The graph can cover a sub-range of a wider parameter list: universal
/// effects build theirs over the quantified parameters only, whose indices
/// continue the action's. Partition `i` of the graph corresponds to the
/// `i`-th parameter of the slice handed to the constructor.
#[derive(Debug)]
pub struct StaticConsistencyGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    vertices_by_parameter_index: Vec<Vec<usize>>,
    objects_by_parameter_index: Vec<Vec<usize>>,
}

impl StaticConsistencyGraph {
    pub fn new(
        problem: &Problem,
        parameters: &[Parameter],
        static_literals: &[Literal],
        static_assignment_set: &AssignmentSet,
    ) -> Self {
        let mut vertices = Vec::new();
        let mut vertices_by_parameter_index = vec![Vec::new(); parameters.len()];
        let mut objects_by_parameter_index = vec![Vec::new(); parameters.len()];

        for (partition, parameter) in parameters.iter().enumerate() {
            for &object in problem.objects_per_type(parameter.type_index()) {
                let vertex = Vertex::new(vertices.len(), parameter.index(), object);
                if static_assignment_set.consistent_literals_with_vertex(static_literals, &vertex) {
                    vertices_by_parameter_index[partition].push(vertex.index());
                    objects_by_parameter_index[partition].push(object);
                    vertices.push(vertex);
                }
            }
        }

        let mut edges = Vec::new();
        for (i, &src) in vertices.iter().enumerate() {
            for &dst in &vertices[i + 1..] {
                if src.parameter_index() == dst.parameter_index() {
                    continue;
                }
                let edge = Edge::new(src, dst);
                if static_assignment_set.consistent_literals_with_edge(static_literals, &edge) {
                    edges.push(edge);
                }
            }
        }

        Self {
            vertices,
            edges,
            vertices_by_parameter_index,
            objects_by_parameter_index,
        }
    }

    #[inline(always)]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline(always)]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Vertex indices partitioned by parameter, in partition order.
    pub fn vertices_by_parameter_index(&self) -> &[Vec<usize>] {
        &self.vertices_by_parameter_index
    }

    /// Object indices partitioned by parameter, in partition order.
    pub fn objects_by_parameter_index(&self) -> &[Vec<usize>] {
        &self.objects_by_parameter_index
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }
}
