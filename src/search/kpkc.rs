use fixedbitset::FixedBitSet;

/// Enumerates all cliques of size `k` in a `k`-partite graph that pick
/// exactly one vertex per partition. The graph is handed in as an adjacency
/// bitmatrix plus the vertex partition; both stay with the caller so the
/// same search object (and its buffers) can be reused across states.
///
/// The search is an explicit state machine rather than a recursive
/// procedure: `next` advances an internal stack of frames, one per chosen
/// vertex, and can be resumed or abandoned at any point. At each depth the
/// unassigned partition with the fewest remaining candidates is expanded
/// (ties broken by partition index), and candidates are visited in ascending
/// vertex order, which makes the emission order a deterministic function of
/// the adjacency matrix and the partition.
///
/// Planning states are sparse relative to the Cartesian object space, so the
/// pruned candidate sets collapse quickly and the number of emitted cliques
/// stays small in practice.
#[derive(Debug)]
pub struct KpkcSearch {
    num_partitions: usize,
    /// `candidates[d][p]`: vertices of partition `p` still compatible with
    /// the first `d` chosen vertices.
    candidates: Vec<Vec<FixedBitSet>>,
    /// Candidate list of the frame at each depth, materialised in ascending
    /// vertex order.
    frame_candidates: Vec<Vec<usize>>,
    frames: Vec<Frame>,
    assigned: Vec<bool>,
    clique: Vec<usize>,
    started: bool,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    partition: usize,
    cursor: usize,
}

impl KpkcSearch {
    pub fn new(num_partitions: usize, num_vertices: usize) -> Self {
        Self {
            num_partitions,
            candidates: (0..num_partitions)
                .map(|_| {
                    (0..num_partitions)
                        .map(|_| FixedBitSet::with_capacity(num_vertices))
                        .collect()
                })
                .collect(),
            frame_candidates: vec![Vec::new(); num_partitions],
            frames: Vec::with_capacity(num_partitions),
            assigned: vec![false; num_partitions],
            clique: Vec::with_capacity(num_partitions),
            started: false,
        }
    }

    /// Restart the search from scratch. Must be called before the first
    /// `next` of every new adjacency matrix.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.clique.clear();
        self.assigned.iter_mut().for_each(|a| *a = false);
        self.started = false;
    }

    /// Advance to the next clique. Returns one vertex per partition, ordered
    /// by choice depth; the slice is only valid until the next call.
    pub fn next(
        &mut self,
        adjacency: &[FixedBitSet],
        partitions: &[Vec<usize>],
    ) -> Option<&[usize]> {
        debug_assert_eq!(partitions.len(), self.num_partitions);

        if self.num_partitions == 0 {
            return None;
        }

        if !self.started {
            self.started = true;
            for (partition, members) in partitions.iter().enumerate() {
                let set = &mut self.candidates[0][partition];
                set.clear();
                for &vertex in members {
                    set.insert(vertex);
                }
            }
            self.push_frame();
        }

        loop {
            let depth = match self.frames.len() {
                0 => return None,
                len => len - 1,
            };

            let frame = &mut self.frames[depth];
            if frame.cursor >= self.frame_candidates[depth].len() {
                let frame = self.frames.pop().expect("frame stack is non-empty");
                self.assigned[frame.partition] = false;
                self.clique.pop();
                continue;
            }

            let vertex = self.frame_candidates[depth][frame.cursor];
            frame.cursor += 1;
            self.clique[depth] = vertex;

            if self.frames.len() == self.num_partitions {
                return Some(&self.clique);
            }

            // Narrow the remaining partitions to the neighbours of the
            // chosen vertex.
            let (lower, upper) = self.candidates.split_at_mut(depth + 1);
            let current = &lower[depth];
            let next = &mut upper[0];
            let mut dead_end = false;
            for partition in 0..self.num_partitions {
                if self.assigned[partition] {
                    continue;
                }
                let set = &mut next[partition];
                set.clear();
                set.union_with(&current[partition]);
                set.intersect_with(&adjacency[vertex]);
                if set.count_ones(..) == 0 {
                    dead_end = true;
                }
            }
            if dead_end {
                continue;
            }

            self.push_frame();
        }
    }

    /// Open a frame for the unassigned partition with the fewest candidates
    /// at the current depth. Does nothing if that partition is empty; the
    /// caller then backtracks through the cursor of the enclosing frame.
    fn push_frame(&mut self) {
        let depth = self.frames.len();
        let level = &self.candidates[depth];

        let mut best: Option<(usize, usize)> = None;
        for partition in 0..self.num_partitions {
            if self.assigned[partition] {
                continue;
            }
            let count = level[partition].count_ones(..);
            if best.map_or(true, |(_, best_count)| count < best_count) {
                best = Some((partition, count));
            }
        }

        let (partition, count) = best.expect("at least one partition is unassigned");
        if count == 0 {
            return;
        }

        self.frame_candidates[depth].clear();
        self.frame_candidates[depth].extend(level[partition].ones());
        self.assigned[partition] = true;
        self.frames.push(Frame {
            partition,
            cursor: 0,
        });
        self.clique.push(usize::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn adjacency(num_vertices: usize, edges: &[(usize, usize)]) -> Vec<FixedBitSet> {
        let mut matrix = vec![FixedBitSet::with_capacity(num_vertices); num_vertices];
        for &(u, v) in edges {
            matrix[u].insert(v);
            matrix[v].insert(u);
        }
        matrix
    }

    fn collect_cliques(
        adjacency: &[FixedBitSet],
        partitions: &[Vec<usize>],
    ) -> BTreeSet<Vec<usize>> {
        let num_vertices = adjacency.len();
        let mut search = KpkcSearch::new(partitions.len(), num_vertices);
        search.reset();
        let mut cliques = BTreeSet::new();
        while let Some(clique) = search.next(adjacency, partitions) {
            let mut sorted = clique.to_vec();
            sorted.sort_unstable();
            assert!(cliques.insert(sorted), "clique emitted twice");
        }
        cliques
    }

    #[test]
    fn triangle_across_three_partitions() {
        // Partitions {0,1}, {2,3}, {4,5}; only 0-2-4 and 1-3-5 are triangles.
        let adjacency = adjacency(
            6,
            &[(0, 2), (0, 4), (2, 4), (1, 3), (1, 5), (3, 5), (0, 3)],
        );
        let partitions = vec![vec![0, 1], vec![2, 3], vec![4, 5]];
        let cliques = collect_cliques(&adjacency, &partitions);
        assert_eq!(
            cliques,
            BTreeSet::from([vec![0, 2, 4], vec![1, 3, 5]])
        );
    }

    #[test]
    fn no_edges_means_no_cliques() {
        let adjacency = adjacency(4, &[]);
        let partitions = vec![vec![0, 1], vec![2, 3]];
        assert!(collect_cliques(&adjacency, &partitions).is_empty());
    }

    #[test]
    fn every_emitted_clique_is_pairwise_adjacent() {
        // A denser graph with some non-clique edges thrown in.
        let edges = [
            (0, 3),
            (0, 4),
            (1, 3),
            (1, 5),
            (3, 6),
            (4, 6),
            (5, 7),
            (0, 6),
            (1, 7),
        ];
        let adjacency = adjacency(8, &edges);
        let partitions = vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7]];

        let mut search = KpkcSearch::new(partitions.len(), adjacency.len());
        search.reset();
        let mut count = 0;
        while let Some(clique) = search.next(&adjacency, &partitions) {
            assert_eq!(clique.len(), 3);
            for (i, &u) in clique.iter().enumerate() {
                for &v in &clique[i + 1..] {
                    assert!(adjacency[u].contains(v), "{u} and {v} are not adjacent");
                }
            }
            let mut per_partition = [0usize; 3];
            for &vertex in clique {
                let partition = partitions
                    .iter()
                    .position(|p| p.contains(&vertex))
                    .expect("vertex belongs to a partition");
                per_partition[partition] += 1;
            }
            assert_eq!(per_partition, [1, 1, 1]);
            count += 1;
        }
        // 0-3-6, 0-4-6 and 1-5-7 are the only triangles with one vertex per
        // partition.
        assert_eq!(count, 3);
    }

    #[test]
    fn search_is_restartable() {
        let adjacency = adjacency(4, &[(0, 2), (1, 3)]);
        let partitions = vec![vec![0, 1], vec![2, 3]];
        let mut search = KpkcSearch::new(2, 4);

        for _ in 0..2 {
            search.reset();
            let mut cliques = Vec::new();
            while let Some(clique) = search.next(&adjacency, &partitions) {
                let mut sorted = clique.to_vec();
                sorted.sort_unstable();
                cliques.push(sorted);
            }
            assert_eq!(cliques, vec![vec![0, 2], vec![1, 3]]);
        }
    }
}
