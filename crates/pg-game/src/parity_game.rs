use std::collections::VecDeque;

use pg_graph::EdgeDirection;
use pg_graph::StaticGraph;
use pg_graph::VertexIndex;
use pg_graph::is_no_vertex;
use pg_graph::no_vertex;
use pg_utilities::PgError;

use crate::Player;
use crate::Priority;

/// A parity game: a [`StaticGraph`] together with a player and a priority per vertex.
///
/// Priorities are in range `[0, d)` where `d` is the priority limit; `d` need not equal
/// the largest priority actually used.
#[derive(Debug, Clone)]
pub struct ParityGame {
    graph: StaticGraph,
    owner: Vec<Player>,
    priority: Vec<Priority>,
    priority_limit: usize,
    cardinality: Vec<usize>,
}

impl ParityGame {
    /// Constructs an empty game.
    pub fn empty() -> Self {
        ParityGame {
            graph: StaticGraph::empty(),
            owner: Vec::new(),
            priority: Vec::new(),
            priority_limit: 1,
            cardinality: vec![0],
        }
    }

    /// Builds a game from its raw pieces, validating lengths and priority bounds and
    /// recomputing the cardinality table.
    pub fn from_parts(
        graph: StaticGraph,
        owner: Vec<Player>,
        priority: Vec<Priority>,
        priority_limit: usize,
    ) -> Result<Self, PgError> {
        if owner.len() != graph.num_of_vertices() || priority.len() != graph.num_of_vertices() {
            return Err(PgError::InvalidInput {
                reason: "owner/priority vector length does not match the number of vertices".into(),
            });
        }

        let priority_limit = priority_limit.max(1);
        let mut cardinality = vec![0usize; priority_limit];
        for p in &priority {
            if p.value() >= priority_limit {
                return Err(PgError::InvalidInput {
                    reason: format!("priority {p} is out of range for limit {priority_limit}"),
                });
            }
            cardinality[p.value()] += 1;
        }

        Ok(ParityGame {
            graph,
            owner,
            priority,
            priority_limit,
            cardinality,
        })
    }

    pub fn clear(&mut self) {
        *self = ParityGame::empty();
    }

    pub fn assign(&mut self, other: &ParityGame) {
        self.clone_from(other);
    }

    pub fn graph(&self) -> &StaticGraph {
        &self.graph
    }

    pub fn num_of_vertices(&self) -> usize {
        self.graph.num_of_vertices()
    }

    pub fn priority_limit(&self) -> usize {
        self.priority_limit
    }

    pub fn priority(&self, v: VertexIndex) -> Priority {
        self.priority[v.value()]
    }

    pub fn owner(&self, v: VertexIndex) -> Player {
        self.owner[v.value()]
    }

    /// Number of vertices with priority `p`.
    pub fn cardinality(&self, p: usize) -> usize {
        self.cardinality[p]
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        self.graph.iter_vertices()
    }

    pub fn outgoing_edges(&self, v: VertexIndex) -> impl Iterator<Item = VertexIndex> + '_ {
        self.graph.succ(v)
    }

    /// A game is proper if every vertex has at least one outgoing edge.
    pub fn proper(&self) -> bool {
        self.iter_vertices().all(|v| self.graph.outdegree(v) > 0)
    }

    /// Returns the winner of `v` under `strategy`: `owner(v)` if `v` has a strategy move,
    /// otherwise the opponent.
    pub fn winner(&self, strategy: &[VertexIndex], v: VertexIndex) -> Player {
        if is_no_vertex(strategy[v.value()]) {
            self.owner(v).opponent()
        } else {
            self.owner(v)
        }
    }

    /// Builds the subgame induced by `vertices`, renumbered `0..vertices.len()`.
    /// Returns the subgame and the old-to-new vertex map (`num_of_vertices()` long).
    pub fn make_subgame(
        &self,
        vertices: &[VertexIndex],
        proper: bool,
        direction: EdgeDirection,
    ) -> Result<(ParityGame, Vec<VertexIndex>), PgError> {
        let (subgraph, vertex_map) = self.graph.make_subgraph(vertices, proper, direction)?;

        let mut owner = vec![Player::Even; vertices.len()];
        let mut priority = vec![Priority::new(0); vertices.len()];
        for &old_v in vertices {
            let new_v = vertex_map[old_v.value()];
            owner[new_v.value()] = self.owner(old_v);
            priority[new_v.value()] = self.priority(old_v);
        }

        let game = ParityGame::from_parts(subgraph, owner, priority, self.priority_limit)?;
        Ok((game, vertex_map))
    }

    /// Relabels vertex `v` to `perm[v]`.
    pub fn shuffle(&self, perm: &[VertexIndex]) -> Result<ParityGame, PgError> {
        let graph = self.graph.shuffle_vertices(perm)?;

        let mut owner = vec![Player::Even; self.num_of_vertices()];
        let mut priority = vec![Priority::new(0); self.num_of_vertices()];
        for v in self.iter_vertices() {
            let new_v = perm[v.value()];
            owner[new_v.value()] = self.owner(v);
            priority[new_v.value()] = self.priority(v);
        }

        ParityGame::from_parts(graph, owner, priority, self.priority_limit)
    }

    /// Replaces this game by its dual: same graph, swapped players, priorities shifted by
    /// one, then re-compressed. For every strategy, `winner_dual(v) = opponent(winner(v))`.
    pub fn make_dual(&self) -> ParityGame {
        let owner: Vec<Player> = self.owner.iter().map(|p| p.opponent()).collect();
        let priority: Vec<Priority> = self.priority.iter().map(|p| Priority::new(p.value() + 1)).collect();

        let dual = ParityGame::from_parts(self.graph.clone(), owner, priority, self.priority_limit + 1)
            .expect("dualisation preserves vertex/edge structure");
        let (compressed, _) = dual.compress_priorities(None, true);
        compressed
    }

    /// Compresses the priority range so every priority in `1..d'` is used.
    ///
    /// If `cardinality` is omitted, this game's own cardinality table is used. If
    /// `preserve_parity` is true, every priority's parity (and hence every vertex's player)
    /// is preserved; otherwise players may be swapped, and the parity that ends up mapped
    /// to zero is returned.
    pub fn compress_priorities(
        &self,
        cardinality: Option<&[usize]>,
        preserve_parity: bool,
    ) -> (ParityGame, Option<usize>) {
        let owned_cardinality;
        let card = match cardinality {
            Some(c) => c,
            None => {
                owned_cardinality = self.cardinality.clone();
                &owned_cardinality
            }
        };

        let mut prio_map = vec![0usize; self.priority_limit];
        let mut new_d = 0usize;
        let mut last_parity: Option<usize> = None;
        let mut first_used_parity: Option<usize> = None;

        for p in 0..self.priority_limit {
            if p >= card.len() || card[p] == 0 {
                continue;
            }
            let parity = p % 2;
            if first_used_parity.is_none() {
                first_used_parity = Some(parity);
                new_d = if preserve_parity { parity } else { 0 };
            } else if Some(parity) != last_parity {
                new_d += 1;
            }
            prio_map[p] = new_d;
            last_parity = Some(parity);
        }
        let new_limit = new_d + 1;

        let new_priority: Vec<Priority> = self
            .priority
            .iter()
            .map(|p| Priority::new(prio_map[p.value()]))
            .collect();

        let mut new_owner = self.owner.clone();
        let mapped_parity = if preserve_parity {
            None
        } else {
            let zero_parity = first_used_parity.unwrap_or(0);
            if zero_parity != 0 {
                for owner in new_owner.iter_mut() {
                    *owner = owner.opponent();
                }
            }
            Some(zero_parity)
        };

        let game = ParityGame::from_parts(self.graph.clone(), new_owner, new_priority, new_limit)
            .expect("compression preserves vertex/edge structure");
        (game, mapped_parity)
    }

    /// Tightens a single vertex against one of its neighbour lists: if every priority
    /// there exceeds the vertex's own, the vertex can never carry the dominant priority of
    /// any cycle through it, so its priority can be raised to the smallest neighbour
    /// priority without affecting any winner. Returns the increase.
    fn propagate_priority(&mut self, v: VertexIndex, successors: bool) -> u64 {
        let min_neighbor = if successors {
            self.graph.succ(v).map(|w| self.priority(w).value()).min()
        } else {
            self.graph.pred(v).map(|w| self.priority(w).value()).min()
        };
        let Some(min_neighbor) = min_neighbor else {
            return 0;
        };
        let current = self.priority(v).value();
        if min_neighbor <= current {
            return 0;
        }
        self.priority[v.value()] = Priority::new(min_neighbor);
        (min_neighbor - current) as u64
    }

    /// Raises each vertex's priority to the minimum priority among its successors, and then
    /// to the minimum among its predecessors, whenever that minimum strictly exceeds the
    /// current priority. Preserves winners and optimal strategies: a vertex whose every
    /// neighbour outranks it never determines the maximum of a cycle. Returns the total
    /// amount by which priorities were adjusted.
    ///
    /// Requires a bidirectionally-stored graph. The cardinality table is rebuilt once at
    /// the end.
    pub fn propagate_priorities(&mut self) -> u64 {
        debug_assert_eq!(self.graph.edge_direction(), EdgeDirection::Bidirectional);

        let mut total: u64 = 0;
        let mut queue: VecDeque<VertexIndex> = VecDeque::new();

        // First pass: find vertices that can be tightened at all, so the queue only ever
        // holds vertices whose update can cascade.
        for v in (0..self.num_of_vertices()).map(VertexIndex::new) {
            let change = self.propagate_priority(v, true) + self.propagate_priority(v, false);
            if change > 0 {
                total += change;
                queue.push_back(v);
            }
        }

        // Re-examine neighbours of updated vertices until quiescence.
        while let Some(w) = queue.pop_front() {
            let p = self.priority(w).value();

            let predecessors: Vec<VertexIndex> = self.graph.pred(w).collect();
            for v in predecessors {
                if self.priority(v).value() < p {
                    let change = self.propagate_priority(v, true);
                    if change > 0 {
                        total += change;
                        queue.push_back(v);
                    }
                }
            }

            let successors: Vec<VertexIndex> = self.graph.succ(w).collect();
            for v in successors {
                if self.priority(v).value() < p {
                    let change = self.propagate_priority(v, false);
                    if change > 0 {
                        total += change;
                        queue.push_back(v);
                    }
                }
            }
        }

        if total > 0 {
            self.cardinality = vec![0; self.priority_limit];
            for p in &self.priority {
                self.cardinality[p.value()] += 1;
            }
        }

        total
    }
}

/// A strategy vector: `strategy[v]` is a successor of `v` if `v`'s owner wins there, or
/// [`no_vertex`] if the opponent wins.
pub type Strategy = Vec<VertexIndex>;

/// Returns a strategy with every entry set to [`no_vertex`].
pub fn empty_strategy(num_vertices: usize) -> Strategy {
    vec![no_vertex(); num_vertices]
}
