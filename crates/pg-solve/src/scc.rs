use pg_game::ParityGame;
use pg_graph::VertexIndex;

use crate::VertexSet;

/// Decomposes `within` into strongly connected components using an iterative variant of
/// Tarjan's algorithm (an explicit stack, to avoid recursion depth proportional to the
/// number of vertices).
///
/// Components are returned in reverse topological order: if an edge leads from a vertex in
/// component `i` to a vertex in component `j` (both within `within`), then `j` appears no
/// later than `i` in the result.
pub fn strongly_connected_components(game: &ParityGame, within: &VertexSet) -> Vec<Vec<VertexIndex>> {
    strongly_connected_components_by(game.num_of_vertices(), within, |v| game.outgoing_edges(v))
}

/// As [`strongly_connected_components`], but the edges considered for each vertex come from
/// `successors` instead of the game's own adjacency. Used by the verifier, which restricts
/// each vertex to its committed strategy move where one is set.
pub fn strongly_connected_components_by<I: Iterator<Item = VertexIndex>>(
    num_vertices: usize,
    within: &VertexSet,
    successors: impl Fn(VertexIndex) -> I,
) -> Vec<Vec<VertexIndex>> {
    let mut index = vec![usize::MAX; num_vertices];
    let mut lowlink = vec![0usize; num_vertices];
    let mut on_stack = vec![false; num_vertices];
    let mut stack = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    // Explicit work stack: (vertex, successor-iterator position).
    let mut work: Vec<(VertexIndex, usize)> = Vec::new();

    for start in within.iter_ones() {
        let start = VertexIndex::new(start);
        if index[start.value()] != usize::MAX {
            continue;
        }

        work.push((start, 0));
        while let Some(&(v, succ_pos)) = work.last() {
            if index[v.value()] == usize::MAX {
                index[v.value()] = next_index;
                lowlink[v.value()] = next_index;
                next_index += 1;
                stack.push(v);
                on_stack[v.value()] = true;
            }

            let successors: Vec<VertexIndex> = successors(v).filter(|w| within[w.value()]).collect();

            if succ_pos < successors.len() {
                let w = successors[succ_pos];
                work.last_mut().unwrap().1 += 1;

                if index[w.value()] == usize::MAX {
                    work.push((w, 0));
                } else if on_stack[w.value()] {
                    lowlink[v.value()] = lowlink[v.value()].min(index[w.value()]);
                }
            } else {
                work.pop();
                if let Some(&(parent, _)) = work.last() {
                    lowlink[parent.value()] = lowlink[parent.value()].min(lowlink[v.value()]);
                }

                if lowlink[v.value()] == index[v.value()] {
                    let mut component = Vec::new();
                    loop {
                        let w = stack.pop().expect("component root must be on stack");
                        on_stack[w.value()] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    components.push(component);
                }
            }
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_game::Player;
    use pg_game::Priority;
    use pg_graph::EdgeDirection;
    use pg_graph::StaticGraph;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn test_two_disjoint_cycles() {
        let edges = vec![(v(0), v(1)), (v(1), v(0)), (v(1), v(2)), (v(2), v(3)), (v(3), v(2))];
        let graph = StaticGraph::assign(4, &edges, EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Even; 4],
            vec![Priority::new(0); 4],
            1,
        )
        .unwrap();

        let within = crate::full_vertex_set(4);
        let components = strongly_connected_components(&game, &within);

        let total: usize = components.iter().map(|c| c.len()).sum();
        assert_eq!(total, 4);

        // {0,1} leads into {2,3}, so {2,3} (the target) must appear no later than {0,1}.
        let index_of = |vertex: VertexIndex| components.iter().position(|c| c.contains(&vertex)).unwrap();
        assert!(index_of(v(2)) <= index_of(v(0)));
    }

    #[test]
    fn test_single_vertex_self_loop_is_its_own_component() {
        let graph = StaticGraph::assign(1, &[(v(0), v(0))], EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(graph, vec![Player::Even], vec![Priority::new(0)], 1).unwrap();

        let within = crate::full_vertex_set(1);
        let components = strongly_connected_components(&game, &within);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0], vec![v(0)]);
    }
}
