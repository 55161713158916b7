use std::io::Read;
use std::io::Write;

use pg_graph::StaticGraph;
use pg_utilities::PgError;

use crate::ParityGame;
use crate::Player;
use crate::Priority;

impl ParityGame {
    /// Writes this game in the canonical raw format: the graph, then `d`, then one
    /// `(player, priority)` record per vertex, then the cardinality table.
    pub fn write_raw<W: Write>(&self, writer: &mut W) -> Result<(), PgError> {
        self.graph().write_raw(writer)?;
        writer.write_all(&(self.priority_limit() as i32).to_le_bytes())?;

        for v in self.iter_vertices() {
            writer.write_all(&[self.owner(v).to_index() as u8])?;
            writer.write_all(&[self.priority(v).value() as u8])?;
        }

        for p in 0..self.priority_limit() {
            writer.write_all(&(self.cardinality(p) as u32).to_le_bytes())?;
        }

        Ok(())
    }

    /// Reads a game written by [`ParityGame::write_raw`].
    pub fn read_raw<R: Read>(reader: &mut R) -> Result<ParityGame, PgError> {
        let graph = StaticGraph::read_raw(reader)?;

        let mut d_bytes = [0u8; 4];
        reader.read_exact(&mut d_bytes)?;
        let priority_limit = i32::from_le_bytes(d_bytes) as usize;

        let mut owner = Vec::with_capacity(graph.num_of_vertices());
        let mut priority = Vec::with_capacity(graph.num_of_vertices());
        for _ in 0..graph.num_of_vertices() {
            let mut record = [0u8; 2];
            reader.read_exact(&mut record)?;
            owner.push(Player::from_index(record[0]));
            priority.push(Priority::new(record[1] as usize));
        }

        // The cardinality table is redundant with `priority` and is re-derived by
        // `ParityGame::from_parts`; it is still consumed here to keep the stream aligned.
        for _ in 0..priority_limit {
            let mut count_bytes = [0u8; 4];
            reader.read_exact(&mut count_bytes)?;
        }

        ParityGame::from_parts(graph, owner, priority, priority_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_graph::EdgeDirection;
    use pg_graph::VertexIndex;

    #[test]
    fn test_raw_roundtrip() {
        let edges = vec![
            (VertexIndex::new(0), VertexIndex::new(1)),
            (VertexIndex::new(1), VertexIndex::new(0)),
        ];
        let graph = StaticGraph::assign(2, &edges, EdgeDirection::Bidirectional).unwrap();
        let game = ParityGame::from_parts(
            graph,
            vec![Player::Even, Player::Odd],
            vec![Priority::new(2), Priority::new(3)],
            4,
        )
        .unwrap();

        let mut buffer = Vec::new();
        game.write_raw(&mut buffer).unwrap();
        let restored = ParityGame::read_raw(&mut buffer.as_slice()).unwrap();

        assert_eq!(restored.num_of_vertices(), game.num_of_vertices());
        for v in game.iter_vertices() {
            assert_eq!(restored.owner(v), game.owner(v));
            assert_eq!(restored.priority(v), game.priority(v));
        }
    }
}
