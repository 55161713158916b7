use std::io::Read;
use std::io::Write;

use pg_utilities::PgError;

use crate::EdgeDirection;
use crate::StaticGraph;
use crate::VertexIndex;

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<(), PgError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, PgError> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn direction_tag(direction: EdgeDirection) -> u32 {
    match direction {
        EdgeDirection::Successor => 1,
        EdgeDirection::Predecessor => 2,
        EdgeDirection::Bidirectional => 3,
    }
}

fn direction_from_tag(tag: u32) -> Result<EdgeDirection, PgError> {
    match tag {
        1 => Ok(EdgeDirection::Successor),
        2 => Ok(EdgeDirection::Predecessor),
        3 => Ok(EdgeDirection::Bidirectional),
        _ => Err(PgError::InvalidInput {
            reason: format!("unknown edge direction tag {tag}"),
        }),
    }
}

impl StaticGraph {
    /// Writes this graph in the canonical fixed-width little-endian raw format:
    /// `V`, `E`, direction tag, then (per stored direction) the adjacency list followed by
    /// its index array.
    pub fn write_raw<W: Write>(&self, writer: &mut W) -> Result<(), PgError> {
        write_u32(writer, self.num_of_vertices() as u32)?;
        write_u32(writer, self.num_of_edges() as u32)?;
        write_u32(writer, direction_tag(self.edge_direction()))?;

        if self.edge_direction().has_successors() {
            let (list, index) = self.successor_arrays();
            for w in list {
                write_u32(writer, w.value() as u32)?;
            }
            for offset in index {
                write_u32(writer, *offset as u32)?;
            }
        }

        if self.edge_direction().has_predecessors() {
            let (list, index) = self.predecessor_arrays();
            for w in list {
                write_u32(writer, w.value() as u32)?;
            }
            for offset in index {
                write_u32(writer, *offset as u32)?;
            }
        }

        Ok(())
    }

    /// Reads a graph written by [`StaticGraph::write_raw`].
    pub fn read_raw<R: Read>(reader: &mut R) -> Result<StaticGraph, PgError> {
        let num_vertices = read_u32(reader)? as usize;
        let num_edges = read_u32(reader)? as usize;
        let direction = direction_from_tag(read_u32(reader)?)?;

        let (successors, successor_index) = if direction.has_successors() {
            let mut list = Vec::with_capacity(num_edges);
            for _ in 0..num_edges {
                list.push(VertexIndex::new(read_u32(reader)? as usize));
            }
            let mut index = Vec::with_capacity(num_vertices + 1);
            for _ in 0..=num_vertices {
                index.push(read_u32(reader)? as usize);
            }
            (list, index)
        } else {
            (Vec::new(), Vec::new())
        };

        let (predecessors, predecessor_index) = if direction.has_predecessors() {
            let mut list = Vec::with_capacity(num_edges);
            for _ in 0..num_edges {
                list.push(VertexIndex::new(read_u32(reader)? as usize));
            }
            let mut index = Vec::with_capacity(num_vertices + 1);
            for _ in 0..=num_vertices {
                index.push(read_u32(reader)? as usize);
            }
            (list, index)
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(StaticGraph::from_raw_parts(
            num_vertices,
            num_edges,
            direction,
            successors,
            successor_index,
            predecessors,
            predecessor_index,
        ))
    }
}
