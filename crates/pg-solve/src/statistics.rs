/// Per-solve lifting telemetry, shared between a solver and any recursively spawned
/// sub-solvers.
#[derive(Debug, Default, Clone)]
pub struct LiftingStatistics {
    attempted: Vec<u64>,
    succeeded: Vec<u64>,
    total_attempted: u64,
    total_succeeded: u64,
}

impl LiftingStatistics {
    pub fn new(num_vertices: usize) -> Self {
        LiftingStatistics {
            attempted: vec![0; num_vertices],
            succeeded: vec![0; num_vertices],
            total_attempted: 0,
            total_succeeded: 0,
        }
    }

    /// Grows the per-vertex counters to cover at least `num_vertices`, used when a
    /// sub-solver works over a remapped, possibly larger, local index space.
    pub fn ensure_capacity(&mut self, num_vertices: usize) {
        if self.attempted.len() < num_vertices {
            self.attempted.resize(num_vertices, 0);
            self.succeeded.resize(num_vertices, 0);
        }
    }

    pub fn record_attempt(&mut self, vertex: usize, lifted: bool) {
        self.ensure_capacity(vertex + 1);
        self.attempted[vertex] += 1;
        self.total_attempted += 1;
        if lifted {
            self.succeeded[vertex] += 1;
            self.total_succeeded += 1;
        }
    }

    pub fn total_attempted(&self) -> u64 {
        self.total_attempted
    }

    pub fn total_succeeded(&self) -> u64 {
        self.total_succeeded
    }

    pub fn attempted(&self, vertex: usize) -> u64 {
        self.attempted.get(vertex).copied().unwrap_or(0)
    }

    pub fn succeeded(&self, vertex: usize) -> u64 {
        self.succeeded.get(vertex).copied().unwrap_or(0)
    }
}
