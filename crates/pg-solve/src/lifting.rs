use std::collections::BTreeSet;
use std::collections::VecDeque;

use pg_game::ParityGame;
use pg_graph::EdgeDirection;
use pg_graph::VertexIndex;
use pg_utilities::PgError;

use crate::spm::Spm;

/// First-generation lifting strategy API: a pull loop.
///
/// [`LiftingStrategy::next`] is called repeatedly by the SPM engine; it is told the
/// previously attempted vertex (`None` for the first call) and whether that attempt lifted,
/// and returns the next vertex to try, or `None` once the strategy believes a fixpoint has
/// been reached. Strategies maintain their own dirty set.
pub trait LiftingStrategy {
    fn next(&mut self, spm: &Spm, prev: Option<VertexIndex>, prev_lifted: bool) -> Option<VertexIndex>;

    /// Called when a vertex is lifted outside the regular attempt loop (the alternating
    /// solver propagating `Top` values from the dual engine), so worklist-style strategies
    /// can re-queue its dependents.
    fn lifted_externally(&mut self, _spm: &Spm, _vertex: VertexIndex) {}

    /// Rough estimate of this strategy's peak memory use, for reporting.
    fn memory_use(&self) -> usize {
        0
    }
}

/// Second-generation lifting strategy API: a push/pop worklist.
///
/// Here the SPM engine manages the dirty set; it calls [`LiftingStrategy2::push`] when a
/// clean vertex becomes dirty, [`LiftingStrategy2::bump`] when an already-queued vertex's
/// measure increased, and [`LiftingStrategy2::pop`] to take the next candidate (which one is
/// at the strategy's discretion). Every call receives the engine so measure-ordered
/// strategies can compare candidates against live data.
pub trait LiftingStrategy2 {
    fn push(&mut self, spm: &Spm, vertex: VertexIndex);
    fn bump(&mut self, spm: &Spm, vertex: VertexIndex);
    fn pop(&mut self, spm: &Spm) -> Option<VertexIndex>;

    /// Rough estimate of this strategy's peak memory use, for reporting.
    fn memory_use(&self) -> usize {
        0
    }
}

/// Builds a lifting strategy for a game and engine. A factory declares which API generation
/// it supports; the SPM engine picks the matching driver loop.
pub trait LiftingStrategyFactory {
    fn supports_version(&self, version: u8) -> bool {
        version == 1
    }

    fn create(&self, _game: &ParityGame, _spm: &Spm) -> Option<Box<dyn LiftingStrategy>> {
        None
    }

    fn create2(&self, _game: &ParityGame, _spm: &Spm) -> Option<Box<dyn LiftingStrategy2>> {
        None
    }
}

/// Parses a strategy descriptor of the form `name[:arg1[:arg2[...]]]` and builds the
/// corresponding factory. Names are case-insensitive; an empty argument selects the default.
pub fn parse_strategy(descriptor: &str) -> Result<Box<dyn LiftingStrategyFactory>, PgError> {
    let mut parts = descriptor.split(':');
    let name = parts.next().unwrap_or("").to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let bad = |reason: String| PgError::InvalidStrategyDescriptor {
        descriptor: descriptor.to_string(),
        reason,
    };

    let parse_flag = |index: usize| -> Result<bool, PgError> {
        match args.get(index).filter(|s| !s.is_empty()) {
            None => Ok(false),
            Some(s) => Ok(s
                .parse::<i64>()
                .map_err(|_| bad(format!("argument {} must be an integer flag", index + 1)))?
                != 0),
        }
    };

    let parse_float = |index: usize, default: f64| -> Result<f64, PgError> {
        match args.get(index).filter(|s| !s.is_empty()) {
            None => Ok(default),
            Some(s) => s
                .parse::<f64>()
                .map_err(|_| bad(format!("argument {} must be a number", index + 1))),
        }
    };

    let parse_order = || -> Result<HeapOrder, PgError> {
        match args.first().filter(|s| !s.is_empty()) {
            None => Ok(HeapOrder::Heap),
            Some(s) => match s.parse::<i64>() {
                Ok(0) => Ok(HeapOrder::Queue),
                Ok(1) => Ok(HeapOrder::Stack),
                Ok(2) => Ok(HeapOrder::Heap),
                _ => Err(bad("order must be 0 (queue), 1 (stack) or 2 (heap)".into())),
            },
        }
    };

    match name.as_str() {
        "linear" => Ok(Box::new(LinearLiftingStrategyFactory {
            alternate: parse_flag(0)?,
        })),
        "predecessor" | "pred" => Ok(Box::new(PredecessorLiftingStrategyFactory {
            stack: parse_flag(0)?,
        })),
        "focuslist" | "focus" => Ok(Box::new(FocusListLiftingStrategyFactory {
            alternate: parse_flag(0)?,
            size_ratio: parse_float(1, 0.1)?,
            lift_ratio: parse_float(2, 10.0)?,
        })),
        "maxmeasure" => Ok(Box::new(MaxMeasureLiftingStrategyFactory {
            order: parse_order()?,
            metric: HeapMetric::MaxValue,
        })),
        "maxstep" => Ok(Box::new(MaxMeasureLiftingStrategyFactory {
            order: parse_order()?,
            metric: HeapMetric::MaxStep,
        })),
        "minmeasure" => Ok(Box::new(MaxMeasureLiftingStrategyFactory {
            order: parse_order()?,
            metric: HeapMetric::MinValue,
        })),
        "oldmaxmeasure" => Ok(Box::new(OldMaxMeasureLiftingStrategyFactory)),
        "linpred" => Ok(Box::new(LinPredLiftingStrategyFactory)),
        other => Err(bad(format!("unknown lifting strategy '{other}'"))),
    }
}

// ---------------------------------------------------------------------------------------
// Linear (swiping)
// ---------------------------------------------------------------------------------------

/// Cursor-and-failure-counter core shared by the linear strategy and the focus list's
/// phase 1. Termination: `V` consecutive failed lifts (`2V - 1` when alternating, since a
/// reversal revisits every vertex once more before provably reaching a fixpoint).
struct LinearCore {
    num_vertices: usize,
    alternate: bool,
    backward: bool,
    vertex: Option<usize>,
    failed_lifts: usize,
    max_failed: usize,
}

impl LinearCore {
    fn new(num_vertices: usize, alternate: bool) -> Self {
        let mut max_failed = num_vertices;
        if alternate {
            max_failed += num_vertices.saturating_sub(1);
        }
        LinearCore {
            num_vertices,
            alternate,
            backward: false,
            vertex: None,
            failed_lifts: 0,
            max_failed,
        }
    }

    fn lifted(&mut self) {
        self.failed_lifts = 0;
    }

    fn next(&mut self) -> Option<VertexIndex> {
        if self.num_vertices == 0 || self.failed_lifts >= self.max_failed {
            return None;
        }
        self.failed_lifts += 1;

        let last = self.num_vertices - 1;
        if last == 0 {
            self.vertex = Some(0);
            return Some(VertexIndex::new(0));
        }

        let current = match self.vertex {
            None => {
                self.backward = false;
                0
            }
            Some(v) if !self.backward => {
                if v < last {
                    v + 1
                } else if !self.alternate {
                    0
                } else {
                    self.backward = true;
                    v - 1
                }
            }
            Some(v) => {
                if v > 0 {
                    v - 1
                } else if !self.alternate {
                    last
                } else {
                    self.backward = false;
                    1
                }
            }
        };
        self.vertex = Some(current);
        Some(VertexIndex::new(current))
    }
}

pub struct LinearLiftingStrategyFactory {
    pub alternate: bool,
}

impl LiftingStrategyFactory for LinearLiftingStrategyFactory {
    fn create(&self, game: &ParityGame, _spm: &Spm) -> Option<Box<dyn LiftingStrategy>> {
        Some(Box::new(LinearLiftingStrategy {
            core: LinearCore::new(game.num_of_vertices(), self.alternate),
        }))
    }
}

struct LinearLiftingStrategy {
    core: LinearCore,
}

impl LiftingStrategy for LinearLiftingStrategy {
    fn next(&mut self, _spm: &Spm, prev: Option<VertexIndex>, prev_lifted: bool) -> Option<VertexIndex> {
        if prev.is_some() && prev_lifted {
            self.core.lifted();
        }
        self.core.next()
    }

    fn lifted_externally(&mut self, _spm: &Spm, _vertex: VertexIndex) {
        self.core.lifted();
    }
}

// ---------------------------------------------------------------------------------------
// Predecessor (worklist)
// ---------------------------------------------------------------------------------------

pub struct PredecessorLiftingStrategyFactory {
    pub stack: bool,
}

impl LiftingStrategyFactory for PredecessorLiftingStrategyFactory {
    fn create(&self, game: &ParityGame, _spm: &Spm) -> Option<Box<dyn LiftingStrategy>> {
        debug_assert_ne!(game.graph().edge_direction(), EdgeDirection::Successor);
        let n = game.num_of_vertices();
        Some(Box::new(PredecessorLiftingStrategy {
            stack: self.stack,
            queue: game.iter_vertices().collect(),
            queued: vec![true; n],
        }))
    }
}

struct PredecessorLiftingStrategy {
    stack: bool,
    queue: VecDeque<VertexIndex>,
    queued: Vec<bool>,
}

impl PredecessorLiftingStrategy {
    fn enqueue_predecessors(&mut self, spm: &Spm, vertex: VertexIndex) {
        for p in spm.game().graph().pred(vertex) {
            if !self.queued[p.value()] {
                self.queued[p.value()] = true;
                self.queue.push_back(p);
            }
        }
    }
}

impl LiftingStrategy for PredecessorLiftingStrategy {
    fn next(&mut self, spm: &Spm, prev: Option<VertexIndex>, prev_lifted: bool) -> Option<VertexIndex> {
        if let (Some(p), true) = (prev, prev_lifted) {
            self.enqueue_predecessors(spm, p);
        }
        let next = if self.stack { self.queue.pop_back() } else { self.queue.pop_front() };
        if let Some(v) = next {
            self.queued[v.value()] = false;
        }
        next
    }

    fn lifted_externally(&mut self, spm: &Spm, vertex: VertexIndex) {
        self.enqueue_predecessors(spm, vertex);
    }

    fn memory_use(&self) -> usize {
        self.queued.len() * (std::mem::size_of::<VertexIndex>() + 1)
    }
}

// ---------------------------------------------------------------------------------------
// Focus list (swiping with focus)
// ---------------------------------------------------------------------------------------

const INITIAL_CREDIT: u32 = 2;
const CREDIT_INCREASE: u32 = 2;

pub struct FocusListLiftingStrategyFactory {
    pub alternate: bool,
    /// Absolute size if > 1, else a fraction of the number of vertices.
    pub size_ratio: f64,
    /// Maximum lift attempts per phase-2 round, as a multiple of the focus list size.
    pub lift_ratio: f64,
}

impl LiftingStrategyFactory for FocusListLiftingStrategyFactory {
    fn create(&self, game: &ParityGame, _spm: &Spm) -> Option<Box<dyn LiftingStrategy>> {
        let num_vertices = game.num_of_vertices();
        let max_size = if self.size_ratio > 1.0 {
            self.size_ratio as usize
        } else {
            (self.size_ratio * num_vertices as f64) as usize
        };
        let max_size = max_size.clamp(1, num_vertices.max(1));
        let max_lift_attempts = ((self.lift_ratio * max_size as f64) as usize).max(1);

        Some(Box::new(FocusListLiftingStrategy {
            linear: LinearCore::new(num_vertices, self.alternate),
            focus: Vec::with_capacity(max_size),
            max_size,
            max_lift_attempts,
            phase: 1,
            attempts: 0,
            read_pos: 0,
            write_pos: 0,
            current_lifted: false,
        }))
    }
}

struct FocusListLiftingStrategy {
    linear: LinearCore,
    focus: Vec<(VertexIndex, u32)>,
    max_size: usize,
    max_lift_attempts: usize,
    phase: u8,
    attempts: usize,
    read_pos: usize,
    write_pos: usize,
    current_lifted: bool,
}

impl FocusListLiftingStrategy {
    fn lifted(&mut self, vertex: VertexIndex) {
        if self.phase == 1 {
            self.linear.lifted();
            if self.focus.len() < self.max_size {
                self.focus.push((vertex, INITIAL_CREDIT));
            }
        } else if self.focus.get(self.read_pos).is_some_and(|&(v, _)| v == vertex) {
            self.current_lifted = true;
            // A focus-phase lift can enable vertices the sweep already passed, so the
            // sweep's consecutive-failure count no longer proves a fixpoint.
            self.linear.lifted();
        }
    }

    fn phase1(&mut self) -> Option<VertexIndex> {
        if self.focus.len() >= self.max_size || self.attempts >= self.linear.num_vertices {
            if self.focus.is_empty() {
                return None;
            }
            self.phase = 2;
            self.attempts = 0;
            self.read_pos = 0;
            self.write_pos = 0;
            self.current_lifted = false;
            return self.phase2();
        }
        self.linear.next()
    }

    fn phase2(&mut self) -> Option<VertexIndex> {
        if self.attempts > 0 {
            // Settle the entry attempted last: reward a lift, halve the credit otherwise,
            // drop it once the credit is spent.
            let (vertex, credit) = self.focus[self.read_pos];
            self.read_pos += 1;
            if self.current_lifted {
                self.focus[self.write_pos] = (vertex, credit + CREDIT_INCREASE);
                self.write_pos += 1;
            } else if credit > 0 {
                self.focus[self.write_pos] = (vertex, credit / 2);
                self.write_pos += 1;
            }
        }

        if self.read_pos == self.focus.len() {
            self.focus.truncate(self.write_pos);
            self.read_pos = 0;
            self.write_pos = 0;
        }

        if self.focus.is_empty() || self.attempts >= self.max_lift_attempts {
            self.focus.clear();
            self.phase = 1;
            self.attempts = 0;
            return self.phase1();
        }

        self.current_lifted = false;
        Some(self.focus[self.read_pos].0)
    }
}

impl LiftingStrategy for FocusListLiftingStrategy {
    fn next(&mut self, _spm: &Spm, prev: Option<VertexIndex>, prev_lifted: bool) -> Option<VertexIndex> {
        if let (Some(p), true) = (prev, prev_lifted) {
            self.lifted(p);
        }
        let result = if self.phase == 1 { self.phase1() } else { self.phase2() };
        self.attempts += 1;
        result
    }

    fn lifted_externally(&mut self, _spm: &Spm, vertex: VertexIndex) {
        self.lifted(vertex);
    }

    fn memory_use(&self) -> usize {
        self.focus.capacity() * std::mem::size_of::<(VertexIndex, u32)>()
    }
}

// ---------------------------------------------------------------------------------------
// Measure-ordered strategies (max-measure, min-measure, max-step)
// ---------------------------------------------------------------------------------------

/// Tie-breaking order for equal keys in the measure-ordered strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapOrder {
    /// First-in, first-out on insertion time.
    Queue,
    /// Last-in, first-out on insertion time.
    Stack,
    /// Whatever the heap surfaces.
    Heap,
}

/// Key metric for the measure-ordered strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapMetric {
    /// The measure the vertex would be lifted to (its extremal successor's vector).
    MaxValue,
    /// The difference between the would-be new measure and the current one.
    MaxStep,
    /// The smallest current measure first.
    MinValue,
}

pub struct MaxMeasureLiftingStrategyFactory {
    pub order: HeapOrder,
    pub metric: HeapMetric,
}

impl LiftingStrategyFactory for MaxMeasureLiftingStrategyFactory {
    fn supports_version(&self, version: u8) -> bool {
        version == 2
    }

    fn create2(&self, game: &ParityGame, _spm: &Spm) -> Option<Box<dyn LiftingStrategy2>> {
        let n = game.num_of_vertices();
        Some(Box::new(MaxMeasureLiftingStrategy {
            order: self.order,
            metric: self.metric,
            next_id: 0,
            insert_id: vec![0; n],
            pq_pos: vec![None; n],
            pq: Vec::with_capacity(n),
            bumped: Vec::new(),
        }))
    }
}

/// A binary heap indexed by vertex, so a queued vertex whose key changed can be repositioned
/// without searching. Repositioning is deferred: [`LiftingStrategy2::push`] and
/// [`LiftingStrategy2::bump`] only record the touched heap slots, and the next
/// [`LiftingStrategy2::pop`] repairs them in one batch against the engine's live measures.
struct MaxMeasureLiftingStrategy {
    order: HeapOrder,
    metric: HeapMetric,
    next_id: u64,
    insert_id: Vec<u64>,
    pq_pos: Vec<Option<usize>>,
    pq: Vec<usize>,
    bumped: Vec<usize>,
}

/// Compares the step sizes of lifting `v1` to `v2` against lifting `w1` to `w2`, assuming
/// the targets dominate the sources on their respective prefixes.
fn cmp_step(v1: &[u32], v2: &[u32], v_len: usize, v_carry: bool, w1: &[u32], w2: &[u32], w_len: usize, w_carry: bool) -> i32 {
    let mut i = 0;
    while i < v_len || i < w_len {
        let a: i64 = if i < v_len { i64::from(v2[i]) - i64::from(v1[i]) } else { 0 };
        let b: i64 = if i < w_len { i64::from(w2[i]) - i64::from(w1[i]) } else { 0 };
        if a != b {
            return if a > b { 1 } else { -1 };
        }
        i += 1;
    }
    if v_carry || w_carry {
        if !w_carry {
            return 1;
        }
        if !v_carry {
            return -1;
        }
        if v_len < w_len {
            return 1;
        }
        if v_len > w_len {
            return -1;
        }
    }
    0
}

impl MaxMeasureLiftingStrategy {
    fn cmp(&self, spm: &Spm, i: usize, j: usize) -> i32 {
        let v = self.pq[i];
        let w = self.pq[j];
        let vv = VertexIndex::new(v);
        let wv = VertexIndex::new(w);

        let mut d = match self.metric {
            HeapMetric::MaxValue => {
                ordering_to_int(spm.vector_cmp(spm.cached_successor(vv), spm.cached_successor(wv), spm.len()))
            }
            HeapMetric::MinValue => {
                -ordering_to_int(spm.vector_cmp(spm.cached_successor(vv), spm.cached_successor(wv), spm.len()))
            }
            HeapMetric::MaxStep => cmp_step(
                spm.vector(vv),
                spm.vector(spm.cached_successor(vv)),
                spm.len_for(vv),
                spm.compare_strict(vv),
                spm.vector(wv),
                spm.vector(spm.cached_successor(wv)),
                spm.len_for(wv),
                spm.compare_strict(wv),
            ),
        };

        if d == 0 {
            d = match self.order {
                HeapOrder::Queue => cmp_ids(self.insert_id[w], self.insert_id[v]),
                HeapOrder::Stack => cmp_ids(self.insert_id[v], self.insert_id[w]),
                HeapOrder::Heap => 0,
            };
        }
        d
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.pq.swap(i, j);
        self.pq_pos[self.pq[i]] = Some(i);
        self.pq_pos[self.pq[j]] = Some(j);
    }

    fn move_up(&mut self, spm: &Spm, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.cmp(spm, i, parent) > 0 {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn move_down(&mut self, spm: &Spm, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let d = if left < self.pq.len() { self.cmp(spm, i, left) } else { 1 };
            let e = if right < self.pq.len() { self.cmp(spm, i, right) } else { 1 };

            if d < 0 && e < 0 {
                let largest = if self.cmp(spm, left, right) >= 0 { left } else { right };
                self.swap(i, largest);
                i = largest;
            } else if d < 0 {
                self.swap(i, left);
                i = left;
            } else if e < 0 {
                self.swap(i, right);
                i = right;
            } else {
                break;
            }
        }
    }

    fn settle_bumped(&mut self, spm: &Spm) {
        if self.bumped.is_empty() {
            return;
        }
        let mut bumped = std::mem::take(&mut self.bumped);
        bumped.sort_unstable();
        bumped.dedup();
        for &position in &bumped {
            if position < self.pq.len() {
                self.move_up(spm, position);
            }
        }
        // Minimizing metrics also need the bumped entries moved down, since an increased
        // measure can push a candidate towards the back of the queue.
        if self.metric != HeapMetric::MaxValue {
            for &position in bumped.iter().rev() {
                if position < self.pq.len() {
                    self.move_down(spm, position);
                }
            }
        }
    }
}

fn cmp_ids(x: u64, y: u64) -> i32 {
    (x > y) as i32 - (x < y) as i32
}

fn ordering_to_int(ordering: std::cmp::Ordering) -> i32 {
    match ordering {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

impl LiftingStrategy2 for MaxMeasureLiftingStrategy {
    fn push(&mut self, _spm: &Spm, vertex: VertexIndex) {
        let v = vertex.value();
        debug_assert!(self.pq_pos[v].is_none());
        let position = self.pq.len();
        self.pq.push(v);
        self.pq_pos[v] = Some(position);
        self.insert_id[v] = self.next_id;
        self.next_id += 1;
        self.bumped.push(position);
    }

    fn bump(&mut self, _spm: &Spm, vertex: VertexIndex) {
        if let Some(position) = self.pq_pos[vertex.value()] {
            self.bumped.push(position);
        }
    }

    fn pop(&mut self, spm: &Spm) -> Option<VertexIndex> {
        self.settle_bumped(spm);

        if self.pq.is_empty() {
            return None;
        }

        let v = self.pq[0];
        self.pq_pos[v] = None;
        let last = self.pq.pop().expect("heap is non-empty");
        if !self.pq.is_empty() {
            self.pq[0] = last;
            self.pq_pos[last] = Some(0);
            self.move_down(spm, 0);
        }
        Some(VertexIndex::new(v))
    }

    fn memory_use(&self) -> usize {
        self.pq_pos.len() * (2 * std::mem::size_of::<usize>() + std::mem::size_of::<u64>())
    }
}

// ---------------------------------------------------------------------------------------
// Old max-measure (legacy ordered-set implementation)
// ---------------------------------------------------------------------------------------

pub struct OldMaxMeasureLiftingStrategyFactory;

impl LiftingStrategyFactory for OldMaxMeasureLiftingStrategyFactory {
    fn create(&self, game: &ParityGame, _spm: &Spm) -> Option<Box<dyn LiftingStrategy>> {
        let n = game.num_of_vertices();
        let mut strategy = OldMaxMeasureLiftingStrategy {
            queue: BTreeSet::new(),
            key: vec![None; n],
        };
        // Everything starts queued below any real measure.
        for v in 0..n {
            strategy.queue.insert(((false, Vec::new()), v));
            strategy.key[v] = Some((false, Vec::new()));
        }
        Some(Box::new(strategy))
    }
}

/// Measure keys order as the measures themselves, with `Top` above every finite vector.
type MeasureKey = (bool, Vec<u32>);

struct OldMaxMeasureLiftingStrategy {
    queue: BTreeSet<(MeasureKey, usize)>,
    key: Vec<Option<MeasureKey>>,
}

impl OldMaxMeasureLiftingStrategy {
    fn lifted(&mut self, spm: &Spm, vertex: VertexIndex) {
        let measure: MeasureKey = (spm.is_top(vertex), spm.vector(vertex).to_vec());

        for u in spm.game().graph().pred(vertex) {
            let u = u.value();
            if let Some(existing) = &self.key[u] {
                // Skip predecessors already queued with an equal or greater weight.
                if *existing >= measure {
                    continue;
                }
                self.queue.remove(&(existing.clone(), u));
            }
            self.queue.insert((measure.clone(), u));
            self.key[u] = Some(measure.clone());
        }
    }
}

impl LiftingStrategy for OldMaxMeasureLiftingStrategy {
    fn next(&mut self, spm: &Spm, prev: Option<VertexIndex>, prev_lifted: bool) -> Option<VertexIndex> {
        if let (Some(p), true) = (prev, prev_lifted) {
            self.lifted(spm, p);
        }
        let entry = self.queue.last().cloned()?;
        self.queue.remove(&entry);
        let v = entry.1;
        self.key[v] = None;
        Some(VertexIndex::new(v))
    }

    fn lifted_externally(&mut self, spm: &Spm, vertex: VertexIndex) {
        self.lifted(spm, vertex);
    }
}

// ---------------------------------------------------------------------------------------
// LinPred: linear passes re-seeded from lifted vertices' predecessors
// ---------------------------------------------------------------------------------------

pub struct LinPredLiftingStrategyFactory;

impl LiftingStrategyFactory for LinPredLiftingStrategyFactory {
    fn create(&self, game: &ParityGame, _spm: &Spm) -> Option<Box<dyn LiftingStrategy>> {
        Some(Box::new(LinPredLiftingStrategy {
            current: game.iter_vertices().collect(),
            next_pass: Vec::new(),
            position: 0,
        }))
    }
}

struct LinPredLiftingStrategy {
    current: Vec<VertexIndex>,
    next_pass: Vec<VertexIndex>,
    position: usize,
}

impl LinPredLiftingStrategy {
    fn lifted(&mut self, spm: &Spm, vertex: VertexIndex) {
        self.next_pass.extend(spm.game().graph().pred(vertex));
    }
}

impl LiftingStrategy for LinPredLiftingStrategy {
    fn next(&mut self, spm: &Spm, prev: Option<VertexIndex>, prev_lifted: bool) -> Option<VertexIndex> {
        if let (Some(p), true) = (prev, prev_lifted) {
            self.lifted(spm, p);
        }
        if self.position == self.current.len() {
            self.next_pass.sort_unstable();
            self.next_pass.dedup();
            self.current.clear();
            std::mem::swap(&mut self.current, &mut self.next_pass);
            self.position = 0;
        }
        if self.position == self.current.len() {
            return None;
        }
        let v = self.current[self.position];
        self.position += 1;
        Some(v)
    }

    fn lifted_externally(&mut self, spm: &Spm, vertex: VertexIndex) {
        self.lifted(spm, vertex);
    }

    fn memory_use(&self) -> usize {
        (self.current.capacity() + self.next_pass.capacity()) * std::mem::size_of::<VertexIndex>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_rejects_unknown_name() {
        assert!(matches!(
            parse_strategy("not-a-strategy"),
            Err(PgError::InvalidStrategyDescriptor { .. })
        ));
    }

    #[test]
    fn test_parse_strategy_rejects_out_of_range_order() {
        assert!(parse_strategy("maxmeasure:7").is_err());
        assert!(parse_strategy("minmeasure:-1").is_err());
    }

    #[test]
    fn test_parse_strategy_accepts_arguments_and_defaults() {
        assert!(parse_strategy("linear").is_ok());
        assert!(parse_strategy("LINEAR:1").is_ok());
        assert!(parse_strategy("pred:1").is_ok());
        assert!(parse_strategy("focuslist:0:0.2:5").is_ok());
        assert!(parse_strategy("focus:::").is_ok());
        assert!(parse_strategy("maxmeasure:0").is_ok());
        assert!(parse_strategy("maxstep").is_ok());
        assert!(parse_strategy("oldmaxmeasure").is_ok());
        assert!(parse_strategy("linpred").is_ok());
    }

    #[test]
    fn test_max_measure_factory_is_second_generation() {
        let factory = parse_strategy("maxmeasure").unwrap();
        assert!(factory.supports_version(2));
        assert!(!factory.supports_version(1));

        let factory = parse_strategy("linear").unwrap();
        assert!(factory.supports_version(1));
    }

    #[test]
    fn test_linear_core_terminates_after_consecutive_failures() {
        let mut core = LinearCore::new(3, false);
        let mut seen = Vec::new();
        while let Some(v) = core.next() {
            seen.push(v.value());
        }
        assert_eq!(seen, vec![0, 1, 2]);

        let mut core = LinearCore::new(3, true);
        let mut seen = Vec::new();
        while let Some(v) = core.next() {
            seen.push(v.value());
        }
        // Alternating allows 2V - 1 consecutive failures: one full sweep plus the return trip.
        assert_eq!(seen, vec![0, 1, 2, 1, 0]);
    }
}
