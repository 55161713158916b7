use std::cmp::Ordering;
use std::io::Read;
use std::io::Write;

use log::debug;
use pg_game::ParityGame;
use pg_game::Player;
use pg_graph::EdgeDirection;
use pg_graph::VertexIndex;
use pg_graph::is_no_vertex;
use pg_graph::no_vertex;
use pg_io::BitStreamReader;
use pg_io::BitStreamWriter;
use pg_io::read_header;
use pg_io::write_header;
use pg_utilities::PgError;
use pg_utilities::check_abort;

use crate::VertexSet;
use crate::lifting::LiftingStrategy;
use crate::lifting::LiftingStrategy2;
use crate::lifting::LiftingStrategyFactory;
use crate::lifting::parse_strategy;
use crate::statistics::LiftingStatistics;
use crate::wrappers::merge_vertex_maps;

/// How many lift attempts the engine makes between cooperative abort checks.
const WORK_SIZE: usize = 10_000;

/// Progress-measure store for one player over one game.
///
/// Each vertex carries a vector of `len` bounded counters, or the `Top` sentinel. Component
/// `n` counts visits to the `n`-th largest priority of the opposing parity, so component 0
/// is the most significant and a vector is compared lexicographically from it. A vertex of
/// priority `q` only owns the leading `len_for(q)` components (those for priorities at least
/// `q`); its remaining components are always zero.
///
/// At the lifting fixpoint, `player` wins exactly the vertices whose measure stayed finite.
pub struct Spm<'a> {
    game: &'a ParityGame,
    player: Player,
    len: usize,
    bounds: Vec<u32>,
    /// The priority component 0 stands for: the largest priority of the opposing parity
    /// below the game's priority limit. `None` when no such priority exists, in which case
    /// nothing is ever lifted.
    top_priority: Option<usize>,
    vectors: Vec<u32>,
    top: Vec<bool>,
    strat: Vec<VertexIndex>,
    dirty: Vec<bool>,
    vmap: Vec<VertexIndex>,
}

impl<'a> Spm<'a> {
    /// Builds a measure store for `player` over `game`, with every vector at zero except
    /// that opposing vertices whose only move is a self-loop start at `Top`. `game` should
    /// already have had dominated self-loops pruned (see [`preprocess_self_loops`]).
    ///
    /// `vmap` translates this game's vertex indices to the outermost game's indices for
    /// statistics reporting; pass an empty slice for the identity.
    pub fn new(game: &'a ParityGame, player: Player, vmap: Vec<VertexIndex>) -> Self {
        let p = player.to_index();
        let d = game.priority_limit();
        let len = ((d + p) / 2).max(1);

        let opposite = 1 - p;
        let top_priority = if (d - 1) % 2 == opposite {
            Some(d - 1)
        } else if d >= 2 {
            Some(d - 2)
        } else {
            None
        };

        let bounds: Vec<u32> = (0..len)
            .map(|n| match top_priority {
                Some(p0) if 2 * n <= p0 => (game.cardinality(p0 - 2 * n) + 1) as u32,
                _ => 0,
            })
            .collect();

        let num_vertices = game.num_of_vertices();
        let mut spm = Spm {
            game,
            player,
            len,
            bounds,
            top_priority,
            vectors: vec![0; len * num_vertices],
            top: vec![false; num_vertices],
            strat: vec![no_vertex(); num_vertices],
            dirty: vec![false; num_vertices],
            vmap,
        };

        for v in game.iter_vertices() {
            spm.strat[v.value()] = game.outgoing_edges(v).next().unwrap_or_else(no_vertex);
        }

        // A vertex of the opposing parity whose only move is its own self-loop replays that
        // priority forever and is lost outright. Works in conjunction with the self-loop
        // pruning, which leaves exactly such vertices with out-degree one.
        for v in game.iter_vertices() {
            if game.priority(v).value() % 2 == opposite
                && game.graph().outdegree(v) == 1
                && game.graph().has_succ(v, v)
            {
                spm.top[v.value()] = true;
            }
        }

        spm
    }

    pub fn game(&self) -> &ParityGame {
        self.game
    }

    pub fn player(&self) -> Player {
        self.player
    }

    /// The length of every stored vector.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    /// The number of components relevant to `v`: one per opposing-parity priority at least
    /// as large as `v`'s own.
    pub fn len_for(&self, v: VertexIndex) -> usize {
        let q = self.game.priority(v).value();
        match self.top_priority {
            Some(p0) if q <= p0 => (p0 - q) / 2 + 1,
            _ => 0,
        }
    }

    pub fn is_top(&self, v: VertexIndex) -> bool {
        self.top[v.value()]
    }

    /// The stored components of `v`'s vector (all zero when the vertex is at `Top`).
    pub fn vector(&self, v: VertexIndex) -> &[u32] {
        &self.vectors[v.value() * self.len..(v.value() + 1) * self.len]
    }

    /// The cached extremal successor of `v`, as of its last lift attempt.
    pub fn cached_successor(&self, v: VertexIndex) -> VertexIndex {
        self.strat[v.value()]
    }

    /// Whether `v`'s measure must strictly exceed its successor's, which is the case when
    /// its priority has the opposing parity.
    pub fn compare_strict(&self, v: VertexIndex) -> bool {
        self.game.priority(v).value() % 2 != self.player.to_index()
    }

    /// Compares the first `n` components of `v`'s and `w`'s measures; `Top` exceeds every
    /// finite vector.
    pub fn vector_cmp(&self, v: VertexIndex, w: VertexIndex, n: usize) -> Ordering {
        match (self.top[v.value()], self.top[w.value()]) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.vector(v)[..n].cmp(&self.vector(w)[..n]),
        }
    }

    /// The minimum (`take_max` false) or maximum successor of `v` by measure, compared over
    /// `v`'s relevant components. Ties keep the earliest successor.
    fn ext_succ(&self, v: VertexIndex, take_max: bool) -> VertexIndex {
        let n = self.len_for(v);
        let mut iter = self.game.outgoing_edges(v);
        let mut result = iter.next().expect("a proper game has a successor for every vertex");
        for candidate in iter {
            let d = self.vector_cmp(candidate, result, n);
            if (take_max && d == Ordering::Greater) || (!take_max && d == Ordering::Less) {
                result = candidate;
            }
        }
        result
    }

    fn take_max(&self, v: VertexIndex) -> bool {
        self.game.owner(v) != self.player
    }

    fn set_top(&mut self, v: VertexIndex) {
        self.top[v.value()] = true;
        let base = v.value() * self.len;
        self.vectors[base..base + self.len].fill(0);
    }

    /// Attempts to lift `v`'s measure to the least value consistent with its extremal
    /// successor. Returns whether the measure changed.
    pub fn lift(&mut self, v: VertexIndex) -> bool {
        if self.top[v.value()] {
            return false;
        }

        let w = self.ext_succ(v, self.take_max(v));
        self.strat[v.value()] = w;

        if self.top[w.value()] {
            self.set_top(v);
            return true;
        }

        let m = self.len_for(v);
        let d = self.vector_cmp(v, w, m);
        let strict = self.compare_strict(v);
        if d == Ordering::Greater || (d == Ordering::Equal && !strict) {
            return false;
        }

        // Copy the relevant prefix of the successor's vector, adding one at the least
        // significant relevant component when a strict increase is required; a component
        // reaching its bound rolls over to zero and carries upward. Carrying past the most
        // significant component exhausts the lattice.
        let v_base = v.value() * self.len;
        let w_base = w.value() * self.len;
        let mut carry = strict;
        for n in (0..m).rev() {
            let value = self.vectors[w_base + n] + u32::from(carry);
            if value >= self.bounds[n] {
                self.vectors[v_base + n] = 0;
                carry = true;
            } else {
                self.vectors[v_base + n] = value;
                carry = false;
            }
        }
        if carry {
            self.set_top(v);
        }
        true
    }

    /// Forces `v`'s measure to `Top`, returning whether it changed. Used to inject winners
    /// discovered by the dual engine.
    pub fn lift_to_top(&mut self, v: VertexIndex) -> bool {
        if self.top[v.value()] {
            return false;
        }
        self.set_top(v);
        true
    }

    pub(crate) fn is_dirty(&self, v: VertexIndex) -> bool {
        self.dirty[v.value()]
    }

    pub(crate) fn set_dirty(&mut self, v: VertexIndex, dirty: bool) {
        self.dirty[v.value()] = dirty;
    }

    /// Recomputes `v`'s extremal successor and whether a lift attempt on `v` would succeed.
    pub(crate) fn refresh_liftable(&mut self, v: VertexIndex) -> bool {
        if self.top[v.value()] {
            return false;
        }
        let w = self.ext_succ(v, self.take_max(v));
        self.strat[v.value()] = w;
        if self.top[w.value()] {
            return true;
        }
        let d = self.vector_cmp(v, w, self.len_for(v));
        d == Ordering::Less || (d == Ordering::Equal && self.compare_strict(v))
    }

    /// Records the winning moves for this engine's player into `strategy`: every vertex the
    /// player owns and wins moves to its measure-minimal successor. Other entries are left
    /// untouched.
    pub fn get_strategy_into(&self, strategy: &mut [VertexIndex]) {
        for v in self.game.iter_vertices() {
            if !self.top[v.value()] && self.game.owner(v) == self.player {
                strategy[v.value()] = self.ext_succ(v, false);
            }
        }
    }

    /// Vertices currently known to be won by this engine's player, even before the fixpoint
    /// is reached: a vertex is counted once no play from it can still escape into a
    /// possibly-losing region. The estimate is conservative mid-solve and exact at the
    /// fixpoint (where it is the complement of the `Top` set).
    pub fn estimate_winning_set(&self) -> Vec<VertexIndex> {
        let num_vertices = self.game.num_of_vertices();
        let mut marked = vec![false; num_vertices];
        let mut queued = vec![false; num_vertices];
        let mut worklist = std::collections::VecDeque::new();

        for v in self.game.iter_vertices() {
            if self.top[v.value()] {
                marked[v.value()] = true;
            } else {
                queued[v.value()] = true;
                worklist.push_back(v);
            }
        }

        while let Some(v) = worklist.pop_front() {
            queued[v.value()] = false;
            let n = self.len_for(v);
            let threshold = if self.compare_strict(v) { Ordering::Greater } else { Ordering::Equal };

            if self.game.owner(v) == self.player {
                // Marked (possibly losing) unless some unmarked successor already satisfies
                // the progress condition.
                let mut mark = true;
                for w in self.game.outgoing_edges(v) {
                    if !marked[w.value()] && self.vector_cmp(v, w, n) >= threshold {
                        mark = false;
                        break;
                    }
                }
                marked[v.value()] = mark;
            } else {
                for w in self.game.outgoing_edges(v) {
                    if marked[w.value()] || self.vector_cmp(v, w, n) < threshold {
                        marked[v.value()] = true;
                        break;
                    }
                }
            }

            if marked[v.value()] {
                for u in self.game.graph().pred(v) {
                    if !marked[u.value()] && !queued[u.value()] {
                        queued[u.value()] = true;
                        worklist.push_back(u);
                    }
                }
            }
        }

        self.game.iter_vertices().filter(|v| !marked[v.value()]).collect()
    }

    fn outer_index(&self, v: VertexIndex) -> usize {
        if v.value() < self.vmap.len() {
            self.vmap[v.value()].value()
        } else {
            v.value()
        }
    }

    /// Persists the per-vertex measures and cached successors, so a stopped solve can be
    /// resumed or audited later (see [`read_progress_measure_state`]).
    pub fn write_state<W: Write>(&self, writer: &mut W) -> Result<(), PgError> {
        let mut stream = BitStreamWriter::new(writer);
        write_header(&mut stream)?;
        stream.write_integer(self.top.len() as u64)?;
        stream.write_integer(self.len as u64)?;

        for v in self.game.iter_vertices() {
            stream.write_bits(u64::from(self.top[v.value()]), 1)?;
            if !self.top[v.value()] {
                for component in self.vector(v) {
                    stream.write_integer(u64::from(*component))?;
                }
            }
            let mv = self.strat[v.value()];
            let encoded = if is_no_vertex(mv) { self.top.len() as u64 } else { mv.value() as u64 };
            stream.write_integer(encoded)?;
        }

        Ok(())
    }

    /// Overwrites the measures and cached successors from a previously persisted state,
    /// which must have been produced against a game with the same vertex count and player.
    pub fn load_state(&mut self, state: ProgressMeasureState) {
        assert_eq!(state.top.len(), self.top.len(), "progress measure state vertex count mismatch");
        assert_eq!(state.len, self.len, "progress measure state vector length mismatch");
        self.top = state.top;
        self.vectors = state.vectors;
        self.strat = state.strat;
    }
}

/// The raw contents of a persisted [`Spm`], as read back by [`read_progress_measure_state`].
pub struct ProgressMeasureState {
    pub len: usize,
    pub top: Vec<bool>,
    pub vectors: Vec<u32>,
    pub strat: Vec<VertexIndex>,
}

/// Reads a state written by [`Spm::write_state`].
pub fn read_progress_measure_state<R: Read>(reader: &mut R) -> Result<ProgressMeasureState, PgError> {
    let mut stream = BitStreamReader::new(reader);
    read_header(&mut stream)?;
    let num_vertices = stream.read_integer()? as usize;
    let len = stream.read_integer()? as usize;

    let mut top = Vec::with_capacity(num_vertices);
    let mut vectors = vec![0u32; len * num_vertices];
    let mut strat = Vec::with_capacity(num_vertices);

    for v in 0..num_vertices {
        let is_top = stream.read_bits(1)? != 0;
        top.push(is_top);

        if !is_top {
            for n in 0..len {
                vectors[v * len + n] = stream.read_integer()? as u32;
            }
        }

        let encoded = stream.read_integer()? as usize;
        strat.push(if encoded == num_vertices { no_vertex() } else { VertexIndex::new(encoded) });
    }

    Ok(ProgressMeasureState { len, top, vectors, strat })
}

/// Drops edges a rational player would never use from a self-loop: when the loop's priority
/// parity matches its owner, looping forever is already optimal and every other outgoing
/// edge can go; when it does not, and other moves exist, the loop itself goes.
pub fn preprocess_self_loops(game: &ParityGame) -> ParityGame {
    let mut obsolete = Vec::new();

    for v in game.iter_vertices() {
        if !game.graph().has_succ(v, v) {
            continue;
        }
        if game.priority(v).value() % 2 == game.owner(v).to_index() {
            for w in game.graph().succ(v) {
                if w != v {
                    obsolete.push((v, w));
                }
            }
        } else if game.graph().outdegree(v) > 1 {
            obsolete.push((v, v));
        }
    }

    if obsolete.is_empty() {
        return game.clone();
    }

    let new_graph = game
        .graph()
        .remove_edges(&obsolete)
        .expect("pruning self-loop edges preserves the vertex range");
    let owner: Vec<Player> = game.iter_vertices().map(|v| game.owner(v)).collect();
    let priority: Vec<_> = game.iter_vertices().map(|v| game.priority(v)).collect();
    ParityGame::from_parts(new_graph, owner, priority, game.priority_limit())
        .expect("pruning self-loop edges preserves labels")
}

enum DriverStrategy {
    V1(Box<dyn LiftingStrategy>),
    V2(Box<dyn LiftingStrategy2>),
}

/// An [`Spm`] store paired with a lifting strategy and the driver loop matching the
/// strategy's API generation.
pub struct SpmEngine<'a> {
    spm: Spm<'a>,
    strategy: DriverStrategy,
    prev: Option<VertexIndex>,
    prev_lifted: bool,
    exhausted: bool,
}

impl<'a> SpmEngine<'a> {
    pub fn new(
        game: &'a ParityGame,
        player: Player,
        factory: &dyn LiftingStrategyFactory,
        vmap: Vec<VertexIndex>,
    ) -> Self {
        let mut spm = Spm::new(game, player, vmap);

        let strategy = if factory.supports_version(2) {
            let mut ls = factory
                .create2(game, &spm)
                .expect("factory claims to support the second-generation API");
            for v in game.iter_vertices() {
                if spm.refresh_liftable(v) {
                    spm.set_dirty(v, true);
                    ls.push(&spm, v);
                }
            }
            DriverStrategy::V2(ls)
        } else {
            DriverStrategy::V1(
                factory
                    .create(game, &spm)
                    .expect("factory claims to support the first-generation API"),
            )
        };

        SpmEngine {
            spm,
            strategy,
            prev: None,
            prev_lifted: false,
            exhausted: false,
        }
    }

    pub fn spm(&self) -> &Spm<'a> {
        &self.spm
    }

    pub fn spm_mut(&mut self) -> &mut Spm<'a> {
        &mut self.spm
    }

    /// Performs one lift attempt. Returns false once the strategy reports a fixpoint.
    fn step(&mut self, stats: &mut LiftingStatistics) -> bool {
        if self.exhausted {
            return false;
        }

        match &mut self.strategy {
            DriverStrategy::V1(ls) => {
                let Some(v) = ls.next(&self.spm, self.prev, self.prev_lifted) else {
                    self.exhausted = true;
                    return false;
                };
                let lifted = self.spm.lift(v);
                stats.record_attempt(self.spm.outer_index(v), lifted);
                self.prev = Some(v);
                self.prev_lifted = lifted;
                true
            }
            DriverStrategy::V2(ls) => {
                let Some(v) = ls.pop(&self.spm) else {
                    self.exhausted = true;
                    return false;
                };
                self.spm.set_dirty(v, false);
                let lifted = self.spm.lift(v);
                stats.record_attempt(self.spm.outer_index(v), lifted);
                if lifted {
                    let predecessors: Vec<VertexIndex> = self.spm.game.graph().pred(v).collect();
                    for u in predecessors {
                        if self.spm.is_top(u) || self.spm.is_dirty(u) {
                            continue;
                        }
                        if self.spm.refresh_liftable(u) {
                            self.spm.set_dirty(u, true);
                            ls.push(&self.spm, u);
                        }
                    }
                }
                true
            }
        }
    }

    /// Performs up to `max_attempts` lift attempts; returns how many were made. A return
    /// value below `max_attempts` means the fixpoint was reached.
    pub fn solve_some(&mut self, stats: &mut LiftingStatistics, max_attempts: usize) -> usize {
        let mut attempts = 0;
        while attempts < max_attempts {
            if !self.step(stats) {
                break;
            }
            attempts += 1;
        }
        attempts
    }

    /// Lifts to the fixpoint, polling the abort flag every [`WORK_SIZE`] attempts. Returns
    /// `None` when aborted.
    pub fn run(&mut self, stats: &mut LiftingStatistics) -> Option<()> {
        loop {
            let attempts = self.solve_some(stats, WORK_SIZE);
            if attempts < WORK_SIZE {
                return Some(());
            }
            if check_abort() {
                return None;
            }
        }
    }

    /// Injects an externally discovered loss: `v`'s measure jumps to `Top` and the lifting
    /// strategy is told so it can re-queue dependents.
    pub fn lift_to_top_external(&mut self, v: VertexIndex) {
        if !self.spm.lift_to_top(v) {
            return;
        }
        match &mut self.strategy {
            DriverStrategy::V1(ls) => ls.lifted_externally(&self.spm, v),
            DriverStrategy::V2(ls) => {
                if self.spm.is_dirty(v) {
                    ls.bump(&self.spm, v);
                    self.spm.set_dirty(v, false);
                }
                let predecessors: Vec<VertexIndex> = self.spm.game.graph().pred(v).collect();
                for u in predecessors {
                    if self.spm.is_top(u) || self.spm.is_dirty(u) {
                        continue;
                    }
                    if self.spm.refresh_liftable(u) {
                        self.spm.set_dirty(u, true);
                        ls.push(&self.spm, u);
                    }
                }
            }
        }
    }

    fn memory_use(&self) -> usize {
        match &self.strategy {
            DriverStrategy::V1(ls) => ls.memory_use(),
            DriverStrategy::V2(ls) => ls.memory_use(),
        }
    }
}

/// Solves `game` with small progress measures, writing the winning strategy into `strategy`
/// (already sized `game.num_of_vertices()` and filled with the no-vertex sentinel).
/// `descriptor` selects the lifting order (see [`parse_strategy`]); `vmap` remaps vertex
/// indices for statistics when solving a wrapper's subgame (empty for the identity).
/// Returns the set of vertices won by Even, or `None` if aborted.
pub fn solve_spm(
    game: &ParityGame,
    descriptor: &str,
    alternate: bool,
    strategy: &mut [VertexIndex],
    stats: &mut LiftingStatistics,
    vmap: &[VertexIndex],
) -> Result<Option<VertexSet>, PgError> {
    let factory = parse_strategy(descriptor)?;
    let processed = preprocess_self_loops(game);
    stats.ensure_capacity(game.num_of_vertices());

    if alternate {
        solve_alternate(&processed, factory.as_ref(), strategy, stats, vmap)
    } else {
        solve_normal(&processed, factory.as_ref(), strategy, stats, vmap)
    }
}

/// Two-pass solve: run the Even engine to its fixpoint, then solve the subgame induced by
/// the `Top` set for Odd to recover Odd's strategy on its winning region.
fn solve_normal(
    game: &ParityGame,
    factory: &dyn LiftingStrategyFactory,
    strategy: &mut [VertexIndex],
    stats: &mut LiftingStatistics,
    vmap: &[VertexIndex],
) -> Result<Option<VertexSet>, PgError> {
    let mut engine = SpmEngine::new(game, Player::Even, factory, vmap.to_vec());
    if engine.run(stats).is_none() {
        return Ok(None);
    }
    debug!(
        "small progress measures fixpoint reached, strategy memory {} bytes",
        engine.memory_use()
    );
    engine.spm().get_strategy_into(strategy);

    let won_by_odd: Vec<VertexIndex> = game.iter_vertices().filter(|&v| engine.spm().is_top(v)).collect();
    let mut even = VertexSet::repeat(true, game.num_of_vertices());
    for &v in &won_by_odd {
        even.set(v.value(), false);
    }

    if !won_by_odd.is_empty() {
        debug!("solving subgame of {} vertices for the opponent", won_by_odd.len());
        let (subgame, _) = game.make_subgame(&won_by_odd, true, EdgeDirection::Bidirectional)?;
        let (subgame, _) = subgame.compress_priorities(None, true);
        let submap = merge_vertex_maps(&won_by_odd, vmap);

        let mut sub_engine = SpmEngine::new(&subgame, Player::Odd, factory, submap);
        if sub_engine.run(stats).is_none() {
            return Ok(None);
        }
        debug_assert!(
            subgame.iter_vertices().all(|v| !sub_engine.spm().is_top(v)),
            "the opponent wins its own winning region outright"
        );

        let mut substrat = vec![no_vertex(); subgame.num_of_vertices()];
        sub_engine.spm().get_strategy_into(&mut substrat);
        for (local, &outer) in won_by_odd.iter().enumerate() {
            let mv = substrat[local];
            if !is_no_vertex(mv) {
                strategy[outer.value()] = won_by_odd[mv.value()];
            }
        }
    }

    Ok(Some(even))
}

/// Alternating solve: run one engine per player over the same game in fixed-size work
/// chunks, and after each chunk inject the vertices one engine already knows it wins into
/// the other engine as `Top`. Once either engine exhausts its candidates, finish the other
/// and combine the strategies.
fn solve_alternate(
    game: &ParityGame,
    factory: &dyn LiftingStrategyFactory,
    strategy: &mut [VertexIndex],
    stats: &mut LiftingStatistics,
    vmap: &[VertexIndex],
) -> Result<Option<VertexSet>, PgError> {
    let mut engines = [
        SpmEngine::new(game, Player::Even, factory, vmap.to_vec()),
        SpmEngine::new(game, Player::Odd, factory, vmap.to_vec()),
    ];
    let chunk = game.num_of_vertices().max(1);

    let mut current = 0;
    loop {
        let attempts = engines[current].solve_some(stats, chunk);
        if check_abort() {
            return Ok(None);
        }

        let winning = engines[current].spm().estimate_winning_set();
        let other = 1 - current;
        for v in winning {
            engines[other].lift_to_top_external(v);
        }

        let finished = attempts < chunk;
        current = other;
        if finished {
            break;
        }
    }

    if engines[current].run(stats).is_none() {
        return Ok(None);
    }

    engines[0].spm().get_strategy_into(strategy);
    engines[1].spm().get_strategy_into(strategy);

    let mut even = VertexSet::repeat(false, game.num_of_vertices());
    for v in game.iter_vertices() {
        if !engines[0].spm().is_top(v) {
            even.set(v.value(), true);
        }
    }
    debug_assert!(
        game.iter_vertices().all(|v| engines[0].spm().is_top(v) != engines[1].spm().is_top(v)),
        "the two engines' finite regions partition the game"
    );

    Ok(Some(even))
}
