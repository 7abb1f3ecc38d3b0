//! Transposition table for caching search results.
//!
//! A direct-mapped table of `2^bits` slots. The low `bits` of a position
//! hash select the slot and the remaining high bits are stored as a tag to
//! detect (most) collisions. Tag matches are not proof of identity; the table
//! is a lossy cache.

use rand::prelude::*;

use crate::board::{Board, Move, MoveError};
use crate::config::ConfigError;
use crate::logging::{log_debug, log_info};

/// Table size used when none is configured (32M slots).
pub const DEFAULT_TABLE_BITS: u8 = 25;

/// Largest accepted table size (1G slots).
pub const MAX_TABLE_BITS: u8 = 30;

/// Longest line `principal_variation` will follow.
pub const PV_DEPTH_LIMIT: usize = 5;

/// Range of a replacement roll for `ReplacementPolicy::DepthPreferred`.
pub const REPLACE_ROLL_RANGE: u16 = 32768;

const POLICY_SEED: u64 = 0x7470_7461_626c_6521;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed high)
    UpperBound, // Score is at most this value (failed low)
}

/// One table slot. A slot with no node type is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableEntry {
    pub tag: u64,
    pub best_move: Move,
    pub eval: i16,
    pub node_type: Option<NodeType>,
    pub depth: u8,
}

impl TableEntry {
    pub const EMPTY: TableEntry = TableEntry {
        tag: 0,
        best_move: Move::null(),
        eval: 0,
        node_type: None,
        depth: 0,
    };

    #[must_use]
    pub fn new(best_move: Move, eval: i16, node_type: NodeType, depth: u8) -> Self {
        TableEntry {
            tag: 0,
            best_move,
            eval,
            node_type: Some(node_type),
            depth,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_type.is_none()
    }

    pub fn best_move(&self) -> Move {
        self.best_move
    }

    pub fn eval(&self) -> i16 {
        self.eval
    }

    pub fn node_type(&self) -> Option<NodeType> {
        self.node_type
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }
}

impl Default for TableEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// How `put` treats an occupied slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplacementPolicy {
    /// Every store overwrites the slot.
    #[default]
    AlwaysReplace,
    /// Keep the incumbent unless it is empty, the new search is deeper, or a
    /// roll in `0..32768` exceeds `replace_roll`.
    DepthPreferred { replace_roll: u16 },
}

/// Table size and replacement policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableConfig {
    pub bits: u8,
    pub policy: ReplacementPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            bits: DEFAULT_TABLE_BITS,
            policy: ReplacementPolicy::default(),
        }
    }
}

impl TableConfig {
    /// Reject sizes outside `1..=MAX_TABLE_BITS` bits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (1..=MAX_TABLE_BITS).contains(&self.bits) {
            Ok(())
        } else {
            Err(ConfigError::TableBits { bits: self.bits })
        }
    }
}

/// What the principal-variation walk needs from a board.
pub trait Position {
    fn hash(&self) -> u64;

    /// Play `mv`, remembering how to take it back.
    fn play(&mut self, mv: Move) -> Result<(), MoveError>;

    /// Take back the most recent `play`.
    fn undo(&mut self);
}

impl Position for Board {
    fn hash(&self) -> u64 {
        self.hash
    }

    fn play(&mut self, mv: Move) -> Result<(), MoveError> {
        let info = self.make_move(mv)?;
        self.history.push((mv, info));
        Ok(())
    }

    fn undo(&mut self) {
        if let Some((mv, info)) = self.history.pop() {
            self.unmake_move(mv, info);
        }
    }
}

/// Single-threaded direct-mapped transposition table.
pub struct TranspositionTable {
    entries: Box<[TableEntry]>,
    bits: u8,
    mask: u64,
    policy: ReplacementPolicy,
    rng: StdRng,
}

impl TranspositionTable {
    /// A table of `2^bits` slots that always replaces.
    pub fn new(bits: u8) -> Result<Self, ConfigError> {
        Self::with_config(TableConfig {
            bits,
            policy: ReplacementPolicy::AlwaysReplace,
        })
    }

    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let len = 1usize << config.bits;
        log_info!(
            "transposition table: {} slots, {} MiB, {:?}",
            len,
            (len * std::mem::size_of::<TableEntry>()) >> 20,
            config.policy
        );
        Ok(TranspositionTable {
            entries: vec![TableEntry::EMPTY; len].into_boxed_slice(),
            bits: config.bits,
            mask: (len as u64) - 1,
            policy: config.policy,
            rng: StdRng::seed_from_u64(POLICY_SEED),
        })
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    #[inline]
    fn tag(&self, hash: u64) -> u64 {
        hash >> self.bits
    }

    /// Store a search result for `hash`, subject to the replacement policy.
    pub fn put(&mut self, hash: u64, best_move: Move, eval: i16, node_type: NodeType, depth: u8) {
        self.put_entry(hash, TableEntry::new(best_move, eval, node_type, depth));
    }

    /// Store a prepared entry; its tag is overwritten with the one for `hash`.
    pub fn put_entry(&mut self, hash: u64, mut entry: TableEntry) {
        let idx = self.index(hash);
        entry.tag = self.tag(hash);
        if self.should_replace(idx, entry.depth) {
            self.entries[idx] = entry;
        }
    }

    fn should_replace(&mut self, idx: usize, depth: u8) -> bool {
        match self.policy {
            ReplacementPolicy::AlwaysReplace => true,
            ReplacementPolicy::DepthPreferred { replace_roll } => {
                let incumbent = self.entries[idx];
                incumbent.is_empty()
                    || self.rng.gen_range(0..REPLACE_ROLL_RANGE) > replace_roll
                    || depth > incumbent.depth
            }
        }
    }

    /// The entry stored for `hash`, if its tag matches.
    #[must_use]
    pub fn get(&self, hash: u64) -> Option<&TableEntry> {
        let entry = &self.entries[self.index(hash)];
        if !entry.is_empty() && entry.tag == self.tag(hash) {
            Some(entry)
        } else {
            None
        }
    }

    /// `get` keyed by a position's hash.
    #[must_use]
    pub fn probe<P: Position>(&self, position: &P) -> Option<&TableEntry> {
        self.get(position.hash())
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        self.entries.fill(TableEntry::EMPTY);
        log_debug!("transposition table cleared");
    }

    /// Follow stored best moves from `position`, returning the line found.
    ///
    /// Stops after `PV_DEPTH_LIMIT` plies, on a miss, on a null move, or when
    /// a stored move cannot be played. Every ply played is undone before
    /// returning, so `position` is left as it was.
    pub fn principal_variation<P: Position>(&self, position: &mut P) -> Vec<Move> {
        let mut line = Vec::with_capacity(PV_DEPTH_LIMIT);
        while line.len() < PV_DEPTH_LIMIT {
            let Some(entry) = self.get(position.hash()) else {
                break;
            };
            let mv = entry.best_move;
            if mv.is_null() || position.play(mv).is_err() {
                break;
            }
            line.push(mv);
        }
        for _ in 0..line.len() {
            position.undo();
        }
        log_debug!("principal variation: {} plies", line.len());
        line
    }

    /// Occupancy in per mille, sampled over the first 1000 slots.
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample = &self.entries[..self.entries.len().min(1000)];
        let occupied = sample.iter().filter(|e| !e.is_empty()).count();
        ((occupied * 1000) / sample.len()) as u32
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(TableEntry::is_empty)
    }

    #[must_use]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    #[must_use]
    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }
}
