//! Hangar floor geometry: numbered stands, the outside apron, slot ordinals,
//! and the interference relation between stands.

use std::fmt;

/// Number of physical stands on the default hangar floor.
pub const DEFAULT_STAND_COUNT: u8 = 5;

/// A place an aircraft can occupy.
///
/// The set of positions is closed and totally ordered: stands come first,
/// ordered by their number, and [`Position::Outside`] is always last.
/// `Outside` is a conceptual stand representing "off the hangar floor"; it is
/// where entry and exit marker jobs take place and where aircraft can wait
/// without blocking a physical stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    /// Numbered physical stand, 1-based.
    Stand(u8),
    /// The apron outside the hangar.
    Outside,
}

impl Position {
    pub fn is_outside(self) -> bool {
        matches!(self, Position::Outside)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Stand(n) => write!(f, "position{n}"),
            Position::Outside => write!(f, "outside"),
        }
    }
}

/// Ordinal time-slot token.
///
/// A slot is a bucket on a position's timeline, not a calendar interval; the
/// continuous start/finish times of whatever occupies the slot are decided by
/// the optimiser. Slots are totally ordered by their index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot(usize);

impl Slot {
    pub const fn new(index: usize) -> Self {
        Slot(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    /// The immediately preceding slot, if this is not the first one.
    pub fn prev(self) -> Option<Slot> {
        self.0.checked_sub(1).map(Slot)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot{}", self.0)
    }
}

/// Physical layout of the hangar: how many stands exist and which pairs of
/// positions interfere.
///
/// Interference is symmetric: `{p, q}` in the list means aircraft may not be
/// present in `p` and `q` at overlapping times. Pairs are stored in canonical
/// (ascending) order and deduplicated, so configuration order never matters.
#[derive(Debug, Clone, PartialEq)]
pub struct HangarLayout {
    stand_count: u8,
    interference: Vec<(Position, Position)>,
}

impl Default for HangarLayout {
    fn default() -> Self {
        Self::new(DEFAULT_STAND_COUNT, Self::default_interference())
    }
}

impl HangarLayout {
    /// Creates a layout with `stand_count` stands and the given interference
    /// pairs. Self-pairs are dropped; duplicates (in either orientation)
    /// collapse to one canonical pair.
    pub fn new(stand_count: u8, pairs: Vec<(Position, Position)>) -> Self {
        let mut interference: Vec<(Position, Position)> = pairs
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect();
        interference.sort();
        interference.dedup();
        Self {
            stand_count,
            interference,
        }
    }

    /// The four interference pairs of the reference hangar: the back stands
    /// 3, 4 and 5 block each other's towing paths and the apron.
    pub fn default_interference() -> Vec<(Position, Position)> {
        vec![
            (Position::Stand(3), Position::Stand(5)),
            (Position::Stand(4), Position::Stand(5)),
            (Position::Outside, Position::Stand(4)),
            (Position::Outside, Position::Stand(5)),
        ]
    }

    pub fn stand_count(&self) -> u8 {
        self.stand_count
    }

    /// All positions in their canonical order: stands 1..=N, then outside.
    pub fn positions(&self) -> Vec<Position> {
        (1..=self.stand_count)
            .map(Position::Stand)
            .chain(std::iter::once(Position::Outside))
            .collect()
    }

    /// Canonical unordered interference pairs.
    pub fn interference_pairs(&self) -> &[(Position, Position)] {
        &self.interference
    }

    /// True if `a` and `b` may not host aircraft at overlapping times.
    pub fn interferes(&self, a: Position, b: Position) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.interference.binary_search(&key).is_ok()
    }
}
