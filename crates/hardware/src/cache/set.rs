//! One cache set: its ways and their LRU bookkeeping.
//!
//! Recency is tracked with a bounded counter per line rather than a usage
//! stack. The most recently used line holds `ways - 1` and the least recently
//! used line, along with every line that was never filled, sits at 0. Valid
//! lines never share a rank.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `probe()`: O(W) where W is the number of ways (associativity)
//!   - `touch()`: O(W)
//!   - `evict_target()`: O(W)
//! - **Space Complexity:** O(W) per set; the cache model stores all sets in one allocation
//! - **No auxiliary ordered structure:** one counter per line is the whole state

/// A single cache line (one way of a set).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheLine {
    tag: u32,
    valid: bool,
    recency: u32,
}

impl CacheLine {
    /// Tag of the resident block, or `None` for an empty line.
    pub const fn tag(&self) -> Option<u32> {
        if self.valid { Some(self.tag) } else { None }
    }

    /// Whether the line holds a block.
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// LRU rank within the set; higher means more recently used.
    pub const fn recency(&self) -> u32 {
        self.recency
    }
}

/// A fixed number of ways with true-LRU ordering.
///
/// `S` is the line storage. A standalone set owns a boxed slice; the cache
/// model keeps every line in one flat array and hands out borrowed views
/// (`CacheSet<&[CacheLine]>` and `CacheSet<&mut [CacheLine]>`) over the
/// `ways` lines of one set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSet<S = Box<[CacheLine]>> {
    lines: S,
}

impl CacheSet {
    /// Creates a set with `ways` empty lines.
    ///
    /// `ways` must be at least 1; `CacheConfig::validate` guarantees this
    /// for sets built by the cache model.
    pub fn new(ways: usize) -> Self {
        debug_assert!(ways >= 1, "a cache set needs at least one way");
        Self {
            lines: vec![CacheLine::default(); ways].into_boxed_slice(),
        }
    }
}

impl<S: AsRef<[CacheLine]>> CacheSet<S> {
    /// Wraps existing line storage; every line is one way.
    pub const fn from_lines(lines: S) -> Self {
        Self { lines }
    }

    /// Associativity of this set.
    pub fn ways(&self) -> usize {
        self.lines.as_ref().len()
    }

    /// All lines, indexed by way.
    pub fn lines(&self) -> &[CacheLine] {
        self.lines.as_ref()
    }

    /// The line in `way`, if it exists.
    pub fn line(&self, way: usize) -> Option<&CacheLine> {
        self.lines().get(way)
    }

    /// Number of valid lines.
    pub fn occupancy(&self) -> usize {
        self.lines().iter().filter(|line| line.valid).count()
    }

    /// Finds the way holding `tag`.
    ///
    /// Scans in ascending way order and returns the first valid match.
    #[inline]
    pub fn probe(&self, tag: u32) -> Option<usize> {
        self.lines()
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Way to replace on a miss: the lowest-indexed line with rank 0.
    ///
    /// Empty lines also hold rank 0, so they are filled (lowest index first)
    /// before any valid block is evicted.
    #[inline]
    pub fn evict_target(&self) -> usize {
        // Ranks of valid lines are distinct and below `ways`, so some line is at 0.
        self.lines()
            .iter()
            .position(|line| line.recency == 0)
            .unwrap_or(0)
    }

    fn mru_rank(&self) -> u32 {
        (self.ways() - 1) as u32
    }
}

impl<S: AsRef<[CacheLine]> + AsMut<[CacheLine]>> CacheSet<S> {
    /// Marks `way` as the most recently used line.
    ///
    /// The touched line gets the maximum rank `ways - 1`. Every other line
    /// ranked above the touched line's previous rank moves down by one, which
    /// keeps the ranks of valid lines distinct. A freshly filled line sits at
    /// rank 0, so after a fill every other non-zero line moves down.
    #[inline]
    pub fn touch(&mut self, way: usize) {
        let mru = self.mru_rank();
        let lines = self.lines.as_mut();
        let previous = lines[way].recency;
        for (i, line) in lines.iter_mut().enumerate() {
            if i == way {
                line.recency = mru;
            } else if line.recency > previous {
                line.recency -= 1;
            }
        }
    }

    /// Installs `tag` in `way`, returning the tag it replaced, if any.
    ///
    /// Does not update recency; callers follow up with [`CacheSet::touch`].
    #[inline]
    pub fn fill(&mut self, way: usize, tag: u32) -> Option<u32> {
        let line = &mut self.lines.as_mut()[way];
        let evicted = line.tag();
        line.tag = tag;
        line.valid = true;
        evicted
    }

    /// Empties every line and resets all ranks to 0.
    pub fn clear(&mut self) {
        self.lines.as_mut().fill(CacheLine::default());
    }
}
