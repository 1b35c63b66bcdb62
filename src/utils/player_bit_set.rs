use std::fmt;

/// Set of seat indices. Ten seats fit easily in a `u16`.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerBitSet {
    set: u16,
}

impl PlayerBitSet {
    /// A set holding only `idx`.
    pub fn single(idx: usize) -> Self {
        let mut s = Self::default();
        s.enable(idx);
        s
    }
    pub fn count(&self) -> usize {
        self.set.count_ones() as usize
    }
    pub fn is_empty(&self) -> bool {
        self.set == 0
    }
    /// Seats past the last bit can't be stored and are ignored.
    pub fn enable(&mut self, idx: usize) {
        self.set |= Self::bit(idx);
    }
    pub fn get(&self, idx: usize) -> bool {
        (self.set & Self::bit(idx)) != 0
    }
    /// The mask for `idx`, zero when it's out of range.
    fn bit(idx: usize) -> u16 {
        u32::try_from(idx)
            .ok()
            .and_then(|idx| 1u16.checked_shl(idx))
            .unwrap_or(0)
    }
    pub fn ones(self) -> ActivePlayerBitSetIter {
        ActivePlayerBitSetIter { set: self.set }
    }
}

impl fmt::Debug for PlayerBitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ones()).finish()
    }
}

pub struct ActivePlayerBitSetIter {
    set: u16,
}

impl Iterator for ActivePlayerBitSetIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.set == 0 {
            None
        } else {
            // Lowest seat first, then clear it.
            let idx = self.set.trailing_zeros() as usize;
            self.set &= !(1 << idx);
            Some(idx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zero_count() {
        assert_eq!(0, PlayerBitSet::default().count());
        assert!(PlayerBitSet::default().is_empty());
    }

    #[test]
    fn test_enable_count() {
        let mut s = PlayerBitSet::default();

        s.enable(0);
        assert_eq!(1, s.count());
        s.enable(0);
        assert_eq!(1, s.count());

        s.enable(9);
        assert_eq!(2, s.count());
        assert!(s.get(9));
        assert!(!s.get(8));
    }

    #[test]
    fn test_out_of_range_seats() {
        let mut s = PlayerBitSet::single(15);
        assert!(s.get(15));
        assert!(!s.get(16));
        assert!(!s.get(usize::MAX));

        s.enable(16);
        s.enable(usize::MAX);
        assert_eq!(1, s.count());
        assert!(PlayerBitSet::single(64).is_empty());
    }

    #[test]
    fn test_iter() {
        let mut s = PlayerBitSet::single(3);
        s.enable(1);
        s.enable(7);
        assert_eq!(vec![1, 3, 7], s.ones().collect::<Vec<_>>());
    }

    #[test]
    fn test_debug() {
        let mut s = PlayerBitSet::single(2);
        s.enable(0);
        assert_eq!("{0, 2}", format!("{s:?}"));
    }
}
