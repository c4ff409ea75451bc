use hashbrown::HashMap;

/// Keys are the exact record bytes, borrowed from the input buffer.
pub type PartitionResult<'a> = HashMap<&'a [u8], Statistic, ahash::RandomState>;

/// Running min/sum/max/count of values scaled by ten.
///
/// `sum` is 128 bits wide: `u64::MAX` values of magnitude `i64::MAX` still fit.
///
/// `identity()` together with `merge` forms a monoid, so partial results can
/// be combined in any order or grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistic {
    pub sum: i128,
    pub count: u64,
    pub min: i64,
    pub max: i64,
}

impl Statistic {
    pub const fn identity() -> Self {
        Self {
            sum: 0,
            count: 0,
            min: i64::MAX,
            max: i64::MIN,
        }
    }

    pub fn of(value: i64) -> Self {
        Self {
            sum: i128::from(value),
            count: 1,
            min: value,
            max: value,
        }
    }

    #[inline]
    pub fn add(&mut self, value: i64) {
        self.sum += i128::from(value);
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    #[inline]
    pub fn merge(&mut self, other: &Statistic) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Mean in tenths, rounded half away from zero. `None` for the identity.
    pub fn mean_tenths(&self) -> Option<i64> {
        if self.count == 0 {
            return None;
        }
        let magnitude = self.sum.unsigned_abs();
        let count = u128::from(self.count);
        let mut rounded = magnitude / count;
        if 2 * (magnitude % count) >= count {
            rounded += 1;
        }
        let rounded = rounded as i128;
        let mean = if self.sum < 0 { -rounded } else { rounded };
        // the mean lies between min and max, so it fits back into i64
        Some(mean as i64)
    }
}

impl Default for Statistic {
    fn default() -> Self {
        Self::identity()
    }
}

/// The merged result of a whole run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FinalResult<'a> {
    stats: PartitionResult<'a>,
}

impl<'a> FinalResult<'a> {
    pub fn new(stats: PartitionResult<'a>) -> Self {
        Self { stats }
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn get(&self, key: &[u8]) -> Option<&Statistic> {
        self.stats.get(key)
    }

    /// Keys in output order: byte order, which is code point order for UTF-8 text.
    pub fn sorted(&self) -> Vec<(&'a [u8], Statistic)> {
        let mut entries: Vec<_> = self.stats.iter().map(|(&k, &s)| (k, s)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

}
