//! Index values and half-open index intervals.
use std::fmt;

use crate::{Error, Result};

/// A coordinate in an input or output index space.
pub type Index = i64;

/// Position of a dimension within an index space.
pub type DimensionIndex = usize;

/// Sentinel magnitude for an unbounded interval endpoint.
pub const INF_INDEX: Index = (1 << 62) - 1;
pub const MAX_FINITE_INDEX: Index = INF_INDEX - 1;
pub const MIN_FINITE_INDEX: Index = -MAX_FINITE_INDEX;

/// Exclusive upper bound representing `+inf`.
const INF_EXCLUSIVE_MAX: Index = INF_INDEX + 1;

/// Whether `index` may be used as a concrete coordinate.
pub fn is_finite_index(index: Index) -> bool {
    (MIN_FINITE_INDEX..=MAX_FINITE_INDEX).contains(&index)
}

/// Half-open interval `[inclusive_min, exclusive_max)` of indices.
///
/// Either bound may be infinite:
/// `-INF_INDEX` as the lower bound and `INF_INDEX + 1` as the upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexInterval {
    inclusive_min: Index,
    exclusive_max: Index,
}

impl Default for IndexInterval {
    fn default() -> Self {
        Self::infinite()
    }
}

impl IndexInterval {
    /// Whether `[inclusive_min, exclusive_max)` is a representable interval.
    pub fn is_valid(inclusive_min: Index, exclusive_max: Index) -> bool {
        (-INF_INDEX..=MAX_FINITE_INDEX).contains(&inclusive_min)
            && (MIN_FINITE_INDEX + 1..=INF_EXCLUSIVE_MAX).contains(&exclusive_max)
            && inclusive_min <= exclusive_max
    }

    pub fn new(inclusive_min: Index, exclusive_max: Index) -> Result<Self> {
        if !Self::is_valid(inclusive_min, exclusive_max) {
            return Err(Error::invalid_argument(format!(
                "[{}, {}) is not a valid index interval",
                BoundFmt::Lower(inclusive_min),
                BoundFmt::Upper(exclusive_max)
            )));
        }
        Ok(Self {
            inclusive_min,
            exclusive_max,
        })
    }

    pub fn sized(inclusive_min: Index, size: Index) -> Result<Self> {
        if size < 0 {
            return Err(Error::invalid_argument(format!(
                "Negative size {size} for interval starting at {inclusive_min}"
            )));
        }
        let exclusive_max = inclusive_min.checked_add(size).ok_or_else(|| {
            Error::invalid_argument(format!(
                "Interval of size {size} starting at {inclusive_min} overflows"
            ))
        })?;
        Self::new(inclusive_min, exclusive_max)
    }

    /// `(-inf, +inf)`
    pub fn infinite() -> Self {
        Self {
            inclusive_min: -INF_INDEX,
            exclusive_max: INF_EXCLUSIVE_MAX,
        }
    }

    /// The empty interval `[index, index)`.
    pub fn empty_at(index: Index) -> Result<Self> {
        Self::new(index, index)
    }

    pub fn inclusive_min(&self) -> Index {
        self.inclusive_min
    }

    pub fn exclusive_max(&self) -> Index {
        self.exclusive_max
    }

    pub fn is_empty(&self) -> bool {
        self.inclusive_min == self.exclusive_max
    }

    pub fn is_lower_infinite(&self) -> bool {
        self.inclusive_min == -INF_INDEX
    }

    pub fn is_upper_infinite(&self) -> bool {
        self.exclusive_max == INF_EXCLUSIVE_MAX
    }

    pub fn is_finite(&self) -> bool {
        !self.is_lower_infinite() && !self.is_upper_infinite()
    }

    /// Number of indices, or None if either bound is infinite.
    pub fn size(&self) -> Option<u64> {
        self.is_finite()
            .then(|| self.exclusive_max.abs_diff(self.inclusive_min))
    }

    pub fn contains(&self, index: Index) -> bool {
        is_finite_index(index) && self.inclusive_min <= index && index < self.exclusive_max
    }

    /// Empty intervals are contained in every interval.
    pub fn contains_interval(&self, other: &IndexInterval) -> bool {
        other.is_empty()
            || (self.inclusive_min <= other.inclusive_min
                && other.exclusive_max <= self.exclusive_max)
    }

    /// Shift both bounds by `offset`, leaving infinite bounds infinite.
    pub fn shift(&self, offset: Index) -> Result<Self> {
        let out_of_range = || {
            Error::out_of_range(format!(
                "Shifting {self} by {offset} exceeds the valid index range"
            ))
        };
        let inclusive_min = if self.is_lower_infinite() {
            self.inclusive_min
        } else {
            self.inclusive_min
                .checked_add(offset)
                .filter(|m| is_finite_index(*m))
                .ok_or_else(out_of_range)?
        };
        let exclusive_max = if self.is_upper_infinite() {
            self.exclusive_max
        } else {
            self.exclusive_max
                .checked_add(offset)
                .filter(|m| (MIN_FINITE_INDEX + 1..=MAX_FINITE_INDEX + 1).contains(m))
                .ok_or_else(out_of_range)?
        };
        Self::new(inclusive_min, exclusive_max).map_err(|_| out_of_range())
    }
}

enum BoundFmt {
    Lower(Index),
    Upper(Index),
}

impl fmt::Display for BoundFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BoundFmt::Lower(i) if i == -INF_INDEX => f.write_str("-inf"),
            BoundFmt::Upper(i) if i == INF_EXCLUSIVE_MAX => f.write_str("+inf"),
            BoundFmt::Lower(i) | BoundFmt::Upper(i) => write!(f, "{i}"),
        }
    }
}

/// Write one endpoint of an interval, appending `*` if it is implicit.
pub(crate) fn fmt_bound(
    f: &mut fmt::Formatter<'_>,
    value: Index,
    upper: bool,
    implicit: bool,
) -> fmt::Result {
    let b = if upper {
        BoundFmt::Upper(value)
    } else {
        BoundFmt::Lower(value)
    };
    write!(f, "{b}")?;
    if implicit {
        f.write_str("*")?;
    }
    Ok(())
}

impl fmt::Display for IndexInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        fmt_bound(f, self.inclusive_min, false, false)?;
        f.write_str(", ")?;
        fmt_bound(f, self.exclusive_max, true, false)?;
        f.write_str(")")
    }
}
