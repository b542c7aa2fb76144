use crate::{
    DimensionIndex, Error, Index, IndexInterval, IndexTransform, OutputIndexMap, Result,
    rep::MutableRep,
};

/// New bounds for one dimension in [IndexTransform::slice].
///
/// `None` keeps the existing bound along with its implicit flag;
/// `Some` sets the bound and makes it explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceBounds {
    pub start: Option<Index>,
    pub stop: Option<Index>,
}

impl SliceBounds {
    pub fn new(start: Index, stop: Index) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
        }
    }
}

impl From<std::ops::Range<Index>> for SliceBounds {
    fn from(value: std::ops::Range<Index>) -> Self {
        Self::new(value.start, value.end)
    }
}

impl From<std::ops::RangeFrom<Index>> for SliceBounds {
    fn from(value: std::ops::RangeFrom<Index>) -> Self {
        Self {
            start: Some(value.start),
            stop: None,
        }
    }
}

impl From<std::ops::RangeTo<Index>> for SliceBounds {
    fn from(value: std::ops::RangeTo<Index>) -> Self {
        Self {
            start: None,
            stop: Some(value.end),
        }
    }
}

impl IndexTransform {
    /// Restrict each of `dims` to the matching entry of `bounds`.
    ///
    /// A new bound may extend past an old implicit bound,
    /// unless the dimension is used by an index array map.
    /// If the domain becomes explicitly empty, index array maps become constants.
    ///
    /// # Panics
    ///
    /// If an entry of `dims` is not less than the input rank.
    pub fn slice(self, dims: &[DimensionIndex], bounds: &[SliceBounds]) -> Result<Self> {
        if dims.len() != bounds.len() {
            return Err(Error::invalid_argument(format!(
                "Number of intervals ({}) does not match number of dimensions ({})",
                bounds.len(),
                dims.len()
            )));
        }

        let mut updates = Vec::with_capacity(dims.len());
        for (&dim, b) in dims.iter().zip(bounds.iter()) {
            let update = self
                .sliced_dimension(dim, b)
                .map_err(|e| e.annotate(format!("Slicing input dimension {dim}")))?;
            updates.push((dim, update));
        }

        let mut rep = MutableRep::acquire(self.rep, false);
        for (dim, (interval, b)) in updates {
            let d = &mut rep.dimensions[dim];
            d.set_interval(interval);
            if b.start.is_some() {
                d.set_implicit_lower(false);
            }
            if b.stop.is_some() {
                d.set_implicit_upper(false);
            }
        }
        rep.normalize_if_explicitly_empty();
        Ok(IndexTransform::from_rep(rep))
    }

    fn sliced_dimension(
        &self,
        dim: DimensionIndex,
        b: &SliceBounds,
    ) -> Result<(IndexInterval, SliceBounds)> {
        let d = self.input_dimension(dim);
        let old = d.interval();
        let new = IndexInterval::new(
            b.start.unwrap_or(old.inclusive_min()),
            b.stop.unwrap_or(old.exclusive_max()),
        )?;
        let indexes_array = self
            .output_maps()
            .iter()
            .filter_map(OutputIndexMap::index_array)
            .any(|a| a.depends_on(dim));
        let lower_fixed = !d.implicit_lower() || indexes_array;
        let upper_fixed = !d.implicit_upper() || indexes_array;
        let outside = |bound: Index| {
            Error::out_of_range(format!(
                "Bound {bound} is outside the existing domain {d}"
            ))
        };
        if !new.is_empty() {
            if lower_fixed && new.inclusive_min() < old.inclusive_min() {
                return Err(outside(new.inclusive_min()));
            }
            if upper_fixed && new.exclusive_max() > old.exclusive_max() {
                return Err(outside(new.exclusive_max()));
            }
        }
        Ok((new, *b))
    }
}
