use std::{fmt, sync::Arc};

use crate::{
    DimensionIndex, IndexInterval, IndexTransform, Result,
    index::fmt_bound,
    ops,
    rep::{MutableRep, TransformRep},
};

/// Bounds, bound explicitness and label of one input dimension.
///
/// An implicit bound is one which may later be inferred (e.g. from the extent
/// of stored data) rather than being fixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputDimension {
    interval: IndexInterval,
    implicit_lower: bool,
    implicit_upper: bool,
    label: Option<String>,
}

impl Default for InputDimension {
    /// Unbounded, with both bounds implicit.
    fn default() -> Self {
        Self {
            interval: IndexInterval::infinite(),
            implicit_lower: true,
            implicit_upper: true,
            label: None,
        }
    }
}

impl InputDimension {
    /// A dimension with explicit bounds and no label.
    pub fn new(interval: IndexInterval) -> Self {
        Self {
            interval,
            implicit_lower: false,
            implicit_upper: false,
            label: None,
        }
    }

    pub fn with_implicit(mut self, implicit_lower: bool, implicit_upper: bool) -> Self {
        self.implicit_lower = implicit_lower;
        self.implicit_upper = implicit_upper;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    pub fn interval(&self) -> IndexInterval {
        self.interval
    }

    pub fn implicit_lower(&self) -> bool {
        self.implicit_lower
    }

    pub fn implicit_upper(&self) -> bool {
        self.implicit_upper
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Empty interval with both bounds fixed: no input point can ever exist.
    pub fn is_explicitly_empty(&self) -> bool {
        self.interval.is_empty() && !self.implicit_lower && !self.implicit_upper
    }

    pub(crate) fn set_interval(&mut self, interval: IndexInterval) {
        self.interval = interval;
    }

    pub(crate) fn set_implicit_lower(&mut self, implicit: bool) {
        self.implicit_lower = implicit;
    }

    pub(crate) fn set_implicit_upper(&mut self, implicit: bool) {
        self.implicit_upper = implicit;
    }

    /// An empty label is the same as no label.
    pub(crate) fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.label = (!label.is_empty()).then_some(label);
    }
}

impl fmt::Display for InputDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{label:?}: ")?;
        }
        f.write_str("[")?;
        fmt_bound(f, self.interval.inclusive_min(), false, self.implicit_lower)?;
        f.write_str(", ")?;
        fmt_bound(f, self.interval.exclusive_max(), true, self.implicit_upper)?;
        f.write_str(")")
    }
}

/// The input domain of a transform, without any output maps.
///
/// Cheap to clone; shares its representation like [IndexTransform].
#[derive(Debug, Clone)]
pub struct IndexDomain {
    pub(crate) rep: Arc<TransformRep>,
}

impl IndexDomain {
    /// A domain with the given dimensions.
    ///
    /// Fails if two dimensions share a non-empty label.
    pub fn try_new(dimensions: Vec<InputDimension>) -> Result<Self> {
        crate::builder::validate_labels(&dimensions)?;
        let rep = TransformRep::new(dimensions, Vec::new());
        crate::rep::debug_check_invariants(&rep);
        Ok(Self { rep: Arc::new(rep) })
    }

    pub(crate) fn from_rep(rep: MutableRep) -> Self {
        Self {
            rep: rep.into_arc(),
        }
    }

    pub fn rank(&self) -> usize {
        self.rep.input_rank
    }

    pub fn dimension(&self, dim: DimensionIndex) -> &InputDimension {
        &self.rep.dimensions[dim]
    }

    pub fn dimensions(&self) -> &[InputDimension] {
        &self.rep.dimensions
    }

    pub fn is_explicitly_empty(&self) -> bool {
        self.rep.is_domain_explicitly_empty()
    }

    /// The identity transform over this domain.
    pub fn identity_transform(&self) -> IndexTransform {
        IndexTransform::from_domain(self.clone())
    }

    /// Mark the selected bounds of `dims` as implicit.
    pub fn mark_bounds_implicit(
        self,
        dims: &[DimensionIndex],
        lower: bool,
        upper: bool,
    ) -> Result<Self> {
        let t = ops::apply_change_implicit_state(self.into(), dims, true, lower, upper, true)?;
        Ok(t.into_domain())
    }

    /// Mark the selected bounds of `dims` as explicit.
    pub fn mark_bounds_explicit(
        self,
        dims: &[DimensionIndex],
        lower: bool,
        upper: bool,
    ) -> Result<Self> {
        let t = ops::apply_change_implicit_state(self.into(), dims, false, lower, upper, true)?;
        Ok(t.into_domain())
    }
}

impl From<IndexDomain> for IndexTransform {
    /// A transform with this domain and no output dimensions.
    fn from(value: IndexDomain) -> Self {
        IndexTransform { rep: value.rep }
    }
}

impl PartialEq for IndexDomain {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rep, &other.rep) || self.rep.dimensions == other.rep.dimensions
    }
}

impl fmt::Display for IndexDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for (idx, d) in self.rep.dimensions.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{d}")?;
        }
        f.write_str(" }")
    }
}
