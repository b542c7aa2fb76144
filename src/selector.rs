//! Resolution of dimension selectors into concrete input dimension indices.
//!
//! Mutation operators take the resolved [DimensionIndexBuffer] and trust it:
//! every index is in range and none is repeated.
use crate::{DimensionIndex, Error, InputDimension, Result, ShortVec};

/// Ordered, duplicate-free input dimension indices.
pub type DimensionIndexBuffer = ShortVec<DimensionIndex>;

/// Identifies one input dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimSelector {
    /// Position of the dimension; negative values count back from the last dimension.
    Index(isize),
    /// Label of the dimension.
    Label(String),
}

impl From<isize> for DimSelector {
    fn from(value: isize) -> Self {
        DimSelector::Index(value)
    }
}

// Lets integer literals of unspecified type resolve to a selector.
impl From<i32> for DimSelector {
    fn from(value: i32) -> Self {
        DimSelector::Index(value as isize)
    }
}

impl From<usize> for DimSelector {
    fn from(value: usize) -> Self {
        DimSelector::Index(value as isize)
    }
}

impl From<&str> for DimSelector {
    fn from(value: &str) -> Self {
        DimSelector::Label(value.to_owned())
    }
}

impl From<String> for DimSelector {
    fn from(value: String) -> Self {
        DimSelector::Label(value)
    }
}

impl DimSelector {
    fn resolve(&self, dimensions: &[InputDimension]) -> Result<DimensionIndex> {
        let rank = dimensions.len();
        match self {
            DimSelector::Index(idx) => {
                let signed_rank = rank as isize;
                if *idx < -signed_rank || *idx >= signed_rank {
                    return Err(Error::out_of_range(format!(
                        "Dimension index {idx} is outside valid range [-{rank}, {rank})"
                    )));
                }
                Ok(if *idx < 0 {
                    (idx + signed_rank) as usize
                } else {
                    *idx as usize
                })
            }
            DimSelector::Label(label) => {
                if label.is_empty() {
                    return Err(Error::invalid_argument("Dimension label must not be empty"));
                }
                dimensions
                    .iter()
                    .position(|d| d.label() == Some(label.as_str()))
                    .ok_or_else(|| {
                        Error::invalid_argument(format!("Label {label:?} does not match any dimension"))
                    })
            }
        }
    }
}

/// Resolve `selectors` against the given input dimensions, in selector order.
pub fn resolve_dimensions<S>(
    selectors: impl IntoIterator<Item = S>,
    dimensions: &[InputDimension],
) -> Result<DimensionIndexBuffer>
where
    S: Into<DimSelector>,
{
    let mut out = DimensionIndexBuffer::new();
    for selector in selectors.into_iter() {
        let dim = selector.into().resolve(dimensions)?;
        if out.contains(&dim) {
            return Err(Error::invalid_argument(format!(
                "Input dimension {dim} specified more than once"
            )));
        }
        out.push(dim);
    }
    Ok(out)
}

/// Every dimension of a space of the given rank, in order.
pub fn all_dimensions(rank: usize) -> DimensionIndexBuffer {
    (0..rank).collect()
}
