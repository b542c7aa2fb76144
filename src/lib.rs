//! Index transforms: composable maps from an input index space onto the
//! index space of a stored array.
//!
//! Each output dimension is computed from the input point by an [OutputIndexMap]:
//! a constant, an affine function of one input dimension, or a lookup into an index array.
//! Transforms are immutable, shared values; operators such as
//! [IndexTransform::mark_bounds_implicit] or [IndexTransform::slice] consume one
//! and return another, copying the representation only if it is still shared.
use smallvec::SmallVec;

mod error;
pub use error::{Error, ErrorKind, Result};

mod index;
pub use index::{
    DimensionIndex, INF_INDEX, Index, IndexInterval, MAX_FINITE_INDEX, MIN_FINITE_INDEX,
    is_finite_index,
};

mod output_map;
pub use output_map::{INDEX_BYTES, IndexArray, IndexArrayData, OutputIndexMap, OutputIndexMethod};

mod domain;
pub use domain::{IndexDomain, InputDimension};

mod rep;

mod transform;
pub use transform::IndexTransform;

mod builder;
pub use builder::IndexTransformBuilder;

mod selector;
pub use selector::{DimSelector, DimensionIndexBuffer, all_dimensions, resolve_dimensions};

pub mod ops;
pub use ops::{SliceBounds, apply_change_implicit_state};

pub const COORD_SIZE: usize = 6;

/// A short vector type alias for convenience,
/// sized so that typical ranks stay on the stack.
pub type ShortVec<T> = SmallVec<[T; COORD_SIZE]>;
