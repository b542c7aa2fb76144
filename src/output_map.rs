use std::{fmt, sync::Arc};

use smallvec::smallvec;

use crate::{DimensionIndex, Error, Index, IndexInterval, Result, ShortVec};

/// Size in bytes of one element of an index array.
pub const INDEX_BYTES: Index = std::mem::size_of::<Index>() as Index;

/// Tag of an [OutputIndexMap].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputIndexMethod {
    Constant,
    SingleInputDimension,
    Array,
}

/// How one output coordinate is derived from the input coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputIndexMap {
    /// `output = offset`
    Constant { offset: Index },
    /// `output = offset + stride * input[input_dimension]`
    SingleInputDimension {
        input_dimension: DimensionIndex,
        offset: Index,
        stride: Index,
    },
    /// `output = offset + stride * index_array[input]`
    Array {
        offset: Index,
        stride: Index,
        index_array: IndexArrayData,
    },
}

impl OutputIndexMap {
    pub fn method(&self) -> OutputIndexMethod {
        match self {
            OutputIndexMap::Constant { .. } => OutputIndexMethod::Constant,
            OutputIndexMap::SingleInputDimension { .. } => OutputIndexMethod::SingleInputDimension,
            OutputIndexMap::Array { .. } => OutputIndexMethod::Array,
        }
    }

    pub fn offset(&self) -> Index {
        match self {
            OutputIndexMap::Constant { offset }
            | OutputIndexMap::SingleInputDimension { offset, .. }
            | OutputIndexMap::Array { offset, .. } => *offset,
        }
    }

    /// Zero for constant maps.
    pub fn stride(&self) -> Index {
        match self {
            OutputIndexMap::Constant { .. } => 0,
            OutputIndexMap::SingleInputDimension { stride, .. }
            | OutputIndexMap::Array { stride, .. } => *stride,
        }
    }

    pub fn index_array(&self) -> Option<&IndexArrayData> {
        match self {
            OutputIndexMap::Array { index_array, .. } => Some(index_array),
            _ => None,
        }
    }

    /// Compute the output index for a point already known to lie in the domain.
    pub(crate) fn evaluate(&self, input: &[Index]) -> Result<Index> {
        let overflow = || Error::out_of_range("Integer overflow computing output index");
        match self {
            OutputIndexMap::Constant { offset } => Ok(*offset),
            OutputIndexMap::SingleInputDimension {
                input_dimension,
                offset,
                stride,
            } => stride
                .checked_mul(input[*input_dimension])
                .and_then(|v| v.checked_add(*offset))
                .ok_or_else(overflow),
            OutputIndexMap::Array {
                offset,
                stride,
                index_array,
            } => {
                let value = index_array.get(input)?;
                if !index_array.index_range().contains(value) {
                    return Err(Error::out_of_range(format!(
                        "Index {value} is outside valid range {}",
                        index_array.index_range()
                    )));
                }
                stride
                    .checked_mul(value)
                    .and_then(|v| v.checked_add(*offset))
                    .ok_or_else(overflow)
            }
        }
    }
}

impl fmt::Display for OutputIndexMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputIndexMap::Constant { offset } => write!(f, "{offset}"),
            OutputIndexMap::SingleInputDimension {
                input_dimension,
                offset,
                stride,
            } => write!(f, "{offset} + {stride} * in[{input_dimension}]"),
            OutputIndexMap::Array {
                offset,
                stride,
                index_array,
            } => write!(
                f,
                "{offset} + {stride} * array{:?}[in] in {}",
                index_array.byte_strides.as_slice(),
                index_array.index_range
            ),
        }
    }
}

/// Payload of an index array map.
///
/// The element used for input point `x` lives at byte position
/// `byte_offset + sum(byte_strides[i] * x[i])` of `data`.
/// A zero byte stride means the map does not depend on that input dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexArrayData {
    pub(crate) data: Arc<[Index]>,
    pub(crate) byte_offset: Index,
    pub(crate) byte_strides: ShortVec<Index>,
    pub(crate) index_range: IndexInterval,
}

impl IndexArrayData {
    pub fn byte_strides(&self) -> &[Index] {
        &self.byte_strides
    }

    pub fn byte_offset(&self) -> Index {
        self.byte_offset
    }

    pub fn index_range(&self) -> IndexInterval {
        self.index_range
    }

    /// The shared element buffer.
    pub fn data(&self) -> &Arc<[Index]> {
        &self.data
    }

    /// Whether the array varies along `input_dim`.
    pub fn depends_on(&self, input_dim: DimensionIndex) -> bool {
        self.byte_strides[input_dim] != 0
    }

    /// Whether no input dimension is used, i.e. the map is really a constant.
    pub fn is_degenerate(&self) -> bool {
        self.byte_strides.iter().all(|s| *s == 0)
    }

    pub(crate) fn get(&self, input: &[Index]) -> Result<Index> {
        let out_of_bounds = || Error::out_of_range("Index array access outside its buffer");
        let mut pos = self.byte_offset;
        for (stride, x) in self.byte_strides.iter().zip(input.iter()) {
            if *stride == 0 {
                continue;
            }
            pos = stride
                .checked_mul(*x)
                .and_then(|v| v.checked_add(pos))
                .ok_or_else(out_of_bounds)?;
        }
        if pos < 0 || pos % INDEX_BYTES != 0 {
            return Err(out_of_bounds());
        }
        let elem = usize::try_from(pos / INDEX_BYTES).map_err(|_| out_of_bounds())?;
        self.data.get(elem).copied().ok_or_else(out_of_bounds)
    }
}

/// A dense, C-order array of index values, used to describe an index array map.
///
/// Dimensions of extent 1 are broadcast over the corresponding input dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexArray {
    data: Arc<[Index]>,
    shape: ShortVec<usize>,
}

impl IndexArray {
    pub fn try_new(data: impl Into<Arc<[Index]>>, shape: &[usize]) -> Result<Self> {
        let data = data.into();
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, s| acc.checked_mul(*s))
            .ok_or_else(|| Error::invalid_argument(format!("Shape {shape:?} overflows")))?;
        if data.len() != expected {
            return Err(Error::invalid_argument(format!(
                "Index array of shape {shape:?} needs {expected} elements; got {}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            shape: shape.into(),
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[Index] {
        &self.data
    }

    /// C-order byte strides, with zero for broadcast (extent 1) dimensions.
    pub(crate) fn byte_strides(&self) -> ShortVec<Index> {
        let mut strides: ShortVec<Index> = smallvec![0; self.shape.len()];
        let mut acc: Index = INDEX_BYTES;
        for (s, extent) in strides.iter_mut().zip(self.shape.iter()).rev() {
            if *extent != 1 {
                *s = acc;
            }
            acc = acc.saturating_mul(*extent as Index);
        }
        strides
    }

    pub(crate) fn into_data(self) -> Arc<[Index]> {
        self.data
    }
}

#[cfg(feature = "ndarray")]
impl From<ndarray::ArrayD<Index>> for IndexArray {
    fn from(value: ndarray::ArrayD<Index>) -> Self {
        let shape: ShortVec<usize> = value.shape().into();
        let data: Vec<Index> = value.iter().copied().collect();
        Self {
            data: data.into(),
            shape,
        }
    }
}

#[cfg(feature = "ndarray")]
impl<'a> From<ndarray::ArrayViewD<'a, Index>> for IndexArray {
    fn from(value: ndarray::ArrayViewD<'a, Index>) -> Self {
        let shape: ShortVec<usize> = value.shape().into();
        let data: Vec<Index> = value.iter().copied().collect();
        Self {
            data: data.into(),
            shape,
        }
    }
}
