use std::collections::BTreeSet;

use crate::{
    DimensionIndex, Error, Index, IndexArray, IndexArrayData, IndexInterval, IndexTransform,
    InputDimension, OutputIndexMap, Result,
    rep::{MutableRep, TransformRep},
};

impl IndexTransform {
    /// Create a new builder for a transform with the given ranks.
    pub fn builder(input_rank: usize, output_rank: usize) -> IndexTransformBuilder {
        IndexTransformBuilder::new(input_rank, output_rank)
    }
}

#[derive(Debug, Clone)]
enum PendingMap {
    Ready(OutputIndexMap),
    Array {
        offset: Index,
        stride: Index,
        array: IndexArray,
        index_range: IndexInterval,
    },
}

/// Validated construction of an [IndexTransform].
///
/// Input dimensions default to unbounded with implicit bounds;
/// output maps default to the constant 0.
#[derive(Debug, Clone)]
pub struct IndexTransformBuilder {
    dimensions: Vec<InputDimension>,
    maps: Vec<PendingMap>,
}

impl IndexTransformBuilder {
    pub fn new(input_rank: usize, output_rank: usize) -> Self {
        Self {
            dimensions: vec![InputDimension::default(); input_rank],
            maps: vec![PendingMap::Ready(OutputIndexMap::Constant { offset: 0 }); output_rank],
        }
    }

    fn input_mut(&mut self, input_dim: DimensionIndex) -> Result<&mut InputDimension> {
        let rank = self.dimensions.len();
        self.dimensions.get_mut(input_dim).ok_or_else(|| {
            Error::out_of_range(format!(
                "Input dimension {input_dim} is outside valid range [0, {rank})"
            ))
        })
    }

    fn output_mut(&mut self, output_dim: DimensionIndex) -> Result<&mut PendingMap> {
        let rank = self.maps.len();
        self.maps.get_mut(output_dim).ok_or_else(|| {
            Error::out_of_range(format!(
                "Output dimension {output_dim} is outside valid range [0, {rank})"
            ))
        })
    }

    pub fn input_dimension(
        &mut self,
        input_dim: DimensionIndex,
        dimension: InputDimension,
    ) -> Result<&mut Self> {
        *self.input_mut(input_dim)? = dimension;
        Ok(self)
    }

    /// Set the bounds of an input dimension, leaving its implicit flags alone.
    pub fn input_interval(
        &mut self,
        input_dim: DimensionIndex,
        interval: IndexInterval,
    ) -> Result<&mut Self> {
        self.input_mut(input_dim)?.set_interval(interval);
        Ok(self)
    }

    pub fn implicit_bounds(
        &mut self,
        input_dim: DimensionIndex,
        implicit_lower: bool,
        implicit_upper: bool,
    ) -> Result<&mut Self> {
        let d = self.input_mut(input_dim)?;
        d.set_implicit_lower(implicit_lower);
        d.set_implicit_upper(implicit_upper);
        Ok(self)
    }

    pub fn input_label(&mut self, input_dim: DimensionIndex, label: &str) -> Result<&mut Self> {
        self.input_mut(input_dim)?.set_label(label);
        Ok(self)
    }

    pub fn output_constant(&mut self, output_dim: DimensionIndex, offset: Index) -> Result<&mut Self> {
        *self.output_mut(output_dim)? = PendingMap::Ready(OutputIndexMap::Constant { offset });
        Ok(self)
    }

    pub fn output_single_input_dimension(
        &mut self,
        output_dim: DimensionIndex,
        input_dimension: DimensionIndex,
        offset: Index,
        stride: Index,
    ) -> Result<&mut Self> {
        *self.output_mut(output_dim)? = PendingMap::Ready(OutputIndexMap::SingleInputDimension {
            input_dimension,
            offset,
            stride,
        });
        Ok(self)
    }

    /// `output = offset + stride * array[input - origin]`,
    /// where `origin` is the lower bound of the input domain.
    ///
    /// Each extent of `array` must be 1 (broadcast) or match the input dimension's extent.
    pub fn output_index_array(
        &mut self,
        output_dim: DimensionIndex,
        offset: Index,
        stride: Index,
        array: IndexArray,
        index_range: IndexInterval,
    ) -> Result<&mut Self> {
        *self.output_mut(output_dim)? = PendingMap::Array {
            offset,
            stride,
            array,
            index_range,
        };
        Ok(self)
    }

    pub fn build(self) -> Result<IndexTransform> {
        validate_labels(&self.dimensions)?;
        let input_rank = self.dimensions.len();
        let mut output_maps = Vec::with_capacity(self.maps.len());
        for (output_dim, pending) in self.maps.into_iter().enumerate() {
            let map = match pending {
                PendingMap::Ready(map) => {
                    if let OutputIndexMap::SingleInputDimension {
                        input_dimension, ..
                    } = map
                    {
                        if input_dimension >= input_rank {
                            return Err(Error::invalid_argument(format!(
                                "Input dimension {input_dimension} specified for output dimension {output_dim} is outside valid range [0, {input_rank})"
                            )));
                        }
                    }
                    map
                }
                PendingMap::Array {
                    offset,
                    stride,
                    array,
                    index_range,
                } => make_array_map(&self.dimensions, offset, stride, array, index_range)
                    .map_err(|e| {
                        e.annotate(format!("Index array map for output dimension {output_dim}"))
                    })?,
            };
            output_maps.push(map);
        }

        let mut rep = MutableRep::acquire(
            std::sync::Arc::new(TransformRep::new(self.dimensions, output_maps)),
            false,
        );
        rep.normalize_if_explicitly_empty();
        Ok(IndexTransform::from_rep(rep))
    }
}

/// Non-empty labels must be unique.
pub(crate) fn validate_labels(dimensions: &[InputDimension]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for label in dimensions.iter().filter_map(|d| d.label()) {
        if !seen.insert(label) {
            return Err(Error::invalid_argument(format!(
                "Dimension label {label:?} not unique"
            )));
        }
    }
    Ok(())
}

fn make_array_map(
    dimensions: &[InputDimension],
    offset: Index,
    stride: Index,
    array: IndexArray,
    index_range: IndexInterval,
) -> Result<OutputIndexMap> {
    if array.shape().len() != dimensions.len() {
        return Err(Error::invalid_argument(format!(
            "Index array has rank {}; input rank is {}",
            array.shape().len(),
            dimensions.len()
        )));
    }

    // the byte offset puts element 0 at the domain origin
    let byte_strides = array.byte_strides();
    let mut byte_offset: Index = 0;
    for (input_dim, ((extent, byte_stride), d)) in array
        .shape()
        .iter()
        .zip(byte_strides.iter())
        .zip(dimensions.iter())
        .enumerate()
    {
        if *extent == 1 {
            continue;
        }
        let interval = d.interval();
        if interval.size() != Some(*extent as u64) {
            return Err(Error::invalid_argument(format!(
                "Index array shape {:?} does not match input dimension {input_dim} with domain {interval}",
                array.shape()
            )));
        }
        byte_offset = byte_stride
            .checked_mul(interval.inclusive_min())
            .and_then(|v| byte_offset.checked_sub(v))
            .ok_or_else(|| Error::out_of_range("Integer overflow computing index array offset"))?;
    }

    if byte_strides.iter().all(|s| *s == 0) {
        // every dimension broadcast: a single value
        let value = array.data().first().copied().ok_or_else(|| {
            Error::invalid_argument("Index array has no elements")
        })?;
        if !index_range.contains(value) {
            return Err(Error::out_of_range(format!(
                "Index {value} is outside valid range {index_range}"
            )));
        }
        let constant = stride
            .checked_mul(value)
            .and_then(|v| v.checked_add(offset))
            .ok_or_else(|| Error::out_of_range("Integer overflow computing constant offset"))?;
        log::debug!("Replacing single-element index array with constant {constant}");
        return Ok(OutputIndexMap::Constant { offset: constant });
    }

    Ok(OutputIndexMap::Array {
        offset,
        stride,
        index_array: IndexArrayData {
            data: array.into_data(),
            byte_offset,
            byte_strides,
            index_range,
        },
    })
}
