use crate::{
    DimensionIndex, Error, Index, IndexTransform, OutputIndexMap, Result,
    rep::MutableRep,
};

impl IndexTransform {
    /// Shift the input coordinates of `dims` by `offsets`:
    /// the point `x` becomes `x + offset`, mapping to the same output point.
    ///
    /// Infinite bounds stay infinite; implicit flags are unchanged.
    ///
    /// # Panics
    ///
    /// If an entry of `dims` is not less than the input rank.
    pub fn translate_by(self, dims: &[DimensionIndex], offsets: &[Index]) -> Result<Self> {
        if dims.len() != offsets.len() {
            return Err(Error::invalid_argument(format!(
                "Number of offsets ({}) does not match number of dimensions ({})",
                offsets.len(),
                dims.len()
            )));
        }
        let mut shifts = vec![0; self.input_rank()];
        for (&dim, &offset) in dims.iter().zip(offsets.iter()) {
            shifts[dim] = offset;
        }
        apply_translation(self, &shifts)
    }

    /// Shift `dims` so that their lower bounds become `origins`.
    ///
    /// Fails if a selected dimension is unbounded below.
    pub fn translate_to(self, dims: &[DimensionIndex], origins: &[Index]) -> Result<Self> {
        if dims.len() != origins.len() {
            return Err(Error::invalid_argument(format!(
                "Number of origins ({}) does not match number of dimensions ({})",
                origins.len(),
                dims.len()
            )));
        }
        let mut shifts = vec![0; self.input_rank()];
        for (&dim, &origin) in dims.iter().zip(origins.iter()) {
            let interval = self.input_dimension(dim).interval();
            if interval.is_lower_infinite() {
                return Err(Error::invalid_argument(format!(
                    "Interval {interval} for input dimension {dim} is not bounded below"
                )));
            }
            shifts[dim] = origin.checked_sub(interval.inclusive_min()).ok_or_else(|| {
                Error::out_of_range(format!("Origin {origin} for input dimension {dim} overflows"))
            })?;
        }
        apply_translation(self, &shifts)
    }
}

/// `shifts` has one entry per input dimension.
fn apply_translation(transform: IndexTransform, shifts: &[Index]) -> Result<IndexTransform> {
    if shifts.iter().all(|s| *s == 0) {
        return Ok(transform);
    }
    let overflow = || Error::out_of_range("Integer overflow translating output index map");

    // compute everything before writing, so a failure leaves nothing half-done
    let mut new_intervals = Vec::with_capacity(shifts.len());
    for (input_dim, (d, shift)) in transform
        .input_dimensions()
        .iter()
        .zip(shifts.iter())
        .enumerate()
    {
        let shifted = d
            .interval()
            .shift(*shift)
            .map_err(|e| e.annotate(format!("Translating input dimension {input_dim}")))?;
        new_intervals.push(shifted);
    }

    let mut rep = MutableRep::acquire(transform.rep, false);
    for (d, interval) in rep.dimensions.iter_mut().zip(new_intervals) {
        d.set_interval(interval);
    }
    for map in rep.output_maps.iter_mut() {
        match map {
            OutputIndexMap::Constant { .. } => {}
            OutputIndexMap::SingleInputDimension {
                input_dimension,
                offset,
                stride,
            } => {
                *offset = stride
                    .checked_mul(shifts[*input_dimension])
                    .and_then(|v| offset.checked_sub(v))
                    .ok_or_else(overflow)?;
            }
            OutputIndexMap::Array { index_array, .. } => {
                for (byte_stride, shift) in index_array.byte_strides.iter().zip(shifts.iter()) {
                    index_array.byte_offset = byte_stride
                        .checked_mul(*shift)
                        .and_then(|v| index_array.byte_offset.checked_sub(v))
                        .ok_or_else(overflow)?;
                }
            }
        }
    }
    Ok(IndexTransform::from_rep(rep))
}
