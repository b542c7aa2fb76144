use smallvec::smallvec;

use crate::{DimensionIndex, Error, IndexTransform, OutputIndexMap, Result, ShortVec, rep::MutableRep};

impl IndexTransform {
    /// Reorder the input dimensions: new dimension `i` is old dimension `permutation[i]`.
    pub fn transpose(self, permutation: &[DimensionIndex]) -> Result<Self> {
        let rank = self.input_rank();
        if permutation.len() != rank {
            return Err(Error::invalid_argument(format!(
                "Permutation of length {} does not match input rank {rank}",
                permutation.len()
            )));
        }
        let mut seen: ShortVec<bool> = smallvec![false; rank];
        for &old in permutation {
            match seen.get_mut(old) {
                Some(s) if !*s => *s = true,
                _ => {
                    return Err(Error::invalid_argument(format!(
                        "{permutation:?} is not a permutation of [0, {rank})"
                    )));
                }
            }
        }
        Ok(apply_permutation(self, permutation))
    }

    /// Move `dims` to the front, in the given order; the rest follow in their existing order.
    ///
    /// # Panics
    ///
    /// If an entry of `dims` is not less than the input rank.
    pub fn move_to_front(self, dims: &[DimensionIndex]) -> Self {
        let mut permutation: ShortVec<DimensionIndex> = dims.iter().copied().collect();
        permutation.extend((0..self.input_rank()).filter(|d| !dims.contains(d)));
        apply_permutation(self, &permutation)
    }
}

fn apply_permutation(transform: IndexTransform, permutation: &[DimensionIndex]) -> IndexTransform {
    if permutation.iter().enumerate().all(|(i, p)| i == *p) {
        return transform;
    }
    let mut inverse: ShortVec<DimensionIndex> = smallvec![0; permutation.len()];
    for (new, &old) in permutation.iter().enumerate() {
        inverse[old] = new;
    }

    let mut rep = MutableRep::acquire(transform.rep, false);
    let dimensions = permutation
        .iter()
        .map(|&old| rep.dimensions[old].clone())
        .collect();
    rep.dimensions = dimensions;
    for map in rep.output_maps.iter_mut() {
        match map {
            OutputIndexMap::Constant { .. } => {}
            OutputIndexMap::SingleInputDimension {
                input_dimension, ..
            } => *input_dimension = inverse[*input_dimension],
            OutputIndexMap::Array { index_array, .. } => {
                index_array.byte_strides = permutation
                    .iter()
                    .map(|&old| index_array.byte_strides[old])
                    .collect();
            }
        }
    }
    IndexTransform::from_rep(rep)
}

#[cfg(test)]
mod tests {
    use faer::rand::{SeedableRng, rngs::SmallRng};

    use crate::tests::{random_point, random_transform, two_array_transform};
    use crate::{ErrorKind, IndexTransform};

    #[test]
    fn test_transpose() {
        let t = two_array_transform();
        let out = t.clone().transpose(&[2, 0, 1]).unwrap();
        assert_eq!(out.input_dimension(0), t.input_dimension(2));
        assert_eq!(
            out.transform(&[2, 3, 1]).unwrap(),
            t.transform(&[3, 1, 2]).unwrap()
        );
    }

    #[test]
    fn test_bad_permutation() {
        let t = IndexTransform::identity(3);
        let err = t.clone().transpose(&[0, 0, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = t.clone().transpose(&[0, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = t.transpose(&[0, 1, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_identity_permutation_is_noop() {
        let t = two_array_transform();
        let out = t.clone().transpose(&[0, 1, 2]).unwrap();
        assert!(out.same_representation(&t));
    }

    #[test]
    fn test_move_to_front() {
        let t = two_array_transform();
        let out = t.clone().move_to_front(&[2]);
        assert_eq!(out.input_dimension(0), t.input_dimension(2));
        assert_eq!(out.input_dimension(1), t.input_dimension(0));
        assert_eq!(out.input_dimension(2), t.input_dimension(1));
    }

    #[test]
    fn test_random_transpose_preserves_outputs() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            let t = random_transform(&mut rng);
            let Some(pt) = random_point(&mut rng, &t) else {
                continue;
            };
            let rank = t.input_rank();
            let permutation: Vec<usize> = (0..rank).rev().collect();
            let out = t.clone().transpose(&permutation).unwrap();
            let permuted: Vec<i64> = permutation.iter().map(|&old| pt[old]).collect();
            assert_eq!(out.transform(&permuted).unwrap(), t.transform(&pt).unwrap());
        }
    }
}
