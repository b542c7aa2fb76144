use crate::{
    DimensionIndex, Error, IndexTransform, OutputIndexMap, Result,
    rep::{MutableRep, TransformRep},
};

/// Change whether the bounds of `dimensions` are implicit.
///
/// `affect_lower` and `affect_upper` choose which bounds change.
/// If neither is set, `transform` is returned as-is without copying.
///
/// Marking a dimension implicit fails with [crate::ErrorKind::InvalidArgument]
/// if any index array map depends on it,
/// since the array's extent fixes that dimension's bounds.
/// Marking bounds explicit always succeeds; if this leaves the domain explicitly
/// empty, all index array maps are replaced by constant maps.
///
/// With `domain_only`, the output maps are discarded.
///
/// # Panics
///
/// If an entry of `dimensions` is not less than the input rank.
pub fn apply_change_implicit_state(
    transform: IndexTransform,
    dimensions: &[DimensionIndex],
    implicit: bool,
    affect_lower: bool,
    affect_upper: bool,
    domain_only: bool,
) -> Result<IndexTransform> {
    if !affect_lower && !affect_upper {
        return Ok(transform);
    }
    let mut rep = MutableRep::acquire(transform.rep, domain_only);
    if implicit {
        check_no_index_array_dependence(&rep, dimensions)?;
    }
    for &input_dim in dimensions {
        let d = &mut rep.dimensions[input_dim];
        if affect_lower {
            d.set_implicit_lower(implicit);
        }
        if affect_upper {
            d.set_implicit_upper(implicit);
        }
    }
    if !implicit {
        rep.normalize_if_explicitly_empty();
    }
    Ok(IndexTransform::from_rep(rep))
}

/// Reports the first (output dimension, input dimension) pair found, output-major.
fn check_no_index_array_dependence(
    rep: &TransformRep,
    dimensions: &[DimensionIndex],
) -> Result<()> {
    for (output_dim, map) in rep.output_maps.iter().enumerate() {
        let OutputIndexMap::Array { index_array, .. } = map else {
            continue;
        };
        for &input_dim in dimensions {
            if index_array.depends_on(input_dim) {
                return Err(Error::invalid_argument(format!(
                    "Cannot mark input dimension {input_dim} as having implicit bounds because it indexes the index array map for output dimension {output_dim}"
                )));
            }
        }
    }
    Ok(())
}

impl IndexTransform {
    /// Mark the selected bounds of `dims` as implicit.
    ///
    /// See [apply_change_implicit_state].
    pub fn mark_bounds_implicit(
        self,
        dims: &[DimensionIndex],
        lower: bool,
        upper: bool,
    ) -> Result<Self> {
        apply_change_implicit_state(self, dims, true, lower, upper, false)
    }

    /// Mark the selected bounds of `dims` as explicit.
    ///
    /// See [apply_change_implicit_state].
    pub fn mark_bounds_explicit(
        self,
        dims: &[DimensionIndex],
        lower: bool,
        upper: bool,
    ) -> Result<Self> {
        apply_change_implicit_state(self, dims, false, lower, upper, false)
    }
}

#[cfg(test)]
mod tests {
    use faer::rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::apply_change_implicit_state;
    use crate::tests::{array_transform, init_logger, random_transform, two_array_transform};
    use crate::{
        ErrorKind, IndexArray, IndexInterval, IndexTransform, InputDimension, OutputIndexMap,
        OutputIndexMethod,
    };

    #[test]
    fn test_noop_returns_same_rep() {
        init_logger();
        let t = array_transform();
        for implicit in [false, true] {
            let out = apply_change_implicit_state(t.clone(), &[0], implicit, false, false, false)
                .unwrap();
            assert!(out.same_representation(&t));
        }
    }

    #[test]
    fn test_noop_skips_validation() {
        // dimension 0 indexes the array, but nothing is requested
        let t = array_transform();
        let out = apply_change_implicit_state(t.clone(), &[0], true, false, false, true).unwrap();
        assert!(out.same_representation(&t));
        assert_eq!(out.output_rank(), 1);
    }

    #[test]
    fn test_aliasing_rejected() {
        init_logger();
        let t = two_array_transform();
        let err = t.clone().mark_bounds_implicit(&[1], true, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            err.message(),
            "Cannot mark input dimension 1 as having implicit bounds because it indexes the index array map for output dimension 2"
        );
        // lower only still validates
        let err = t.mark_bounds_implicit(&[1], true, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_first_conflict_reported() {
        // output 1 depends on input 2, output 2 depends on input 1
        let t = two_array_transform();
        let err = t.mark_bounds_implicit(&[1, 2], true, true).unwrap_err();
        assert!(err.message().contains("input dimension 2"));
        assert!(err.message().contains("output dimension 1"));
    }

    #[test]
    fn test_error_leaves_original_unchanged() {
        let t = two_array_transform();
        let held = t.clone();
        assert!(t.mark_bounds_implicit(&[0, 1], true, true).is_err());
        assert_eq!(held, two_array_transform());
    }

    #[test]
    fn test_safe_dimension_passes() {
        let t = two_array_transform();
        let out = t.clone().mark_bounds_implicit(&[0], true, true).unwrap();
        assert!(out.input_dimension(0).implicit_lower());
        assert!(out.input_dimension(0).implicit_upper());
        assert_eq!(out.output_maps(), t.output_maps());
        for dim in 1..3 {
            assert_eq!(out.input_dimension(dim), t.input_dimension(dim));
        }
        assert_eq!(out.input_dimension(0).interval(), t.input_dimension(0).interval());
    }

    #[test]
    fn test_domain_only_skips_array_check() {
        let t = two_array_transform();
        let out = apply_change_implicit_state(t, &[1], true, true, true, true).unwrap();
        assert_eq!(out.output_rank(), 0);
        assert!(out.input_dimension(1).implicit_lower());
    }

    #[test]
    fn test_lower_only() {
        let t = IndexTransform::identity(2);
        let out = t.mark_bounds_explicit(&[1], true, false).unwrap();
        assert!(!out.input_dimension(1).implicit_lower());
        assert!(out.input_dimension(1).implicit_upper());
        assert!(out.input_dimension(0).implicit_lower());
    }

    #[test]
    fn test_empty_domain_normalization() {
        init_logger();
        let mut builder = IndexTransform::builder(1, 1);
        builder
            .input_dimension(
                0,
                InputDimension::new(IndexInterval::empty_at(3).unwrap()).with_implicit(true, true),
            )
            .unwrap()
            .output_index_array(
                0,
                0,
                1,
                IndexArray::try_new(Vec::new(), &[0]).unwrap(),
                IndexInterval::infinite(),
            )
            .unwrap();
        let t = builder.build().unwrap();
        assert_eq!(t.output_map(0).method(), OutputIndexMethod::Array);

        let out = apply_change_implicit_state(t, &[0], false, true, true, false).unwrap();
        assert_eq!(out.output_map(0).method(), OutputIndexMethod::Constant);
        assert!(out.is_domain_explicitly_empty());
    }

    #[test]
    fn test_empty_domain_needs_both_bounds() {
        let mut builder = IndexTransform::builder(1, 1);
        builder
            .input_dimension(
                0,
                InputDimension::new(IndexInterval::empty_at(3).unwrap()).with_implicit(true, true),
            )
            .unwrap()
            .output_index_array(
                0,
                0,
                1,
                IndexArray::try_new(Vec::new(), &[0]).unwrap(),
                IndexInterval::infinite(),
            )
            .unwrap();
        let t = builder.build().unwrap();
        let out = t.mark_bounds_explicit(&[0], true, false).unwrap();
        assert_eq!(out.output_map(0).method(), OutputIndexMethod::Array);
        let out = out.mark_bounds_explicit(&[0], false, true).unwrap();
        assert_eq!(out.output_map(0), &OutputIndexMap::Constant { offset: 0 });
    }

    #[test]
    fn test_round_trip() {
        let t = IndexTransform::identity(1)
            .mark_bounds_explicit(&[0], true, true)
            .unwrap();
        let interval = t.input_dimension(0).interval();
        let out = t
            .mark_bounds_implicit(&[0], true, true)
            .unwrap()
            .mark_bounds_explicit(&[0], true, true)
            .unwrap();
        assert_eq!(out.input_dimension(0).interval(), interval);
        assert!(!out.input_dimension(0).implicit_lower());
    }

    #[test]
    fn test_unique_mutated_in_place() {
        let t = two_array_transform();
        let ptr = std::sync::Arc::as_ptr(&t.rep);
        let out = t.mark_bounds_explicit(&[0], true, true).unwrap();
        assert_eq!(std::sync::Arc::as_ptr(&out.rep), ptr);
    }

    #[test]
    fn test_shared_copy_isolated() {
        let t = IndexTransform::identity(2);
        let other = t.clone();
        let out = t.mark_bounds_explicit(&[0, 1], true, true).unwrap();
        assert!(!out.same_representation(&other));
        assert!(other.input_dimension(0).implicit_lower());
        assert!(!out.input_dimension(0).implicit_lower());
    }

    #[test]
    fn test_concurrent_independent_mutation() {
        let t = two_array_transform();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mine = t.clone();
                std::thread::spawn(move || mine.mark_bounds_implicit(&[0], true, false).unwrap())
            })
            .collect();
        for h in handles {
            let out = h.join().unwrap();
            assert!(out.input_dimension(0).implicit_lower());
        }
        assert!(!t.input_dimension(0).implicit_lower());
    }

    #[test]
    fn test_random_narrowing_never_fails() {
        init_logger();
        let mut rng = SmallRng::seed_from_u64(1991);
        for _ in 0..200 {
            let t = random_transform(&mut rng);
            let rank = t.input_rank();
            let dims: Vec<usize> = (0..rank).filter(|_| rng.random::<bool>()).collect();
            let lower = rng.random::<bool>();
            let upper = rng.random::<bool>();
            let out = apply_change_implicit_state(t.clone(), &dims, false, lower, upper, false)
                .unwrap();
            for (dim, (before, after)) in t
                .input_dimensions()
                .iter()
                .zip(out.input_dimensions())
                .enumerate()
            {
                assert_eq!(before.interval(), after.interval());
                if dims.contains(&dim) {
                    assert!(!lower || !after.implicit_lower());
                    assert!(!upper || !after.implicit_upper());
                } else {
                    assert_eq!(before, after);
                }
            }
        }
    }

    #[test]
    fn test_random_implicit_matches_array_usage() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let t = random_transform(&mut rng);
            let dim = rng.random_range(0..t.input_rank());
            let used = t
                .output_maps()
                .iter()
                .filter_map(|m| m.index_array())
                .any(|a| a.depends_on(dim));
            let result = t.clone().mark_bounds_implicit(&[dim], true, true);
            assert_eq!(result.is_err(), used);
            if let Ok(out) = result {
                assert_eq!(out.output_maps(), t.output_maps());
            }
        }
    }
}
