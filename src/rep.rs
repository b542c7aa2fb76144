//! Shared transform representation and its copy-on-write protocol.
//!
//! Every [crate::IndexTransform] holds an `Arc<TransformRep>`.
//! Mutation operators obtain a [MutableRep] through [MutableRep::acquire],
//! which is the only way to get `&mut TransformRep`:
//! a uniquely-held representation is reused in place, a shared one is copied first.
use std::{
    collections::HashSet,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use crate::{InputDimension, OutputIndexMap};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransformRep {
    pub(crate) input_rank: usize,
    pub(crate) output_rank: usize,
    pub(crate) dimensions: Vec<InputDimension>,
    pub(crate) output_maps: Vec<OutputIndexMap>,
}

impl TransformRep {
    pub(crate) fn new(dimensions: Vec<InputDimension>, output_maps: Vec<OutputIndexMap>) -> Self {
        Self {
            input_rank: dimensions.len(),
            output_rank: output_maps.len(),
            dimensions,
            output_maps,
        }
    }

    /// Copy of the input domain only; the result has no output maps.
    fn clone_domain(&self) -> Self {
        Self::new(self.dimensions.clone(), Vec::new())
    }

    fn strip_output_maps(&mut self) {
        self.output_maps.clear();
        self.output_rank = 0;
    }

    /// Whether some dimension has an empty interval with both bounds explicit.
    pub(crate) fn is_domain_explicitly_empty(&self) -> bool {
        self.dimensions.iter().any(|d| d.is_explicitly_empty())
    }

    /// Replace every index array map with a constant map.
    ///
    /// Only valid when no input point exists, so the constant is never observed
    /// as the result of a lookup. The array map's own offset is kept as the constant.
    pub(crate) fn replace_all_index_array_maps_with_constant_maps(&mut self) {
        let mut n_replaced = 0;
        for map in self.output_maps.iter_mut() {
            if let OutputIndexMap::Array { offset, .. } = map {
                *map = OutputIndexMap::Constant { offset: *offset };
                n_replaced += 1;
            }
        }
        if n_replaced > 0 {
            log::debug!(
                "Domain is explicitly empty; replaced {n_replaced} index array map(s) with constants"
            );
        }
    }

    /// Normalize array maps away if the domain has become explicitly empty.
    pub(crate) fn normalize_if_explicitly_empty(&mut self) {
        if self.is_domain_explicitly_empty() {
            self.replace_all_index_array_maps_with_constant_maps();
        }
    }

    /// Describe the first structural invariant violated by this representation, if any.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        if self.dimensions.len() != self.input_rank {
            return Err(format!(
                "input rank {} but {} dimension descriptors",
                self.input_rank,
                self.dimensions.len()
            ));
        }
        if self.output_maps.len() != self.output_rank {
            return Err(format!(
                "output rank {} but {} output maps",
                self.output_rank,
                self.output_maps.len()
            ));
        }

        let mut labels = HashSet::with_capacity(self.input_rank);
        for (input_dim, d) in self.dimensions.iter().enumerate() {
            let interval = d.interval();
            if !crate::IndexInterval::is_valid(interval.inclusive_min(), interval.exclusive_max()) {
                return Err(format!(
                    "input dimension {input_dim} has invalid interval {interval:?}"
                ));
            }
            if let Some(label) = d.label() {
                if !labels.insert(label) {
                    return Err(format!("duplicate label {label:?}"));
                }
            }
        }

        let explicitly_empty = self.is_domain_explicitly_empty();
        for (output_dim, map) in self.output_maps.iter().enumerate() {
            match map {
                OutputIndexMap::Constant { .. } => {}
                OutputIndexMap::SingleInputDimension {
                    input_dimension, ..
                } => {
                    if *input_dimension >= self.input_rank {
                        return Err(format!(
                            "output dimension {output_dim} maps from input dimension {input_dimension} of {}",
                            self.input_rank
                        ));
                    }
                }
                OutputIndexMap::Array { index_array, .. } => {
                    if index_array.byte_strides.len() != self.input_rank {
                        return Err(format!(
                            "index array for output dimension {output_dim} has {} byte strides for input rank {}",
                            index_array.byte_strides.len(),
                            self.input_rank
                        ));
                    }
                    if index_array.is_degenerate() {
                        return Err(format!(
                            "index array for output dimension {output_dim} has all-zero byte strides"
                        ));
                    }
                    if explicitly_empty {
                        return Err(format!(
                            "index array for output dimension {output_dim} over an explicitly empty domain"
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Fatal self-check run at the end of every mutation.
///
/// No-op in builds without debug assertions.
pub(crate) fn debug_check_invariants(rep: &TransformRep) {
    if cfg!(debug_assertions) {
        if let Err(msg) = rep.check_invariants() {
            panic!("index transform invariant violated: {msg}");
        }
    }
}

/// Exclusive handle to a representation which may be freely mutated.
///
/// Not `Clone`, so the wrapped `Arc` stays unique until [MutableRep::into_arc].
#[derive(Debug)]
pub(crate) struct MutableRep(Arc<TransformRep>);

impl MutableRep {
    /// Take exclusive ownership of `rep`, copying it if it is shared.
    ///
    /// With `domain_only`, the caller promises not to use the output maps,
    /// which are dropped (and never copied).
    pub(crate) fn acquire(mut rep: Arc<TransformRep>, domain_only: bool) -> Self {
        if let Some(unique) = Arc::get_mut(&mut rep) {
            log::trace!("Mutating uniquely-held transform representation in place");
            if domain_only {
                unique.strip_output_maps();
            }
            return Self(rep);
        }
        log::trace!(
            "Copying shared transform representation (domain_only={domain_only}, input_rank={}, output_rank={})",
            rep.input_rank,
            rep.output_rank
        );
        let copied = if domain_only {
            rep.clone_domain()
        } else {
            TransformRep::clone(&rep)
        };
        Self(Arc::new(copied))
    }

    /// Run the invariant checker and release the representation for sharing.
    pub(crate) fn into_arc(self) -> Arc<TransformRep> {
        debug_check_invariants(&self.0);
        self.0
    }
}

impl Deref for MutableRep {
    type Target = TransformRep;

    fn deref(&self) -> &TransformRep {
        &self.0
    }
}

impl DerefMut for MutableRep {
    fn deref_mut(&mut self) -> &mut TransformRep {
        // Unique by construction, so this never copies.
        Arc::make_mut(&mut self.0)
    }
}
