use std::{fmt, sync::Arc};

use smallvec::smallvec;

use crate::{
    DimensionIndex, Error, Index, IndexDomain, InputDimension, OutputIndexMap, Result, ShortVec,
    rep::{MutableRep, TransformRep},
};

/// Mapping from an input index space to an output index space.
///
/// Immutable and cheap to clone: clones share one representation.
/// Operators which change a transform consume it and return a new one,
/// copying the representation only if it is still shared.
#[derive(Debug, Clone)]
pub struct IndexTransform {
    pub(crate) rep: Arc<TransformRep>,
}

impl IndexTransform {
    pub(crate) fn from_rep(rep: MutableRep) -> Self {
        Self {
            rep: rep.into_arc(),
        }
    }

    /// Identity over an unbounded, implicit domain of the given rank.
    pub fn identity(rank: usize) -> Self {
        let dimensions = vec![InputDimension::default(); rank];
        let maps = identity_maps(rank);
        Self {
            rep: Arc::new(TransformRep::new(dimensions, maps)),
        }
    }

    /// Identity over the given domain.
    pub fn from_domain(domain: IndexDomain) -> Self {
        let rank = domain.rank();
        let mut rep = MutableRep::acquire(domain.rep, false);
        rep.output_maps = identity_maps(rank);
        rep.output_rank = rank;
        Self::from_rep(rep)
    }

    pub fn input_rank(&self) -> usize {
        self.rep.input_rank
    }

    pub fn output_rank(&self) -> usize {
        self.rep.output_rank
    }

    pub fn input_dimension(&self, dim: DimensionIndex) -> &InputDimension {
        &self.rep.dimensions[dim]
    }

    pub fn input_dimensions(&self) -> &[InputDimension] {
        &self.rep.dimensions
    }

    pub fn input_labels(&self) -> impl Iterator<Item = Option<&str>> {
        self.rep.dimensions.iter().map(|d| d.label())
    }

    pub fn output_map(&self, dim: DimensionIndex) -> &OutputIndexMap {
        &self.rep.output_maps[dim]
    }

    pub fn output_maps(&self) -> &[OutputIndexMap] {
        &self.rep.output_maps
    }

    pub fn is_domain_explicitly_empty(&self) -> bool {
        self.rep.is_domain_explicitly_empty()
    }

    /// The input domain, sharing this transform's representation where possible.
    pub fn domain(&self) -> IndexDomain {
        self.clone().into_domain()
    }

    /// Discard the output maps, keeping the input domain.
    pub fn into_domain(self) -> IndexDomain {
        if self.rep.output_rank == 0 {
            return IndexDomain { rep: self.rep };
        }
        IndexDomain::from_rep(MutableRep::acquire(self.rep, true))
    }

    /// Whether both values share one representation.
    pub fn same_representation(&self, other: &IndexTransform) -> bool {
        Arc::ptr_eq(&self.rep, &other.rep)
    }

    /// Compute the output index vector for one input point.
    /// Writes to a pre-allocated output buffer.
    pub fn transform_into(&self, input: &[Index], output: &mut [Index]) -> Result<()> {
        if input.len() != self.input_rank() {
            return Err(Error::invalid_argument(format!(
                "Input point has {} coordinates; transform has input rank {}",
                input.len(),
                self.input_rank()
            )));
        }
        if output.len() != self.output_rank() {
            return Err(Error::invalid_argument(format!(
                "Output buffer has length {}; transform has output rank {}",
                output.len(),
                self.output_rank()
            )));
        }
        for (input_dim, (x, d)) in input.iter().zip(self.rep.dimensions.iter()).enumerate() {
            if !d.interval().contains(*x) {
                return Err(Error::out_of_range(format!(
                    "Index {x} is outside valid range {} for input dimension {input_dim}",
                    d.interval()
                )));
            }
        }
        for (output_dim, (o, map)) in output
            .iter_mut()
            .zip(self.rep.output_maps.iter())
            .enumerate()
        {
            *o = map
                .evaluate(input)
                .map_err(|e| e.annotate(format!("Computing output dimension {output_dim}")))?;
        }
        Ok(())
    }

    /// Compute the output index vector for one input point.
    pub fn transform(&self, input: &[Index]) -> Result<ShortVec<Index>> {
        let mut out: ShortVec<Index> = smallvec![0; self.output_rank()];
        self.transform_into(input, &mut out)?;
        Ok(out)
    }
}

fn identity_maps(rank: usize) -> Vec<OutputIndexMap> {
    (0..rank)
        .map(|input_dimension| OutputIndexMap::SingleInputDimension {
            input_dimension,
            offset: 0,
            stride: 1,
        })
        .collect()
}

impl PartialEq for IndexTransform {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rep, &other.rep) || self.rep == other.rep
    }
}

impl fmt::Display for IndexTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Rank {} -> {} index space transform:",
            self.input_rank(),
            self.output_rank()
        )?;
        writeln!(f, "  Input domain:")?;
        for (idx, d) in self.rep.dimensions.iter().enumerate() {
            writeln!(f, "    {idx}: {d}")?;
        }
        writeln!(f, "  Output index maps:")?;
        for (idx, map) in self.rep.output_maps.iter().enumerate() {
            writeln!(f, "    out[{idx}] = {map}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::IndexTransform;
    use crate::tests::{array_transform, init_logger};
    use crate::{ErrorKind, IndexDomain, IndexInterval, InputDimension, OutputIndexMethod};

    #[test]
    fn test_identity() {
        let t = IndexTransform::identity(3);
        assert_eq!(t.transform(&[1, -2, 3]).unwrap().as_slice(), &[1, -2, 3]);
        assert!(t.input_dimension(0).implicit_lower());
    }

    #[test]
    fn test_from_domain() {
        let domain = IndexDomain::try_new(vec![InputDimension::new(
            IndexInterval::new(2, 4).unwrap(),
        )])
        .unwrap();
        let t = domain.identity_transform();
        assert_eq!(t.output_rank(), 1);
        assert_eq!(t.output_map(0).method(), OutputIndexMethod::SingleInputDimension);
        assert_eq!(t.transform(&[3]).unwrap().as_slice(), &[3]);
        assert_eq!(
            t.transform(&[4]).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        // the domain it came from is untouched
        assert_eq!(domain.rank(), 1);
    }

    #[test]
    fn test_wrong_rank() {
        let t = IndexTransform::identity(2);
        assert_eq!(
            t.transform(&[1]).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_domain_shares_when_possible() {
        init_logger();
        let t = array_transform();
        let domain = t.domain();
        assert_eq!(domain.rank(), 1);
        assert_eq!(t.output_rank(), 1);

        let d2 = domain.clone();
        let t2: IndexTransform = domain.into();
        assert!(std::sync::Arc::ptr_eq(&t2.rep, &d2.rep));
    }

    #[test]
    fn test_display() {
        let s = array_transform().to_string();
        log::debug!("{s}");
        assert!(s.starts_with("Rank 1 -> 1 index space transform:"));
        assert!(s.contains("0: [0, 5)"));
    }
}
