use crate::{DimensionIndex, Error, IndexTransform, Result, builder::validate_labels, rep::MutableRep};

impl IndexTransform {
    /// Set the labels of `dims`; an empty label removes the label.
    ///
    /// # Panics
    ///
    /// If an entry of `dims` is not less than the input rank.
    pub fn label<S: AsRef<str>>(self, dims: &[DimensionIndex], labels: &[S]) -> Result<Self> {
        if dims.len() != labels.len() {
            return Err(Error::invalid_argument(format!(
                "Number of labels ({}) does not match number of dimensions ({})",
                labels.len(),
                dims.len()
            )));
        }
        let mut dimensions = self.input_dimensions().to_vec();
        for (&dim, label) in dims.iter().zip(labels.iter()) {
            dimensions[dim].set_label(label.as_ref());
        }
        validate_labels(&dimensions)?;

        let mut rep = MutableRep::acquire(self.rep, false);
        rep.dimensions = dimensions;
        Ok(IndexTransform::from_rep(rep))
    }
}
