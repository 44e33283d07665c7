use alloc::vec::Vec;

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};

use crate::builder::build_pattern_set_sequence;
use crate::data::DataSequence;
use crate::errors::{HocrfError, Result};
use crate::feature::{Feature, FeatureIndex};
use crate::label::Label;

/// Represents a model of high-order CRF
pub struct Model {
    features: Vec<Feature>,
    index: FeatureIndex,
    weights: Vec<f64>,
}

impl Model {
    /// Creates a new model from weighted features.
    #[must_use]
    pub fn new(features: Vec<Feature>) -> Self {
        let index = FeatureIndex::new(&features);
        let weights = features.iter().map(Feature::weight).collect();
        Self {
            features,
            index,
            weights,
        }
    }

    /// Returns the features.
    #[inline(always)]
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Returns the largest order of the features.
    #[inline(always)]
    #[must_use]
    pub const fn max_order(&self) -> usize {
        self.index.max_order()
    }

    /// Infers the best label sequence of the given sequence.
    ///
    /// # Errors
    ///
    /// [`HocrfError::InvalidArgument`] is returned if some position has no candidate label,
    /// i.e., no order-1 feature of the model is active there.
    pub fn decode(&self, sequence: &DataSequence) -> Result<Vec<Label>> {
        let mut lattice = build_pattern_set_sequence(sequence, &self.features, &self.index);
        lattice.decode(&self.weights).ok_or_else(|| {
            HocrfError::invalid_argument("sequence", "some position has no candidate label")
        })
    }
}

impl<Context> Decode<Context> for Model {
    fn decode<D: Decoder<Context = Context>>(
        decoder: &mut D,
    ) -> core::result::Result<Self, DecodeError> {
        let features: Vec<Feature> = Decode::decode(decoder)?;
        Ok(Self::new(features))
    }
}

impl Encode for Model {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> core::result::Result<(), EncodeError> {
        Encode::encode(&self.features, encoder)?;
        Ok(())
    }
}
