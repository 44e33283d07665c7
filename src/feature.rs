use core::hash::{Hash, Hasher};

use alloc::string::String;
use alloc::vec::Vec;

use bincode::{Decode, Encode};
use hashbrown::HashMap;

use crate::label::LabelSequence;

/// Label-erased shape of a feature: an observation and the order of its label context.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeatureTemplate {
    observation: String,
    order: usize,
}

impl FeatureTemplate {
    /// Creates a new feature template.
    ///
    /// # Arguments
    ///
    /// * `observation` - Observation part of the feature.
    /// * `order` - Number of labels the template conditions on. Templates of order 0 are
    ///   ignored.
    #[inline(always)]
    pub fn new<S>(observation: S, order: usize) -> Self
    where
        S: Into<String>,
    {
        Self {
            observation: observation.into(),
            order,
        }
    }

    /// Returns the observation.
    #[inline(always)]
    #[must_use]
    pub fn observation(&self) -> &str {
        &self.observation
    }

    /// Returns the order.
    #[inline(always)]
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Generates a feature by applying a label sequence.
    #[inline(always)]
    #[must_use]
    pub fn generate_feature(&self, labels: LabelSequence) -> Feature {
        Feature::new(self.observation.clone(), labels)
    }
}

/// Pair of an observation and a label context, with its weight.
///
/// Two features are equal if their observations and label sequences are equal, regardless of
/// their weights.
#[derive(Clone, Debug, Decode, Encode)]
pub struct Feature {
    observation: String,
    labels: LabelSequence,
    weight: f64,
    exp_weight: f64,
}

impl Feature {
    /// Creates a new feature with weight 0.
    #[inline(always)]
    pub fn new<S>(observation: S, labels: LabelSequence) -> Self
    where
        S: Into<String>,
    {
        Self {
            observation: observation.into(),
            labels,
            weight: 0.0,
            exp_weight: 1.0,
        }
    }

    /// Creates a new feature with the given weight.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    #[inline(always)]
    pub fn with_weight<S>(observation: S, labels: LabelSequence, weight: f64) -> Self
    where
        S: Into<String>,
    {
        let mut feature = Self::new(observation, labels);
        feature.set_weight(weight);
        feature
    }

    /// Returns the observation.
    #[inline(always)]
    #[must_use]
    pub fn observation(&self) -> &str {
        &self.observation
    }

    /// Returns the label sequence.
    #[inline(always)]
    #[must_use]
    pub const fn labels(&self) -> &LabelSequence {
        &self.labels
    }

    /// Returns the order of the label sequence.
    #[inline(always)]
    #[must_use]
    pub fn order(&self) -> usize {
        self.labels.order()
    }

    /// Returns the weight.
    #[inline(always)]
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns `exp(weight)`.
    #[inline(always)]
    #[must_use]
    pub const fn exp_weight(&self) -> f64 {
        self.exp_weight
    }

    /// Sets the weight and updates its exponential.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    #[inline(always)]
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
        self.exp_weight = weight.exp();
    }

    /// Creates the template of this feature, keeping only the order of the labels.
    #[inline(always)]
    #[must_use]
    pub fn template(&self) -> FeatureTemplate {
        FeatureTemplate::new(self.observation.clone(), self.labels.order())
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.observation == other.observation && self.labels == other.labels
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.observation.hash(state);
        self.labels.hash(state);
    }
}

/// Map from feature templates to the IDs of the features sharing them.
#[derive(Clone, Debug, Default)]
pub struct FeatureIndex {
    template_features: HashMap<FeatureTemplate, Vec<usize>>,
    max_order: usize,
}

impl FeatureIndex {
    /// Creates the index of the given features.
    ///
    /// IDs are indices into `features`.
    #[must_use]
    pub fn new(features: &[Feature]) -> Self {
        let mut template_features: HashMap<FeatureTemplate, Vec<usize>> = HashMap::new();
        let mut max_order = 0;
        for (fid, feature) in features.iter().enumerate() {
            max_order = max_order.max(feature.order());
            template_features
                .entry(feature.template())
                .or_default()
                .push(fid);
        }
        Self {
            template_features,
            max_order,
        }
    }

    /// Returns the IDs of the features generated from the given template.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, template: &FeatureTemplate) -> Option<&[usize]> {
        self.template_features.get(template).map(Vec::as_slice)
    }

    /// Returns the largest order of the indexed features.
    #[inline(always)]
    #[must_use]
    pub const fn max_order(&self) -> usize {
        self.max_order
    }
}

/// Counts the features observed in gold label sequences.
///
/// Features are numbered in the order they are first seen.
#[derive(Debug, Default)]
pub struct FeatureCounter {
    features: Vec<Feature>,
    counts: Vec<f64>,
    ids: HashMap<Feature, usize>,
}

impl FeatureCounter {
    /// Creates a new counter.
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of the feature and returns its ID.
    pub fn add(&mut self, feature: Feature) -> usize {
        let fid = match self.ids.get(&feature) {
            Some(&fid) => fid,
            None => {
                let fid = self.features.len();
                self.ids.insert(feature.clone(), fid);
                self.features.push(feature);
                self.counts.push(0.0);
                fid
            }
        };
        self.counts[fid] += 1.0;
        fid
    }

    /// Returns the number of distinct features.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if no feature is counted.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns the features and their counts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Feature>, Vec<f64>) {
        (self.features, self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    #[test]
    fn test_feature_equality_ignores_weights() {
        let mut a = Feature::new("w=the", LabelSequence::new(vec![1, 0]));
        a.set_weight(2.0);
        let b = Feature::new("w=the", LabelSequence::new(vec![1, 0]));
        let c = Feature::new("w=the", LabelSequence::new(vec![0, 1]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!((a.exp_weight() - 2f64.exp()).abs() < 1e-12);
        assert_eq!(1.0, b.exp_weight());
    }

    #[test]
    fn test_template() {
        let template = FeatureTemplate::new("w=dog", 2);
        let feature = template.generate_feature(LabelSequence::new(vec![3, 4]));
        assert_eq!("w=dog", feature.observation());
        assert_eq!(template, feature.template());
        assert_ne!(FeatureTemplate::new("w=dog", 1), feature.template());
    }

    #[test]
    fn test_index() {
        let features = vec![
            Feature::new("", LabelSequence::new(vec![0])),
            Feature::new("", LabelSequence::new(vec![1])),
            Feature::new("a", LabelSequence::new(vec![1, 0, 2])),
            Feature::new("", LabelSequence::new(vec![1, 0])),
        ];
        let index = FeatureIndex::new(&features);
        assert_eq!(3, index.max_order());
        assert_eq!(Some(&[0, 1][..]), index.get(&FeatureTemplate::new("", 1)));
        assert_eq!(Some(&[3][..]), index.get(&FeatureTemplate::new("", 2)));
        assert_eq!(Some(&[2][..]), index.get(&FeatureTemplate::new("a", 3)));
        assert_eq!(None, index.get(&FeatureTemplate::new("a", 1)));
    }

    #[test]
    fn test_counter() {
        let mut counter = FeatureCounter::new();
        assert!(counter.is_empty());
        assert_eq!(0, counter.add(Feature::new("a", LabelSequence::new(vec![0]))));
        assert_eq!(1, counter.add(Feature::new("b", LabelSequence::new(vec![0]))));
        assert_eq!(0, counter.add(Feature::new("a", LabelSequence::new(vec![0]))));
        assert_eq!(2, counter.len());
        let (features, counts) = counter.into_parts();
        assert_eq!("a", features[0].observation());
        assert_eq!(vec![2.0, 1.0], counts);
    }
}
