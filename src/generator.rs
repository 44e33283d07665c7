use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::feature::FeatureTemplate;

/// Generates the feature templates active at each position of an observation sequence.
pub trait FeatureTemplateGenerator<T> {
    /// Generates the feature templates for a specific position.
    ///
    /// # Arguments
    ///
    /// * `observations` - The whole observation sequence.
    /// * `pos` - The position.
    fn generate_at(&self, observations: &[T], pos: usize) -> Vec<FeatureTemplate>;
}

/// Generates templates with an empty observation, one per order up to a maximum.
///
/// These templates produce label n-gram features, and the order-1 ones make every label a
/// candidate at every position.
#[derive(Clone, Copy, Debug)]
pub struct UnconditionalFeatureTemplateGenerator {
    max_order: usize,
}

impl UnconditionalFeatureTemplateGenerator {
    /// Creates a new generator.
    #[inline(always)]
    #[must_use]
    pub const fn new(max_order: usize) -> Self {
        Self { max_order }
    }
}

impl<T> FeatureTemplateGenerator<T> for UnconditionalFeatureTemplateGenerator {
    fn generate_at(&self, _observations: &[T], pos: usize) -> Vec<FeatureTemplate> {
        (1..=self.max_order.min(pos + 1))
            .map(|order| FeatureTemplate::new("", order))
            .collect()
    }
}

/// Concatenates the templates of several generators.
pub struct AggregatedFeatureTemplateGenerator<T> {
    generators: Vec<Box<dyn FeatureTemplateGenerator<T> + Send + Sync>>,
}

impl<T> AggregatedFeatureTemplateGenerator<T> {
    /// Creates a generator without children.
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self { generators: vec![] }
    }

    /// Adds a generator.
    pub fn add_generator<G>(&mut self, generator: G)
    where
        G: FeatureTemplateGenerator<T> + Send + Sync + 'static,
    {
        self.generators.push(Box::new(generator));
    }

    /// Returns the number of generators.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns `true` if the generator has no child.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl<T> Default for AggregatedFeatureTemplateGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FeatureTemplateGenerator<T> for AggregatedFeatureTemplateGenerator<T> {
    fn generate_at(&self, observations: &[T], pos: usize) -> Vec<FeatureTemplate> {
        self.generators
            .iter()
            .flat_map(|generator| generator.generate_at(observations, pos))
            .collect()
    }
}
