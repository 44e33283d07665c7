use alloc::vec::Vec;

use crate::errors::{HocrfError, Result};
use crate::feature::{FeatureCounter, FeatureTemplate};
use crate::generator::FeatureTemplateGenerator;
use crate::label::{Label, LabelSequence};

/// Feature templates activated at each position of a sequence, with optional gold labels.
#[derive(Clone, Debug)]
pub struct DataSequence {
    templates: Vec<Vec<FeatureTemplate>>,
    labels: Option<Vec<Label>>,
}

impl DataSequence {
    /// Creates a new data sequence.
    ///
    /// # Arguments
    ///
    /// * `templates` - Feature templates activated at each position.
    /// * `labels` - Gold labels of each position, or `None` if they are unknown.
    ///
    /// # Errors
    ///
    /// `templates` must not be empty, and `labels` must have one label per position.
    pub fn new(templates: Vec<Vec<FeatureTemplate>>, labels: Option<Vec<Label>>) -> Result<Self> {
        if templates.is_empty() {
            return Err(HocrfError::invalid_argument(
                "templates",
                "must contain at least one position",
            ));
        }
        if let Some(labels) = labels.as_ref() {
            if labels.len() != templates.len() {
                return Err(HocrfError::invalid_argument(
                    "labels",
                    "must have the same length as templates",
                ));
            }
        }
        Ok(Self { templates, labels })
    }

    /// Creates a new data sequence by applying the generator to each position.
    ///
    /// # Errors
    ///
    /// See [`DataSequence::new()`].
    pub fn from_observations<T, G>(
        observations: &[T],
        labels: Option<Vec<Label>>,
        generator: &G,
    ) -> Result<Self>
    where
        G: FeatureTemplateGenerator<T> + ?Sized,
    {
        let templates = (0..observations.len())
            .map(|pos| generator.generate_at(observations, pos))
            .collect();
        Self::new(templates, labels)
    }

    /// Returns the number of positions.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always returns `false` since a sequence has at least one position.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns the templates activated at the given position.
    #[inline(always)]
    #[must_use]
    pub fn templates_at(&self, pos: usize) -> &[FeatureTemplate] {
        &self.templates[pos]
    }

    /// Returns the gold labels.
    #[inline(always)]
    #[must_use]
    pub fn labels(&self) -> Option<&[Label]> {
        self.labels.as_deref()
    }

    /// Returns the gold history of the given length ending at `pos`, most recent label first.
    ///
    /// Returns `None` if the labels are unknown or the history would start before the
    /// sequence.
    #[must_use]
    pub fn label_sequence_at(&self, pos: usize, order: usize) -> Option<LabelSequence> {
        let labels = self.labels.as_ref()?;
        if pos + 1 < order {
            return None;
        }
        Some(LabelSequence::new(
            (0..order).map(|i| labels[pos - i]).collect(),
        ))
    }

    /// Counts the features matching the gold labels.
    ///
    /// Does nothing if the labels are unknown.
    pub fn accumulate_feature_counts(&self, counter: &mut FeatureCounter) {
        for (pos, templates) in self.templates.iter().enumerate() {
            for template in templates {
                if template.order() == 0 {
                    continue;
                }
                if let Some(labels) = self.label_sequence_at(pos, template.order()) {
                    counter.add(template.generate_feature(labels));
                }
            }
        }
    }
}
