//! # hocrf
//!
//! High-order Conditional Random Fields (CRFs) implemented in pure Rust
//!
//! Features condition on arbitrarily long histories of labels. Instead of enumerating every
//! label context, each sequence is compiled into a lattice of *patterns*, the label histories
//! actually observed in the features, which share their computation through suffix links.
#![cfg_attr(
    feature = "train",
    doc = "
## Examples

```rust
use hocrf::{
    AggregatedFeatureTemplateGenerator, DataSequence, FeatureTemplate,
    FeatureTemplateGenerator, Trainer, UnconditionalFeatureTemplateGenerator,
};

struct CurrentWord;

impl FeatureTemplateGenerator<&str> for CurrentWord {
    fn generate_at(&self, observations: &[&str], pos: usize) -> Vec<FeatureTemplate> {
        vec![FeatureTemplate::new(format!(\"w={}\", observations[pos]), 1)]
    }
}

let mut generator = AggregatedFeatureTemplateGenerator::new();
generator.add_generator(UnconditionalFeatureTemplateGenerator::new(2));
generator.add_generator(CurrentWord);

// Labels:
// DET: 0, NOUN: 1, VERB: 2
let corpus = vec![
    DataSequence::from_observations(&[\"the\", \"dog\", \"runs\"], Some(vec![0, 1, 2]), &generator)
        .unwrap(),
    DataSequence::from_observations(&[\"a\", \"cat\", \"sleeps\"], Some(vec![0, 1, 2]), &generator)
        .unwrap(),
];

// Generates a model
let model = Trainer::new().train(&corpus).unwrap();

let sequence = DataSequence::from_observations(&[\"the\", \"cat\", \"runs\"], None, &generator)
    .unwrap();
assert_eq!(vec![0, 1, 2], model.decode(&sequence).unwrap());
```
"
)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "alloc"))]
compile_error!("`alloc` feature is currently required to build this crate");

#[macro_use]
extern crate alloc;

mod builder;
mod data;
pub mod errors;
mod feature;
mod generator;
mod label;
mod lattice;
mod model;
mod pattern;
mod pattern_set;

#[cfg(feature = "train")]
mod forward_backward;
#[cfg(feature = "train")]
mod math;
#[cfg(feature = "train")]
mod objective;
#[cfg(feature = "train")]
pub mod scheduler;
#[cfg(feature = "train")]
mod trainer;

#[cfg(all(test, feature = "train"))]
mod test_utils;

pub use builder::build_pattern_set_sequence;
pub use data::DataSequence;
pub use errors::{HocrfError, Result};
pub use feature::{Feature, FeatureCounter, FeatureIndex, FeatureTemplate};
pub use generator::{
    AggregatedFeatureTemplateGenerator, FeatureTemplateGenerator,
    UnconditionalFeatureTemplateGenerator,
};
pub use label::{Label, LabelSequence};
pub use lattice::PatternSetSequence;
pub use model::Model;
pub use pattern::{Pattern, PatternId, ROOT};
pub use pattern_set::PatternSet;

#[cfg(feature = "train")]
pub use objective::LogLikelihoodFunction;
#[cfg(feature = "train")]
pub use trainer::{Regularization, Trainer};
