//! Labeled training corpus loaded from two CSV datasets.
//!
//! The genuine dataset contributes label 0 and the fake dataset label 1. Each
//! file must have a header row containing the four [`FEATURE_NAMES`] columns;
//! any other columns are ignored.
//!
//! [`FEATURE_NAMES`]: crate::FEATURE_NAMES

use std::fs::File;
use std::io::Read;
use std::path::Path;

use fakescan_core::Label;
use serde::Deserialize;

use crate::error::ModelError;
use crate::Features;

#[derive(Debug, Deserialize)]
struct DatasetRow {
    followers_count: Option<f64>,
    friends_count: Option<f64>,
    statuses_count: Option<f64>,
    listed_count: Option<f64>,
}

impl DatasetRow {
    fn into_features(self) -> Result<Features, String> {
        let columns = [
            ("followers_count", self.followers_count),
            ("friends_count", self.friends_count),
            ("statuses_count", self.statuses_count),
            ("listed_count", self.listed_count),
        ];
        let mut out = [0.0; crate::N_FEATURES];
        for (slot, (name, value)) in out.iter_mut().zip(columns) {
            match value {
                Some(v) if v.is_finite() && v >= 0.0 => *slot = v,
                Some(v) => return Err(format!("{name} must be a non-negative number, got {v}")),
                None => return Err(format!("{name} is missing or empty")),
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub features: Features,
    pub label: Label,
}

/// Immutable set of labeled samples used to fit the ensemble.
#[derive(Debug, Clone)]
pub struct TrainingCorpus {
    samples: Vec<LabeledSample>,
}

impl TrainingCorpus {
    /// Loads and concatenates the genuine and fake datasets.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if either file cannot be opened, a row is
    /// malformed, or the resulting corpus lacks one of the classes.
    pub fn load(genuine_path: &Path, fake_path: &Path) -> Result<Self, ModelError> {
        let open = |path: &Path| {
            File::open(path).map_err(|source| ModelError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        let mut samples = read_dataset(
            open(genuine_path)?,
            &genuine_path.display().to_string(),
            Label::Genuine,
        )?;
        samples.extend(read_dataset(
            open(fake_path)?,
            &fake_path.display().to_string(),
            Label::Fake,
        )?);

        let corpus = Self::from_samples(samples)?;
        let (genuine, fake) = corpus.class_counts();
        tracing::info!(genuine, fake, "training corpus loaded");
        Ok(corpus)
    }

    /// Builds a corpus from in-memory CSV sources.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TrainingCorpus::load`], minus file access.
    pub fn from_readers<G: Read, F: Read>(genuine: G, fake: F) -> Result<Self, ModelError> {
        let mut samples = read_dataset(genuine, "genuine", Label::Genuine)?;
        samples.extend(read_dataset(fake, "fake", Label::Fake)?);
        Self::from_samples(samples)
    }

    /// Wraps pre-built samples.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyCorpus`] for no samples and
    /// [`ModelError::MissingClass`] when only one label is present.
    pub fn from_samples(samples: Vec<LabeledSample>) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyCorpus);
        }
        let corpus = Self { samples };
        match corpus.class_counts() {
            (0, _) => Err(ModelError::MissingClass("genuine")),
            (_, 0) => Err(ModelError::MissingClass("fake")),
            _ => Ok(corpus),
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns `(genuine, fake)` sample counts.
    #[must_use]
    pub fn class_counts(&self) -> (usize, usize) {
        let fake = self
            .samples
            .iter()
            .filter(|s| s.label == Label::Fake)
            .count();
        (self.samples.len() - fake, fake)
    }
}

fn read_dataset<R: Read>(
    reader: R,
    context: &str,
    label: Label,
) -> Result<Vec<LabeledSample>, ModelError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut samples = Vec::new();
    for (index, row) in csv_reader.deserialize::<DatasetRow>().enumerate() {
        let row = row.map_err(|source| ModelError::Csv {
            context: context.to_string(),
            source,
        })?;
        let features = row
            .into_features()
            .map_err(|reason| ModelError::InvalidRow {
                context: context.to_string(),
                record: index as u64 + 1,
                reason,
            })?;
        samples.push(LabeledSample { features, label });
    }
    Ok(samples)
}
