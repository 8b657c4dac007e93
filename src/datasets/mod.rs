use std::fmt::Display;

use async_trait::async_trait;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::pipelines::text_classification::Result;

/// The GonzaloA/fake_news dataset
pub mod fake_news;

/// A dataset which can be loaded one split at a time
#[async_trait]
pub trait LoadableDataset<I>: burn::data::dataset::Dataset<I> {
    /// Load one split of the dataset
    async fn load(data_dir: &str, split: Split) -> Result<Self>
    where
        Self: std::marker::Sized;
}

/// Load the train, validation and test splits concurrently
pub async fn load_splits<I, D>(data_dir: &str) -> Result<Splits<D>>
where
    D: LoadableDataset<I>,
{
    let (train, validation, test) = futures::try_join!(
        D::load(data_dir, Split::Train),
        D::load(data_dir, Split::Validation),
        D::load(data_dir, Split::Test),
    )?;

    Ok(Splits::new(train, validation, test))
}

/// The partitions of a dataset
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Split {
    /// Records to fit the model on
    Train,

    /// Records to tune and compare runs on
    Validation,

    /// Records to report the final metrics on
    Test,
}

impl Split {
    /// The name of the split
    pub fn name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }

    /// The CSV file holding the split
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

impl Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A dataset partitioned into train, validation and test splits
#[derive(Debug, Clone, new)]
pub struct Splits<D> {
    /// Training records
    pub train: D,

    /// Validation records
    pub validation: D,

    /// Test records
    pub test: D,
}

/// The Dataset enum
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Dataset {
    /// GonzaloA/fake_news
    #[default]
    FakeNews,
}

impl TryFrom<&str> for Dataset {
    type Error = DatasetError;

    /// Try to convert a string to a Dataset
    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let value = value.to_lowercase();

        if value == fake_news::DATASET || value == fake_news::HUB_REPO.to_lowercase() {
            Ok(Dataset::FakeNews)
        } else {
            Err(Self::Error::Unknown(value))
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dataset::FakeNews => fake_news::DATASET,
        };

        write!(f, "{}", name)
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// No dataset found for the given string
    #[error("no dataset found for {0}")]
    Unknown(String),
}
