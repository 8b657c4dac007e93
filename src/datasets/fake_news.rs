use std::{io::Read, path::PathBuf};

use async_trait::async_trait;
use burn::data::dataset::{self, Dataset as _, InMemDataset};
use derive_new::new;
use log::{debug, info};
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::{
    pipelines::text_classification::{self, Error, Label, Result},
    utils::hugging_face::download_hf_dataset_file,
};

use super::{LoadableDataset, Split};

/// The name of the fake news dataset
pub static DATASET: &str = "fake_news";

/// The Hugging Face Hub repository of the dataset
pub static HUB_REPO: &str = "GonzaloA/fake_news";

/// A news text and its class
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Item {
    /// The body of the article
    pub text: String,

    /// Whether the article is fake or real
    pub label: Label,
}

impl text_classification::Item for Item {
    fn text(&self) -> &str {
        &self.text
    }

    fn label(&self) -> Label {
        self.label
    }
}

/// The columns kept from each CSV row, the index and title columns are ignored
#[derive(Debug, Deserialize)]
struct Record {
    text: Option<String>,
    label: Option<i64>,
}

/// Struct for the fake news dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,
}

/// Implement the Dataset trait for the fake news dataset
impl dataset::Dataset<Item> for Dataset {
    /// Returns a specific item from the dataset
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    /// Returns the length of the dataset
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl Dataset {
    /// Wrap already parsed items
    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            dataset: InMemDataset::new(items),
        }
    }

    /// Parse a split from CSV, keeping only the text and the label of each record.
    ///
    /// Records without a text or a label, or with a label outside of {0, 1}, are rejected.
    pub fn from_reader(split: Split, mut reader: impl Read) -> Result<Self> {
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .map_err(|e| Error::MalformedRecord {
                split: split.to_string(),
                message: e.to_string(),
            })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(detect_delimiter(&contents))
            .from_reader(contents.as_slice());

        let mut items = Vec::new();
        for (row, record) in reader.deserialize::<Record>().enumerate() {
            let record = record.map_err(|e| Error::MalformedRecord {
                split: split.to_string(),
                message: e.to_string(),
            })?;

            let missing = |field| Error::MissingField {
                split: split.to_string(),
                row,
                field,
            };

            let text = record.text.ok_or_else(|| missing("text"))?;
            let label = record.label.ok_or_else(|| missing("label"))?;

            items.push(Item::new(text, Label::try_from(label)?));
        }

        debug!("Parsed {} records of the {} split", items.len(), split);

        Ok(Self::from_items(items))
    }

    /// Returns random samples from the dataset
    pub fn samples(&self, n: usize) -> Vec<Item> {
        let mut rng = rand::thread_rng();

        index::sample(&mut rng, self.len(), n.min(self.len()))
            .into_iter()
            .filter_map(|i| self.get(i))
            .collect()
    }
}

#[async_trait]
impl LoadableDataset<Item> for Dataset {
    /// Read the split from the data directory, or download it from the Hugging Face Hub
    async fn load(data_dir: &str, split: Split) -> Result<Self> {
        let local = PathBuf::from(data_dir)
            .join("datasets")
            .join(DATASET)
            .join(split.file_name());

        let path = if local.is_file() {
            local
        } else {
            info!("Downloading the {} split of {}", split, HUB_REPO);

            download_hf_dataset_file(HUB_REPO, &split.file_name()).await?
        };

        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::resource(&path, e))?;

        let dataset = Self::from_reader(split, contents.as_slice())?;

        info!(
            "Loaded {} records of the {} split from {}",
            dataset.len(),
            split,
            path.display()
        );

        Ok(dataset)
    }
}

/// The header has no free text, so whichever separator it uses most is the delimiter
fn detect_delimiter(contents: &[u8]) -> u8 {
    let header = contents.split(|b| *b == b'\n').next().unwrap_or_default();

    let count = |delimiter: u8| header.iter().filter(|b| **b == delimiter).count();

    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}
