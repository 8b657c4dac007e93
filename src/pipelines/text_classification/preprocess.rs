use std::sync::Arc;

use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::{Dataset, InMemDataset},
    },
    tensor::backend::{AutodiffBackend, Backend},
};
use log::{debug, info};

use crate::datasets::Splits;

use super::{
    batcher::{Encoded, Train},
    Batcher, Error, Item, Label, Result, Settings, Tokenization,
};

/// Number of texts handed to the tokenizer at once
const ENCODE_CHUNK: usize = 1_000;

/// A held-out split: order-stable batches and the labels they were built from
#[derive(Clone)]
pub struct HeldOut<B: Backend> {
    /// Unshuffled batches
    pub loader: Arc<dyn DataLoader<Train<B>>>,

    /// Reference labels, in batch order
    pub labels: Vec<Label>,
}

/// Batch sources for each split
pub struct DataLoaders<B: AutodiffBackend> {
    /// Training batches, reshuffled on every pass
    pub train: Arc<dyn DataLoader<Train<B>>>,

    /// Number of training batches per epoch
    pub train_batches: usize,

    /// Validation batches
    pub valid: HeldOut<B::InnerBackend>,

    /// Test batches
    pub test: HeldOut<B::InnerBackend>,
}

/// Encode every item of a split, keeping only token ids and labels
pub fn encode<I, D>(split: &str, dataset: &D, tokenization: &Tokenization) -> Result<Vec<Encoded>>
where
    I: Item,
    D: Dataset<I>,
{
    let items: Vec<I> = dataset.iter().collect();
    let mut encoded = Vec::with_capacity(items.len());

    for (chunk_index, chunk) in items.chunks(ENCODE_CHUNK).enumerate() {
        let texts = chunk.iter().map(|item| item.text()).collect();
        let token_ids_list = tokenization.encode_batch(texts)?;

        for (offset, (item, token_ids)) in chunk.iter().zip(token_ids_list).enumerate() {
            if token_ids.is_empty() {
                return Err(Error::MalformedRecord {
                    split: split.to_string(),
                    message: format!(
                        "record {} encodes to no tokens",
                        chunk_index * ENCODE_CHUNK + offset
                    ),
                });
            }

            encoded.push(Encoded::new(token_ids, item.label()));
        }
    }

    debug!("Encoded {} records of the {} split", encoded.len(), split);

    Ok(encoded)
}

/// Tokenize every split and group it into batches
pub fn dataloaders<B, I, D>(
    splits: &Splits<D>,
    tokenization: &Tokenization,
    settings: &Settings<B>,
) -> Result<DataLoaders<B>>
where
    B: AutodiffBackend,
    I: Item + 'static,
    D: Dataset<I>,
{
    let config = &settings.training;
    config.validate()?;

    let train = encode("train", &splits.train, tokenization)?;
    let train_batches = train.len().div_ceil(config.batch_size);

    let batcher_train = Batcher::<B>::new(tokenization, settings.device.clone());

    let train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .build(InMemDataset::new(train));

    let valid = held_out::<B::InnerBackend, I, D>(
        "validation",
        &splits.validation,
        tokenization,
        config.batch_size,
        settings.device.clone(),
    )?;
    let test = held_out::<B::InnerBackend, I, D>(
        "test",
        &splits.test,
        tokenization,
        config.batch_size,
        settings.device.clone(),
    )?;

    info!(
        "Prepared {} training batches, {} validation and {} test records",
        train_batches,
        valid.labels.len(),
        test.labels.len()
    );

    Ok(DataLoaders {
        train,
        train_batches,
        valid,
        test,
    })
}

/// Build the order-stable batches of a held-out split
pub fn held_out<B, I, D>(
    split: &str,
    dataset: &D,
    tokenization: &Tokenization,
    batch_size: usize,
    device: B::Device,
) -> Result<HeldOut<B>>
where
    B: Backend,
    I: Item + 'static,
    D: Dataset<I>,
{
    let encoded = encode(split, dataset, tokenization)?;
    let labels = encoded.iter().map(|item| item.label).collect();

    let batcher = Batcher::<B>::new(tokenization, device);

    // A single worker keeps the batch order identical across passes
    let loader = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .build(InMemDataset::new(encoded));

    Ok(HeldOut { loader, labels })
}

#[cfg(test)]
mod tests {
    use burn::data::dataset::InMemDataset;
    use pretty_assertions::assert_eq;

    use crate::{
        datasets::fake_news,
        pipelines::text_classification::Training,
        testing::{word_tokenizer, TestAutodiffBackend, TinyConfig, TEST_DEVICE},
    };

    use super::*;

    fn items(n: usize) -> InMemDataset<fake_news::Item> {
        let texts = [
            "scientists confirm water is wet",
            "aliens built the pyramids",
            "the moon is made of cheese",
            "water is wet",
        ];

        InMemDataset::new(
            (0..n)
                .map(|i| {
                    let label = if i % 2 == 0 { Label::Real } else { Label::Fake };
                    fake_news::Item::new(texts[i % texts.len()].to_string(), label)
                })
                .collect(),
        )
    }

    fn settings(batch_size: usize) -> Settings<TestAutodiffBackend> {
        Settings::new(Training::new().with_batch_size(batch_size), TEST_DEVICE)
    }

    fn order(loader: &Arc<dyn DataLoader<Train<impl Backend>>>) -> Vec<i64> {
        loader
            .iter()
            .flat_map(|batch| batch.input.tokens.into_data().convert::<i64>().value)
            .collect()
    }

    #[test]
    fn batches_never_exceed_the_batch_size() {
        let tokenization = Tokenization::new(word_tokenizer(), &TinyConfig::new()).unwrap();
        let splits = Splits::new(items(10), items(7), items(5));

        let loaders = dataloaders(&splits, &tokenization, &settings(4)).unwrap();

        assert_eq!(loaders.train_batches, 3);

        let train_sizes: Vec<usize> = loaders
            .train
            .iter()
            .map(|batch| batch.targets.dims()[0])
            .collect();
        assert!(train_sizes.iter().all(|size| *size <= 4));
        assert_eq!(train_sizes.iter().sum::<usize>(), 10);

        for batch in loaders.valid.loader.iter() {
            assert!(batch.targets.dims()[0] <= 4);
        }
        assert_eq!(loaders.valid.labels.len(), 7);
        assert_eq!(loaders.test.labels.len(), 5);
    }

    #[test]
    fn held_out_batches_are_order_stable() {
        let tokenization = Tokenization::new(word_tokenizer(), &TinyConfig::new()).unwrap();
        let splits = Splits::new(items(8), items(9), items(6));

        let loaders = dataloaders(&splits, &tokenization, &settings(2)).unwrap();

        assert_eq!(order(&loaders.valid.loader), order(&loaders.valid.loader));
        assert_eq!(order(&loaders.test.loader), order(&loaders.test.loader));

        let targets: Vec<i64> = loaders
            .valid
            .loader
            .iter()
            .flat_map(|batch| batch.targets.into_data().convert::<i64>().value)
            .collect();
        let labels: Vec<i64> = loaders.valid.labels.iter().map(|l| l.id() as i64).collect();
        assert_eq!(targets, labels);
    }

    #[test]
    fn zero_batch_size_is_a_configuration_error() {
        let tokenization = Tokenization::new(word_tokenizer(), &TinyConfig::new()).unwrap();
        let splits = Splits::new(items(4), items(2), items(2));

        let result = dataloaders(&splits, &tokenization, &settings(0));

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn train_batches_are_reshuffled_on_every_pass() {
        let tokenization = Tokenization::new(word_tokenizer(), &TinyConfig::new()).unwrap();
        let splits = Splits::new(items(40), items(2), items(2));

        let loaders = dataloaders(&splits, &tokenization, &settings(1)).unwrap();

        let passes: Vec<Vec<i64>> = (0..4).map(|_| order(&loaders.train)).collect();

        let mut sorted: Vec<Vec<i64>> = passes.clone();
        for pass in sorted.iter_mut() {
            pass.sort();
        }
        assert!(sorted.windows(2).all(|w| w[0] == w[1]));
        assert!(passes.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn rejects_texts_without_tokens() {
        let tokenization = Tokenization::new(word_tokenizer(), &TinyConfig::new()).unwrap();
        let dataset = InMemDataset::new(vec![fake_news::Item::new("   ".to_string(), Label::Fake)]);

        let error = encode("train", &dataset, &tokenization).unwrap_err();

        assert!(error.is_data_validation());
    }
}
