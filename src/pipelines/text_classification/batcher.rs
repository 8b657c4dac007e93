use std::fmt::Debug;

use burn::{
    data::dataloader,
    nn::attention::generate_padding_mask,
    tensor::{backend::Backend, Bool, Data, ElementConversion, Int, Shape, Tensor},
};
use derive_new::new;

use super::{Label, Tokenization};

/// A text that has been through the tokenizer, paired with its class
#[derive(Clone, Debug, new)]
pub struct Encoded {
    /// Token ids, already truncated to the model maximum
    pub token_ids: Vec<usize>,

    /// The class of the text
    pub label: Label,
}

/// An inference batch for text classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Tokenized text as 2D tensor: [batch_size, max_seq_length]
    pub tokens: Tensor<B, 2, Int>,

    /// Padding mask for the tokenized text containing booleans for padding locations
    pub mask_pad: Tensor<B, 2, Bool>,
}

/// A training batch for text classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// Class ids for the batch
    pub targets: Tensor<B, 1, Int>,
}

/// Struct for batching encoded text classification items
#[derive(Clone, Debug)]
pub struct Batcher<B: Backend> {
    /// Maximum sequence length for tokenized text
    pub max_seq_length: usize,

    /// ID of the padding token
    pub pad_token_id: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher following the given tokenization policy
    pub fn new(tokenization: &Tokenization, device: B::Device) -> Self {
        Self {
            max_seq_length: tokenization.max_seq_length,
            pad_token_id: tokenization.pad_token_id,
            device,
        }
    }
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<Vec<usize>, Infer<B>> for Batcher<B> {
    /// Pads a list of token id sequences to the longest one into an inference batch
    fn batch(&self, token_ids_list: Vec<Vec<usize>>) -> Infer<B> {
        let padding = generate_padding_mask(
            self.pad_token_id,
            token_ids_list,
            Some(self.max_seq_length),
            &self.device,
        );

        Infer {
            tokens: padding.tensor,
            mask_pad: padding.mask,
        }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend> dataloader::batcher::Batcher<Encoded, Train<B>> for Batcher<B> {
    /// Collects a vector of encoded items into a training batch
    fn batch(&self, items: Vec<Encoded>) -> Train<B> {
        let batch_size = items.len();

        let class_ids = items
            .iter()
            .map(|item| (item.label.id() as i64).elem())
            .collect();

        let targets = Tensor::from_data(Data::new(class_ids, Shape::new([batch_size])), &self.device);

        let token_ids_list: Vec<Vec<usize>> = items.into_iter().map(|item| item.token_ids).collect();
        let input = dataloader::batcher::Batcher::<Vec<usize>, Infer<B>>::batch(self, token_ids_list);

        Train { input, targets }
    }
}
