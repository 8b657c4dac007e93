use burn::{
    module::Module,
    nn::loss::CrossEntropyLossConfig,
    tensor::{backend::Backend, Tensor},
    train::ClassificationOutput,
};

use super::batcher::{Infer, Train};

/// A trait for models that can be used for Text Classification
pub trait Classifier<B: Backend>: Module<B> {
    /// Raw, unnormalized class scores: [batch_size, n_classes]
    fn logits(&self, input: Infer<B>) -> Tensor<B, 2>;

    /// Perform a forward pass with cross-entropy loss against the batch targets
    fn forward(&self, item: Train<B>) -> ClassificationOutput<B> {
        let targets = item.targets;
        let output = self.logits(item.input);

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }
}

/// A trait for configs that can be used for Text Classification models
pub trait ModelConfig: burn::config::Config + Clone {
    /// The model this configuration builds
    type Model<B: Backend>: Classifier<B>;

    /// Initialize the model with default weights
    fn init<B: Backend>(&self, device: &B::Device) -> Self::Model<B>;

    /// Width of the classification head
    fn n_classes(&self) -> usize;

    /// The padding token ID
    fn pad_token_id(&self) -> usize;

    /// Maximum number of tokens the model accepts per text
    fn max_seq_length(&self) -> usize;
}
