use bert_burn::{
    data::BertInferenceBatch,
    model::{BertModel, BertModelOutput},
};
use burn::{
    module::Module,
    nn::Linear,
    tensor::{backend::Backend, Tensor},
};
use derive_new::new;

use crate::pipelines::text_classification::{batcher::Infer, Classifier};

/// BERT for sequence classification
#[derive(Module, Debug, new)]
pub struct Model<B: Backend> {
    /// The base BERT model
    pub model: BertModel<B>,

    /// Linear layer for sequence classification
    pub output: Linear<B>,

    /// Total number of classes
    pub n_classes: usize,
}

impl<B: Backend> Classifier<B> for Model<B> {
    /// Classify the pooled representation of the first token
    fn logits(&self, input: Infer<B>) -> Tensor<B, 2> {
        let [batch_size, _seq_length] = input.tokens.dims();

        let BertModelOutput {
            pooled_output,
            hidden_states,
        } = self.model.forward(BertInferenceBatch {
            tokens: input.tokens,
            mask_pad: input.mask_pad,
        });

        self.output
            .forward(pooled_output.unwrap_or(hidden_states))
            .slice([0..batch_size, 0..1])
            .reshape([batch_size, self.n_classes])
    }
}
