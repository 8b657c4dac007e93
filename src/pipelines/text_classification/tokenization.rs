use tokenizers::{Tokenizer, TruncationParams};

use super::{Error, ModelConfig, Result};

/// The tokenization policy shared by training, evaluation and inference
#[derive(Clone)]
pub struct Tokenization {
    /// Tokenizer for converting text to token IDs, truncating to `max_seq_length`
    tokenizer: Tokenizer,

    /// Maximum sequence length for tokenized text
    pub max_seq_length: usize,

    /// ID of the padding token
    pub pad_token_id: usize,
}

impl Tokenization {
    /// Derive the policy from the model configuration
    pub fn new(mut tokenizer: Tokenizer, config: &impl ModelConfig) -> Result<Self> {
        let max_seq_length = config.max_seq_length();

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_seq_length,
                ..Default::default()
            }))
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        // Padding happens per batch, against the longest sequence
        tokenizer.with_padding(None);

        Ok(Self {
            tokenizer,
            max_seq_length,
            pad_token_id: config.pad_token_id(),
        })
    }

    /// The configured tokenizer
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Encode a single text into token ids
    pub fn encode(&self, text: &str) -> Result<Vec<usize>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        Ok(encoding.get_ids().iter().map(|t| *t as usize).collect())
    }

    /// Encode many texts at once, preserving order
    pub fn encode_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<usize>>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts, true)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        Ok(encodings
            .iter()
            .map(|encoding| encoding.get_ids().iter().map(|t| *t as usize).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::testing::{word_tokenizer, TinyConfig};

    use super::*;

    #[test]
    fn encoding_is_deterministic() {
        let tokenization = Tokenization::new(word_tokenizer(), &TinyConfig::new()).unwrap();

        let first = tokenization.encode("scientists confirm water is wet").unwrap();
        let second = tokenization.encode("scientists confirm water is wet").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn truncates_to_the_model_maximum() {
        let config = TinyConfig::new().with_max_seq_length(3);
        let tokenization = Tokenization::new(word_tokenizer(), &config).unwrap();

        let ids = tokenization.encode("scientists confirm water is wet").unwrap();

        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn batch_encoding_matches_single_encoding() {
        let tokenization = Tokenization::new(word_tokenizer(), &TinyConfig::new()).unwrap();

        let batch = tokenization
            .encode_batch(vec!["aliens built the pyramids", "water is wet"])
            .unwrap();

        assert_eq!(batch[0], tokenization.encode("aliens built the pyramids").unwrap());
        assert_eq!(batch[1], tokenization.encode("water is wet").unwrap());
    }
}
