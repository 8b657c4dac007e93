/// Fake news detection as binary text classification
pub mod text_classification;
