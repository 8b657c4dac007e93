use std::fmt::Debug;

use super::Label;

/// A trait for items that can be used for text classification
pub trait Item: Send + Sync + Clone + Debug {
    /// Returns the input text for the item
    fn text(&self) -> &str;

    /// Returns the class for the item
    fn label(&self) -> Label;
}
