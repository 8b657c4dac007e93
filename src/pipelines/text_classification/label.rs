use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::Error;

/// Number of classes the detector distinguishes
pub const N_CLASSES: usize = 2;

/// The class of a news text
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Label {
    /// Fabricated or misleading news
    Fake,

    /// Genuine news
    Real,
}

impl Label {
    /// All labels, ordered by class id
    pub const ALL: [Label; N_CLASSES] = [Label::Fake, Label::Real];

    /// The class id used by the model head
    pub fn id(&self) -> usize {
        match self {
            Label::Fake => 0,
            Label::Real => 1,
        }
    }

    /// The human readable class name
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Fake => "Fake",
            Label::Real => "Real",
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Fake),
            1 => Ok(Label::Real),
            other => Err(Error::UnknownLabel(other)),
        }
    }
}

impl TryFrom<usize> for Label {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Label::try_from(value as i64)
    }
}

impl From<Label> for usize {
    fn from(label: Label) -> Self {
        label.id()
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
