//! Classification metrics over the binary label space

use std::fmt::{self, Display};

use serde::Serialize;

use super::{Error, Label, Result, N_CLASSES};

/// Counts of true classes against predicted classes
///
/// `matrix[true][predicted]`, indexed by class id
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    matrix: [[usize; N_CLASSES]; N_CLASSES],
}

impl ConfusionMatrix {
    /// Tally predictions against reference labels
    pub fn from_predictions(predictions: &[Label], labels: &[Label]) -> Result<Self> {
        if predictions.len() != labels.len() {
            return Err(Error::LengthMismatch {
                predictions: predictions.len(),
                labels: labels.len(),
            });
        }

        let mut matrix = [[0; N_CLASSES]; N_CLASSES];
        for (predicted, actual) in predictions.iter().zip(labels) {
            matrix[actual.id()][predicted.id()] += 1;
        }

        Ok(Self { matrix })
    }

    /// Count of `actual` records predicted as `predicted`
    pub fn get(&self, actual: Label, predicted: Label) -> usize {
        self.matrix[actual.id()][predicted.id()]
    }

    fn true_positives(&self, class: Label) -> usize {
        self.get(class, class)
    }

    fn predicted(&self, class: Label) -> usize {
        Label::ALL.iter().map(|actual| self.get(*actual, class)).sum()
    }

    /// Classes seen among either the labels or the predictions
    pub fn present_classes(&self) -> Vec<Label> {
        Label::ALL
            .into_iter()
            .filter(|class| self.support(*class) + self.predicted(*class) > 0)
            .collect()
    }

    /// Number of records whose true class is `class`
    pub fn support(&self, class: Label) -> usize {
        Label::ALL.iter().map(|predicted| self.get(class, *predicted)).sum()
    }

    /// Total number of records
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Fraction of records predicted correctly
    pub fn accuracy(&self) -> f64 {
        let correct: usize = Label::ALL.iter().map(|l| self.true_positives(*l)).sum();

        ratio(correct, self.total())
    }

    /// Precision, recall, F1 and support for one class
    pub fn class_metrics(&self, class: Label) -> ClassMetrics {
        let tp = self.true_positives(class);

        let precision = ratio(tp, self.predicted(class));
        let recall = ratio(tp, self.support(class));
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassMetrics {
            label: class,
            precision,
            recall,
            f1,
            support: self.support(class),
        }
    }
}

impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12}", "")?;
        for predicted in Label::ALL {
            write!(f, " {:>10}", format!("pred {}", predicted))?;
        }
        writeln!(f)?;

        for actual in Label::ALL {
            write!(f, "{:>12}", format!("true {}", actual))?;
            for predicted in Label::ALL {
                write!(f, " {:>10}", self.get(actual, predicted))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Metrics for a single class
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassMetrics {
    /// The class
    pub label: Label,
    /// TP / (TP + FP)
    pub precision: f64,
    /// TP / (TP + FN)
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// Number of records of this class
    pub support: usize,
}

/// Averaged metrics over the classes present
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Averages {
    /// Unweighted mean of the precisions
    pub precision: f64,
    /// Unweighted mean of the recalls
    pub recall: f64,
    /// Unweighted mean of the F1 scores
    pub f1: f64,
}

/// A per-class classification report
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Metrics for each present class, ordered by class id
    pub classes: Vec<ClassMetrics>,
    /// Fraction of correct predictions
    pub accuracy: f64,
    /// Unweighted means over the classes
    pub macro_avg: Averages,
    /// Means weighted by support
    pub weighted_avg: Averages,
    /// Total number of records
    pub support: usize,
}

impl ClassificationReport {
    /// Build the report from a confusion matrix
    pub fn new(confusion: &ConfusionMatrix) -> Self {
        let classes: Vec<ClassMetrics> = confusion
            .present_classes()
            .into_iter()
            .map(|label| confusion.class_metrics(label))
            .collect();

        let support = confusion.total();

        let mean = |metric: fn(&ClassMetrics) -> f64| -> f64 {
            if classes.is_empty() {
                return 0.0;
            }

            classes.iter().map(metric).sum::<f64>() / classes.len() as f64
        };

        let macro_avg = Averages {
            precision: mean(|c| c.precision),
            recall: mean(|c| c.recall),
            f1: mean(|c| c.f1),
        };

        let weighted = |metric: fn(&ClassMetrics) -> f64| -> f64 {
            if support == 0 {
                return 0.0;
            }

            classes
                .iter()
                .map(|c| metric(c) * c.support as f64)
                .sum::<f64>()
                / support as f64
        };

        let weighted_avg = Averages {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
        };

        Self {
            accuracy: confusion.accuracy(),
            classes,
            macro_avg,
            weighted_avg,
            support,
        }
    }
}

impl Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        for class in &self.classes {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                class.label.as_str(),
                class.precision,
                class.recall,
                class.f1,
                class.support
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.support
        )?;

        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }

        Ok(())
    }
}

/// Unweighted mean of the per-class F1 scores, over the classes present
pub fn macro_f1(predictions: &[Label], labels: &[Label]) -> Result<f64> {
    let confusion = ConfusionMatrix::from_predictions(predictions, labels)?;

    Ok(ClassificationReport::new(&confusion).macro_avg.f1)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
