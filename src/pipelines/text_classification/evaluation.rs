use burn::tensor::backend::Backend;
use log::info;
use serde::Serialize;

use super::{
    metrics::{ClassificationReport, ConfusionMatrix},
    preprocess::HeldOut,
    Classifier, Error, Label, Result,
};

/// The outcome of evaluating a model on a held-out split
#[derive(Clone, Debug, Serialize)]
pub struct Evaluation {
    /// Macro-averaged F1 score
    pub f1: f64,

    /// Per-class precision, recall and F1
    pub report: ClassificationReport,

    /// True classes against predicted classes
    pub confusion: ConfusionMatrix,
}

/// Predict a class for every record of the held-out split, in batch order
pub fn predict<B, M>(model: &M, split: &HeldOut<B>) -> Result<Vec<Label>>
where
    B: Backend,
    M: Classifier<B>,
{
    let mut predictions = Vec::with_capacity(split.labels.len());

    for batch in split.loader.iter() {
        let logits = model.logits(batch.input);

        let class_ids = logits
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_data()
            .convert::<i64>()
            .value;

        for class_id in class_ids {
            predictions.push(Label::try_from(class_id)?);
        }
    }

    Ok(predictions)
}

/// Evaluate the model on a held-out split.
///
/// Runs on a non-autodiff backend so no gradients are tracked, and leaves the model untouched.
pub fn evaluate<B, M>(name: &str, model: &M, split: &HeldOut<B>) -> Result<Evaluation>
where
    B: Backend,
    M: Classifier<B>,
{
    let predictions = predict(model, split)?;

    if predictions.len() != split.labels.len() {
        return Err(Error::LengthMismatch {
            predictions: predictions.len(),
            labels: split.labels.len(),
        });
    }

    let confusion = ConfusionMatrix::from_predictions(&predictions, &split.labels)?;
    let report = ClassificationReport::new(&confusion);
    let f1 = report.macro_avg.f1;

    info!("F1 score on the {} split: {:.4}", name, f1);
    info!("Classification report:\n{}", report);
    info!("Confusion matrix:\n{}", confusion);

    Ok(Evaluation {
        f1,
        report,
        confusion,
    })
}
