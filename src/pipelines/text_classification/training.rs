use std::sync::Arc;

use burn::{
    data::dataloader::DataLoader,
    lr_scheduler::LrScheduler,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use log::{info, warn};

use super::{
    batcher::Train, clipping::clip_global_norm, schedule::LinearWarmupConfig, Classifier, Error,
    Result, Training,
};

/// Fine-tune the model over the training batches.
///
/// Every batch runs a forward pass, backpropagates the cross-entropy loss, clips the global
/// gradient norm, takes one AdamW step at the scheduled rate and then advances the schedule.
/// A non-finite loss or gradient norm aborts the run.
pub fn train<B, M>(
    mut model: M,                               // Model to fine-tune
    dataloader: Arc<dyn DataLoader<Train<B>>>, // Training batches
    steps_per_epoch: usize,                     // Number of batches in one pass
    config: &Training,                          // Experiment configuration
) -> Result<M>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
{
    let total_steps = steps_per_epoch * config.num_epochs;

    if total_steps == 0 {
        warn!("No training batches, the model is left untouched");

        return Ok(model);
    }

    // Initialize optimizer
    let mut optimizer = AdamWConfig::new()
        .with_weight_decay(config.weight_decay)
        .with_epsilon(config.adam_epsilon)
        .init::<B, M>();

    // Initialize learning rate scheduler
    let mut scheduler = LinearWarmupConfig::new(config.learning_rate, total_steps)
        .with_warmup_steps(config.warmup_steps)
        .init();

    info!(
        "Training for {} epochs, {} steps in total",
        config.num_epochs, total_steps
    );

    for epoch in 1..=config.num_epochs {
        for batch in dataloader.iter() {
            let step = scheduler.current_step() + 1;

            let output = model.forward(batch);

            let loss: f64 = output.loss.clone().into_scalar().elem();
            if !loss.is_finite() {
                return Err(Error::NonFiniteLoss { step, loss });
            }

            let grads = GradientsParams::from_grads(output.loss.backward(), &model);
            let (grads, norm) = clip_global_norm::<B, M>(&model, grads, config.max_grad_norm);
            if !norm.is_finite() {
                return Err(Error::NonFiniteGradient { step, norm });
            }

            let lr = LrScheduler::<B>::step(&mut scheduler);
            model = optimizer.step(lr, model, grads);

            info!(
                "Epoch {}/{} - step {}/{} ({:.2}%) - loss {:.4} - grad norm {:.4} - lr {:.3e}",
                epoch,
                config.num_epochs,
                step,
                total_steps,
                step as f64 / total_steps as f64 * 100.0,
                loss,
                norm,
                lr
            );
        }
    }

    Ok(model)
}
