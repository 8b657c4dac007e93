use std::marker::PhantomData;

use burn::{
    module::{AutodiffModule, ModuleVisitor, ParamId},
    optim::GradientsParams,
    tensor::{backend::AutodiffBackend, ElementConversion, Tensor},
};

/// Added to the norm before dividing, as torch does
const EPSILON: f64 = 1e-6;

/// Sums the squares of every gradient registered for the visited parameters
struct SquaredNorm<'a, B: AutodiffBackend> {
    grads: &'a GradientsParams,
    sum: f64,
    phantom: PhantomData<B>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for SquaredNorm<'_, B> {
    fn visit_float<const D: usize>(&mut self, id: &ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.get::<B::InnerBackend, D>(id) {
            let squares: f64 = (grad.clone() * grad).sum().into_scalar().elem();
            self.sum += squares;
        }
    }
}

/// Multiplies every gradient registered for the visited parameters by a factor
struct Scale<'a, B: AutodiffBackend> {
    grads: &'a mut GradientsParams,
    factor: f64,
    phantom: PhantomData<B>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for Scale<'_, B> {
    fn visit_float<const D: usize>(&mut self, id: &ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.remove::<B::InnerBackend, D>(id) {
            self.grads
                .register::<B::InnerBackend, D>(id.clone(), grad.mul_scalar(self.factor));
        }
    }
}

/// The L2 norm of all gradients taken together
pub fn global_norm<B, M>(module: &M, grads: &GradientsParams) -> f64
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let mut visitor = SquaredNorm::<B> {
        grads,
        sum: 0.0,
        phantom: PhantomData,
    };
    module.visit(&mut visitor);

    visitor.sum.sqrt()
}

/// Rescale the gradients so their global norm does not exceed `max_norm`.
///
/// Returns the norm measured before clipping.
pub fn clip_global_norm<B, M>(
    module: &M,
    mut grads: GradientsParams,
    max_norm: f64,
) -> (GradientsParams, f64)
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let norm = global_norm::<B, M>(module, &grads);

    let factor = max_norm / (norm + EPSILON);

    if norm.is_finite() && factor < 1.0 {
        let mut visitor = Scale::<B> {
            grads: &mut grads,
            factor,
            phantom: PhantomData,
        };
        module.visit(&mut visitor);
    }

    (grads, norm)
}
