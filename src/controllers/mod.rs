use nalgebra::{Scalar, Vector2};

pub mod pid;

dyn_clone::clone_trait_object!(<T> FeedbackController<T> where T: Scalar);

/// A controller turning a 2D error into a 2D command, one tick at a time.
pub trait FeedbackController<T: Scalar>: dyn_clone::DynClone + Send {
    fn update(&mut self, error: Vector2<T>) -> Vector2<T>;
    fn reset(&mut self);
}
