pub mod contrast;
pub mod pitch;
pub mod silence;
pub mod windowing;
