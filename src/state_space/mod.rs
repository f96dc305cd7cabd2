//! Reference collaborators: a real-vector state space, its projection,
//! box goals and a near-projected sampler.

pub mod real_vector;
pub mod projection;
pub mod goal;
pub mod sampler;

pub use real_vector::*;
pub use projection::*;
pub use goal::*;
pub use sampler::*;
