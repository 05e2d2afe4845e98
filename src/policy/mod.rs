//! Policy trait and baseline implementations.

pub mod random;
pub mod sweep;
pub mod trait_;

pub use random::RandomPolicy;
pub use sweep::SweepPolicy;
pub use trait_::Policy;
