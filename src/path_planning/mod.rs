// Path Planning algorithms module

pub mod near_kpiece;

pub use near_kpiece::*;
