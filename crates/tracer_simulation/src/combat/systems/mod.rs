//! Combat systems (damage authority + health bookkeeping)

pub mod damage;


pub use damage::*;
