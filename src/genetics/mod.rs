//! Genetics module - traits, crossover, and hue inheritance.

pub mod color;
pub mod crossover;
pub mod genes;

pub use color::Hue;
pub use crossover::crossover;
pub use genes::Genes;
