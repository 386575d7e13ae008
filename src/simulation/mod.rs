//! Synthetic input generation.

pub mod group_generator;
