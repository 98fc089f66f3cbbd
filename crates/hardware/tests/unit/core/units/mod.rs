//! Functional unit tests.



/// Single-precision subset.
pub mod fpu;
