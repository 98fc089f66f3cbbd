//! Hart tests.

/// Register files, privilege encoding and the CSR file.
pub mod arch;


/// ALU, FPU, atomics and the MMU.
pub mod units;
