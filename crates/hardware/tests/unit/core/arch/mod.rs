//! Architectural state tests.

/// CSR views, masks and WARL behaviour.
pub mod csr_file;


/// Privilege encoding.
pub mod mode;
