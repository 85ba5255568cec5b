//! Low-level primitives shared by the planner.

/// Order-preserving encoders and key successor helpers.
pub mod bytes;
