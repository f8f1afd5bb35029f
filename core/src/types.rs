//! Shared primitive types used across the scoring workspace.

/// A stable customer identifier, e.g. `CUST00042`.
pub type CustomerId = String;
