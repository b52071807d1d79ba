// Domain-specific error types
pub mod errors;

// Feature schema and risk tiers
pub mod ml;

// Scoring results and ledger records
pub mod prediction;

// Repository traits
pub mod repositories;
