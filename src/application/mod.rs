// Scoring pipeline: artifacts, scaler, engine
pub mod ml;

// Best-effort prediction persistence
pub mod ledger;

// Request-level orchestration
pub mod fraud_service;

// Offline CSV scoring
pub mod csv_scoring;
