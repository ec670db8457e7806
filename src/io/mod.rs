/// CSV export for per-tick telemetry and the trade ledger.
pub mod export;
