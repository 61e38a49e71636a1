// Derived figures and master-data labels
pub mod derived_metrics;
pub mod master_data;

// Report lifecycle and supervisor validation
pub mod reports;
pub mod validations;

// Analytics and exports
pub mod analytics;
pub mod export;
