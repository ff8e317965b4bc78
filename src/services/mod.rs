pub mod email;
pub mod health_metrics;
pub mod retry;
pub mod scheduling;
pub mod validation;
