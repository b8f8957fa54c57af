// Trend-analysis orchestration for the APR quality dashboard
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
