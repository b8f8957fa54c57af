// Domain layer - pure data models, no I/O
pub mod insights;
pub mod parameter;
pub mod summary;
pub mod trend;
pub mod upload;
