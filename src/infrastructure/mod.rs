// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_repository;
pub mod sse;
