//! HTTP surface: city lookup route, health checks and middleware.

pub mod middleware;
pub mod services;
