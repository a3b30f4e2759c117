pub mod city;
pub mod health;

pub use city::{CityService, city_routes};
pub use health::{AppStartTime, HealthService, health_routes};
