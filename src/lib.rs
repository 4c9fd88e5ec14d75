//! Natal chart calculation with a monthly forecast, served over HTTP and MCP,
//! plus the running-plan onboarding sequence.

pub mod api;
pub mod aspects;
pub mod chart;
pub mod cities;
pub mod config;
pub mod constants;
pub mod ephemeris;
pub mod error;
pub mod forecast;
pub mod formatters;
pub mod houses;
pub mod models;
pub mod narrative;
pub mod onboarding;
pub mod positions;
pub mod server;
pub mod service;
pub mod zodiac;
