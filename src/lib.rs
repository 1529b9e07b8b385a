// Library root for the MedipolDAO verification API

pub mod core;
pub mod engine;
pub mod infra;
pub mod api;
pub mod config;
