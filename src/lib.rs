pub mod agent;
pub mod capture;
pub mod config;
pub mod devices;
pub mod gemini;
pub mod tools;
pub mod transcript;
