//! Row models and DTOs.

pub mod answer;
pub mod export_job;
pub mod question;
pub mod status;
pub mod user;
