pub mod account;
pub mod auth;
pub mod questions;
pub mod search;
pub mod tasks;
pub mod users;
