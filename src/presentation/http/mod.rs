pub mod account;
pub mod auth;
pub mod error;
pub mod health;
pub mod pages;
pub mod posts;
