pub mod admin;
pub mod auth;
pub mod competition;
pub mod health;
pub mod notification;
pub mod prize;
pub mod profile;
pub mod public;
pub mod user;
