//! This module contains all the models used in the application.
pub mod registry;
pub mod user;
