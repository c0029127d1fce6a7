//! Applytrack Server Library
//!
//! This module exposes the server components for testing purposes.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
