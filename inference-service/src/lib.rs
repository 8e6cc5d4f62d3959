//! Single-model image classification service.
//!
//! Exposes one prediction endpoint accepting either a multipart file upload
//! or a base64 data URI, plus health and metrics endpoints.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
