//! HTTP handlers

pub mod admin_handlers;
pub mod health_handlers;
pub mod line_handlers;
pub mod precalculation_handlers;
pub mod substation_handlers;
