//! Subsidy Engine library crate.
//!
//! This crate estimates renovation subsidies for a household planning
//! roofing or insulation work: it classifies the household into an
//! income bracket, prices the work, computes the primary grant, the
//! energy-certificate credit and the reduced-VAT saving, applies the
//! statutory caps and returns a cost-coverage breakdown with advisory
//! messages.  External applications may call [`engine::run_estimate`]
//! directly or embed the API via [`api::build_router`].

pub mod advice;
pub mod aid;
pub mod api;
pub mod bracket;
pub mod capping;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod models;
pub mod pricing;
pub mod rates;
pub mod telemetry;
