//! # Altitude Module
//!
//! Conversion of barometric pressure into altitude and detection of takeoff.
//!
//! This module handles:
//! - Pressure-to-altitude conversion via the international barometric formula
//! - Reference ("takeoff") altitude capture from the first sample
//! - One-shot takeoff detection against a fixed altitude delta threshold

pub mod converter;
pub mod detector;
