#![warn(missing_docs)]
//! Animated hexagon-wave backdrop for the VODeco dashboard.
//!
//! A hexagonal tiling covers the window; every vertex is sampled from a
//! time-varying wave field that displaces it and sets its opacity. Frames are
//! throttled, and the animation suspends itself for reduced motion, hidden
//! windows, low battery and weak devices.

pub mod backdrop;
pub mod engine;
pub mod environment;
pub mod math;
pub mod pages;
