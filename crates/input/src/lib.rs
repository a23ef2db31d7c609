//! Input mapping: raw pointer and key state turned into view actions.
//!
//! # Invariants
//! - Actions only move the camera or toggle UI; none touch the particle field.
//! - The mapping has no windowing dependency, so it is testable headless.

pub mod action;
pub mod pointer;

pub use action::Action;
pub use pointer::{DragButton, PointerTracker};
