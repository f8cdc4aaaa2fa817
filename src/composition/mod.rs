//! # Animator
//!
//! The [`Animator`] ties frame elements, the transform engine and the frame
//! buffer together into the API animation scripts are written against.

pub mod engine;

pub use engine::Animator;
