//! Declarative value shapes
//!
//! Every boundary that accepts untrusted JSON (workflow triggers, step
//! outputs, tool inputs, third-party payloads) describes what it expects as a
//! [`Shape`] and checks values with [`validate`]. The same shape is rendered
//! as JSON Schema when a tool is advertised to the model.

mod shape;
mod validate;

#[cfg(test)]
mod proptests;

pub use shape::{Field, Shape};
pub use validate::{validate, ValidationError};
