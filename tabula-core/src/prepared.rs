use crate::{Result, Value};
use std::fmt::Display;

/// A parameterized, backend-prepared query handle.
///
/// # Binding Semantics
/// * `bind` appends a value at the next position.
/// * `bind_index` sets the parameter at `index` (from 1, like SQL placeholders).
///
/// Methods return `&mut Self` for fluent chaining:
/// ```rust,ignore
/// prepared.bind(42)?.bind("hello")?;
/// ```
pub trait Prepared: Send + Sync + Display {
    /// Append a parameter value.
    fn bind(&mut self, value: impl Into<Value>) -> Result<&mut Self>;
    /// Bind a value at a specific index.
    fn bind_index(&mut self, value: impl Into<Value>, index: u64) -> Result<&mut Self>;
}
