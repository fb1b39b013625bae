use crate::{Value, truncate_long};
use std::fmt::{self, Display};

/// SQL text paired with the parameters bound to its placeholders, left to right.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sql: String::with_capacity(capacity),
            params: Vec::new(),
        }
    }

    /// Number of `?` placeholders in the text.
    pub fn placeholders(&self) -> usize {
        self.sql.matches('?').count()
    }

    /// Whether every placeholder has exactly one parameter.
    pub fn is_balanced(&self) -> bool {
        self.placeholders() == self.params.len()
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))?;
        if !self.params.is_empty() {
            f.write_str(" [")?;
            for (i, v) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{v}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
