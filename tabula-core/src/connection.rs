use crate::{Executor, Result};
use std::{borrow::Cow, future::Future};

/// An open session with the store.
///
/// Created once at startup through [`Connection::connect`] and passed by mutable
/// reference into every [`Record`](crate::Record) operation. Dropping the
/// connection releases it; [`Connection::disconnect`] does the same while
/// reporting failures.
pub trait Connection: Executor {
    /// Open a connection to the given URL (`{Driver::NAME}://...`).
    fn connect(url: Cow<'static, str>) -> impl Future<Output = Result<Self>> + Send;

    fn disconnect(self) -> impl Future<Output = Result<()>> + Send;
}
