use crate::{Connection, Prepared, Result, SqlWriter};
use std::{borrow::Cow, future::Future};

pub trait Driver: Send + Sync {
    type Connection: Connection;
    type SqlWriter: SqlWriter;
    type Prepared: Prepared;

    /// Scheme expected at the start of connection URLs (`{NAME}://`).
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;

    fn connect(
        &self,
        url: Cow<'static, str>,
    ) -> impl Future<Output = Result<Self::Connection>> + Send {
        Self::Connection::connect(url)
    }
}
