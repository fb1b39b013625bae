use crate::{
    CBox, SqliteDriver, SqlitePrepared, error_message,
    extract::{extract_name, extract_value},
};
use async_stream::try_stream;
use libsqlite3_sys::{
    SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_FULLMUTEX, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_busy_timeout, sqlite3_changes64,
    sqlite3_column_count, sqlite3_db_handle, sqlite3_finalize,
    sqlite3_last_insert_rowid, sqlite3_open_v2, sqlite3_prepare_v2, sqlite3_set_last_insert_rowid,
    sqlite3_step, sqlite3_stmt, sqlite3_total_changes64,
};
use std::{
    borrow::Cow,
    ffi::{CString, c_char, c_int},
    future::Future,
    pin::pin,
    ptr,
    sync::atomic::{AtomicPtr, Ordering},
};
use tabula_core::{
    Connection, Context, Driver, Error, Executor, Query, QueryResult, Result, Row, RowLabeled,
    RowNames, RowsAffected,
    future::Either,
    stream::{Stream, StreamExt, TryStreamExt},
    truncate_long,
};
use tokio::task::spawn_blocking;

// The prebuilt `libsqlite3-sys` bindings omit `sqlite3_close_v2`; the bundled library exports it.
unsafe extern "C" {
    fn sqlite3_close_v2(db: *mut sqlite3) -> c_int;
}

/// Milliseconds a statement waits on a locked database before failing with `SQLITE_BUSY`.
pub const BUSY_TIMEOUT_MS: c_int = 5_000;

pub struct SqliteConnection {
    pub(crate) connection: CBox<sqlite3>,
}

impl SqliteConnection {
    /// Release the handle. Every later operation reports the connection as unavailable.
    pub fn close(&mut self) -> Result<()> {
        if self.connection.is_null() {
            return Ok(());
        }
        let rc = unsafe { sqlite3_close_v2(self.connection.take()) };
        if rc != SQLITE_OK {
            let error = Error::msg(format!("sqlite3_close_v2 returned {}", rc))
                .context("Could not close the connection");
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }
}

fn close(connection: *mut sqlite3) {
    unsafe {
        sqlite3_close_v2(connection);
    }
}

fn finalize(statement: *mut sqlite3_stmt) {
    unsafe {
        sqlite3_finalize(statement);
    }
}

/// Compile the first statement of `sql`, returning it along with the number of bytes consumed.
/// The statement is null when `sql` holds only whitespace or comments.
fn prepare_first(connection: *mut sqlite3, sql: &str) -> Result<(CBox<sqlite3_stmt>, usize)> {
    if connection.is_null() {
        return Err(Error::msg("The connection is closed"));
    }
    let mut statement = CBox::new(ptr::null_mut(), finalize);
    let mut tail: *const c_char = ptr::null();
    let rc = unsafe {
        sqlite3_prepare_v2(
            connection,
            sql.as_ptr() as *const c_char,
            sql.len() as c_int,
            statement.as_out(),
            &mut tail,
        )
    };
    if rc != SQLITE_OK {
        let error = Error::msg(error_message(connection)).context(format!(
            "While preparing the query:\n{}",
            truncate_long!(sql)
        ));
        log::error!("{:#}", error);
        return Err(error);
    }
    let consumed = if tail.is_null() {
        sql.len()
    } else {
        (tail as usize).saturating_sub(sql.as_ptr() as usize)
    };
    Ok((statement, consumed))
}

/// Reset the last inserted rowid and return the total changes so far, taken before the first step.
fn changes_baseline(statement: &CBox<sqlite3_stmt>) -> i64 {
    unsafe {
        let connection = sqlite3_db_handle(statement.get());
        sqlite3_set_last_insert_rowid(connection, 0);
        sqlite3_total_changes64(connection)
    }
}

/// The identity is reported only when the statement inserted a row with a rowid.
fn rows_affected(statement: &CBox<sqlite3_stmt>, baseline: i64) -> RowsAffected {
    unsafe {
        let connection = sqlite3_db_handle(statement.get());
        if sqlite3_total_changes64(connection) == baseline {
            return RowsAffected::default();
        }
        let rows_affected = sqlite3_changes64(connection).max(0) as u64;
        let rowid = sqlite3_last_insert_rowid(connection);
        RowsAffected {
            rows_affected,
            last_affected_id: (rows_affected > 0 && rowid != 0).then_some(rowid),
        }
    }
}

fn step_error(statement: &CBox<sqlite3_stmt>, rc: c_int) -> Error {
    let message = error_message(unsafe { sqlite3_db_handle(statement.get()) });
    let error = Error::msg(message).context(format!("Step returned {}", rc));
    log::error!("{:#}", error);
    error
}

/// Rows of a statement, or one `Affected` item when it produces no columns.
fn run_statement(statement: CBox<sqlite3_stmt>) -> impl Stream<Item = Result<QueryResult>> + Send {
    try_stream! {
        let count = unsafe { sqlite3_column_count(statement.get()) };
        let labels = (0..count)
            .map(|i| extract_name(&statement, i))
            .collect::<Result<RowNames>>()?;
        let baseline = changes_baseline(&statement);
        loop {
            let rc = unsafe { sqlite3_step(statement.get()) };
            match rc {
                SQLITE_ROW => {
                    let values = (0..count)
                        .map(|i| extract_value(&statement, i))
                        .collect::<Result<Row>>()?;
                    yield QueryResult::Row(RowLabeled::new(labels.clone(), values));
                }
                SQLITE_DONE => {
                    if count == 0 {
                        let affected = rows_affected(&statement, baseline);
                        yield QueryResult::Affected(affected);
                    }
                    break;
                }
                _ => {
                    Err::<(), _>(step_error(&statement, rc))?;
                }
            }
        }
    }
}

/// Every statement of `sql`, one after the other.
fn run_script(
    connection: AtomicPtr<sqlite3>,
    sql: String,
) -> impl Stream<Item = Result<QueryResult>> + Send {
    try_stream! {
        let mut offset = 0;
        while offset < sql.len() {
            let (statement, consumed) = prepare_first(
                connection.load(Ordering::Relaxed),
                sql.get(offset..).unwrap_or_default(),
            )?;
            if consumed == 0 {
                break;
            }
            offset += consumed;
            if statement.is_null() {
                continue;
            }
            let mut stream = pin!(run_statement(statement));
            while let Some(value) = stream.next().await {
                yield value?;
            }
        }
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &SqliteDriver {
        &SqliteDriver {}
    }

    fn is_open(&self) -> bool {
        !self.connection.is_null()
    }

    fn ping(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            if !self.is_open() {
                return Err(Error::msg("The connection is closed"));
            }
            self.fetch(Query::Raw("SELECT 1".into()))
                .try_collect::<Vec<_>>()
                .await
                .context("The connection did not answer `SELECT 1`")?;
            Ok(())
        }
    }

    fn prepare(
        &mut self,
        query: String,
    ) -> impl Future<Output = Result<Query<SqliteDriver>>> + Send {
        let connection = AtomicPtr::new(self.connection.get());
        async move {
            let statement = spawn_blocking(move || {
                let (statement, consumed) =
                    prepare_first(connection.load(Ordering::Relaxed), &query)?;
                let context = || format!("While preparing the query:\n{}", truncate_long!(query));
                if !query.get(consumed..).unwrap_or_default().trim().is_empty() {
                    let error = Error::msg("Cannot prepare more than one statement at a time")
                        .context(context());
                    log::error!("{:#}", error);
                    return Err(error);
                }
                if statement.is_null() {
                    let error = Error::msg("The query is empty").context(context());
                    log::error!("{:#}", error);
                    return Err(error);
                }
                Ok(statement)
            })
            .await??;
            Ok(Query::Prepared(SqlitePrepared::new(statement)))
        }
    }

    fn run(
        &mut self,
        query: Query<SqliteDriver>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        match query {
            Query::Raw(sql) => Either::Left(run_script(
                AtomicPtr::new(self.connection.get()),
                sql,
            )),
            Query::Prepared(prepared) => Either::Right(run_statement(prepared.statement)),
        }
    }
}

impl Connection for SqliteConnection {
    fn connect(url: Cow<'static, str>) -> impl Future<Output = Result<Self>> + Send {
        async move {
            let prefix = format!("{}://", SqliteDriver::NAME);
            let Some(location) = url.strip_prefix(&prefix) else {
                let error = Error::msg(format!(
                    "Expected sqlite connection url to start with `{}`",
                    prefix
                ));
                log::error!("{:#}", error);
                return Err(error);
            };
            let filename = CString::new(format!("file:{}", location))
                .with_context(|| format!("Error while decoding connection URL: `{}`", url))?;
            let mut connection = CBox::new(ptr::null_mut(), close);
            let rc = unsafe {
                sqlite3_open_v2(
                    filename.as_ptr(),
                    connection.as_out(),
                    SQLITE_OPEN_URI
                        | SQLITE_OPEN_READWRITE
                        | SQLITE_OPEN_CREATE
                        | SQLITE_OPEN_FULLMUTEX,
                    ptr::null(),
                )
            };
            if rc != SQLITE_OK {
                let error = Error::msg(error_message(connection.get()))
                    .context(format!("Could not open the database `{}`", url));
                log::error!("{:#}", error);
                return Err(error);
            }
            unsafe {
                sqlite3_busy_timeout(connection.get(), BUSY_TIMEOUT_MS);
            }
            Ok(Self { connection })
        }
    }

    fn disconnect(mut self) -> impl Future<Output = Result<()>> + Send {
        async move { self.close() }
    }
}
