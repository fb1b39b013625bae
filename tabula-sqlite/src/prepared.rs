use crate::{CBox, error_message};
use libsqlite3_sys::*;
use std::{
    ffi::{CStr, c_int},
    fmt::{self, Display},
    os::raw::{c_char, c_void},
};
use tabula_core::{
    Error, Prepared, Result, Value, format_date, format_time, format_timestamp, truncate_long,
};

pub struct SqlitePrepared {
    pub(crate) statement: CBox<sqlite3_stmt>,
    pub(crate) index: u64,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<sqlite3_stmt>) -> Self {
        unsafe {
            sqlite3_clear_bindings(statement.get());
        }
        Self {
            statement,
            index: 1,
        }
    }

    fn bind_text(&self, index: c_int, value: &str) -> c_int {
        unsafe {
            sqlite3_bind_text(
                self.statement.get(),
                index,
                value.as_ptr() as *const c_char,
                value.len() as c_int,
                SQLITE_TRANSIENT(),
            )
        }
    }

    fn bind_integer(&self, index: c_int, value: i128) -> Result<c_int> {
        let Ok(value) = i64::try_from(value) else {
            return Err(Error::msg(format!(
                "Cannot bind {} into a sqlite integer because it's out of bounds",
                value
            )));
        };
        Ok(unsafe { sqlite3_bind_int64(self.statement.get(), index, value) })
    }

    fn sql(&self) -> String {
        unsafe {
            let sql = sqlite3_sql(self.statement.get());
            if sql.is_null() {
                return String::new();
            }
            CStr::from_ptr(sql).to_string_lossy().into_owned()
        }
    }
}

impl Prepared for SqlitePrepared {
    fn bind(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let index = self.index;
        self.bind_index(value, index)
    }

    fn bind_index(&mut self, value: impl Into<Value>, index: u64) -> Result<&mut Self> {
        let value = value.into();
        let position = index as c_int;
        let statement = self.statement.get();
        let rc = if value.is_null() {
            unsafe { sqlite3_bind_null(statement, position) }
        } else {
            match value {
                Value::Float32(Some(v)) => unsafe {
                    sqlite3_bind_double(statement, position, v as f64)
                },
                Value::Float64(Some(v)) => unsafe { sqlite3_bind_double(statement, position, v) },
                Value::Decimal(Some(ref v)) => self.bind_text(position, &v.to_string()),
                Value::Varchar(Some(ref v)) => self.bind_text(position, v),
                Value::Blob(Some(ref v)) => unsafe {
                    sqlite3_bind_blob(
                        statement,
                        position,
                        v.as_ptr() as *const c_void,
                        v.len() as c_int,
                        SQLITE_TRANSIENT(),
                    )
                },
                Value::Date(Some(ref v)) => self.bind_text(position, &format_date(v)?),
                Value::Time(Some(ref v)) => self.bind_text(position, &format_time(v)?),
                Value::Timestamp(Some(ref v)) => self.bind_text(position, &format_timestamp(v)?),
                Value::Uuid(Some(ref v)) => self.bind_text(position, &v.to_string()),
                ref v => match v.as_integer() {
                    Some(integer) => self.bind_integer(position, integer).inspect_err(|e| {
                        log::error!("{:#}", e);
                    })?,
                    None => {
                        let error =
                            Error::msg(format!("Cannot use a {:?} as a query parameter", v));
                        log::error!("{:#}", error);
                        return Err(error);
                    }
                },
            }
        };
        if rc != SQLITE_OK {
            let error = Error::msg(error_message(unsafe { sqlite3_db_handle(statement) })).context(
                format!(
                    "Cannot bind parameter {} to query:\n{}",
                    index,
                    truncate_long!(self.sql())
                ),
            );
            log::error!("{:#}", error);
            return Err(error);
        }
        self.index = index + 1;
        Ok(self)
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&truncate_long!(self.sql()))
    }
}
