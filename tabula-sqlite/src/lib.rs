mod cbox;
mod connection;
mod driver;
mod extract;
mod prepared;
mod sql_writer;

use libsqlite3_sys::{sqlite3, sqlite3_errmsg};
use std::ffi::{CStr, c_char};

pub(crate) use cbox::*;
pub use connection::*;
pub use driver::*;
pub use prepared::*;
pub use sql_writer::*;

pub(crate) fn error_message_from_ptr(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return "Unknown error (could not extract the error message)".into();
    }
    unsafe { CStr::from_ptr(ptr).to_string_lossy().into_owned() }
}

/// Most recent error reported on `connection`.
pub(crate) fn error_message(connection: *mut sqlite3) -> String {
    if connection.is_null() {
        return "The connection is closed".into();
    }
    error_message_from_ptr(unsafe { sqlite3_errmsg(connection) })
}
