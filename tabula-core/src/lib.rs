mod as_value;
mod column;
mod connection;
mod driver;
mod entity;
mod error;
mod executor;
mod guard;
mod mapping;
mod prepared;
mod query;
mod record;
mod sql_writer;
mod statement;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use column::*;
pub use connection::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use guard::*;
pub use mapping::*;
pub use prepared::*;
pub use query::*;
pub use record::*;
pub use sql_writer::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
