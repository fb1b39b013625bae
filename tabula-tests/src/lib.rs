mod crud;
mod filters;
mod identity;
mod typed;

use crate::{crud::crud, filters::filters, identity::identity, typed::typed};
use log::LevelFilter;
use std::env;
use tabula::{Connection, CrudError, Error, Executor};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub async fn execute_tests<C: Connection>(mut connection: C) {
    crud(&mut connection).await;
    filters(&mut connection).await;
    identity(&mut connection).await;
    typed(&mut connection).await;
    connection
        .disconnect()
        .await
        .expect("Could not disconnect");
}

/// Run a (possibly multi statement) script, failing the test on error.
pub(crate) async fn run_script<E: Executor>(executor: &mut E, sql: &str) {
    let result = executor.execute(sql.into()).await;
    assert!(
        result.is_ok(),
        "Failed to run the script:\n{}\n{:?}",
        sql,
        result.unwrap_err()
    );
}

/// The classification attached to a failed operation.
pub fn crud_error(error: &Error) -> CrudError {
    CrudError::of(error)
        .cloned()
        .unwrap_or_else(|| panic!("Unclassified error: {:#}", error))
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
