use crate::{CrudError, Error, Executor, Result};

/// Fails with [`CrudError::ConnectionUnavailable`] unless the connection is open
/// and answers a ping.
pub async fn ensure_live<E: Executor>(executor: &mut E) -> Result<()> {
    if !executor.is_open() {
        log::warn!("The connection is closed");
        return Err(Error::new(CrudError::ConnectionUnavailable));
    }
    if let Err(error) = executor.ping().await {
        log::warn!("The connection did not answer: {:#}", error);
        return Err(error.context(CrudError::ConnectionUnavailable));
    }
    Ok(())
}
