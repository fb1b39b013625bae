use crate::{
    AsValue, ColumnMapping, Context, CrudError, Driver, Entity, Error, Executor, Result,
    RowLabeled, RowsAffected, SqlWriter, Statement, ensure_live, stream::TryStreamExt,
};
use std::{pin::pin, sync::OnceLock};

/// Lifecycle of a [`Record`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Just constructed, the entity may carry an unset identity.
    #[default]
    Unbound,
    /// The entity reflects a stored row.
    Bound,
    /// The row was deleted, every further operation fails.
    Deleted,
}

/// CRUD handle around one entity value.
///
/// The handle owns the entity and keeps it consistent with the store: after a
/// successful `select`, `select_where`, `save` or `update` the held value is the
/// store's view of the row (identity included). A failing operation leaves the held
/// value untouched.
///
/// Each operation borrows the connection for its duration and checks that it is
/// live before sending anything.
///
/// # Concurrency
/// A record must not be used by concurrent operations without external
/// synchronization. Two records updating the same identity race at the store and
/// the last statement wins: callers that mutate concurrently must serialize access
/// per identity.
///
/// ```rust,ignore
/// let mut record = Record::new(User { id: 0, name: "Ann".into(), age: 30 });
/// record.save(&mut connection).await?;
/// assert!(record.identity() > 0);
/// ```
#[derive(Debug)]
pub struct Record<E: Entity> {
    entity: E,
    state: RecordState,
    table: OnceLock<String>,
}

impl<E: Entity> Record<E> {
    pub fn new(entity: E) -> Self {
        Self {
            entity,
            state: RecordState::Unbound,
            table: OnceLock::new(),
        }
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn identity(&self) -> i64 {
        self.entity.identity()
    }

    /// Re-stamp the held entity with `identity`, without touching the store.
    pub fn set_identity(&mut self, identity: i64) {
        self.entity = self.entity.with_identity(identity);
    }

    pub fn table(&self) -> &str {
        self.table.get_or_init(E::table_name)
    }

    /// Load the row with the given identity.
    pub async fn select<X: Executor>(&mut self, executor: &mut X, id: i64) -> Result<()> {
        self.ensure_not_deleted()?;
        ensure_live(executor).await?;
        let mut statement = Statement::with_capacity(64);
        executor
            .driver()
            .sql_writer()
            .write_select_by_id(&mut statement, self.table(), id);
        let row = self
            .fetch_first(executor, statement)
            .await
            .context(self.execution_error())?;
        let Some(row) = row else {
            return Err(Error::new(self.not_found(format!("{{id: {id}}}"))));
        };
        self.materialize(row)
    }

    /// Load the first row whose columns equal every entry of `filter`.
    pub async fn select_where<X: Executor>(
        &mut self,
        executor: &mut X,
        filter: &ColumnMapping,
    ) -> Result<()> {
        self.ensure_not_deleted()?;
        ensure_live(executor).await?;
        let mut statement = Statement::with_capacity(128);
        executor
            .driver()
            .sql_writer()
            .write_select_where(&mut statement, self.table(), filter)?;
        let row = self
            .fetch_first(executor, statement)
            .await
            .context(self.execution_error())?;
        let Some(row) = row else {
            return Err(Error::new(self.not_found(filter.to_string())));
        };
        self.materialize(row)
    }

    /// Whether a row matches `filter`.
    ///
    /// Lossy: a closed connection, a failing query or an empty filter are logged
    /// and reported as `false`. Use [`Record::try_exists`] to tell them apart.
    pub async fn exists<X: Executor>(&self, executor: &mut X, filter: &ColumnMapping) -> bool {
        match self.try_exists(executor, filter).await {
            Ok(exists) => exists,
            Err(error) => {
                log::warn!(
                    "Reporting {} as absent from `{}`: {:#}",
                    filter,
                    self.table(),
                    error
                );
                false
            }
        }
    }

    pub async fn try_exists<X: Executor>(
        &self,
        executor: &mut X,
        filter: &ColumnMapping,
    ) -> Result<bool> {
        self.ensure_not_deleted()?;
        ensure_live(executor).await?;
        let mut statement = Statement::with_capacity(128);
        executor
            .driver()
            .sql_writer()
            .write_count_where(&mut statement, self.table(), filter)?;
        let row = self
            .fetch_first(executor, statement)
            .await
            .context(self.execution_error())?;
        let count = match row.and_then(|row| row.values.into_vec().into_iter().next()) {
            Some(value) => i64::try_from_value(value).context(self.execution_error())?,
            None => 0,
        };
        Ok(count > 0)
    }

    /// Insert the held entity and adopt the identity assigned by the store.
    pub async fn save<X: Executor>(&mut self, executor: &mut X) -> Result<()> {
        self.ensure_not_deleted()?;
        ensure_live(executor).await?;
        let mapping = self.entity.to_mapping().without_identity();
        let mut statement = Statement::with_capacity(128);
        executor
            .driver()
            .sql_writer()
            .write_insert(&mut statement, self.table(), &mapping)?;
        let result = self
            .run_statement(executor, statement)
            .await
            .context(self.execution_error())?;
        let Some(identity) = result.last_affected_id else {
            let error = Error::msg("The store did not report the identity of the inserted row")
                .context(self.execution_error());
            log::error!("{:#}", error);
            return Err(error);
        };
        self.entity = self.entity.with_identity(identity);
        self.state = RecordState::Bound;
        Ok(())
    }

    /// Overwrite the stored row with the values of `entity`.
    ///
    /// The targeted row is always the one of the held identity, whatever identity
    /// `entity` carries. On success the held entity becomes `entity` stamped with
    /// that identity.
    pub async fn update<X: Executor>(&mut self, executor: &mut X, entity: E) -> Result<()> {
        self.ensure_not_deleted()?;
        ensure_live(executor).await?;
        let identity = self.stored_identity()?;
        let mapping = entity.to_mapping().without_identity();
        let mut statement = Statement::with_capacity(128);
        executor.driver().sql_writer().write_update_by_id(
            &mut statement,
            self.table(),
            &mapping,
            identity,
        )?;
        let result = self
            .run_statement(executor, statement)
            .await
            .context(self.execution_error())?;
        if result.rows_affected == 0 {
            return Err(Error::new(self.not_found(format!("{{id: {identity}}}"))));
        }
        self.entity = entity.with_identity(identity);
        self.state = RecordState::Bound;
        Ok(())
    }

    /// Delete the stored row. The record is unusable afterwards.
    pub async fn delete<X: Executor>(&mut self, executor: &mut X) -> Result<()> {
        self.ensure_not_deleted()?;
        ensure_live(executor).await?;
        let identity = self.stored_identity()?;
        let mut statement = Statement::with_capacity(64);
        executor
            .driver()
            .sql_writer()
            .write_delete_by_id(&mut statement, self.table(), identity);
        let result = self
            .run_statement(executor, statement)
            .await
            .context(self.execution_error())?;
        if result.rows_affected == 0 {
            let error = self.not_found(format!("{{id: {identity}}}"));
            log::info!("The delete did not remove anything: {}", error);
            return Err(Error::new(error));
        }
        if result.rows_affected > 1 {
            log::warn!(
                "Deleting id {} removed {} rows from `{}`",
                identity,
                result.rows_affected,
                self.table()
            );
        }
        self.state = RecordState::Deleted;
        Ok(())
    }

    fn ensure_not_deleted(&self) -> Result<()> {
        if self.state == RecordState::Deleted {
            return Err(Error::new(CrudError::Deleted {
                table: self.table().into(),
            }));
        }
        Ok(())
    }

    /// Negative identities never refer to a stored row.
    fn stored_identity(&self) -> Result<i64> {
        let identity = self.identity();
        if identity < 0 {
            return Err(Error::new(CrudError::malformed(format!(
                "identity {} does not refer to a row of `{}`",
                identity,
                self.table()
            ))));
        }
        Ok(identity)
    }

    fn materialize(&mut self, row: RowLabeled) -> Result<()> {
        let entity = match E::from_row(row) {
            Ok(entity) => entity,
            Err(error) => {
                let error = error.context(CrudError::Mapping {
                    table: self.table().into(),
                });
                log::error!("{:#}", error);
                return Err(error);
            }
        };
        self.entity = entity;
        self.state = RecordState::Bound;
        Ok(())
    }

    fn not_found(&self, filter: String) -> CrudError {
        CrudError::NotFound {
            table: self.table().into(),
            filter,
        }
    }

    fn execution_error(&self) -> CrudError {
        CrudError::Execution {
            table: self.table().into(),
        }
    }

    async fn fetch_first<X: Executor>(
        &self,
        executor: &mut X,
        statement: Statement,
    ) -> Result<Option<RowLabeled>> {
        log::debug!("{}", statement);
        let query = executor.prepare_statement(statement).await?;
        let mut stream = pin!(executor.fetch(query));
        stream.try_next().await
    }

    async fn run_statement<X: Executor>(
        &self,
        executor: &mut X,
        statement: Statement,
    ) -> Result<RowsAffected> {
        log::debug!("{}", statement);
        let query = executor.prepare_statement(statement).await?;
        executor.execute(query).await
    }
}
