use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel, SqlErr, TryIntoModel,
};

use blog_core::error::RepoError;
use blog_core::ports::BaseRepository;

/// Generic PostgreSQL repository over one SeaORM entity.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

pub(crate) fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Map a write failure, keeping constraint violations distinct.
fn write_err(e: DbErr) -> RepoError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail))
        | Some(SqlErr::ForeignKeyConstraintViolation(detail)) => RepoError::Constraint(detail),
        _ => query_err(e),
    }
}

#[async_trait]
impl<E, T> BaseRepository<T> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + TryIntoModel<E::Model> + Send + Sync,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn save(&self, entity: T) -> Result<T, RepoError> {
        // Unset primary key inserts, a set one updates.
        let active_model: E::ActiveModel = entity.into();
        let saved = active_model.save(&self.db).await.map_err(write_err)?;

        Ok(saved.try_into_model().map_err(query_err)?.into())
    }
}
