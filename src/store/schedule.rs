use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityName, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm_migration::{
    SchemaManager,
    prelude::{Expr, ForeignKey, ForeignKeyAction, Table},
    schema::{integer, pk_auto, string_len, tiny_integer},
};
use tracing::debug;

use super::page_window;
use crate::{
    entities::{movie, schedule},
    error::StorageResult,
    models::{RecordId, Schedule},
    storage::DataSource,
};

#[derive(Clone, Debug)]
pub struct ScheduleStore {
    db: DatabaseConnection,
}

impl ScheduleStore {
    pub fn new(source: &DataSource) -> Self {
        Self { db: source.connection().clone() }
    }

    /// Requires the movies table; schedules are removed with their movie.
    pub async fn create_table(&self) -> StorageResult<()> {
        SchemaManager::new(&self.db)
            .create_table(
                Table::create()
                    .table(schedule::Entity)
                    .if_not_exists()
                    .col(pk_auto(schedule::Column::Id))
                    .col(integer(schedule::Column::MovieId))
                    .col(string_len(schedule::Column::DateAndTime, 50))
                    .col(tiny_integer(schedule::Column::Auditorium))
                    .check(Expr::cust("length(date_time) <= 50"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_api2_schedules_movie_id")
                            .from(schedule::Entity, schedule::Column::MovieId)
                            .to(movie::Entity, movie::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        debug!(table = schedule::Entity.table_name(), "table created");
        Ok(())
    }

    pub async fn drop_table(&self) -> StorageResult<()> {
        SchemaManager::new(&self.db)
            .drop_table(Table::drop().table(schedule::Entity).if_exists().to_owned())
            .await?;
        debug!(table = schedule::Entity.table_name(), "table dropped");
        Ok(())
    }

    pub async fn count(&self, movie_id: i32) -> StorageResult<u64> {
        let hits = schedule::Entity::find()
            .filter(schedule::Column::MovieId.eq(movie_id))
            .count(&self.db)
            .await?;
        Ok(hits)
    }

    pub async fn exists(&self, id: i32) -> StorageResult<bool> {
        let hits =
            schedule::Entity::find().filter(schedule::Column::Id.eq(id)).count(&self.db).await?;
        Ok(hits != 0)
    }

    pub async fn find(&self, id: i32) -> StorageResult<Option<Schedule>> {
        let row = schedule::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Schedule::from))
    }

    /// Screenings of one movie, latest first.
    pub async fn list(
        &self,
        movie_id: i32,
        page: u64,
        page_size: u64,
    ) -> StorageResult<Vec<Schedule>> {
        let Some((offset, limit)) = page_window(page, page_size) else {
            return Ok(Vec::new());
        };
        let rows = schedule::Entity::find()
            .filter(schedule::Column::MovieId.eq(movie_id))
            .order_by_desc(schedule::Column::DateAndTime)
            .order_by_desc(schedule::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    pub async fn kill(&self, id: i32) -> StorageResult<()> {
        let result = schedule::Entity::delete_by_id(id).exec(&self.db).await?;
        debug!(id, rows = result.rows_affected, "schedule deleted");
        Ok(())
    }

    pub async fn save(&self, schedule: &mut Schedule) -> StorageResult<()> {
        let active = schedule::ActiveModel {
            id: NotSet,
            movie_id: Set(schedule.movie_id),
            date_and_time: Set(schedule.date_and_time.clone()),
            auditorium: Set(schedule.auditorium),
        };

        if schedule.id.is_saved() {
            let result = schedule::Entity::update_many()
                .set(active)
                .filter(schedule::Column::Id.eq(schedule.id.get()))
                .exec(&self.db)
                .await?;
            debug!(id = schedule.id.get(), rows = result.rows_affected, "schedule updated");
        } else {
            let result = schedule::Entity::insert(active).exec(&self.db).await?;
            schedule.id = RecordId::new(result.last_insert_id);
            debug!(id = schedule.id.get(), movie_id = schedule.movie_id, "schedule inserted");
        }

        Ok(())
    }
}
