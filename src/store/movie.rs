use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityName, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm_migration::{
    SchemaManager,
    prelude::{Expr, Table},
    schema::{pk_auto, small_integer, string_len},
};
use tracing::debug;

use super::page_window;
use crate::{
    entities::movie,
    error::StorageResult,
    models::{Movie, RecordId},
    storage::DataSource,
};

#[derive(Clone, Debug)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(source: &DataSource) -> Self {
        Self { db: source.connection().clone() }
    }

    pub async fn create_table(&self) -> StorageResult<()> {
        SchemaManager::new(&self.db)
            .create_table(
                Table::create()
                    .table(movie::Entity)
                    .if_not_exists()
                    .col(pk_auto(movie::Column::Id))
                    .col(string_len(movie::Column::Title, 300))
                    .col(small_integer(movie::Column::Duration))
                    .col(small_integer(movie::Column::Year))
                    .check(Expr::cust("length(title) <= 300"))
                    .to_owned(),
            )
            .await?;
        debug!(table = movie::Entity.table_name(), "table created");
        Ok(())
    }

    pub async fn drop_table(&self) -> StorageResult<()> {
        SchemaManager::new(&self.db)
            .drop_table(Table::drop().table(movie::Entity).if_exists().to_owned())
            .await?;
        debug!(table = movie::Entity.table_name(), "table dropped");
        Ok(())
    }

    pub async fn count(&self) -> StorageResult<u64> {
        Ok(movie::Entity::find().count(&self.db).await?)
    }

    pub async fn exists(&self, id: i32) -> StorageResult<bool> {
        let hits = movie::Entity::find().filter(movie::Column::Id.eq(id)).count(&self.db).await?;
        Ok(hits != 0)
    }

    pub async fn find(&self, id: i32) -> StorageResult<Option<Movie>> {
        let row = movie::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Movie::from))
    }

    /// Newest release years first.
    pub async fn list(&self, page: u64, page_size: u64) -> StorageResult<Vec<Movie>> {
        let Some((offset, limit)) = page_window(page, page_size) else {
            return Ok(Vec::new());
        };
        let rows = movie::Entity::find()
            .order_by_desc(movie::Column::Year)
            .order_by_desc(movie::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn kill(&self, id: i32) -> StorageResult<()> {
        let result = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        debug!(id, rows = result.rows_affected, "movie deleted");
        Ok(())
    }

    /// Inserts an unsaved movie and stores the assigned key back into it,
    /// or replaces every column of an already saved one.
    pub async fn save(&self, movie: &mut Movie) -> StorageResult<()> {
        let active = movie::ActiveModel {
            id: NotSet,
            title: Set(movie.title.clone()),
            duration: Set(movie.duration),
            year: Set(movie.year),
        };

        if movie.id.is_saved() {
            let result = movie::Entity::update_many()
                .set(active)
                .filter(movie::Column::Id.eq(movie.id.get()))
                .exec(&self.db)
                .await?;
            debug!(id = movie.id.get(), rows = result.rows_affected, "movie updated");
        } else {
            let result = movie::Entity::insert(active).exec(&self.db).await?;
            movie.id = RecordId::new(result.last_insert_id);
            debug!(id = movie.id.get(), "movie inserted");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support;

    #[tokio::test]
    async fn save_assigns_distinct_positive_ids() {
        let t = test_support::installed().await;
        let store = MovieStore::new(&t.source);

        let mut first = Movie::new("Stalker", 161, 1979);
        let mut second = Movie::new("Mirror", 107, 1975);
        store.save(&mut first).await.unwrap();
        store.save(&mut second).await.unwrap();

        assert!(first.id.get() > 0);
        assert!(second.id.get() > 0);
        assert_ne!(first.id, second.id);

        let found = store.find(first.id.get()).await.unwrap().unwrap();
        assert_eq!(found, first);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn save_on_persisted_movie_updates_in_place() {
        let t = test_support::installed().await;
        let store = MovieStore::new(&t.source);

        let mut movie = Movie::new("Solaris", 160, 1971);
        store.save(&mut movie).await.unwrap();
        let id = movie.id;

        movie.duration = 167;
        movie.year = 1972;
        store.save(&mut movie).await.unwrap();

        assert_eq!(movie.id, id);
        let found = store.find(id.get()).await.unwrap().unwrap();
        assert_eq!(found.duration, 167);
        assert_eq!(found.year, 1972);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn kill_removes_only_existing_rows() {
        let t = test_support::installed().await;
        let store = MovieStore::new(&t.source);

        let mut movie = Movie::new("Ivan's Childhood", 95, 1962);
        store.save(&mut movie).await.unwrap();
        let id = movie.id.get();
        assert!(store.exists(id).await.unwrap());

        store.kill(id + 100).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        store.kill(id).await.unwrap();
        assert!(!store.exists(id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.find(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_pages_by_year_descending() {
        let t = test_support::installed().await;
        let store = MovieStore::new(&t.source);

        for year in [2001, 2010, 2005] {
            store.save(&mut Movie::new(format!("Film {year}"), 100, year)).await.unwrap();
        }

        let years = |movies: Vec<Movie>| movies.into_iter().map(|m| m.year).collect::<Vec<_>>();
        assert_eq!(years(store.list(1, 2).await.unwrap()), vec![2010, 2005]);
        assert_eq!(years(store.list(2, 2).await.unwrap()), vec![2001]);
        assert!(store.list(3, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn page_zero_reads_as_first_page() {
        let t = test_support::installed().await;
        let store = MovieStore::new(&t.source);

        for year in [1999, 2003] {
            store.save(&mut Movie::new(format!("Film {year}"), 100, year)).await.unwrap();
        }

        assert_eq!(store.list(0, 1).await.unwrap(), store.list(1, 1).await.unwrap());
        assert_eq!(store.list(0, 1).await.unwrap()[0].year, 2003);
    }

    #[tokio::test]
    async fn huge_pages_and_sizes_do_not_fail() {
        let t = test_support::installed().await;
        let store = MovieStore::new(&t.source);

        for year in [2001, 2010, 2005] {
            store.save(&mut Movie::new(format!("Film {year}"), 100, year)).await.unwrap();
        }

        assert!(store.list(u64::MAX, 10).await.unwrap().is_empty());
        assert!(store.list(i64::MAX as u64, 10).await.unwrap().is_empty());
        assert!(store.list(922_337_203_685_477_582, 10).await.unwrap().is_empty());
        assert_eq!(store.list(1, u64::MAX).await.unwrap().len(), 3);
        assert!(store.list(2, u64::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn title_longer_than_column_is_rejected() {
        let t = test_support::installed().await;
        let store = MovieStore::new(&t.source);

        let mut fits = Movie::new("x".repeat(300), 1, 2000);
        store.save(&mut fits).await.unwrap();

        let err = store.save(&mut Movie::new("x".repeat(301), 1, 2000)).await.unwrap_err();
        assert!(matches!(err, crate::error::StorageError::Query(_)));

        fits.title = "y".repeat(1000);
        let err = store.save(&mut fits).await.unwrap_err();
        assert!(matches!(err, crate::error::StorageError::Query(_)));
        assert_eq!(store.find(fits.id.get()).await.unwrap().unwrap().title, "x".repeat(300));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn table_can_be_recreated() {
        let t = test_support::connected().await;
        let store = MovieStore::new(&t.source);

        store.create_table().await.unwrap();
        store.create_table().await.unwrap();
        store.drop_table().await.unwrap();
        store.drop_table().await.unwrap();
        store.create_table().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn queries_fail_without_table() {
        let t = test_support::connected().await;
        let store = MovieStore::new(&t.source);

        let err = store.count().await.unwrap_err();
        assert!(matches!(err, crate::error::StorageError::Query(_)));
    }
}
