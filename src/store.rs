use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait, Unchanged, sea_query::Expr,
};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{Movie, NewMovie},
};

/// Durable storage for the movie list.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// All movies, in id order.
    async fn list(&self) -> AppResult<Vec<Movie>>;
    async fn get(&self, id: i32) -> AppResult<Movie>;
    async fn insert(&self, movie: NewMovie) -> AppResult<Movie>;
    /// Writes every field of `movie` except its id.
    async fn update(&self, movie: &Movie) -> AppResult<()>;
    async fn delete(&self, id: i32) -> AppResult<()>;
    /// Persists the rank of each movie in one transaction.
    async fn save_ranks(&self, movies: &[Movie]) -> AppResult<()>;
}

#[derive(Clone)]
pub struct DbMovieStore {
    db: DatabaseConnection,
}

impl DbMovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieStore for DbMovieStore {
    async fn list(&self) -> AppResult<Vec<Movie>> {
        let rows = movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn get(&self, id: i32) -> AppResult<Movie> {
        movie::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Movie::from)
            .ok_or(AppError::NotFound(id))
    }

    async fn insert(&self, new: NewMovie) -> AppResult<Movie> {
        let model = movie::ActiveModel {
            id: NotSet,
            title: Set(new.title.clone()),
            year: Set(new.year),
            description: Set(new.description),
            rating: Set(None),
            ranking: Set(None),
            review: Set(None),
            poster_url: Set(new.poster_url),
        };

        let saved = model.insert(&self.db).await.map_err(|e| write_error(e, &new.title))?;
        tracing::debug!(id = saved.id, title = %saved.title, "movie inserted");
        Ok(saved.into())
    }

    async fn update(&self, m: &Movie) -> AppResult<()> {
        let model = movie::ActiveModel {
            id: Unchanged(m.id),
            title: Set(m.title.clone()),
            year: Set(m.year),
            description: Set(m.description.clone()),
            rating: Set(m.rating),
            ranking: Set(m.rank),
            review: Set(m.review.clone()),
            poster_url: Set(m.poster_url.clone()),
        };

        match model.update(&self.db).await {
            Ok(_) => {
                tracing::debug!(id = m.id, "movie updated");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound(m.id)),
            Err(e) => Err(write_error(e, &m.title)),
        }
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound(id));
        }
        tracing::debug!(id, "movie deleted");
        Ok(())
    }

    async fn save_ranks(&self, movies: &[Movie]) -> AppResult<()> {
        let txn = self.db.begin().await?;

        for m in movies {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(m.rank))
                .filter(movie::Column::Id.eq(m.id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        Ok(())
    }
}

fn write_error(err: DbErr, title: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(title.to_string()),
        _ => AppError::Db(err),
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> DbMovieStore {
    let opts = sea_orm::ConnectOptions::new("sqlite::memory:").max_connections(1).to_owned();
    let db = crate::db::connect_and_migrate(opts).await.unwrap();
    DbMovieStore::new(db)
}

#[cfg(test)]
pub(crate) fn new_movie(title: &str) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        year: 1999,
        description: format!("{title} synopsis"),
        poster_url: format!("https://img.example/{title}.jpg"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_matches_except_id() {
        let store = memory_store().await;
        let new = new_movie("The Matrix");

        let inserted = store.insert(new.clone()).await.unwrap();
        let fetched = store.get(inserted.id).await.unwrap();

        assert_eq!(fetched, inserted);
        assert_eq!(fetched.title, new.title);
        assert_eq!(fetched.year, new.year);
        assert_eq!(fetched.description, new.description);
        assert_eq!(fetched.poster_url, new.poster_url);
        assert_eq!(fetched.rating, None);
        assert_eq!(fetched.review, None);
        assert_eq!(fetched.rank, None);
    }

    #[tokio::test]
    async fn duplicate_title_is_a_conflict() {
        let store = memory_store().await;
        store.insert(new_movie("Heat")).await.unwrap();

        let err = store.insert(new_movie("Heat")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(t) if t == "Heat"));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = memory_store().await;
        assert!(matches!(store.get(42).await, Err(AppError::NotFound(42))));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let store = memory_store().await;
        let m = store.insert(new_movie("Alien")).await.unwrap();

        store.delete(m.id).await.unwrap();

        assert!(matches!(store.get(m.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.delete(m.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_persists_rating_and_review() {
        let store = memory_store().await;
        let mut m = store.insert(new_movie("Arrival")).await.unwrap();

        m.rating = Some(8.5);
        m.review = Some("quiet and huge".to_string());
        store.update(&m).await.unwrap();

        assert_eq!(store.get(m.id).await.unwrap(), m);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = memory_store().await;
        let mut m = store.insert(new_movie("Brazil")).await.unwrap();
        store.delete(m.id).await.unwrap();

        m.rating = Some(1.0);
        assert!(matches!(store.update(&m).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_to_taken_title_is_a_conflict() {
        let store = memory_store().await;
        store.insert(new_movie("Jaws")).await.unwrap();
        let mut m = store.insert(new_movie("Jaws 2")).await.unwrap();

        m.title = "Jaws".to_string();
        assert!(matches!(store.update(&m).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn list_is_in_id_order_and_ranks_persist() {
        let store = memory_store().await;
        let mut a = store.insert(new_movie("A")).await.unwrap();
        let mut b = store.insert(new_movie("B")).await.unwrap();

        a.rank = Some(2);
        b.rank = Some(1);
        store.save_ranks(&[a.clone(), b.clone()]).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![a, b]);
    }
}
