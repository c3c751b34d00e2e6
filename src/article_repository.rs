use log::{error, info, warn};
use sqlx::{Connection, MySqlConnection};

use crate::{CRAWLER_LOG, article_scraper::Article, error::RepositoryError};

const INSERT_ARTICLE: &str =
    "INSERT INTO wiki_articles (title, summary, image_url) VALUES (?, ?, ?)";

/// Writes one article atomically.
///
/// A failed insert must leave nothing behind: implementations roll back and
/// report [`RepositoryError::Insert`]. [`RepositoryError::Rollback`] means
/// the store itself is no longer usable.
#[allow(async_fn_in_trait)]
pub trait ArticleStore {
    async fn insert_article(&mut self, article: &Article) -> Result<(), RepositoryError>;
}

pub struct MySqlArticleStore {
    conn: MySqlConnection,
}

impl MySqlArticleStore {
    pub fn new(conn: MySqlConnection) -> Self {
        Self { conn }
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

impl ArticleStore for MySqlArticleStore {
    async fn insert_article(&mut self, article: &Article) -> Result<(), RepositoryError> {
        let mut tx = self.conn.begin().await.map_err(RepositoryError::Insert)?;
        let inserted = sqlx::query(INSERT_ARTICLE)
            .bind(&article.title)
            .bind(&article.summary)
            .bind(article.image_url.as_deref())
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(_) => tx.commit().await.map_err(RepositoryError::Insert),
            Err(e) => {
                tx.rollback().await.map_err(RepositoryError::Rollback)?;
                Err(RepositoryError::Insert(e))
            }
        }
    }
}

pub struct ArticleRepository<S> {
    store: S,
}

impl<S: ArticleStore> ArticleRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// `Ok(true)` once the row is committed, `Ok(false)` when there was
    /// nothing to save or the insert was rolled back. Only a store that can
    /// no longer be used is reported as an error.
    pub async fn save(&mut self, article: Option<&Article>) -> Result<bool, RepositoryError> {
        let Some(article) = article else {
            warn!(target: CRAWLER_LOG, "No article to save");
            return Ok(false);
        };

        match self.store.insert_article(article).await {
            Ok(()) => {
                info!(target: CRAWLER_LOG, "Saved article {:?}", article.title);
                Ok(true)
            }
            Err(RepositoryError::Insert(e)) => {
                error!(
                    target: CRAWLER_LOG,
                    "Could not save article {:?}, rolled back: {e}",
                    article.title
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
