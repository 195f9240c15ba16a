//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DbBackend, EntityTrait, FromQueryResult, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Statement,
};

use blog_core::domain::{Comment, Post, Tag};
use blog_core::error::RepoError;
use blog_core::ports::{CommentRepository, PostRepository, SearchHit, TagRepository};

use super::entity::author::Entity as AuthorEntity;
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{PostgresBaseRepository, query_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Same document expression the search index is built on.
const SEARCH_SQL: &str = r#"
SELECT p.id,
       ts_rank(to_tsvector(coalesce(p.title, '') || ' ' || coalesce(p.body, '')),
               plainto_tsquery($1)) AS rank
FROM posts p
WHERE p.status = 'published'
  AND p.publish <= now()
  AND to_tsvector(coalesce(p.title, '') || ' ' || coalesce(p.body, '')) @@ plainto_tsquery($1)
ORDER BY rank DESC, p.publish DESC
"#;

#[derive(Debug, FromQueryResult)]
struct RankedPost {
    id: i64,
    rank: f32,
}

/// Publicly visible posts.
fn published() -> Condition {
    Condition::all()
        .add(post::Column::Status.eq(post::Status::Published))
        .add(post::Column::Publish.lte(Utc::now()))
}

fn published_query(tag_id: Option<i64>) -> Select<PostEntity> {
    let query = PostEntity::find().filter(published());
    match tag_id {
        Some(tag_id) => query
            .inner_join(PostTagEntity)
            .filter(post_tag::Column::TagId.eq(tag_id)),
        None => query,
    }
}

impl PostgresPostRepository {
    /// Load authors and tags for a batch of post rows, keeping their order.
    async fn hydrate(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let authors = models
            .load_one(AuthorEntity, &self.db)
            .await
            .map_err(query_err)?;
        let tags = models
            .load_many_to_many(TagEntity, PostTagEntity, &self.db)
            .await
            .map_err(query_err)?;

        models
            .into_iter()
            .zip(authors)
            .zip(tags)
            .map(|((model, author), tags)| {
                let author = author
                    .ok_or_else(|| RepoError::Query(format!("post {} has no author", model.id)))?;
                Ok(model.into_domain(author, tags))
            })
            .collect()
    }

    async fn first(&self, query: Select<PostEntity>) -> Result<Option<Post>, RepoError> {
        let Some(model) = query.one(&self.db).await.map_err(query_err)? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![model]).await?.pop())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError> {
        published_query(tag_id)
            .count(&self.db)
            .await
            .map_err(query_err)
    }

    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(?tag_id, offset, limit, "Listing published posts");

        let models = published_query(tag_id)
            .order_by_desc(post::Column::Publish)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        self.hydrate(models).await
    }

    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(%date, slug, "Finding post by date and slug");

        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);

        let models = PostEntity::find()
            .filter(published())
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(start))
            .filter(post::Column::Publish.lt(end))
            .order_by_asc(post::Column::Publish)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        self.hydrate(models).await
    }

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        self.first(
            PostEntity::find()
                .filter(published())
                .filter(post::Column::Id.eq(id)),
        )
        .await
    }

    async fn find_similar(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tag_ids: Vec<i64> = post.tags.iter().map(|t| t.id).collect();
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(post_id = post.id, limit, "Finding similar posts");

        let shared_tags = Expr::col((PostTagEntity, post_tag::Column::TagId)).count();
        let models = PostEntity::find()
            .inner_join(PostTagEntity)
            .filter(published())
            .filter(post::Column::Id.ne(post.id))
            .filter(post_tag::Column::TagId.is_in(tag_ids))
            .group_by(post::Column::Id)
            .order_by_desc(shared_tags)
            .order_by_desc(post::Column::Publish)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        self.hydrate(models).await
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RepoError> {
        tracing::debug!(query, "Searching posts");

        let ranked = RankedPost::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            SEARCH_SQL,
            [query.into()],
        ))
        .all(&self.db)
        .await
        .map_err(query_err)?;

        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = ranked.iter().map(|r| r.id).collect();
        let models = PostEntity::find()
            .filter(post::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(query_err)?;
        let mut posts: HashMap<i64, Post> = self
            .hydrate(models)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(ranked
            .into_iter()
            .filter_map(|r| {
                posts
                    .remove(&r.id)
                    .map(|post| SearchHit { post, rank: r.rank })
            })
            .collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        tracing::debug!(slug, "Finding tag by slug");

        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_active_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
