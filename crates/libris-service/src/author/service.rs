//! Author CRUD and search.

use std::sync::Arc;

use tracing::info;

use libris_auth::rbac::{RbacEnforcer, SystemPermission};
use libris_core::error::AppError;
use libris_core::result::AppResult;
use libris_core::types::{AuthorId, PageRequest, PageResponse};
use libris_database::repositories::author::AuthorRepository;
use libris_entity::author::{Author, AuthorWithCount, CreateAuthor, UpdateAuthor};

use crate::context::RequestContext;

/// Manages authors.
#[derive(Debug, Clone)]
pub struct AuthorService {
    author_repo: Arc<AuthorRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl AuthorService {
    /// Creates a new author service.
    pub fn new(author_repo: Arc<AuthorRepository>, rbac: Arc<RbacEnforcer>) -> Self {
        Self { author_repo, rbac }
    }

    /// Authors matching `search`, alphabetically.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AppResult<PageResponse<AuthorWithCount>> {
        self.author_repo.search(search, &page).await
    }

    /// Fetch one author.
    pub async fn get(&self, id: AuthorId) -> AppResult<Author> {
        self.author_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Author not found"))
    }

    /// Create an author.
    pub async fn create(&self, ctx: &RequestContext, data: CreateAuthor) -> AppResult<Author> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::AuthorManage)?;
        data.validate()?;

        let author = self.author_repo.create(&data).await?;
        info!(user_id = %ctx.user_id(), author_id = %author.id, "Author created");
        Ok(author)
    }

    /// Update an author.
    pub async fn update(&self, ctx: &RequestContext, data: UpdateAuthor) -> AppResult<Author> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::AuthorManage)?;
        data.validate()?;

        self.author_repo
            .update(&data)
            .await?
            .ok_or_else(|| AppError::not_found("Author not found"))
    }

    /// Delete an author who has no books.
    pub async fn delete(&self, ctx: &RequestContext, id: AuthorId) -> AppResult<()> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::AuthorManage)?;

        if self.author_repo.count_books(id).await? > 0 {
            return Err(AppError::unprocessable(
                "Cannot delete author with existing books.",
            ));
        }
        if !self.author_repo.delete(id).await? {
            return Err(AppError::not_found("Author not found"));
        }

        info!(user_id = %ctx.user_id(), author_id = %id, "Author deleted");
        Ok(())
    }
}
