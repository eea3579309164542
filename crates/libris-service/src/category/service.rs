//! Category CRUD and search.

use std::sync::Arc;

use tracing::info;

use libris_auth::rbac::{RbacEnforcer, SystemPermission};
use libris_core::error::AppError;
use libris_core::result::AppResult;
use libris_core::types::{CategoryId, PageRequest, PageResponse};
use libris_database::repositories::category::CategoryRepository;
use libris_entity::category::{Category, CategoryWithCount, CreateCategory, UpdateCategory};

use crate::context::RequestContext;

/// Manages categories.
#[derive(Debug, Clone)]
pub struct CategoryService {
    category_repo: Arc<CategoryRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl CategoryService {
    /// Creates a new category service.
    pub fn new(category_repo: Arc<CategoryRepository>, rbac: Arc<RbacEnforcer>) -> Self {
        Self {
            category_repo,
            rbac,
        }
    }

    /// Categories matching `search`, with book counts.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AppResult<PageResponse<CategoryWithCount>> {
        self.category_repo.search(search, &page).await
    }

    /// Fetch one category.
    pub async fn get(&self, id: CategoryId) -> AppResult<Category> {
        self.category_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Create a category.
    pub async fn create(&self, ctx: &RequestContext, data: CreateCategory) -> AppResult<Category> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::CategoryManage)?;
        data.validate()?;

        let category = self.category_repo.create(&data).await?;
        info!(user_id = %ctx.user_id(), category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Update a category.
    pub async fn update(&self, ctx: &RequestContext, data: UpdateCategory) -> AppResult<Category> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::CategoryManage)?;
        data.validate()?;

        self.category_repo
            .update(&data)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Delete a category that has no books.
    pub async fn delete(&self, ctx: &RequestContext, id: CategoryId) -> AppResult<()> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::CategoryManage)?;

        if self.category_repo.count_books(id).await? > 0 {
            return Err(AppError::unprocessable(
                "Cannot delete category with existing books.",
            ));
        }
        if !self.category_repo.delete(id).await? {
            return Err(AppError::not_found("Category not found"));
        }

        info!(user_id = %ctx.user_id(), category_id = %id, "Category deleted");
        Ok(())
    }
}
