//! Catalog service.

use std::collections::HashMap;

use common::DocumentId;
use document_store::DocumentStore;

use super::{
    CatalogError, Category, NewProduct, NewSubCategory, Product, ProductStatus, ProductUpdate,
    ProductView, SubCategory, SubCategoryUpdate, SubCategoryView,
};
use crate::error::{DomainError, UniqueViolationExt};
use crate::repository::Repository;

/// Service for categories, sub-categories and products.
pub struct CatalogService<S: DocumentStore> {
    categories: Repository<S, Category>,
    sub_categories: Repository<S, SubCategory>,
    products: Repository<S, Product>,
}

impl<S: DocumentStore + Clone> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self {
            categories: Repository::new(store.clone()),
            sub_categories: Repository::new(store.clone()),
            products: Repository::new(store),
        }
    }
}

impl<S: DocumentStore> CatalogService<S> {
    async fn category_index(&self) -> Result<HashMap<DocumentId, Category>, DomainError> {
        Ok(self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect())
    }

    async fn ensure_category(&self, id: DocumentId) -> Result<(), DomainError> {
        self.categories.load(id).await.map(|_| ())
    }

    // -- Categories --

    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category, DomainError> {
        let name = super::required("name", name)?;
        self.categories
            .insert(Category::new(name.clone()))
            .await
            .on_unique_violation(|| CatalogError::DuplicateCategory { name })
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_category(&self, id: DocumentId) -> Result<Category, DomainError> {
        self.categories.load(id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_category(&self, id: DocumentId, name: &str) -> Result<Category, DomainError> {
        let name = super::required("name", name)?;
        let conflict_name = name.clone();
        self.categories
            .update(id, |category| {
                category.name = name;
                Ok::<_, CatalogError>(())
            })
            .await
            .on_unique_violation(|| CatalogError::DuplicateCategory {
                name: conflict_name,
            })
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: DocumentId) -> Result<Category, DomainError> {
        self.categories.take(id).await
    }

    // -- Sub-categories --

    #[tracing::instrument(skip(self))]
    pub async fn create_sub_category(
        &self,
        request: NewSubCategory,
    ) -> Result<SubCategory, DomainError> {
        let cat_id = request
            .cat_id
            .ok_or(CatalogError::MissingField { field: "cat_id" })?;
        let name = super::required("name", request.name.as_deref().unwrap_or_default())?;
        self.ensure_category(cat_id).await?;

        self.sub_categories
            .insert(SubCategory::new(cat_id, name.clone()))
            .await
            .on_unique_violation(|| CatalogError::DuplicateSubCategory { name })
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_sub_categories(&self) -> Result<Vec<SubCategoryView>, DomainError> {
        let categories = self.category_index().await?;
        Ok(self
            .sub_categories
            .list()
            .await?
            .into_iter()
            .map(|sub_category| SubCategoryView {
                category: categories.get(&sub_category.cat_id).cloned(),
                sub_category,
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_sub_category(&self, id: DocumentId) -> Result<SubCategoryView, DomainError> {
        let sub_category = self.sub_categories.load(id).await?;
        let category = self.categories.get(sub_category.cat_id).await?;
        Ok(SubCategoryView {
            sub_category,
            category,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_sub_category(
        &self,
        id: DocumentId,
        update: SubCategoryUpdate,
    ) -> Result<SubCategory, DomainError> {
        let name = update
            .name
            .as_deref()
            .map(|n| super::required("name", n))
            .transpose()?;
        if let Some(cat_id) = update.cat_id {
            self.ensure_category(cat_id).await?;
        }

        let conflict_name = name.clone().unwrap_or_default();
        self.sub_categories
            .update(id, |sub_category| {
                if let Some(cat_id) = update.cat_id {
                    sub_category.cat_id = cat_id;
                }
                if let Some(name) = name {
                    sub_category.name = name;
                }
                Ok::<_, CatalogError>(())
            })
            .await
            .on_unique_violation(|| CatalogError::DuplicateSubCategory {
                name: conflict_name,
            })
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_sub_category(&self, id: DocumentId) -> Result<SubCategory, DomainError> {
        self.sub_categories.take(id).await
    }

    // -- Products --

    #[tracing::instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(&self, request: NewProduct) -> Result<Product, DomainError> {
        let product = request.into_product()?;
        if let Some(cat_id) = product.cat_id {
            self.ensure_category(cat_id).await?;
        }
        let product = self.products.insert(product).await?;
        metrics::counter!("products_created_total").increment(1);
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductView>, DomainError> {
        let categories = self.category_index().await?;
        Ok(self
            .products
            .list()
            .await?
            .into_iter()
            .map(|product| ProductView {
                category: product.cat_id.and_then(|id| categories.get(&id).cloned()),
                product,
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: DocumentId) -> Result<ProductView, DomainError> {
        let product = self.products.load(id).await?;
        let category = match product.cat_id {
            Some(cat_id) => self.categories.get(cat_id).await?,
            None => None,
        };
        Ok(ProductView { product, category })
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        id: DocumentId,
        update: ProductUpdate,
    ) -> Result<Product, DomainError> {
        if let Some(cat_id) = update.cat_id {
            self.ensure_category(cat_id).await?;
        }
        self.products
            .update(id, |product| update.apply(product))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_product_status(
        &self,
        id: DocumentId,
        code: i64,
    ) -> Result<Product, DomainError> {
        let status = ProductStatus::try_from(code)?;
        self.products
            .update(id, |product| {
                product.status = status;
                Ok::<_, CatalogError>(())
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: DocumentId) -> Result<Product, DomainError> {
        self.products.take(id).await
    }
}
