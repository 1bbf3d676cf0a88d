use common::DocumentId;
use document_store::Version;
use serde::{Deserialize, Serialize};

use super::{CatalogError, Category};
use crate::document::Document;
use crate::order::Money;

/// Stock status of a product, stored as 1 (in stock) or 2 (out of stock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ProductStatus {
    #[default]
    InStock,
    OutOfStock,
}

impl ProductStatus {
    pub fn code(&self) -> i64 {
        match self {
            ProductStatus::InStock => 1,
            ProductStatus::OutOfStock => 2,
        }
    }
}

impl TryFrom<i64> for ProductStatus {
    type Error = CatalogError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ProductStatus::InStock),
            2 => Ok(ProductStatus::OutOfStock),
            _ => Err(CatalogError::InvalidStatus { code }),
        }
    }
}

impl From<ProductStatus> for i64 {
    fn from(status: ProductStatus) -> Self {
        status.code()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: DocumentId,
    #[serde(default)]
    pub version: Version,
    pub name: String,
    #[serde(default)]
    pub cat_id: Option<DocumentId>,
    pub desc: String,
    /// Image URLs; the first one is used as the cart thumbnail.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub video: Option<String>,
    pub cost: Money,
    /// Units in stock.
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub status: ProductStatus,
    pub price: Money,
    /// Hex color codes.
    #[serde(default)]
    pub colors: Vec<String>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.status == ProductStatus::InStock
    }
}

impl Document for Product {
    fn collection() -> &'static str {
        "products"
    }

    fn id(&self) -> DocumentId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

/// Request to create a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub cat_id: Option<DocumentId>,
    pub desc: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub video: Option<String>,
    pub cost: Money,
    pub price: Money,
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl NewProduct {
    /// Validates the request and builds the product.
    pub fn into_product(self) -> Result<Product, CatalogError> {
        let name = super::required("name", &self.name)?;
        let desc = super::required("desc", &self.desc)?;
        let cost = super::not_negative("cost", self.cost)?;
        let price = super::not_negative("price", self.price)?;
        if self.qty < 0 {
            return Err(CatalogError::NegativeStock { qty: self.qty });
        }
        if self.images.is_empty() {
            return Err(CatalogError::NoImages);
        }

        Ok(Product {
            id: DocumentId::new(),
            version: Version::initial(),
            name,
            cat_id: self.cat_id,
            desc,
            images: self.images,
            video: self.video,
            cost,
            qty: self.qty,
            status: ProductStatus::InStock,
            price,
            colors: self.colors,
        })
    }
}

/// Partial product update.
///
/// `deleted_images` are dropped from the current images before `images`
/// are appended.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub cat_id: Option<DocumentId>,
    pub desc: Option<String>,
    pub video: Option<String>,
    pub cost: Option<Money>,
    pub price: Option<Money>,
    pub qty: Option<i64>,
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub deleted_images: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductUpdate {
    /// Applies the update to `product`, leaving it untouched on error.
    pub fn apply(self, product: &mut Product) -> Result<(), CatalogError> {
        let name = self
            .name
            .as_deref()
            .map(|n| super::required("name", n))
            .transpose()?;
        let desc = self
            .desc
            .as_deref()
            .map(|d| super::required("desc", d))
            .transpose()?;
        let cost = self
            .cost
            .map(|c| super::not_negative("cost", c))
            .transpose()?;
        let price = self
            .price
            .map(|p| super::not_negative("price", p))
            .transpose()?;
        if let Some(qty) = self.qty.filter(|q| *q < 0) {
            return Err(CatalogError::NegativeStock { qty });
        }

        if let Some(name) = name {
            product.name = name;
        }
        if let Some(desc) = desc {
            product.desc = desc;
        }
        if let Some(cost) = cost {
            product.cost = cost;
        }
        if let Some(price) = price {
            product.price = price;
        }
        if let Some(qty) = self.qty {
            product.qty = qty;
        }
        if self.cat_id.is_some() {
            product.cat_id = self.cat_id;
        }
        if self.video.is_some() {
            product.video = self.video;
        }
        if let Some(colors) = self.colors {
            product.colors = colors;
        }
        product
            .images
            .retain(|image| !self.deleted_images.contains(image));
        product.images.extend(self.images);
        Ok(())
    }
}

/// Product with its category resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
}
