use common::DocumentId;
use document_store::Version;
use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Product category. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: DocumentId,
    #[serde(default)]
    pub version: Version,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            version: Version::initial(),
            name: name.into(),
        }
    }
}

impl Document for Category {
    fn collection() -> &'static str {
        "categories"
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

    fn unique_key(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

/// Sub-category of a category. Names are unique within their category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: DocumentId,
    #[serde(default)]
    pub version: Version,
    pub cat_id: DocumentId,
    pub name: String,
}

impl SubCategory {
    pub fn new(cat_id: DocumentId, name: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            version: Version::initial(),
            cat_id,
            name: name.into(),
        }
    }
}

impl Document for SubCategory {
    fn collection() -> &'static str {
        "sub_categories"
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

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}/{}", self.cat_id, self.name))
    }
}

/// Request to create a sub-category. Both fields are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSubCategory {
    pub cat_id: Option<DocumentId>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubCategoryUpdate {
    pub cat_id: Option<DocumentId>,
    pub name: Option<String>,
}

/// Sub-category with its category resolved.
#[derive(Debug, Clone, Serialize)]
pub struct SubCategoryView {
    #[serde(flatten)]
    pub sub_category: SubCategory,
    pub category: Option<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_category_key_is_scoped_by_category() {
        let a = SubCategory::new(DocumentId::new(), "Shoes");
        let b = SubCategory::new(DocumentId::new(), "Shoes");
        assert_ne!(a.unique_key(), b.unique_key());
    }

    #[test]
    fn view_flattens_sub_category() {
        let category = Category::new("Clothing");
        let view = SubCategoryView {
            sub_category: SubCategory::new(category.id, "Shirts"),
            category: Some(category),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Shirts");
        assert_eq!(json["category"]["name"], "Clothing");
    }
}
