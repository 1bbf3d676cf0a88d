//! Cities and their shipping fees.

use common::DocumentId;
use document_store::{DocumentStore, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::error::DomainError;
use crate::order::Money;
use crate::repository::Repository;

/// Errors that can occur during city operations.
#[derive(Debug, Error)]
pub enum CityError {
    #[error("City name is required")]
    MissingName,

    #[error("Invalid shipping fee: {fee} (must not be negative)")]
    NegativeFee { fee: Money },
}

/// A delivery city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: DocumentId,
    #[serde(default)]
    pub version: Version,
    pub name: String,
    #[serde(default)]
    pub shipping_fee: Money,
}

impl Document for City {
    fn collection() -> &'static str {
        "cities"
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

#[derive(Debug, Clone, Deserialize)]
pub struct NewCity {
    pub name: String,
    #[serde(default)]
    pub shipping_fee: Money,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityUpdate {
    pub name: Option<String>,
    pub shipping_fee: Option<Money>,
}

fn validate_name(name: &str) -> Result<String, CityError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CityError::MissingName);
    }
    Ok(name.to_string())
}

fn validate_fee(fee: Money) -> Result<Money, CityError> {
    if fee.is_negative() {
        return Err(CityError::NegativeFee { fee });
    }
    Ok(fee)
}

/// Service for cities.
pub struct CityService<S: DocumentStore> {
    cities: Repository<S, City>,
}

impl<S: DocumentStore> CityService<S> {
    pub fn new(store: S) -> Self {
        Self {
            cities: Repository::new(store),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_city(&self, request: NewCity) -> Result<City, DomainError> {
        let city = City {
            id: DocumentId::new(),
            version: Version::initial(),
            name: validate_name(&request.name)?,
            shipping_fee: validate_fee(request.shipping_fee)?,
        };
        self.cities.insert(city).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_cities(&self) -> Result<Vec<City>, DomainError> {
        self.cities.list().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_city(&self, id: DocumentId) -> Result<City, DomainError> {
        self.cities.load(id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_city(&self, id: DocumentId, update: CityUpdate) -> Result<City, DomainError> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        let fee = update.shipping_fee.map(validate_fee).transpose()?;

        self.cities
            .update(id, |city| {
                if let Some(name) = name {
                    city.name = name;
                }
                if let Some(fee) = fee {
                    city.shipping_fee = fee;
                }
                Ok::<_, CityError>(())
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_city(&self, id: DocumentId) -> Result<City, DomainError> {
        self.cities.take(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::InMemoryDocumentStore;

    fn service() -> CityService<InMemoryDocumentStore> {
        CityService::new(InMemoryDocumentStore::new())
    }

    #[tokio::test]
    async fn create_and_update_city() {
        let cities = service();
        let city = cities
            .create_city(NewCity {
                name: " Karachi ".to_string(),
                shipping_fee: Money::new(250),
            })
            .await
            .unwrap();
        assert_eq!(city.name, "Karachi");

        let updated = cities
            .update_city(
                city.id,
                CityUpdate {
                    shipping_fee: Some(Money::new(300)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Karachi");
        assert_eq!(updated.shipping_fee, Money::new(300));
    }

    #[tokio::test]
    async fn city_validation() {
        let cities = service();
        let blank = cities
            .create_city(NewCity {
                name: String::new(),
                shipping_fee: Money::zero(),
            })
            .await;
        assert!(matches!(blank, Err(DomainError::City(CityError::MissingName))));

        let negative = cities
            .create_city(NewCity {
                name: "Quetta".to_string(),
                shipping_fee: Money::new(-10),
            })
            .await;
        assert!(matches!(
            negative,
            Err(DomainError::City(CityError::NegativeFee { .. }))
        ));
    }

    #[tokio::test]
    async fn delete_missing_city_is_not_found() {
        let cities = service();
        let result = cities.delete_city(DocumentId::new()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
