//! Customer registration and approval.

use chrono::Utc;
use common::DocumentId;
use document_store::{DocumentStore, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::error::{DomainError, UniqueViolationExt};
use crate::order::Order;
use crate::repository::Repository;
use crate::user::User;

/// Errors that can occur during customer operations.
#[derive(Debug, Error)]
pub enum CustomerError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Customer with phone number '{phone_number}' already exists")]
    DuplicatePhoneNumber { phone_number: String },

    /// Only pending registrations can be declined.
    #[error("Customer {id} is already approved")]
    AlreadyApproved { id: DocumentId },
}

/// A registered shop customer. Phone numbers are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: DocumentId,
    #[serde(default)]
    pub version: Version,
    pub name: String,
    pub shop_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
    /// Delivery addresses; the first one is the primary address.
    #[serde(default)]
    pub address: Vec<String>,
    #[serde(default)]
    pub is_approved: bool,
    /// Unix seconds.
    pub signed_up_at: i64,
}

impl Document for Customer {
    fn collection() -> &'static str {
        "customers"
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
        Some(self.phone_number.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub shop_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Profile update. `address` replaces the primary address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub shop_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub profile_pic: Option<String>,
}

fn required(field: &'static str, value: &str) -> Result<String, CustomerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CustomerError::MissingField { field });
    }
    Ok(value.to_string())
}

/// Service for customers.
///
/// Declining or deleting a customer also removes its linked user, and
/// profile edits keep that user's name and phone number in step.
pub struct CustomerService<S: DocumentStore> {
    customers: Repository<S, Customer>,
    users: Repository<S, User>,
    orders: Repository<S, Order>,
}

impl<S: DocumentStore + Clone> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self {
            customers: Repository::new(store.clone()),
            users: Repository::new(store.clone()),
            orders: Repository::new(store),
        }
    }
}

impl<S: DocumentStore> CustomerService<S> {
    /// Registers a customer awaiting approval.
    #[tracing::instrument(skip(self, request))]
    pub async fn register(&self, request: NewCustomer) -> Result<Customer, DomainError> {
        let phone_number = required("phone_number", &request.phone_number)?;
        let customer = Customer {
            id: DocumentId::new(),
            version: Version::initial(),
            name: required("name", &request.name)?,
            shop_name: required("shop_name", &request.shop_name)?,
            phone_number: phone_number.clone(),
            profile_pic: request.profile_pic,
            address: request
                .address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .into_iter()
                .collect(),
            is_approved: false,
            signed_up_at: Utc::now().timestamp(),
        };

        let customer = self
            .customers
            .insert(customer)
            .await
            .on_unique_violation(|| CustomerError::DuplicatePhoneNumber { phone_number })?;
        metrics::counter!("customers_registered_total").increment(1);
        Ok(customer)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, DomainError> {
        self.customers.list().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_customer(&self, id: DocumentId) -> Result<Customer, DomainError> {
        self.customers.load(id).await
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_customer(
        &self,
        id: DocumentId,
        update: CustomerUpdate,
    ) -> Result<Customer, DomainError> {
        let name = update
            .name
            .as_deref()
            .map(|v| required("name", v))
            .transpose()?;
        let shop_name = update
            .shop_name
            .as_deref()
            .map(|v| required("shop_name", v))
            .transpose()?;
        let phone_number = update
            .phone_number
            .as_deref()
            .map(|v| required("phone_number", v))
            .transpose()?;
        let conflict_phone = phone_number.clone().unwrap_or_default();

        let customer = self
            .customers
            .update(id, |customer| {
                if let Some(name) = name {
                    customer.name = name;
                }
                if let Some(shop_name) = shop_name {
                    customer.shop_name = shop_name;
                }
                if let Some(phone_number) = phone_number {
                    customer.phone_number = phone_number;
                }
                if let Some(address) = update.address {
                    match customer.address.first_mut() {
                        Some(primary) => *primary = address,
                        None => customer.address.push(address),
                    }
                }
                if update.profile_pic.is_some() {
                    customer.profile_pic = update.profile_pic;
                }
                Ok::<_, CustomerError>(())
            })
            .await
            .on_unique_violation(|| CustomerError::DuplicatePhoneNumber {
                phone_number: conflict_phone,
            })?;

        if let Some(mut user) = self.users.find_by_customer(id).await?
            && (user.name != customer.name || user.phone_number != customer.phone_number)
        {
            user.name = customer.name.clone();
            user.phone_number = customer.phone_number.clone();
            self.users
                .save(&mut user)
                .await
                .on_unique_violation(|| CustomerError::DuplicatePhoneNumber {
                    phone_number: customer.phone_number.clone(),
                })?;
        }
        Ok(customer)
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_address(&self, id: DocumentId, address: &str) -> Result<Customer, DomainError> {
        let address = required("address", address)?;
        self.customers
            .update(id, |customer| {
                customer.address.push(address);
                Ok::<_, CustomerError>(())
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_addresses(&self, id: DocumentId) -> Result<Vec<String>, DomainError> {
        Ok(self.customers.load(id).await?.address)
    }

    #[tracing::instrument(skip(self))]
    pub async fn approve(&self, id: DocumentId) -> Result<Customer, DomainError> {
        let customer = self
            .customers
            .update(id, |customer| {
                customer.is_approved = true;
                Ok::<_, CustomerError>(())
            })
            .await?;
        tracing::info!(customer_id = %id, "customer approved");
        Ok(customer)
    }

    /// Rejects a pending registration by deleting it.
    #[tracing::instrument(skip(self))]
    pub async fn decline(&self, id: DocumentId) -> Result<Customer, DomainError> {
        let customer = self.customers.load(id).await?;
        if customer.is_approved {
            return Err(CustomerError::AlreadyApproved { id }.into());
        }
        if !self.customers.remove(&customer).await? {
            return Err(DomainError::not_found(Customer::collection(), id));
        }
        self.remove_linked_user(id).await?;
        tracing::info!(customer_id = %id, "customer declined");
        Ok(customer)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: DocumentId) -> Result<Customer, DomainError> {
        let customer = self.customers.take(id).await?;
        self.remove_linked_user(id).await?;
        Ok(customer)
    }

    async fn remove_linked_user(&self, customer_id: DocumentId) -> Result<(), DomainError> {
        if let Some(user) = self.users.find_by_customer(customer_id).await? {
            self.users.remove(&user).await?;
        }
        Ok(())
    }

    /// Lists the orders placed under the customer's id.
    #[tracing::instrument(skip(self))]
    pub async fn customer_orders(&self, id: DocumentId) -> Result<Vec<Order>, DomainError> {
        self.customers.load(id).await?;
        self.orders
            .find(self.orders.query().field_eq("customer", id.to_string()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::InMemoryDocumentStore;

    fn service() -> CustomerService<InMemoryDocumentStore> {
        CustomerService::new(InMemoryDocumentStore::new())
    }

    fn new_customer(phone: &str) -> NewCustomer {
        NewCustomer {
            name: "Ayesha".to_string(),
            shop_name: "Corner Store".to_string(),
            phone_number: phone.to_string(),
            profile_pic: None,
            address: Some("1 Mall Road".to_string()),
        }
    }

    #[tokio::test]
    async fn register_starts_unapproved() {
        let customers = service();
        let customer = customers.register(new_customer("0300")).await.unwrap();
        assert!(!customer.is_approved);
        assert_eq!(customer.address, vec!["1 Mall Road".to_string()]);
        assert!(customer.signed_up_at > 0);
    }

    #[tokio::test]
    async fn duplicate_phone_is_conflict() {
        let customers = service();
        customers.register(new_customer("0300")).await.unwrap();

        let result = customers.register(new_customer("0300")).await;
        assert!(matches!(
            result,
            Err(DomainError::Customer(CustomerError::DuplicatePhoneNumber { .. }))
        ));
    }

    #[tokio::test]
    async fn addresses_append_and_primary_updates() {
        let customers = service();
        let customer = customers.register(new_customer("0300")).await.unwrap();

        customers.add_address(customer.id, "2 Canal View").await.unwrap();
        customers
            .update_customer(
                customer.id,
                CustomerUpdate {
                    address: Some("9 Gulberg".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let addresses = customers.get_addresses(customer.id).await.unwrap();
        assert_eq!(addresses, vec!["9 Gulberg".to_string(), "2 Canal View".to_string()]);
    }

    #[tokio::test]
    async fn approved_customer_cannot_be_declined() {
        let customers = service();
        let customer = customers.register(new_customer("0300")).await.unwrap();
        customers.approve(customer.id).await.unwrap();

        let result = customers.decline(customer.id).await;
        assert!(matches!(
            result,
            Err(DomainError::Customer(CustomerError::AlreadyApproved { .. }))
        ));
        assert!(customers.get_customer(customer.id).await.is_ok());
    }

    #[tokio::test]
    async fn decline_deletes_pending_customer() {
        let customers = service();
        let customer = customers.register(new_customer("0300")).await.unwrap();

        customers.decline(customer.id).await.unwrap();
        assert!(matches!(
            customers.get_customer(customer.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn orders_of_unknown_customer_is_not_found() {
        let customers = service();
        let result = customers.customer_orders(DocumentId::new()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
