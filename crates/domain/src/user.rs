//! Back-office users: registration, login and profiles.
//!
//! Every user signs in with a phone number that is unique across users.
//! Customer users are linked to a customer record and may only sign in
//! once that customer has been approved.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use common::DocumentId;
use document_store::{DocumentStore, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::customer::{CustomerService, NewCustomer};
use crate::document::Document;
use crate::error::{DomainError, UniqueViolationExt};
use crate::order::Money;
use crate::repository::Repository;

const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_MAX_LEN: usize = 15;

/// Errors that can occur during registration, login and profile edits.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{reason}")]
    WeakPassword { reason: &'static str },

    #[error("Password not matching")]
    PasswordMismatch,

    #[error("Invalid role: {role}")]
    InvalidRole { role: i64 },

    #[error("Mobile Number already registered")]
    DuplicatePhoneNumber { phone_number: String },

    #[error("No such phone number registered!")]
    UnknownPhoneNumber,

    #[error("Phone number or password doesn't match!")]
    InvalidCredentials,

    #[error("Customer not approved!")]
    NotApproved,

    #[error("Invalid shipping fee: {fee} (must not be negative)")]
    NegativeShipping { fee: Money },

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// What a user may do. Stored and transported as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn code(&self) -> i64 {
        match self {
            Role::Admin => 1,
            Role::Customer => 2,
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = AuthError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Customer),
            role => Err(AuthError::InvalidRole { role }),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: DocumentId,
    #[serde(default)]
    pub version: Version,
    pub name: String,
    pub phone_number: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    /// The linked customer record, for customer users.
    #[serde(default)]
    pub cust_id: Option<DocumentId>,
    /// Default shipping fee, kept on the admin profile.
    #[serde(default)]
    pub shipping: Money,
}

impl Document for User {
    fn collection() -> &'static str {
        "users"
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

/// The user as returned to clients, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: DocumentId,
    pub name: String,
    pub phone_number: String,
    pub role: Role,
    pub cust_id: Option<DocumentId>,
    pub shipping: Money,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone_number: user.phone_number,
            role: user.role,
            cust_id: user.cust_id,
            shipping: user.shipping,
        }
    }
}

/// Registration request. Customers also supply their shop and address.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    #[serde(alias = "phoneNumber")]
    pub phone_number: String,
    pub password: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: Option<String>,
    pub role: i64,
    #[serde(default, alias = "shopName")]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    #[serde(alias = "phoneNumber")]
    pub phone_number: String,
    pub password: String,
}

/// Profile edit; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone_number: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: Option<String>,
    pub shipping: Option<Money>,
}

fn required(field: &'static str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MissingField { field });
    }
    Ok(value.to_string())
}

/// Passwords are 8 to 15 ASCII letters or digits.
fn check_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::MissingField { field: "password" });
    }
    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AuthError::WeakPassword {
            reason: "Password must include alphabets and numbers",
        });
    }
    if password.len() < PASSWORD_MIN_LEN {
        return Err(AuthError::WeakPassword {
            reason: "Password must be minimum 8 characters",
        });
    }
    if password.len() > PASSWORD_MAX_LEN {
        return Err(AuthError::WeakPassword {
            reason: "Password must be upto 15 characters",
        });
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

impl<S: DocumentStore> Repository<S, User> {
    /// Finds the user linked to a customer record.
    pub(crate) async fn find_by_customer(
        &self,
        customer_id: DocumentId,
    ) -> Result<Option<User>, DomainError> {
        let query = self
            .query()
            .field_eq("cust_id", customer_id.to_string())
            .limit(1);
        Ok(self.find(query).await?.into_iter().next())
    }
}

/// Service for user accounts.
pub struct AuthService<S: DocumentStore> {
    users: Repository<S, User>,
    customers: CustomerService<S>,
}

impl<S: DocumentStore + Clone> AuthService<S> {
    pub fn new(store: S) -> Self {
        Self {
            users: Repository::new(store.clone()),
            customers: CustomerService::new(store),
        }
    }
}

impl<S: DocumentStore> AuthService<S> {
    /// Registers an admin, or a customer together with its pending
    /// customer record.
    #[tracing::instrument(skip(self, request), fields(role = request.role))]
    pub async fn register(&self, request: RegisterUser) -> Result<User, DomainError> {
        let role = Role::try_from(request.role)?;
        let name = required("name", &request.name)?;
        let phone_number = required("phone_number", &request.phone_number)?;
        check_password(&request.password)?;
        let shop = match role {
            Role::Admin => None,
            Role::Customer => Some((
                required("shop_name", request.shop_name.as_deref().unwrap_or_default())?,
                required("address", request.address.as_deref().unwrap_or_default())?,
            )),
        };

        if self.users.find_by_unique_key(&phone_number).await?.is_some() {
            return Err(AuthError::DuplicatePhoneNumber { phone_number }.into());
        }
        if request.confirm_password.as_deref() != Some(request.password.as_str()) {
            return Err(AuthError::PasswordMismatch.into());
        }
        let password_hash = hash_password(&request.password)?;

        let cust_id = match shop {
            Some((shop_name, address)) => {
                let customer = self
                    .customers
                    .register(NewCustomer {
                        name: name.clone(),
                        shop_name,
                        phone_number: phone_number.clone(),
                        profile_pic: None,
                        address: Some(address),
                    })
                    .await?;
                Some(customer.id)
            }
            None => None,
        };

        let user = User {
            id: DocumentId::new(),
            version: Version::initial(),
            name,
            phone_number: phone_number.clone(),
            password_hash,
            role,
            cust_id,
            shipping: Money::zero(),
        };
        let inserted = self
            .users
            .insert(user)
            .await
            .on_unique_violation(|| AuthError::DuplicatePhoneNumber { phone_number });

        match inserted {
            Ok(user) => {
                metrics::counter!("users_registered_total", "role" => role_label(role))
                    .increment(1);
                tracing::info!(user_id = %user.id, "user registered");
                Ok(user)
            }
            Err(err) => {
                if let Some(customer_id) = cust_id
                    && let Err(cleanup) = self.customers.delete_customer(customer_id).await
                {
                    tracing::warn!(%customer_id, error = %cleanup, "orphaned customer after failed registration");
                }
                Err(err)
            }
        }
    }

    /// Checks credentials. Customer users must be approved.
    #[tracing::instrument(skip(self, request))]
    pub async fn login(&self, request: Login) -> Result<User, DomainError> {
        let phone_number = required("phone_number", &request.phone_number)?;
        if request.password.is_empty() {
            return Err(AuthError::MissingField { field: "password" }.into());
        }

        let user = self
            .users
            .find_by_unique_key(&phone_number)
            .await?
            .ok_or(AuthError::UnknownPhoneNumber)?;
        if !verify_password(&request.password, &user.password_hash) {
            metrics::counter!("login_failures_total").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }
        if user.role == Role::Customer && !self.customer_approved(&user).await? {
            return Err(AuthError::NotApproved.into());
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    async fn customer_approved(&self, user: &User) -> Result<bool, DomainError> {
        let Some(customer_id) = user.cust_id else {
            return Ok(false);
        };
        match self.customers.get_customer(customer_id).await {
            Ok(customer) => Ok(customer.is_approved),
            Err(DomainError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Returns a user, or the first admin when no id is given.
    #[tracing::instrument(skip(self))]
    pub async fn get_profile(&self, id: Option<DocumentId>) -> Result<User, DomainError> {
        match id {
            Some(id) => self.users.load(id).await,
            None => {
                let query = self
                    .users
                    .query()
                    .field_eq("role", Role::Admin.code())
                    .limit(1);
                self.users
                    .find(query)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| DomainError::not_found(User::collection(), "admin"))
            }
        }
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        id: DocumentId,
        update: ProfileUpdate,
    ) -> Result<User, DomainError> {
        let name = update
            .name
            .as_deref()
            .map(|v| required("name", v))
            .transpose()?;
        let phone_number = update
            .phone_number
            .as_deref()
            .map(|v| required("phone_number", v))
            .transpose()?;
        if let Some(fee) = update.shipping
            && fee.is_negative()
        {
            return Err(AuthError::NegativeShipping { fee }.into());
        }
        let password_hash = match update.password.as_deref() {
            Some(password) => {
                check_password(password)?;
                if let Some(confirm) = update.confirm_password.as_deref()
                    && confirm != password
                {
                    return Err(AuthError::PasswordMismatch.into());
                }
                Some(hash_password(password)?)
            }
            None => None,
        };
        let conflict_phone = phone_number.clone().unwrap_or_default();

        self.users
            .update(id, |user| {
                if let Some(name) = name {
                    user.name = name;
                }
                if let Some(phone_number) = phone_number {
                    user.phone_number = phone_number;
                }
                if let Some(password_hash) = password_hash {
                    user.password_hash = password_hash;
                }
                if let Some(fee) = update.shipping {
                    user.shipping = fee;
                }
                Ok::<_, AuthError>(())
            })
            .await
            .on_unique_violation(|| AuthError::DuplicatePhoneNumber {
                phone_number: conflict_phone,
            })
    }

    /// Sets a new password on the user linked to `customer_id`.
    #[tracing::instrument(skip(self, password))]
    pub async fn change_password(
        &self,
        customer_id: DocumentId,
        password: &str,
    ) -> Result<User, DomainError> {
        check_password(password)?;
        let mut user = self
            .users
            .find_by_customer(customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found(User::collection(), customer_id))?;
        user.password_hash = hash_password(password)?;
        self.users.save(&mut user).await?;
        tracing::info!(user_id = %user.id, "password changed");
        Ok(user)
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Customer => "customer",
    }
}
