//! Domain layer for the back-office API.
//!
//! This crate provides:
//! - the `Document` trait and a typed `Repository` over any `DocumentStore`
//! - the order/cart lifecycle (`OrderService`) with its status state machine
//! - catalog, city and customer services feeding the order lifecycle
//! - user accounts (`AuthService`) for admins and approved customers

pub mod catalog;
pub mod city;
pub mod customer;
pub mod document;
pub mod error;
pub mod order;
pub mod repository;
pub mod user;

pub use catalog::{
    CatalogError, CatalogService, Category, NewProduct, NewSubCategory, Product, ProductStatus,
    ProductUpdate, ProductView, SubCategory, SubCategoryUpdate, SubCategoryView,
};
pub use city::{City, CityError, CityService, CityUpdate, NewCity};
pub use customer::{Customer, CustomerError, CustomerService, CustomerUpdate, NewCustomer};
pub use document::Document;
pub use error::DomainError;
pub use order::{
    AddItemToCart, AddressUpdate, CartItem, DeliveryDetails, Money, Order, OrderError, OrderNo,
    OrderService, OrderStatus, ShippingUpdate, UpdateQuantity,
};
pub use repository::Repository;
pub use user::{AuthError, AuthService, Login, ProfileUpdate, RegisterUser, Role, User, UserProfile};
