//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod admin;
pub mod deposit;
pub mod payment;

// Re-export specific types to avoid conflicts
pub use admin::{Column as AdminColumn, Entity as Admin, Model as AdminModel};
pub use deposit::{
    Column as DepositColumn, DepositStatus, Entity as Deposit, Model as DepositModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
