pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::paypal::PayPalGateway;
pub use config::PaymentsConfig;
pub use core::{payments::Payments, registry::GatewayRegistry};
pub use domain::model::{Authorisation, PaymentAction, PayerDetails, Transaction, TransactionType};
pub use utils::error::{PaymentsError, Result};
