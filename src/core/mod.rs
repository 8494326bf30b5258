pub mod payments;
pub mod registry;

pub use crate::domain::model::{Authorisation, Transaction};
pub use crate::domain::ports::{GatewayBox, PaymentGateway};
pub use crate::utils::error::Result;
