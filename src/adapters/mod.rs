// Adapters layer: concrete gateway implementations behind `domain::ports::PaymentGateway`.

pub mod paypal;
