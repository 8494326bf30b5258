// Domain layer: payment data types and the gateway port. No HTTP or config types here.

pub mod model;
pub mod ports;
