use crate::adapters::paypal::PayPalGateway;
use crate::config::PaymentsConfig;
use crate::domain::ports::GatewayBox;
use crate::utils::error::{PaymentsError, Result};
use std::collections::BTreeMap;

pub type GatewayFactory = Box<dyn Fn(&PaymentsConfig) -> Result<GatewayBox> + Send + Sync>;

/// Maps `PAYMENT_API` names to gateway constructors. Lookup ignores case.
pub struct GatewayRegistry {
    factories: BTreeMap<String, (String, GatewayFactory)>,
}

impl GatewayRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, factory: GatewayFactory) -> &mut Self {
        self.factories
            .insert(name.to_ascii_lowercase(), (name.to_string(), factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.trim().to_ascii_lowercase())
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories
            .values()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn create(&self, config: &PaymentsConfig) -> Result<GatewayBox> {
        let requested = config.payment_api.trim();
        let (name, factory) = self
            .factories
            .get(&requested.to_ascii_lowercase())
            .ok_or_else(|| {
                PaymentsError::config(format!(
                    "PAYMENT_API {:?} is not a known gateway (known: {})",
                    requested,
                    self.names().join(", ")
                ))
            })?;

        tracing::debug!(gateway = %name, "Binding payment gateway");
        factory(config)
    }
}

impl Default for GatewayRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            PayPalGateway::NAME,
            Box::new(|config: &PaymentsConfig| -> Result<GatewayBox> {
                Ok(Box::new(PayPalGateway::from_config(config)?) as GatewayBox)
            }),
        );
        registry
    }
}
