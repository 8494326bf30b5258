use nvp_payments::config::{PaymentsConfig, SANDBOX_API_ENDPOINT};
use nvp_payments::PaymentsError;

const KEYS: [&str; 9] = [
    "PAYMENT_API",
    "TESTING",
    "PAYPAL_API_USER",
    "PAYPAL_API_PWD",
    "PAYPAL_API_SIGNATURE",
    "PAYPAL_API_ENDPOINT",
    "PAYPAL_API_URL",
    "PAYPAL_API_VERSION",
    "PAYPAL_TIMEOUT_SECONDS",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

// Single test: the process environment is shared between test threads.
#[test]
fn test_from_env() {
    clear_env();

    let config = PaymentsConfig::from_env().unwrap();
    assert_eq!(config.payment_api, "PayPal");
    assert!(!config.testing);

    std::env::set_var("TESTING", "true");
    std::env::set_var("PAYPAL_API_USER", "env-user");
    std::env::set_var("PAYPAL_API_PWD", "env-pwd");
    std::env::set_var("PAYPAL_API_SIGNATURE", "env-signature");
    std::env::set_var("PAYPAL_TIMEOUT_SECONDS", "12");

    let config = PaymentsConfig::from_env().unwrap();
    assert!(config.testing);
    assert_eq!(config.paypal_api_user, "env-user");
    assert_eq!(config.api_endpoint(), SANDBOX_API_ENDPOINT);
    assert_eq!(config.timeout_seconds(), 12);

    std::env::set_var("PAYPAL_TIMEOUT_SECONDS", "soon");
    let err = PaymentsConfig::from_env().unwrap_err();
    assert!(matches!(err, PaymentsError::InvalidConfigValueError { ref field, .. } if field == "PAYPAL_TIMEOUT_SECONDS"));

    std::env::set_var("PAYPAL_TIMEOUT_SECONDS", "12");
    std::env::set_var("TESTING", "perhaps");
    assert!(PaymentsConfig::from_env().is_err());

    clear_env();
}
