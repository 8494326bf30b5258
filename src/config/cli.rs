use crate::config::PaymentsConfig;
use crate::domain::model::{PaymentAction, Transaction, DEFAULT_CURRENCY};
use crate::utils::error::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "nvp-payments")]
#[command(about = "Drive a PayPal express checkout from the command line")]
pub struct Cli {
    /// TOML settings file; the environment is used when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Force sandbox endpoints regardless of the TESTING setting
    #[arg(long, global = true)]
    pub sandbox: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a payment and print the URL the customer must approve it at
    Setup {
        #[arg(long)]
        amount: Decimal,

        #[arg(long, default_value = DEFAULT_CURRENCY)]
        currency: String,

        #[arg(long)]
        return_url: String,

        #[arg(long)]
        cancel_url: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        invoice: Option<String>,

        #[arg(long, value_enum, default_value_t = ActionArg::Sale)]
        action: ActionArg,
    },

    /// Show the payer who approved a checkout
    Details {
        #[arg(long)]
        token: String,
    },

    /// Complete an approved checkout
    Authorise {
        #[arg(long)]
        token: String,

        #[arg(long)]
        payer_id: String,

        #[arg(long)]
        amount: Decimal,

        #[arg(long, default_value = DEFAULT_CURRENCY)]
        currency: String,

        #[arg(long, value_enum, default_value_t = ActionArg::Sale)]
        action: ActionArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ActionArg {
    Sale,
    Authorization,
    Order,
}

impl From<ActionArg> for PaymentAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Sale => PaymentAction::Sale,
            ActionArg::Authorization => PaymentAction::Authorization,
            ActionArg::Order => PaymentAction::Order,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<PaymentsConfig> {
        let mut config = match &self.config {
            Some(path) => PaymentsConfig::from_file(path)?,
            None => PaymentsConfig::from_env()?,
        };
        if self.sandbox {
            config.testing = true;
        }
        Ok(config)
    }
}

impl Command {
    /// The transaction this command operates on.
    pub fn transaction(&self) -> Transaction {
        match self {
            Command::Setup {
                amount,
                currency,
                return_url,
                cancel_url,
                description,
                invoice,
                action,
            } => {
                let mut trans = Transaction::express(*amount, currency.as_str())
                    .with_return_url(return_url.as_str())
                    .with_cancel_url(cancel_url.as_str())
                    .with_payment_action((*action).into());
                trans.description = description.clone();
                trans.invoice = invoice.clone();
                trans
            }
            // Only the token matters for the details lookup.
            Command::Details { token } => {
                Transaction::express(Decimal::ONE, DEFAULT_CURRENCY).with_express_token(token.as_str())
            }
            Command::Authorise {
                token,
                payer_id,
                amount,
                currency,
                action,
            } => Transaction::express(*amount, currency.as_str())
                .with_express_token(token.as_str())
                .with_payer_id(payer_id.as_str())
                .with_payment_action((*action).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TransactionType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_setup_command() {
        let cli = Cli::try_parse_from([
            "nvp-payments",
            "setup",
            "--amount",
            "100",
            "--return-url",
            "http://www.example.com/return",
            "--cancel-url",
            "http://www.example.com/cancel",
            "--action",
            "authorization",
            "--sandbox",
        ])
        .unwrap();

        assert!(cli.sandbox);
        let trans = cli.command.transaction();
        assert_eq!(trans.kind, TransactionType::Express);
        assert_eq!(trans.amount, dec!(100));
        assert_eq!(trans.currency, "USD");
        assert_eq!(trans.payment_action, PaymentAction::Authorization);
        assert!(trans.validate().is_ok());
    }

    #[test]
    fn test_parse_authorise_command() {
        let cli = Cli::try_parse_from([
            "nvp-payments",
            "authorise",
            "--token",
            "EC-8RT50127BF829291N",
            "--payer-id",
            "95HR9CM6D56Q2",
            "--amount",
            "9.95",
            "--currency",
            "GBP",
        ])
        .unwrap();

        let trans = cli.command.transaction();
        assert_eq!(trans.express_token.as_deref(), Some("EC-8RT50127BF829291N"));
        assert_eq!(trans.payer_id.as_deref(), Some("95HR9CM6D56Q2"));
        assert_eq!(trans.currency, "GBP");
        assert!(trans.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_decimal_amount() {
        assert!(Cli::try_parse_from([
            "nvp-payments",
            "authorise",
            "--token",
            "EC-1",
            "--payer-id",
            "P",
            "--amount",
            "a lot",
        ])
        .is_err());
    }
}
