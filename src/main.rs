use clap::Parser;
use nvp_payments::config::cli::{Cli, Command};
use nvp_payments::utils::error::ErrorSeverity;
use nvp_payments::utils::logger;
use nvp_payments::{Payments, PaymentsError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "Payment command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<(), PaymentsError> {
    let config = cli.load_config()?;
    tracing::debug!("Payments config: {:?}", config);

    let payments = Payments::new(&config)?;
    if payments.is_testing() {
        tracing::info!("Using {} sandbox", payments.gateway_name());
    }

    let trans = cli.command.transaction();
    match &cli.command {
        Command::Setup { .. } => {
            let trans = payments.setup_redirect(trans).await?;
            println!("token:        {}", trans.express_token.unwrap_or_default());
            println!("redirect url: {}", trans.redirect_url.unwrap_or_default());
        }
        Command::Details { .. } => {
            let trans = payments.express_details(trans).await?;
            let payer = trans.payer.unwrap_or_default();
            println!(
                "payer id: {}",
                trans.payer_id.as_deref().unwrap_or("(not approved yet)")
            );
            println!("email:    {}", payer.email.unwrap_or_default());
            println!(
                "name:     {} {}",
                payer.first_name.unwrap_or_default(),
                payer.last_name.unwrap_or_default()
            );
        }
        Command::Authorise { .. } => {
            let auth = payments.authorise(&trans).await?;
            println!("{}", serde_json::to_string_pretty(&auth)?);
        }
    }

    Ok(())
}
