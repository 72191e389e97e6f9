//! Converter CLI
//!
//! Command-line interface for the Currency Converter API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use converter_client::ConverterClient;
use converter_metrics::{InfluxConfig, InfluxEmitter};

#[derive(Parser)]
#[command(name = "converter")]
#[command(author, version, about = "Currency Converter CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Converter API
    #[arg(
        long,
        env = "CONVERTER_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    #[command(allow_negative_numbers = true)]
    Convert {
        /// Amount in the source currency
        amount: Decimal,
        /// Source currency code (e.g. USD)
        from: String,
        /// Target currency code (e.g. EUR)
        to: String,
    },
    /// Show the current rate for a currency pair
    Rate {
        from: String,
        to: String,
    },
    /// Check API health
    Health,
    /// Check the metrics backend
    MetricsCheck {
        #[arg(long, env = "INFLUXDB_URL", default_value = converter_metrics::influx::DEFAULT_URL)]
        influx_url: String,
        #[arg(long, env = "INFLUXDB_TOKEN", hide_env_values = true)]
        influx_token: Option<String>,
        #[arg(long, env = "INFLUXDB_BUCKET", default_value = converter_metrics::influx::DEFAULT_BUCKET)]
        influx_bucket: String,
        #[arg(long, env = "INFLUXDB_ORG", default_value = converter_metrics::influx::DEFAULT_ORG)]
        influx_org: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = ConverterClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Convert { amount, from, to } => {
            let result = client.convert(amount, &from, &to).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Rate { from, to } => {
            let rate = client.rate(&from, &to).await?;
            println!("{}", serde_json::to_string_pretty(&rate)?);
        }

        Commands::MetricsCheck {
            influx_url,
            influx_token,
            influx_bucket,
            influx_org,
        } => {
            let emitter = InfluxEmitter::new(InfluxConfig {
                url: influx_url,
                token: influx_token,
                bucket: influx_bucket,
                org: influx_org,
                ..Default::default()
            });

            if !emitter.is_enabled() {
                println!("✗ Metrics are disabled (INFLUXDB_TOKEN not set)");
                std::process::exit(1);
            }
            if emitter.health_check().await {
                println!("✓ Metrics backend is healthy ({})", emitter.config().url);
            } else {
                println!("✗ Metrics backend is not healthy ({})", emitter.config().url);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from(["converter", "convert", "12.50", "usd", "eur"]).unwrap();
        match cli.command {
            Commands::Convert { amount, from, to } => {
                assert_eq!(amount, dec!(12.50));
                assert_eq!(from, "usd");
                assert_eq!(to, "eur");
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_negative_amount_reaches_the_api() {
        let cli = Cli::try_parse_from(["converter", "convert", "-5", "USD", "EUR"]).unwrap();
        assert!(matches!(cli.command, Commands::Convert { amount, .. } if amount == dec!(-5)));
    }

    #[test]
    fn test_rejects_non_numeric_amount() {
        assert!(Cli::try_parse_from(["converter", "convert", "ten", "USD", "EUR"]).is_err());
    }

    #[test]
    fn test_parse_rate_with_api_url() {
        let cli = Cli::try_parse_from([
            "converter",
            "--api-url",
            "http://rates:9000",
            "rate",
            "GBP",
            "INR",
        ])
        .unwrap();
        assert_eq!(cli.api_url, "http://rates:9000");
        assert!(matches!(cli.command, Commands::Rate { .. }));
    }

    #[test]
    fn test_metrics_check_flags() {
        let cli = Cli::try_parse_from([
            "converter",
            "metrics-check",
            "--influx-url",
            "http://localhost:8086",
            "--influx-token",
            "tok",
        ])
        .unwrap();
        match cli.command {
            Commands::MetricsCheck {
                influx_url,
                influx_token,
                ..
            } => {
                assert_eq!(influx_url, "http://localhost:8086");
                assert_eq!(influx_token.as_deref(), Some("tok"));
            }
            _ => panic!("expected metrics-check"),
        }
    }
}
