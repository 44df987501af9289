mod logger;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use loan_amortisation::{calculate_amortisation_with_config, EngineConfig, InputLimits, LoanInputs};

use output::OutputFormat;

/// Amortisation schedule of an installment loan
#[derive(Parser, Debug)]
#[command(
    name = "amortise",
    version,
    about = "Amortisation schedule of an installment loan",
    long_about = "Sizes the fixed periodic payment of a loan, with an optional balloon, \
                  and prints the interest, principal and balance of every period."
)]
struct Cli {
    /// Loan amount, e.g. 20000 or "$20,000"
    #[arg(long)]
    amount: Option<String>,

    /// Term in years
    #[arg(long)]
    term: Option<String>,

    /// Nominal annual interest rate in percent, e.g. 6.5
    #[arg(long)]
    rate: Option<String>,

    /// weekly, fortnightly, monthly or a number of payments per year
    #[arg(long, default_value = "monthly")]
    frequency: String,

    /// Amount still owed at the end of the term
    #[arg(long)]
    balloon: Option<String>,

    /// Do not clamp the inputs to the calculator ranges
    #[arg(long)]
    unbounded: bool,

    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn loan_inputs(&self) -> LoanInputs {
        LoanInputs {
            loan_amount: self.amount.clone().unwrap_or_default(),
            term_years: self.term.clone().unwrap_or_default(),
            interest_rate: self.rate.clone().unwrap_or_default(),
            frequency: self.frequency.clone(),
            balloon: self.balloon.clone().unwrap_or_default(),
        }
    }

    fn limits(&self) -> InputLimits {
        if self.unbounded {
            InputLimits::unbounded()
        } else {
            InputLimits::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI args: {:?}", cli);

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading engine config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let params = cli
        .loan_inputs()
        .to_parameters(&cli.limits())
        .context("reading loan inputs")?;
    tracing::info!(
        principal = %params.principal,
        rate = %params.annual_rate_percent,
        term = %params.term_years,
        frequency = %params.frequency,
        balloon = %params.balloon,
        "calculating amortisation"
    );

    let result = calculate_amortisation_with_config(&params, &config).context("calculating amortisation")?;
    if !result.is_settled(params.balloon) {
        tracing::warn!(final_balance = ?result.final_balance(), "schedule closed away from zero");
    }

    output::format_output(cli.output, &result)
}
