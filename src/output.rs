use clap::ValueEnum;
use loan_amortisation::LoanAmortisation;
use tabled::{builder::Builder, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: OutputFormat, result: &LoanAmortisation) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Table => print_table(result),
    }
    Ok(())
}

fn print_table(result: &LoanAmortisation) {
    println!("{}", summary_table(result));
    if result.schedule.is_empty() {
        println!("(nothing to repay)");
        return;
    }
    println!("{}", schedule_table(result));
}

fn summary_table(result: &LoanAmortisation) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["Periodic payment".to_string(), result.periodic_payment.to_string()]);
    builder.push_record(["Periods".to_string(), result.total_periods.to_string()]);
    builder.push_record(["Total paid".to_string(), result.total_paid.to_string()]);
    builder.push_record(["Total interest".to_string(), result.total_interest.to_string()]);
    Table::from(builder)
}

fn schedule_table(result: &LoanAmortisation) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Period", "Payment", "Interest", "Principal", "Balance remaining"]);
    for (period, entry) in result.schedule.iter().enumerate() {
        builder.push_record([
            period.to_string(),
            entry.payment.to_string(),
            entry.interest_payment.to_string(),
            entry.principal_amount.to_string(),
            entry.balance.to_string(),
        ]);
    }
    Table::from(builder)
}
