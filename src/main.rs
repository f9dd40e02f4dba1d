use anyhow::Result;
use clap::Parser;
use log::debug;
use mortgage_schedules::loan::round_cents;
use mortgage_schedules::{
    build_all, export_all, payment_amounts, PaymentPlan, Schedule, ScheduleError,
};
use rust_decimal::Decimal;
use simple_logger::SimpleLogger;
use std::process::ExitCode;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = SimpleLogger::new().with_level(cli.log_level()).env().init() {
        eprintln!("logger already initialised: {}", err);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            exit_code(&err)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let params = cli.to_params()?;
    debug!("{:?}", params);

    let schedules = build_all(&params)?;

    let paths = cli.export_paths();
    export_all(&schedules, &paths)?;

    print_payments(&payment_amounts(&params)?);
    print_summary(&schedules);
    println!("\nSchedules written to {}", paths.excel.display());
    println!("Balance chart written to {}", paths.png.display());
    Ok(())
}

// 2 for bad input, matching clap's usage errors; 1 for everything else
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ScheduleError>() {
        Some(e) if e.is_input_error() => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn print_payments(payments: &[(PaymentPlan, Decimal)]) {
    println!("Payment amounts:");
    for (plan, amt) in payments {
        println!("{:>15}: {}", plan.key(), format_money(*amt));
    }
}

fn print_summary(schedules: &[Schedule]) {
    println!(
        "\n{:>15}  {:>8}  {:>16}  {:>16}",
        "plan", "periods", "total interest", "term balance"
    );
    for schedule in schedules {
        println!(
            "{:>15}  {:>8}  {:>16}  {:>16}",
            schedule.plan.key(),
            schedule.get_pmt_count(),
            format_money(schedule.total_interest()),
            format_money(schedule.term_end_balance()),
        );
    }
}

// $1,234.56
fn format_money(amt: Decimal) -> String {
    let cents = format!("{:.2}", round_cents(amt.abs()));
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amt.is_sign_negative() && !amt.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac)
}
