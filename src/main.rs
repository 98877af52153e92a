use std::process::ExitCode;
use anyhow::Context;
use chrono::{Local, NaiveDate, TimeDelta};
use clap::Parser;
use log::error;
use aqcast::errors::AQCastError;
use aqcast::initialization::{init, Mgr};
use aqcast::pollutants::PollutantCode;

#[derive(Parser, Debug)]
#[command(name = "aqcast")]
#[command(about = "Hourly air quality forecast from the past 24 hours of weather", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "AQCAST_CONFIG", default_value = "config.toml")]
    config: String,

    /// Target date, YYYY-MM-DD
    #[arg(short, long)]
    date: NaiveDate,

    /// Target hour, 0-23
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
    hour: u32,

    /// Validate the forecast against observed pollution
    #[arg(long)]
    validate: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mgr = match init(&args.config).with_context(|| format!("loading {}", args.config)) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error initializing aqcast: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &mgr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            print_msg(e.user_message(), "Error");
            ExitCode::FAILURE
        }
    }
}

/// Runs one forecast and, if asked for, its validation
///
/// # Arguments
///
/// * 'args' - parsed command line arguments
/// * 'mgr' - loaded managers
fn run(args: &Args, mgr: &Mgr) -> Result<(), AQCastError> {
    let start = args.date - TimeDelta::days(1);
    let days = mgr.weather.get_days(start, args.date);

    let forecast = mgr.pipeline.forecast(&days, args.date, args.hour)?;

    let mut msg = String::new();
    for ((code, value), (_, tier)) in forecast.pollutants.iter().zip(forecast.aqi.per_pollutant.iter()) {
        msg.push_str(&format!("{:<6} {:>10.2} µg/m³  {}\n", code, value, tier));
    }
    msg.push_str(&format!("AQI: {}", forecast.tier()));
    print_msg(&msg, &format!("Forecast {}", forecast.timestamp.format("%Y-%m-%d %H:%M")));

    if args.validate {
        let Some(pollution) = &mgr.pollution else {
            print_msg("Validation skipped, no pollution file configured", "Validation");
            return Ok(());
        };
        let result = mgr.pipeline.validate(&forecast, pollution)?;

        let mut msg = String::new();
        for code in PollutantCode::ALL {
            msg.push_str(&format!("{:<6} predicted {:>10.2}  actual {:>10.2}  squared error {}\n",
                                  code,
                                  result.predicted.get(code),
                                  result.actual.get(code),
                                  result.squared_error(code)));
        }
        print_msg(msg.trim_end(), "Validation");
    }

    Ok(())
}

/// Prints a message with a caption line
///
/// # Arguments
///
/// * 'message' - the message
/// * 'caption' - the caption to print
fn print_msg(message: &str, caption: &str) {
    let report_time = format!("{}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let caption = format!("{} {} ", report_time, caption);

    println!("{:=<80}\n{}\n", caption, message);
}
