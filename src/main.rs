/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::cgt::calculator::Calculator;
use crate::cgt::pool::LotPool;
use crate::cgt::selector::MatchPolicy;
use crate::parsing::transactions::Side;
use crate::parsing::{filesystem, snapshot, transactions};
use crate::reports::cgt_reporter::CgtReporter;
use crate::reports::pool_reporter::PoolReporter;
use crate::util::date::parse_flexible;
use anyhow::{bail, Error};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

mod cgt;
mod config;
mod parsing;
mod reports;
mod util;

#[derive(Parser)]
#[command(
	name = "cgtr",
	version = "1.0",
	about = "Capital gains tax lot matching calculator"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The report to produce
	command: Directive,

	// -----------
	// -- FLAGS --
	// -----------
	/// Transactions file: CSV of sells (and optionally buys)
	#[arg(short = 's', long)]
	sales: Option<String>,

	/// Cost basis snapshot to open the run with (JSON)
	#[arg(short = 'p', long)]
	pool: Option<String>,

	/// Write the post-run cost basis snapshot to this file (JSON)
	#[arg(short = 'o', long)]
	output_pool: Option<String>,

	/// Emit the ledger as JSON instead of a table (rpt only)
	#[arg(long)]
	json: bool,

	/// Ignore transactions prior to this date (YYYY-MM-DD)
	#[arg(short, long)]
	begin: Option<String>,

	/// Ignore transactions after this date (YYYY-MM-DD)
	#[arg(short, long)]
	end: Option<String>,

	/// Custom config file location (default: ~/.config/cgtr/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// Lot matching policy: tax-optimal, fifo, lifo or low-cost
	#[arg(long)]
	policy: Option<String>,

	/// Days of holding required for the long-term discount
	#[arg(long)]
	threshold_days: Option<i64>,

	/// Maximum amount of decimal places to show for any amounts
	#[arg(long)]
	precision: Option<u32>,
}

impl Cli {
	/// The point is that this number exceeds what anyone wants; it's
	/// just to stop the program from printing e.g. millions of zeroes
	/// by accident
	const MAX_PRECISION: u32 = 50;

	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if let Some(prec) = self.precision {
			if prec > Cli::MAX_PRECISION {
				bail!("Maximum precision is {}", Cli::MAX_PRECISION);
			}
		}

		match self.command {
			Directive::Pool => {
				if self.sales.is_none() && self.pool.is_none() {
					bail!("No pool or transactions file specified");
				}
			},
			_ => {
				if self.sales.is_none() {
					bail!("No transactions file specified");
				}
			},
		}

		Ok(())
	}
}

#[derive(ValueEnum, Clone, PartialEq)]
enum Directive {
	Rpt, // per-sale CGT ledger
	Sum, // per-symbol and portfolio totals

	Pool, // remaining lots after processing

	Check, // find possible data integrity concerns
}

fn main() -> Result<(), Error> {
	let args = Cli::parse();
	args.validate()?;

	let (begin, end) = get_range(&args)?;

	let config = filesystem::get_config(args.config.as_ref())?;
	let mut rules = config.rules();
	if let Some(policy) = &args.policy {
		rules.policy = MatchPolicy::from_name(policy)?;
	}
	if let Some(days) = args.threshold_days {
		rules.holding.threshold_days = days;
	}

	let pool = match &args.pool {
		Some(path) => snapshot::load(path)?,
		None => LotPool::new(),
	};

	let events = match &args.sales {
		Some(path) => transactions::load(path)?,
		None => Vec::new(),
	};

	let mut calculator = Calculator::new(pool, rules);
	for event in events {
		if event.date < begin || event.date > end {
			continue;
		}
		match event.side {
			Side::Buy => calculator.buy(event.into_lot()),
			Side::Sell => calculator.sell(&event.into_sale()),
		}
	}

	let (pool, report) = calculator.finish();
	let precision = args.precision.unwrap_or(2);

	match args.command {
		Directive::Rpt => {
			if args.json {
				println!("{}", serde_json::to_string_pretty(&report.records)?);
			} else {
				let reporter = CgtReporter::new(report, precision);
				reporter.print_ledger();
				reporter.print_problems();
			}
		},
		Directive::Sum => {
			let reporter = CgtReporter::new(report, precision);
			reporter.print_summary();
			reporter.print_problems();
		},
		Directive::Pool => {
			PoolReporter::new(pool.clone(), precision).print();
		},
		Directive::Check => {
			let reporter = CgtReporter::new(report, precision);
			let rejected = reporter.print_problems();
			if rejected > 0 {
				bail!("{} transaction(s) rejected", rejected);
			}

			if !pool.is_empty() {
				println!("Remaining holdings:");
				for (symbol, _) in pool.iter() {
					println!("  {} {}", pool.total_units(symbol), symbol);
				}
			}
			println!("Done");
		},
	}

	if let Some(path) = &args.output_pool {
		snapshot::save(&pool, path)?;
	}

	Ok(())
}

fn get_range(args: &Cli) -> Result<(NaiveDate, NaiveDate), Error> {
	let begin = match &args.begin {
		Some(s) => parse_flexible(s)?,
		None => NaiveDate::MIN,
	};
	let end = match &args.end {
		Some(s) => parse_flexible(s)?,
		None => NaiveDate::MAX,
	};

	Ok((begin, end))
}
