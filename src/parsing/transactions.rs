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
use crate::cgt::lot::Lot;
use crate::cgt::sale::SaleEvent;
use crate::util::date::parse_flexible;
use crate::util::quant::Quant;
use anyhow::{anyhow, bail, Error};
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs::File;
use std::io::Read;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Side {
	Buy,
	Sell,
}

/// One normalized broker transaction. Buys become lots; sells become
/// sale events. Quantities and money are stored in absolute terms, as
/// broker exports sign them inconsistently.
#[derive(Clone, Debug)]
pub struct Transaction {
	pub side: Side,
	pub symbol: String,
	pub date: NaiveDate,
	pub units: Quant,
	pub price: Quant,
	pub commission: Quant,
	pub proceeds: Quant,
}

impl Transaction {
	pub fn into_lot(self) -> Lot {
		Lot {
			symbol: self.symbol,
			units: self.units,
			unit_price: self.price,
			commission: self.commission,
			purchase_date: self.date,
		}
	}

	pub fn into_sale(self) -> SaleEvent {
		SaleEvent {
			symbol: self.symbol,
			sale_date: self.date,
			units_sold: self.units,
			sale_price_per_unit: self.price,
			sale_commission: self.commission,
			total_proceeds: self.proceeds,
		}
	}
}

pub fn load(path: &str) -> Result<Vec<Transaction>, Error> {
	let file = File::open(path)
		.map_err(|e| anyhow!("failed to open transactions {}: {}", path, e))?;
	parse(file)
}

/// Reads a transaction CSV. Headers are matched against the aliases
/// the various broker exports use; rows come back sorted by date, with
/// buys ahead of sells on the same day so a purchase is sellable the
/// day it happens.
pub fn parse(reader: impl Read) -> Result<Vec<Transaction>, Error> {
	let mut csv_reader = csv::ReaderBuilder::new()
		.trim(csv::Trim::All)
		.from_reader(reader);

	let headers = csv_reader.headers()?.clone();
	let columns = Columns::resolve(&headers)?;

	let mut transactions = Vec::new();
	for (index, result) in csv_reader.records().enumerate() {
		let record = result?;
		// +2: one for the header row, one for zero-indexing
		transactions.push(columns.transaction(&record, index + 2)?);
	}

	transactions.sort_by(|a, b| {
		a.date.cmp(&b.date).then_with(|| a.side.cmp(&b.side))
	});

	Ok(transactions)
}

/// Resolved header positions for one file.
struct Columns {
	symbol: usize,
	date: usize,
	units: usize,
	price: usize,
	commission: Option<usize>,
	proceeds: Option<usize>,
	side: Option<usize>,
}

impl Columns {
	fn resolve(headers: &StringRecord) -> Result<Self, Error> {
		let date = find(headers, &["Trade Date", "Date", "Sale_Date"])
			.or_else(|| {
				// any date-like column as a last resort
				headers
					.iter()
					.position(|h| h.to_lowercase().contains("date"))
			})
			.ok_or_else(|| anyhow!("no date column found"))?;

		Ok(Self {
			symbol: find(headers, &["Symbol", "Ticker", "Asset"])
				.ok_or_else(|| anyhow!("no symbol column found"))?,
			date,
			units: find(headers, &["Units_Sold", "Quantity", "Units"])
				.ok_or_else(|| anyhow!("no quantity column found"))?,
			price: find(
				headers,
				&["Sale_Price_Per_Unit", "Price (USD)", "Price"],
			)
			.ok_or_else(|| anyhow!("no price column found"))?,
			commission: find(
				headers,
				&["Commission_Paid", "Commission (USD)", "Commission"],
			),
			proceeds: find(
				headers,
				&["Total_Proceeds", "Proceeds (USD)", "Proceeds"],
			),
			side: find(headers, &["Side", "Type", "Action"]),
		})
	}

	fn transaction(
		&self,
		record: &StringRecord,
		line: usize,
	) -> Result<Transaction, Error> {
		let cell = |index: usize| record.get(index).unwrap_or("");

		let symbol = cell(self.symbol).to_string();
		let date = parse_flexible(cell(self.date))
			.map_err(|e| anyhow!("line {}: {}", line, e))?;

		let units = parse_number(cell(self.units), line)?.abs();
		let price = parse_number(cell(self.price), line)?.abs();

		let commission = match self.commission {
			Some(index) => parse_number(cell(index), line)?.abs(),
			None => Quant::zero(),
		};

		let proceeds = match self.proceeds {
			Some(index) => parse_number(cell(index), line)?.abs(),
			None => units * price,
		};

		let side = match self.side {
			Some(index) if cell(index).to_lowercase().contains("buy") => {
				Side::Buy
			},
			_ => Side::Sell,
		};

		Ok(Transaction {
			side,
			symbol,
			date,
			units,
			price,
			commission,
			proceeds,
		})
	}
}

fn find(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
	headers
		.iter()
		.position(|h| aliases.iter().any(|a| h.eq_ignore_ascii_case(a)))
}

/// Broker exports decorate numbers with currency symbols and grouping
/// commas; an empty cell reads as zero.
fn parse_number(raw: &str, line: usize) -> Result<Quant, Error> {
	let cleaned: String = raw
		.chars()
		.filter(|c| !matches!(c, '$' | ',' | ' '))
		.collect();

	if cleaned.is_empty() {
		return Ok(Quant::zero());
	}

	Quant::from_str(&cleaned)
		.map_err(|e| anyhow!("line {}: bad number {:?}: {}", line, raw, e))
}
