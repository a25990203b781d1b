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
use crate::cgt::sale::SaleEvent;
use crate::cgt::selector::Allocation;
use crate::util::date::format_compact;
use crate::util::quant::Quant;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

/// The jurisdiction's concession on long-term gains: the fraction of a
/// qualifying gain that remains taxable. 1/2 is the Australian
/// 12-month discount. Never applied to a loss.
#[derive(Clone, Copy, Debug)]
pub struct DiscountRule {
	pub fraction: Quant,
}

impl Default for DiscountRule {
	fn default() -> Self {
		Self {
			fraction: Quant::new(5, 1),
		}
	}
}

/// Conditions attached to a gain record. Recoverable by design; they
/// annotate output rather than aborting the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
	NoCostBasis,
	ShortTermSale,
	MissingUnits(Quant),
}

impl fmt::Display for Warning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Warning::NoCostBasis => write!(f, "NO_COST_BASIS"),
			Warning::ShortTermSale => write!(f, "SHORT_TERM_SALE"),
			Warning::MissingUnits(n) => write!(f, "MISSING_{}_UNITS", n),
		}
	}
}

/// One row of the CGT ledger: a slice of a sale matched against one
/// lot, or a synthetic row for a sale with no basis at all. Immutable
/// once produced.
#[derive(Clone, Debug, Serialize)]
pub struct GainRecord {
	pub symbol: String,
	#[serde(serialize_with = "compact_date")]
	pub sale_date: NaiveDate,
	pub units: Quant,
	pub proceeds: Quant,
	pub sale_commission: Quant,
	#[serde(serialize_with = "compact_buy_date")]
	pub buy_date: Option<NaiveDate>,
	pub buy_price: Quant,
	pub buy_commission: Quant,
	pub days_held: i64,
	pub long_term_eligible: bool,
	pub cost_basis: Quant,
	pub capital_gain_loss: Quant,
	pub discount_applied: bool,
	pub taxable_gain: Quant,
	#[serde(rename = "warning", serialize_with = "joined_warnings")]
	pub warnings: Vec<Warning>,
}

impl GainRecord {
	/// All warnings on this record as one semicolon-joined string,
	/// empty when the record is clean.
	pub fn warning_text(&self) -> String {
		self.warnings
			.iter()
			.map(Warning::to_string)
			.collect::<Vec<_>>()
			.join("; ")
	}
}

fn compact_date<S: Serializer>(
	date: &NaiveDate,
	s: S,
) -> Result<S::Ok, S::Error> {
	s.serialize_str(&format_compact(date))
}

fn compact_buy_date<S: Serializer>(
	date: &Option<NaiveDate>,
	s: S,
) -> Result<S::Ok, S::Error> {
	match date {
		Some(d) => s.serialize_str(&format_compact(d)),
		None => s.serialize_str("N/A"),
	}
}

fn joined_warnings<S: Serializer>(
	warnings: &[Warning],
	s: S,
) -> Result<S::Ok, S::Error> {
	s.serialize_str(
		&warnings
			.iter()
			.map(Warning::to_string)
			.collect::<Vec<_>>()
			.join("; "),
	)
}

/// Converts a sale's allocations into gain records, splitting the
/// sale-side proceeds and commission across allocations by unit count
/// and the lot-side commission by share of the lot consumed.
///
/// A sale that matched nothing at all produces a single synthetic
/// record carrying the full proceeds as gain.
pub fn compute(
	event: &SaleEvent,
	allocations: &[Allocation],
	unmet_units: Quant,
	discount: &DiscountRule,
) -> Vec<GainRecord> {
	let total_proceeds = event.proceeds();

	if allocations.is_empty() {
		return vec![GainRecord {
			symbol: event.symbol.clone(),
			sale_date: event.sale_date,
			units: event.units_sold,
			proceeds: total_proceeds,
			sale_commission: event.sale_commission,
			buy_date: None,
			buy_price: Quant::zero(),
			buy_commission: Quant::zero(),
			days_held: 0,
			long_term_eligible: false,
			cost_basis: Quant::zero(),
			capital_gain_loss: total_proceeds,
			discount_applied: false,
			taxable_gain: total_proceeds,
			warnings: vec![Warning::NoCostBasis],
		}];
	}

	let mut records = Vec::with_capacity(allocations.len());

	for allocation in allocations {
		let proportion = allocation.units_taken / event.units_sold;
		let proceeds = total_proceeds * proportion;
		let sale_commission = event.sale_commission * proportion;

		let lot_cost = allocation.units_taken * allocation.unit_price;
		let buy_commission = allocation.commission_total
			* (allocation.units_taken / allocation.lot_units_before);
		let cost_basis = lot_cost + buy_commission;

		let capital_gain_loss = proceeds - sale_commission - cost_basis;

		let discount_applied =
			allocation.long_term && capital_gain_loss.is_positive();
		let taxable_gain = if discount_applied {
			capital_gain_loss * discount.fraction
		} else {
			capital_gain_loss
		};

		let mut warnings = Vec::new();
		if !allocation.long_term {
			warnings.push(Warning::ShortTermSale);
		}
		if unmet_units.is_positive() {
			warnings.push(Warning::MissingUnits(unmet_units));
		}

		records.push(GainRecord {
			symbol: event.symbol.clone(),
			sale_date: event.sale_date,
			units: allocation.units_taken,
			proceeds,
			sale_commission,
			buy_date: Some(allocation.purchase_date),
			buy_price: allocation.unit_price,
			buy_commission,
			days_held: allocation.days_held,
			long_term_eligible: allocation.long_term,
			cost_basis,
			capital_gain_loss,
			discount_applied,
			taxable_gain,
			warnings,
		});
	}

	records
}
