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
use crate::cgt::gain::GainRecord;
use crate::util::quant::Quant;
use std::collections::BTreeMap;

/// Sums of the financial columns for one symbol's sales.
#[derive(Clone, Debug, Default)]
pub struct SymbolTotals {
	pub units_sold: Quant,
	pub proceeds: Quant,
	pub cost_basis: Quant,
	pub capital_gain_loss: Quant,
	pub taxable_gain: Quant,
}

/// Whole-portfolio rollup. `discount_eligible_gain` is the sum of
/// gains the discount applied to, before discounting, for disclosure.
#[derive(Clone, Debug, Default)]
pub struct PortfolioTotals {
	pub capital_gain_loss: Quant,
	pub taxable_gain: Quant,
	pub discount_eligible_gain: Quant,
}

/// Everything one run produced besides the mutated pool.
#[derive(Clone, Debug)]
pub struct LedgerReport {
	pub records: Vec<GainRecord>,
	pub symbol_totals: BTreeMap<String, SymbolTotals>,
	pub portfolio: PortfolioTotals,
	pub warnings: Vec<String>,
	pub rejections: Vec<String>,
}

/// Accumulates gain records as sales are processed, then rolls them up
/// into the report. Records are append-only; nothing here mutates a
/// record after it lands.
#[derive(Debug, Default)]
pub struct CgtLedger {
	records: Vec<GainRecord>,
	rejections: Vec<String>,
}

impl CgtLedger {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn append(&mut self, records: Vec<GainRecord>) {
		self.records.extend(records);
	}

	/// Notes an event that was rejected before selection. Rejection is
	/// per-event; the run continues.
	pub fn reject(&mut self, description: String) {
		self.rejections.push(description);
	}

	pub fn finalize(self) -> LedgerReport {
		let mut symbol_totals: BTreeMap<String, SymbolTotals> = BTreeMap::new();
		let mut portfolio = PortfolioTotals::default();
		let mut warnings: Vec<String> = Vec::new();

		for record in &self.records {
			let totals = symbol_totals
				.entry(record.symbol.clone())
				.or_default();

			totals.units_sold += record.units;
			totals.proceeds += record.proceeds;
			totals.cost_basis += record.cost_basis;
			totals.capital_gain_loss += record.capital_gain_loss;
			totals.taxable_gain += record.taxable_gain;

			portfolio.capital_gain_loss += record.capital_gain_loss;
			portfolio.taxable_gain += record.taxable_gain;
			if record.discount_applied {
				portfolio.discount_eligible_gain += record.capital_gain_loss;
			}

			let text = record.warning_text();
			if !text.is_empty() && !warnings.contains(&text) {
				warnings.push(text);
			}
		}

		LedgerReport {
			records: self.records,
			symbol_totals,
			portfolio,
			warnings,
			rejections: self.rejections,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cgt::gain::Warning;
	use chrono::NaiveDate;

	fn record(
		symbol: &str,
		gain: i128,
		discounted: bool,
		warnings: Vec<Warning>,
	) -> GainRecord {
		let gain = Quant::from_i128(gain);
		GainRecord {
			symbol: symbol.to_string(),
			sale_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
			units: Quant::from_i128(10),
			proceeds: Quant::from_i128(100),
			sale_commission: Quant::zero(),
			buy_date: None,
			buy_price: Quant::from_i128(5),
			buy_commission: Quant::zero(),
			days_held: 400,
			long_term_eligible: discounted,
			cost_basis: Quant::from_i128(50),
			capital_gain_loss: gain,
			discount_applied: discounted,
			taxable_gain: if discounted {
				gain * Quant::new(5, 1)
			} else {
				gain
			},
			warnings,
		}
	}

	#[test]
	fn test_empty_ledger() {
		let report = CgtLedger::new().finalize();
		assert!(report.records.is_empty());
		assert!(report.symbol_totals.is_empty());
		assert!(report.portfolio.capital_gain_loss.is_zero());
		assert!(report.warnings.is_empty());
	}

	#[test]
	fn test_totals_grouped_by_symbol() {
		let mut ledger = CgtLedger::new();
		ledger.append(vec![
			record("BHP", 100, true, vec![]),
			record("BHP", 40, false, vec![]),
			record("CSL", 60, true, vec![]),
		]);
		let report = ledger.finalize();

		assert_eq!(report.symbol_totals.len(), 2);
		let bhp = &report.symbol_totals["BHP"];
		assert_eq!(bhp.units_sold, Quant::from_i128(20));
		assert_eq!(bhp.capital_gain_loss, Quant::from_i128(140));
		assert_eq!(bhp.taxable_gain, Quant::from_i128(90));

		assert_eq!(
			report.portfolio.capital_gain_loss,
			Quant::from_i128(200)
		);
		assert_eq!(report.portfolio.taxable_gain, Quant::from_i128(120));
		assert_eq!(
			report.portfolio.discount_eligible_gain,
			Quant::from_i128(160)
		);
	}

	#[test]
	fn test_warnings_deduplicated_in_order() {
		let mut ledger = CgtLedger::new();
		ledger.append(vec![
			record("A", 1, false, vec![Warning::ShortTermSale]),
			record("B", 1, false, vec![Warning::NoCostBasis]),
			record("C", 1, false, vec![Warning::ShortTermSale]),
			record(
				"D",
				1,
				false,
				vec![
					Warning::ShortTermSale,
					Warning::MissingUnits(Quant::from_i128(5)),
				],
			),
		]);
		let report = ledger.finalize();

		assert_eq!(
			report.warnings,
			vec![
				"SHORT_TERM_SALE".to_string(),
				"NO_COST_BASIS".to_string(),
				"SHORT_TERM_SALE; MISSING_5_UNITS".to_string(),
			]
		);
	}

	#[test]
	fn test_rejections_pass_through() {
		let mut ledger = CgtLedger::new();
		ledger.reject("sale of BHP has non-positive quantity 0".to_string());
		let report = ledger.finalize();
		assert_eq!(report.rejections.len(), 1);
	}
}
