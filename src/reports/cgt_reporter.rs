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
use crate::cgt::ledger::LedgerReport;
use crate::reports::table::Table;
use crate::util::date::format_compact;
use crate::util::quant::Quant;

/// Renders the run's ledger for the terminal: the per-sale CGT table,
/// the per-symbol summary, and whatever warnings the run raised.
pub struct CgtReporter {
	report: LedgerReport,
	precision: u32,
}

impl CgtReporter {
	pub fn new(report: LedgerReport, precision: u32) -> Self {
		Self { report, precision }
	}

	fn money(&self, value: Quant) -> String {
		value.rounded(self.precision.min(2)).to_string()
	}

	/// Prints the full per-sale ledger, one row per matched lot slice.
	pub fn print_ledger(&self) {
		if self.report.records.is_empty() {
			println!("No sales processed");
			return;
		}

		let mut table = Table::new(11);
		table.right_align(vec![2, 3, 5, 7, 8, 9]);
		table.add_header(vec![
			"Sold",
			"Asset",
			"Qty",
			"Proceeds",
			"Bought",
			"Held",
			"LT",
			"Cost",
			"G/L",
			"Taxable",
			"Notes",
		]);
		table.add_separator();

		for r in &self.report.records {
			table.add_row(vec![
				format_compact(&r.sale_date),
				r.symbol.clone(),
				r.units.to_string(),
				self.money(r.proceeds),
				match &r.buy_date {
					Some(date) => format_compact(date),
					None => "N/A".to_string(),
				},
				format!("{}d", r.days_held),
				(if r.long_term_eligible { "*" } else { "" }).to_string(),
				self.money(r.cost_basis),
				self.money(r.capital_gain_loss),
				self.money(r.taxable_gain),
				r.warning_text(),
			]);
		}

		table.add_separator();
		let mut total_row = vec![String::new(); 11];
		total_row[8] = self.money(self.report.portfolio.capital_gain_loss);
		total_row[9] = self.money(self.report.portfolio.taxable_gain);
		table.add_row(total_row);

		table.print();
	}

	/// Prints per-symbol totals and the portfolio rollup.
	pub fn print_summary(&self) {
		if self.report.symbol_totals.is_empty() {
			println!("No sales processed");
			return;
		}

		let mut table = Table::new(6);
		table.right_align(vec![1, 2, 3, 4, 5]);
		table.add_header(vec![
			"Asset", "Qty", "Proceeds", "Cost", "G/L", "Taxable",
		]);
		table.add_separator();

		for (symbol, totals) in &self.report.symbol_totals {
			table.add_row(vec![
				symbol.clone(),
				totals.units_sold.to_string(),
				self.money(totals.proceeds),
				self.money(totals.cost_basis),
				self.money(totals.capital_gain_loss),
				self.money(totals.taxable_gain),
			]);
		}

		table.print();

		println!();
		println!(
			"Total capital gain/loss: {}",
			self.money(self.report.portfolio.capital_gain_loss)
		);
		println!(
			"Total taxable gain:      {}",
			self.money(self.report.portfolio.taxable_gain)
		);
		println!(
			"Discounted gains (pre):  {}",
			self.money(self.report.portfolio.discount_eligible_gain)
		);
	}

	/// Prints warnings and rejections, if any. Returns how many events
	/// were rejected, so `check` can fail the process on bad input.
	pub fn print_problems(&self) -> usize {
		if !self.report.warnings.is_empty() {
			println!();
			println!("Warnings:");
			for warning in &self.report.warnings {
				println!("  {}", warning);
			}
		}

		if !self.report.rejections.is_empty() {
			println!();
			println!("Rejected events:");
			for rejection in &self.report.rejections {
				println!("  {}", rejection);
			}
		}

		self.report.rejections.len()
	}
}
