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
use crate::cgt::pool::LotPool;
use crate::reports::table::Table;
use crate::util::date::format_compact;

/// Renders the open lots remaining after a run, symbol by symbol in
/// the pool's own order.
pub struct PoolReporter {
	pool: LotPool,
	precision: u32,
}

impl PoolReporter {
	pub fn new(pool: LotPool, precision: u32) -> Self {
		Self { pool, precision }
	}

	pub fn print(&self) {
		if self.pool.is_empty() {
			println!("No open lots");
			return;
		}

		let precision = self.precision.min(2);

		let mut table = Table::new(5);
		table.right_align(vec![1, 2, 3]);
		table.add_header(vec![
			"Asset",
			"Qty",
			"Unit Cost",
			"Commission",
			"Acquired",
		]);
		table.add_separator();

		for (symbol, lots) in self.pool.iter() {
			for lot in lots {
				table.add_row(vec![
					symbol.clone(),
					lot.units.to_string(),
					lot.unit_price.rounded(precision).to_string(),
					lot.commission.rounded(precision).to_string(),
					format_compact(&lot.purchase_date),
				]);
			}
		}

		table.print();
	}
}
