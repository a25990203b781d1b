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
use crate::util::quant::Quant;
use anyhow::{bail, Error};
use chrono::NaiveDate;

/// One disposal of a security, as normalized by ingestion. Consumed
/// once; the engine never mutates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleEvent {
	pub symbol: String,
	pub sale_date: NaiveDate,
	pub units_sold: Quant,
	pub sale_price_per_unit: Quant,
	pub sale_commission: Quant,
	pub total_proceeds: Quant,
}

impl SaleEvent {
	/// Structural checks applied before an event may enter selection.
	/// Failures here reject the single event, never the run.
	pub fn validate(&self) -> Result<(), Error> {
		if self.symbol.trim().is_empty() {
			bail!("sale event has no symbol");
		}
		if !self.units_sold.is_positive() {
			bail!(
				"sale of {} has non-positive quantity {}",
				self.symbol,
				self.units_sold
			);
		}
		Ok(())
	}

	/// Proceeds as reported, or derived from the unit price when the
	/// export carried none.
	pub fn proceeds(&self) -> Quant {
		if self.total_proceeds.is_zero() {
			self.units_sold * self.sale_price_per_unit
		} else {
			self.total_proceeds
		}
	}
}
