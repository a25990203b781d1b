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
use crate::util::quant::Quant;
use std::collections::BTreeMap;

/// All open lots, keyed by symbol, in acquisition-entry order within a
/// symbol. Owned exclusively by the calculator for the duration of a
/// run: loaded from a snapshot, consumed against sales, handed back
/// for the next run. Total remaining units per symbol never increase
/// except by ingesting a buy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LotPool {
	entries: BTreeMap<String, Vec<Lot>>,
}

impl LotPool {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_lot(&mut self, lot: Lot) {
		self.entries.entry(lot.symbol.clone()).or_default().push(lot);
	}

	pub fn entry_mut(&mut self, symbol: &str) -> Option<&mut Vec<Lot>> {
		self.entries.get_mut(symbol)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Lot>)> {
		self.entries.iter()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn total_units(&self, symbol: &str) -> Quant {
		self.entries
			.get(symbol)
			.map(|lots| lots.iter().map(|lot| lot.units).sum())
			.unwrap_or_else(Quant::zero)
	}

	/// Drops lots consumed down to the dust threshold, and symbols left
	/// with no lots at all. Run once after processing; running it per
	/// event produces the same final state.
	pub fn compact(&mut self, epsilon: Quant) {
		for lots in self.entries.values_mut() {
			lots.retain(|lot| lot.is_live(epsilon));
		}
		self.entries.retain(|_, lots| !lots.is_empty());
	}
}
