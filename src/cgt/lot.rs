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
use chrono::NaiveDate;

/// A discrete batch of a security purchased in a single transaction,
/// still wholly or partly on the books. Selection against sales only
/// ever decreases `units`; the recorded commission is the full amount
/// paid for the original purchase and never changes, with proportional
/// shares derived at allocation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lot {
	pub symbol: String,
	pub units: Quant,
	pub unit_price: Quant,
	pub commission: Quant,
	pub purchase_date: NaiveDate,
}

impl Lot {
	/// A lot whose units have been consumed down to the dust threshold
	/// is dead: excluded from selection and removed on compaction.
	pub fn is_live(&self, epsilon: Quant) -> bool {
		self.units > epsilon
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lot(units: &str) -> Lot {
		Lot {
			symbol: "CSL".to_string(),
			units: Quant::from_str(units).unwrap(),
			unit_price: Quant::from_i128(10),
			commission: Quant::zero(),
			purchase_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
		}
	}

	#[test]
	fn test_liveness_threshold() {
		let eps = Quant::from_str("0.01").unwrap();
		assert!(lot("5").is_live(eps));
		assert!(!lot("0.01").is_live(eps));
		assert!(!lot("0").is_live(eps));
		assert!(lot("0.011").is_live(eps));
	}
}
