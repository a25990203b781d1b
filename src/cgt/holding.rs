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
use anyhow::{bail, Error};
use chrono::NaiveDate;
use serde::Deserialize;

/// Whether the long-term boundary itself counts as long-term. Both
/// readings exist across jurisdictions (and across the broker exports
/// this tool grew up on), so it is an explicit choice, not a constant.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
	/// days held >= threshold
	#[default]
	Gte,
	/// days held > threshold
	Gt,
}

/// The jurisdiction's holding-period rule: how many days of holding
/// make a sale long-term, and how the boundary is treated.
#[derive(Clone, Copy, Debug)]
pub struct HoldingRule {
	pub threshold_days: i64,
	pub comparison: Comparison,
}

impl Default for HoldingRule {
	fn default() -> Self {
		Self {
			threshold_days: 365,
			comparison: Comparison::Gte,
		}
	}
}

impl HoldingRule {
	/// Reports whole days held and whether the holding qualifies as
	/// long-term. Fails when the sale predates the purchase; that is
	/// corrupt input for the caller to surface, not to clamp.
	pub fn classify(
		&self,
		purchase_date: &NaiveDate,
		sale_date: &NaiveDate,
	) -> Result<(i64, bool), Error> {
		let days_held = (*sale_date - *purchase_date).num_days();
		if days_held < 0 {
			bail!(
				"sale on {} predates purchase on {}",
				sale_date,
				purchase_date
			);
		}

		let long_term = match self.comparison {
			Comparison::Gte => days_held >= self.threshold_days,
			Comparison::Gt => days_held > self.threshold_days,
		};

		Ok((days_held, long_term))
	}
}
