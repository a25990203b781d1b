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
use crate::cgt::calculator::Rules;
use crate::cgt::gain::DiscountRule;
use crate::cgt::holding::{Comparison, HoldingRule};
use crate::cgt::selector::MatchPolicy;
use crate::util::quant::Quant;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	pub rules: Option<RulesSection>,
}

/// The jurisdiction section of the config file. Every key is optional;
/// anything unset falls back to the Australian defaults.
#[derive(Debug, Default, Deserialize)]
pub struct RulesSection {
	pub threshold_days: Option<i64>,
	pub comparison: Option<Comparison>,
	pub discount: Option<Quant>,
	pub policy: Option<MatchPolicy>,
	pub epsilon: Option<Quant>,
}

impl Config {
	/// Assembles the run's rules from defaults overlaid with whatever
	/// the file specifies.
	pub fn rules(&self) -> Rules {
		let mut rules = Rules::default();

		if let Some(section) = &self.rules {
			if let Some(days) = section.threshold_days {
				rules.holding.threshold_days = days;
			}
			if let Some(comparison) = section.comparison {
				rules.holding.comparison = comparison;
			}
			if let Some(fraction) = section.discount {
				rules.discount = DiscountRule { fraction };
			}
			if let Some(policy) = section.policy {
				rules.policy = policy;
			}
			if let Some(epsilon) = section.epsilon {
				rules.epsilon = epsilon;
			}
		}

		rules
	}
}
