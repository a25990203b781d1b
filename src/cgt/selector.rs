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
use crate::cgt::holding::HoldingRule;
use crate::cgt::lot::Lot;
use crate::util::quant::Quant;
use anyhow::{bail, Error};
use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Ordering;

/// The order in which lots within a holding-period bucket are consumed.
/// A pure ordering; the consumption loop is identical for every policy,
/// so alternates substitute without touching pool or ledger code.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
	/// Highest unit price first, minimizing the recognized gain.
	#[default]
	TaxOptimal,
	/// Oldest purchase first.
	Fifo,
	/// Newest purchase first.
	Lifo,
	/// Lowest unit price first, maximizing the recognized gain.
	LowCost,
}

impl MatchPolicy {
	pub fn from_name(name: &str) -> Result<Self, Error> {
		match name {
			"tax-optimal" => Ok(Self::TaxOptimal),
			"fifo" => Ok(Self::Fifo),
			"lifo" => Ok(Self::Lifo),
			"low-cost" => Ok(Self::LowCost),
			_ => bail!("Unknown matching policy: {}", name),
		}
	}

	fn order(&self, a: &Lot, b: &Lot) -> Ordering {
		match self {
			Self::TaxOptimal => b.unit_price.cmp(&a.unit_price),
			Self::Fifo => a.purchase_date.cmp(&b.purchase_date),
			Self::Lifo => b.purchase_date.cmp(&a.purchase_date),
			Self::LowCost => a.unit_price.cmp(&b.unit_price),
		}
	}
}

/// One slice of a sale matched against one lot. Bridges the selector
/// and the gain calculator, then is discarded. `lot_units_before` is
/// the lot's remaining quantity captured at allocation time, which is
/// the divisor for the proportional buy commission.
#[derive(Clone, Debug)]
pub struct Allocation {
	pub units_taken: Quant,
	pub unit_price: Quant,
	pub commission_total: Quant,
	pub lot_units_before: Quant,
	pub purchase_date: NaiveDate,
	pub days_held: i64,
	pub long_term: bool,
}

/// Selects lots to cover `units_needed` on `sale_date`, two passes:
/// every live long-term lot is eligible before any short-term lot is
/// touched, and within each bucket the policy fixes the order. Equal
/// keys keep original pool order (the sorts are stable), so output is
/// deterministic. Consumed lots are decremented in place.
///
/// Returns the allocations in consumption order plus whatever quantity
/// could not be covered.
pub fn select(
	lots: &mut [Lot],
	units_needed: Quant,
	sale_date: &NaiveDate,
	rule: &HoldingRule,
	policy: MatchPolicy,
	epsilon: Quant,
) -> Result<(Vec<Allocation>, Quant), Error> {
	if units_needed.is_zero() {
		return Ok((Vec::new(), Quant::zero()));
	}

	struct Candidate {
		index: usize,
		days_held: i64,
		long_term: bool,
	}

	let mut long_term: Vec<Candidate> = Vec::new();
	let mut short_term: Vec<Candidate> = Vec::new();

	for (index, lot) in lots.iter().enumerate() {
		if !lot.is_live(epsilon) {
			continue;
		}

		let (days_held, is_long) =
			rule.classify(&lot.purchase_date, sale_date)?;

		let candidate = Candidate {
			index,
			days_held,
			long_term: is_long,
		};
		if is_long {
			long_term.push(candidate);
		} else {
			short_term.push(candidate);
		}
	}

	long_term.sort_by(|a, b| policy.order(&lots[a.index], &lots[b.index]));
	short_term.sort_by(|a, b| policy.order(&lots[a.index], &lots[b.index]));

	let mut allocations = Vec::new();
	let mut remaining = units_needed;

	for candidate in long_term.into_iter().chain(short_term) {
		if !remaining.is_positive() {
			break;
		}

		let lot = &mut lots[candidate.index];
		let units_taken = remaining.min(lot.units);

		allocations.push(Allocation {
			units_taken,
			unit_price: lot.unit_price,
			commission_total: lot.commission,
			lot_units_before: lot.units,
			purchase_date: lot.purchase_date,
			days_held: candidate.days_held,
			long_term: candidate.long_term,
		});

		lot.units -= units_taken;
		remaining -= units_taken;
	}

	Ok((allocations, remaining))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn date(s: &str) -> NaiveDate {
		NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
	}

	fn lot(units: i128, price: i128, bought: &str) -> Lot {
		Lot {
			symbol: "BHP".to_string(),
			units: Quant::from_i128(units),
			unit_price: Quant::from_i128(price),
			commission: Quant::zero(),
			purchase_date: date(bought),
		}
	}

	fn run(
		lots: &mut [Lot],
		units: i128,
		sale_date: &str,
		policy: MatchPolicy,
	) -> (Vec<Allocation>, Quant) {
		select(
			lots,
			Quant::from_i128(units),
			&date(sale_date),
			&HoldingRule::default(),
			policy,
			Quant::from_str("0.01").unwrap(),
		)
		.unwrap()
	}

	#[test]
	fn test_zero_needed_is_empty() {
		let mut lots = vec![lot(100, 10, "2023-01-01")];
		let (allocations, unmet) =
			run(&mut lots, 0, "2024-06-01", MatchPolicy::TaxOptimal);
		assert!(allocations.is_empty());
		assert!(unmet.is_zero());
		assert_eq!(lots[0].units, Quant::from_i128(100));
	}

	#[test]
	fn test_empty_pool_entry_is_all_unmet() {
		let mut lots: Vec<Lot> = vec![];
		let (allocations, unmet) =
			run(&mut lots, 40, "2024-06-01", MatchPolicy::TaxOptimal);
		assert!(allocations.is_empty());
		assert_eq!(unmet, Quant::from_i128(40));
	}

	#[test]
	fn test_long_term_consumed_before_short_term() {
		// short-term lot is pricier, but long-term still goes first
		let mut lots = vec![
			lot(50, 12, "2024-01-01"), // short-term
			lot(50, 8, "2023-01-01"),  // long-term
		];
		let (allocations, unmet) =
			run(&mut lots, 70, "2024-06-01", MatchPolicy::TaxOptimal);

		assert!(unmet.is_zero());
		assert_eq!(allocations.len(), 2);

		assert!(allocations[0].long_term);
		assert_eq!(allocations[0].units_taken, Quant::from_i128(50));
		assert_eq!(allocations[0].unit_price, Quant::from_i128(8));

		assert!(!allocations[1].long_term);
		assert_eq!(allocations[1].units_taken, Quant::from_i128(20));
		assert_eq!(allocations[1].unit_price, Quant::from_i128(12));

		// pool decremented in place
		assert_eq!(lots[0].units, Quant::from_i128(30));
		assert!(lots[1].units.is_zero());
	}

	#[test]
	fn test_highest_cost_first_within_bucket() {
		let mut lots = vec![
			lot(10, 5, "2022-01-01"),
			lot(10, 20, "2022-06-01"),
			lot(10, 10, "2022-03-01"),
		];
		let (allocations, _) =
			run(&mut lots, 25, "2024-06-01", MatchPolicy::TaxOptimal);

		let prices: Vec<Quant> =
			allocations.iter().map(|a| a.unit_price).collect();
		assert_eq!(
			prices,
			vec![
				Quant::from_i128(20),
				Quant::from_i128(10),
				Quant::from_i128(5)
			]
		);
		assert_eq!(allocations[2].units_taken, Quant::from_i128(5));
	}

	#[test]
	fn test_equal_prices_keep_pool_order() {
		let mut lots = vec![
			lot(10, 10, "2022-05-01"),
			lot(10, 10, "2022-01-01"),
			lot(10, 10, "2022-03-01"),
		];
		let (allocations, _) =
			run(&mut lots, 30, "2024-06-01", MatchPolicy::TaxOptimal);

		let dates: Vec<NaiveDate> =
			allocations.iter().map(|a| a.purchase_date).collect();
		assert_eq!(
			dates,
			vec![date("2022-05-01"), date("2022-01-01"), date("2022-03-01")]
		);
	}

	#[test]
	fn test_shortfall_reported() {
		let mut lots = vec![
			lot(20, 10, "2023-01-01"),
			lot(10, 10, "2024-03-01"),
		];
		let (allocations, unmet) =
			run(&mut lots, 50, "2024-06-01", MatchPolicy::TaxOptimal);

		let taken: Quant = allocations.iter().map(|a| a.units_taken).sum();
		assert_eq!(taken, Quant::from_i128(30));
		assert_eq!(unmet, Quant::from_i128(20));
	}

	#[test]
	fn test_dead_lot_excluded() {
		let mut lots = vec![
			Lot {
				units: Quant::from_str("0.005").unwrap(),
				..lot(0, 99, "2022-01-01")
			},
			lot(10, 10, "2023-01-01"),
		];
		let (allocations, unmet) =
			run(&mut lots, 5, "2024-06-01", MatchPolicy::TaxOptimal);

		assert!(unmet.is_zero());
		assert_eq!(allocations.len(), 1);
		assert_eq!(allocations[0].unit_price, Quant::from_i128(10));
	}

	#[test]
	fn test_fifo_policy_orders_by_age() {
		let mut lots = vec![
			lot(10, 20, "2023-03-01"),
			lot(10, 5, "2023-01-01"),
		];
		let (allocations, _) =
			run(&mut lots, 15, "2024-06-01", MatchPolicy::Fifo);

		assert_eq!(allocations[0].purchase_date, date("2023-01-01"));
		assert_eq!(allocations[0].units_taken, Quant::from_i128(10));
		assert_eq!(allocations[1].purchase_date, date("2023-03-01"));
		assert_eq!(allocations[1].units_taken, Quant::from_i128(5));
	}

	#[test]
	fn test_lifo_policy_orders_by_recency() {
		let mut lots = vec![
			lot(10, 5, "2023-01-01"),
			lot(10, 20, "2023-03-01"),
		];
		let (allocations, _) =
			run(&mut lots, 5, "2024-06-01", MatchPolicy::Lifo);
		assert_eq!(allocations[0].purchase_date, date("2023-03-01"));
	}

	#[test]
	fn test_low_cost_policy_orders_ascending() {
		let mut lots = vec![
			lot(10, 20, "2022-01-01"),
			lot(10, 5, "2022-03-01"),
		];
		let (allocations, _) =
			run(&mut lots, 5, "2024-06-01", MatchPolicy::LowCost);
		assert_eq!(allocations[0].unit_price, Quant::from_i128(5));
	}

	#[test]
	fn test_purchase_after_sale_fails() {
		let mut lots = vec![lot(10, 10, "2024-12-01")];
		let result = select(
			&mut lots,
			Quant::from_i128(5),
			&date("2024-06-01"),
			&HoldingRule::default(),
			MatchPolicy::TaxOptimal,
			Quant::from_str("0.01").unwrap(),
		);
		assert!(result.is_err());
		// nothing consumed on failure
		assert_eq!(lots[0].units, Quant::from_i128(10));
	}

	#[test]
	fn test_allocation_captures_units_before_decrement() {
		let mut lots = vec![lot(100, 10, "2023-01-01")];
		let (allocations, _) =
			run(&mut lots, 60, "2024-06-01", MatchPolicy::TaxOptimal);
		assert_eq!(allocations[0].lot_units_before, Quant::from_i128(100));
		assert_eq!(lots[0].units, Quant::from_i128(40));
	}

	#[test]
	fn test_policy_names() {
		assert_eq!(
			MatchPolicy::from_name("tax-optimal").unwrap(),
			MatchPolicy::TaxOptimal
		);
		assert_eq!(MatchPolicy::from_name("fifo").unwrap(), MatchPolicy::Fifo);
		assert!(MatchPolicy::from_name("hifo").is_err());
	}
}
