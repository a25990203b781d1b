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
use crate::cgt::gain::{self, DiscountRule};
use crate::cgt::holding::HoldingRule;
use crate::cgt::ledger::{CgtLedger, LedgerReport};
use crate::cgt::lot::Lot;
use crate::cgt::pool::LotPool;
use crate::cgt::sale::SaleEvent;
use crate::cgt::selector::{self, MatchPolicy};
use crate::util::date::format_compact;
use crate::util::quant::Quant;

/// The full set of jurisdiction and matching configuration one run
/// operates under.
#[derive(Clone, Copy, Debug)]
pub struct Rules {
	pub holding: HoldingRule,
	pub discount: DiscountRule,
	pub policy: MatchPolicy,
	pub epsilon: Quant,
}

impl Default for Rules {
	fn default() -> Self {
		Self {
			holding: HoldingRule::default(),
			discount: DiscountRule::default(),
			policy: MatchPolicy::default(),
			epsilon: Quant::new(1, 2),
		}
	}
}

/// Owns the pool and ledger for one run and drives each event through
/// selection and gain computation. Produces structured results only;
/// narration is the reports' business.
///
/// Events must arrive in the order the caller wants them applied,
/// normally chronological, because each sale mutates the lot state the
/// next sale of that symbol sees.
pub struct Calculator {
	pool: LotPool,
	rules: Rules,
	ledger: CgtLedger,
}

impl Calculator {
	pub fn new(pool: LotPool, rules: Rules) -> Self {
		Self {
			pool,
			rules,
			ledger: CgtLedger::new(),
		}
	}

	/// Ingests a purchase as a fresh lot.
	pub fn buy(&mut self, lot: Lot) {
		self.pool.add_lot(lot);
	}

	/// Processes one sale. A structurally bad event, or one whose
	/// matched lot postdates the sale, is rejected and noted; the run
	/// continues. A sale with no basis on record still produces its
	/// (synthetic, warned) gain record.
	pub fn sell(&mut self, event: &SaleEvent) {
		if let Err(e) = event.validate() {
			self.ledger.reject(format!(
				"rejected sale on {}: {}",
				format_compact(&event.sale_date),
				e
			));
			return;
		}

		let (allocations, unmet) = match self.pool.entry_mut(&event.symbol) {
			None => (Vec::new(), event.units_sold),
			Some(lots) => {
				match selector::select(
					lots,
					event.units_sold,
					&event.sale_date,
					&self.rules.holding,
					self.rules.policy,
					self.rules.epsilon,
				) {
					Ok(result) => result,
					Err(e) => {
						self.ledger.reject(format!(
							"rejected sale of {} on {}: {}",
							event.symbol,
							format_compact(&event.sale_date),
							e
						));
						return;
					},
				}
			},
		};

		let records =
			gain::compute(event, &allocations, unmet, &self.rules.discount);
		self.ledger.append(records);
	}

	/// Compacts the pool and closes the ledger. The returned pool is
	/// the snapshot for the next run.
	pub fn finish(mut self) -> (LotPool, LedgerReport) {
		self.pool.compact(self.rules.epsilon);
		(self.pool, self.ledger.finalize())
	}
}
