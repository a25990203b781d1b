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
use crate::cgt::pool::LotPool;
use crate::util::date::{format_compact, parse_flexible};
use crate::util::quant::Quant;
use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

/// One open purchase as it appears in a cost-basis snapshot file. The
/// file maps symbol to a list of these; the shape written out is the
/// shape read in, so a run's output seeds the next run.
#[derive(Debug, Deserialize, Serialize)]
pub struct SnapshotRecord {
	pub units: Quant,
	pub price: Quant,
	pub commission: Quant,
	pub date: String,
}

pub fn load(path: &str) -> Result<LotPool, Error> {
	let content = fs::read_to_string(path)
		.map_err(|e| anyhow!("failed to read pool snapshot {}: {}", path, e))?;
	from_json(&content)
}

pub fn save(pool: &LotPool, path: &str) -> Result<(), Error> {
	let content = to_json(pool)?;
	fs::write(path, content + "\n")
		.map_err(|e| anyhow!("failed to write pool snapshot {}: {}", path, e))
}

pub fn from_json(content: &str) -> Result<LotPool, Error> {
	let raw: BTreeMap<String, Vec<SnapshotRecord>> =
		serde_json::from_str(content)?;

	let mut pool = LotPool::new();
	for (symbol, records) in raw {
		for record in records {
			pool.add_lot(Lot {
				symbol: symbol.clone(),
				units: record.units,
				unit_price: record.price,
				commission: record.commission,
				purchase_date: parse_flexible(&record.date)?,
			});
		}
	}

	Ok(pool)
}

pub fn to_json(pool: &LotPool) -> Result<String, Error> {
	let mut raw: BTreeMap<&String, Vec<SnapshotRecord>> = BTreeMap::new();
	for (symbol, lots) in pool.iter() {
		let records = lots
			.iter()
			.map(|lot| SnapshotRecord {
				units: lot.units,
				price: lot.unit_price,
				commission: lot.commission,
				date: format_compact(&lot.purchase_date),
			})
			.collect();
		raw.insert(symbol, records);
	}

	Ok(serde_json::to_string_pretty(&raw)?)
}
