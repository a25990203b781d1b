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

/// The formats cost-basis snapshots and broker exports actually arrive
/// in. Compact day-first forms come first because snapshots written by
/// this tool use them.
const FORMATS: [&str; 4] = ["%d.%m.%y", "%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Parses a date in any supported format.
pub fn parse_flexible(input: &str) -> Result<NaiveDate, Error> {
	let trimmed = input.trim();
	for format in FORMATS {
		if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
			return Ok(date);
		}
	}
	bail!("Unrecognized date: {}", input)
}

/// Renders a date in the compact DD.MM.YY form used by snapshots and
/// reports.
pub fn format_compact(date: &NaiveDate) -> String {
	date.format("%d.%m.%y").to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_compact() {
		let date = parse_flexible("15.03.24").unwrap();
		assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
	}

	#[test]
	fn test_parse_iso() {
		let date = parse_flexible("2023-01-01").unwrap();
		assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
	}

	#[test]
	fn test_parse_four_digit_year_variants() {
		let a = parse_flexible("15.03.2024").unwrap();
		let b = parse_flexible("15/03/2024").unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn test_parse_trims_whitespace() {
		assert!(parse_flexible(" 2024-06-01 ").is_ok());
	}

	#[test]
	fn test_parse_rejects_garbage() {
		assert!(parse_flexible("not a date").is_err());
		assert!(parse_flexible("32.13.24").is_err());
		assert!(parse_flexible("").is_err());
	}

	#[test]
	fn test_format_round_trip() {
		let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		let compact = format_compact(&date);
		assert_eq!(compact, "01.06.24");
		assert_eq!(parse_flexible(&compact).unwrap(), date);
	}
}
