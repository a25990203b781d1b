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
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A rational number backed by a fraction of u128s, precise far beyond
/// what unit counts or money require. Proportional splits of proceeds
/// and commissions are exact here; floating point appears only at the
/// JSON boundary, where snapshots store plain numbers.
///
/// Automatically simplifies its underlying fractional representation.
#[derive(Clone, Copy, Debug)]
pub struct Quant {
	numerator: u128,
	denominator: u128,

	/// Is always zero if the numerator is zero, else is intuitive.
	is_negative: bool,

	/// How many decimal places to render when asked to print. Will round
	/// with banker's rounding when underlying precision exceeds what is
	/// requested. Has no effect on the underlying fraction.
	render_precision: u32,
}

impl Default for Quant {
	fn default() -> Self {
		Self::zero()
	}
}

impl Quant {
	pub fn zero() -> Self {
		Self {
			numerator: 0,
			denominator: 1,
			render_precision: 0,
			is_negative: false,
		}
	}

	/// Creates a new Quant with the given numerator and the denominator
	/// set at 10^exp, as though inserting a decimal point that many
	/// places from the right. Render precision is set to match.
	pub fn new(numerator: i128, exp: u32) -> Self {
		let mut out = Self {
			numerator: numerator.unsigned_abs(),
			denominator: 10u128.pow(exp),
			render_precision: exp,
			is_negative: numerator < 0,
		};
		out.reduce();
		out
	}

	pub fn from_i128(amount: i128) -> Self {
		Self {
			numerator: amount.unsigned_abs(),
			denominator: 1,
			render_precision: 0,
			is_negative: amount < 0,
		}
	}

	pub fn from_str(input: &str) -> Result<Self, Error> {
		let is_negative = input.starts_with('-');
		let sanitized = input.trim_start_matches('-');

		let parts: Vec<&str> = sanitized.split('.').collect();
		let mut precision = 0u32;

		let (numerator, denominator) = match parts.len() {
			1 => (parts[0].parse::<u128>()?, 1),
			2 => {
				let whole = parts[0].parse::<u128>()?;
				let decimal = parts[1];
				precision = decimal.len() as u32;
				let scale = 10u128.pow(precision);
				let fractional = decimal.parse::<u128>()?;
				let numerator = whole * scale + fractional;
				(numerator, scale)
			},
			_ => bail!("Invalid decimal format"),
		};

		let mut out = Self {
			numerator,
			denominator,
			render_precision: precision,
			is_negative: is_negative && numerator > 0,
		};
		out.reduce();
		Ok(out)
	}

	/// Accepts a finite float by way of its shortest decimal rendering,
	/// which is how snapshot numbers arrive from JSON.
	pub fn from_f64(value: f64) -> Result<Self, Error> {
		if !value.is_finite() {
			bail!("Number must be finite");
		}
		Self::from_str(&format!("{}", value))
	}

	/// Lossy conversion for the JSON boundary only.
	pub fn to_f64(&self) -> f64 {
		let magnitude = self.numerator as f64 / self.denominator as f64;
		if self.is_negative {
			-magnitude
		} else {
			magnitude
		}
	}

	pub fn is_zero(&self) -> bool {
		self.numerator == 0
	}

	pub fn is_positive(&self) -> bool {
		self.numerator > 0 && !self.is_negative
	}

	pub fn abs(&self) -> Self {
		Self {
			is_negative: false,
			..*self
		}
	}

	pub fn min(self, other: Self) -> Self {
		if self <= other {
			self
		} else {
			other
		}
	}

	/// Returns a copy rounded off to the given number of decimal places,
	/// with that many places rendered. Uses Banker's rounding (rounds to
	/// nearest, ties to even).
	pub fn rounded(&self, decimal_places: u32) -> Self {
		let scale = 10u128.pow(decimal_places);
		let scaled_numerator = self.numerator * scale;
		let quotient = scaled_numerator / self.denominator;
		let remainder = scaled_numerator % self.denominator;

		let half_denom = (self.denominator + 1) / 2;
		let rounded_quotient = if remainder > half_denom
			|| (remainder == half_denom && quotient % 2 != 0)
		{
			quotient + 1
		} else {
			quotient
		};

		let mut out = Self {
			numerator: rounded_quotient,
			denominator: scale,
			render_precision: decimal_places,
			is_negative: self.is_negative && rounded_quotient > 0,
		};
		out.reduce();
		out
	}

	/// Reduces the underlying fraction as much as possible while still
	/// representing the same value. Called after every operation that
	/// affects the fraction, to guard against overflow.
	fn reduce(&mut self) {
		let gcd = Self::gcd(self.numerator, self.denominator);
		self.numerator /= gcd;
		self.denominator /= gcd;
	}

	/// Euclid's algorithm for greatest common divisor
	fn gcd(mut a: u128, mut b: u128) -> u128 {
		while b != 0 {
			let temp = b;
			b = a % b;
			a = temp;
		}
		a
	}

	fn recip(&self) -> Self {
		if self.numerator == 0 {
			panic!("Attempt to divide by zero");
		}
		Self {
			numerator: self.denominator,
			denominator: self.numerator,
			..*self
		}
	}
}

impl fmt::Display for Quant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut numerator = self.numerator;
		let denominator = self.denominator;

		let integer_part = numerator / denominator;
		numerator %= denominator;

		let mut fraction_str = String::new();
		let mut remainder = numerator;
		let precision = f.precision().unwrap_or(self.render_precision as usize);
		for _ in 0..precision {
			remainder *= 10;
			let digit = remainder / denominator;
			remainder %= denominator;
			fraction_str.push(std::char::from_digit(digit as u32, 10).unwrap());
			if remainder == 0 {
				break;
			}
		}

		if fraction_str.len() < self.render_precision as usize {
			let zeros_to_add =
				self.render_precision as usize - fraction_str.len();
			fraction_str.push_str(&"0".repeat(zeros_to_add));
		}

		while fraction_str.ends_with('0')
			&& fraction_str.len() > self.render_precision as usize
		{
			fraction_str.pop();
		}

		let formatted = if fraction_str.is_empty() {
			integer_part.to_string()
		} else {
			format!("{}.{}", integer_part, fraction_str)
		};

		if self.is_negative {
			write!(f, "-{}", formatted)
		} else {
			write!(f, "{}", formatted)
		}
	}
}

impl Serialize for Quant {
	fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
		s.serialize_f64(self.to_f64())
	}
}

struct QuantVisitor;

impl Visitor<'_> for QuantVisitor {
	type Value = Quant;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "a number or a decimal string")
	}

	fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Quant, E> {
		Quant::from_f64(v).map_err(E::custom)
	}

	fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Quant, E> {
		Ok(Quant::from_i128(v as i128))
	}

	fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Quant, E> {
		Ok(Quant::from_i128(v as i128))
	}

	fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Quant, E> {
		Quant::from_str(v).map_err(E::custom)
	}
}

impl<'de> Deserialize<'de> for Quant {
	fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
		d.deserialize_any(QuantVisitor)
	}
}

// -----------------
// -- BOILERPLATE --
// -----------------

impl Add for Quant {
	type Output = Self;

	fn add(self, rhs: Self) -> Self::Output {
		if self.numerator == 0 {
			return rhs;
		}
		if rhs.numerator == 0 {
			return self;
		}

		let gcd = Self::gcd(self.denominator, rhs.denominator);
		let lcm = self.denominator / gcd * rhs.denominator;

		let term_a = self.numerator * (lcm / self.denominator);
		let term_b = rhs.numerator * (lcm / rhs.denominator);

		let (numerator, result_is_negative) =
			match (self.is_negative, rhs.is_negative) {
				(true, true) => (term_a + term_b, true),
				(false, false) => (term_a + term_b, false),
				(true, false) => {
					if term_a > term_b {
						(term_a - term_b, true)
					} else {
						(term_b - term_a, false)
					}
				},
				(false, true) => {
					if term_a > term_b {
						(term_a - term_b, false)
					} else {
						(term_b - term_a, true)
					}
				},
			};

		let mut out = Self {
			numerator,
			denominator: lcm,
			render_precision: self.render_precision.max(rhs.render_precision),
			is_negative: result_is_negative && numerator > 0,
		};
		out.reduce();
		out
	}
}

impl AddAssign for Quant {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl Sum for Quant {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Quant::zero(), |acc, quant| acc + quant)
	}
}

impl Sub for Quant {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self::Output {
		self + (-rhs)
	}
}

impl SubAssign for Quant {
	fn sub_assign(&mut self, rhs: Self) {
		*self = *self - rhs;
	}
}

impl Mul for Quant {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self::Output {
		// cross-reduce first to limit overflow risk
		let gcd_self = Self::gcd(self.numerator, rhs.denominator);
		let gcd_rhs = Self::gcd(rhs.numerator, self.denominator);

		let numerator = (self.numerator / gcd_self) * (rhs.numerator / gcd_rhs);
		let denominator =
			(self.denominator / gcd_rhs) * (rhs.denominator / gcd_self);

		let is_negative = numerator > 0 && (self.is_negative ^ rhs.is_negative);

		let mut out = Self {
			numerator,
			denominator,
			is_negative,
			render_precision: self.render_precision.max(rhs.render_precision),
		};
		out.reduce();
		out
	}
}

impl Div for Quant {
	type Output = Self;

	fn div(self, rhs: Self) -> Self::Output {
		self * rhs.recip()
	}
}

impl Neg for Quant {
	type Output = Self;

	fn neg(self) -> Self::Output {
		Self {
			is_negative: !self.is_negative && self.numerator > 0,
			..self
		}
	}
}

impl PartialEq for Quant {
	fn eq(&self, other: &Self) -> bool {
		self.numerator * other.denominator == other.numerator * self.denominator
			&& self.is_negative == other.is_negative
	}
}

impl Eq for Quant {}

impl PartialEq<i128> for Quant {
	fn eq(&self, &other: &i128) -> bool {
		self == &Quant::from_i128(other)
	}
}

impl PartialOrd for Quant {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialOrd<i128> for Quant {
	fn partial_cmp(&self, other: &i128) -> Option<Ordering> {
		Some(self.cmp(&Quant::from_i128(*other)))
	}
}

impl Ord for Quant {
	fn cmp(&self, other: &Self) -> Ordering {
		if self.numerator == 0 && other.numerator == 0 {
			return Ordering::Equal;
		}

		match (self.is_negative, other.is_negative) {
			(true, false) => return Ordering::Less,
			(false, true) => return Ordering::Greater,
			_ => {},
		};

		// limit overflow by reducing both in relation to each other
		let gcd = Self::gcd(self.denominator, other.denominator);
		let lcm = self.denominator / gcd * other.denominator;

		let left = self.numerator * (lcm / self.denominator);
		let right = other.numerator * (lcm / other.denominator);

		if self.is_negative {
			right.cmp(&left)
		} else {
			left.cmp(&right)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	mod creation {
		use super::*;

		#[test]
		fn test_new_reduces() {
			let q = Quant::new(1500, 2);
			assert_eq!(q, Quant::from_i128(15));
		}

		#[test]
		fn test_from_str_decimal() {
			let q = Quant::from_str("12.50").unwrap();
			assert_eq!(q, Quant::new(1250, 2));
			assert_eq!(q.to_string(), "12.50");
		}

		#[test]
		fn test_from_str_negative() {
			let q = Quant::from_str("-0.25").unwrap();
			assert_eq!(q, Quant::new(-25, 2));
			assert!(!q.is_positive());
		}

		#[test]
		fn test_from_str_rejects_garbage() {
			assert!(Quant::from_str("1.2.3").is_err());
			assert!(Quant::from_str("abc").is_err());
			assert!(Quant::from_str("").is_err());
		}

		#[test]
		fn test_from_f64_round_trips() {
			let q = Quant::from_f64(10.15).unwrap();
			assert_eq!(q, Quant::new(1015, 2));
			assert_eq!(Quant::from_f64(q.to_f64()).unwrap(), q);
		}

		#[test]
		fn test_from_f64_rejects_non_finite() {
			assert!(Quant::from_f64(f64::NAN).is_err());
			assert!(Quant::from_f64(f64::INFINITY).is_err());
		}
	}

	mod math {
		use super::*;

		#[test]
		fn test_add_sub() {
			let a = Quant::from_str("0.1").unwrap();
			let b = Quant::from_str("0.2").unwrap();
			assert_eq!(a + b, Quant::from_str("0.3").unwrap());
			assert_eq!(b - a, a);
		}

		#[test]
		fn test_sub_below_zero() {
			let a = Quant::from_i128(3);
			let b = Quant::from_i128(5);
			assert_eq!(a - b, Quant::from_i128(-2));
		}

		#[test]
		fn test_mul_div_exact_proportion() {
			// 20 units of a 60-unit sale against 900 of proceeds
			let proceeds = Quant::from_i128(900);
			let proportion = Quant::from_i128(20) / Quant::from_i128(60);
			assert_eq!(proceeds * proportion, Quant::from_i128(300));
		}

		#[test]
		fn test_sum() {
			let total: Quant = vec![
				Quant::from_i128(1),
				Quant::from_str("2.5").unwrap(),
				Quant::from_str("-0.5").unwrap(),
			]
			.into_iter()
			.sum();
			assert_eq!(total, Quant::from_i128(3));
		}

		#[test]
		fn test_neg_zero_stays_positive() {
			assert!(!(-Quant::zero()).is_positive());
			assert_eq!(-Quant::zero(), Quant::zero());
		}

		#[test]
		#[should_panic(expected = "Attempt to divide by zero")]
		fn test_div_zero_divisor() {
			let _ = Quant::from_i128(1) / Quant::zero();
		}
	}

	mod ordering {
		use super::*;

		#[test]
		fn test_cross_denominator_compare() {
			let a = Quant::from_str("2.5").unwrap();
			let b = Quant::new(10, 2); // 0.10
			assert!(a > b);
			assert!(b < a);
			assert_eq!(a, Quant::new(250, 2));
		}

		#[test]
		fn test_negative_ordering() {
			assert!(Quant::from_i128(-3) < Quant::from_i128(-2));
			assert!(Quant::from_i128(-1) < Quant::zero());
		}

		#[test]
		fn test_min() {
			let a = Quant::from_str("1.5").unwrap();
			let b = Quant::from_i128(2);
			assert_eq!(a.min(b), a);
			assert_eq!(b.min(a), a);
		}

		#[test]
		fn test_compare_against_i128() {
			let q = Quant::new(50, 1);
			assert!(q == 5);
			assert!(q < 6);
		}
	}

	mod rounding {
		use super::*;

		#[test]
		fn test_rounded_half_to_even() {
			let q = Quant::from_str("1.25").unwrap();
			assert_eq!(q.rounded(1), Quant::from_str("1.2").unwrap());
			let q = Quant::from_str("1.35").unwrap();
			assert_eq!(q.rounded(1), Quant::from_str("1.4").unwrap());
		}

		#[test]
		fn test_rounded_renders_trailing_zeros() {
			let q = Quant::from_i128(150).rounded(2);
			assert_eq!(q.to_string(), "150.00");
		}

		#[test]
		fn test_rounded_negative() {
			let q = Quant::from_str("-1.005").unwrap();
			assert_eq!(q.rounded(2), Quant::from_str("-1.00").unwrap());
		}
	}

	mod serde_bridge {
		use super::*;

		#[test]
		fn test_deserialize_number_and_string() {
			let q: Quant = serde_json::from_str("10.15").unwrap();
			assert_eq!(q, Quant::new(1015, 2));
			let q: Quant = serde_json::from_str("42").unwrap();
			assert_eq!(q, Quant::from_i128(42));
			let q: Quant = serde_json::from_str("\"3.5\"").unwrap();
			assert_eq!(q, Quant::new(35, 1));
		}

		#[test]
		fn test_serialize_round_trip() {
			let q = Quant::from_str("123.45").unwrap();
			let json = serde_json::to_string(&q).unwrap();
			let back: Quant = serde_json::from_str(&json).unwrap();
			assert_eq!(back, q);
		}
	}
}
