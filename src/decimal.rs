use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::DecimalError;

/// Exact decimal number `significand × 10^exponent`.
///
/// Values are always trimmed: the significand is never a multiple of ten unless it is
/// zero, and zero is always `0 × 10^0`. Two decimals are therefore equal exactly when
/// their parts are equal, so the derived `PartialEq` and `Hash` are value comparisons.
///
/// The significand lies in `-i64::MAX..=i64::MAX`, so negation never overflows. The
/// exponent lies in `MIN_EXPONENT..=MAX_EXPONENT`, which keeps the written form of any
/// value under 300 characters; results outside that range are overflows.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    significand: i64,
    exponent: i32,
}

// ============================================================================
// Constants
// ============================================================================

impl Decimal {
    /// Zero
    pub const ZERO: Self = Self {
        significand: 0,
        exponent: 0,
    };

    /// One (1)
    pub const ONE: Self = Self {
        significand: 1,
        exponent: 0,
    };

    /// Largest exponent of a trimmed value.
    pub const MAX_EXPONENT: i32 = 255;

    /// Smallest exponent of a trimmed value.
    pub const MIN_EXPONENT: i32 = -255;
}

// ============================================================================
// Constructors and Raw Access
// ============================================================================

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Decimal {
    /// Creates `significand × 10^exponent`, trimming trailing zero digits.
    ///
    /// Example: `new(1500, -3)` → 1.5 (stored as `15 × 10^-1`)
    ///
    /// # Panics
    /// Panics if `significand` is `i64::MIN` or the trimmed exponent is outside
    /// `MIN_EXPONENT..=MAX_EXPONENT`.
    pub const fn new(significand: i64, exponent: i32) -> Self {
        match Self::try_new(significand, exponent) {
            Some(d) => d,
            None => panic!("value out of range in Decimal::new"),
        }
    }

    /// Creates `significand × 10^exponent`, returning `None` for `i64::MIN` or when the
    /// trimmed exponent is out of range.
    pub const fn try_new(mut significand: i64, mut exponent: i32) -> Option<Self> {
        if significand == i64::MIN {
            return None;
        }
        if significand == 0 {
            return Some(Self::ZERO);
        }
        while significand % 10 == 0 && exponent < i32::MAX {
            significand /= 10;
            exponent += 1;
        }
        if exponent < Self::MIN_EXPONENT || exponent > Self::MAX_EXPONENT {
            return None;
        }
        Some(Self {
            significand,
            exponent,
        })
    }

    /// Creates a whole number.
    #[inline(always)]
    pub const fn from_i32(value: i32) -> Self {
        Self::new(value as i64, 0)
    }

    /// Creates a whole number, returning `None` for `i64::MIN`.
    #[inline(always)]
    pub const fn from_i64(value: i64) -> Option<Self> {
        Self::try_new(value, 0)
    }

    /// The trimmed significand.
    #[inline(always)]
    pub const fn significand(self) -> i64 {
        self.significand
    }

    /// The power of ten applied to the significand.
    #[inline(always)]
    pub const fn exponent(self) -> i32 {
        self.exponent
    }

    /// Builds a trimmed decimal from a wide intermediate, or `None` if it does not fit.
    pub(crate) fn from_i128(mut value: i128, mut exponent: i64) -> Option<Self> {
        if value == 0 {
            return Some(Self::ZERO);
        }
        while value % 10 == 0 {
            value /= 10;
            exponent += 1;
        }
        let significand = i64::try_from(value).ok()?;
        if significand == i64::MIN
            || exponent < Self::MIN_EXPONENT as i64
            || exponent > Self::MAX_EXPONENT as i64
        {
            return None;
        }
        Some(Self {
            significand,
            exponent: exponent as i32,
        })
    }

    /// Like `from_i128`, but drops least significant digits (truncating toward zero)
    /// until the significand fits.
    pub(crate) fn from_i128_truncating(mut value: i128, mut exponent: i32) -> Self {
        while value > i64::MAX as i128 || value < -(i64::MAX as i128) {
            value /= 10;
            exponent = exponent.saturating_add(1);
        }
        Self::new(value as i64, exponent)
    }

    /// Parses already-split digit runs, e.g. `("12", "50")` → 12.5.
    ///
    /// Both runs must contain only ASCII digits; the integer run must not be empty.
    pub(crate) fn from_digits(negative: bool, integer: &[u8], fraction: &[u8]) -> crate::Result<Self> {
        if integer.is_empty() || !integer.iter().chain(fraction).all(u8::is_ascii_digit) {
            return Err(DecimalError::InvalidFormat);
        }

        // Trailing zeros carry no value; dropping them first keeps the
        // accumulator small for inputs like "1.000000000000000000000000000000000000000"
        let fraction = trim_trailing_zeros(fraction);
        let (integer, mut exponent) = if fraction.is_empty() {
            let trimmed = trim_trailing_zeros(integer);
            (trimmed, (integer.len() - trimmed.len()) as i64)
        } else {
            (integer, 0)
        };
        exponent -= i64::try_from(fraction.len()).map_err(|_| DecimalError::Overflow)?;

        let mut value = 0i128;
        for &byte in integer.iter().chain(fraction) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((byte - b'0') as i128))
                .ok_or(DecimalError::Overflow)?;
        }
        if negative {
            value = -value;
        }

        Self::from_i128(value, exponent).ok_or(DecimalError::Overflow)
    }
}

// ============================================================================
// Arithmetic Operations - Addition
// ============================================================================

impl Decimal {
    /// Checked addition. Returns `None` if the exact sum needs more than 64 bits.
    ///
    /// The operand with the larger exponent is scaled down to the smaller one, so
    /// `1.5 + 200` is computed as `15 × 10^-1 + 2000 × 10^-1`.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        if self.is_zero() {
            return Some(rhs);
        }
        if rhs.is_zero() {
            return Some(self);
        }
        let exponent = self.exponent.min(rhs.exponent);
        let a = scale_up(self.significand, self.exponent as i64 - exponent as i64)?;
        let b = scale_up(rhs.significand, rhs.exponent as i64 - exponent as i64)?;
        Self::from_i128(a.checked_add(b)?, exponent as i64)
    }

    /// Checked addition. Returns an error if overflow occurred.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn try_add(self, rhs: Self) -> crate::Result<Self> {
        self.checked_add(rhs).ok_or(DecimalError::Overflow)
    }

    /// Checked subtraction. Returns `None` if overflow occurred.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.checked_add(-rhs)
    }

    /// Checked subtraction. Returns an error if overflow occurred.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn try_sub(self, rhs: Self) -> crate::Result<Self> {
        self.checked_sub(rhs).ok_or(DecimalError::Overflow)
    }
}

// ============================================================================
// Arithmetic Operations - Multiplication
// ============================================================================

impl Decimal {
    /// Checked multiplication. Returns `None` if overflow occurred.
    ///
    /// The product is exact: significands multiply, exponents add.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        let product = self.significand as i128 * rhs.significand as i128;
        Self::from_i128(product, self.exponent as i64 + rhs.exponent as i64)
    }

    /// Checked multiplication. Returns an error if overflow occurred.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn try_mul(self, rhs: Self) -> crate::Result<Self> {
        self.checked_mul(rhs).ok_or(DecimalError::Overflow)
    }
}

// ============================================================================
// Arithmetic Operations - Division
// ============================================================================

impl Decimal {
    /// Integral quotient (truncated toward zero) and remainder.
    ///
    /// `self == quotient × divisor + remainder`, and the remainder has the sign of
    /// `self`. Returns `None` on division by zero or overflow.
    ///
    /// Example: `65.5.checked_quot_rem(60)` → `(1, 5.5)`
    pub fn checked_quot_rem(self, divisor: Self) -> Option<(Self, Self)> {
        self.try_quot_rem(divisor).ok()
    }

    /// Integral quotient and remainder. Returns an error on division by zero or overflow.
    pub fn try_quot_rem(self, divisor: Self) -> crate::Result<(Self, Self)> {
        if divisor.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok((Self::ZERO, Self::ZERO));
        }

        let exponent = self.exponent.min(divisor.exponent);
        let a = scale_up(self.significand, self.exponent as i64 - exponent as i64)
            .ok_or(DecimalError::Overflow)?;
        let b = scale_up(divisor.significand, divisor.exponent as i64 - exponent as i64)
            .ok_or(DecimalError::Overflow)?;

        let quotient = Self::from_i128(a / b, 0).ok_or(DecimalError::Overflow)?;
        let remainder = Self::from_i128(a % b, exponent as i64).ok_or(DecimalError::Overflow)?;
        Ok((quotient, remainder))
    }
}

// ============================================================================
// Sign Operations
// ============================================================================

impl Decimal {
    /// Negation; never overflows.
    #[inline(always)]
    pub const fn negate(self) -> Self {
        Self {
            significand: -self.significand,
            exponent: self.exponent,
        }
    }

    /// Absolute value; never overflows.
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self {
            significand: self.significand.abs(),
            exponent: self.exponent,
        }
    }

    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.significand == 0
    }

    #[inline(always)]
    pub const fn is_positive(self) -> bool {
        self.significand > 0
    }

    #[inline(always)]
    pub const fn is_negative(self) -> bool {
        self.significand < 0
    }

    /// Returns -1, 0 or 1.
    #[inline(always)]
    pub const fn signum(self) -> i32 {
        self.significand.signum() as i32
    }
}

// ============================================================================
// Digits and Conversions
// ============================================================================

impl Decimal {
    /// Number of fractional digits; 0 for whole numbers.
    #[inline]
    pub const fn scale(self) -> u32 {
        if self.exponent < 0 {
            self.exponent.unsigned_abs()
        } else {
            0
        }
    }

    /// Number of digits needed to write the value without a sign or decimal point,
    /// ignoring leading zeros. Zero has precision 0; `1200` has 4; `0.05` has 1.
    #[inline]
    pub const fn precision(self) -> u32 {
        let digits = match self.significand.unsigned_abs().checked_ilog10() {
            Some(log) => log + 1,
            None => 0,
        };
        if self.exponent > 0 && digits > 0 {
            digits.saturating_add(self.exponent as u32)
        } else {
            digits
        }
    }

    /// True when there is no fractional part.
    #[inline(always)]
    pub const fn is_integer(self) -> bool {
        self.exponent >= 0
    }

    /// Converts a whole number to `i64`. Returns `None` when there is a fractional
    /// part or the value is out of range.
    pub fn to_i64(self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        let value = scale_up(self.significand, self.exponent as i64)?;
        i64::try_from(value).ok()
    }

    /// Converts to `i64`, truncating any fraction toward zero. Returns `None` when the
    /// integral part is out of range.
    pub fn trunc_i64(self) -> Option<i64> {
        if self.is_integer() {
            return self.to_i64();
        }
        match 10i64.checked_pow(self.exponent.unsigned_abs()) {
            Some(divisor) => Some(self.significand / divisor),
            None => Some(0),
        }
    }

    /// Writes the exact digits using `point` as the decimal separator.
    ///
    /// Example: `(15, -3)` with `','` → "0,015"
    pub fn write_with_point<W: fmt::Write>(&self, w: &mut W, point: char) -> fmt::Result {
        if self.significand < 0 {
            w.write_char('-')?;
        }

        let mut buffer = [0u8; 20];
        let digits = write_digits(self.significand.unsigned_abs(), &mut buffer)?;

        if self.exponent >= 0 {
            w.write_str(digits)?;
            if self.significand != 0 {
                for _ in 0..self.exponent {
                    w.write_char('0')?;
                }
            }
            return Ok(());
        }

        let point_at = digits.len() as i64 + self.exponent as i64;
        if point_at <= 0 {
            w.write_char('0')?;
            w.write_char(point)?;
            for _ in point_at..0 {
                w.write_char('0')?;
            }
            w.write_str(digits)
        } else {
            let (integer, fraction) = digits.split_at(point_at as usize);
            w.write_str(integer)?;
            w.write_char(point)?;
            w.write_str(fraction)
        }
    }
}

// ============================================================================
// String Parsing
// ============================================================================

impl Decimal {
    /// Parses a decimal string.
    ///
    /// Supports formats like: "123", "-0.5", "+12,25", "365.2425". Either `.` or `,`
    /// may separate the fraction.
    ///
    /// # Errors
    /// Returns `DecimalError::InvalidFormat` if the string is not a valid decimal.
    /// Returns `DecimalError::Overflow` if the significand needs more than 64 bits.
    pub fn from_str_exact(s: &str) -> crate::Result<Self> {
        let bytes = s.trim().as_bytes();

        let (negative, digits) = match bytes.split_first() {
            Some((b'-', rest)) => (true, rest),
            Some((b'+', rest)) => (false, rest),
            Some(_) => (false, bytes),
            None => return Err(DecimalError::InvalidFormat),
        };

        match digits.iter().position(|&b| b == b'.' || b == b',') {
            Some(point) if point + 1 < digits.len() => {
                Self::from_digits(negative, &digits[..point], &digits[point + 1..])
            }
            Some(_) => Err(DecimalError::InvalidFormat),
            None => Self::from_digits(negative, digits, &[]),
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

impl Add for Decimal {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs).expect("attempt to add with overflow")
    }
}

impl Sub for Decimal {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs)
            .expect("attempt to subtract with overflow")
    }
}

impl Mul for Decimal {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        self.checked_mul(rhs)
            .expect("attempt to multiply with overflow")
    }
}

impl Neg for Decimal {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.negate()
    }
}

// ============================================================================
// Standard Library Trait Implementations
// ============================================================================

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_sign = self.signum().cmp(&other.signum());
        if by_sign != Ordering::Equal || self.is_zero() {
            return by_sign;
        }

        // Same non-zero sign: compare the position of the most significant digit
        // first, so that alignment below never shifts by more than 18 places.
        let magnitude = |d: &Self| d.precision() as i64 + d.exponent.min(0) as i64;
        let by_magnitude = magnitude(self).cmp(&magnitude(other));
        let by_abs = if by_magnitude != Ordering::Equal {
            by_magnitude
        } else {
            let exponent = self.exponent.min(other.exponent) as i64;
            let a = scale_up(self.significand, self.exponent as i64 - exponent)
                .map(i128::abs);
            let b = scale_up(other.significand, other.exponent as i64 - exponent)
                .map(i128::abs);
            a.cmp(&b)
        };

        if self.is_negative() { by_abs.reverse() } else { by_abs }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<i64> for Decimal {
    type Error = DecimalError;

    #[inline(always)]
    fn try_from(value: i64) -> crate::Result<Self> {
        Self::from_i64(value).ok_or(DecimalError::Overflow)
    }
}

impl From<i32> for Decimal {
    #[inline(always)]
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with_point(f, '.')
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // {:#?} shows raw internals
            f.debug_struct("Decimal")
                .field("significand", &self.significand)
                .field("exponent", &self.exponent)
                .finish()
        } else {
            write!(f, "Decimal({})", self)
        }
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            (self.significand, self.exponent).serialize(serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = alloc::string::String::deserialize(deserializer)?;
            Self::from_str(&s).map_err(de::Error::custom)
        } else {
            let (significand, exponent) = <(i64, i32)>::deserialize(deserializer)?;
            Self::try_new(significand, exponent)
                .ok_or_else(|| de::Error::custom(DecimalError::Overflow))
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// `significand × 10^shift` in 128 bits, or `None` if that overflows.
#[inline]
fn scale_up(significand: i64, shift: i64) -> Option<i128> {
    let shift = u32::try_from(shift).ok()?;
    10i128
        .checked_pow(shift)?
        .checked_mul(significand as i128)
}

fn trim_trailing_zeros(digits: &[u8]) -> &[u8] {
    let end = digits
        .iter()
        .rposition(|&b| b != b'0')
        .map_or(0, |i| i + 1);
    &digits[..end]
}

/// Writes the decimal digits of `n` into `buffer`, returning them as a string.
fn write_digits(mut n: u64, buffer: &mut [u8; 20]) -> Result<&str, fmt::Error> {
    if n == 0 {
        buffer[0] = b'0';
        return core::str::from_utf8(&buffer[..1]).map_err(|_| fmt::Error);
    }

    let mut pos = 0;
    while n > 0 {
        buffer[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        pos += 1;
    }
    buffer[..pos].reverse();

    core::str::from_utf8(&buffer[..pos]).map_err(|_| fmt::Error)
}


#[cfg(test)]
mod string_tests {
    use std::string::{String, ToString};

    use super::*;

    #[test]
    fn test_from_str_integer() {
        let d = Decimal::from_str_exact("123").unwrap();
        assert_eq!(d.significand(), 123);
        assert_eq!(d.exponent(), 0);

        let d = Decimal::from_str_exact("-4500").unwrap();
        assert_eq!(d.significand(), -45);
        assert_eq!(d.exponent(), 2);
    }

    #[test]
    fn test_from_str_fraction() {
        let d = Decimal::from_str_exact("1.111111111").unwrap();
        assert_eq!(d.significand(), 1_111_111_111);
        assert_eq!(d.exponent(), -9);

        let d = Decimal::from_str_exact("0,0000000000000000001").unwrap();
        assert_eq!(d.significand(), 1);
        assert_eq!(d.exponent(), -19);
    }

    #[test]
    fn test_from_str_trailing_zeros() {
        let d = Decimal::from_str_exact("1.0000000000000000000000000000000000000000000").unwrap();
        assert_eq!(d, Decimal::ONE);

        let d = Decimal::from_str_exact("10000000000000000000000000000000000000000000").unwrap();
        assert_eq!(d, Decimal::new(1, 43));
    }

    #[test]
    fn test_from_str_limits() {
        assert_eq!(
            Decimal::from_str_exact("9223372036854775807").unwrap(),
            Decimal::new(i64::MAX, 0)
        );
        assert_eq!(
            Decimal::from_str_exact("92233720368547758071"),
            Err(DecimalError::Overflow)
        );
    }

    #[test]
    fn test_from_str_invalid() {
        for s in ["", "-", "+", ".5", "5.", "1.1.1", "1e5", "--1", "abc"] {
            assert_eq!(
                Decimal::from_str_exact(s),
                Err(DecimalError::InvalidFormat),
                "{s:?}"
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Decimal::ZERO.to_string(), "0");
        assert_eq!(Decimal::new(12, 2).to_string(), "1200");
        assert_eq!(Decimal::new(15, -1).to_string(), "1.5");
        assert_eq!(Decimal::new(-15, -3).to_string(), "-0.015");
        assert_eq!(Decimal::new(1, -19).to_string(), "0.0000000000000000001");
        assert_eq!(Decimal::new(i64::MAX, 0).to_string(), "9223372036854775807");
    }

    #[test]
    fn test_write_with_point() {
        let mut s = String::new();
        Decimal::new(25, -1).write_with_point(&mut s, ',').unwrap();
        assert_eq!(s, "2,5");
    }

    #[test]
    fn test_debug() {
        assert_eq!(std::format!("{:?}", Decimal::new(5, -1)), "Decimal(0.5)");
    }
}
