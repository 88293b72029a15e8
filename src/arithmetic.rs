use core::ops::Mul;

use alloc::vec::Vec;

use chrono::{DateTime, Days, Months, TimeDelta, TimeZone};
use log::debug;

use crate::{ArithmeticOverflow, Decimal, Designator, Period};

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;
const NANOS_PER_WEEK: i128 = 7 * NANOS_PER_DAY;
/// 365.2425 days
const NANOS_PER_YEAR: i128 = 31_556_952 * NANOS_PER_SECOND;
/// One twelfth of a year, 30.436875 days
const NANOS_PER_MONTH: i128 = 2_629_746 * NANOS_PER_SECOND;

const DATE_FIELDS: [Designator; 4] = [
    Designator::Year,
    Designator::Month,
    Designator::Week,
    Designator::Day,
];

const CLOCK_FIELDS: [Designator; 3] = [Designator::Hour, Designator::Minute, Designator::Second];

// ============================================================================
// Arithmetic Operations - Addition
// ============================================================================

impl Period {
    /// Adds two periods field by field.
    ///
    /// The sum is normalised in precise mode and then sign-normalised, so
    /// `PT16M40S + PT1000S` is `PT33M20S`.
    ///
    /// # Errors
    /// Returns [`ArithmeticOverflow`] naming every field that overflowed. Those fields
    /// are zero in its partial result, so nothing from them ripples into the others.
    pub fn try_add(self, other: Self) -> Result<Self, ArithmeticOverflow> {
        let left = if self.neg { self.flip_sign() } else { self };
        let right = if other.neg { other.flip_sign() } else { other };

        let mut sum = Self::ZERO;
        let mut overflowed = Vec::new();
        for designator in Designator::ALL {
            let a = left.raw_field(designator);
            *sum.raw_field_mut(designator) = match a.checked_add(right.raw_field(designator)) {
                Some(total) => total,
                None => {
                    overflowed.push(designator);
                    Decimal::ZERO
                }
            };
        }

        finish("addition", sum.normalise(true).normalise_sign(), overflowed)
    }

    /// Checked addition. Returns `None` if any field overflowed.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.try_add(other).ok()
    }

    /// Subtracts `other`; the same as adding its negation.
    pub fn try_sub(self, other: Self) -> Result<Self, ArithmeticOverflow> {
        self.try_add(other.negate())
    }

    /// Checked subtraction. Returns `None` if any field overflowed.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.try_sub(other).ok()
    }
}

// ============================================================================
// Arithmetic Operations - Multiplication
// ============================================================================

impl Period {
    /// Multiplies every field by `factor`.
    ///
    /// The products are exact and are not normalised: `PT1S × 60` is `PT60S`. Only the
    /// sign is normalised, so a negative factor gives a negative period.
    ///
    /// # Errors
    /// Returns [`ArithmeticOverflow`] naming every field that overflowed. Those fields
    /// are zero in its partial result.
    pub fn try_mul(self, factor: Decimal) -> Result<Self, ArithmeticOverflow> {
        let mut product = self;
        let mut overflowed = Vec::new();
        for designator in Designator::ALL {
            let field = self.raw_field(designator);
            if field.is_zero() {
                continue;
            }
            match field.checked_mul(factor) {
                Some(scaled) => *product.raw_field_mut(designator) = scaled,
                None => {
                    overflowed.push(designator);
                    *product.raw_field_mut(designator) = Decimal::ZERO;
                }
            }
        }

        finish("multiplication", product.normalise_sign(), overflowed)
    }

    /// Checked multiplication. Returns `None` if any field overflowed.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_mul(self, factor: Decimal) -> Option<Self> {
        self.try_mul(factor).ok()
    }
}

impl Mul<Decimal> for Period {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self::Output {
        self.checked_mul(factor)
            .expect("attempt to multiply with overflow")
    }
}

fn finish(
    operation: &str,
    result: Period,
    overflowed: Vec<Designator>,
) -> Result<Period, ArithmeticOverflow> {
    if overflowed.is_empty() {
        return Ok(result);
    }
    debug!("period {} overflowed in {:?}", operation, overflowed);
    Err(ArithmeticOverflow {
        fields: overflowed,
        partial: result,
    })
}

// ============================================================================
// Elapsed Time
// ============================================================================

impl Period {
    /// Converts to a fixed elapsed time, with a flag that is true when the conversion
    /// was exact.
    ///
    /// Hours, minutes and seconds convert exactly. Years, months, weeks and days do
    /// not, because their length depends on the calendar: a year is taken to be
    /// 365.2425 days, a month a twelfth of that and a day 24 hours. Digits below a
    /// nanosecond are dropped, which also clears the flag.
    ///
    /// Periods beyond the `TimeDelta` range saturate to `TimeDelta::MAX` or
    /// `TimeDelta::MIN` and are flagged imprecise.
    pub fn to_duration(&self) -> (TimeDelta, bool) {
        let (nanos, exact) = self.nanos(&Designator::ALL);
        let calendar_free = DATE_FIELDS.iter().all(|&d| self.raw_field(d).is_zero());

        match time_delta(nanos) {
            Some(delta) => (delta, exact && calendar_free),
            None => {
                debug!("{} is beyond the duration range", self);
                let saturated = if nanos < 0 {
                    TimeDelta::MIN
                } else {
                    TimeDelta::MAX
                };
                (saturated, false)
            }
        }
    }

    /// The duration from [`Period::to_duration`] without the precision flag.
    pub fn duration_approx(&self) -> TimeDelta {
        self.to_duration().0
    }

    /// Whole days in the approximate duration, truncated toward zero.
    pub fn total_days_approx(&self) -> i64 {
        saturate(self.nanos(&Designator::ALL).0 / NANOS_PER_DAY)
    }

    /// Whole months of 30.436875 days in the approximate duration, truncated toward zero.
    pub fn total_months_approx(&self) -> i64 {
        saturate(self.nanos(&Designator::ALL).0 / NANOS_PER_MONTH)
    }

    /// A seconds-only period equal to `duration`.
    ///
    /// Nanoseconds are kept unless the duration is too long for them to fit the
    /// 64-bit significand, in which case the least significant digits are dropped.
    pub fn from_duration(duration: TimeDelta) -> Self {
        let nanos = duration.num_seconds() as i128 * NANOS_PER_SECOND
            + duration.subsec_nanos() as i128;
        Self {
            seconds: Decimal::from_i128_truncating(nanos, -9),
            ..Self::ZERO
        }
        .normalise_sign()
    }

    /// The signed elapsed time from `t1` to `t2` as a seconds-only period; negative
    /// when `t2` is before `t1`.
    pub fn between<Tz: TimeZone>(t1: &DateTime<Tz>, t2: &DateTime<Tz>) -> Self {
        Self::from_duration(t2.clone() - t1.clone())
    }

    /// Sum of the given fields in nanoseconds with the overall sign applied, and
    /// whether that sum is exact.
    fn nanos(&self, fields: &[Designator]) -> (i128, bool) {
        let mut total = 0i128;
        let mut exact = true;
        for &designator in fields {
            let field = self.raw_field(designator);
            let (nanos, field_exact) = field_nanos(field, unit_nanos(designator))
                .unwrap_or(if field.is_negative() {
                    (i128::MIN, false)
                } else {
                    (i128::MAX, false)
                });
            total = total.saturating_add(nanos);
            exact &= field_exact;
        }
        if self.neg {
            (total.saturating_neg(), exact)
        } else {
            (total, exact)
        }
    }
}

// ============================================================================
// Calendar Arithmetic
// ============================================================================

impl Period {
    /// Adds the period to an instant, with a flag that is true when the result is
    /// exact.
    ///
    /// When years, months, weeks and days are whole numbers, they are added on the
    /// calendar of `t`: years and months first (clamping to the end of shorter months),
    /// then days, then the clock fields as elapsed time. Otherwise, or if the calendar
    /// result is out of range, the approximate duration from
    /// [`Period::to_duration`] is added instead. If even that is out of range, `t` is
    /// returned unchanged and flagged imprecise.
    pub fn add_to<Tz: TimeZone>(&self, t: DateTime<Tz>) -> (DateTime<Tz>, bool) {
        if DATE_FIELDS.iter().all(|&d| self.raw_field(d).is_integer()) {
            if let Some(result) = self.add_on_calendar(&t) {
                return result;
            }
            debug!("{} is out of calendar range; adding the approximate duration", self);
        }

        let (delta, precise) = self.to_duration();
        match t.clone().checked_add_signed(delta) {
            Some(moved) => (moved, precise),
            None => {
                debug!("{} is out of range for the instant; left unchanged", self);
                (t, false)
            }
        }
    }

    fn add_on_calendar<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> Option<(DateTime<Tz>, bool)> {
        let mut months = self
            .years
            .to_i64()?
            .checked_mul(12)?
            .checked_add(self.months.to_i64()?)?;
        let mut days = self
            .weeks
            .to_i64()?
            .checked_mul(7)?
            .checked_add(self.days.to_i64()?)?;
        if self.neg {
            months = months.checked_neg()?;
            days = days.checked_neg()?;
        }

        let (clock, exact) = self.nanos(&CLOCK_FIELDS);

        let shifted = add_months(t.clone(), months)?;
        let shifted = add_days(shifted, days)?;
        let shifted = shifted.checked_add_signed(time_delta(clock)?)?;
        Some((shifted, exact))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

const fn unit_nanos(designator: Designator) -> i128 {
    match designator {
        Designator::Year => NANOS_PER_YEAR,
        Designator::Month => NANOS_PER_MONTH,
        Designator::Week => NANOS_PER_WEEK,
        Designator::Day => NANOS_PER_DAY,
        Designator::Hour => NANOS_PER_HOUR,
        Designator::Minute => NANOS_PER_MINUTE,
        Designator::Second => NANOS_PER_SECOND,
    }
}

/// `field × unit` truncated toward zero, and whether nothing was truncated.
/// `None` on overflow.
fn field_nanos(field: Decimal, unit: i128) -> Option<(i128, bool)> {
    if field.is_zero() {
        return Some((0, true));
    }

    let product = (field.significand() as i128).checked_mul(unit)?;
    let exponent = field.exponent();
    if exponent >= 0 {
        let scaled = product.checked_mul(10i128.checked_pow(exponent.unsigned_abs())?)?;
        return Some((scaled, true));
    }

    match 10i128.checked_pow(exponent.unsigned_abs()) {
        Some(divisor) => Some((product / divisor, product % divisor == 0)),
        // the divisor exceeds any product, so nothing is left
        None => Some((0, false)),
    }
}

fn time_delta(nanos: i128) -> Option<TimeDelta> {
    let seconds = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND)).ok()?;
    let subsec = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
    TimeDelta::new(seconds, subsec)
}

fn add_months<Tz: TimeZone>(t: DateTime<Tz>, months: i64) -> Option<DateTime<Tz>> {
    let step = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months < 0 {
        t.checked_sub_months(step)
    } else {
        t.checked_add_months(step)
    }
}

fn add_days<Tz: TimeZone>(t: DateTime<Tz>, days: i64) -> Option<DateTime<Tz>> {
    let step = Days::new(days.unsigned_abs());
    if days < 0 {
        t.checked_sub_days(step)
    } else {
        t.checked_add_days(step)
    }
}

#[inline]
fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}


#[cfg(test)]
mod duration_tests {
    use super::*;

    fn p(s: &str) -> Period {
        Period::parse(s).unwrap()
    }

    fn nanos(n: i64) -> TimeDelta {
        TimeDelta::nanoseconds(n)
    }

    const SECOND: i64 = 1_000_000_000;
    const MINUTE: i64 = 60 * SECOND;
    const HOUR: i64 = 60 * MINUTE;
    const MONTH: i64 = 2_629_746 * SECOND;
    const YEAR: i64 = 31_556_952 * SECOND;

    #[test]
    fn test_to_duration() {
        let cases = [
            ("P0D", 0, true),
            ("PT1S", SECOND, true),
            ("PT0.1S", SECOND / 10, true),
            ("PT0.000000001S", 1, true),
            ("PT0.0000000001S", 0, false),
            ("PT3276S", 3276 * SECOND, true),
            ("PT1M", MINUTE, true),
            ("PT0.0001M", 6_000_000, true),
            ("PT0.0000000001M", 6, true),
            ("PT0.00000000001M", 0, false),
            ("PT1H", HOUR, true),
            ("PT0.01H", 36 * SECOND, true),
            ("PT0.00000000001H", 36, true),
            ("PT0.0000000000001H", 0, false),
            ("PT3220H", 3220 * HOUR, true),
            ("PT1H-1M-1S", 3539 * SECOND, true),
            ("P1D", 24 * HOUR, false),
            ("P0.1D", 144 * MINUTE, false),
            ("P10000D", 10000 * 24 * HOUR, false),
            ("P1W", 168 * HOUR, false),
            ("P0.1W", 16 * HOUR + 48 * MINUTE, false),
            ("P1M", MONTH, false),
            ("P0.1M", MONTH / 10, false),
            ("P3504M", 3504 * MONTH, false),
            ("P1Y", YEAR, false),
            ("P0.1Y", YEAR / 10, false),
            ("P292Y", 292 * YEAR, false),
            ("PT86400000S", 86_400_000 * SECOND, true),
        ];

        for (value, expected, precise) in cases {
            assert_eq!(p(value).to_duration(), (nanos(expected), precise), "{value}");
            assert_eq!(p(value).duration_approx(), nanos(expected), "{value}");

            let negated = std::format!("-{value}");
            assert_eq!(p(&negated).to_duration(), (nanos(-expected), precise), "{negated}");
        }
    }

    #[test]
    fn test_to_duration_saturates() {
        let (delta, precise) = p("P9223372036854775807Y").to_duration();
        assert_eq!(delta, TimeDelta::MAX);
        assert!(!precise);

        let (delta, precise) = p("-P9223372036854775807Y").to_duration();
        assert_eq!(delta, TimeDelta::MIN);
        assert!(!precise);
    }

    #[test]
    fn test_total_days_approx() {
        let cases = [("P0D", 0), ("PT24H", 1), ("PT49H", 2), ("P1D", 1), ("P1M", 30), ("P1Y", 365)];
        for (value, days) in cases {
            let period = p(value);
            assert_eq!(period.total_days_approx(), days, "{value}");
            assert_eq!(period.negate().total_days_approx(), -days, "-{value}");
        }
    }

    #[test]
    fn test_total_months_approx() {
        let cases = [
            ("P0D", 0),
            ("P1D", 0),
            ("P30D", 0),
            ("P31D", 1),
            ("P60D", 1),
            ("P62D", 2),
            ("P1M", 1),
            ("P12M", 12),
            ("P2M31D", 3),
            ("P1Y", 12),
            ("P2Y3M", 27),
            ("PT24H", 0),
            ("PT744H", 1),
        ];
        for (value, months) in cases {
            let period = p(value);
            assert_eq!(period.total_months_approx(), months, "{value}");
            assert_eq!(period.negate().total_months_approx(), -months, "-{value}");
        }
    }

    #[test]
    fn test_from_duration() {
        assert_eq!(Period::from_duration(TimeDelta::zero()), Period::ZERO);
        assert_eq!(Period::from_duration(nanos(90 * SECOND)), p("PT90S"));
        assert_eq!(Period::from_duration(nanos(-1_500_000_000)), p("-PT1.5S"));
        assert_eq!(Period::from_duration(nanos(1)), p("PT0.000000001S"));
    }

    #[test]
    fn test_from_duration_round_trip() {
        let delta = nanos(3 * HOUR + 7 * SECOND + 250);
        assert_eq!(Period::from_duration(delta).to_duration(), (delta, true));
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Periods whose fields stay below half a unit of the next field, so that a sum
    /// of two never ripples.
    fn small_period() -> impl Strategy<Value = Period> {
        (
            0i32..1000,
            0i32..6,
            0i32..1000,
            0i32..3,
            0i32..12,
            0i32..30,
            0i32..30,
            any::<bool>(),
        )
            .prop_map(|(y, m, w, d, h, mi, s, neg)| {
                let p = Period::new(y, m, w, d, h, mi, s);
                if neg { p.negate() } else { p }
            })
    }

    proptest! {
        #[test]
        fn prop_add_then_subtract_is_identity(a in small_period(), b in small_period()) {
            let sum = a.try_add(b).unwrap();
            prop_assert_eq!(sum.try_sub(b).unwrap(), a.normalise(true).normalise_sign());
        }

        #[test]
        fn prop_add_commutative(a in small_period(), b in small_period()) {
            prop_assert_eq!(a.try_add(b), b.try_add(a));
        }

        #[test]
        fn prop_clock_duration_is_additive(
            a in -100_000i32..100_000,
            b in -100_000i32..100_000,
        ) {
            let x = Period::hms(0, 0, a);
            let y = Period::hms(0, 0, b);
            let sum = x.try_add(y).unwrap();
            prop_assert_eq!(sum.duration_approx(), x.duration_approx() + y.duration_approx());
        }
    }
}
