use core::fmt;
use core::ops::{Add, Neg, Sub};

use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Decimal, PeriodError, PeriodFormatter};

/// The letter that names one field of a period.
///
/// Ordered from most to least significant, so `Year < Month < ... < Second`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Designator {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Designator {
    /// All designators, most significant first.
    pub const ALL: [Designator; 7] = [
        Designator::Year,
        Designator::Month,
        Designator::Week,
        Designator::Day,
        Designator::Hour,
        Designator::Minute,
        Designator::Second,
    ];

    /// The upper-case letter used in period text. Month and minute share `M`.
    pub const fn as_char(self) -> char {
        match self {
            Designator::Year => 'Y',
            Designator::Month | Designator::Minute => 'M',
            Designator::Week => 'W',
            Designator::Day => 'D',
            Designator::Hour => 'H',
            Designator::Second => 'S',
        }
    }

    /// Field name in the plural, e.g. "years".
    pub const fn name(self) -> &'static str {
        match self {
            Designator::Year => "years",
            Designator::Month => "months",
            Designator::Week => "weeks",
            Designator::Day => "days",
            Designator::Hour => "hours",
            Designator::Minute => "minutes",
            Designator::Second => "seconds",
        }
    }

    /// Field name in the singular, e.g. "year".
    pub const fn singular_name(self) -> &'static str {
        match self {
            Designator::Year => "year",
            Designator::Month => "month",
            Designator::Week => "week",
            Designator::Day => "day",
            Designator::Hour => "hour",
            Designator::Minute => "minute",
            Designator::Second => "second",
        }
    }

    /// True for hours, minutes and seconds, which follow `T` in period text.
    pub const fn is_time(self) -> bool {
        matches!(
            self,
            Designator::Hour | Designator::Minute | Designator::Second
        )
    }

    /// Maps a designator letter to its field; `M` depends on which side of `T` it is.
    pub(crate) const fn from_char(c: char, is_time_section: bool) -> Option<Self> {
        match c {
            'Y' => Some(Designator::Year),
            'M' if is_time_section => Some(Designator::Minute),
            'M' => Some(Designator::Month),
            'W' => Some(Designator::Week),
            'D' => Some(Designator::Day),
            'H' => Some(Designator::Hour),
            'S' => Some(Designator::Second),
            _ => None,
        }
    }

    #[inline(always)]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Designator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        f.write_char(self.as_char())
    }
}

/// An ISO-8601 period such as `P1Y2M3W4DT5H6M7.5S`.
///
/// Each of the seven fields is an exact [`Decimal`] with its own sign, and `neg`
/// negates the whole period. In the canonical form produced by every constructor, the
/// first non-zero field is positive and `neg` carries the overall sign. Later fields
/// may still be negative: `P1DT-1S` is one second less than a day.
///
/// Periods are immutable values; every operation returns a new one.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Period {
    pub(crate) years: Decimal,
    pub(crate) months: Decimal,
    pub(crate) weeks: Decimal,
    pub(crate) days: Decimal,
    pub(crate) hours: Decimal,
    pub(crate) minutes: Decimal,
    pub(crate) seconds: Decimal,
    pub(crate) neg: bool,
}

// ============================================================================
// Constants
// ============================================================================

impl Period {
    /// The zero period, written `P0D`.
    pub const ZERO: Self = Self {
        years: Decimal::ZERO,
        months: Decimal::ZERO,
        weeks: Decimal::ZERO,
        days: Decimal::ZERO,
        hours: Decimal::ZERO,
        minutes: Decimal::ZERO,
        seconds: Decimal::ZERO,
        neg: false,
    };
}

// ============================================================================
// Constructors
// ============================================================================

impl Period {
    /// Creates a period of whole numbers.
    ///
    /// The fields are taken verbatim apart from sign normalisation: 120 seconds do not
    /// become 2 minutes. Use [`Period::normalise`] for that.
    pub fn new(
        years: i32,
        months: i32,
        weeks: i32,
        days: i32,
        hours: i32,
        minutes: i32,
        seconds: i32,
    ) -> Self {
        Self {
            years: years.into(),
            months: months.into(),
            weeks: weeks.into(),
            days: days.into(),
            hours: hours.into(),
            minutes: minutes.into(),
            seconds: seconds.into(),
            neg: false,
        }
        .normalise_sign()
    }

    /// Creates a period of whole years, months, weeks and days.
    pub fn ymwd(years: i32, months: i32, weeks: i32, days: i32) -> Self {
        Self::new(years, months, weeks, days, 0, 0, 0)
    }

    /// Creates a period of whole hours, minutes and seconds.
    pub fn hms(hours: i32, minutes: i32, seconds: i32) -> Self {
        Self::new(0, 0, 0, 0, hours, minutes, seconds)
    }

    /// Creates a period from seven decimal fields, normalising only the sign.
    ///
    /// Only one field may have a fractional part.
    ///
    /// # Errors
    /// Returns `PeriodError::FractionPlacement` listing every fractional field when
    /// more than one is supplied.
    pub fn from_decimals(
        years: Decimal,
        months: Decimal,
        weeks: Decimal,
        days: Decimal,
        hours: Decimal,
        minutes: Decimal,
        seconds: Decimal,
    ) -> Result<Self, PeriodError> {
        let period = Self {
            years,
            months,
            weeks,
            days,
            hours,
            minutes,
            seconds,
            neg: false,
        };

        let fractions = Designator::ALL
            .iter()
            .filter(|&&d| !period.raw_field(d).is_integer())
            .count();
        if fractions > 1 {
            return Err(PeriodError::FractionPlacement {
                fields: period.fractional_fields(),
            });
        }

        Ok(period.normalise_sign())
    }

    /// Renders the fractional fields in period order, e.g. `1.5Y2.5MT0.5S`.
    fn fractional_fields(&self) -> String {
        use fmt::Write;

        let mut text = String::new();
        let mut in_time = false;
        for designator in Designator::ALL {
            let field = self.raw_field(designator);
            if field.is_integer() {
                continue;
            }
            if designator.is_time() && !in_time {
                text.push('T');
                in_time = true;
            }
            // writing to a String cannot fail
            let _ = write!(text, "{}{}", field, designator);
        }
        text
    }
}

// ============================================================================
// Field Access
// ============================================================================

impl Period {
    /// The stored field, without the overall sign applied.
    #[inline]
    pub(crate) const fn raw_field(&self, designator: Designator) -> Decimal {
        match designator {
            Designator::Year => self.years,
            Designator::Month => self.months,
            Designator::Week => self.weeks,
            Designator::Day => self.days,
            Designator::Hour => self.hours,
            Designator::Minute => self.minutes,
            Designator::Second => self.seconds,
        }
    }

    #[inline]
    pub(crate) fn raw_field_mut(&mut self, designator: Designator) -> &mut Decimal {
        match designator {
            Designator::Year => &mut self.years,
            Designator::Month => &mut self.months,
            Designator::Week => &mut self.weeks,
            Designator::Day => &mut self.days,
            Designator::Hour => &mut self.hours,
            Designator::Minute => &mut self.minutes,
            Designator::Second => &mut self.seconds,
        }
    }

    #[inline(always)]
    const fn apply_sign(&self, field: Decimal) -> Decimal {
        if self.neg { field.negate() } else { field }
    }

    /// Any field with the overall sign applied.
    #[inline]
    pub const fn field(&self, designator: Designator) -> Decimal {
        self.apply_sign(self.raw_field(designator))
    }

    /// Any field as a whole number, truncated toward zero, with the overall sign
    /// applied. Returns `None` if the integral part does not fit an `i64`.
    #[inline]
    pub fn field_int(&self, designator: Designator) -> Option<i64> {
        self.field(designator).trunc_i64()
    }

    /// Years, including any fraction.
    pub const fn years(&self) -> Decimal {
        self.field(Designator::Year)
    }

    /// Months, including any fraction.
    pub const fn months(&self) -> Decimal {
        self.field(Designator::Month)
    }

    /// Weeks, including any fraction.
    pub const fn weeks(&self) -> Decimal {
        self.field(Designator::Week)
    }

    /// Days, including any fraction. Weeks are not included; see [`Period::days_inc_weeks`].
    pub const fn days(&self) -> Decimal {
        self.field(Designator::Day)
    }

    /// Hours, including any fraction.
    pub const fn hours(&self) -> Decimal {
        self.field(Designator::Hour)
    }

    /// Minutes, including any fraction.
    pub const fn minutes(&self) -> Decimal {
        self.field(Designator::Minute)
    }

    /// Seconds, including any fraction.
    pub const fn seconds(&self) -> Decimal {
        self.field(Designator::Second)
    }

    pub fn years_int(&self) -> Option<i64> {
        self.field_int(Designator::Year)
    }

    pub fn months_int(&self) -> Option<i64> {
        self.field_int(Designator::Month)
    }

    pub fn weeks_int(&self) -> Option<i64> {
        self.field_int(Designator::Week)
    }

    pub fn days_int(&self) -> Option<i64> {
        self.field_int(Designator::Day)
    }

    pub fn hours_int(&self) -> Option<i64> {
        self.field_int(Designator::Hour)
    }

    pub fn minutes_int(&self) -> Option<i64> {
        self.field_int(Designator::Minute)
    }

    pub fn seconds_int(&self) -> Option<i64> {
        self.field_int(Designator::Second)
    }

    /// `days + 7 × weeks`, including any fraction, with the overall sign applied.
    /// Returns `None` on overflow.
    pub fn days_inc_weeks(&self) -> Option<Decimal> {
        let total = self
            .weeks
            .checked_mul(Decimal::from_i32(7))?
            .checked_add(self.days)?;
        Some(self.apply_sign(total))
    }

    /// The years, months, weeks and days alone: `-P6Y5M4DT3H2M1S` gives `-P6Y5M4D`.
    pub fn only_ymwd(self) -> Self {
        Self {
            hours: Decimal::ZERO,
            minutes: Decimal::ZERO,
            seconds: Decimal::ZERO,
            ..self
        }
        .normalise_sign()
    }

    /// The hours, minutes and seconds alone: `-P6Y5M4DT3H2M1S` gives `-PT3H2M1S`.
    pub fn only_hms(self) -> Self {
        Self {
            years: Decimal::ZERO,
            months: Decimal::ZERO,
            weeks: Decimal::ZERO,
            days: Decimal::ZERO,
            ..self
        }
        .normalise_sign()
    }
}

// ============================================================================
// Sign Operations
// ============================================================================

impl Period {
    /// True when every field is zero, whatever the overall sign.
    pub fn is_zero(&self) -> bool {
        Designator::ALL.iter().all(|&d| self.raw_field(d).is_zero())
    }

    /// Returns -1 for negative periods, 1 for positive ones and 0 for zero.
    pub fn signum(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.neg {
            -1
        } else {
            1
        }
    }

    #[inline(always)]
    pub const fn is_negative(&self) -> bool {
        self.neg
    }

    /// True for non-zero periods that are not negative.
    #[inline]
    pub fn is_positive(&self) -> bool {
        !self.neg && !self.is_zero()
    }

    /// Clears the overall sign. Field signs are untouched.
    pub const fn abs(self) -> Self {
        Self { neg: false, ..self }
    }

    /// Flips the overall sign. Zero stays zero.
    pub fn negate(self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        Self {
            neg: !self.neg,
            ..self
        }
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

impl Neg for Period {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Add for Period {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs).expect("attempt to add with overflow")
    }
}

impl Sub for Period {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs)
            .expect("attempt to subtract with overflow")
    }
}

// ============================================================================
// Standard Library Trait Implementations
// ============================================================================

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PeriodFormatter::new().write(f, self)
    }
}

impl fmt::Debug for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // {:#?} shows raw fields
            f.debug_struct("Period")
                .field("years", &self.years)
                .field("months", &self.months)
                .field("weeks", &self.weeks)
                .field("days", &self.days)
                .field("hours", &self.hours)
                .field("minutes", &self.minutes)
                .field("seconds", &self.seconds)
                .field("neg", &self.neg)
                .finish()
        } else {
            write!(f, "Period({})", self)
        }
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
