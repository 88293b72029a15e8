use log::trace;

use crate::{Decimal, Designator, Period};

const SEVEN: Decimal = Decimal::new(7, 0);
const TWELVE: Decimal = Decimal::new(12, 0);
const TWENTY_FOUR: Decimal = Decimal::new(24, 0);
const SIXTY: Decimal = Decimal::new(60, 0);
const THREE_SIX_SIX: Decimal = Decimal::new(366, 0);

/// Mean Gregorian year length in days.
const DAYS_PER_YEAR: Decimal = Decimal::new(3_652_425, -4);

// ============================================================================
// Ripple Toward Larger Fields
// ============================================================================

impl Period {
    /// Moves whole multiples of each field into the next larger one.
    ///
    /// - 60 seconds become a minute, 60 minutes an hour
    /// - 24 hours become a day, in imprecise mode only (days may be 23 or 25 hours long)
    /// - 7 days become a week, 12 months a year
    ///
    /// Leap seconds are ignored. A step is skipped when it would overflow, or when
    /// what remains would be a bare fraction written with more decimal places than
    /// significant digits (`PT60.0005S` is kept rather than becoming `PT1M0.0005S`).
    ///
    /// The overall sign is left as it is.
    pub fn normalise(self, precise: bool) -> Self {
        let mut p = self;
        (p.minutes, p.seconds) = move_whole_parts_left(p.minutes, p.seconds, SIXTY);
        (p.hours, p.minutes) = move_whole_parts_left(p.hours, p.minutes, SIXTY);
        if !precise {
            (p.days, p.hours) = move_whole_parts_left(p.days, p.hours, TWENTY_FOUR);
        }
        (p.weeks, p.days) = move_whole_parts_left(p.weeks, p.days, SEVEN);
        (p.years, p.months) = move_whole_parts_left(p.years, p.months, TWELVE);
        p
    }

    /// Moves whole mean Gregorian years (365.2425 days) out of the weeks and days.
    ///
    /// Nothing happens below 366 days. What is left over is split into whole weeks
    /// and days where that keeps it simple. Often chained as
    /// `p.normalise(false).normalise_days_to_years()`.
    pub fn normalise_days_to_years(self) -> Self {
        if self.neg {
            return self.negate().normalise_days_to_years().negate();
        }

        let Some(days) = self.days_inc_weeks() else {
            return self;
        };
        if days < THREE_SIX_SIX {
            return self;
        }

        let Some((whole_years, remainder)) = days.checked_quot_rem(DAYS_PER_YEAR) else {
            trace!("days to years declined: {} days", days);
            return self;
        };
        let Some(years) = self.years.checked_add(whole_years) else {
            trace!("days to years declined: {} + {} years overflows", self.years, whole_years);
            return self;
        };

        let (weeks, days) = move_whole_parts_left(Decimal::ZERO, remainder, SEVEN);
        Self {
            years,
            weeks,
            days,
            ..self
        }
    }
}

// ============================================================================
// Ripple Toward Smaller Fields
// ============================================================================

impl Period {
    /// Moves each field into the next smaller one where that gives a simpler
    /// expression, much like turning a mixed fraction into an improper one.
    ///
    /// `P2Y1M` becomes `P25M` but `P2Y` stays as it is. Days become hours only in
    /// imprecise mode. A step is skipped when the result would need more digits than
    /// the two fields had between them (`P0.1Y` stays, as `P1.2M` is longer), or on
    /// overflow.
    pub fn simplify(self, precise: bool) -> Self {
        let mut p = self;
        (p.years, p.months) = move_to_right(p.years, p.months, TWELVE);
        (p.weeks, p.days) = move_to_right(p.weeks, p.days, SEVEN);
        if !precise {
            (p.days, p.hours) = move_to_right(p.days, p.hours, TWENTY_FOUR);
        }
        (p.hours, p.minutes) = move_to_right(p.hours, p.minutes, SIXTY);
        (p.minutes, p.seconds) = move_to_right(p.minutes, p.seconds, SIXTY);
        p
    }

    /// Folds weeks into days: `P2W1D` becomes `P15D`. Unchanged on overflow.
    pub fn simplify_weeks_to_days(self) -> Self {
        let days = self
            .weeks
            .checked_mul(SEVEN)
            .and_then(|d| d.checked_add(self.days));
        match days {
            Some(days) => Self {
                weeks: Decimal::ZERO,
                days,
                ..self
            },
            None => {
                trace!("weeks to days declined: {} weeks overflows", self.weeks);
                self
            }
        }
    }
}

// ============================================================================
// Sign Normalisation
// ============================================================================

impl Period {
    /// Makes the first non-zero field positive, moving its sign to the period as a
    /// whole. Later fields keep their sign relative to the first: `PT-1H1M` becomes
    /// `-PT1H-1M`.
    ///
    /// Idempotent. An all-zero period becomes [`Period::ZERO`].
    pub fn normalise_sign(self) -> Self {
        let first = Designator::ALL
            .into_iter()
            .map(|d| self.raw_field(d))
            .find(|field| !field.is_zero());

        match first {
            Some(field) if field.is_negative() => self.flip_sign(),
            Some(_) => self,
            None => Self::ZERO,
        }
    }

    /// Negates the overall sign and every field, leaving the value unchanged.
    pub(crate) fn flip_sign(self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
            neg: !self.neg,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Carries the whole multiples of `divisor` in `smaller` into `larger`.
fn move_whole_parts_left(larger: Decimal, smaller: Decimal, divisor: Decimal) -> (Decimal, Decimal) {
    if smaller.is_zero() {
        return (larger, smaller);
    }

    let Some((quotient, remainder)) = smaller.checked_quot_rem(divisor) else {
        trace!("ripple declined: {} / {} overflows", smaller, divisor);
        return (larger, smaller);
    };

    if !remainder.is_zero() && remainder.precision() <= remainder.scale() {
        return (larger, smaller);
    }

    match larger.checked_add(quotient) {
        Some(larger) => (larger, remainder),
        None => {
            trace!("ripple declined: {} + {} overflows", larger, quotient);
            (larger, smaller)
        }
    }
}

/// Carries `larger` into `smaller` as multiples of `divisor`, unless the pair is
/// already simple or would only get longer.
fn move_to_right(larger: Decimal, smaller: Decimal, divisor: Decimal) -> (Decimal, Decimal) {
    if larger.is_zero() || is_simple(larger, smaller) {
        return (larger, smaller);
    }

    let (carried, rest) = move_whole_parts_left(larger, smaller, divisor);
    if is_simple(carried, rest) {
        return (carried, rest);
    }

    let Some(combined) = larger
        .checked_mul(divisor)
        .and_then(|extra| extra.checked_add(smaller))
    else {
        trace!("ripple declined: {} x {} + {} overflows", larger, divisor, smaller);
        return (larger, smaller);
    };

    if combined.precision() > larger.precision() + smaller.precision() {
        return (larger, smaller);
    }

    (Decimal::ZERO, combined)
}

#[inline]
fn is_simple(larger: Decimal, smaller: Decimal) -> bool {
    smaller.is_zero() && larger.is_integer()
}

#[cfg(test)]
mod tests {
    use std::string::ToString;

    use super::*;

    fn p(s: &str) -> Period {
        Period::parse(s).unwrap()
    }

    /// Checks `f` on the input and on its negation.
    fn check(input: &str, f: impl Fn(Period) -> Period, expected: &str) {
        let period = p(input);
        assert_eq!(f(period).to_string(), expected, "{input}");
        if !period.is_zero() {
            assert_eq!(
                f(period.negate()).to_string(),
                std::format!("-{expected}"),
                "-{input}"
            );
        }
    }

    #[test]
    fn test_normalise() {
        let cases = [
            ("P0D", "P0D", "P0D"),
            ("P1Y", "P1Y", "P1Y"),
            ("PT1S", "PT1S", "PT1S"),
            ("P11Y", "P11Y", "P11Y"),
            ("P24M", "P2Y", "P2Y"),
            ("P10W", "P10W", "P10W"),
            ("P14D", "P2W", "P2W"),
            ("PT48H", "PT48H", "P2D"),
            ("PT120M", "PT2H", "PT2H"),
            ("PT120S", "PT2M", "PT2M"),
            ("P1.1Y", "P1.1Y", "P1.1Y"),
            ("P0.1W", "P0.1W", "P0.1W"),
            ("PT0.1S", "PT0.1S", "PT0.1S"),
            ("PT0.000000001H", "PT0.000000001H", "PT0.000000001H"),
            ("PT60.0005S", "PT60.0005S", "PT60.0005S"),
            ("PT26H", "PT26H", "P1DT2H"),
            ("PT26.1H", "PT26.1H", "P1DT2.1H"),
            ("P5.3W", "P5.3W", "P5.3W"),
            ("PT65.5S", "PT1M5.5S", "PT1M5.5S"),
            ("PT3601.1S", "PT1H1.1S", "PT1H1.1S"),
            ("PT3661.1S", "PT1H1M1.1S", "PT1H1M1.1S"),
            ("P9D", "P1W2D", "P1W2D"),
            ("P14M", "P1Y2M", "P1Y2M"),
            ("P366.1D", "P52W2.1D", "P52W2.1D"),
            ("PT1440M", "PT24H", "P1D"),
        ];

        for (input, precise, imprecise) in cases {
            check(input, |x| x.normalise(true), precise);
            check(input, |x| x.normalise(false), imprecise);
        }
    }

    #[test]
    fn test_normalise_overflow_is_skipped() {
        let input = "P9223372036854775807YT60S";
        assert_eq!(p(input).normalise(true).to_string(), "P9223372036854775807YT1M");

        let input = "PT9223372036854775807H60M";
        assert_eq!(p(input).normalise(true).to_string(), input);
    }

    #[test]
    fn test_normalise_days_to_years() {
        let cases = [
            ("P0D", "P0D"),
            ("P1Y", "P1Y"),
            ("P1W", "P1W"),
            ("PT1S", "PT1S"),
            ("P365D", "P365D"),
            ("P366D", "P1Y0.7575D"),
            ("P367D", "P1Y1.7575D"),
            ("P1461D", "P4Y0.03D"),
            ("P1469D", "P4Y1W1.03D"),
            ("P52W2D", "P1Y0.7575D"),
        ];

        for (input, expected) in cases {
            check(input, Period::normalise_days_to_years, expected);
        }
    }

    #[test]
    fn test_normalise_days_to_years_overflow_is_skipped() {
        for input in [
            "P9223372036854775807Y366D",
            "P9223372036854775807W",
            "P1317624576693539401W1D",
        ] {
            check(input, Period::normalise_days_to_years, input);
        }
    }

    #[test]
    fn test_simplify_weeks_to_days() {
        let cases = [
            ("P0D", "P0D"),
            ("P1Y", "P1Y"),
            ("P1D", "P1D"),
            ("PT1H", "PT1H"),
            ("P1W", "P7D"),
            ("P2W1D", "P15D"),
            ("P2W-2D", "P12D"),
            ("P10W", "P70D"),
        ];

        for (input, expected) in cases {
            check(input, Period::simplify_weeks_to_days, expected);
        }
    }

    #[test]
    fn test_simplify_weeks_to_days_overflow_is_skipped() {
        for input in ["P9223372036854775807W1D", "P1317624576693539401W1D"] {
            check(input, Period::simplify_weeks_to_days, input);
        }
        assert_eq!(
            p("P1317624576693539401W").simplify_weeks_to_days().to_string(),
            "P9223372036854775807D"
        );
    }

    #[test]
    fn test_simplify() {
        let cases = [
            ("P0D", "P0D", "P0D"),
            ("P1Y", "P1Y", "P1Y"),
            ("PT1S", "PT1S", "PT1S"),
            ("P3Y", "P3Y", "P3Y"),
            ("P3W", "P3W", "P3W"),
            ("PT3M", "PT3M", "PT3M"),
            ("P2Y1M", "P25M", "P25M"),
            ("P2W1D", "P15D", "P15D"),
            ("P2DT1H", "P2DT1H", "PT49H"),
            ("P1DT48H", "P1DT48H", "P3D"),
            ("P1DT23H", "P1DT23H", "PT47H"),
            ("PT3H120M", "PT5H", "PT5H"),
            ("PT3M120S", "PT5M", "PT5M"),
            ("P0.083333333Y", "P0.083333333Y", "P0.083333333Y"),
            ("P0.1Y", "P0.1Y", "P0.1Y"),
            ("P0.11111Y", "P0.11111Y", "P0.11111Y"),
            ("P0.1M", "P0.1M", "P0.1M"),
            // weeks to days is exact, so a fractional week still simplifies
            ("P0.1W", "P0.7D", "P0.7D"),
            ("P1M0.1W", "P1M0.7D", "P1M0.7D"),
            ("P0.1D", "P0.1D", "P0.1D"),
            ("PT0.1H", "PT6M", "PT6M"),
            ("PT0.1M", "PT6S", "PT6S"),
            ("PT0.1S", "PT0.1S", "PT0.1S"),
            ("PT0.05H", "PT3M", "PT3M"),
            ("PT0.05M", "PT3S", "PT3S"),
            ("PT0.05S", "PT0.05S", "PT0.05S"),
            ("PT60.0005S", "PT60.0005S", "PT60.0005S"),
        ];

        for (input, precise, imprecise) in cases {
            check(input, |x| x.simplify(true), precise);
            check(input, |x| x.simplify(false), imprecise);
        }
    }

    #[test]
    fn test_simplify_overflow_is_skipped() {
        let extreme = "PT9223372036854775807M0.0000000000000000001S";
        check(extreme, |x| x.simplify(true), extreme);
        check(extreme, |x| x.simplify(false), extreme);
    }

    fn raw(fields: [i32; 7], neg: bool) -> Period {
        Period {
            years: fields[0].into(),
            months: fields[1].into(),
            weeks: fields[2].into(),
            days: fields[3].into(),
            hours: fields[4].into(),
            minutes: fields[5].into(),
            seconds: fields[6].into(),
            neg,
        }
    }

    #[test]
    fn test_normalise_sign() {
        let cases = [
            ([0, 0, 0, 0, 0, 0, 0], false, "P0D"),
            ([0, 0, 0, 0, 0, 0, 0], true, "P0D"),
            ([1, 0, 0, 0, 0, 0, 0], false, "P1Y"),
            ([0, 0, 0, 0, 0, 0, -1], true, "PT1S"),
            ([0, -1, 0, 0, 0, 0, 0], false, "-P1M"),
            ([0, 0, 1, 0, 0, 0, 0], true, "-P1W"),
            ([0, 0, 0, 0, 0, 1, -1], true, "-PT1M-1S"),
            ([0, 0, 0, 0, 0, 1, 1], true, "-PT1M1S"),
            ([0, 0, 0, 0, 0, 1, -1], false, "PT1M-1S"),
            ([0, 0, 0, 0, -1, -1, -1], true, "PT1H1M1S"),
            ([0, 0, 0, 0, -1, -1, 1], true, "PT1H1M-1S"),
            ([0, 0, 0, 0, -1, 1, -1], true, "PT1H-1M1S"),
            ([0, 0, 0, 0, -1, 1, 1], true, "PT1H-1M-1S"),
            ([0, 0, 0, 0, 1, -1, -1], true, "-PT1H-1M-1S"),
            ([0, 0, 0, 0, 1, 1, 1], true, "-PT1H1M1S"),
            ([0, 0, 0, 0, -1, -1, -1], false, "-PT1H1M1S"),
            ([0, 0, 0, 0, -1, 1, 1], false, "-PT1H-1M-1S"),
            ([0, 0, 0, 0, 1, -1, 1], false, "PT1H-1M1S"),
        ];

        for (fields, neg, expected) in cases {
            let normalised = raw(fields, neg).normalise_sign();
            assert_eq!(normalised.to_string(), expected, "{fields:?} {neg}");
            assert_eq!(normalised.normalise_sign(), normalised);
        }
    }

    #[test]
    fn test_flip_sign_preserves_value() {
        let original = raw([0, 0, 0, 0, 1, -2, 3], false);
        let flipped = original.flip_sign();
        assert!(flipped.neg);
        assert_eq!(flipped.hours(), original.hours());
        assert_eq!(flipped.minutes(), original.minutes());
        assert_eq!(flipped.seconds(), original.seconds());
    }
}
