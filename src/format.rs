use core::fmt;

use alloc::string::String;

use crate::{Decimal, Designator, Period};

/// Writes periods as ISO-8601 text, or as English words with
/// [`PeriodFormatter::humanise`].
///
/// The only setting is the decimal point glyph, `.` by default. `Display` for
/// [`Period`] uses the default formatter.
///
/// ```rust
/// use isoperiod::{Period, PeriodFormatter};
///
/// let p: Period = "PT1.5S".parse().unwrap();
/// assert_eq!(PeriodFormatter::new().decimal_point(',').format(&p), "PT1,5S");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PeriodFormatter {
    decimal_point: char,
}

impl Default for PeriodFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodFormatter {
    pub const fn new() -> Self {
        Self { decimal_point: '.' }
    }

    /// Sets the character written between the whole and fractional digits.
    pub const fn decimal_point(self, decimal_point: char) -> Self {
        Self { decimal_point }
    }

    pub const fn get_decimal_point(&self) -> char {
        self.decimal_point
    }

    pub fn format(&self, period: &Period) -> String {
        let mut text = String::new();
        // writing to a String cannot fail
        let _ = self.write(&mut text, period);
        text
    }

    /// Writes `period` to `w`.
    ///
    /// Zero fields are omitted; `T` appears only when an hour, minute or second field
    /// is non-zero. The zero period is written `P0D`.
    pub fn write<W: fmt::Write>(&self, w: &mut W, period: &Period) -> fmt::Result {
        if period.is_zero() {
            return w.write_str("P0D");
        }

        if period.neg {
            w.write_char('-')?;
        }
        w.write_char('P')?;

        let (date, time) = Designator::ALL.split_at(4);
        for &designator in date {
            self.write_field(w, period, designator)?;
        }

        if time.iter().any(|&d| !period.raw_field(d).is_zero()) {
            w.write_char('T')?;
            for &designator in time {
                self.write_field(w, period, designator)?;
            }
        }

        Ok(())
    }

    fn write_field<W: fmt::Write>(
        &self,
        w: &mut W,
        period: &Period,
        designator: Designator,
    ) -> fmt::Result {
        let field = period.raw_field(designator);
        if field.is_zero() {
            return Ok(());
        }
        field.write_with_point(w, self.decimal_point)?;
        w.write_char(designator.as_char())
    }

    pub fn humanise(&self, period: &Period) -> String {
        let mut text = String::new();
        let _ = self.write_humanised(&mut text, period);
        text
    }

    /// Writes `period` in English, e.g. `1 year, 2.5 months, minus 1 week`.
    ///
    /// The overall sign is not shown, so a period and its negation read the same. A
    /// field with the opposite sign to the first non-zero field is prefixed `minus`.
    /// The zero period is written `zero`.
    pub fn write_humanised<W: fmt::Write>(&self, w: &mut W, period: &Period) -> fmt::Result {
        if period.is_zero() {
            return w.write_str("zero");
        }

        let mut separator = "";
        for designator in Designator::ALL {
            let field = period.raw_field(designator);
            if field.is_zero() {
                continue;
            }
            w.write_str(separator)?;
            separator = ", ";

            if field.is_negative() {
                w.write_str("minus ")?;
            }
            let magnitude = field.abs();
            magnitude.write_with_point(w, self.decimal_point)?;
            w.write_char(' ')?;
            if magnitude == Decimal::ONE {
                w.write_str(designator.singular_name())?;
            } else {
                w.write_str(designator.name())?;
            }
        }
        Ok(())
    }
}

impl Period {
    /// Writes the period as ISO-8601 text with the default formatter.
    pub fn write_to<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        PeriodFormatter::new().write(w, self)
    }

    /// The period in English words; see [`PeriodFormatter::write_humanised`].
    pub fn humanise(&self) -> String {
        PeriodFormatter::new().humanise(self)
    }
}
