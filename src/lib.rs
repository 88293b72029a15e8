//! Exact ISO-8601 periods with decimal fields
//!
//! This library provides a value type for ISO-8601 periods ("durations" in the
//! standard's own wording) such as `P1Y2M3W4DT5H6M7.5S`:
//!
//! - **`Period`**: seven independently signed fields (years, months, weeks, days,
//!   hours, minutes, seconds) plus an overall sign
//! - **`Decimal`**: the exact `significand × 10^exponent` number stored in each field
//!
//! ## Features
//!
//! - **Exact fractions**: `P0.0000000000000000001Y` is held without rounding
//! - **Strict parsing**: designator order, placement around `T` and the
//!   single-fraction rule are all enforced
//! - **Normalisation**: carry between adjacent fields, in precise or imprecise mode
//! - **Arithmetic**: addition, subtraction and scaling with aggregated overflow reporting
//! - **chrono interop**: conversion to `TimeDelta` and calendar-aware addition to `DateTime`
//! - **no_std compatible**: needs only `alloc`
//! - **Serde support**: periods serialize as their canonical text
//!
//! ## Example
//!
//! ```rust
//! use isoperiod::Period;
//!
//! let a: Period = "P7Y6M5W2DT6H4M2S".parse().unwrap();
//! let b: Period = "P1Y2M3W2DT3H2M1S".parse().unwrap();
//! let sum = a.try_add(b).unwrap();
//! assert_eq!(sum.to_string(), "P8Y8M8W4DT9H6M3S");
//!
//! // 48 hours only become days when day length may be assumed
//! let hours: Period = "PT48H".parse().unwrap();
//! assert_eq!(hours.normalise(true).to_string(), "PT48H");
//! assert_eq!(hours.normalise(false).to_string(), "P2D");
//! ```

#![no_std]
#![cfg_attr(test, allow(unused_imports))]

#[cfg(test)]
extern crate std;

extern crate alloc;

mod arithmetic;
mod decimal;
mod format;
mod normalise;
mod parse;
mod period;

pub use decimal::Decimal;
pub use format::PeriodFormatter;
pub use period::{Designator, Period};

use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalError {
    #[error("overflow: value too large to represent")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid string format")]
    InvalidFormat,
}

pub type Result<T> = core::result::Result<T, DecimalError>;

/// Errors from parsing period text or building a period from decimal fields.
///
/// Parser errors carry the original input verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("cannot parse a blank string as a period")]
    EmptyInput { input: String },

    #[error("{input}: expected 'P' period mark at the start")]
    MissingPeriodMarker { input: String },

    #[error("{input}: expected {expected} but found '{found}'")]
    UnexpectedCharacter {
        input: String,
        expected: &'static str,
        found: char,
    },

    #[error("{input}: number invalid or out of range")]
    InvalidNumber { input: String },

    #[error("{input}: missing designator at the end")]
    MissingTrailingDesignator { input: String },

    #[error("{input}: '{designator}' designator cannot occur here")]
    DesignatorOutOfSequence {
        input: String,
        designator: Designator,
    },

    #[error("{input}: '{designator}' designator cannot occur more than once")]
    DesignatorRepeated {
        input: String,
        designator: Designator,
    },

    #[error("{input}: 'T' designator cannot occur more than once")]
    DuplicateTimeMarker { input: String },

    #[error("{input}: '{first}' & '{second}' only the last field can have a fraction")]
    MultipleFractions {
        input: String,
        first: Designator,
        second: Designator,
    },

    #[error("{input}: expected 'Y', 'M', 'W', 'D', 'H', 'M', or 'S' designator")]
    NoDesignatorsConsumed { input: String },

    #[error("only the least significant field can have a fraction; found fractions in {fields}")]
    FractionPlacement { fields: String },

    #[error(transparent)]
    Overflow(#[from] ArithmeticOverflow),
}

/// One or more fields overflowed during period arithmetic.
///
/// Every offending field is listed. `partial` holds the best-effort result: the
/// offending fields are zero and the others are correct.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("arithmetic overflow in {}", designator_list(.fields))]
pub struct ArithmeticOverflow {
    pub fields: Vec<Designator>,
    pub partial: Period,
}

fn designator_list(fields: &[Designator]) -> String {
    let mut list = String::new();
    for (i, designator) in fields.iter().enumerate() {
        if i > 0 {
            list.push_str(", ");
        }
        list.push_str(designator.name());
    }
    list
}
