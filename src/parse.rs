use core::str::FromStr;

use alloc::string::{String, ToString};

use crate::{Decimal, Designator, Period, PeriodError};

/// Spellings of zero accepted without a full scan, each optionally signed.
const ZERO_LITERALS: [&str; 7] = ["P0Y", "P0M", "P0W", "P0D", "PT0H", "PT0M", "PT0S"];

const EXPECTED_NUMBER: &str = "a number";
const EXPECTED_DESIGNATOR: &str = "a designator Y, M, W, D, H, or S";

/// Whether a designator may be consumed at the current point of the scan.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ItemState {
    Unready,
    Armed,
    Set,
}

const DATE_SECTION: [ItemState; 7] = [
    ItemState::Armed,
    ItemState::Armed,
    ItemState::Armed,
    ItemState::Armed,
    ItemState::Unready,
    ItemState::Unready,
    ItemState::Unready,
];

const TIME_SECTION: [ItemState; 7] = [
    ItemState::Unready,
    ItemState::Unready,
    ItemState::Unready,
    ItemState::Unready,
    ItemState::Armed,
    ItemState::Armed,
    ItemState::Armed,
];

// ============================================================================
// String Parsing
// ============================================================================

impl Period {
    /// Parses ISO-8601 period text such as `P3Y6M4DT12H30M5S`.
    ///
    /// A leading `+` or `-` may precede the `P`, and each field may carry its own `-`.
    /// Fractions use `.` or `,` and are allowed on one field only. Designators must
    /// appear in order, at most once each, with `H`, `M` (minutes) and `S` after `T`.
    ///
    /// The result has its sign normalised but is otherwise as written: `PT120S` stays
    /// 120 seconds.
    ///
    /// # Errors
    /// Returns a [`PeriodError`] describing the first problem found; every variant
    /// carries the input text.
    pub fn parse(input: &str) -> Result<Self, PeriodError> {
        if input.is_empty() {
            return Err(PeriodError::EmptyInput {
                input: String::new(),
            });
        }

        let (neg, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        if ZERO_LITERALS.contains(&unsigned) {
            return Ok(Self::ZERO);
        }
        if unsigned.is_empty() {
            return Err(PeriodError::EmptyInput {
                input: input.to_string(),
            });
        }

        let Some(mut remaining) = unsigned.strip_prefix('P') else {
            return Err(PeriodError::MissingPeriodMarker {
                input: input.to_string(),
            });
        };

        let mut period = Self {
            neg,
            ..Self::ZERO
        };
        let mut states = DATE_SECTION;
        let mut is_time_section = false;
        let mut fraction: Option<Designator> = None;
        let mut components = 0usize;

        while !remaining.is_empty() {
            if let Some(rest) = remaining.strip_prefix('T') {
                if is_time_section {
                    return Err(PeriodError::DuplicateTimeMarker {
                        input: input.to_string(),
                    });
                }
                is_time_section = true;
                states = TIME_SECTION;
                remaining = rest;
                continue;
            }

            let (number, designator, rest) = next_field(remaining, input, is_time_section)?;
            remaining = rest;

            if let Some(first) = fraction {
                if !number.is_zero() {
                    return Err(PeriodError::MultipleFractions {
                        input: input.to_string(),
                        first,
                        second: designator,
                    });
                }
            }

            match states[designator.index()] {
                ItemState::Unready => {
                    return Err(PeriodError::DesignatorOutOfSequence {
                        input: input.to_string(),
                        designator,
                    });
                }
                ItemState::Set => {
                    return Err(PeriodError::DesignatorRepeated {
                        input: input.to_string(),
                        designator,
                    });
                }
                ItemState::Armed => {}
            }

            *period.raw_field_mut(designator) = number;
            states[designator.index()] = ItemState::Set;

            // designators before this one may no longer appear
            for state in &mut states[..designator.index()] {
                if *state == ItemState::Armed {
                    *state = ItemState::Unready;
                }
            }

            components += 1;
            if !number.is_integer() {
                fraction = Some(designator);
            }
        }

        if components == 0 {
            return Err(PeriodError::NoDesignatorsConsumed {
                input: input.to_string(),
            });
        }

        Ok(period.normalise_sign())
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Scans `['-'] digits [('.'|',') digits]` followed by one designator letter.
///
/// Returns the number, its designator and the text after the designator.
fn next_field<'a>(
    s: &'a str,
    input: &str,
    is_time_section: bool,
) -> Result<(Decimal, Designator, &'a str), PeriodError> {
    let bytes = s.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let start = usize::from(negative);

    let end = start
        + bytes[start..]
            .iter()
            .take_while(|&&b| b.is_ascii_digit() || b == b'.' || b == b',')
            .count();

    if end == start {
        return match s[start..].chars().next() {
            Some(found) => Err(PeriodError::UnexpectedCharacter {
                input: input.to_string(),
                expected: EXPECTED_NUMBER,
                found,
            }),
            None => Err(PeriodError::MissingTrailingDesignator {
                input: input.to_string(),
            }),
        };
    }

    let Some(letter) = s[end..].chars().next() else {
        return Err(PeriodError::MissingTrailingDesignator {
            input: input.to_string(),
        });
    };

    let number = parse_number(negative, &bytes[start..end]).ok_or_else(|| {
        PeriodError::InvalidNumber {
            input: input.to_string(),
        }
    })?;

    let designator = Designator::from_char(letter, is_time_section).ok_or_else(|| {
        PeriodError::UnexpectedCharacter {
            input: input.to_string(),
            expected: EXPECTED_DESIGNATOR,
            found: letter,
        }
    })?;

    Ok((number, designator, &s[end + letter.len_utf8()..]))
}

/// Converts a run of digits and separators. `None` if the run is malformed or too long.
fn parse_number(negative: bool, run: &[u8]) -> Option<Decimal> {
    match run.iter().position(|&b| b == b'.' || b == b',') {
        Some(point) => {
            let fraction = &run[point + 1..];
            if fraction.is_empty() {
                return None;
            }
            Decimal::from_digits(negative, &run[..point], fraction).ok()
        }
        None => Decimal::from_digits(negative, run, &[]).ok(),
    }
}
