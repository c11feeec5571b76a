//! Parameter validation applied before any request leaves the client.
//!
//! Rules are keyed by parameter name. Names without a rule pass through
//! untouched; the remote API has the final say on those.

use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::catalog::Endpoint;
use crate::error::ValidationError;
use crate::params::{ParamValue, Params};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const DATE_FIELDS: &[&str] = &[
    "showdate",
    "showdate_gt",
    "showdate_gte",
    "showdate_lt",
    "showdate_lte",
    "posted_on",
    "posted_after",
    "posted_before",
];

const NUMBER_FIELDS: &[&str] = &[
    "showid",
    "uid",
    "tourid",
    "venueid",
    "limit",
    "collectionid",
    "songid",
];

const ID_LIST_FIELDS: &[&str] = &["contains", "showids"];

/// Rule applied to a known parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    MonthName,
    Year,
    Month,
    Day,
    Date,
    Number,
    IdList,
}

impl Rule {
    pub fn for_field(field: &str) -> Option<Self> {
        match field {
            "monthname" => Some(Self::MonthName),
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            f if DATE_FIELDS.contains(&f) => Some(Self::Date),
            f if NUMBER_FIELDS.contains(&f) => Some(Self::Number),
            f if ID_LIST_FIELDS.contains(&f) => Some(Self::IdList),
            _ => None,
        }
    }
}

/// Stateless rule table. `current_year` is fixed at construction so the
/// upper bound on `year` is stable for the lifetime of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamValidator {
    current_year: i32,
}

impl Default for ParamValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamValidator {
    pub fn new() -> Self {
        Self::with_current_year(OffsetDateTime::now_utc().year())
    }

    pub const fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    pub const fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Checks every parameter of a call against the rule table.
    pub fn validate(
        &self,
        endpoint: &Endpoint<'_>,
        params: &Params,
    ) -> Result<(), ValidationError> {
        if endpoint.requires_any && params.is_empty() {
            return Err(ValidationError::MissingParameters {
                endpoint: endpoint.name.to_owned(),
                expected: endpoint.params.iter().map(|p| (*p).to_owned()).collect(),
            });
        }

        for (field, value) in params {
            if let Some(rule) = Rule::for_field(field) {
                self.check(endpoint, rule, field, value)?;
            }
        }

        Ok(())
    }

    fn check(
        &self,
        endpoint: &Endpoint<'_>,
        rule: Rule,
        field: &str,
        value: &ParamValue,
    ) -> Result<(), ValidationError> {
        let name = endpoint.name;
        match rule {
            Rule::MonthName => {
                let text = value.to_string();
                if MONTH_NAMES.contains(&text.as_str()) {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidMonthName {
                        endpoint: name.to_owned(),
                        value: text,
                    })
                }
            }
            Rule::Year => {
                let year = integer(name, field, value)?;
                let floor = i64::from(endpoint.year_floor());
                let current = i64::from(self.current_year);
                if (floor..=current).contains(&year) {
                    Ok(())
                } else {
                    Err(ValidationError::YearOutOfRange {
                        endpoint: name.to_owned(),
                        year,
                        floor,
                        current,
                    })
                }
            }
            Rule::Month => {
                let month = integer(name, field, value)?;
                if (1..=12).contains(&month) {
                    Ok(())
                } else {
                    Err(ValidationError::MonthOutOfRange {
                        endpoint: name.to_owned(),
                        value: month,
                    })
                }
            }
            Rule::Day => {
                let day = integer(name, field, value)?;
                if (1..=31).contains(&day) {
                    Ok(())
                } else {
                    Err(ValidationError::DayOutOfRange {
                        endpoint: name.to_owned(),
                        value: day,
                    })
                }
            }
            Rule::Date => parse_date(&value.to_string())
                .map(|_| ())
                .ok_or_else(|| ValidationError::InvalidDate {
                    endpoint: name.to_owned(),
                    field: field.to_owned(),
                    value: value.to_string(),
                }),
            Rule::Number => {
                if value.is_integral() {
                    Ok(())
                } else {
                    Err(ValidationError::NotANumber {
                        endpoint: name.to_owned(),
                        field: field.to_owned(),
                        value: value.to_string(),
                    })
                }
            }
            Rule::IdList => {
                let raw = value.to_string();
                let all_numeric = raw.split(',').all(|id| ParamValue::from(id).is_integral());
                if all_numeric {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidIdList {
                        endpoint: name.to_owned(),
                        field: field.to_owned(),
                        value: raw,
                    })
                }
            }
        }
    }
}

fn integer(endpoint: &str, field: &str, value: &ParamValue) -> Result<i64, ValidationError> {
    value.as_int().ok_or_else(|| ValidationError::NotANumber {
        endpoint: endpoint.to_owned(),
        field: field.to_owned(),
        value: value.to_string(),
    })
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Option<Date> {
    // `[year]` alone would also take a leading sign.
    if input.len() != 10 || !input.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    Date::parse(input, format_description!("[year]-[month]-[day]")).ok()
}
