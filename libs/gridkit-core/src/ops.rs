//! Closed operator enumerations for filter keys (`field__operator`).

/// Comparison and pattern operators.
///
/// An operator token that parses into neither [`FilterOp`] nor
/// [`DatePart`] yields no predicate — malformed keys degrade to a no-op
/// instead of an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Not,
    In,
    NotIn,
    Gte,
    Gt,
    Lte,
    Lt,
    Range,
    IsNull,
    NotIsNull,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Exact,
    IExact,
    Regex,
    IRegex,
    Search,
}

impl FilterOp {
    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "not" => Self::Not,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "gte" => Self::Gte,
            "gt" => Self::Gt,
            "lte" => Self::Lte,
            "lt" => Self::Lt,
            "range" => Self::Range,
            "isnull" => Self::IsNull,
            "not_isnull" => Self::NotIsNull,
            "contains" => Self::Contains,
            "icontains" => Self::IContains,
            "startswith" => Self::StartsWith,
            "istartswith" => Self::IStartsWith,
            "endswith" => Self::EndsWith,
            "iendswith" => Self::IEndsWith,
            "exact" => Self::Exact,
            "iexact" => Self::IExact,
            "regex" => Self::Regex,
            "iregex" => Self::IRegex,
            "search" => Self::Search,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Gte => "gte",
            Self::Gt => "gt",
            Self::Lte => "lte",
            Self::Lt => "lt",
            Self::Range => "range",
            Self::IsNull => "isnull",
            Self::NotIsNull => "not_isnull",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Regex => "regex",
            Self::IRegex => "iregex",
            Self::Search => "search",
        }
    }
}

/// Date-part extraction operators (`created_at__year`, `birthday__week_day`, …).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatePart {
    Date,
    Year,
    IsoYear,
    Quarter,
    Month,
    Week,
    WeekDay,
    IsoWeekDay,
    Day,
    Time,
    Hour,
    Minute,
    Second,
    Microsecond,
}

impl DatePart {
    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "date" => Self::Date,
            "year" => Self::Year,
            "iso_year" => Self::IsoYear,
            "quarter" => Self::Quarter,
            "month" => Self::Month,
            "week" => Self::Week,
            "week_day" => Self::WeekDay,
            "iso_week_day" => Self::IsoWeekDay,
            "day" => Self::Day,
            "time" => Self::Time,
            "hour" => Self::Hour,
            "minute" => Self::Minute,
            "second" => Self::Second,
            "microsecond" => Self::Microsecond,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Year => "year",
            Self::IsoYear => "iso_year",
            Self::Quarter => "quarter",
            Self::Month => "month",
            Self::Week => "week",
            Self::WeekDay => "week_day",
            Self::IsoWeekDay => "iso_week_day",
            Self::Day => "day",
            Self::Time => "time",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Microsecond => "microsecond",
        }
    }
}
