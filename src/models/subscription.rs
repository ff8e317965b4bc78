use chrono::{Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPeriod {
    Monthly,
    Quarterly,
    Biannual,
    Annual,
    OneTime,
}

impl SubscriptionPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPeriod::Monthly => "monthly",
            SubscriptionPeriod::Quarterly => "quarterly",
            SubscriptionPeriod::Biannual => "biannual",
            SubscriptionPeriod::Annual => "annual",
            SubscriptionPeriod::OneTime => "one_time",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(SubscriptionPeriod::Monthly),
            "quarterly" => Some(SubscriptionPeriod::Quarterly),
            "biannual" => Some(SubscriptionPeriod::Biannual),
            "annual" => Some(SubscriptionPeriod::Annual),
            "one_time" => Some(SubscriptionPeriod::OneTime),
            _ => None,
        }
    }

    fn months(&self) -> u32 {
        match self {
            SubscriptionPeriod::Monthly => 1,
            SubscriptionPeriod::Quarterly => 3,
            SubscriptionPeriod::Biannual => 6,
            SubscriptionPeriod::Annual => 12,
            // one-off purchases never lapse in practice
            SubscriptionPeriod::OneTime => 100 * 12,
        }
    }

    /// Month arithmetic clamps to the last day of shorter months (Jan 31 + 1 month = Feb 28/29).
    pub fn end_date(&self, start: NaiveDateTime) -> NaiveDateTime {
        start
            .checked_add_months(Months::new(self.months()))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub period: SubscriptionPeriod,
    pub is_platform_plan: bool,
    pub instructor_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSubscription {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub instructor_id: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_end_date_per_period() {
        let start = dt("2025-01-15 10:00");
        assert_eq!(SubscriptionPeriod::Monthly.end_date(start), dt("2025-02-15 10:00"));
        assert_eq!(SubscriptionPeriod::Quarterly.end_date(start), dt("2025-04-15 10:00"));
        assert_eq!(SubscriptionPeriod::Biannual.end_date(start), dt("2025-07-15 10:00"));
        assert_eq!(SubscriptionPeriod::Annual.end_date(start), dt("2026-01-15 10:00"));
        assert_eq!(SubscriptionPeriod::OneTime.end_date(start), dt("2125-01-15 10:00"));
    }

    #[test]
    fn test_end_date_clamps_short_month() {
        let start = dt("2025-01-31 08:00");
        assert_eq!(SubscriptionPeriod::Monthly.end_date(start), dt("2025-02-28 08:00"));
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(SubscriptionPeriod::parse("one_time"), Some(SubscriptionPeriod::OneTime));
        assert_eq!(SubscriptionPeriod::parse("weekly"), None);
    }
}
