use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

pub mod auth_service;
pub mod product_service;
pub mod purchase_service;
pub mod report_service;
pub(crate) mod sequences;
pub mod stock_service;
pub mod transaction_service;
pub mod user_service;

/// Half-open UTC window [midnight, next midnight) for one calendar day.
pub(crate) fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}
