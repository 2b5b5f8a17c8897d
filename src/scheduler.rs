use chrono::{Duration, NaiveTime, Utc};

use crate::{services::report_service, state::AppState};

/// Nightly report loop: sleep until the configured wall-clock time (UTC),
/// write yesterday's report, repeat. Failures are logged and the next
/// night is attempted as usual.
pub async fn run(state: AppState, hour: u32, minute: u32) {
    loop {
        let wait = until_next(hour, minute);
        tracing::debug!(seconds = wait.as_secs(), "scheduler sleeping");
        tokio::time::sleep(wait).await;

        let yesterday = (Utc::now() - Duration::days(1)).date_naive();
        match report_service::generate_daily_report(&state, yesterday).await {
            Ok(report) => {
                tracing::info!(
                    date = %yesterday,
                    sales = %report.total_sales,
                    transactions = report.transaction_count,
                    "nightly report generated"
                );
            }
            Err(err) => {
                tracing::error!(date = %yesterday, error = %err, "nightly report failed");
            }
        }
    }
}

fn until_next(hour: u32, minute: u32) -> std::time::Duration {
    let now = Utc::now();
    let at = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let mut next = now.date_naive().and_time(at).and_utc();
    if next <= now {
        next += Duration::days(1);
    }
    (next - now)
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::until_next;

    #[test]
    fn sleep_is_always_within_one_day() {
        for hour in [0, 6, 23] {
            let wait = until_next(hour, 30);
            assert!(wait <= std::time::Duration::from_secs(24 * 60 * 60));
            assert!(wait > std::time::Duration::ZERO);
        }
    }
}
