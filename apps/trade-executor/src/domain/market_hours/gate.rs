//! Market hours gate.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use super::session::MarketSession;

/// Exchange trading window in exchange-local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketHoursConfig {
    /// Exchange name used in status messages (e.g. "NSE").
    pub exchange: String,
    /// Exchange time zone.
    pub timezone: Tz,
    /// Opening time (inclusive).
    pub open: NaiveTime,
    /// Closing time (inclusive).
    pub close: NaiveTime,
}

impl Default for MarketHoursConfig {
    fn default() -> Self {
        Self {
            exchange: "NSE".to_string(),
            timezone: chrono_tz::Asia::Kolkata,
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Decides whether new broker submissions are allowed at a given instant.
///
/// Trading is permitted Monday to Friday within `[open, close]` in the
/// exchange's local time zone. Exchange holidays are not modelled.
#[derive(Debug, Clone, Default)]
pub struct MarketHoursGate {
    config: MarketHoursConfig,
}

impl MarketHoursGate {
    /// Create a gate for the given trading window.
    #[must_use]
    pub const fn new(config: MarketHoursConfig) -> Self {
        Self { config }
    }

    /// The configured trading window.
    #[must_use]
    pub const fn config(&self) -> &MarketHoursConfig {
        &self.config
    }

    /// Classify an instant against the trading window.
    #[must_use]
    pub fn session_at(&self, now: DateTime<Utc>) -> MarketSession {
        let local = now.with_timezone(&self.config.timezone);
        let weekday = local.weekday();
        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            return MarketSession::Weekend(weekday);
        }

        let time = local.time();
        if time < self.config.open {
            MarketSession::PreOpen
        } else if time > self.config.close {
            MarketSession::PostClose
        } else {
            MarketSession::Open
        }
    }

    /// Whether trading is permitted at `now`.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.session_at(now).is_open()
    }

    /// Human-readable, actionable explanation of the market state at `now`.
    #[must_use]
    pub fn status_message(&self, now: DateTime<Utc>) -> String {
        let local = now.with_timezone(&self.config.timezone);
        let zone = local.format("%Z").to_string();
        let exchange = &self.config.exchange;
        let open = self.config.open.format("%-I:%M %p");
        let close = self.config.close.format("%-I:%M %p");
        let current = local.format("%I:%M %p");

        match self.session_at(now) {
            MarketSession::Weekend(day) => format!(
                "Market is closed today ({}). {exchange} trades Monday-Friday, {open} - {close} {zone}.",
                weekday_name(day)
            ),
            MarketSession::PreOpen => format!(
                "Market has not opened yet. {exchange} opens at {open} {zone} (current time: {current} {zone})."
            ),
            MarketSession::PostClose => format!(
                "Market is closed for today. {exchange} closed at {close} {zone} (current time: {current} {zone}). \
                 Please try again on the next trading day."
            ),
            MarketSession::Open => "Market is open.".to_string(),
        }
    }

    /// Batch-admission check: `(is_open, message)` so a closed market is
    /// rejected before any background work starts.
    #[must_use]
    pub fn precheck_market_open(&self, now: DateTime<Utc>) -> (bool, String) {
        (self.is_open(now), self.status_message(now))
    }
}

const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;
    use test_case::test_case;

    /// 2026-10-19 is a Monday.
    fn ist(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Kolkata
            .with_ymd_and_hms(2026, 10, day, hour, minute, second)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test_case(19, 9, 15, 0, true ; "monday at the opening bell")]
    #[test_case(19, 12, 0, 0, true ; "monday midday")]
    #[test_case(23, 15, 30, 0, true ; "friday at the closing bell")]
    #[test_case(19, 9, 14, 59, false ; "one second before open")]
    #[test_case(19, 15, 30, 1, false ; "one second after close")]
    #[test_case(20, 7, 0, 0, false ; "tuesday early morning")]
    #[test_case(21, 22, 0, 0, false ; "wednesday night")]
    #[test_case(24, 11, 0, 0, false ; "saturday during session hours")]
    #[test_case(25, 11, 0, 0, false ; "sunday during session hours")]
    fn is_open_follows_weekday_window(day: u32, h: u32, m: u32, s: u32, expected: bool) {
        let gate = MarketHoursGate::default();
        assert_eq!(gate.is_open(ist(day, h, m, s)), expected);
    }

    #[test]
    fn weekend_is_judged_in_exchange_local_time() {
        // Friday 20:00 UTC is already Saturday 01:30 IST.
        let now = Utc.with_ymd_and_hms(2026, 10, 23, 20, 0, 0).unwrap();
        let gate = MarketHoursGate::default();
        assert_eq!(gate.session_at(now), MarketSession::Weekend(Weekday::Sat));
    }

    #[test]
    fn weekend_message_names_the_day() {
        let gate = MarketHoursGate::default();
        let msg = gate.status_message(ist(25, 10, 0, 0));
        assert!(msg.contains("Sunday"));
        assert!(msg.contains("Monday-Friday, 9:15 AM - 3:30 PM IST"));
    }

    #[test]
    fn pre_open_message_shows_opening_time() {
        let gate = MarketHoursGate::default();
        let msg = gate.status_message(ist(19, 8, 5, 0));
        assert!(msg.starts_with("Market has not opened yet."));
        assert!(msg.contains("opens at 9:15 AM IST"));
        assert!(msg.contains("08:05 AM IST"));
    }

    #[test]
    fn post_close_message_suggests_next_day() {
        let gate = MarketHoursGate::default();
        let msg = gate.status_message(ist(19, 16, 10, 0));
        assert!(msg.starts_with("Market is closed for today."));
        assert!(msg.contains("closed at 3:30 PM IST"));
        assert!(msg.contains("next trading day"));
    }

    #[test]
    fn open_message() {
        let gate = MarketHoursGate::default();
        assert_eq!(gate.status_message(ist(19, 10, 0, 0)), "Market is open.");
    }

    #[test]
    fn precheck_pairs_flag_with_message() {
        let gate = MarketHoursGate::default();
        let (open, message) = gate.precheck_market_open(ist(24, 10, 0, 0));
        assert!(!open);
        assert!(message.contains("Saturday"));
    }

    #[test]
    fn custom_window_and_zone() {
        let gate = MarketHoursGate::new(MarketHoursConfig {
            exchange: "NYSE".to_string(),
            timezone: chrono_tz::America::New_York,
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        });
        // 14:00 UTC on a Monday in October is 10:00 EDT.
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap();
        assert!(gate.is_open(now));
        let msg = gate.status_message(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap());
        assert!(msg.contains("NYSE opens at 9:30 AM EDT"));
    }
}
