//! # PromQL Query Builder
//!
//! Pure, deterministic construction of PromQL strings from semantic SLO
//! parameters. No function here performs I/O, touches shared state, or
//! validates queries against a backend; the output is plain strings for the
//! provisioning layer to embed into panels or alerting rules.
//!
//! ## Conventions
//!
//! Every metric name is prefixed with the service namespace, targeting the
//! OpenTelemetry HTTP server duration instruments:
//!
//! - `{namespace}_http_server_duration_milliseconds_count`
//! - `{namespace}_http_server_duration_milliseconds_bucket`
//!
//! Ratio queries come in two variants selected by [`RatioUnit`]:
//! [`RatioUnit::Percent`] appends ` * 100` (0-100 scale, for panels) and
//! [`RatioUnit::Fraction`] omits it (0-1 scale, for burn-rate composition).
//! The percentage multiplier always sits outside the parenthesized ratio.
//!
//! ## Determinism
//!
//! Calling any builder twice with identical arguments yields byte-identical
//! strings: there are no counters, timestamps, or generated identifiers.

mod filter;

pub use filter::MetricFilter;

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix of the request-count metric (histogram `_count` series).
const DURATION_COUNT: &str = "http_server_duration_milliseconds_count";
/// Suffix of the latency histogram bucket series.
const DURATION_BUCKET: &str = "http_server_duration_milliseconds_bucket";

/// Matcher excluding server errors (availability numerator).
const NON_SERVER_ERROR: &str = "http_status_code!~\"5..\"";
/// Matcher selecting 2xx-4xx responses (success-rate numerator).
const SUCCESS_CLASS: &str = "http_status_code=~\"[2-4]..\"";

/// Scale of a ratio query.
///
/// Dashboards use the percentage form; burn-rate composition requires the
/// fraction form, so both are exposed everywhere a ratio is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioUnit {
    /// 0-1 scale, no multiplier.
    Fraction,
    /// 0-100 scale, ` * 100` appended.
    Percent,
}

/// Recognized range-vector durations.
///
/// The token set is closed: PromQL range selectors embed these verbatim, so
/// an unrecognized token is a configuration error, not a pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeRange {
    Seconds30,
    Minutes1,
    Minutes2,
    Minutes5,
    Minutes10,
    Minutes30,
    Hours1,
    Hours6,
    Days1,
}

impl TimeRange {
    /// The PromQL token, as it appears inside `[...]` selectors.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Seconds30 => "30s",
            TimeRange::Minutes1 => "1m",
            TimeRange::Minutes2 => "2m",
            TimeRange::Minutes5 => "5m",
            TimeRange::Minutes10 => "10m",
            TimeRange::Minutes30 => "30m",
            TimeRange::Hours1 => "1h",
            TimeRange::Hours6 => "6h",
            TimeRange::Days1 => "1d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30s" => Ok(TimeRange::Seconds30),
            "1m" => Ok(TimeRange::Minutes1),
            "2m" => Ok(TimeRange::Minutes2),
            "5m" => Ok(TimeRange::Minutes5),
            "10m" => Ok(TimeRange::Minutes10),
            "30m" => Ok(TimeRange::Minutes30),
            "1h" => Ok(TimeRange::Hours1),
            "6h" => Ok(TimeRange::Hours6),
            "1d" => Ok(TimeRange::Days1),
            _ => Err(format!("Unrecognized time range token: {}", s)),
        }
    }
}

impl TryFrom<String> for TimeRange {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> Self {
        range.as_str().to_string()
    }
}

/// `sum(rate(...))` over one namespaced metric with an optional selector.
fn rate_sum(namespace: &str, metric: &str, matchers: &str, range: TimeRange) -> String {
    format!(
        "sum(rate({namespace}_{metric}{selector}[{range}]))",
        selector = filter::selector(matchers)
    )
}

/// Parenthesized ratio of two aggregates, scaled per `unit`.
fn ratio(numerator: &str, denominator: &str, unit: RatioUnit) -> String {
    match unit {
        RatioUnit::Fraction => format!("({numerator}) / ({denominator})"),
        RatioUnit::Percent => format!("({numerator}) / ({denominator}) * 100"),
    }
}

fn matchers_of(filter: Option<&MetricFilter>) -> &str {
    filter.map(MetricFilter::as_str).unwrap_or("")
}

/// Availability of a service: share of requests that did not return 5xx.
///
/// The numerator restricts to non-5xx status codes; the denominator counts
/// all requests. The result is nominally 0-100 in the [`RatioUnit::Percent`]
/// form (the query itself does not clamp).
pub fn availability_query(namespace: &str, range: TimeRange, unit: RatioUnit) -> String {
    filtered_availability_query(namespace, range, None, unit)
}

/// Availability restricted to one traffic slice.
///
/// `filter` is merged into both numerator and denominator, so the ratio only
/// covers matching requests. Passing `None` yields [`availability_query`].
pub fn filtered_availability_query(
    namespace: &str,
    range: TimeRange,
    filter: Option<&MetricFilter>,
    unit: RatioUnit,
) -> String {
    let extra = matchers_of(filter);
    let numerator = filter::join_matchers(&[NON_SERVER_ERROR, extra]);
    ratio(
        &rate_sum(namespace, DURATION_COUNT, &numerator, range),
        &rate_sum(namespace, DURATION_COUNT, extra, range),
        unit,
    )
}

/// Success rate: share of requests answered with a 2xx-4xx status.
///
/// The caller-supplied filter is comma-joined after the status matcher in
/// the numerator and applied alone to the denominator. An absent filter
/// leaves no trace: no trailing comma, no empty braces.
pub fn success_rate_query(
    namespace: &str,
    range: TimeRange,
    filter: Option<&MetricFilter>,
    unit: RatioUnit,
) -> String {
    let extra = matchers_of(filter);
    let numerator = filter::join_matchers(&[SUCCESS_CLASS, extra]);
    ratio(
        &rate_sum(namespace, DURATION_COUNT, &numerator, range),
        &rate_sum(namespace, DURATION_COUNT, extra, range),
        unit,
    )
}

/// Latency quantile over the duration histogram, in milliseconds.
///
/// `percentile` is embedded as supplied (e.g. `0.95` renders `0.95`). When
/// `filter` is absent the bucket selector has no braces at all.
pub fn percentile_latency_query(
    namespace: &str,
    range: TimeRange,
    percentile: f64,
    filter: Option<&MetricFilter>,
) -> String {
    let selector = filter::selector(matchers_of(filter));
    format!(
        "histogram_quantile({percentile}, sum by(le) \
         (rate({namespace}_{DURATION_BUCKET}{selector}[{range}])))"
    )
}

/// Share of requests completing within `threshold_ms`.
///
/// Counts observations falling into the `le="{threshold_ms}"` bucket against
/// the total request count. The threshold must match a configured histogram
/// bucket boundary to be meaningful; it is embedded as a bare integer inside
/// the quoted label value (`le="200"`).
pub fn latency_percentage_query(
    namespace: &str,
    range: TimeRange,
    threshold_ms: u32,
    filter: Option<&MetricFilter>,
    unit: RatioUnit,
) -> String {
    let extra = matchers_of(filter);
    let bucket_matcher = format!("le=\"{threshold_ms}\"");
    let numerator = filter::join_matchers(&[&bucket_matcher, extra]);
    ratio(
        &rate_sum(namespace, DURATION_BUCKET, &numerator, range),
        &rate_sum(namespace, DURATION_COUNT, extra, range),
        unit,
    )
}

/// Burn rate of the error budget implied by `objective`.
///
/// `query` must be a fraction-scale (0-1) availability or success query; the
/// result is `(1 - query) / budget` where `budget` is the objective's
/// complement formatted to exactly five decimal places (`0.99` → `0.01000`).
/// A burn rate of 1 consumes the budget exactly as fast as allotted.
///
/// # Errors
///
/// Returns [`EngineError::ObjectiveOutOfRange`] unless `objective` lies in
/// `[0, 1)`; an objective of 1 leaves no budget to divide by.
pub fn burn_rate_query(query: &str, objective: f64) -> Result<String, EngineError> {
    if !(0.0..1.0).contains(&objective) {
        return Err(EngineError::ObjectiveOutOfRange { value: objective });
    }
    let budget = format!("{:.5}", 1.0 - objective);
    Ok(format!("(1 - {query}) / {budget}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_filter() -> MetricFilter {
        MetricFilter::new(r#"http_route=~"/api/.*""#)
    }

    #[test]
    fn test_time_range_tokens_round_trip() {
        for token in ["30s", "1m", "2m", "5m", "10m", "30m", "1h", "6h", "1d"] {
            let range: TimeRange = token.parse().unwrap();
            assert_eq!(range.to_string(), token);
        }
    }

    #[test]
    fn test_time_range_rejects_unknown_token() {
        assert!("90s".parse::<TimeRange>().is_err());
        assert!("2 m".parse::<TimeRange>().is_err());
        assert!("".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_time_range_serde_uses_token() {
        let json = serde_json::to_string(&TimeRange::Minutes2).unwrap();
        assert_eq!(json, "\"2m\"");
        let back: TimeRange = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(back, TimeRange::Hours1);
        assert!(serde_json::from_str::<TimeRange>("\"7m\"").is_err());
    }

    #[test]
    fn test_availability_query_percent() {
        let query = availability_query("app", TimeRange::Minutes2, RatioUnit::Percent);
        assert_eq!(
            query,
            "(sum(rate(app_http_server_duration_milliseconds_count\
             {http_status_code!~\"5..\"}[2m]))) / \
             (sum(rate(app_http_server_duration_milliseconds_count[2m]))) * 100"
        );
    }

    #[test]
    fn test_availability_numerator_only_restricts_5xx() {
        let query = availability_query("app", TimeRange::Hours1, RatioUnit::Percent);
        assert_eq!(query.matches("http_status_code!~\"5..\"").count(), 1);
        assert_eq!(query.matches(" * 100").count(), 1);
        // The restriction sits before the divide, i.e. in the numerator.
        let divide = query.find(") / (").unwrap();
        assert!(query.find("http_status_code!~").unwrap() < divide);
    }

    #[test]
    fn test_availability_fraction_has_no_multiplier() {
        let query = availability_query("app", TimeRange::Minutes5, RatioUnit::Fraction);
        assert!(!query.contains("* 100"));
        assert!(query.ends_with("[5m])))"));
    }

    #[test]
    fn test_filtered_availability_merges_both_sides() {
        let filter = api_filter();
        let query = filtered_availability_query(
            "app",
            TimeRange::Minutes2,
            Some(&filter),
            RatioUnit::Percent,
        );
        assert!(query.contains(
            "{http_status_code!~\"5..\",http_route=~\"/api/.*\"}"
        ));
        assert!(query.contains(
            "app_http_server_duration_milliseconds_count{http_route=~\"/api/.*\"}[2m]"
        ));
    }

    #[test]
    fn test_success_rate_without_filter_has_no_trailing_comma() {
        let query = success_rate_query("app", TimeRange::Minutes2, None, RatioUnit::Percent);
        assert!(query.contains("{http_status_code=~\"[2-4]..\"}"));
        assert!(!query.contains(","));
        assert!(!query.contains("{}"));
        // Unfiltered denominator: bare metric name before the range selector.
        assert!(query.contains("app_http_server_duration_milliseconds_count[2m])))"));
    }

    #[test]
    fn test_success_rate_with_filter_joins_in_order() {
        let filter = api_filter();
        let query =
            success_rate_query("app", TimeRange::Minutes2, Some(&filter), RatioUnit::Percent);
        assert!(query.contains(
            "{http_status_code=~\"[2-4]..\",http_route=~\"/api/.*\"}"
        ));
        assert!(query.contains(
            "app_http_server_duration_milliseconds_count{http_route=~\"/api/.*\"}[2m]"
        ));
    }

    #[test]
    fn test_percentile_latency_matches_worked_example() {
        let filter = api_filter();
        let query = percentile_latency_query("app", TimeRange::Minutes2, 0.95, Some(&filter));
        assert_eq!(
            query,
            "histogram_quantile(0.95, sum by(le) \
             (rate(app_http_server_duration_milliseconds_bucket\
             {http_route=~\"/api/.*\"}[2m])))"
        );
    }

    #[test]
    fn test_percentile_latency_omits_empty_braces() {
        let query = percentile_latency_query("app", TimeRange::Minutes2, 0.99, None);
        assert!(query.contains("_bucket[2m]"));
        assert!(!query.contains("{}"));
    }

    #[test]
    fn test_latency_percentage_matches_worked_example() {
        let filter = api_filter();
        let query = latency_percentage_query(
            "app",
            TimeRange::Minutes2,
            200,
            Some(&filter),
            RatioUnit::Percent,
        );
        assert_eq!(
            query,
            "(sum(rate(app_http_server_duration_milliseconds_bucket\
             {le=\"200\",http_route=~\"/api/.*\"}[2m]))) / \
             (sum(rate(app_http_server_duration_milliseconds_count\
             {http_route=~\"/api/.*\"}[2m]))) * 100"
        );
    }

    #[test]
    fn test_latency_percentage_without_filter() {
        let query =
            latency_percentage_query("app", TimeRange::Minutes5, 250, None, RatioUnit::Percent);
        assert!(query.contains("{le=\"250\"}"));
        assert!(query.contains("app_http_server_duration_milliseconds_count[5m]"));
    }

    #[test]
    fn test_burn_rate_formats_budget_to_five_decimals() {
        let query = burn_rate_query("q", 0.99).unwrap();
        assert_eq!(query, "(1 - q) / 0.01000");

        let query = burn_rate_query("q", 0.999).unwrap();
        assert_eq!(query, "(1 - q) / 0.00100");

        let query = burn_rate_query("q", 0.95).unwrap();
        assert_eq!(query, "(1 - q) / 0.05000");
    }

    #[test]
    fn test_burn_rate_composes_with_fraction_query() {
        let availability = availability_query("app", TimeRange::Hours1, RatioUnit::Fraction);
        let query = burn_rate_query(&availability, 0.99).unwrap();
        assert!(query.starts_with("(1 - (sum(rate(app_"));
        assert!(query.ends_with(") / 0.01000"));
        assert!(!query.contains("* 100"));
    }

    #[test]
    fn test_burn_rate_rejects_objective_out_of_range() {
        assert!(matches!(
            burn_rate_query("q", 1.0),
            Err(EngineError::ObjectiveOutOfRange { .. })
        ));
        assert!(burn_rate_query("q", -0.1).is_err());
        assert!(burn_rate_query("q", 0.0).is_ok());
    }

    #[test]
    fn test_builders_are_idempotent() {
        let filter = api_filter();
        let first =
            success_rate_query("app", TimeRange::Minutes2, Some(&filter), RatioUnit::Percent);
        let second =
            success_rate_query("app", TimeRange::Minutes2, Some(&filter), RatioUnit::Percent);
        assert_eq!(first, second);

        let first = percentile_latency_query("app", TimeRange::Minutes2, 0.95, None);
        let second = percentile_latency_query("app", TimeRange::Minutes2, 0.95, None);
        assert_eq!(first, second);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_range() -> impl Strategy<Value = TimeRange> {
            prop_oneof![
                Just(TimeRange::Seconds30),
                Just(TimeRange::Minutes2),
                Just(TimeRange::Minutes5),
                Just(TimeRange::Hours1),
                Just(TimeRange::Days1),
            ]
        }

        proptest! {
            /// Percent-form ratios carry exactly one `* 100` suffix.
            #[test]
            fn prop_percent_has_single_multiplier(
                namespace in "[a-z][a-z0-9_]{0,15}",
                range in any_range(),
            ) {
                let query = availability_query(&namespace, range, RatioUnit::Percent);
                prop_assert_eq!(query.matches("* 100").count(), 1);
                prop_assert!(query.ends_with("* 100"));
            }

            /// No builder output ever contains empty braces or comma damage.
            #[test]
            fn prop_selectors_never_malformed(
                namespace in "[a-z][a-z0-9_]{0,15}",
                range in any_range(),
                fragment in "([a-z_]{1,10}=\"[a-z0-9/.]{0,10}\")?",
            ) {
                let filter = MetricFilter::new(fragment);
                let opt = if filter.is_empty() { None } else { Some(&filter) };
                for query in [
                    success_rate_query(&namespace, range, opt, RatioUnit::Percent),
                    percentile_latency_query(&namespace, range, 0.95, opt),
                    latency_percentage_query(&namespace, range, 200, opt, RatioUnit::Fraction),
                ] {
                    prop_assert!(!query.contains("{}"), "empty braces in {}", query);
                    prop_assert!(!query.contains(",}"), "trailing comma in {}", query);
                    prop_assert!(!query.contains("{,"), "leading comma in {}", query);
                    prop_assert!(!query.contains(",,"), "doubled comma in {}", query);
                }
            }

            /// The burn-rate budget literal always has exactly five decimals.
            #[test]
            fn prop_burn_rate_budget_precision(objective in 0.0..0.9999f64) {
                let query = burn_rate_query("q", objective).unwrap();
                let budget = query.rsplit(" / ").next().unwrap();
                let decimals = budget.split('.').nth(1).unwrap();
                prop_assert_eq!(decimals.len(), 5, "budget {} in {}", budget, query);
            }
        }
    }
}
