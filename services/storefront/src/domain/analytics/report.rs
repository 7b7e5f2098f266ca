//! 报表
//!
//! 报表类型与参数在入口处解析为强类型的 `ReportQuery`，未知类型或参数不合法时返回校验错误。

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use shop_errors::{AppError, AppResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::{Event, EventType};

/// 报表参数（键唯一，顺序无关）
pub type ReportParams = BTreeMap<String, String>;

/// 报表类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    EventSummary,
    UserEngagement,
    ConversionFunnel,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::EventSummary => "event_summary",
            ReportType::UserEngagement => "user_engagement",
            ReportType::ConversionFunnel => "conversion_funnel",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event_summary" => Ok(ReportType::EventSummary),
            "user_engagement" => Ok(ReportType::UserEngagement),
            "conversion_funnel" => Ok(ReportType::ConversionFunnel),
            other => Err(AppError::validation(format!(
                "Unknown report type: {}",
                other
            ))),
        }
    }
}

/// 闭区间日期范围（UTC 自然日）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> AppResult<Self> {
        if from > to {
            return Err(AppError::validation(format!(
                "Report range is inverted: from {} is after to {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// 起始时刻（含）
    pub fn start(&self) -> DateTime<Utc> {
        self.from.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// 结束时刻（不含），即 `to` 的次日零点
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        let next = self.to.succ_opt().unwrap_or(NaiveDate::MAX);
        next.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start() && at < self.end_exclusive()
    }
}

/// 解析后的报表请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportQuery {
    EventSummary {
        range: DateRange,
        event_type: Option<EventType>,
    },
    UserEngagement {
        range: DateRange,
        limit: usize,
    },
    ConversionFunnel {
        range: DateRange,
    },
}

const DEFAULT_ENGAGEMENT_LIMIT: usize = 10;
const MAX_ENGAGEMENT_LIMIT: usize = 100;

fn required<'a>(
    params: &'a ReportParams,
    key: &str,
    report_type: ReportType,
) -> AppResult<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::validation(format!(
                "Report {} requires parameter '{}'",
                report_type, key
            ))
        })
}

fn parse_date(key: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!(
            "Parameter '{}' must be a date in YYYY-MM-DD format, got '{}'",
            key, value
        ))
    })
}

fn parse_range(params: &ReportParams, report_type: ReportType) -> AppResult<DateRange> {
    let from = parse_date("from", required(params, "from", report_type)?)?;
    let to = parse_date("to", required(params, "to", report_type)?)?;
    DateRange::new(from, to)
}

impl ReportQuery {
    /// 从报表类型字符串与参数解析
    pub fn parse(report_type: &str, params: &ReportParams) -> AppResult<Self> {
        let kind: ReportType = report_type.parse()?;
        let range = parse_range(params, kind)?;

        match kind {
            ReportType::EventSummary => {
                let event_type = params
                    .get("event_type")
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(EventType::from_str)
                    .transpose()?;
                Ok(ReportQuery::EventSummary { range, event_type })
            }
            ReportType::UserEngagement => {
                let limit = match params.get("limit").map(|v| v.trim()) {
                    None | Some("") => DEFAULT_ENGAGEMENT_LIMIT,
                    Some(raw) => raw
                        .parse::<usize>()
                        .ok()
                        .filter(|n| (1..=MAX_ENGAGEMENT_LIMIT).contains(n))
                        .ok_or_else(|| {
                            AppError::validation(format!(
                                "Parameter 'limit' must be between 1 and {}, got '{}'",
                                MAX_ENGAGEMENT_LIMIT, raw
                            ))
                        })?,
                };
                Ok(ReportQuery::UserEngagement { range, limit })
            }
            ReportType::ConversionFunnel => Ok(ReportQuery::ConversionFunnel { range }),
        }
    }

    pub fn report_type(&self) -> ReportType {
        match self {
            ReportQuery::EventSummary { .. } => ReportType::EventSummary,
            ReportQuery::UserEngagement { .. } => ReportType::UserEngagement,
            ReportQuery::ConversionFunnel { .. } => ReportType::ConversionFunnel,
        }
    }

    pub fn range(&self) -> DateRange {
        match self {
            ReportQuery::EventSummary { range, .. }
            | ReportQuery::UserEngagement { range, .. }
            | ReportQuery::ConversionFunnel { range } => *range,
        }
    }

    /// 在内存中对事件集合计算报表
    pub fn evaluate<'a>(&self, events: impl IntoIterator<Item = &'a Event>) -> Report {
        let range = self.range();
        let in_range = events.into_iter().filter(|e| range.contains(e.occurred_at()));

        let data = match self {
            ReportQuery::EventSummary { event_type, .. } => {
                let mut counts: BTreeMap<EventType, u64> = BTreeMap::new();
                for event in in_range.filter(|e| event_type.is_none_or(|t| e.event_type() == t)) {
                    *counts.entry(event.event_type()).or_insert(0) += 1;
                }
                ReportData::EventSummary(EventSummary::from_counts(counts))
            }
            ReportQuery::UserEngagement { limit, .. } => {
                let mut per_user: HashMap<&str, u64> = HashMap::new();
                for user_id in in_range.filter_map(|e| e.user_id()) {
                    *per_user.entry(user_id).or_insert(0) += 1;
                }
                let active_users = per_user.len() as u64;
                let counts = per_user
                    .into_iter()
                    .map(|(user_id, event_count)| UserEventCount {
                        user_id: user_id.to_string(),
                        event_count,
                    })
                    .collect();
                ReportData::UserEngagement(UserEngagement::new(active_users, counts, *limit))
            }
            ReportQuery::ConversionFunnel { .. } => {
                let mut users: [HashSet<&str>; 4] = Default::default();
                for event in in_range {
                    let (Some(step), Some(user_id)) = (
                        ConversionFunnel::STEPS
                            .iter()
                            .position(|t| *t == event.event_type()),
                        event.user_id(),
                    ) else {
                        continue;
                    };
                    users[step].insert(user_id);
                }
                ReportData::ConversionFunnel(ConversionFunnel::from_step_users(
                    users.map(|set| set.len() as u64),
                ))
            }
        };

        Report::new(self, data)
    }
}

/// 报表结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub report_type: ReportType,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub data: ReportData,
}

impl Report {
    pub fn new(query: &ReportQuery, data: ReportData) -> Self {
        let range = query.range();
        Self {
            report_type: query.report_type(),
            from: range.from,
            to: range.to,
            generated_at: Utc::now(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportData {
    EventSummary(EventSummary),
    UserEngagement(UserEngagement),
    ConversionFunnel(ConversionFunnel),
}

/// 事件汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub total_events: u64,
    pub counts: BTreeMap<EventType, u64>,
}

impl EventSummary {
    pub fn from_counts(counts: impl IntoIterator<Item = (EventType, u64)>) -> Self {
        let counts: BTreeMap<EventType, u64> =
            counts.into_iter().filter(|(_, n)| *n > 0).collect();
        Self {
            total_events: counts.values().sum(),
            counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEventCount {
    pub user_id: String,
    pub event_count: u64,
}

/// 用户参与度
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEngagement {
    pub active_users: u64,
    pub top_users: Vec<UserEventCount>,
}

impl UserEngagement {
    /// 按事件数降序（相同时按用户 ID 升序）取前 `limit` 个
    pub fn new(active_users: u64, mut counts: Vec<UserEventCount>, limit: usize) -> Self {
        counts.sort_by(|a, b| {
            b.event_count
                .cmp(&a.event_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        counts.truncate(limit);
        Self {
            active_users,
            top_users: counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStep {
    pub event_type: EventType,
    pub users: u64,
    /// 相对上一步的转化率（百分比），第一步为 100 或 0
    pub conversion_rate: f64,
}

/// 转化漏斗
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionFunnel {
    pub steps: Vec<FunnelStep>,
    /// 末步相对首步的总体转化率（百分比）
    pub overall_rate: f64,
}

fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let pct = numerator as f64 / denominator as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

impl ConversionFunnel {
    pub const STEPS: [EventType; 4] = [
        EventType::ProductView,
        EventType::AddToCart,
        EventType::OrderCreated,
        EventType::OrderCompleted,
    ];

    pub fn from_step_users(users: [u64; 4]) -> Self {
        let steps = Self::STEPS
            .iter()
            .zip(users)
            .enumerate()
            .map(|(i, (event_type, count))| {
                let previous = if i == 0 { count } else { users[i - 1] };
                FunnelStep {
                    event_type: *event_type,
                    users: count,
                    conversion_rate: rate(count, previous),
                }
            })
            .collect();

        Self {
            steps,
            overall_rate: rate(users[3], users[0]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params(pairs: &[(&str, &str)]) -> ReportParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn range(from: &str, to: &str) -> ReportParams {
        params(&[("from", from), ("to", to)])
    }

    fn event(event_type: EventType, user: &str, day: u32) -> Event {
        Event::for_user(event_type, user)
            .unwrap()
            .with_occurred_at(Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_unknown_report_type() {
        let err = ReportQuery::parse("revenue", &range("2026-03-01", "2026-03-02")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_missing_required_param() {
        let err =
            ReportQuery::parse("event_summary", &params(&[("from", "2026-03-01")])).unwrap_err();
        assert!(err.to_string().contains("'to'"));
    }

    #[test]
    fn test_bad_date_and_inverted_range() {
        assert!(ReportQuery::parse("event_summary", &range("03/01/2026", "2026-03-02")).is_err());
        assert!(ReportQuery::parse("event_summary", &range("2026-03-05", "2026-03-02")).is_err());
    }

    #[test]
    fn test_engagement_limit() {
        let base = [("from", "2026-03-01"), ("to", "2026-03-02")];
        let query = ReportQuery::parse("user_engagement", &params(&base)).unwrap();
        assert_eq!(query, ReportQuery::UserEngagement {
            range: query.range(),
            limit: 10,
        });

        let mut with_limit = base.to_vec();
        with_limit.push(("limit", "0"));
        assert!(ReportQuery::parse("user_engagement", &params(&with_limit)).is_err());
        with_limit.pop();
        with_limit.push(("limit", "101"));
        assert!(ReportQuery::parse("user_engagement", &params(&with_limit)).is_err());
    }

    #[test]
    fn test_range_is_inclusive_of_last_day() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
        .unwrap();
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_event_summary_evaluation() {
        let events = vec![
            event(EventType::PageView, "u1", 1),
            event(EventType::PageView, "u2", 2),
            event(EventType::OrderCompleted, "u1", 2),
            event(EventType::PageView, "u1", 9),
        ];
        let query =
            ReportQuery::parse("event_summary", &range("2026-03-01", "2026-03-02")).unwrap();
        let report = query.evaluate(&events);

        let ReportData::EventSummary(summary) = report.data else {
            panic!("expected event summary");
        };
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.counts[&EventType::PageView], 2);
        assert_eq!(summary.counts[&EventType::OrderCompleted], 1);
    }

    #[test]
    fn test_event_summary_type_filter() {
        let events = vec![
            event(EventType::PageView, "u1", 1),
            event(EventType::Search, "u1", 1),
        ];
        let query = ReportQuery::parse(
            "event_summary",
            &params(&[("from", "2026-03-01"), ("to", "2026-03-01"), ("event_type", "SEARCH")]),
        )
        .unwrap();

        let ReportData::EventSummary(summary) = query.evaluate(&events).data else {
            panic!("expected event summary");
        };
        assert_eq!(summary.total_events, 1);
        assert!(!summary.counts.contains_key(&EventType::PageView));
    }

    #[test]
    fn test_user_engagement_ranking() {
        let events = vec![
            event(EventType::PageView, "u1", 1),
            event(EventType::PageView, "u2", 1),
            event(EventType::Search, "u2", 1),
            event(EventType::PageView, "u3", 1),
        ];
        let query = ReportQuery::parse(
            "user_engagement",
            &params(&[("from", "2026-03-01"), ("to", "2026-03-01"), ("limit", "2")]),
        )
        .unwrap();

        let ReportData::UserEngagement(engagement) = query.evaluate(&events).data else {
            panic!("expected user engagement");
        };
        assert_eq!(engagement.active_users, 3);
        assert_eq!(engagement.top_users.len(), 2);
        assert_eq!(engagement.top_users[0].user_id, "u2");
        assert_eq!(engagement.top_users[1].user_id, "u1");
    }

    #[test]
    fn test_conversion_funnel() {
        let events = vec![
            event(EventType::ProductView, "u1", 1),
            event(EventType::ProductView, "u1", 1),
            event(EventType::ProductView, "u2", 1),
            event(EventType::ProductView, "u3", 1),
            event(EventType::ProductView, "u4", 1),
            event(EventType::AddToCart, "u1", 1),
            event(EventType::AddToCart, "u2", 1),
            event(EventType::OrderCreated, "u1", 1),
            event(EventType::OrderCompleted, "u1", 1),
        ];
        let query =
            ReportQuery::parse("conversion_funnel", &range("2026-03-01", "2026-03-01")).unwrap();

        let ReportData::ConversionFunnel(funnel) = query.evaluate(&events).data else {
            panic!("expected conversion funnel");
        };
        let users: Vec<u64> = funnel.steps.iter().map(|s| s.users).collect();
        assert_eq!(users, vec![4, 2, 1, 1]);
        assert_eq!(funnel.steps[0].conversion_rate, 100.0);
        assert_eq!(funnel.steps[1].conversion_rate, 50.0);
        assert_eq!(funnel.steps[2].conversion_rate, 50.0);
        assert_eq!(funnel.overall_rate, 25.0);
    }

    #[test]
    fn test_empty_funnel_has_zero_rates() {
        let funnel = ConversionFunnel::from_step_users([0, 0, 0, 0]);
        assert!(funnel.steps.iter().all(|s| s.conversion_rate == 0.0));
        assert_eq!(funnel.overall_rate, 0.0);
    }
}
