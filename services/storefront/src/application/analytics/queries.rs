//! 分析查询

use shop_cqrs_core::Query;

use crate::domain::analytics::{Event, EventFilter, Report, ReportParams, UserActivity};

/// 查询用户活动
#[derive(Debug, Clone)]
pub struct GetUserActivityQuery {
    pub user_id: String,
}

impl Query for GetUserActivityQuery {
    type Result = Option<UserActivity>;
}

/// 生成报表
#[derive(Debug, Clone)]
pub struct GenerateReportQuery {
    pub report_type: String,
    pub params: ReportParams,
}

impl Query for GenerateReportQuery {
    type Result = Report;
}

/// 列出事件
#[derive(Debug, Clone, Default)]
pub struct ListEventsQuery {
    pub filter: EventFilter,
}

impl Query for ListEventsQuery {
    type Result = Vec<Event>;
}
