//! 分析领域：事件、用户活动、报表

mod event;
mod event_type;
mod filter;
mod report;
mod user_activity;

pub use event::{Event, RequestContext};
pub use event_type::{EventCategory, EventType};
pub use filter::EventFilter;
pub use report::{
    ConversionFunnel, DateRange, EventSummary, FunnelStep, Report, ReportData, ReportParams,
    ReportQuery, ReportType, UserEngagement, UserEventCount,
};
pub use user_activity::UserActivity;
