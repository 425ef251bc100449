//! 日期工具
//!
//! - 订单筛选使用的 `YYYY-MM-DD` 日期参数
//! - 后端返回的 ISO 8601 时间字符串（可能带也可能不带时区）

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 筛选参数使用的日期格式
pub const FILTER_DATE_FORMAT: &str = "%Y-%m-%d";

/// 将日期格式化为筛选参数
pub fn format_filter_date(date: NaiveDate) -> String {
    date.format(FILTER_DATE_FORMAT).to_string()
}

/// 解析 `<input type="date">` 的值，空字符串视为未设置
pub fn parse_filter_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, FILTER_DATE_FORMAT).ok()
}

/// 解析后端时间戳
///
/// 依次尝试 RFC 3339 和不带时区的 ISO 8601（.NET 默认输出）。
pub fn parse_backend_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// 用于表格展示的日期部分，无法解析时原样返回
pub fn display_date(value: &str) -> String {
    parse_backend_timestamp(value)
        .map(|dt| dt.date().format(FILTER_DATE_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}
