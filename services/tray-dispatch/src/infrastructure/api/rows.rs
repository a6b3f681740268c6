//! 传输层结构
//!
//! 远端时间列不带时区（例如 `2024-01-05T08:30:00`），按 UTC 解析。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 发运单记录
///
/// 列表接口返回带 `*_name` 的明细；单条接口只有外键 ID。
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchRow {
    pub id: i64,
    pub project_id: i64,
    pub drillhole_id: i64,
    pub company_id: i64,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub drillhole_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(deserialize_with = "wire_time::deserialize")]
    pub dispatch_date: DateTime<Utc>,
    pub hq_boxes: i64,
    pub nq_boxes: i64,
    pub driver: String,
    pub technician: String,
    #[serde(default)]
    pub samples_collected: Option<i64>,
    #[serde(default)]
    pub sample_type: Option<String>,
    pub status: String,
    #[serde(default, deserialize_with = "wire_time::deserialize_option")]
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub returned_hq: Option<i64>,
    #[serde(default)]
    pub returned_nq: Option<i64>,
    #[serde(default)]
    pub return_condition: Option<String>,
    #[serde(default)]
    pub return_notes: Option<String>,
    #[serde(default)]
    pub return_driver: Option<String>,
    #[serde(default)]
    pub return_technician: Option<String>,
    #[serde(default, deserialize_with = "wire_time::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire_time::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 项目（`project_id` 是项目编号）
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRow {
    pub id: i64,
    pub project_id: String,
    pub name: String,
}

/// 钻孔（`drillhole_id` 是钻孔编号，`project_id` 是项目外键）
#[derive(Debug, Clone, Deserialize)]
pub struct DrillholeRow {
    pub id: i64,
    pub drillhole_id: String,
    pub project_id: i64,
}

/// 钻探公司
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRow {
    pub id: i64,
    pub name: String,
}

/// 创建发运单请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDispatchRequest {
    pub project_id: i64,
    pub drillhole_id: i64,
    pub company_id: i64,
    pub dispatch_date: DateTime<Utc>,
    pub hq_boxes: u32,
    pub nq_boxes: u32,
    pub driver: String,
    pub technician: String,
    pub samples_collected: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_type: Option<String>,
}

/// 登记归还请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnDispatchRequest {
    pub returned_hq: u32,
    pub returned_nq: u32,
    pub return_condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_driver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_technician: Option<String>,
    pub return_date: DateTime<Utc>,
}

/// 远端错误响应（`{"detail": ...}`）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// 错误描述；`detail` 不是字符串时原样序列化
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}

/// 时间列：RFC 3339，或不带时区的 ISO 8601（视为 UTC）
pub mod wire_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de};

    pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        let value = value.trim();
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|t| t.and_utc())
            })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_naive_timestamp_is_utc() {
            let t = parse("2024-01-05T08:30:00").unwrap();
            assert_eq!(t, "2024-01-05T08:30:00Z".parse::<DateTime<Utc>>().unwrap());
            let t = parse("2024-01-05T08:30:00.250000").unwrap();
            assert_eq!(t.timestamp_subsec_millis(), 250);
        }

        #[test]
        fn test_offset_timestamp_converted() {
            let t = parse("2024-01-05T10:30:00+02:00").unwrap();
            assert_eq!(t, "2024-01-05T08:30:00Z".parse::<DateTime<Utc>>().unwrap());
        }

        #[test]
        fn test_garbage_rejected() {
            assert!(parse("yesterday").is_err());
        }
    }
}
