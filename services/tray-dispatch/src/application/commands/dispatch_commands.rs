//! Dispatch commands

use chrono::{DateTime, Utc};
use errors::{AppError, AppResult};

use crate::domain::entities::{ReturnRecord, Shipment};
use crate::domain::enums::ReturnCondition;
use crate::domain::value_objects::{BoxCounts, DispatchId};

/// 创建发运单命令
///
/// 数量使用有符号整数接收外部输入，校验通过后才转换为领域类型。
#[derive(Debug, Clone)]
pub struct CreateDispatchCommand {
    pub project_id: String,
    pub drillhole_id: String,
    pub company: String,
    /// 未提供时取当前时间
    pub dispatch_date: Option<DateTime<Utc>>,
    pub hq_boxes: i64,
    pub nq_boxes: i64,
    pub driver: String,
    pub technician: String,
    pub samples_collected: Option<i64>,
    pub sample_type: Option<String>,
}

impl CreateDispatchCommand {
    pub fn validate(&self) -> AppResult<()> {
        self.checked().map(|_| ())
    }

    /// 校验并转换为发运事实
    pub fn into_shipment(self, now: DateTime<Utc>) -> AppResult<Shipment> {
        let (boxes, samples_collected) = self.checked()?;

        Ok(Shipment {
            project_id: self.project_id.trim().to_string(),
            drillhole_id: self.drillhole_id.trim().to_string(),
            company: self.company.trim().to_string(),
            dispatch_date: self.dispatch_date.unwrap_or(now),
            boxes,
            driver: self.driver.trim().to_string(),
            technician: self.technician.trim().to_string(),
            samples_collected,
            sample_type: self
                .sample_type
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        })
    }

    /// 必填字段检查，返回转换后的托盘数与样品数
    fn checked(&self) -> AppResult<(BoxCounts, u32)> {
        require("project_id", &self.project_id)?;
        require("drillhole_id", &self.drillhole_id)?;
        require("company", &self.company)?;
        require("driver", &self.driver)?;
        require("technician", &self.technician)?;

        let boxes = BoxCounts::try_from_signed(self.hq_boxes, self.nq_boxes)?;
        let samples_collected = match self.samples_collected {
            None => 0,
            Some(samples) if samples < 0 => {
                return Err(AppError::validation(format!(
                    "samples_collected must be >= 0, got {}",
                    samples
                )));
            }
            Some(samples) => u32::try_from(samples).map_err(|_| {
                AppError::validation(format!("samples_collected {} is out of range", samples))
            })?,
        };

        Ok((boxes, samples_collected))
    }
}

/// 登记归还命令
///
/// 调用方应已通过差异检查并在必要时取得用户确认；此命令本身不再检查差异。
#[derive(Debug, Clone)]
pub struct ProcessReturnCommand {
    pub dispatch_id: DispatchId,
    pub returned_hq: i64,
    pub returned_nq: i64,
    pub condition: String,
    pub notes: Option<String>,
    pub driver: Option<String>,
    pub technician: Option<String>,
    /// 未提供时取当前时间
    pub return_date: Option<DateTime<Utc>>,
}

impl ProcessReturnCommand {
    pub fn validate(&self) -> AppResult<()> {
        self.to_record(Utc::now()).map(|_| ())
    }

    /// 校验并转换为归还记录
    pub fn to_record(&self, now: DateTime<Utc>) -> AppResult<ReturnRecord> {
        let returned = BoxCounts::try_from_signed(self.returned_hq, self.returned_nq)?;
        let condition = self
            .condition
            .parse::<ReturnCondition>()
            .map_err(AppError::validation)?;

        Ok(ReturnRecord {
            return_date: self.return_date.unwrap_or(now),
            returned,
            condition,
            notes: non_blank(&self.notes),
            driver: non_blank(&self.driver),
            technician: non_blank(&self.technician),
        })
    }
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn return_cmd(hq: i64, nq: i64, condition: &str) -> ProcessReturnCommand {
        ProcessReturnCommand {
            dispatch_id: DispatchId::new(1),
            returned_hq: hq,
            returned_nq: nq,
            condition: condition.to_string(),
            notes: Some("  ".to_string()),
            driver: Some(" Kim ".to_string()),
            technician: None,
            return_date: None,
        }
    }

    fn create_cmd() -> CreateDispatchCommand {
        CreateDispatchCommand {
            project_id: " P1 ".to_string(),
            drillhole_id: "H1".to_string(),
            company: "Acme".to_string(),
            dispatch_date: None,
            hq_boxes: 10,
            nq_boxes: 20,
            driver: "Sam".to_string(),
            technician: "Lee".to_string(),
            samples_collected: None,
            sample_type: None,
        }
    }

    #[test]
    fn test_to_record_converts_and_trims() {
        let now = Utc::now();
        let record = return_cmd(10, 18, "fair").to_record(now).unwrap();
        assert_eq!(record.returned, BoxCounts::new(10, 18));
        assert_eq!(record.condition, ReturnCondition::Fair);
        assert_eq!(record.return_date, now);
        assert_eq!(record.notes, None);
        assert_eq!(record.driver.as_deref(), Some("Kim"));
    }

    #[test]
    fn test_to_record_rejects_invalid_input() {
        let now = Utc::now();
        assert!(matches!(
            return_cmd(-1, 0, "Good").to_record(now),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            return_cmd(1, 0, "Lost").to_record(now),
            Err(AppError::Validation(_))
        ));
        assert!(return_cmd(1, 0, "Lost").validate().is_err());
        assert!(return_cmd(1, 0, "Good").validate().is_ok());
    }

    #[test]
    fn test_into_shipment_defaults() {
        let now = Utc::now();
        let shipment = create_cmd().into_shipment(now).unwrap();
        assert_eq!(shipment.project_id, "P1");
        assert_eq!(shipment.dispatch_date, now);
        assert_eq!(shipment.samples_collected, 0);
        assert_eq!(shipment.sample_type, "");
    }

    #[test]
    fn test_into_shipment_rejects_invalid_input() {
        let now = Utc::now();

        let mut cmd = create_cmd();
        cmd.company = " ".to_string();
        assert!(matches!(cmd.into_shipment(now), Err(AppError::Validation(_))));

        let mut cmd = create_cmd();
        cmd.samples_collected = Some(-3);
        assert!(cmd.validate().is_err());

        let mut cmd = create_cmd();
        cmd.samples_collected = Some(i64::from(u32::MAX) + 1);
        assert!(matches!(cmd.into_shipment(now), Err(AppError::Validation(_))));
    }
}
