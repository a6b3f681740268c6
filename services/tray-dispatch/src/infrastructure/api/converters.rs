//! 传输层结构与领域对象之间的转换

use common::AuditInfo;
use errors::{AppError, AppResult};

use super::directory::{
    ReferenceDirectory, UNKNOWN_COMPANY, drillhole_fallback, project_fallback,
};
use super::rows::{CreateDispatchRequest, DispatchRow, ErrorBody, ReturnDispatchRequest};
use crate::domain::entities::{Dispatch, ReturnRecord, Shipment};
use crate::domain::enums::{DispatchStatus, ReturnCondition};
use crate::domain::value_objects::{BoxCounts, DispatchId};

/// 记录是否自带全部展示名称（列表接口的明细）
pub fn has_names(row: &DispatchRow) -> bool {
    [&row.project_name, &row.drillhole_name, &row.company_name]
        .into_iter()
        .all(|name| name.as_deref().is_some_and(|s| !s.trim().is_empty()))
}

/// 远端记录 -> 发运单
///
/// 展示名称依次取记录自带名称、参考目录、回退形式。
/// 数据不完整的记录（例如标记为已归还但缺少归还字段）视为协作方错误。
pub fn dispatch_from_row(
    row: DispatchRow,
    directory: Option<&ReferenceDirectory>,
) -> AppResult<Dispatch> {
    let id = DispatchId::new(row.id);
    let status: DispatchStatus = row
        .status
        .parse()
        .map_err(|e: String| malformed(id, e))?;

    let boxes = BoxCounts::try_from_signed(row.hq_boxes, row.nq_boxes)
        .map_err(|e| malformed(id, e.to_string()))?;
    let samples_collected = u32::try_from(row.samples_collected.unwrap_or(0))
        .map_err(|_| malformed(id, "samples_collected out of range"))?;

    let project_id = non_blank(row.project_name)
        .or_else(|| directory.and_then(|d| d.project_name(row.project_id)).map(str::to_string))
        .unwrap_or_else(|| project_fallback(row.project_id));
    let drillhole_id = non_blank(row.drillhole_name)
        .or_else(|| directory.and_then(|d| d.drillhole_name(row.drillhole_id)).map(str::to_string))
        .unwrap_or_else(|| drillhole_fallback(row.drillhole_id));
    let company = non_blank(row.company_name)
        .or_else(|| directory.and_then(|d| d.company_name(row.company_id)).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());

    let shipment = Shipment {
        project_id,
        drillhole_id,
        company,
        dispatch_date: row.dispatch_date,
        boxes,
        driver: row.driver,
        technician: row.technician,
        samples_collected,
        sample_type: row.sample_type.unwrap_or_default(),
    };

    let return_record = match status {
        DispatchStatus::Outstanding => None,
        DispatchStatus::Returned => {
            let return_date = row
                .return_date
                .ok_or_else(|| malformed(id, "returned without return_date"))?;
            let returned = BoxCounts::try_from_signed(
                row.returned_hq.unwrap_or(0),
                row.returned_nq.unwrap_or(0),
            )
            .map_err(|e| malformed(id, e.to_string()))?;
            let condition: ReturnCondition = row
                .return_condition
                .as_deref()
                .ok_or_else(|| malformed(id, "returned without return_condition"))?
                .parse()
                .map_err(|e: String| malformed(id, e))?;

            Some(ReturnRecord {
                return_date,
                returned,
                condition,
                notes: non_blank(row.return_notes),
                driver: non_blank(row.return_driver),
                technician: non_blank(row.return_technician),
            })
        }
    };

    let audit_info = match (row.created_at, row.updated_at) {
        (Some(created), Some(updated)) => AuditInfo {
            created_at: created,
            updated_at: updated,
        },
        (Some(created), None) => AuditInfo::at(created),
        _ => AuditInfo::at(row.dispatch_date),
    };

    Ok(Dispatch::from_parts(id, shipment, return_record, audit_info))
}

/// 发运事实 -> 创建请求
///
/// 项目、钻孔和公司名称必须能在目录中解析为 ID，否则为校验错误。
pub fn create_request(
    shipment: &Shipment,
    directory: &ReferenceDirectory,
) -> AppResult<CreateDispatchRequest> {
    let project_id = directory
        .project_id(&shipment.project_id)
        .ok_or_else(|| AppError::validation(format!("unknown project: {}", shipment.project_id)))?;
    let drillhole_id = directory
        .drillhole_id(project_id, &shipment.drillhole_id)
        .ok_or_else(|| {
            AppError::validation(format!(
                "unknown drillhole {} in project {}",
                shipment.drillhole_id, shipment.project_id
            ))
        })?;
    let company_id = directory
        .company_id(&shipment.company)
        .ok_or_else(|| AppError::validation(format!("unknown company: {}", shipment.company)))?;

    Ok(CreateDispatchRequest {
        project_id,
        drillhole_id,
        company_id,
        dispatch_date: shipment.dispatch_date,
        hq_boxes: shipment.boxes.hq,
        nq_boxes: shipment.boxes.nq,
        driver: shipment.driver.clone(),
        technician: shipment.technician.clone(),
        samples_collected: shipment.samples_collected,
        sample_type: non_blank(Some(shipment.sample_type.clone())),
    })
}

/// 归还事实 -> 归还请求
pub fn return_request(record: &ReturnRecord) -> ReturnDispatchRequest {
    ReturnDispatchRequest {
        returned_hq: record.returned.hq,
        returned_nq: record.returned.nq,
        return_condition: record.condition.as_str().to_string(),
        return_notes: record.notes.clone(),
        return_driver: record.driver.clone(),
        return_technician: record.technician.clone(),
        return_date: record.return_date,
    }
}

/// 远端非成功状态码 -> 应用错误
pub fn error_from_status(status: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| format!("remote store responded with status {}", status));

    match status {
        404 => AppError::not_found(message),
        409 => AppError::invalid_state(message),
        400 if message.to_ascii_lowercase().contains("already returned") => {
            AppError::invalid_state(message)
        }
        400 | 422 => AppError::validation(message),
        _ => AppError::collaborator(message),
    }
}

fn malformed(id: DispatchId, reason: impl std::fmt::Display) -> AppError {
    AppError::collaborator(format!("malformed dispatch record {}: {}", id, reason))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
