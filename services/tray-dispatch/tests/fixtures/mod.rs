//! 测试辅助：构造发运单
#![allow(dead_code)]

use chrono::{DateTime, Utc};

use tray_dispatch::domain::entities::{Dispatch, ReturnRecord, Shipment};
use tray_dispatch::domain::enums::ReturnCondition;
use tray_dispatch::domain::value_objects::{BoxCounts, DispatchId};

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC 3339 timestamp")
}

pub fn shipment(project_id: &str, drillhole_id: &str, hq: u32, nq: u32) -> Shipment {
    Shipment {
        project_id: project_id.to_string(),
        drillhole_id: drillhole_id.to_string(),
        company: "Acme Drilling".to_string(),
        dispatch_date: ts("2024-03-01T08:00:00Z"),
        boxes: BoxCounts::new(hq, nq),
        driver: "Sam".to_string(),
        technician: "Lee".to_string(),
        samples_collected: 12,
        sample_type: "Core".to_string(),
    }
}

pub fn outstanding(id: i64, project_id: &str, drillhole_id: &str, hq: u32, nq: u32) -> Dispatch {
    Dispatch::new(DispatchId::new(id), shipment(project_id, drillhole_id, hq, nq))
}

/// 以指定发运时间构造未归还发运单
pub fn outstanding_at(id: i64, dispatch_date: DateTime<Utc>) -> Dispatch {
    let mut shipment = shipment("P1", "H1", 5, 5);
    shipment.dispatch_date = dispatch_date;
    Dispatch::new(DispatchId::new(id), shipment)
}

pub fn return_record(hq: u32, nq: u32) -> ReturnRecord {
    ReturnRecord {
        return_date: ts("2024-03-08T15:00:00Z"),
        returned: BoxCounts::new(hq, nq),
        condition: ReturnCondition::Good,
        notes: None,
        driver: None,
        technician: None,
    }
}

pub fn returned(
    id: i64,
    project_id: &str,
    drillhole_id: &str,
    sent: (u32, u32),
    back: (u32, u32),
) -> Dispatch {
    let mut dispatch = outstanding(id, project_id, drillhole_id, sent.0, sent.1);
    dispatch
        .mark_returned(return_record(back.0, back.1))
        .expect("outstanding dispatch accepts a return");
    dispatch
}
