//! 按承运公司、样品类型的分布统计

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::Dispatch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub company: String,
    pub dispatches: usize,
    pub samples: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTypeSummary {
    pub sample_type: String,
    pub dispatches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchAnalytics {
    pub by_company: Vec<CompanySummary>,
    pub by_sample_type: Vec<SampleTypeSummary>,
}

/// 汇总分布，结果按名称排序；样品类型为空的发运单不计入样品类型分布
pub fn summarize_dispatches(dispatches: &[Dispatch]) -> DispatchAnalytics {
    let mut by_company: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    let mut by_sample_type: BTreeMap<&str, usize> = BTreeMap::new();

    for dispatch in dispatches {
        let entry = by_company.entry(dispatch.company()).or_default();
        entry.0 += 1;
        entry.1 += u64::from(dispatch.samples_collected());

        let sample_type = dispatch.sample_type().trim();
        if !sample_type.is_empty() {
            *by_sample_type.entry(sample_type).or_default() += 1;
        }
    }

    DispatchAnalytics {
        by_company: by_company
            .into_iter()
            .map(|(company, (dispatches, samples))| CompanySummary {
                company: company.to_string(),
                dispatches,
                samples,
            })
            .collect(),
        by_sample_type: by_sample_type
            .into_iter()
            .map(|(sample_type, dispatches)| SampleTypeSummary {
                sample_type: sample_type.to_string(),
                dispatches,
            })
            .collect(),
    }
}
