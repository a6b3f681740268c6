//! 项目 / 钻孔 / 公司参考数据
//!
//! 远端发运单只保存整数外键，领域层使用展示名称。名称缺失时的回退形式为
//! `PROJ-{id}`、`DH-{id}` 和 `Unknown`，解析名称时同样接受前两种回退形式。

use std::collections::BTreeMap;

use super::rows::{CompanyRow, DispatchRow, DrillholeRow, ProjectRow};

pub const UNKNOWN_COMPANY: &str = "Unknown";

pub fn project_fallback(id: i64) -> String {
    format!("PROJ-{}", id)
}

pub fn drillhole_fallback(id: i64) -> String {
    format!("DH-{}", id)
}

#[derive(Debug, Clone)]
struct ProjectEntry {
    code: String,
    name: String,
}

#[derive(Debug, Clone)]
struct DrillholeEntry {
    project_id: i64,
    code: String,
}

/// ID 与展示名称的双向映射
#[derive(Debug, Clone, Default)]
pub struct ReferenceDirectory {
    projects: BTreeMap<i64, ProjectEntry>,
    drillholes: BTreeMap<i64, DrillholeEntry>,
    companies: BTreeMap<i64, String>,
}

impl ReferenceDirectory {
    pub fn new(
        projects: Vec<ProjectRow>,
        drillholes: Vec<DrillholeRow>,
        companies: Vec<CompanyRow>,
    ) -> Self {
        Self {
            projects: projects
                .into_iter()
                .map(|p| {
                    (
                        p.id,
                        ProjectEntry {
                            code: p.project_id,
                            name: p.name,
                        },
                    )
                })
                .collect(),
            drillholes: drillholes
                .into_iter()
                .map(|d| {
                    (
                        d.id,
                        DrillholeEntry {
                            project_id: d.project_id,
                            code: d.drillhole_id,
                        },
                    )
                })
                .collect(),
            companies: companies.into_iter().map(|c| (c.id, c.name)).collect(),
        }
    }

    /// 项目展示名称（与列表明细的 `project_name` 一致，不用项目编号）
    pub fn project_name(&self, id: i64) -> Option<&str> {
        self.projects
            .get(&id)
            .map(|p| p.name.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn drillhole_name(&self, id: i64) -> Option<&str> {
        self.drillholes
            .get(&id)
            .map(|d| d.code.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn company_name(&self, id: i64) -> Option<&str> {
        self.companies
            .get(&id)
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// 记录引用的外键是否都已在目录中
    pub fn knows(&self, row: &DispatchRow) -> bool {
        self.projects.contains_key(&row.project_id)
            && self.drillholes.contains_key(&row.drillhole_id)
            && self.companies.contains_key(&row.company_id)
    }

    /// 按项目名称、项目编号或 `PROJ-{id}` 查找项目
    pub fn project_id(&self, key: &str) -> Option<i64> {
        let key = key.trim();
        self.projects
            .iter()
            .find(|(_, p)| {
                (!p.name.trim().is_empty() && p.name.trim() == key) || p.code.trim() == key
            })
            .map(|(id, _)| *id)
            .or_else(|| parse_fallback(key, "PROJ-").filter(|id| self.projects.contains_key(id)))
    }

    /// 在指定项目下按钻孔编号或 `DH-{id}` 查找钻孔
    pub fn drillhole_id(&self, project_id: i64, key: &str) -> Option<i64> {
        let key = key.trim();
        let in_project = |id: &i64| {
            self.drillholes
                .get(id)
                .is_some_and(|d| d.project_id == project_id)
        };
        self.drillholes
            .iter()
            .find(|(id, d)| d.code.trim() == key && in_project(*id))
            .map(|(id, _)| *id)
            .or_else(|| parse_fallback(key, "DH-").filter(in_project))
    }

    pub fn company_id(&self, name: &str) -> Option<i64> {
        let name = name.trim();
        self.companies
            .iter()
            .find(|(_, n)| n.trim() == name)
            .map(|(id, _)| *id)
    }
}

fn parse_fallback(key: &str, prefix: &str) -> Option<i64> {
    key.strip_prefix(prefix)?.parse().ok()
}
