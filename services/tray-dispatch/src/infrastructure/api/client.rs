//! 基于 reqwest 的远端发运单仓储

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use errors::{AppError, AppResult};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use super::converters::{
    create_request, dispatch_from_row, error_from_status, has_names, return_request,
};
use super::directory::ReferenceDirectory;
use super::rows::{CompanyRow, DispatchRow, DrillholeRow, ProjectRow};
use crate::domain::entities::{Dispatch, ReturnRecord, Shipment};
use crate::domain::repositories::{DispatchFilter, DispatchRepository};
use crate::domain::value_objects::DispatchId;

/// 单次列表请求的最大条数
const PAGE_LIMIT: usize = 100;

/// 远端 CRUD API 仓储
///
/// 归还的原子性由远端保证；本地只缓存项目 / 钻孔 / 公司参考数据，
/// 遇到未知 ID 或名称时重新拉取一次。
pub struct HttpDispatchRepository {
    client: Client,
    base_url: Url,
    token: Option<Secret<String>>,
    directory: RwLock<Option<Arc<ReferenceDirectory>>>,
}

impl HttpDispatchRepository {
    pub fn new(cfg: &config::ApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("failed to build http client: {}", e)))?;

        // `Url::join` 会替换最后一段路径，基础地址必须以 `/` 结尾
        let mut base_url = cfg.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            token: cfg.token.clone(),
            directory: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::internal(format!("invalid endpoint {}: {}", path, e)))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| AppError::collaborator(format!("remote store unreachable: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "Remote store rejected request");
        Err(error_from_status(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::collaborator(format!("invalid response body: {}", e)))
    }

    /// 按 `skip` / `limit` 翻页取完整列表
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let url = self.endpoint(path)?;
        let mut items = Vec::new();
        let mut skip = 0usize;

        loop {
            let mut query: Vec<(&str, String)> = vec![
                ("skip", skip.to_string()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            query.extend(params.iter().cloned());

            let response = self.send(self.client.get(url.clone()).query(&query)).await?;
            let page: Vec<T> = Self::decode(response).await?;
            let fetched = page.len();
            items.extend(page);

            if fetched < PAGE_LIMIT {
                break;
            }
            skip += fetched;
        }

        Ok(items)
    }

    /// 重新拉取参考数据并替换缓存
    async fn refresh_directory(&self) -> AppResult<Arc<ReferenceDirectory>> {
        let projects: Vec<ProjectRow> = self.fetch_all("projects/", &[]).await?;
        let drillholes: Vec<DrillholeRow> = self.fetch_all("drillholes/", &[]).await?;
        let companies: Vec<CompanyRow> = self.fetch_all("companies/", &[]).await?;
        debug!(
            projects = projects.len(),
            drillholes = drillholes.len(),
            companies = companies.len(),
            "Reference directory loaded"
        );

        let directory = Arc::new(ReferenceDirectory::new(projects, drillholes, companies));
        *self.directory.write().await = Some(directory.clone());
        Ok(directory)
    }

    async fn directory(&self) -> AppResult<Arc<ReferenceDirectory>> {
        let cached = self.directory.read().await.clone();
        match cached {
            Some(directory) => Ok(directory),
            None => self.refresh_directory().await,
        }
    }

    /// 单条接口的记录不带名称，借助参考目录补齐
    async fn to_dispatch(&self, row: DispatchRow) -> AppResult<Dispatch> {
        if has_names(&row) {
            return dispatch_from_row(row, None);
        }
        let mut directory = self.directory().await?;
        if !directory.knows(&row) {
            directory = self.refresh_directory().await?;
        }
        dispatch_from_row(row, Some(&directory))
    }
}

#[async_trait]
impl DispatchRepository for HttpDispatchRepository {
    async fn list(&self, filter: &DispatchFilter) -> AppResult<Vec<Dispatch>> {
        let mut params = Vec::new();
        if let Some(status) = filter.status {
            params.push(("status_filter", status.as_str().to_string()));
        }
        let rows: Vec<DispatchRow> = self.fetch_all("dispatches/", &params).await?;

        let mut dispatches = Vec::with_capacity(rows.len());
        for row in rows {
            // 列表明细自带名称，缺失时使用回退形式
            let dispatch = dispatch_from_row(row, None)?;
            // 远端只支持按状态过滤
            if filter.matches(&dispatch) {
                dispatches.push(dispatch);
            }
        }

        dispatches.sort_by(|a, b| {
            b.dispatch_date()
                .cmp(&a.dispatch_date())
                .then_with(|| b.dispatch_id().cmp(&a.dispatch_id()))
        });
        Ok(dispatches)
    }

    async fn find_by_id(&self, id: DispatchId) -> AppResult<Option<Dispatch>> {
        let url = self.endpoint(&format!("dispatches/{}", id))?;
        match self.send(self.client.get(url)).await {
            Ok(response) => {
                let row: DispatchRow = Self::decode(response).await?;
                self.to_dispatch(row).await.map(Some)
            }
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, shipment: Shipment) -> AppResult<Dispatch> {
        let body = match create_request(&shipment, &*self.directory().await?) {
            Ok(body) => body,
            // 名称可能是缓存之后才新建的
            Err(AppError::Validation(_)) => {
                create_request(&shipment, &*self.refresh_directory().await?)?
            }
            Err(e) => return Err(e),
        };

        let url = self.endpoint("dispatches/")?;
        let response = self.send(self.client.post(url).json(&body)).await?;
        let row: DispatchRow = Self::decode(response).await?;
        self.to_dispatch(row).await
    }

    async fn update_return(&self, id: DispatchId, record: ReturnRecord) -> AppResult<Dispatch> {
        let url = self.endpoint(&format!("dispatches/{}/return", id))?;
        let body = return_request(&record);
        let response = self
            .send(self.client.post(url).json(&body))
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::not_found(format!("dispatch {} not found", id)),
                other => other,
            })?;
        let row: DispatchRow = Self::decode(response).await?;
        let dispatch = self.to_dispatch(row).await?;
        if !dispatch.is_returned() {
            return Err(AppError::collaborator(format!(
                "remote store did not record return for dispatch {}",
                id
            )));
        }
        Ok(dispatch)
    }
}

impl std::fmt::Debug for HttpDispatchRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDispatchRepository")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Requests = Arc<Mutex<Vec<String>>>;

    /// 按顺序逐个连接应答的本地 HTTP 服务，返回基础地址和收到的请求
    async fn serve(responses: Vec<(&'static str, &'static str)>) -> (Url, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Requests = Arc::default();
        let seen = requests.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                seen.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/api/v1", addr).parse().unwrap(), requests)
    }

    async fn serve_once(status: &'static str, body: &'static str) -> Url {
        serve(vec![(status, body)]).await.0
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = find_header_end(&buf) {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while buf.len() < end + 4 + length {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn repo(base_url: Url) -> HttpDispatchRepository {
        HttpDispatchRepository::new(&config::ApiConfig {
            base_url,
            token: Some(Secret::new("test-token".to_string())),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn record() -> ReturnRecord {
        ReturnRecord {
            return_date: "2024-01-12T10:00:00Z".parse().unwrap(),
            returned: crate::domain::value_objects::BoxCounts::new(10, 20),
            condition: crate::domain::enums::ReturnCondition::Good,
            notes: None,
            driver: None,
            technician: None,
        }
    }

    fn shipment(company: &str) -> Shipment {
        Shipment {
            project_id: "North Ridge".to_string(),
            drillhole_id: "NR-001".to_string(),
            company: company.to_string(),
            dispatch_date: "2024-01-05T08:30:00Z".parse().unwrap(),
            boxes: crate::domain::value_objects::BoxCounts::new(10, 20),
            driver: "Sam".to_string(),
            technician: "Lee".to_string(),
            samples_collected: 0,
            sample_type: String::new(),
        }
    }

    const ROWS: &str = r#"[{"id": 1, "project_id": 3, "drillhole_id": 11, "company_id": 5,
        "project_name": "North Ridge", "drillhole_name": "NR-001", "company_name": "Acme",
        "dispatch_date": "2024-01-05T08:30:00", "hq_boxes": 10, "nq_boxes": 20,
        "driver": "Sam", "technician": "Lee", "samples_collected": 0, "sample_type": null,
        "status": "outstanding", "created_at": "2024-01-05T08:30:00",
        "updated_at": "2024-01-05T08:30:00", "days_out": 3, "is_match": null},
        {"id": 2, "project_id": 3, "drillhole_id": 12, "company_id": 6,
        "project_name": "North Ridge", "drillhole_name": "NR-002", "company_name": null,
        "dispatch_date": "2024-01-06T08:30:00", "hq_boxes": 1, "nq_boxes": 2,
        "driver": "Sam", "technician": "Lee", "status": "outstanding"}]"#;

    const PROJECTS: &str =
        r#"[{"id": 3, "project_id": "PRJ-2024-001", "name": "North Ridge", "company_id": 5}]"#;
    const DRILLHOLES: &str = r#"[{"id": 11, "drillhole_id": "NR-001", "project_id": 3}]"#;
    const COMPANIES: &str = r#"[{"id": 5, "name": "Acme Drilling"}]"#;

    const CREATED: &str = r#"{"id": 9, "project_id": 3, "drillhole_id": 11, "company_id": 5,
        "dispatch_date": "2024-01-05T08:30:00", "hq_boxes": 10, "nq_boxes": 20,
        "driver": "Sam", "technician": "Lee", "samples_collected": 0, "sample_type": null,
        "status": "outstanding", "return_date": null, "returned_hq": null, "returned_nq": null,
        "return_condition": null, "return_notes": null,
        "created_at": "2024-01-05T08:30:00", "updated_at": "2024-01-05T08:30:00"}"#;

    fn request_body(request: &str) -> serde_json::Value {
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let repo = repo("http://localhost:8000/api/v1".parse().unwrap());
        assert_eq!(repo.base_url().as_str(), "http://localhost:8000/api/v1/");
        assert_eq!(
            repo.endpoint("dispatches/7/return").unwrap().as_str(),
            "http://localhost:8000/api/v1/dispatches/7/return"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let repo = repo("http://localhost:8000/api/v1/".parse().unwrap());
        let output = format!("{:?}", repo);
        assert!(!output.contains("test-token"));
    }

    #[tokio::test]
    async fn test_list_filters_by_name_and_sorts() {
        let (base, requests) = serve(vec![("200 OK", ROWS)]).await;
        let repo = repo(base);

        let dispatches = repo
            .list(&DispatchFilter::all().with_company("Acme"))
            .await
            .unwrap();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].dispatch_id(), DispatchId::new(1));
        assert_eq!(dispatches[0].drillhole_id(), "NR-001");

        let request = requests.lock().unwrap()[0].clone();
        assert!(request.starts_with("GET /api/v1/dispatches/?skip=0&limit=100 "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer test-token"));
    }

    #[tokio::test]
    async fn test_list_missing_company_name_is_unknown() {
        let base = serve_once("200 OK", ROWS).await;
        let dispatches = repo(base)
            .list(&DispatchFilter::all().with_company("Unknown"))
            .await
            .unwrap();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].dispatch_id(), DispatchId::new(2));
    }

    #[tokio::test]
    async fn test_create_posts_ids_and_resolves_names() {
        let (base, requests) = serve(vec![
            ("200 OK", PROJECTS),
            ("200 OK", DRILLHOLES),
            ("200 OK", COMPANIES),
            ("201 Created", CREATED),
        ])
        .await;

        let dispatch = repo(base).create(shipment("Acme Drilling")).await.unwrap();
        assert_eq!(dispatch.dispatch_id(), DispatchId::new(9));
        assert_eq!(dispatch.project_id(), "North Ridge");
        assert_eq!(dispatch.drillhole_id(), "NR-001");
        assert_eq!(dispatch.company(), "Acme Drilling");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert!(requests[0].starts_with("GET /api/v1/projects/"));
        assert!(requests[3].starts_with("POST /api/v1/dispatches/ "));
        let body = request_body(&requests[3]);
        assert_eq!(body["project_id"], 3);
        assert_eq!(body["drillhole_id"], 11);
        assert_eq!(body["company_id"], 5);
    }

    #[tokio::test]
    async fn test_create_unknown_company_is_validation() {
        // 首次解析失败后重新拉取一次参考数据
        let (base, requests) = serve(vec![
            ("200 OK", PROJECTS),
            ("200 OK", DRILLHOLES),
            ("200 OK", COMPANIES),
            ("200 OK", PROJECTS),
            ("200 OK", DRILLHOLES),
            ("200 OK", COMPANIES),
        ])
        .await;

        let err = repo(base).create(shipment("Nobody")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 6);
        assert!(requests.iter().all(|r| r.starts_with("GET ")));
    }

    #[tokio::test]
    async fn test_find_by_id_resolves_names() {
        let base = serve(vec![
            ("200 OK", CREATED),
            ("200 OK", PROJECTS),
            ("200 OK", DRILLHOLES),
            ("200 OK", COMPANIES),
        ])
        .await
        .0;

        let dispatch = repo(base).find_by_id(DispatchId::new(9)).await.unwrap().unwrap();
        assert_eq!(dispatch.project_id(), "North Ridge");
        assert_eq!(dispatch.company(), "Acme Drilling");
    }

    #[tokio::test]
    async fn test_find_by_id_not_found_is_none() {
        let base = serve_once("404 Not Found", r#"{"detail": "Dispatch not found"}"#).await;
        let found = repo(base).find_by_id(DispatchId::new(99)).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_return_already_returned_is_invalid_state() {
        let base = serve_once("400 Bad Request", r#"{"detail": "Dispatch already returned"}"#).await;
        let err = repo(base)
            .update_return(DispatchId::new(1), record())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_collaborator() {
        let base = serve_once("500 Internal Server Error", "oops").await;
        let err = repo(base).list(&DispatchFilter::all()).await.unwrap_err();
        assert!(matches!(err, AppError::Collaborator(_)));
    }

    #[tokio::test]
    async fn test_unreachable_is_collaborator() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base: Url = format!("http://{}/api/v1/", addr).parse().unwrap();
        let err = repo(base).list(&DispatchFilter::all()).await.unwrap_err();
        assert!(matches!(err, AppError::Collaborator(_)));
    }
}
