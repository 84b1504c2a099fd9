//! HTTP implementation of [`RunService`]

use super::errors::ApiError;
use super::traits::RunService;
use super::wire::{ErrorEnvelope, RunBody, RunListResponse, RunResponse};
use crate::config::Config;
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::{FlowDescription, ParameterSetting};
use crate::runs::{Run, RunFilter, RunSummary};
use crate::task::Task;
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Client for the service's JSON API
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl ServiceClient {
    /// Create a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &Config) -> FoldwiseResult<Self> {
        config.validate().map_err(|e| {
            FoldwiseError::config_with_context(
                format!("Invalid service config: {}", e),
                "Creating service client",
            )
        })?;

        let base_url = Url::parse(config.base_url()).map_err(|e| {
            FoldwiseError::config(format!("Invalid server URL '{}': {}", config.server, e))
        })?;

        let http = Client::builder()
            .connect_timeout(config.timeouts.connection_timeout())
            .timeout(config.timeouts.request_timeout())
            .user_agent(concat!("foldwise/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FoldwiseError::http(format!("Failed to create HTTP client: {}", e)))?;

        debug!(server = %base_url, authenticated = config.api_key.is_some(), "service client ready");
        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for `segments` below the API root; each segment is percent-encoded
    pub(crate) fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> FoldwiseResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                FoldwiseError::config(format!("Server URL cannot be a base: {}", self.base_url))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("api_key", key)]),
            None => request,
        }
    }

    /// Send a request; transport failures are the outer error, service
    /// error responses the inner one
    async fn send(&self, request: RequestBuilder) -> FoldwiseResult<Result<String, ApiError>> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() && !is_error_envelope(&body) {
            return Ok(Ok(body));
        }
        Ok(Err(ApiError::from_body(status.as_u16(), &body)))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> FoldwiseResult<Result<T, ApiError>> {
        debug!(%url, "GET");
        match self.send(self.http.get(url)).await? {
            Ok(body) => Ok(Ok(serde_json::from_str(&body)?)),
            Err(api) => Ok(Err(api)),
        }
    }

    /// Download a file such as a dataset or a splits table
    pub(crate) async fn get_text(&self, url: &str) -> FoldwiseResult<Result<String, ApiError>> {
        let url = Url::parse(url)
            .map_err(|e| FoldwiseError::invalid_input(format!("Invalid file URL '{}': {}", url, e)))?;
        debug!(%url, "GET file");
        self.send(self.http.get(url)).await
    }

    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        url: Url,
        form: Form,
    ) -> FoldwiseResult<Result<T, ApiError>> {
        debug!(%url, "POST");
        match self.send(self.http.post(url).multipart(form)).await? {
            Ok(body) => Ok(Ok(serde_json::from_str(&body)?)),
            Err(api) => Ok(Err(api)),
        }
    }
}

/// Some endpoints answer 200 with an error object in the body
fn is_error_envelope(body: &str) -> bool {
    body.trim_start().starts_with('{') && serde_json::from_str::<ErrorEnvelope>(body).is_ok()
}

fn run_from_body(body: RunBody) -> FoldwiseResult<Run> {
    let dataset_id = body.input_data.dataset.first().map_or(0, |d| d.did);

    let entries = body.output_data.map(|o| o.evaluation).unwrap_or_default();
    // A repeat x fold grid never has more cells than there are entries
    let bound = entries.len() as u64;
    let mut evaluations = BTreeMap::new();
    let mut detailed: BTreeMap<String, Vec<Vec<f64>>> = BTreeMap::new();
    for evaluation in entries {
        let Some(value) = evaluation.value else {
            continue;
        };
        match (evaluation.repeat, evaluation.fold) {
            (Some(repeat), Some(fold)) => {
                if repeat >= bound || fold >= bound {
                    return Err(FoldwiseError::invalid_input_field(
                        format!(
                            "evaluation '{}' has out of range index (repeat {}, fold {})",
                            evaluation.name, repeat, fold
                        ),
                        "evaluation",
                    ));
                }
                let (repeat, fold) = (repeat as usize, fold as usize);
                let per_repeat = detailed.entry(evaluation.name).or_default();
                if per_repeat.len() <= repeat {
                    per_repeat.resize(repeat + 1, Vec::new());
                }
                let per_fold = &mut per_repeat[repeat];
                if per_fold.len() <= fold {
                    per_fold.resize(fold + 1, f64::NAN);
                }
                per_fold[fold] = value;
            }
            _ => {
                evaluations.insert(evaluation.name, value);
            }
        }
    }

    Ok(Run {
        run_id: Some(body.run_id),
        task_id: body.task_id,
        dataset_id,
        flow_id: body.flow_id,
        flow: None,
        flow_name: body.flow_name,
        setup_id: body.setup_id,
        uploader: body.uploader,
        parameter_settings: body
            .parameter_setting
            .into_iter()
            .map(|p| ParameterSetting {
                component: p.component.unwrap_or_default(),
                name: p.name,
                value: p.value.unwrap_or_default(),
            })
            .collect(),
        class_labels: Vec::new(),
        predictions: Vec::new(),
        trace: None,
        evaluations,
        detailed_evaluations: detailed,
        tags: body.tag,
        created_at: None,
    })
}

#[async_trait]
impl RunService for ServiceClient {
    #[instrument(skip(self))]
    async fn get_task(&self, task_id: u64) -> FoldwiseResult<Task> {
        self.fetch_task(task_id).await
    }

    #[instrument(skip(self))]
    async fn get_run(&self, run_id: u64) -> FoldwiseResult<Run> {
        let url = self.endpoint(&["run".to_string(), run_id.to_string()])?;
        let response: RunResponse = self
            .get_json(url)
            .await?
            .map_err(|api| api.into_error("run", run_id))?;
        run_from_body(response.run)
    }

    #[instrument(skip(self), fields(path = %filter.to_path()))]
    async fn list_runs(&self, filter: &RunFilter) -> FoldwiseResult<BTreeMap<u64, RunSummary>> {
        let url = self.endpoint(&filter.path_segments())?;
        let response: RunListResponse = match self.get_json(url).await? {
            Ok(response) => response,
            Err(api) if api.is_no_results() => return Ok(BTreeMap::new()),
            Err(api) => return Err(api.into_rejection()),
        };
        Ok(response
            .runs
            .run
            .into_iter()
            .map(|entry| {
                (
                    entry.run_id,
                    RunSummary {
                        run_id: entry.run_id,
                        task_id: entry.task_id,
                        setup_id: entry.setup_id,
                        flow_id: entry.flow_id,
                        uploader: entry.uploader,
                    },
                )
            })
            .collect())
    }

    #[instrument(skip(self, run), fields(task_id = run.task_id))]
    async fn publish_run(&self, run: &mut Run) -> FoldwiseResult<u64> {
        self.upload_run(run).await
    }

    #[instrument(skip(self, flow), fields(flow = %flow.name))]
    async fn ensure_flow(&self, flow: &FlowDescription) -> FoldwiseResult<u64> {
        self.find_or_upload_flow(flow).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeoutConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ServiceClient {
        let config = Config::new(format!("{}/api/v1/json", server.uri())).with_api_key("secret");
        ServiceClient::new(&config).unwrap()
    }

    fn run_entry(run_id: u64, task_id: u64, uploader: u64) -> serde_json::Value {
        json!({
            "run_id": run_id.to_string(),
            "task_id": task_id.to_string(),
            "setup_id": "10",
            "flow_id": "20",
            "uploader": uploader.to_string(),
            "upload_time": "2016-01-01 00:00:00"
        })
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = Config::new("ftp://example.org");
        assert!(ServiceClient::new(&config).is_err());
        let config = Config::new("https://example.org/api")
            .with_timeouts(TimeoutConfig::new().with_request_timeout_secs(0));
        assert!(ServiceClient::new(&config).is_err());
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ServiceClient::new(&Config::new("https://example.org/api/v1/json/")).unwrap();
        let url = client
            .endpoint(&["flow", "exists", "a b(c,d)", "1.0"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.org/api/v1/json/flow/exists/a%20b(c,d)/1.0"
        );
    }

    #[tokio::test]
    async fn test_list_runs_by_task() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/list/task/20,21"))
            .and(query_param("api_key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "runs": {"run": [run_entry(1, 20, 29), run_entry(2, 21, 29), run_entry(3, 20, 274)]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runs = client_for(&server)
            .list_runs(&RunFilter::new().tasks([20, 21]))
            .await
            .unwrap();
        assert_eq!(runs.len(), 3);
        for (id, summary) in &runs {
            assert_eq!(*id, summary.run_id);
            assert!([20, 21].contains(&summary.task_id));
            assert_eq!(summary.setup_id, 10);
        }
    }

    async fn mount_listing(server: &MockServer, list_path: &str, runs: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/json/run/list/{}", list_path)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"runs": {"run": runs}})))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_list_runs_by_ids() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            "run/505212,6100",
            vec![run_entry(505212, 59, 1), run_entry(6100, 59, 2)],
        )
        .await;

        let runs = client_for(&server)
            .list_runs(&RunFilter::new().ids([505212, 6100]))
            .await
            .unwrap();
        assert_eq!(runs.len(), 2);
        assert!(runs.contains_key(&505212));
        assert!(runs.contains_key(&6100));
    }

    #[tokio::test]
    async fn test_list_runs_by_uploader() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            "uploader/1,2",
            vec![run_entry(11, 59, 1), run_entry(12, 60, 2), run_entry(13, 61, 1)],
        )
        .await;

        let runs = client_for(&server)
            .list_runs(&RunFilter::new().uploaders([1, 2]))
            .await
            .unwrap();
        assert_eq!(runs.len(), 3);
        assert!(runs.values().all(|run| [1, 2].contains(&run.uploader)));
    }

    #[tokio::test]
    async fn test_list_runs_by_flow() {
        let server = MockServer::start().await;
        let mut entry = run_entry(21, 59, 1);
        entry["flow_id"] = json!("1154");
        let mut other = run_entry(22, 60, 1);
        other["flow_id"] = json!(1069);
        mount_listing(&server, "flow/1154,1069", vec![entry, other]).await;

        let runs = client_for(&server)
            .list_runs(&RunFilter::new().flows([1154, 1069]))
            .await
            .unwrap();
        assert_eq!(runs.len(), 2);
        assert!(runs.values().all(|run| [1154, 1069].contains(&run.flow_id)));
    }

    #[tokio::test]
    async fn test_list_runs_by_tag() {
        let server = MockServer::start().await;
        // a lone run arrives as an object rather than a list
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/list/tag/curves"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "runs": {"run": run_entry(31, 59, 1)}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runs = client_for(&server)
            .list_runs(&RunFilter::new().tag("curves"))
            .await
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[&31].task_id, 59);
    }

    #[tokio::test]
    async fn test_list_runs_tag_with_slash_is_one_segment() {
        let server = MockServer::start().await;
        mount_listing(&server, "tag/a%2Fb", vec![run_entry(41, 59, 1)]).await;

        let runs = client_for(&server)
            .list_runs(&RunFilter::new().tag("a/b"))
            .await
            .unwrap();
        assert_eq!(runs.len(), 1);
    }

    #[tokio::test]
    async fn test_error_envelope_with_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/6"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{ "error" : { "code": "220", "message": "Unknown run" } }"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/list/task/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{\n  \"error\": {\"code\": 500, \"message\": \"Broken\"}\n}"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.get_run(6).await.unwrap_err().is_not_found());
        let err = client
            .list_runs(&RunFilter::new().tasks([1]))
            .await
            .unwrap_err();
        assert!(err.is_server_rejection());
    }

    #[tokio::test]
    async fn test_get_run_rejects_absurd_fold_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "run": {
                    "run_id": "8",
                    "task_id": "1",
                    "input_data": {"dataset": {"did": "2"}},
                    "output_data": {"evaluation": [
                        {"name": "predictive_accuracy", "value": "0.5", "repeat": "4000000000", "fold": "0"}
                    ]}
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_run(8).await.unwrap_err();
        assert!(err.to_string().contains("out of range index"));
    }

    #[tokio::test]
    async fn test_list_runs_no_results_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/list/tag/nothing"))
            .respond_with(ResponseTemplate::new(412).set_body_json(json!({
                "error": {"code": "372", "message": "No results"}
            })))
            .mount(&server)
            .await;

        let runs = client_for(&server)
            .list_runs(&RunFilter::new().tag("nothing"))
            .await
            .unwrap();
        assert!(runs.is_empty());
    }

    #[tokio::test]
    async fn test_empty_filter_is_sent_and_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/list"))
            .respond_with(ResponseTemplate::new(412).set_body_json(json!({
                "error": {"code": "510", "message": "Please provide a filter"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_runs(&RunFilter::new())
            .await
            .unwrap_err();
        assert!(err.is_server_rejection());
        assert!(err.to_string().contains("510"));
    }

    #[tokio::test]
    async fn test_list_runs_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/list/uploader/29/offset/0/limit/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "runs": {"run": [run_entry(1, 20, 29), run_entry(2, 20, 29)]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/list/uploader/29/offset/2/limit/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "runs": {"run": run_entry(3, 20, 29)}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first = RunFilter::new().uploaders([29]).offset(0).size(2);
        let page_one = client.list_runs(&first).await.unwrap();
        let second = first.next_page().unwrap();
        let page_two = client.list_runs(&second).await.unwrap();

        assert_eq!(page_one.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(page_two.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[tokio::test]
    async fn test_get_run_evaluations() {
        let server = MockServer::start().await;
        let folds = [
            0.66233, 0.639286, 0.567143, 0.745833, 0.599638, 0.588801, 0.527976, 0.666365,
            0.56759, 0.64621,
        ];
        let mut evaluations = vec![
            json!({"name": "f_measure", "value": "0.624668"}),
            json!({"name": "area_under_roc_curve", "value": 0.7}),
        ];
        for (fold, value) in folds.iter().enumerate() {
            evaluations.push(json!({
                "name": "f_measure", "value": value.to_string(), "repeat": "0", "fold": fold.to_string()
            }));
        }
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/473350"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "run": {
                    "run_id": "473350",
                    "uploader": "1",
                    "task_id": "3896",
                    "flow_id": "3940",
                    "setup_id": "77",
                    "tag": "study_1",
                    "parameter_setting": [{"name": "C", "value": "1.0", "component": "3940"}],
                    "input_data": {"dataset": {"did": "1167", "name": "pc1"}},
                    "output_data": {"evaluation": evaluations}
                }
            })))
            .mount(&server)
            .await;

        let run = client_for(&server).get_run(473350).await.unwrap();
        assert_eq!(run.run_id, Some(473350));
        assert_eq!(run.dataset_id, 1167);
        assert_eq!(run.evaluations["f_measure"], 0.624668);
        assert_eq!(run.evaluations.len(), 2);
        assert_eq!(run.tags, vec!["study_1"]);
        assert_eq!(run.parameter_settings[0].value, "1.0");
        for (i, value) in folds.iter().enumerate() {
            assert_eq!(run.detailed_evaluations["f_measure"][0][i], *value);
        }
    }

    #[tokio::test]
    async fn test_get_unknown_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/999999999"))
            .respond_with(ResponseTemplate::new(412).set_body_json(json!({
                "error": {"code": "220", "message": "Run not found"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_run(999999999).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: run 999999999");
    }

    #[tokio::test]
    async fn test_http_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/json/run/5"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client_for(&server).get_run(5).await.unwrap_err().is_not_found());
    }
}
