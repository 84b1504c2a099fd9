//! Flow registration and run upload

use super::client::ServiceClient;
use super::traits::RunService;
use super::wire::{FlowExistsResponse, FlowUpload, RunUpload, UploadFlowResponse, UploadRunResponse};
use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::FlowDescription;
use crate::runs::Run;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

fn arff_part(content: String, file_name: &'static str) -> FoldwiseResult<Part> {
    Ok(Part::text(content)
        .file_name(file_name)
        .mime_str("text/plain")?)
}

impl ServiceClient {
    pub(crate) async fn find_or_upload_flow(&self, flow: &FlowDescription) -> FoldwiseResult<u64> {
        let url = self.endpoint(&["flow", "exists", &flow.name, &flow.external_version])?;
        let exists = self
            .get_json::<FlowExistsResponse>(url)
            .await?
            .map_err(|api| api.into_rejection())?
            .flow_exists;
        if let Some(id) = exists.id.filter(|id| exists.exists && *id > 0) {
            debug!(flow = %flow.name, flow_id = id, "flow already registered");
            return Ok(id as u64);
        }

        let description = serde_json::to_string(&FlowUpload { flow })?;
        let form = Form::new().text("description", description);
        let url = self.endpoint(&["flow"])?;
        let uploaded = self
            .post_form::<UploadFlowResponse>(url, form)
            .await?
            .map_err(|api| api.into_rejection())?;
        info!(flow = %flow.name, flow_id = uploaded.upload_flow.id, "flow uploaded");
        Ok(uploaded.upload_flow.id)
    }

    pub(crate) async fn upload_run(&self, run: &mut Run) -> FoldwiseResult<u64> {
        if let Some(run_id) = run.run_id {
            debug!(run_id, "run already published");
            return Ok(run_id);
        }
        if run.predictions.is_empty() {
            return Err(FoldwiseError::invalid_input("run has no predictions to upload"));
        }

        if run.flow_id.is_none() {
            let flow = run.flow.as_ref().ok_or_else(|| {
                FoldwiseError::invalid_input_field("run has neither a flow id nor a flow", "flow")
            })?;
            let flow_id = self.ensure_flow(flow).await?;
            run.flow_id = Some(flow_id);
        }

        let description = serde_json::to_string(&RunUpload {
            run: &run.description()?,
        })?;
        let mut form = Form::new()
            .text("description", description)
            .part(
                "predictions",
                arff_part(run.predictions_arff().to_string(), "predictions.arff")?,
            );
        if let Some(trace) = run.trace_arff() {
            form = form.part("trace", arff_part(trace.to_string(), "trace.arff")?);
        }

        let url = self.endpoint(&["run"])?;
        let uploaded = self
            .post_form::<UploadRunResponse>(url, form)
            .await?
            .map_err(|api| api.into_rejection())?;
        let run_id = uploaded.upload_run.run_id;
        run.run_id = Some(run_id);
        info!(run_id, task_id = run.task_id, flow_id = ?run.flow_id, "run published");
        Ok(run_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::estimators::DummyClassifier;
    use crate::model::{FlowRegistry, ModelAdapter};
    use crate::runs::RunExecutor;
    use crate::service::{RunService, ServiceClient};
    use crate::task::{Dataset, Task};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ServiceClient {
        let config = Config::new(format!("{}/api/v1/json", server.uri())).with_api_key("secret");
        ServiceClient::new(&config).unwrap()
    }

    fn local_run() -> crate::runs::Run {
        let dataset = Dataset::synthetic_blobs(10, 2, 2, 7);
        let task =
            Task::cross_validated(31, dataset, vec!["a".into(), "b".into()], 1, 2, 0).unwrap();
        let adapter =
            ModelAdapter::new(Box::new(DummyClassifier::prior()), &FlowRegistry::default()).unwrap();
        RunExecutor::new().execute(&task, &adapter).unwrap()
    }

    #[tokio::test]
    async fn test_publish_registers_flow_then_uploads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!(
                "/api/v1/json/flow/exists/foldwise.estimators.dummy/foldwise=={}",
                env!("CARGO_PKG_VERSION")
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "flow_exists": {"exists": "false", "id": "-1"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/json/flow"))
            .and(body_string_contains("foldwise.estimators.dummy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "upload_flow": {"id": "17"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/json/run"))
            .and(body_string_contains("@RELATION openml_task_31_predictions"))
            .and(body_string_contains("\"flow_id\":17"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "upload_run": {"run_id": "9001"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut run = local_run();
        let run_id = client_for(&server).publish_run(&mut run).await.unwrap();
        assert_eq!(run_id, 9001);
        assert_eq!(run.run_id, Some(9001));
        assert_eq!(run.flow_id, Some(17));
    }

    #[tokio::test]
    async fn test_publish_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let mut run = local_run();
        run.run_id = Some(42);
        let client = client_for(&server);
        assert_eq!(client.publish_run(&mut run).await.unwrap(), 42);
        assert_eq!(client.publish_run(&mut run).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_publish_rejection_leaves_run_unpublished() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/json/run"))
            .respond_with(ResponseTemplate::new(412).set_body_json(json!({
                "error": {"code": "203", "message": "Problem validating uploaded description file"}
            })))
            .mount(&server)
            .await;

        let mut run = local_run();
        run.flow_id = Some(5);
        let err = client_for(&server).publish_run(&mut run).await.unwrap_err();
        assert!(err.is_server_rejection());
        assert_eq!(run.run_id, None);
    }

    #[tokio::test]
    async fn test_existing_flow_is_reused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "flow_exists": {"exists": "true", "id": "33"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/json/flow"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let flow = local_run().flow.unwrap();
        assert_eq!(client_for(&server).ensure_flow(&flow).await.unwrap(), 33);
    }
}
