//! Fetch a task, run a search, publish and read the run back against a mock
//! service.

use foldwise::core::estimators::{DummyClassifier, LogisticRegression, SgdClassifier, SgdLoss};
use foldwise::core::search::ParamGrid;
use foldwise::{FoldwiseSdk, RunFilter, SearchCv};
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{body_string_contains, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TASK_ID: u64 = 59;

/// 12 instances, two well separated classes, 1 x 3 folds
fn dataset_arff() -> String {
    let mut arff = String::from(
        "@RELATION blobs\n@ATTRIBUTE x NUMERIC\n@ATTRIBUTE y NUMERIC\n@ATTRIBUTE class {left,right}\n@DATA\n",
    );
    for i in 0..12 {
        let (x, label) = if i % 2 == 0 {
            (i as f64 * 0.1, "left")
        } else {
            (10.0 + i as f64 * 0.1, "right")
        };
        arff.push_str(&format!("{},{},{}\n", x, x * 0.5, label));
    }
    arff
}

fn splits_arff() -> String {
    let mut arff = String::from(
        "@RELATION splits\n@ATTRIBUTE type {TRAIN,TEST}\n@ATTRIBUTE rowid INTEGER\n@ATTRIBUTE repeat INTEGER\n@ATTRIBUTE fold INTEGER\n@DATA\n",
    );
    for fold in 0..3 {
        for row in 0..12 {
            let kind = if row / 4 == fold { "TEST" } else { "TRAIN" };
            arff.push_str(&format!("{},{},0,{}\n", kind, row, fold));
        }
    }
    arff
}

async fn mock_service() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/json/task/{}", TASK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task": {
                "task_id": TASK_ID,
                "task_type": "Supervised Classification",
                "input": [
                    {"name": "source_data", "data_set": {"data_set_id": 7, "target_feature": "class"}},
                    {"name": "estimation_procedure", "estimation_procedure": {
                        "type": "crossvalidation",
                        "data_splits_url": format!("{}/files/splits", server.uri()),
                        "parameter": [
                            {"name": "number_repeats", "value": "1"},
                            {"name": "number_folds", "value": "3"}
                        ]
                    }}
                ]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/json/data/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data_set_description": {"id": "7", "url": format!("{}/files/data", server.uri())}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(dataset_arff()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/splits"))
        .respond_with(ResponseTemplate::new(200).set_body_string(splits_arff()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v1/json/flow/exists/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "flow_exists": {"exists": "false", "id": "-1"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/json/flow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_flow": {"id": "4242"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/json/run"))
        .and(body_string_contains("name=\"trace\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_run": {"run_id": "777"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/json/run/list/flow/4242"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "runs": {"run": {
                "run_id": "777", "task_id": TASK_ID.to_string(), "setup_id": "1",
                "flow_id": "4242", "uploader": "5"
            }}
        })))
        .mount(&server)
        .await;

    server
}

fn sdk_for(server: &MockServer) -> FoldwiseSdk {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"server": "{}/api/v1/json", "api_key": "test-key"}}"#,
        server.uri()
    )
    .unwrap();
    FoldwiseSdk::from_config_file(file.path()).unwrap()
}

#[tokio::test]
async fn test_search_run_round_trip() {
    let server = mock_service().await;
    let sdk = sdk_for(&server);

    let mut grid = ParamGrid::new();
    grid.insert("C".into(), vec![0.1.into(), 1.0.into()]);
    let search = SearchCv::grid(Box::new(LogisticRegression::new()), grid).with_cv(2);

    let mut run = sdk.run_task(TASK_ID, Box::new(search)).await.unwrap();
    assert_eq!(run.predictions.len(), 12);
    assert_eq!(run.trace.as_ref().map(Vec::len), Some(2 * 3));
    assert_eq!(run.evaluations["predictive_accuracy"], 1.0);
    for row in &run.predictions {
        let total: f64 = row.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    let run_id = sdk.publish(&mut run).await.unwrap();
    assert_eq!(run_id, 777);
    assert_eq!(run.flow_id, Some(4242));
    // second publish is a no-op
    assert_eq!(sdk.publish(&mut run).await.unwrap(), 777);
    let uploads = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/api/v1/json/run")
        .count();
    assert_eq!(uploads, 1);

    let listed = sdk
        .list_runs(&RunFilter::new().flows([4242]))
        .await
        .unwrap();
    assert_eq!(listed[&777].task_id, TASK_ID);
}

#[tokio::test]
async fn test_capability_errors_before_any_fit() {
    let server = mock_service().await;
    let sdk = sdk_for(&server);

    let err = sdk
        .run_task(TASK_ID, Box::new(SgdClassifier::new(SgdLoss::Hinge)))
        .await
        .unwrap_err();
    assert!(err.is_capability());
    assert!(err.to_string().contains("loss='hinge'"));

    let mut dummy = DummyClassifier::prior();
    assert!(foldwise::Estimator::set_param(&mut dummy, "strategy", "bogus".into()).is_err());
}
