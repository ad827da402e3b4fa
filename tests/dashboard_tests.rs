mod test_harness;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use nanoslurm::config::DashboardConfig;
use nanoslurm::dashboard::{router, DashboardState};
use test_harness::FakeCluster;

fn create_test_app(cluster: &FakeCluster) -> Router {
    router(DashboardState::new(cluster.slurm(), &DashboardConfig::default()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn install_queue(cluster: &FakeCluster) {
    cluster.install_output(
        "squeue",
        "1|a|alice|alpha|RUNNING|2024-04-02T08:00:00|2024-04-02T08:01:00\n\
         2|b|alice|alpha|RUNNING|2024-04-02T08:00:00|2024-04-02T08:01:00\n\
         3|c|bob|beta|PENDING|2024-04-02T08:00:00|N/A\n",
    );
}

#[tokio::test]
async fn test_index_page() {
    let cluster = FakeCluster::new();
    let response = create_test_app(&cluster)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("nanoslurm monitor"));
    assert!(html.contains("const REFRESH_MS = 5000;"));
}

#[tokio::test]
async fn test_list_jobs_endpoint() {
    let cluster = FakeCluster::new();
    install_queue(&cluster);

    let (status, json) = get(create_test_app(&cluster), "/api/jobs").await;

    assert_eq!(status, StatusCode::OK);
    let jobs = json["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[0]["id"], 1);
    assert_eq!(jobs[0]["user"], "alice");
    assert_eq!(jobs[0]["state"], "RUNNING");
    assert_eq!(jobs[2]["start_time"], Value::Null);

    assert_eq!(json["state_counts"][0]["label"], "PENDING");
    assert_eq!(json["state_counts"][0]["percent"], 33.3);
    assert_eq!(json["state_counts"][1]["label"], "RUNNING");
    assert_eq!(json["state_counts"][1]["count"], 2);
    assert_eq!(json["partitions"]["alpha"]["running"], 2);
    assert_eq!(json["partitions"]["beta"]["pending"], 1);
}

#[tokio::test]
async fn test_list_jobs_filters_by_user() {
    let cluster = FakeCluster::new();
    cluster.install_output("squeue", "");

    let (status, _) = get(create_test_app(&cluster), "/api/jobs?user=bob").await;

    assert_eq!(status, StatusCode::OK);
    assert!(cluster.calls_to("squeue")[0].ends_with("-u bob"));
}

#[tokio::test]
async fn test_missing_tools_are_service_unavailable() {
    let cluster = FakeCluster::new();

    let (status, json) = get(create_test_app(&cluster), "/api/jobs").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("squeue, sacct"));

    let (status, _) = get(create_test_app(&cluster), "/api/partitions").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_job_detail_endpoint() {
    let cluster = FakeCluster::new();
    cluster.install_output("squeue", "RUNNING\n");
    cluster.install_output("scontrol", "JobId=5 JobName=a Partition=alpha NumNodes=1\n");

    let (status, json) = get(create_test_app(&cluster), "/api/jobs/5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 5);
    assert_eq!(json["state"], "RUNNING");
    assert_eq!(json["info"]["Partition"], "alpha");
}

#[tokio::test]
async fn test_job_detail_without_scontrol_keeps_state() {
    let cluster = FakeCluster::new();
    cluster.install_output("sacct", "COMPLETED\n");

    let (status, json) = get(create_test_app(&cluster), "/api/jobs/6").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "COMPLETED");
    assert_eq!(json["info"], serde_json::json!({}));
}

#[tokio::test]
async fn test_job_detail_rejects_non_numeric_id() {
    let cluster = FakeCluster::new();
    let response = create_test_app(&cluster)
        .oneshot(Request::builder().uri("/api/jobs/abc").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_partitions_endpoint() {
    let cluster = FakeCluster::new();
    cluster.install_output("sinfo", "gpu*|0/64/0/64|gpu:8|1\n");
    cluster.install_output("squeue", "gpu|32|gres/gpu:8|1\n");

    let (status, json) = get(create_test_app(&cluster), "/api/partitions").await;

    assert_eq!(status, StatusCode::OK);
    let parts = json.as_array().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["partition"], "gpu");
    assert_eq!(parts[0]["capacity"]["cpus"], 64);
    assert_eq!(parts[0]["used"]["gpus"], 8);
    assert_eq!(parts[0]["utilization"], 100.0);
}

#[tokio::test]
async fn test_users_endpoint() {
    let cluster = FakeCluster::new();
    install_queue(&cluster);

    let (status, json) = get(create_test_app(&cluster), "/api/users").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["top_users"][0]["label"], "alice");
    assert_eq!(json["top_users"][0]["percent"], 66.7);
    assert_eq!(json["activity"]["bob"]["pending"], 1);
}

#[tokio::test]
async fn test_fairshare_endpoint_empty_without_tools() {
    let cluster = FakeCluster::new();

    let (status, json) = get(create_test_app(&cluster), "/api/fairshare").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({}));
}

#[tokio::test]
async fn test_nodes_endpoint() {
    let cluster = FakeCluster::new();
    cluster.install_output("sinfo", "a01|idle\na02|allocated\na03|allocated\na01|idle\n");

    let (status, json) = get(create_test_app(&cluster), "/api/nodes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["IDLE"], 1);
    assert_eq!(json["ALLOCATED"], 2);
}

#[tokio::test]
async fn test_history_endpoint_params() {
    let cluster = FakeCluster::new();
    cluster.install_output("sacct", "");

    let (status, json) = get(create_test_app(&cluster), "/api/history?span=week&count=4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
    assert!(cluster.calls_to("sacct")[0].contains("-s CD"));

    let (status, _) = get(create_test_app(&cluster), "/api/history?span=month").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
