mod test_harness;

use chrono::NaiveDate;
use nanoslurm::stats::{CompletionBucket, Resources, Span};
use test_harness::FakeCluster;

#[test]
fn test_partition_capacity_from_sinfo() {
    let cluster = FakeCluster::new();
    cluster.install_output("sinfo", "p1|32/32/0/64|gpu:4|4\ncpu*|10/90/0/100|(null)|10\n");

    let caps = cluster.slurm().partition_capacity().unwrap();

    assert_eq!(caps["p1"], Resources { cpus: 64, gpus: 16 });
    assert_eq!(caps["cpu"], Resources { cpus: 100, gpus: 0 });
    assert_eq!(cluster.calls_to("sinfo"), vec!["sinfo -h -a -o %P|%C|%G|%D"]);
}

#[test]
fn test_partition_utilization() {
    let cluster = FakeCluster::new();
    cluster.install_output("sinfo", "gpu|0/64/0/64|gpu:8|1\nempty|0/0/0/0|(null)|0\n");
    cluster.install_output("squeue", "gpu|16|gres/gpu:4|1\ngpu|16|gres/gpu:4|1\n");

    let util = cluster.slurm().partition_utilization().unwrap();

    assert_eq!(util["gpu"], 100.0);
    assert_eq!(util["empty"], 0.0);
    assert_eq!(cluster.calls_to("squeue"), vec!["squeue -h -o %P|%C|%b|%D -t RUNNING"]);
}

#[test]
fn test_utilization_needs_sinfo() {
    let cluster = FakeCluster::new();
    cluster.install_output("squeue", "");

    let err = cluster.slurm().partition_utilization().unwrap_err();
    assert!(err.is_unavailable());
}

#[test]
fn test_fairshare_prefers_sprio() {
    let cluster = FakeCluster::new();
    cluster.install_output("sprio", "alice|0.75\nbob|0.20\n");
    cluster.install_output("sshare", "alice|0.10\n");

    let scores = cluster.slurm().fairshare_scores().unwrap();

    assert_eq!(scores.len(), 2);
    assert_eq!(scores["alice"], 0.75);
    assert!(cluster.calls_to("sshare").is_empty());
}

#[test]
fn test_fairshare_falls_back_to_sshare() {
    let cluster = FakeCluster::new();
    cluster.install_output("sshare", "|0.5\nalice|0.4\nbob|0.3\n");

    let scores = cluster.slurm().fairshare_scores().unwrap();

    assert_eq!(scores.len(), 2);
    assert_eq!(scores["bob"], 0.3);
    assert_eq!(cluster.calls_to("sshare"), vec!["sshare -n -P -o User,FairShare -a"]);
}

#[test]
fn test_fairshare_empty_when_no_source() {
    let cluster = FakeCluster::new();
    let scores = cluster.slurm().fairshare_scores().unwrap();
    assert!(scores.is_empty());
}

#[test]
fn test_recent_completions_by_day() {
    let cluster = FakeCluster::new();
    cluster.install_output(
        "sacct",
        "2024-01-01T09:00:00\n2024-01-01T17:30:00\n\
         2024-01-03T01:00:00\n2024-01-03T02:00:00\n2024-01-03T03:00:00\n\
         2024-01-03T04:00:00\n2024-01-03T05:00:00\nUnknown\n",
    );
    let now = NaiveDate::from_ymd_opt(2024, 1, 3)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    let buckets = cluster.slurm().completions_before(now, Span::Day, 3).unwrap();

    assert_eq!(
        buckets,
        vec![
            CompletionBucket { period: "2024-01-01".into(), count: 2 },
            CompletionBucket { period: "2024-01-03".into(), count: 5 },
        ]
    );
    assert_eq!(
        cluster.calls_to("sacct"),
        vec!["sacct -n -P --format=End -s CD -S 2023-12-31T00:00:00 -X"]
    );
}

#[test]
fn test_recent_completions_by_week() {
    let cluster = FakeCluster::new();
    cluster.install_output("sacct", "2024-01-02T10:00:00\n2024-01-09T10:00:00\n2024-01-10T10:00:00\n");
    let now = NaiveDate::from_ymd_opt(2024, 1, 12)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let buckets = cluster.slurm().completions_before(now, Span::Week, 4).unwrap();

    assert_eq!(
        buckets,
        vec![
            CompletionBucket { period: "2024-W01".into(), count: 1 },
            CompletionBucket { period: "2024-W02".into(), count: 2 },
        ]
    );
}

#[test]
fn test_zero_count_history_skips_sacct() {
    let cluster = FakeCluster::new();
    let buckets = cluster.slurm().recent_completions(Span::Day, 0).unwrap();
    assert!(buckets.is_empty());
    assert!(cluster.calls().is_empty());
}

#[test]
fn test_node_state_counts() {
    let cluster = FakeCluster::new();
    cluster.install_output(
        "sinfo",
        "n01|idle\nn02|idle\nn03|mixed\nn04|down*\nn03|mixed\nn02|idle\n",
    );

    let counts = cluster.slurm().node_state_counts().unwrap();

    assert_eq!(counts.len(), 3);
    assert_eq!(counts["IDLE"], 2);
    assert_eq!(counts["MIXED"], 1);
    assert_eq!(counts["DOWN"], 1);
    assert_eq!(cluster.calls_to("sinfo"), vec!["sinfo -h -a -N -o %N|%T"]);
}
