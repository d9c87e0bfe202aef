//! 端点解析与结果序列化基准测试

use criterion::{criterion_group, criterion_main, Criterion};
use service_pulse::config::{Config, TomlConfigLoader, SAMPLE_CONFIG};
use service_pulse::probe::{ProbeError, ProbeOutcome, ProbeReport, Target};
use std::hint::black_box;
use std::time::Duration;

/// 端点解析基准测试
fn target_parse_benchmark(c: &mut Criterion) {
    c.bench_function("target_parse_http", |b| {
        b.iter(|| Target::parse(black_box("http://foo.test/health?verbose=1"), None))
    });

    c.bench_function("target_parse_tcp", |b| {
        b.iter(|| Target::parse(black_box("tcp://localhost:8949"), None))
    });

    c.bench_function("target_parse_with_path_override", |b| {
        b.iter(|| Target::parse(black_box("https://[::1]:8443/x"), Some("/ok")))
    });
}

/// 探测报告处理基准测试
fn probe_report_benchmark(c: &mut Criterion) {
    let unhealthy = ProbeOutcome::Unhealthy(ProbeError::UnexpectedStatus(503));

    c.bench_function("probe_report_serialization", |b| {
        b.iter(|| {
            let report = ProbeReport::new("http://foo.test/health", black_box(&unhealthy))
                .with_elapsed(Duration::from_millis(42));
            black_box(report.to_json().unwrap())
        })
    });
}

/// 配置解析基准测试
fn config_parsing_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let loader = TomlConfigLoader::new(false);

    c.bench_function("sample_config_parsing", |b| {
        b.iter(|| {
            let config: Config = runtime
                .block_on(loader.load_from_string(black_box(SAMPLE_CONFIG)))
                .unwrap();
            black_box(config)
        })
    });
}

criterion_group!(
    benches,
    target_parse_benchmark,
    probe_report_benchmark,
    config_parsing_benchmark
);
criterion_main!(benches);
