use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dispute_sml_core::{
    extract_features, BoostedEnsemble, CaseRecord, DisputeCategory, EnsembleConfig, FeatureVector,
};

const ROWS: usize = 400;

fn bench_cases(count: usize) -> Vec<CaseRecord> {
    (0..count)
        .map(|idx| {
            let mut case = CaseRecord::pending(format!("bench-{idx:04}"));
            case.job_category = (idx % 20) as u16;
            case.dispute_category = DisputeCategory::ALL[idx % 8];
            case.amount_tier = (idx % 5) as u8;
            case.evidence_quality_a = (20 + idx * 37 % 80) as u8;
            case.evidence_quality_b = (20 + idx * 53 % 80) as u8;
            case.response_time_a = (1 + idx * 7 % 71) as u32;
            case.response_time_b = (1 + idx * 13 % 71) as u32;
            case.prior_disputes_a = (idx % 5) as u32;
            case.prior_disputes_b = (idx * 3 % 5) as u32;
            case.final_verdict = (1 + idx % 5) as u8;
            case
        })
        .collect()
}

fn dataset() -> (Vec<FeatureVector>, Vec<usize>) {
    let cases = bench_cases(ROWS);
    let rows = cases.iter().map(extract_features).collect();
    let labels = cases.iter().map(|c| c.final_verdict as usize).collect();
    (rows, labels)
}

fn bench_fit(c: &mut Criterion) {
    let (rows, labels) = dataset();
    let mut group = c.benchmark_group("ensemble_fit");
    group.sample_size(10);
    group.throughput(Throughput::Elements(ROWS as u64));

    for n_estimators in [10usize, 50] {
        let config = EnsembleConfig {
            n_estimators,
            ..EnsembleConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(n_estimators),
            &config,
            |b, config| {
                b.iter(|| BoostedEnsemble::fit(config, black_box(&rows), black_box(&labels)))
            },
        );
    }
    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let (rows, labels) = dataset();
    let model = match BoostedEnsemble::fit(&EnsembleConfig::default(), &rows, &labels) {
        Ok(model) => model,
        Err(err) => panic!("bench model failed to fit: {err}"),
    };

    let mut group = c.benchmark_group("ensemble_predict");
    group.throughput(Throughput::Elements(ROWS as u64));
    group.bench_function("predict_proba", |b| {
        b.iter(|| model.predict_proba(black_box(&rows)))
    });
    group.finish();
}

criterion_group!(benches, bench_fit, bench_predict);
criterion_main!(benches);
