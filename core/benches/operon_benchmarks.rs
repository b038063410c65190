use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use operon::{drift_to, CatchFlow, OperonError, Pipeline, Schema, State, StepFlow};
use serde_json::json;

// Using OperonError directly for benchmark simplicity.
type BenchError = OperonError;

fn seed_state() -> State {
  json!({ "counter": 0 }).as_object().cloned().expect("object literal")
}

// --- Helper: linear pipeline of n committing steps ---
fn build_linear_pipeline(steps: usize) -> Pipeline<BenchError> {
  let mut pipeline = Pipeline::<BenchError>::new("bench_linear");
  for i in 0..steps {
    let name = format!("step_{i}");
    pipeline.step(&name).expect("unique step names");
    pipeline.schema(&name, Schema::default());
    pipeline.on(&name, |view| {
      let counter = view.integer("counter").unwrap_or(0);
      let mut next = view.raw().clone();
      next.insert("counter".to_string(), json!(counter + 1));
      Ok(StepFlow::Commit(next))
    });
  }
  pipeline
}

// --- Helper: pipeline drifting back over itself `hops` times ---
fn build_drifting_pipeline(hops: u32) -> Pipeline<BenchError> {
  let mut pipeline = Pipeline::<BenchError>::new("bench_drift");
  pipeline.step("bump").expect("unique step names");
  pipeline.step("again").expect("unique step names");
  pipeline.schema("bump", Schema::default());
  pipeline.schema("again", Schema::default());
  pipeline.on("bump", |view| {
    let taken = view.integer("taken").unwrap_or(0);
    let mut next = view.raw().clone();
    next.insert("taken".to_string(), json!(taken + 1));
    Ok(StepFlow::Commit(next))
  });
  pipeline.on("again", move |view| {
    if (view.integer("taken").unwrap_or(0) as u32) < hops {
      Ok(drift_to("bump"))
    } else {
      Ok(StepFlow::Stay)
    }
  });
  pipeline
}

// --- Helper: pipeline resolving a failure through a catch chain ---
fn build_catching_pipeline(catches: usize) -> Pipeline<BenchError> {
  let mut pipeline = Pipeline::<BenchError>::new("bench_catch");
  pipeline.step("explode").expect("unique step names");
  pipeline.schema("explode", Schema::default());
  pipeline.on("explode", |_view| {
    Err(OperonError::Handler {
      source: anyhow::anyhow!("bench failure"),
    })
  });
  for i in 0..catches {
    let name = format!("catch_{i}");
    pipeline.catch_all(&name);
    pipeline.on_catch(&name, |_failure| Ok(CatchFlow::Pass));
  }
  pipeline
}

fn bench_linear_pass(c: &mut Criterion) {
  let mut group = c.benchmark_group("linear_pass");
  for &n in &[1usize, 8, 32] {
    group.throughput(Throughput::Elements(n as u64));
    let pipeline = build_linear_pipeline(n);
    group.bench_with_input(BenchmarkId::from_parameter(n), &pipeline, |b, p| {
      b.iter(|| p.run(seed_state()).expect("bench pipeline completes"))
    });
  }
  group.finish();
}

fn bench_drift_resumption(c: &mut Criterion) {
  let mut group = c.benchmark_group("drift_resumption");
  for &hops in &[1u32, 4, 16] {
    group.throughput(Throughput::Elements(hops as u64));
    let pipeline = build_drifting_pipeline(hops);
    group.bench_with_input(BenchmarkId::from_parameter(hops), &pipeline, |b, p| {
      b.iter(|| p.run(seed_state()).expect("bench pipeline completes"))
    });
  }
  group.finish();
}

fn bench_catch_chain(c: &mut Criterion) {
  let mut group = c.benchmark_group("catch_chain");
  for &n in &[1usize, 8] {
    group.throughput(Throughput::Elements(n as u64));
    let pipeline = build_catching_pipeline(n);
    group.bench_with_input(BenchmarkId::from_parameter(n), &pipeline, |b, p| {
      // The failure is absorbed, so the run itself returns Ok.
      b.iter(|| p.run(seed_state()).expect("bench failure is absorbed"))
    });
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_linear_pass,
  bench_drift_resumption,
  bench_catch_chain
);
criterion_main!(benches);
