use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tasker_context::context::{ExecutionContext, StepCategory, StepFrame};
use tasker_context::interrupt::{
    build_interrupt, InterruptEnvelope, InterruptType, SuspensionMode, SuspensionResponse,
};
use tasker_context::status::{calculate_status, Status};

fn children(count: usize) -> Vec<Status> {
    let cycle = [
        Status::Succeeded,
        Status::Skipped,
        Status::Running,
        Status::Queued,
        Status::IgnoreFailed,
        Status::Paused,
    ];
    cycle.iter().copied().cycle().take(count).collect()
}

fn benchmark_calculate_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_status");
    for count in [4usize, 64, 1024] {
        let statuses = children(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &statuses, |b, statuses| {
            b.iter(|| calculate_status(black_box(statuses), "bench-run"))
        });
    }
    group.finish();
}

fn benchmark_context_derivation(c: &mut Criterion) {
    let frames = (0..12)
        .map(|i| {
            StepFrame::builder()
                .runtime_id(format!("rt-{i}"))
                .identifier(format!("level{i}"))
                .step_type("STEP", StepCategory::Step)
                .build()
                .unwrap()
        })
        .collect();
    let ctx = ExecutionContext::new("bench-run", "bench-plan")
        .with_attribute("accountId", "acc")
        .with_frames(frames)
        .unwrap();

    c.bench_function("derive_for_child", |b| b.iter(|| black_box(&ctx).derive_for_child()));
    c.bench_function("derive_for_finish", |b| b.iter(|| black_box(&ctx).derive_for_finish()));
}

fn benchmark_build_interrupt(c: &mut Criterion) {
    let envelope = InterruptEnvelope::new(InterruptType::Abort, "node", "notify");
    let response: SuspensionResponse = SuspensionMode::Task {
        task_id: "task".to_string(),
    }
    .into();

    c.bench_function("build_interrupt_task", |b| {
        b.iter(|| build_interrupt(black_box(&envelope), black_box(&response)))
    });
}

criterion_group!(
    benches,
    benchmark_calculate_status,
    benchmark_context_derivation,
    benchmark_build_interrupt
);
criterion_main!(benches);
