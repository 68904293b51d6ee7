use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crop_recommender::{
    FormVariant, LocalStub, SampleForm, SessionState, SoilWeatherSample, Workflow,
};

fn example_form() -> SampleForm {
    SampleForm::from_sample(&SoilWeatherSample::with_nutrients(
        90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9,
    ))
}

fn bench_form_parse(c: &mut Criterion) {
    let form = example_form();

    c.bench_function("sample_form.parse.nutrients", |b| {
        b.iter(|| black_box(&form).parse(FormVariant::Nutrients))
    });
}

fn bench_local_submit(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");
    let workflow = Workflow::new(LocalStub::seeded(7), FormVariant::Nutrients);
    let form = example_form();

    c.bench_function("workflow.submit.local", |b| {
        b.iter(|| {
            let mut session = SessionState::new();
            runtime.block_on(workflow.submit(&mut session, black_box(&form)))
        })
    });
}

criterion_group!(benches, bench_form_parse, bench_local_submit);
criterion_main!(benches);
