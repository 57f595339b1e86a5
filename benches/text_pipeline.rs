use criterion::{black_box, criterion_group, criterion_main, Criterion};
use video_digest::{extract_video_id, SummaryFormatter};

/// Benchmark identifier extraction over the recognized URL shapes
fn bench_extract_video_id(c: &mut Criterion) {
    let urls = [
        "https://youtu.be/dQw4w9WgXcQ?t=30",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLrAXtmRdnEQy",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
        "not a url",
    ];

    c.bench_function("extract_video_id", |b| {
        b.iter(|| {
            for url in &urls {
                black_box(extract_video_id(black_box(url)));
            }
        })
    });
}

/// Benchmark formatting of a typical generated summary
fn bench_format_summary(c: &mut Criterion) {
    let formatter = SummaryFormatter::default();
    let point = "*The speaker walks through one idea in detail* with **emphasis** ";
    let summary = format!(
        "**Key Points:** {}**Challenges:** {}**Final Challenge:** {}",
        point.repeat(10),
        point.repeat(5),
        point.repeat(2)
    );

    c.bench_function("format_summary", |b| {
        b.iter(|| formatter.format(black_box(&summary)))
    });
}

criterion_group!(benches, bench_extract_video_id, bench_format_summary);
criterion_main!(benches);
