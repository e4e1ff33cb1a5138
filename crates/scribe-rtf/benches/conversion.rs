//! Benchmarks for markdown to RTF conversion throughput.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use scribe_rtf::{NonAsciiPolicy, RtfConverter, markdown_to_html, postprocess};

/// Generate a blog-post shaped document.
fn generate_post(sections: usize) -> String {
    let mut md = String::with_capacity(sections * 400);
    md.push_str("# ***Acme Widget*** Launch\n");

    for i in 0..sections {
        md.push_str(&format!("## Section {i}\n"));
        md.push_str(
            "It\u{2019}s a paragraph with **bold**, *italic* and a [link](https://example.com) \
             \u{2014} plus {braces} and a C:\\path.\n\n",
        );
        md.push_str("- first point\n- second point\n  - nested point\n\n");
        md.push_str("| Name | Value |\n|---|---|\n| a | 1 |\n| b | 2 |\n\n");
    }
    md
}

fn bench_convert_simple(c: &mut Criterion) {
    let converter = RtfConverter::new();

    c.bench_function("convert_simple_markdown", |b| {
        b.iter(|| converter.convert("# Hello\n\nSimple **content**."));
    });
}

fn bench_convert_varying_sizes(c: &mut Criterion) {
    let converter = RtfConverter::new().with_non_ascii(NonAsciiPolicy::Escape);
    let mut group = c.benchmark_group("convert_by_sections");

    for sections in [1, 10, 100] {
        let markdown = generate_post(sections);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &markdown, |b, md| {
            b.iter(|| converter.convert(md));
        });
    }
    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let markdown = generate_post(50);
    let html = markdown_to_html(&markdown, true);
    let converter = RtfConverter::new();
    let body = "\\pard ***a*** text\\par \\par ".repeat(500);

    c.bench_function("stage_markdown_to_html", |b| {
        b.iter(|| markdown_to_html(&markdown, true));
    });
    c.bench_function("stage_html_to_rtf", |b| {
        b.iter(|| converter.convert_html(&html));
    });
    c.bench_function("stage_postprocess", |b| {
        b.iter(|| postprocess(&body));
    });
}

criterion_group!(
    benches,
    bench_convert_simple,
    bench_convert_varying_sizes,
    bench_stages
);
criterion_main!(benches);
