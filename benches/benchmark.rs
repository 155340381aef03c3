//! パフォーマンスベンチマーク
//!
//! ヘッダ解析・レコード展開・チャートワークブック描画の処理時間を測定します。
//!
//! - ヘッダ解析: 256列（回答シートから読み取る幅）
//! - 展開＋描画: 1人分の回答（10カテゴリ×8項目）

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use skillradar::{parse_header, AnswerSheet, ChartRenderer, XlsxChartRenderer, HEADER_WIDTH};

/// カテゴリ数×項目数のヘッダ（残りは空セル）
fn header(categories: usize, items: usize) -> Vec<String> {
    let mut header: Vec<String> = ["タイムスタンプ", "会社名", "氏名"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for category in 0..categories {
        for item in 0..items {
            header.push(format!("分野{}[{}]:項目{}", category, category + 1, item));
        }
    }
    header.resize(HEADER_WIDTH, String::new());
    header
}

fn record(categories: usize, items: usize) -> Vec<String> {
    let mut record: Vec<String> = ["2024/04/01 10:00:00", "ACME", "山田"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    record.extend((0..categories * items).map(|i| ((i % 5) + 1).to_string()));
    record
}

fn bench_parse_header(c: &mut Criterion) {
    let header = header(10, 8);

    let mut group = c.benchmark_group("header");
    group.throughput(Throughput::Elements(header.len() as u64));
    group.bench_function("parse_header_256", |b| {
        b.iter(|| parse_header(black_box(&header)))
    });
    group.finish();
}

fn bench_pivot_and_render(c: &mut Criterion) {
    let parsed = parse_header(&header(10, 8));
    let record = record(10, 8);
    let renderer = XlsxChartRenderer::new();

    c.bench_function("pivot", |b| {
        b.iter(|| AnswerSheet::pivot(black_box(&parsed), black_box(&record)))
    });

    c.bench_function("pivot_and_render", |b| {
        b.iter(|| {
            let sheet = AnswerSheet::pivot(&parsed, black_box(&record));
            sheet.map(|sheet| renderer.render(&sheet, &parsed.categories))
        })
    });
}

criterion_group!(benches, bench_parse_header, bench_pivot_and_render);
criterion_main!(benches);
