// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

//! Load benchmarks.
//!
//! ```bash
//! cargo bench --bench basic
//! ```

use criterion::{criterion_group, criterion_main, Criterion};
use spreadsheetml::{open_spreadsheet, SpreadsheetMl};
use std::fmt::Write;
use std::hint::black_box;
use std::io::Cursor;

const ROWS: usize = 10_000;

/// A single sheet document with styled numbers, strings and relative formulas
fn generated() -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0"?>
<?mso-application progid="Excel.Sheet"?>
<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet"
 xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">
 <Styles>
  <Style ss:ID="Default"><Font ss:FontName="Calibri" ss:Size="11"/></Style>
  <Style ss:ID="s1"><Font ss:Bold="1"/><Interior ss:Color="#FFFF00"/></Style>
 </Styles>
 <Worksheet ss:Name="Data"><Table>
"#,
    );
    for i in 0..ROWS {
        let _ = write!(
            xml,
            r#"<Row><Cell><Data ss:Type="String">item {i}</Data></Cell><Cell ss:StyleID="s1"><Data ss:Type="Number">{i}.5</Data></Cell><Cell ss:Formula="=RC[-1]*2"><Data ss:Type="Number">{}</Data></Cell></Row>
"#,
            2 * i + 1
        );
    }
    xml.push_str("</Table></Worksheet></Workbook>");
    xml
}

fn count(book: &spreadsheetml::Spreadsheet) -> usize {
    let mut count = 0;
    for sheet in book.worksheets() {
        let range = sheet.range().expect("cannot lay out values");
        count += range.rows().flat_map(|r| r.iter()).count();
        let formulas = sheet.formulas().expect("cannot lay out formulas");
        count += formulas.rows().flat_map(|r| r.iter()).count();
    }
    count
}

fn bench_budget(c: &mut Criterion) {
    let path = format!("{}/tests/budget.xml", env!("CARGO_MANIFEST_DIR"));
    c.bench_function("budget", |b| {
        b.iter(|| {
            let book = open_spreadsheet(&path).expect("cannot open budget.xml");
            black_box(count(&book))
        })
    });
}

fn bench_generated(c: &mut Criterion) {
    let xml = generated();
    let reader = SpreadsheetMl::new();
    let mut group = c.benchmark_group("generated");
    group.sample_size(10);
    group.bench_function("load", |b| {
        b.iter(|| {
            let book = reader
                .load(&mut Cursor::new(xml.as_bytes()))
                .expect("cannot load document");
            black_box(count(&book))
        })
    });
    group.bench_function("list_worksheet_info", |b| {
        b.iter(|| {
            black_box(
                reader
                    .list_worksheet_info(&mut Cursor::new(xml.as_bytes()))
                    .expect("cannot list worksheets"),
            )
        })
    });
    group.finish();
}

criterion_group!(benches, bench_budget, bench_generated);
criterion_main!(benches);
