//
// Copyright 2024-2026 the pdulink contributors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Benchmarks for the outlet-table parser

use criterion::{Criterion, criterion_group, criterion_main};
use pdulink_protocol::{find_outlet, parse_outlet_table, strip_chrome};
use std::hint::black_box;

fn pshow_blob(rows: usize) -> String {
    let mut blob = String::from(
        "pshow\r\n\
         ********************************\r\n\
         *  Pakedge Power Distribution  *\r\n\
         ********************************\r\n\
         Port | Name        | Status |\r\n\
         -----|-------------|--------|\r\n",
    );
    for id in 1..=rows {
        let state = if id % 2 == 0 { "OFF" } else { "ON" };
        blob.push_str(&format!("  {}  | Outlet {:02}   | {}     |\r\n", id, id, state));
    }
    blob.push_str("\r\n> ");
    blob
}

fn bench_strip_chrome(c: &mut Criterion) {
    let blob = pshow_blob(8);
    c.bench_function("strip_chrome_8_outlets", |b| {
        b.iter(|| strip_chrome(black_box(&blob)));
    });
}

fn bench_parse_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_outlet_table");
    for rows in [8, 16, 48] {
        let blob = pshow_blob(rows);
        group.bench_function(format!("{}_outlets", rows), |b| {
            b.iter(|| parse_outlet_table(black_box(&blob)));
        });
    }
    group.finish();
}

fn bench_find_outlet(c: &mut Criterion) {
    let blob = pshow_blob(8);
    c.bench_function("find_outlet_last_row", |b| {
        b.iter(|| find_outlet(black_box(&blob), 8));
    });
}

criterion_group!(
    benches,
    bench_strip_chrome,
    bench_parse_table,
    bench_find_outlet
);
criterion_main!(benches);
