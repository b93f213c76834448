// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec Benchmark
//!
//! Measures the two costs of a row codec:
//! - building the schema, serializer and deserializer for a type
//! - converting values once the codec is built

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;
use tabula::{Record, RowEncoder, TypedEncoder};
use tabula::types::Introspect;

#[derive(Debug, Clone, PartialEq, Record)]
struct Position {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Track {
    id: i64,
    name: String,
    points: Vec<Position>,
    samples: Box<[f32]>,
    meta: BTreeMap<String, Option<String>>,
}

fn sample_track() -> Track {
    Track {
        id: 42,
        name: "track-42".into(),
        points: (0..32)
            .map(|i| Position {
                x: f64::from(i),
                y: f64::from(i) * 0.5,
                z: 0.0,
            })
            .collect(),
        samples: vec![0.5; 64].into_boxed_slice(),
        meta: [("source".to_string(), Some("radar".to_string()))]
            .into_iter()
            .collect(),
    }
}

fn bench_build(c: &mut Criterion) {
    let ty = Track::type_descriptor();
    c.bench_function("codec_build_track", |b| {
        b.iter(|| RowEncoder::for_type(black_box(&ty)).expect("encoder"));
    });
}

fn bench_convert(c: &mut Criterion) {
    let encoder = TypedEncoder::<Track>::new().expect("encoder");
    let track = sample_track();
    let row = encoder.encode(&track).expect("encode");

    c.bench_function("codec_encode_track", |b| {
        b.iter(|| encoder.encode(black_box(&track)).expect("encode"));
    });
    c.bench_function("codec_decode_track", |b| {
        b.iter(|| encoder.decode(black_box(&row)).expect("decode"));
    });
}

criterion_group!(benches, bench_build, bench_convert);
criterion_main!(benches);
