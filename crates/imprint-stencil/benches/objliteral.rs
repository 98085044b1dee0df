//! Throughput of the object-literal codec.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use imprint_stencil::objliteral::{ObjLiteralFlags, ObjLiteralReader, ObjLiteralWriter};

const ELEMENTS: usize = 1024;

fn encode_dense_array() -> (Vec<u8>, ObjLiteralFlags) {
    let mut writer = ObjLiteralWriter::new();
    writer.begin_object(ObjLiteralFlags::ARRAY);
    writer.begin_dense_array_elements();
    for i in 0..ELEMENTS {
        match i % 3 {
            0 => writer.prop_with_const_numeric_value(i as f64),
            1 => writer.prop_with_true_value(),
            _ => writer.prop_with_null_value(),
        }
    }
    let stencil = writer.finish();
    (stencil.code().to_vec(), stencil.flags())
}

fn bench_writer(c: &mut Criterion) {
    c.bench_function("objliteral_write_1k", |b| {
        b.iter(|| {
            let (code, _) = encode_dense_array();
            black_box(code.len())
        })
    });
}

fn bench_reader(c: &mut Criterion) {
    let (code, flags) = encode_dense_array();
    c.bench_function("objliteral_read_1k", |b| {
        b.iter(|| {
            let mut reader = ObjLiteralReader::new(black_box(&code), flags);
            let mut count = 0usize;
            while let Ok(Some(insn)) = reader.read_insn() {
                black_box(insn.op());
                count += 1;
            }
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_writer, bench_reader);
criterion_main!(benches);
