use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use resfs::{timestamp, Encoding, Registry, ResourceDescriptor};
use std::io::{Read, SeekFrom, Write};

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| b"abcdefghij\n"[i % 11]).collect()
}

fn registry(len: usize) -> Registry {
    let data = payload(len);
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data).unwrap();
    let compressed = encoder.finish().unwrap();

    let registry = Registry::named(".");
    registry
        .register_file(ResourceDescriptor::raw("raw.txt", data.clone(), timestamp(0, 0)))
        .unwrap();
    registry
        .register_file(ResourceDescriptor::new(
            "zlib.txt",
            "zlib.txt",
            Encoding::Compressed,
            compressed,
            len as u64,
            timestamp(0, 0),
        ))
        .unwrap();
    registry
}

fn bench_read_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_to_end");
    for len in [4 << 10, 256 << 10] {
        let registry = registry(len);
        group.throughput(Throughput::Bytes(len as u64));
        for name in ["raw.txt", "zlib.txt"] {
            group.bench_with_input(BenchmarkId::new(name, len), &name, |b, name| {
                b.iter(|| {
                    let mut handle = registry.open(black_box(name)).unwrap();
                    let mut out = Vec::with_capacity(len);
                    handle.read_to_end(&mut out).unwrap();
                    out
                });
            });
        }
    }
    group.finish();
}

fn bench_backward_seek(c: &mut Criterion) {
    let registry = registry(256 << 10);
    c.bench_function("compressed_seek_back", |b| {
        b.iter(|| {
            let mut handle = registry.open("zlib.txt").unwrap();
            let mut buf = [0u8; 64];
            handle.seek(SeekFrom::End(-64)).unwrap();
            handle.read(&mut buf).unwrap();
            handle.seek(SeekFrom::Start(black_box(1024))).unwrap();
            handle.read(&mut buf).unwrap();
            buf
        });
    });
}

criterion_group!(benches, bench_read_to_end, bench_backward_seek);
criterion_main!(benches);
