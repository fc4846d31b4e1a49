use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use matflat::batch::{BatchConfig, BatchConverter};
use matflat::mat::{MatArray, MatFile, MatWriter};
use matflat::npz::{self, NpzOptions};
use matflat::record::{extract, RecordSchema};
use std::io::Cursor;
use tempfile::TempDir;

/// Synthetic legacy record with `spike_count` waveforms of 32 samples
fn generate_record(spike_count: usize) -> MatArray {
    let spikes: Vec<f64> = (0..spike_count * 32).map(|i| (i as f64 * 0.1).sin()).collect();
    let channel: Vec<f64> = (0..spike_count).map(|i| (i % 4) as f64).collect();
    MatArray::record(
        "data",
        vec![
            ("spikes", MatArray::numeric("", vec![spike_count * 32, 1], spikes)),
            ("labels", MatArray::scalar("", 1.0)),
            ("channel", MatArray::numeric("", vec![1, spike_count, 1], channel)),
        ],
    )
}

/// Benchmark MAT decoding plus record flattening
fn bench_read_and_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_extract");
    let schema = RecordSchema::spike_sorting();

    for spike_count in [100, 1_000, 10_000] {
        let bytes = MatWriter::new().to_bytes(&[generate_record(spike_count)]).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(format!("{}spikes", spike_count)), &bytes, |b, bytes| {
            b.iter(|| {
                let file = MatFile::from_bytes(black_box(bytes)).unwrap();
                extract(file.get("data").unwrap(), &schema).unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark archive encoding, stored and deflated
fn bench_npz_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("npz_write");
    let mapping = extract(&generate_record(10_000), &RecordSchema::spike_sorting()).unwrap();

    for compress in [false, true] {
        let label = if compress { "deflated" } else { "stored" };
        group.bench_function(label, |b| {
            b.iter(|| npz::write_to(Cursor::new(Vec::new()), black_box(&mapping), NpzOptions { compress }).unwrap());
        });
    }

    group.finish();
}

/// Benchmark a whole directory conversion
fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);

    for num_files in [10, 50] {
        group.throughput(Throughput::Elements(num_files as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}files", num_files)), &num_files, |b, &num_files| {
            b.iter_batched(
                || {
                    let temp_dir = TempDir::new().unwrap();
                    let input = temp_dir.path().join("Data");
                    std::fs::create_dir(&input).unwrap();
                    let writer = MatWriter::new().with_compression(true);
                    for i in 0..num_files {
                        let path = input.join(format!("session_{:03}.mat", i));
                        writer.write_file(&path, &[generate_record(200)]).unwrap();
                    }
                    temp_dir
                },
                |temp_dir| {
                    let config = BatchConfig {
                        input_dir: temp_dir.path().join("Data"),
                        output_dir: temp_dir.path().join("out"),
                        ..Default::default()
                    };
                    BatchConverter::new(config).run().expect("Conversion failed");
                    drop(temp_dir);
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_read_and_extract, bench_npz_write, bench_batch);
criterion_main!(benches);
