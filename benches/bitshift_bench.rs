use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use simple_modulus::core::bitshift::copy_bits;
use simple_modulus::core::block::EncryptedBlock;

#[allow(clippy::unwrap_used)]
fn bench_copy_bits(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_bits");
    let input = [0xA5u8; 16];

    for &length in &[8usize, 18, 64, 120] {
        group.throughput(Throughput::Bytes(length.div_ceil(8) as u64));
        group.bench_function(format!("unaligned_{length}bit"), |b| {
            b.iter(|| {
                let mut output = [0u8; 24];
                copy_bits(&mut output, black_box(5), &input, black_box(3), length).unwrap();
                output
            })
        });
    }

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_block_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_layout");
    let block = EncryptedBlock {
        words: [0x2_A5A5, 0x1_0203, 0x3_FFFF, 0x0_0001],
        block_size: 8,
        checksum: 0x42,
    };
    let packed = block.pack().unwrap();

    group.bench_function("pack", |b| b.iter(|| black_box(&block).pack().unwrap()));
    group.bench_function("unpack", |b| {
        b.iter(|| EncryptedBlock::unpack(black_box(&packed)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_copy_bits, bench_block_layout);
criterion_main!(benches);
