use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use simple_modulus::config::{DECRYPTED_BLOCK_SIZE, ENCRYPTED_BLOCK_SIZE, HEADER_SCRATCH_SIZE};
use simple_modulus::core::block::{block_checksum, EncryptedBlock};
use simple_modulus::{
    BlockCipherPipeline, BlockTransform, BufferedSink, CompactHeaderCodec, Decryptor, Encryptor,
    HeaderCodec, KeystreamState, Result,
};

/// Widens each byte pair to 18 bits with no keying; measures framing overhead only.
struct WidenTransform;

impl BlockTransform for WidenTransform {
    fn encrypt_block(
        &mut self,
        keys: &mut KeystreamState,
        input: &[u8; DECRYPTED_BLOCK_SIZE],
        block_size: usize,
        output: &mut [u8; ENCRYPTED_BLOCK_SIZE],
    ) -> Result<()> {
        let mut words = [0u32; 4];
        for (i, word) in words.iter_mut().enumerate() {
            *word = u32::from(u16::from_be_bytes([input[2 * i], input[2 * i + 1]])) << 2;
        }
        *output = EncryptedBlock {
            words,
            block_size: block_size as u8,
            checksum: block_checksum(input),
        }
        .pack()?;
        keys.advance();
        Ok(())
    }

    fn decrypt_block(
        &mut self,
        keys: &mut KeystreamState,
        input: &[u8; ENCRYPTED_BLOCK_SIZE],
        output: &mut [u8; DECRYPTED_BLOCK_SIZE],
    ) -> Result<usize> {
        let block = EncryptedBlock::unpack(input)?;
        for (i, word) in block.words.iter().enumerate() {
            output[2 * i..2 * i + 2].copy_from_slice(&((word >> 2) as u16).to_be_bytes());
        }
        keys.advance();
        Ok(block.block_size as usize)
    }
}

#[allow(clippy::unwrap_used)]
fn plain_packet(size: usize) -> Vec<u8> {
    let mut header = [0u8; HEADER_SCRATCH_SIZE];
    let len = CompactHeaderCodec.write_header(size, &mut header).unwrap();
    let mut packet = header[..len].to_vec();
    packet.extend((0..size).map(|i| i as u8));
    packet
}

#[allow(clippy::unwrap_used)]
fn bench_process_packet(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_packet");
    let body_sizes = [16usize, 120, 1024, 16 * 1024];

    for &size in &body_sizes {
        let packet = plain_packet(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("encrypt_{size}b"), |b| {
            let mut enc = Encryptor::new(WidenTransform, KeystreamState::new(), CompactHeaderCodec);
            b.iter_batched(
                || BufferedSink::new(Vec::new()),
                |mut sink| {
                    enc.reset();
                    enc.process_packet(&packet, &mut sink).unwrap();
                    sink
                },
                BatchSize::SmallInput,
            )
        });

        let mut enc = Encryptor::new(WidenTransform, KeystreamState::new(), CompactHeaderCodec);
        let mut wire = BufferedSink::new(Vec::new());
        enc.process_packet(&packet, &mut wire).unwrap();
        let encrypted = wire.pending().to_vec();

        group.bench_function(format!("decrypt_{size}b"), |b| {
            let mut dec = Decryptor::new(WidenTransform, KeystreamState::new(), CompactHeaderCodec);
            b.iter_batched(
                || BufferedSink::new(Vec::new()),
                |mut sink| {
                    dec.reset();
                    dec.process_packet(&encrypted, &mut sink).unwrap();
                    sink
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process_packet);
criterion_main!(benches);
