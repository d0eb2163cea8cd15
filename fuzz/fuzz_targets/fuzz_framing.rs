#![no_main]

use libfuzzer_sys::fuzz_target;
use simple_modulus::config::MAX_PACKET_SIZE;
use simple_modulus::{CompactHeaderCodec, KeystreamState, PipelineContext};

fuzz_target!(|data: &[u8]| {
    // Walk an arbitrary byte stream packet by packet; must never panic or loop.
    let mut context = PipelineContext::new(KeystreamState::new(), CompactHeaderCodec);
    let mut rest = data;
    while let Ok(Some(size)) = context.frame(rest, MAX_PACKET_SIZE) {
        assert!(size >= 1 && size <= rest.len());
        let _ = context.header.content_size(true);
        rest = &rest[size..];
    }
});
