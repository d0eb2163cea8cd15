#![no_main]

use libfuzzer_sys::fuzz_target;
use simple_modulus::core::bitshift::copy_bits;

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let (params, input) = data.split_at(3);
    let input_offset = usize::from(params[0]);
    let output_offset = usize::from(params[1]);
    let length = usize::from(params[2]);

    // Capacity violations are errors, never panics.
    let mut output = [0u8; 64];
    if let Ok(written) = copy_bits(&mut output, output_offset, input, input_offset, length) {
        let bits: u32 = output.iter().map(|b| b.count_ones()).sum();
        assert!(bits as usize <= length);
        assert!(output_offset / 8 + written <= output.len());
    }
});
