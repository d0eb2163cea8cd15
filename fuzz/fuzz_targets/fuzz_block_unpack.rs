#![no_main]

use libfuzzer_sys::fuzz_target;
use simple_modulus::config::ENCRYPTED_BLOCK_SIZE;
use simple_modulus::core::block::EncryptedBlock;

fuzz_target!(|data: [u8; ENCRYPTED_BLOCK_SIZE]| {
    // Any block that unpacks must pack back to the same bytes.
    if let Ok(block) = EncryptedBlock::unpack(&data) {
        let packed = block.pack().expect("unpacked block repacks");
        assert_eq!(packed, data);
    }
});
