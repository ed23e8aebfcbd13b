//! Fuzz target: `decode_command`
//!
//! Any frame that decodes must re-encode to something that decodes to the
//! same command.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sensornode::protocol::codec::{decode_command, encode_command};

fuzz_target!(|data: &[u8]| {
    if let Ok(cmd) = decode_command(data) {
        let wire = encode_command(&cmd).expect("decoded command must encode");
        assert_eq!(decode_command(&wire), Ok(cmd));
    }
});
