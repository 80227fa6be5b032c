#![no_main]

use std::collections::HashMap;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // Inference never fails; anything that parses must also infer
        // without panicking.
        if let Ok(mut ir) = garnet_frontend::parse(source, &[], &[]) {
            garnet_infer::Inferencer::new(HashMap::new(), HashMap::new()).infer(&mut ir);
        }
    }
});
