#![no_main]

use libfuzzer_sys::fuzz_target;
use knx_dpt::{Catalog, Decoder};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(catalog) = Catalog::from_json_str(text) else {
        return;
    };

    // Whatever layout a catalog declares, decoding must not panic
    let keys: Vec<String> = catalog.iter().map(|(key, _)| key.to_string()).collect();
    let decoder = Decoder::new(catalog);
    for key in keys {
        for len in [0usize, 1, 2, 4, 14] {
            let _ = decoder.convenience_decode(&vec![0xA5; len], key.as_str(), None);
        }
    }
});
