#![no_main]

use libfuzzer_sys::fuzz_target;
use knx_dpt::{Catalog, Decoder};

const CATALOG: &str = include_str!("../../tests/fixtures/knx_master_subset.json");

fuzz_target!(|data: &[u8]| {
    let Ok(catalog) = Catalog::from_json_str(CATALOG) else {
        return;
    };
    let decoder = Decoder::new(catalog);

    // First byte picks the type, the rest is the payload
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let ids: Vec<String> = decoder
        .catalog()
        .iter()
        .flat_map(|(key, main)| {
            std::iter::once(key.to_string())
                .chain(main.subtypes.iter().flat_map(|subs| subs.keys().cloned()))
        })
        .collect();
    let id = &ids[selector as usize % ids.len()];

    let _ = decoder.convenience_decode(payload, id.as_str(), Some("de-DE"));
    let _ = decoder.decode(payload, id.as_str());

    // Arbitrary identifier text against a fixed payload
    if let Ok(text) = std::str::from_utf8(payload) {
        let _ = decoder.convenience_decode(&[0x19, 0x02, 0x11], text, None);
    }
});
