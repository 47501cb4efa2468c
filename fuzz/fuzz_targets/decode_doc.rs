#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > 64 * 1024 {
        &data[..64 * 1024]
    } else {
        data
    };

    let Ok(values) = rez::wire::decode_doc(data) else {
        return;
    };

    // Decoded documents re-encode and decode to the same shape.
    let encoded = rez::wire::encode_doc(&values).expect("encode decoded doc");
    let again = rez::wire::decode_doc(&encoded).expect("decode re-encoded doc");
    assert_eq!(again.len(), values.len());
    for value in &values {
        let _ = rez::concat::concat(&[value.clone()][..]);
        let _ = rez::escape_html(Some(value));
    }
});
