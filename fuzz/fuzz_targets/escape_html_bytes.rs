#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > 64 * 1024 {
        &data[..64 * 1024]
    } else {
        data
    };

    let out = rez::escape_html_bytes(data);
    assert!(out.len() >= data.len());
    assert!(!out
        .iter()
        .any(|b| matches!(b, b'\0' | b'"' | b'\'' | b'<' | b'>')));

    // Every '&' left in the output opens one of the entities the escaper emits.
    for (idx, _) in out.iter().enumerate().filter(|(_, b)| **b == b'&') {
        let rest = &out[idx..];
        assert!(
            rest.starts_with(b"&amp;")
                || rest.starts_with(b"&lt;")
                || rest.starts_with(b"&gt;")
                || rest.starts_with(b"&#34;")
                || rest.starts_with(b"&#39;")
        );
    }
});
