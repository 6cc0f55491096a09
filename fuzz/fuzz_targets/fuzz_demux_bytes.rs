#![no_main]

use std::ops::ControlFlow;

use libfuzzer_sys::fuzz_target;
use multipart_demux::{Constraints, Demuxer};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the chunk size, so splits vary along with contents.
    let chunk_size = data[0] as usize + 1;
    let data = &data[1..];

    let constraints = Constraints::new().allow_any_content_type();
    let mut demuxer = match Demuxer::with_constraints("multipart/x-mixed-replace; boundary=X-BOUNDARY", constraints) {
        Ok(demuxer) => demuxer,
        Err(_) => return,
    };

    let mut whole = Vec::new();
    let whole_res = Demuxer::with_constraints(
        "multipart/x-mixed-replace; boundary=X-BOUNDARY",
        Constraints::new().allow_any_content_type(),
    )
    .map(|mut d| d.feed(data, |part| {
        whole.push(part.to_bytes());
        ControlFlow::Continue(())
    }));

    let mut split = Vec::new();
    let mut failed = false;
    for chunk in data.chunks(chunk_size) {
        if demuxer.feed(chunk, |part| {
            split.push(part.to_bytes());
            ControlFlow::Continue(())
        }).is_err() {
            failed = true;
            break;
        }
    }

    assert_eq!(whole_res.map(|r| r.is_err()).unwrap_or(true), failed);
    assert_eq!(whole, split);
});
