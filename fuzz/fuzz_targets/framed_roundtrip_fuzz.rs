#![no_main]
use bytejar::codec::{FrameOptions, framed};
use bytejar::sink::ByteSink;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte controls the element split; the rest becomes payloads.
    let chunk = usize::from(data[0]).max(1);
    let payload = &data[1..];
    let elements: Vec<Vec<u8>> = payload.chunks(chunk).map(<[u8]>::to_vec).collect();

    let mut buffer = framed::encode_to_buffer(
        &elements,
        &FrameOptions::versioned(3),
        |e| e.len(),
        |sink, e, _| sink.write_bytes(e),
    )
    .unwrap();

    let decoded: Vec<Vec<u8>> =
        framed::read_all(&mut buffer, &FrameOptions::versioned(3), |out, cur| {
            out.push(cur.remaining_slice().to_vec());
            cur.advance(cur.remaining())
        })
        .unwrap();
    assert_eq!(decoded, elements);
});
