#![no_main]
use bytejar::codec::{FrameOptions, framed};
use bytejar::cursor::ByteCursor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes to the framed reader. It must never panic and
    // never allocate a payload larger than the input can back.
    let mut source = ByteCursor::new(data);
    let _: Result<Vec<Vec<u8>>, _> =
        framed::read_all(&mut source, &FrameOptions::default(), |out, cur| {
            out.push(cur.remaining_slice().to_vec());
            cur.advance(cur.remaining())
        });

    // Also exercise the version-tagged path.
    let mut source = ByteCursor::new(data);
    let _: Result<Vec<Vec<u8>>, _> =
        framed::read_all(&mut source, &FrameOptions::versioned(1), |out, cur| {
            out.push(cur.remaining_slice().to_vec());
            cur.advance(cur.remaining())
        });
});
