// End-to-end persistence tests across all three codecs and all three sink
// kinds (file, stream, in-memory buffer).
//
// These tests verify:
//   - Roundtrips for flat, mixed-layout, and framed encodings
//   - Version tagging: exact-match acceptance, mismatch rejection, retry
//   - Truncation behavior at element boundaries and inside records
//   - The explicit read-old / translate / write-new migration chain

use bytejar::codec::{CodecError, FrameOptions, flat, framed, mixed};
use bytejar::cursor::ByteCursor;
use bytejar::io::{
    read_flat_file, read_framed_file, read_mixed_file_with, write_flat_file, write_framed_file,
    write_mixed_file,
};
use bytejar::sink::{ByteSink, StreamSink, StreamSource};
use bytejar::{Pod, Zeroable};

// ===========================================================================
// Fixtures
// ===========================================================================

/// Pure-value record, persisted through the flat codec.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct NoteSpan {
    low: u32,
    high: u32,
    start: f64,
    length: f64,
}

fn note_spans() -> Vec<NoteSpan> {
    vec![
        NoteSpan { low: 36, high: 48, start: 0.0, length: 1.5 },
        NoteSpan { low: 60, high: 72, start: 1.5, length: 0.25 },
        NoteSpan { low: 0, high: 127, start: 2.0, length: 8.0 },
    ]
}

/// Partially-owning record: `name` cannot survive a raw copy.
#[derive(Debug, Clone, PartialEq)]
struct Patch {
    program: u32,
    level: f32,
    name: String,
}

const PATCH_WIDTH: usize = size_of::<u32>() + size_of::<f32>();

fn patches() -> Vec<Patch> {
    vec![
        Patch { program: 3, level: 0.8, name: "patch-3".into() },
        Patch { program: 17, level: -0.5, name: "patch-17".into() },
    ]
}

fn emit_patch(p: &Patch, cur: &mut ByteCursor<&mut [u8]>) -> bool {
    cur.write_pod(&p.program) && cur.write_pod(&p.level)
}

fn merge_patch(p: &mut Patch, cur: &mut ByteCursor<&[u8]>) -> bool {
    let Some(program) = cur.read_pod::<u32>() else {
        return false;
    };
    let Some(level) = cur.read_pod::<f32>() else {
        return false;
    };
    p.program = program;
    p.level = level;
    p.name = format!("patch-{program}");
    true
}

fn frame_string_size(s: &String) -> usize {
    s.len()
}

fn insert_string(out: &mut Vec<String>, cur: &mut ByteCursor<Vec<u8>>) -> bool {
    let text = String::from_utf8_lossy(cur.remaining_slice()).into_owned();
    if !cur.advance(cur.remaining()) {
        return false;
    }
    out.push(text);
    true
}

// ===========================================================================
// Flat codec
// ===========================================================================

#[test]
fn flat_file_roundtrip_struct_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spans.bin");
    let spans = note_spans();

    write_flat_file(&path, &spans).unwrap();
    let decoded: Vec<NoteSpan> = read_flat_file(&path).unwrap();
    assert_eq!(decoded, spans);
}

#[test]
fn flat_scenario_four_u64_into_32_bytes() {
    let values = [1u64, 2, 4, 8];
    let mut buffer = ByteCursor::with_len(32);
    flat::write_all(&mut buffer, &values).unwrap();
    assert_eq!(buffer.position(), Some(32));

    buffer.reset();
    let decoded: Vec<u64> = flat::read_all(&mut buffer).unwrap();
    assert_eq!(decoded, [1, 2, 4, 8]);
}

#[test]
fn flat_truncated_file_keeps_whole_elements_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.bin");
    let spans = note_spans();
    write_flat_file(&path, &spans).unwrap();

    // Chop the file mid-way through the last record.
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

    let decoded: Vec<NoteSpan> = read_flat_file(&path).unwrap();
    assert_eq!(decoded, spans[..2]);
}

#[test]
fn flat_large_random_roundtrip() {
    use rand::{Rng, SeedableRng};

    let mut rng = rand::rngs::StdRng::seed_from_u64(0xB17E);
    let values: Vec<u64> = (0..10_000).map(|_| rng.random()).collect();

    let mut buffer = ByteCursor::with_len(values.len() * 8);
    flat::write_all(&mut buffer, &values).unwrap();
    buffer.reset();
    let decoded: Vec<u64> = flat::read_all(&mut buffer).unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn flat_stream_roundtrip() {
    let mut sink = StreamSink::new(Vec::new());
    flat::write_all(&mut sink, &note_spans()).unwrap();
    let bytes = sink.into_inner();

    let mut source = StreamSource::new(std::io::Cursor::new(bytes));
    let decoded: Vec<NoteSpan> = flat::read_all(&mut source).unwrap();
    assert_eq!(decoded, note_spans());
}

// ===========================================================================
// Mixed-layout codec
// ===========================================================================

#[test]
fn mixed_roundtrip_rebuilds_owned_fields() {
    let elements = patches();
    let mut buffer = ByteCursor::with_len(PATCH_WIDTH * elements.len());
    mixed::write_all(&mut buffer, &elements, PATCH_WIDTH, emit_patch).unwrap();

    buffer.reset();
    let decoded: Vec<Patch> = mixed::read_all_with(
        &mut buffer,
        PATCH_WIDTH,
        || Patch { program: 0, level: 0.0, name: String::new() },
        merge_patch,
    )
    .unwrap();
    assert_eq!(decoded, elements);
}

#[test]
fn mixed_file_roundtrip_with_factory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patches.bin");
    let elements = patches();

    write_mixed_file(&path, &elements, PATCH_WIDTH, emit_patch).unwrap();
    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        (PATCH_WIDTH * elements.len()) as u64
    );

    let decoded: Vec<Patch> = read_mixed_file_with(
        &path,
        PATCH_WIDTH,
        || Patch { program: 0, level: 0.0, name: String::new() },
        merge_patch,
    )
    .unwrap();
    assert_eq!(decoded, elements);
}

#[test]
fn mixed_flat_regions_are_source_bytes_owned_fields_are_rebuilt() {
    let elements = patches();
    let mut buffer = ByteCursor::with_len(PATCH_WIDTH * elements.len());
    mixed::write_all(&mut buffer, &elements, PATCH_WIDTH, emit_patch).unwrap();

    // Flat regions on the wire are exactly the source values' images.
    let bytes = buffer.as_slice().to_vec();
    assert_eq!(&bytes[..4], &3u32.to_ne_bytes());
    assert_eq!(&bytes[4..8], &0.8f32.to_ne_bytes());

    // Owned fields come back as whatever the merge callback constructs,
    // regardless of the wire.
    let mut source = ByteCursor::new(&bytes[..]);
    let decoded: Vec<Patch> = mixed::read_all_with(
        &mut source,
        PATCH_WIDTH,
        || Patch { program: 0, level: 0.0, name: "placeholder".into() },
        |p, cur| {
            let Some(program) = cur.read_pod::<u32>() else {
                return false;
            };
            p.program = program;
            if !cur.advance(size_of::<f32>()) {
                return false;
            }
            // Leave `level` and `name` as constructed.
            true
        },
    )
    .unwrap();
    assert_eq!(decoded[0].program, 3);
    assert_eq!(decoded[0].level, 0.0);
    assert_eq!(decoded[0].name, "placeholder");
}

// ===========================================================================
// Framed codec
// ===========================================================================

#[test]
fn framed_scenario_two_strings_version_one() {
    let elements: Vec<String> = vec!["ab".into(), "cde".into()];
    let mut buffer = framed::encode_to_buffer(
        &elements,
        &FrameOptions::versioned(1),
        frame_string_size,
        |sink, s, _| sink.write_bytes(s.as_bytes()),
    )
    .unwrap();

    // [1][2][2]"ab"[3]"cde" in 8-byte words.
    assert_eq!(buffer.len(), 8 * 4 + 5);

    let decoded: Vec<String> =
        framed::read_all(&mut buffer, &FrameOptions::versioned(1), insert_string).unwrap();
    assert_eq!(decoded, elements);

    buffer.reset();
    let mismatched: Result<Vec<String>, _> =
        framed::read_all(&mut buffer, &FrameOptions::versioned(2), insert_string);
    match mismatched {
        Err(CodecError::VersionMismatch { expected: 2, found: 1 }) => {}
        other => panic!("expected version mismatch, got {other:?}"),
    }
}

#[test]
fn framed_file_roundtrip_nested_payload() {
    // Variable-length element: a name plus a list of values.
    #[derive(Debug, Clone, PartialEq)]
    struct Track {
        name: String,
        markers: Vec<u64>,
    }

    let tracks = vec![
        Track { name: "lead".into(), markers: vec![0, 960, 1920] },
        Track { name: "bass".into(), markers: vec![] },
    ];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracks.bin");

    write_framed_file(
        &path,
        &tracks,
        &FrameOptions::versioned(5),
        |t| 8 + t.name.len() + 8 + t.markers.len() * 8,
        |sink, t, _| {
            sink.write_bytes(&(t.name.len() as u64).to_ne_bytes())?;
            sink.write_bytes(t.name.as_bytes())?;
            sink.write_bytes(&(t.markers.len() as u64).to_ne_bytes())?;
            flat::write_all(sink, &t.markers).map_err(std::io::Error::other)
        },
    )
    .unwrap();

    let decoded: Vec<Track> = read_framed_file(&path, &FrameOptions::versioned(5), |out: &mut Vec<Track>, cur| {
        let Some(name_len) = cur.read_pod::<u64>() else {
            return false;
        };
        let Some(name) = cur
            .read_slice(name_len as usize)
            .map(|b| String::from_utf8_lossy(b).into_owned())
        else {
            return false;
        };
        let Some(marker_count) = cur.read_pod::<u64>() else {
            return false;
        };
        let mut markers = Vec::with_capacity(marker_count as usize);
        for _ in 0..marker_count {
            let Some(marker) = cur.read_pod::<u64>() else {
                return false;
            };
            markers.push(marker);
        }
        out.push(Track { name, markers });
        true
    })
    .unwrap();
    assert_eq!(decoded, tracks);
}

#[test]
fn framed_stream_roundtrip() {
    let elements: Vec<String> = vec!["over".into(), "a".into(), "stream".into()];
    let mut sink = StreamSink::new(Vec::new());
    framed::write_all(
        &mut sink,
        &elements,
        &FrameOptions::versioned(9),
        frame_string_size,
        |sink, s, _| sink.write_bytes(s.as_bytes()),
    )
    .unwrap();
    let bytes = sink.into_inner();

    let mut source = StreamSource::new(std::io::Cursor::new(bytes));
    let decoded: Vec<String> =
        framed::read_all(&mut source, &FrameOptions::versioned(9), insert_string).unwrap();
    assert_eq!(decoded, elements);
}

#[test]
fn framed_truncated_mid_element_aborts() {
    let elements: Vec<String> = vec!["complete".into(), "partial".into()];
    let buffer = framed::encode_to_buffer(
        &elements,
        &FrameOptions::versioned(1),
        frame_string_size,
        |sink, s, _| sink.write_bytes(s.as_bytes()),
    )
    .unwrap();

    // Drop the last three payload bytes of the second element.
    let bytes = buffer.into_vec();
    let mut source = ByteCursor::new(&bytes[..bytes.len() - 3]);
    let result: Result<Vec<String>, _> =
        framed::read_all(&mut source, &FrameOptions::versioned(1), insert_string);
    assert!(matches!(result, Err(CodecError::Truncated { expected: 7 })));
}

// ===========================================================================
// Schema migration: read old, translate, write new
// ===========================================================================

/// Version 1 on-disk shape: `[program: u32][name bytes]`.
/// Version 2 adds a gain field: `[program: u32][gain: f32][name bytes]`.
#[derive(Debug, Clone, PartialEq)]
struct PresetV2 {
    program: u32,
    gain: f32,
    name: String,
}

fn write_presets_v1(path: &std::path::Path, presets: &[(u32, String)]) {
    write_framed_file(
        path,
        presets,
        &FrameOptions::versioned(1),
        |(_, name)| 4 + name.len(),
        |sink, (program, name), _| {
            sink.write_bytes(&program.to_ne_bytes())?;
            sink.write_bytes(name.as_bytes())
        },
    )
    .unwrap();
}

fn read_presets_v1_as_v2(path: &std::path::Path) -> Result<Vec<PresetV2>, CodecError> {
    read_framed_file(path, &FrameOptions::versioned(1), |out: &mut Vec<PresetV2>, cur| {
        let Some(program) = cur.read_pod::<u32>() else {
            return false;
        };
        let name = String::from_utf8_lossy(cur.remaining_slice()).into_owned();
        if !cur.advance(cur.remaining()) {
            return false;
        }
        // Translate: the v1 record had no gain; pick the new default.
        out.push(PresetV2 { program, gain: 1.0, name });
        true
    })
}

fn write_presets_v2(path: &std::path::Path, presets: &[PresetV2]) {
    write_framed_file(
        path,
        presets,
        &FrameOptions::versioned(2),
        |p| 4 + 4 + p.name.len(),
        |sink, p, _| {
            sink.write_bytes(&p.program.to_ne_bytes())?;
            sink.write_bytes(&p.gain.to_ne_bytes())?;
            sink.write_bytes(p.name.as_bytes())
        },
    )
    .unwrap();
}

fn read_presets_v2(path: &std::path::Path) -> Result<Vec<PresetV2>, CodecError> {
    read_framed_file(path, &FrameOptions::versioned(2), |out: &mut Vec<PresetV2>, cur| {
        let Some(program) = cur.read_pod::<u32>() else {
            return false;
        };
        let Some(gain) = cur.read_pod::<f32>() else {
            return false;
        };
        let name = String::from_utf8_lossy(cur.remaining_slice()).into_owned();
        if !cur.advance(cur.remaining()) {
            return false;
        }
        out.push(PresetV2 { program, gain, name });
        true
    })
}

#[test]
fn migration_chain_v1_to_v2() {
    let dir = tempfile::tempdir().unwrap();
    let v1_path = dir.path().join("presets_v1.bin");
    let v2_path = dir.path().join("presets_v2.bin");

    let originals = vec![(1u32, "init".to_string()), (2, "warm pad".to_string())];
    write_presets_v1(&v1_path, &originals);

    // A v2 reader must refuse the v1 file outright.
    assert!(matches!(
        read_presets_v2(&v1_path),
        Err(CodecError::VersionMismatch { expected: 2, found: 1 })
    ));

    // Explicit chain: read under v1, translate, rewrite under v2.
    let translated = read_presets_v1_as_v2(&v1_path).unwrap();
    write_presets_v2(&v2_path, &translated);

    let reloaded = read_presets_v2(&v2_path).unwrap();
    assert_eq!(reloaded, translated);
    assert_eq!(reloaded[1].program, 2);
    assert_eq!(reloaded[1].gain, 1.0);
    assert_eq!(reloaded[1].name, "warm pad");

    // And the v1 reader now refuses the migrated file.
    assert!(matches!(
        read_presets_v1_as_v2(&v2_path),
        Err(CodecError::VersionMismatch { expected: 1, found: 2 })
    ));
}
