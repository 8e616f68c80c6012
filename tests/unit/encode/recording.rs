use std::path::Path;

use super::*;
use crate::audio::synth::AudioTrack;
use crate::config::CodecParams;
use crate::encode::encoder::{EncodeOptions, FrameFile};
use crate::encode::progress::{CancelToken, ProgressObserver};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::ErrorKind;

struct Fixture {
    _dir: tempfile::TempDir,
    frames: Vec<FrameFile>,
    audio: AudioTrack,
    out: PathBuf,
    opts: EncodeOptions,
}

fn fixture(n: u64) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let frames = (0..n)
        .map(|i| {
            let path = dir.path().join(format!("f{i:05}.png"));
            std::fs::write(&path, b"png").unwrap();
            FrameFile {
                index: FrameIndex(i),
                path,
            }
        })
        .collect();
    let audio_path = dir.path().join("a.f32le");
    std::fs::write(&audio_path, [0u8; 8]).unwrap();
    Fixture {
        frames,
        audio: AudioTrack {
            path: audio_path,
            duration_secs: 0.2,
            sample_rate: 44_100,
            channels: 2,
        },
        out: dir.path().join("out").join("v.mp4"),
        opts: EncodeOptions {
            fps: Fps::new(25).unwrap(),
            canvas: Canvas::PORTRAIT_HD,
            codec: CodecParams::default(),
            timeout: None,
        },
        _dir: dir,
    }
}

fn request<'a>(
    f: &'a Fixture,
    cancel: &'a CancelToken,
    observer: Option<&'a dyn ProgressObserver>,
) -> EncodeRequest<'a> {
    EncodeRequest {
        frames: &f.frames,
        audio: &f.audio,
        output: &f.out,
        options: &f.opts,
        observer,
        cancel,
    }
}

#[test]
fn records_frames_in_order_and_writes_manifest() {
    let f = fixture(5);
    let cancel = CancelToken::new();
    let seen = Mutex::new(Vec::new());
    let observer = |p: f64| seen.lock().unwrap().push(p);
    let enc = RecordingEncoder::new();

    let out = enc
        .encode(request(&f, &cancel, Some(&observer)))
        .unwrap();
    assert_eq!(out, f.out);

    let records = enc.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].frame_indices, vec![0, 1, 2, 3, 4]);
    assert_eq!(records[0].fps, 25);

    let manifest: EncodeRecord =
        serde_json::from_slice(&std::fs::read(Path::new(&f.out)).unwrap()).unwrap();
    assert_eq!(manifest, records[0]);

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 6);
    assert_eq!(*seen.last().unwrap(), 1.0);
}

#[test]
fn failing_encoder_leaves_partial_file_and_reports_encoding_error() {
    let f = fixture(2);
    let cancel = CancelToken::new();
    let err = RecordingEncoder::failing("boom")
        .encode(request(&f, &cancel, None))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);
    assert!(err.to_string().contains("boom"));
    assert!(f.out.exists());
}

#[test]
fn cancelling_encoder_trips_the_token() {
    let f = fixture(10);
    let cancel = CancelToken::new();
    let enc = RecordingEncoder::cancelling_at(4);
    let err = enc.encode(request(&f, &cancel, None)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(cancel.is_cancelled());
    assert!(enc.records().is_empty());
}

#[test]
fn missing_frame_file_fails() {
    let f = fixture(3);
    std::fs::remove_file(&f.frames[1].path).unwrap();
    let cancel = CancelToken::new();
    let err = RecordingEncoder::new()
        .encode(request(&f, &cancel, None))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);
}
