use super::*;
use crate::foundation::error::ErrorKind;
use crate::narration::script::NarrationTemplate;

fn script() -> NarrationScript {
    NarrationScript {
        template: NarrationTemplate::Discovery,
        text: "Descubra algo!".to_string(),
    }
}

#[test]
fn writes_silence_of_requested_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("run_narration.f32le");
    let track = SilentSynthesizer::new(1_000, 2)
        .synthesize(&script(), 1.5, &path)
        .unwrap();

    assert_eq!(track.path, path);
    assert_eq!(track.duration_secs, 1.5);
    assert_eq!((track.sample_rate, track.channels), (1_000, 2));

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 1_500 * 2 * 4);
    assert!(bytes.iter().all(|b| *b == 0));
}

#[test]
fn default_is_stereo_44k() {
    let s = SilentSynthesizer::default();
    assert_eq!((s.sample_rate, s.channels), (44_100, 2));
}

#[test]
fn non_positive_duration_is_a_synthesis_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.f32le");
    let s = SilentSynthesizer::default();
    for d in [0.0, -3.0, f64::NAN] {
        let err = s.synthesize(&script(), d, &path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Synthesis);
    }
    assert!(!path.exists());
}

#[test]
fn track_must_cover_the_frames() {
    let fps = Fps::new(30).unwrap();
    let track = AudioTrack {
        path: PathBuf::from("x"),
        duration_secs: 10.0,
        sample_rate: 44_100,
        channels: 2,
    };
    assert!(track.check_covers(300, fps).is_ok());
    assert!(track.check_covers(301, fps).is_ok());
    let err = track.check_covers(330, fps).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Synthesis);
}
