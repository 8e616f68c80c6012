use super::*;
use crate::foundation::error::ErrorKind;

fn all_checks() -> ReadyChecks {
    ReadyChecks {
        frames: 300,
        audio: true,
        encoded: true,
    }
}

fn at_encoding() -> RunStateMachine {
    let mut m = RunStateMachine::new();
    m.advance(PipelineState::RenderingFrames).unwrap();
    m.advance(PipelineState::SynthesizingAudio).unwrap();
    m.advance(PipelineState::Encoding).unwrap();
    m
}

#[test]
fn happy_path_visits_every_stage() {
    let mut m = at_encoding();
    m.finish(all_checks()).unwrap();
    assert_eq!(m.state(), PipelineState::Ready);
    assert_eq!(
        m.history(),
        &[
            PipelineState::Initializing,
            PipelineState::RenderingFrames,
            PipelineState::SynthesizingAudio,
            PipelineState::Encoding,
            PipelineState::Ready,
        ]
    );
}

#[test]
fn stages_cannot_be_skipped_or_repeated() {
    let mut m = RunStateMachine::new();
    assert!(m.advance(PipelineState::Encoding).is_err());
    assert!(m.advance(PipelineState::Initializing).is_err());
    assert!(m.advance(PipelineState::Ready).is_err());
    let err = m.advance(PipelineState::Failed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(m.state(), PipelineState::Initializing);
}

#[test]
fn ready_requires_frames_audio_and_encode() {
    for checks in [
        ReadyChecks {
            frames: 0,
            ..all_checks()
        },
        ReadyChecks {
            audio: false,
            ..all_checks()
        },
        ReadyChecks {
            encoded: false,
            ..all_checks()
        },
    ] {
        let mut m = at_encoding();
        assert!(m.finish(checks).is_err());
        assert_eq!(m.state(), PipelineState::Encoding);
    }
    assert!(RunStateMachine::new().finish(all_checks()).is_err());
}

#[test]
fn any_stage_can_fail_and_terminal_states_stick() {
    let mut m = RunStateMachine::new();
    m.advance(PipelineState::RenderingFrames).unwrap();
    m.fail();
    assert_eq!(m.state(), PipelineState::Failed);
    assert!(m.state().is_terminal());
    m.fail();
    assert!(m.advance(PipelineState::SynthesizingAudio).is_err());
    assert_eq!(m.history().len(), 3);

    let mut done = at_encoding();
    done.finish(all_checks()).unwrap();
    done.fail();
    assert_eq!(done.state(), PipelineState::Ready);
}

#[test]
fn states_display_in_snake_case() {
    assert_eq!(PipelineState::RenderingFrames.to_string(), "rendering_frames");
    assert_eq!(
        serde_json::to_value(PipelineState::SynthesizingAudio).unwrap(),
        "synthesizing_audio"
    );
}
