#![cfg(unix)]

use avatar_voice::{
    AudioConverter, FfmpegConverter, RhubarbExtractor, TranscoderConfig, VisemeExtractor,
    VoiceError,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const MOUTH_CUES: &str = r#"{"metadata":{"soundFile":"message_0.wav","duration":0.47},"mouthCues":[{"start":0.00,"end":0.12,"value":"X"},{"start":0.12,"end":0.47,"value":"B"}]}"#;

/// Writes an executable shell script into `dir`.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

// ffmpeg is invoked as `ffmpeg -y -i <in> <out>`.
fn mock_ffmpeg(dir: &Path) -> PathBuf {
    write_script(dir, "ffmpeg", r#"cp "$3" "$4""#)
}

// rhubarb is invoked as `rhubarb -f json -o <out> <in> -r <recognizer>`.
fn mock_rhubarb(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "rhubarb",
        &format!(
            r#"test "$7" = "phonetic" || exit 3
cat <<'JSON' > "$4"
{}
JSON"#,
            MOUTH_CUES
        ),
    )
}

#[tokio::test]
async fn test_ffmpeg_writes_waveform_next_to_input() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ffmpeg = mock_ffmpeg(temp_dir.path());
    let audio = temp_dir.path().join("message_0.mp3");
    std::fs::write(&audio, b"ID3-mp3-bytes").unwrap();

    let converter = FfmpegConverter::new(&ffmpeg);
    let waveform = converter.convert(&audio).await.unwrap();

    assert_eq!(waveform, temp_dir.path().join("message_0.wav"));
    assert_eq!(std::fs::read(&waveform).unwrap(), b"ID3-mp3-bytes");
}

#[tokio::test]
async fn test_ffmpeg_failure_reports_stderr() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ffmpeg = write_script(
        temp_dir.path(),
        "ffmpeg",
        "echo 'Invalid data found when processing input' >&2\nexit 1",
    );
    let audio = temp_dir.path().join("message_0.mp3");
    std::fs::write(&audio, b"garbage").unwrap();

    let result = FfmpegConverter::new(&ffmpeg).convert(&audio).await;
    match result {
        Err(VoiceError::Transcode(msg)) => {
            assert!(msg.contains("ffmpeg failed"), "got: {}", msg);
            assert!(msg.contains("Invalid data found"), "got: {}", msg);
        }
        other => panic!("Expected Transcode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_binary_is_transcode_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let audio = temp_dir.path().join("message_0.mp3");
    std::fs::write(&audio, b"bytes").unwrap();

    let converter = FfmpegConverter::new(temp_dir.path().join("no-such-ffmpeg"));
    let result = converter.convert(&audio).await;
    match result {
        Err(VoiceError::Transcode(msg)) => assert!(msg.contains("Failed to spawn"), "got: {}", msg),
        other => panic!("Expected Transcode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rhubarb_track_is_parsed() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rhubarb = mock_rhubarb(temp_dir.path());
    let waveform = temp_dir.path().join("message_0.wav");
    std::fs::write(&waveform, b"RIFF").unwrap();

    let extractor = RhubarbExtractor::new(&rhubarb);
    let track = extractor.extract_visemes(&waveform).await.unwrap();

    assert_eq!(track.cue_count(), 2);
    assert_eq!(track.0["mouthCues"][1]["value"], "B");
    assert!(temp_dir.path().join("message_0.json").exists());
}

#[tokio::test]
async fn test_rhubarb_uses_configured_recognizer() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rhubarb = mock_rhubarb(temp_dir.path());
    let waveform = temp_dir.path().join("message_0.wav");
    std::fs::write(&waveform, b"RIFF").unwrap();

    let config = TranscoderConfig {
        rhubarb_binary: rhubarb.to_string_lossy().into_owned(),
        recognizer: "pocketSphinx".to_string(),
        ..TranscoderConfig::default()
    };

    // The mock only accepts the phonetic recognizer.
    let result = RhubarbExtractor::from_config(&config)
        .extract_visemes(&waveform)
        .await;
    assert!(matches!(result, Err(VoiceError::Transcode(_))));
}

#[tokio::test]
async fn test_rhubarb_corrupt_output_is_asset_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rhubarb = write_script(temp_dir.path(), "rhubarb", r#"printf 'not json' > "$4""#);
    let waveform = temp_dir.path().join("message_0.wav");
    std::fs::write(&waveform, b"RIFF").unwrap();

    let result = RhubarbExtractor::new(&rhubarb)
        .extract_visemes(&waveform)
        .await;
    match result {
        Err(VoiceError::AssetRead(msg)) => assert!(msg.contains("invalid viseme JSON"), "got: {}", msg),
        other => panic!("Expected AssetRead error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rhubarb_without_output_is_asset_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rhubarb = write_script(temp_dir.path(), "rhubarb", "exit 0");
    let waveform = temp_dir.path().join("message_0.wav");
    std::fs::write(&waveform, b"RIFF").unwrap();

    let result = RhubarbExtractor::new(&rhubarb)
        .extract_visemes(&waveform)
        .await;
    assert!(matches!(result, Err(VoiceError::AssetRead(_))));
}

#[tokio::test]
async fn test_hung_tool_times_out() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ffmpeg = write_script(temp_dir.path(), "ffmpeg", "sleep 5");
    let audio = temp_dir.path().join("message_0.mp3");
    std::fs::write(&audio, b"bytes").unwrap();

    let config = TranscoderConfig {
        ffmpeg_binary: ffmpeg.to_string_lossy().into_owned(),
        timeout_secs: 1,
        ..TranscoderConfig::default()
    };
    let result = FfmpegConverter::from_config(&config).convert(&audio).await;
    match result {
        Err(VoiceError::Transcode(msg)) => assert!(msg.contains("timed out"), "got: {}", msg),
        other => panic!("Expected timeout, got {:?}", other),
    }
}

#[test]
fn test_transcoder_config_defaults_from_toml() {
    let config: TranscoderConfig = toml::from_str("rhubarb_binary = \"/opt/rhubarb/rhubarb\"").unwrap();
    assert_eq!(config.ffmpeg_binary, "ffmpeg");
    assert_eq!(config.rhubarb_binary, "/opt/rhubarb/rhubarb");
    assert_eq!(config.recognizer, "phonetic");
    assert_eq!(config.timeout_secs, 60);
}
