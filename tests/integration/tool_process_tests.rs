/*!
 * Integration tests running real subprocesses
 *
 * Small shell scripts stand in for the metadata tool, so these only run on
 * Unix.
 */

#![cfg(unix)]

use std::path::PathBuf;
use std::time::{Duration, Instant};
use anyhow::Result;

use exifsrt::app_config::Config;
use exifsrt::app_controller::Controller;
use exifsrt::errors::ConversionError;
use exifsrt::exiftool::{self, ExifTool, MetadataExtractor};
use crate::common;

const SUMMARY_SCRIPT: &str = "printf 'CreateDate: 2023:05:01 10:00:00\\nDuration: 00:00:05\\n'";

// Fails for files whose name starts with "bad"
const SELECTIVE_SCRIPT: &str = r#"for last; do :; done
case "$(basename "$last")" in
  bad*) echo "Error: corrupt file" >&2; exit 1;;
esac
printf 'CreateDate: 2023:05:01 10:00:00\nDuration: 00:00:05\n'"#;

/// Test that stdout of a successful run is returned and parsed
#[tokio::test]
async fn test_extract_metadata_withWorkingTool_shouldParseOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tool = common::create_tool_script(temp_dir.path(), "exiftool", SUMMARY_SCRIPT)?;
    let video = common::create_test_file(temp_dir.path(), "clip.MTS", "")?;

    let record = exiftool::extract_metadata(&ExifTool::new(tool), &video, &[]).await?;

    assert_eq!(record.get("CreateDate"), Some("2023:05:01 10:00:00"));
    Ok(())
}

/// Test the arguments handed to the tool
#[tokio::test]
async fn test_extract_raw_withCharset_shouldPassArguments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tool = common::create_tool_script(temp_dir.path(), "exiftool", r#"echo "Args: $*""#)?;
    let video = common::create_test_file(temp_dir.path(), "clip.MTS", "")?;

    let runner = ExifTool::new(tool).with_filename_charset("cp1251".to_string());
    let output = runner.extract_raw(&video).await?;

    assert_eq!(output.trim(), format!("Args: -s -G -m -ee -charset filename=cp1251 {}", video.display()));
    Ok(())
}

/// Test that a non-zero exit becomes a tool failure with stderr
#[tokio::test]
async fn test_extract_raw_withFailingTool_shouldReturnFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tool = common::create_tool_script(temp_dir.path(), "exiftool", SELECTIVE_SCRIPT)?;
    let video = common::create_test_file(temp_dir.path(), "bad.MTS", "")?;

    match ExifTool::new(tool).extract_raw(&video).await {
        Err(ConversionError::ExternalToolFailure { status, stderr, .. }) => {
            assert_eq!(status, Some(1));
            assert_eq!(stderr, "Error: corrupt file");
        }
        other => panic!("expected tool failure, got {:?}", other),
    }
    Ok(())
}

/// Test missing tools, both as a path and as a bare command name
#[tokio::test]
async fn test_extract_raw_withMissingTool_shouldReturnNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_file(temp_dir.path(), "clip.MTS", "")?;

    let missing_path = ExifTool::new(temp_dir.path().join("no-such-tool"));
    assert!(matches!(
        missing_path.extract_raw(&video).await,
        Err(ConversionError::ExternalToolNotFound { .. })
    ));

    let missing_command = ExifTool::new(PathBuf::from("exifsrt-test-no-such-command"));
    assert!(matches!(
        missing_command.extract_raw(&video).await,
        Err(ConversionError::ExternalToolNotFound { .. })
    ));
    Ok(())
}

/// Test that a hanging tool is stopped by the timeout
#[tokio::test]
async fn test_extract_raw_withHangingTool_shouldTimeOut() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tool = common::create_tool_script(temp_dir.path(), "exiftool", "sleep 10")?;
    let video = common::create_test_file(temp_dir.path(), "clip.MTS", "")?;

    let started = Instant::now();
    let result = ExifTool::new(tool).with_timeout_secs(1).extract_raw(&video).await;

    assert!(matches!(result, Err(ConversionError::ExternalToolTimeout { secs: 1, .. })));
    assert!(started.elapsed() < Duration::from_secs(8));
    Ok(())
}

/// Test a mixed batch through the real subprocess path
#[tokio::test]
async fn test_run_folder_withRealToolAndMixedBatch_shouldConvertValidFile() -> Result<()> {
    common::init_logging();
    let tool_dir = common::create_temp_dir()?;
    let tool = common::create_tool_script(tool_dir.path(), "exiftool", SELECTIVE_SCRIPT)?;

    let video_dir = common::create_temp_dir()?;
    common::create_test_file(video_dir.path(), "bad.MTS", "")?;
    common::create_test_file(video_dir.path(), "good.MTS", "")?;

    let config = Config { tool_path: tool, show_progress: false, ..Config::default() };
    let controller = Controller::with_config(config)?;

    let summary = controller.run_folder(video_dir.path()).await?;

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
    assert!(video_dir.path().join("good.srt").exists());
    assert!(!video_dir.path().join("bad.srt").exists());
    Ok(())
}
