//! MKVToolNix + FFmpeg implementation of [`MediaToolkit`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::config::ToolkitConfig;
use super::error::ToolError;
use super::traits::MediaToolkit;
use super::types::{ExtractRequest, ExtractTarget, Tool, TransformJob};
use crate::remux::RemuxSpec;

/// Captured result of one finished invocation.
#[derive(Debug)]
struct Finished {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Finished {
    /// MKVToolNix reports errors on stdout, ffmpeg on stderr.
    fn diagnostic(&self) -> String {
        let stderr = String::from_utf8_lossy(&self.stderr);
        if stderr.trim().is_empty() {
            String::from_utf8_lossy(&self.stdout).trim_end().to_string()
        } else {
            stderr.trim_end().to_string()
        }
    }
}

/// Toolkit backed by `mkvmerge`, `mkvextract` and `ffmpeg` processes.
pub struct MkvToolnixToolkit {
    config: ToolkitConfig,
}

impl MkvToolnixToolkit {
    /// Creates a new toolkit with the given configuration.
    pub fn new(config: ToolkitConfig) -> Self {
        Self { config }
    }

    /// Creates a new toolkit resolving every tool through `PATH`.
    pub fn with_defaults() -> Self {
        Self::new(ToolkitConfig::default())
    }

    /// `mkvextract <source> tracks id:path...`
    fn build_mkvextract_args(source: &Path, targets: &[ExtractTarget]) -> Vec<String> {
        let mut args = vec![source.to_string_lossy().to_string(), "tracks".to_string()];
        for target in targets {
            args.push(format!("{}:{}", target.track_id, target.output.display()));
        }
        args
    }

    fn ffmpeg_prelude(&self, input: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-nostats".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
        ]
    }

    /// Pulls one audio stream out of a container mkvextract can't read.
    fn build_ffmpeg_extract_args(&self, source: &Path, target: &ExtractTarget) -> Vec<String> {
        let mut args = self.ffmpeg_prelude(source);
        args.extend([
            "-map".to_string(),
            format!("0:a:{}", target.audio_index),
            "-vn".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            target.output.to_string_lossy().to_string(),
        ]);
        args
    }

    fn build_transform_args(&self, job: &TransformJob) -> Vec<String> {
        let mut args = self.ffmpeg_prelude(&job.input);
        args.extend([
            "-ac".to_string(),
            job.channels.to_string(),
            job.output.to_string_lossy().to_string(),
        ]);
        args
    }

    /// Spawns `tool`, waits for it under the configured timeout and maps
    /// the outcome onto [`ToolError`].
    async fn run(&self, tool: Tool, args: &[String]) -> Result<Finished, ToolError> {
        let program = self.config.path_for(tool);
        debug!(tool = tool.name(), args = ?args, "Running external tool");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::NotFound {
                        tool: tool.name().to_string(),
                        path: program.to_path_buf(),
                    }
                } else {
                    ToolError::Io(e)
                }
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let wait = async {
            let (stdout, stderr) = tokio::join!(read_pipe(stdout), read_pipe(stderr));
            let status = child.wait().await?;
            Ok::<Finished, std::io::Error>(Finished {
                status,
                stdout: stdout?,
                stderr: stderr?,
            })
        };

        let waited = match self.config.timeout() {
            Some(limit) => timeout(limit, wait).await.ok(),
            None => Some(wait.await),
        };

        let finished = match waited {
            Some(result) => result?,
            None => {
                let _ = child.kill().await;
                return Err(ToolError::Timeout {
                    tool: tool.name().to_string(),
                    timeout_secs: self.config.timeout_secs.unwrap_or_default(),
                });
            }
        };

        let code = finished.status.code();
        if finished.status.success() {
            Ok(finished)
        } else if tool.exit_code_is_warning(code) {
            warn!(tool = tool.name(), warnings = %finished.diagnostic(), "Tool finished with warnings");
            Ok(finished)
        } else {
            Err(ToolError::invocation_failed(
                tool.name(),
                code,
                finished.diagnostic(),
            ))
        }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn ensure_output(tool: Tool, path: &Path) -> Result<(), ToolError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(ToolError::OutputMissing {
            tool: tool.name().to_string(),
            path: PathBuf::from(path),
        }),
    }
}

#[async_trait]
impl MediaToolkit for MkvToolnixToolkit {
    fn name(&self) -> &str {
        "mkvtoolnix"
    }

    async fn validate(&self) -> Result<(), ToolError> {
        for tool in Tool::ALL {
            let finished = self.run(tool, &[tool.version_flag().to_string()]).await?;
            let banner = String::from_utf8_lossy(&finished.stdout);
            debug!(
                tool = tool.name(),
                version = banner.lines().next().unwrap_or_default(),
                "Tool available"
            );
        }
        Ok(())
    }

    async fn identify(&self, input: &Path) -> Result<String, ToolError> {
        let args = vec!["-J".to_string(), input.to_string_lossy().to_string()];
        let finished = self.run(Tool::Mkvmerge, &args).await?;
        Ok(String::from_utf8_lossy(&finished.stdout).into_owned())
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<(), ToolError> {
        if request.targets.is_empty() {
            return Ok(());
        }

        let tool = if request.source_is_matroska {
            let args = Self::build_mkvextract_args(&request.source, &request.targets);
            self.run(Tool::Mkvextract, &args).await?;
            Tool::Mkvextract
        } else {
            for target in &request.targets {
                let args = self.build_ffmpeg_extract_args(&request.source, target);
                self.run(Tool::Ffmpeg, &args).await?;
            }
            Tool::Ffmpeg
        };

        for target in &request.targets {
            ensure_output(tool, &target.output).await?;
        }

        info!(
            source = %request.source.display(),
            tracks = request.targets.len(),
            tool = tool.name(),
            "Extracted tracks"
        );
        Ok(())
    }

    async fn transform(&self, job: &TransformJob) -> Result<(), ToolError> {
        let args = self.build_transform_args(job);
        self.run(Tool::Ffmpeg, &args).await?;
        ensure_output(Tool::Ffmpeg, &job.output).await?;
        debug!(track_id = job.track_id, output = %job.output.display(), "Transformed track");
        Ok(())
    }

    async fn remux(&self, spec: &RemuxSpec) -> Result<(), ToolError> {
        self.run(Tool::Mkvmerge, &spec.to_args()).await?;
        ensure_output(Tool::Mkvmerge, &spec.output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u32, path: &str) -> ExtractTarget {
        ExtractTarget {
            track_id: id,
            audio_index: 0,
            output: PathBuf::from(path),
        }
    }

    #[test]
    fn test_build_mkvextract_args() {
        let args = MkvToolnixToolkit::build_mkvextract_args(
            Path::new("/media/movie.mkv"),
            &[target(1, "/tmp/ws/1.extract.ac3"), target(3, "/tmp/ws/3.extract.dts")],
        );
        assert_eq!(
            args,
            vec![
                "/media/movie.mkv",
                "tracks",
                "1:/tmp/ws/1.extract.ac3",
                "3:/tmp/ws/3.extract.dts",
            ]
        );
    }

    #[test]
    fn test_build_ffmpeg_extract_args() {
        let toolkit = MkvToolnixToolkit::with_defaults();
        let second_audio = ExtractTarget {
            track_id: 4,
            audio_index: 1,
            output: PathBuf::from("/tmp/ws/4.extract.aac"),
        };
        let args = toolkit.build_ffmpeg_extract_args(Path::new("/media/clip.mp4"), &second_audio);

        assert_eq!(&args[..5], &["-y", "-hide_banner", "-nostats", "-loglevel", "error"]);
        assert!(args.windows(2).any(|w| w == ["-i", "/media/clip.mp4"]));
        // Mapped by audio position, not by container track id.
        assert!(args.windows(2).any(|w| w == ["-map", "0:a:1"]));
        assert!(args.contains(&"-vn".to_string()));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/ws/4.extract.aac"));
    }

    #[test]
    fn test_build_transform_args() {
        let mut config = ToolkitConfig::default();
        config.ffmpeg_log_level = "quiet".to_string();
        let toolkit = MkvToolnixToolkit::new(config);

        let args = toolkit.build_transform_args(&TransformJob {
            track_id: 3,
            input: PathBuf::from("/tmp/ws/3.extract.ac3"),
            output: PathBuf::from("/tmp/ws/3.transform.aac"),
            channels: 2,
        });

        assert!(args.windows(2).any(|w| w == ["-loglevel", "quiet"]));
        assert!(args.windows(2).any(|w| w == ["-i", "/tmp/ws/3.extract.ac3"]));
        assert!(args.windows(2).any(|w| w == ["-ac", "2"]));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/ws/3.transform.aac"));
    }

    #[tokio::test]
    async fn test_missing_executable_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = MkvToolnixToolkit::new(ToolkitConfig::default().with_bin_dir(dir.path()));

        let err = toolkit.validate().await.unwrap_err();
        match err {
            ToolError::NotFound { tool, path } => {
                assert_eq!(tool, "mkvmerge");
                assert_eq!(path, dir.path().join("mkvmerge"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_extract_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = MkvToolnixToolkit::new(ToolkitConfig::default().with_bin_dir(dir.path()));
        let request = ExtractRequest {
            source: PathBuf::from("/media/movie.mkv"),
            source_is_matroska: true,
            targets: Vec::new(),
        };
        assert!(toolkit.extract(&request).await.is_ok());
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Installs a shell script named `name` into `dir`.
        fn install(dir: &Path, name: &str, body: &str) {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        #[tokio::test]
        async fn test_identify_returns_stdout() {
            let dir = tempfile::tempdir().unwrap();
            install(dir.path(), "mkvmerge", r#"echo '{"tracks":[]}'"#);
            let toolkit = MkvToolnixToolkit::new(ToolkitConfig::default().with_bin_dir(dir.path()));

            let doc = toolkit.identify(Path::new("/media/movie.mkv")).await.unwrap();
            assert_eq!(doc.trim(), r#"{"tracks":[]}"#);
        }

        #[tokio::test]
        async fn test_failure_keeps_stderr_verbatim() {
            let dir = tempfile::tempdir().unwrap();
            install(
                dir.path(),
                "ffmpeg",
                "echo 'in.ac3: Invalid data found when processing input' >&2; exit 1",
            );
            let toolkit = MkvToolnixToolkit::new(ToolkitConfig::default().with_bin_dir(dir.path()));

            let err = toolkit
                .transform(&TransformJob {
                    track_id: 1,
                    input: dir.path().join("in.ac3"),
                    output: dir.path().join("out.aac"),
                    channels: 2,
                })
                .await
                .unwrap_err();

            match err {
                ToolError::InvocationFailed {
                    tool,
                    status,
                    diagnostic,
                } => {
                    assert_eq!(tool, "ffmpeg");
                    assert_eq!(status, Some(1));
                    assert_eq!(diagnostic, "in.ac3: Invalid data found when processing input");
                }
                other => panic!("expected InvocationFailed, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_mkvtoolnix_warning_exit_is_success() {
            let dir = tempfile::tempdir().unwrap();
            install(dir.path(), "mkvmerge", "echo 'Warning: odd header'; exit 1");
            let toolkit = MkvToolnixToolkit::new(ToolkitConfig::default().with_bin_dir(dir.path()));

            assert!(toolkit.identify(Path::new("/media/movie.mkv")).await.is_ok());
        }

        #[tokio::test]
        async fn test_success_without_output_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            install(dir.path(), "ffmpeg", "exit 0");
            let toolkit = MkvToolnixToolkit::new(ToolkitConfig::default().with_bin_dir(dir.path()));

            let err = toolkit
                .transform(&TransformJob {
                    track_id: 2,
                    input: dir.path().join("2.extract.ac3"),
                    output: dir.path().join("2.transform.aac"),
                    channels: 2,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::OutputMissing { .. }));
        }

        #[tokio::test]
        async fn test_timeout_kills_tool() {
            let dir = tempfile::tempdir().unwrap();
            install(dir.path(), "mkvmerge", "exec sleep 5");
            let toolkit = MkvToolnixToolkit::new(
                ToolkitConfig::default().with_bin_dir(dir.path()).with_timeout(1),
            );

            let err = toolkit.identify(Path::new("/media/movie.mkv")).await.unwrap_err();
            assert!(matches!(
                err,
                ToolError::Timeout { ref tool, timeout_secs: 1 } if tool == "mkvmerge"
            ));
        }
    }
}
