//! Render every keyframe of the active object from every angle.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use turntable_common::error::TurntableError;
use turntable_host_core::{MemoryHost, RecordingRenderer, StillRenderer};
use turntable_project_model::RunCheckpoint;
use turntable_render_engine::backend::CommandRenderer;
use turntable_render_engine::{RenderDriver, RunProgress, RunStage};

use super::{load_document, save_document};

/// Options gathered from the command line and app config.
#[derive(Debug, Default)]
pub struct RenderOptions {
    pub renderer: Option<String>,
    pub dry_run: bool,
    pub step_angle: Option<u32>,
    pub output: Option<String>,
    pub pixelate: bool,
    pub restore: bool,
    pub resume: bool,
    pub checkpoint: Option<PathBuf>,
    pub no_checkpoint: bool,
    pub save: bool,
}

pub async fn run(path: PathBuf, options: RenderOptions) -> anyhow::Result<()> {
    println!("Rendering document at: {}", path.display());

    let mut loaded = load_document(&path)?;

    let mut config = loaded.document.render_config.clone();
    if let Some(step) = options.step_angle {
        config.step_angle = step;
    }
    if let Some(output) = options.output {
        config.output_path = output;
    }
    config.compositing |= options.pixelate;
    config.restore_scene_state |= options.restore;

    let renderer: Box<dyn StillRenderer + Send> = if options.dry_run {
        Box::new(RecordingRenderer::new())
    } else {
        let template = options.renderer.ok_or_else(|| {
            anyhow::anyhow!(
                "No renderer configured. Pass --renderer, set render.renderer_command in {}, or use --dry-run",
                turntable_common::config::config_file_path().display()
            )
        })?;
        let renderer = CommandRenderer::from_template(&template)?;
        if !renderer.is_available() {
            anyhow::bail!("Render command not found: {}", renderer.program());
        }
        Box::new(renderer)
    };

    let base_dir = loaded.base_dir();
    let mut driver = RenderDriver::new(config, Some(base_dir.as_path()))?;

    if !options.dry_run && !options.no_checkpoint {
        let checkpoint = options
            .checkpoint
            .unwrap_or_else(|| RunCheckpoint::default_path(driver.output_dir()));
        driver = driver.with_checkpoint(checkpoint, options.resume);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping after the current render...");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    let c = driver.config();
    println!("  Renderer: {}", renderer.name());
    println!("  Output: {}", driver.output_dir().display());
    println!("  Step angle: {}°", c.step_angle);
    if c.compositing {
        println!("  Pixelation: {}px", c.pixel_size);
    }

    let progress_cb: Box<dyn Fn(RunProgress) + Send> = Box::new(|p| {
        if p.stage == RunStage::Rendering {
            print!(
                "\r  Progress: {:.1}% ({}/{} renders, ETA: {:.0}s)  ",
                p.progress * 100.0,
                p.jobs_rendered,
                p.total_jobs,
                p.eta_secs,
            );
            let _ = std::io::stdout().flush();
        }
    });
    let driver = driver
        .with_cancel_flag(cancel)
        .with_progress(progress_cb);

    let output_dir = driver.output_dir().to_path_buf();
    let mut host = MemoryHost::new(loaded.document.scene.clone(), renderer)
        .with_document(&loaded.path);

    let (host, result) = tokio::task::spawn_blocking(move || {
        let result = driver.run(&mut host);
        (host, result)
    })
    .await?;

    match result {
        Ok(summary) => {
            println!(
                "\nRender complete: {} job(s), {} image(s) in {:.1}s",
                summary.rendered_jobs,
                summary.render_calls,
                summary.elapsed_secs
            );
            if summary.skipped_jobs > 0 {
                println!("  Skipped {} job(s) from checkpoint", summary.skipped_jobs);
            }
            if options.dry_run {
                for output in &summary.outputs {
                    println!("  {}", output.display());
                }
            }
        }
        Err(e) => {
            println!();
            return Err(run_error(e, &output_dir, options.dry_run));
        }
    }

    if options.save {
        loaded.document.scene = host.into_scene();
        save_document(&mut loaded)?;
        println!("Scene state saved to {}", loaded.path.display());
    }

    Ok(())
}

/// Turn a failed run into the command's error, with a hint on what is left
/// on disk and how to continue.
fn run_error(error: TurntableError, output_dir: &Path, dry_run: bool) -> anyhow::Error {
    match error {
        TurntableError::Cancelled { completed, total } => {
            let hint = if !dry_run {
                " Resume with --resume."
            } else {
                ""
            };
            anyhow::anyhow!("Render cancelled after {completed}/{total} job(s).{hint}")
        }
        e if e.is_run_failure() && !dry_run => anyhow::anyhow!(
            "Render failed: {e}\nImages rendered so far remain in {}.",
            output_dir.display()
        ),
        e => anyhow::anyhow!("Render failed: {e}"),
    }
}
