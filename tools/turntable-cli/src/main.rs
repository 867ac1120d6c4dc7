//! Turntable CLI: keyframe x rotation batch rendering from the command line.
//!
//! Usage:
//!   turntable init <NAME>            Create a new document
//!   turntable info <PATH>            Show document information
//!   turntable configure <PATH>       Change the document's render settings
//!   turntable plan <PATH>            List the renders a run would produce
//!   turntable render <PATH>          Render every keyframe from every angle
//!   turntable clean-merge <PATH>     Delete empties and merge selected meshes
//!   turntable create-root <PATH>     Parent the selection to a new ROOT empty
//!   turntable validate <PATH>        Validate a document

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use turntable_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "turntable",
    about = "Render the active object at every keyframe from evenly spaced angles",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new document
    Init {
        /// Document name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Add an animated cube, a camera, and a light
        #[arg(long)]
        demo: bool,
    },

    /// Show document information
    Info {
        /// Path to the document file
        path: PathBuf,
    },

    /// Change the render settings stored in a document
    Configure {
        /// Path to the document file
        path: PathBuf,

        /// Base filename for rendered images
        #[arg(long)]
        base_name: Option<String>,

        /// Rotation step in degrees (1-360)
        #[arg(long)]
        step_angle: Option<u32>,

        /// Output directory for raw renders ("//" = document location)
        #[arg(long)]
        output: Option<String>,

        /// Output directory for pixelated renders
        #[arg(long)]
        post_output: Option<String>,

        /// Also render through the pixelation compositor
        #[arg(long)]
        compositing: Option<bool>,

        /// Pixelation block size
        #[arg(long)]
        pixel_size: Option<u32>,

        /// Restore yaw, frame, and render path after a run
        #[arg(long)]
        restore: Option<bool>,

        /// Keep world transforms when reparenting to ROOT
        #[arg(long)]
        compensate_reparent: Option<bool>,
    },

    /// List the renders a run would produce
    Plan {
        /// Path to the document file
        path: PathBuf,

        /// Rotation step override in degrees
        #[arg(long)]
        step_angle: Option<u32>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render every keyframe of the active object from every angle
    Render {
        /// Path to the document file
        path: PathBuf,

        /// Render command template. Placeholders: {output} {frame} {yaw} {object}
        /// {document} {composite} (1 for the pixelated pass) {pixel_size}
        #[arg(long)]
        renderer: Option<String>,

        /// Record the renders without producing images
        #[arg(long)]
        dry_run: bool,

        /// Rotation step override in degrees
        #[arg(long)]
        step_angle: Option<u32>,

        /// Output directory override
        #[arg(short, long)]
        output: Option<String>,

        /// Also render through the pixelation compositor
        #[arg(long)]
        pixelate: bool,

        /// Restore yaw, frame, and render path afterwards
        #[arg(long)]
        restore: bool,

        /// Skip jobs completed by an earlier run
        #[arg(long)]
        resume: bool,

        /// Checkpoint file (default: inside the output directory)
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Do not write a checkpoint
        #[arg(long, conflicts_with_all = ["resume", "checkpoint"])]
        no_checkpoint: bool,

        /// Save the resulting scene state back to the document
        #[arg(long)]
        save: bool,
    },

    /// Delete all empties and merge the selected meshes
    CleanMerge {
        /// Path to the document file
        path: PathBuf,
    },

    /// Create a ROOT empty at the origin and parent the selection to it
    CreateRoot {
        /// Path to the document file
        path: PathBuf,

        /// Keep each child's world transform
        #[arg(long)]
        keep_transform: bool,
    },

    /// Validate a document
    Validate {
        /// Path to the document file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = AppConfig::load();

    let mut logging = app_config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    turntable_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init { name, output, demo } => {
            commands::init::run(name, output, demo, &app_config)
        }
        Commands::Info { path } => commands::info::run(path),
        Commands::Configure {
            path,
            base_name,
            step_angle,
            output,
            post_output,
            compositing,
            pixel_size,
            restore,
            compensate_reparent,
        } => commands::configure::run(
            path,
            commands::configure::Changes {
                base_name,
                step_angle,
                output,
                post_output,
                compositing,
                pixel_size,
                restore,
                compensate_reparent,
            },
        ),
        Commands::Plan {
            path,
            step_angle,
            json,
        } => commands::plan::run(path, step_angle, json),
        Commands::Render {
            path,
            renderer,
            dry_run,
            step_angle,
            output,
            pixelate,
            restore,
            resume,
            checkpoint,
            no_checkpoint,
            save,
        } => {
            commands::render::run(
                path,
                commands::render::RenderOptions {
                    renderer: renderer.or(app_config.render.renderer_command.clone()),
                    dry_run,
                    step_angle,
                    output,
                    pixelate,
                    restore,
                    resume,
                    checkpoint,
                    no_checkpoint,
                    save,
                },
            )
            .await
        }
        Commands::CleanMerge { path } => commands::scene::clean_merge(path),
        Commands::CreateRoot {
            path,
            keep_transform,
        } => commands::scene::create_root(path, keep_transform),
        Commands::Validate { path } => commands::validate::run(path),
    }
}
