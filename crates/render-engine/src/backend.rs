//! External command render engine.
//!
//! Pixel generation belongs to the host application. `CommandRenderer`
//! hands each still render to an external program built from a template
//! such as:
//!
//! ```text
//! blender -b {document} --python render_still.py -- {output} {frame} {yaw}
//! ```
//!
//! Placeholders: `{output}`, `{frame}`, `{yaw}` (degrees), `{object}` (active
//! object name), `{document}`, `{composite}` (`1` when the render must go
//! through the compositor, else `0`) and `{pixel_size}` (block size of the
//! pixelate node, `0` without one). The document on disk does not carry the
//! in-memory compositor graph, so a post-stage render is only told apart
//! from a raw one through the last two. Arguments are split on whitespace;
//! quoting is not interpreted.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

use turntable_host_core::{HostError, HostResult, RenderRequest, StillRenderer};
use turntable_project_model::{NodeKind, Scene};

/// Maximum stderr bytes kept in a failure message.
const STDERR_TAIL_BYTES: usize = 2048;

/// Runs an external program for every still render.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    /// Parse a command template.
    pub fn from_template(template: &str) -> HostResult<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| HostError::render("render command template is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with placeholders substituted for one request.
    pub fn expand_args(&self, request: &RenderRequest<'_>) -> Vec<String> {
        let scene = request.scene;
        let active = scene.active_object.and_then(|id| scene.object(id));
        let object = active.map(|o| o.name.as_str()).unwrap_or("");
        let yaw = active
            .map(|o| (o.transform.rotation_euler.z as f64).to_degrees().round() as i64)
            .unwrap_or(0);
        let document = request
            .document
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let output = request.output.display().to_string();
        let frame = scene.frame_current.to_string();
        let yaw = yaw.to_string();
        let composite = if scene.render.use_compositing { "1" } else { "0" };
        let pixel_size = pixel_size(scene).to_string();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output)
                    .replace("{frame}", &frame)
                    .replace("{yaw}", &yaw)
                    .replace("{object}", object)
                    .replace("{document}", &document)
                    .replace("{composite}", composite)
                    .replace("{pixel_size}", &pixel_size)
            })
            .collect()
    }
}

impl StillRenderer for CommandRenderer {
    fn render_still(&mut self, request: &RenderRequest<'_>) -> HostResult<()> {
        let args = self.expand_args(request);
        tracing::debug!(program = %self.program, args = ?args, "Running render command");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HostError::render(format!("Failed to start {}: {e}", self.program)))?;

        let mut stderr_output = String::new();
        if let Some(mut stderr) = child.stderr.take() {
            if let Err(e) = stderr.read_to_string(&mut stderr_output) {
                stderr_output = format!("<failed to read stderr: {e}>");
            }
        }

        let status = child
            .wait()
            .map_err(|e| HostError::render(format!("Failed to wait on {}: {e}", self.program)))?;

        if !status.success() {
            return Err(HostError::render(format!(
                "{} exited with {status}: {}",
                self.program,
                tail(stderr_output.trim(), STDERR_TAIL_BYTES)
            )));
        }

        if !request.output.exists() {
            return Err(HostError::render(format!(
                "{} finished but did not write {}",
                self.program,
                request.output.display()
            )));
        }

        Ok(())
    }

    fn is_available(&self) -> bool {
        if Path::new(&self.program).components().count() > 1 {
            return Path::new(&self.program).is_file();
        }
        command_exists(&self.program)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Block size of the first pixelate node, or 0 when the graph has none.
fn pixel_size(scene: &Scene) -> u32 {
    scene
        .compositor
        .nodes
        .iter()
        .find_map(|node| match node.kind {
            NodeKind::Pixelate { size_x, .. } => Some(size_x),
            _ => None,
        })
        .unwrap_or(0)
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Last `max` bytes of `text`, on a char boundary.
fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use turntable_project_model::{ObjectKind, Scene};

    fn scene_at(frame: i64, yaw_degrees: f32) -> Scene {
        let mut scene = Scene::new();
        let cube = scene.add_object("Cube", ObjectKind::Mesh);
        scene.object_mut(cube).unwrap().transform.rotation_euler.z = yaw_degrees.to_radians();
        scene.active_object = Some(cube);
        scene.frame_current = frame;
        scene
    }

    #[test]
    fn test_template_placeholders_expand() {
        let renderer =
            CommandRenderer::from_template("render --in {document} -o {output} -f {frame} -y {yaw} {object}")
                .unwrap();
        let scene = scene_at(45, 270.0);
        let output = PathBuf::from("/out/my_render_8.png");
        let document = PathBuf::from("/docs/robot.turntable.json");
        let args = renderer.expand_args(&RenderRequest {
            scene: &scene,
            output: &output,
            document: Some(&document),
        });
        assert_eq!(renderer.program(), "render");
        assert_eq!(
            args,
            vec![
                "--in",
                "/docs/robot.turntable.json",
                "-o",
                "/out/my_render_8.png",
                "-f",
                "45",
                "-y",
                "270",
                "Cube"
            ]
        );
    }

    #[test]
    fn test_compositor_state_reaches_the_command() {
        use crate::compositor::configure_pixelate_graph;
        use turntable_host_core::{MemoryHost, RecordingRenderer};

        let renderer = CommandRenderer::from_template("render {output} {composite} {pixel_size}")
            .unwrap();
        let output = PathBuf::from("/o/x_1_pixel.png");
        let mut host = MemoryHost::new(scene_at(0, 0.0), RecordingRenderer::new());
        let args_for = |scene: &Scene| {
            renderer.expand_args(&RenderRequest {
                scene,
                output: &output,
                document: None,
            })
        };

        assert_eq!(args_for(host.scene()), vec!["/o/x_1_pixel.png", "0", "0"]);

        configure_pixelate_graph(&mut host, 12).unwrap();
        assert_eq!(args_for(host.scene()), vec!["/o/x_1_pixel.png", "1", "12"]);
    }

    #[test]
    fn test_empty_template_is_rejected() {
        assert!(CommandRenderer::from_template("   ").is_err());
    }

    #[test]
    fn test_tail_respects_char_boundaries() {
        assert_eq!(tail("abc", 10), "abc");
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("aé", 1), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_reports_status() {
        let mut renderer = CommandRenderer::from_template("false").unwrap();
        let scene = scene_at(0, 0.0);
        let output = std::env::temp_dir().join("turntable_backend_false.png");
        let err = renderer
            .render_still(&RenderRequest {
                scene: &scene,
                output: &output,
                document: None,
            })
            .unwrap_err();
        assert!(err.to_string().contains("false exited with"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_must_write_output() {
        let dir = std::env::temp_dir().join("turntable_backend_touch");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let output = dir.join("shot_1.png");
        let scene = scene_at(0, 0.0);
        let request = RenderRequest {
            scene: &scene,
            output: &output,
            document: None,
        };

        let mut noop = CommandRenderer::from_template("true {output}").unwrap();
        assert!(noop.render_still(&request).is_err());

        let mut touch = CommandRenderer::from_template("touch {output}").unwrap();
        touch.render_still(&request).unwrap();
        assert!(output.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
