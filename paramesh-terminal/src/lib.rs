//! Terminal viewer for composite models
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use paramesh_core::{CompositeModel, Cuboid, HollowCylinder, Scene};

pub mod camera;
pub mod renderer;

pub use camera::{Camera, CameraPosition, ProjectionMode};
pub use renderer::AsciiRenderer;

const ROTATION_STEP: f32 = 0.1;
const ORBIT_STEP: f32 = 0.1;
const ZOOM_STEP: f32 = 1.1;

/// A composite model plus the part groups the viewer can toggle.
pub struct ViewerModel {
    pub model: CompositeModel,
    /// Parts switched together by the wireframe key.
    pub wireframe: Vec<String>,
    /// Parts bound to the number keys, in key order.
    pub toggles: Vec<String>,
}

impl From<HollowCylinder> for ViewerModel {
    fn from(cylinder: HollowCylinder) -> Self {
        let wireframe = cylinder.wireframe_names().to_vec();
        let toggles = paramesh_core::primitives::hollow_cylinder::SOLID_PARTS
            .iter()
            .map(|name| name.to_string())
            .collect();
        Self {
            model: cylinder.into_model(),
            wireframe,
            toggles,
        }
    }
}

impl From<Cuboid> for ViewerModel {
    fn from(cuboid: Cuboid) -> Self {
        use paramesh_core::primitives::cuboid::{SOLID_PART, WIREFRAME_PART};
        Self {
            model: cuboid.into_model(),
            wireframe: vec![WIREFRAME_PART.to_string()],
            toggles: vec![SOLID_PART.to_string()],
        }
    }
}

/// Viewer settings chosen on the command line.
#[derive(Debug, Clone, Copy)]
pub struct ViewerOptions {
    pub target_fps: u32,
    pub wireframe: bool,
    /// Per-frame rotation increment applied around x and y.
    pub spin: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            target_fps: 30,
            wireframe: true,
            spin: 0.01,
        }
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    viewer: ViewerModel,
    scene: Scene,
    camera: Camera,
    renderer: AsciiRenderer,
    options: ViewerOptions,
    wireframe: bool,
    paused: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(viewer: ViewerModel, options: ViewerOptions) -> anyhow::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(viewer, options, width, height)
    }

    /// Build an app for a fixed viewport without querying the terminal.
    pub fn with_size(
        viewer: ViewerModel,
        options: ViewerOptions,
        width: u16,
        height: u16,
    ) -> anyhow::Result<Self> {
        let mut scene = Scene::new();
        viewer.model.add_to_scene(&mut scene)?;
        for name in &viewer.wireframe {
            viewer.model.set_part_enabled(name, options.wireframe);
        }
        info!(parts = viewer.model.len(), nodes = scene.len(), "scene ready");

        Ok(Self {
            viewer,
            scene,
            camera: Camera::new(width as u32, height as u32),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            options,
            wireframe: options.wireframe,
            paused: false,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn model(&self) -> &CompositeModel {
        &self.viewer.model
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / u64::from(self.options.target_fps.max(1)));

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(width, height) => self.resize(width, height),
                    _ => {}
                }
            }

            // Update
            self.update();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "viewport resized");
        self.camera.resize(width as u32, height as u32);
        self.renderer.resize(width as usize, height as usize);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let model = &mut self.viewer.model;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') => model.inc_rotation(Some(ROTATION_STEP), None, None),
            KeyCode::Char('s') => model.inc_rotation(Some(-ROTATION_STEP), None, None),
            KeyCode::Char('a') => model.inc_rotation(None, Some(-ROTATION_STEP), None),
            KeyCode::Char('d') => model.inc_rotation(None, Some(ROTATION_STEP), None),
            KeyCode::Char('e') => model.inc_rotation(None, None, Some(ROTATION_STEP)),
            KeyCode::Char('r') => model.inc_rotation(None, None, Some(-ROTATION_STEP)),
            KeyCode::Left => self.camera.orbit(-ORBIT_STEP, 0.0),
            KeyCode::Right => self.camera.orbit(ORBIT_STEP, 0.0),
            KeyCode::Up => self.camera.orbit(0.0, ORBIT_STEP),
            KeyCode::Down => self.camera.orbit(0.0, -ORBIT_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.camera.zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('-') => self.camera.zoom(ZOOM_STEP),
            KeyCode::Char('c') => self.camera.reset_to_default_position(),
            KeyCode::Char('p') => self.paused = !self.paused,
            KeyCode::Char('f') => {
                self.wireframe = !self.wireframe;
                for name in &self.viewer.wireframe {
                    model.set_part_enabled(name, self.wireframe);
                }
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                if let Some(name) = self.viewer.toggles.get(index) {
                    let enabled = model.is_part_enabled(name).unwrap_or(false);
                    model.set_part_enabled(name, !enabled);
                }
            }
            _ => {}
        }
    }

    /// Advance the idle spin by one frame.
    pub fn update(&mut self) {
        if !self.paused {
            let spin = self.options.spin;
            self.viewer.model.inc_rotation(Some(spin), Some(spin * 1.5), None);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render scene
        self.renderer.render_scene(&self.scene, &self.camera);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Paramesh | FPS: {:.1} | WASD/E/R=Rotate Arrows=Orbit +/-=Zoom C=Reset F=Wireframe 1-{}=Parts P=Pause Q=Quit",
                self.fps,
                self.viewer.toggles.len()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crossterm::event::KeyModifiers;
    use paramesh_core::{CuboidConfig, HollowCylinderConfig};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn cylinder_app() -> TerminalApp {
        let cylinder = HollowCylinder::build(HollowCylinderConfig::default()).unwrap();
        TerminalApp::with_size(cylinder.into(), ViewerOptions::default(), 80, 40).unwrap()
    }

    #[test]
    fn test_every_part_is_attached() {
        let app = cylinder_app();
        assert_eq!(app.scene().len(), app.model().len());
    }

    #[test]
    fn test_number_keys_toggle_solid_parts() {
        let mut app = cylinder_app();
        app.handle_key(key('2'));
        assert_eq!(app.model().is_part_enabled("internal"), Some(false));
        assert_eq!(app.model().is_part_enabled("external"), Some(true));
        app.handle_key(key('2'));
        assert_eq!(app.model().is_part_enabled("internal"), Some(true));
    }

    #[test]
    fn test_wireframe_key_toggles_outlines() {
        let mut app = cylinder_app();
        app.handle_key(key('f'));
        let hidden = app.viewer.wireframe.iter().all(|name| app.model().is_part_enabled(name) == Some(false));
        assert!(hidden);
        assert_eq!(app.model().is_part_enabled("external"), Some(true));
    }

    #[test]
    fn test_rotation_keys_and_spin() {
        let mut app = cylinder_app();
        app.handle_key(key('w'));
        app.handle_key(key('p'));
        app.update();
        assert_relative_eq!(app.model().transform().rotation.x, ROTATION_STEP);

        app.handle_key(key('p'));
        app.update();
        assert_relative_eq!(app.model().transform().rotation.x, ROTATION_STEP + 0.01);
    }

    #[test]
    fn test_quit_key() {
        let cuboid = Cuboid::build(&CuboidConfig::default()).unwrap();
        let mut app = TerminalApp::with_size(cuboid.into(), ViewerOptions::default(), 80, 40).unwrap();
        assert!(app.is_running());
        app.handle_key(key('q'));
        assert!(!app.is_running());
    }
}
