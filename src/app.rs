use std::path::{Path, PathBuf};
use std::sync::mpsc::TryRecvError;
use std::time;

use nalgebra as na;
use na::{Point3, Vector3};
use show_image::event::{VirtualKeyCode, WindowEvent};
use show_image::{create_window, ImageInfo, ImageView, WindowOptions};

use crate::error::ViewerError;
use crate::render::Renderer;
use crate::scene::camera::{Camera, Projection};
use crate::scene::light::Light;
use crate::scene::model::{Mesh, Model};
use crate::scene::obj::load_mesh;
use crate::scene::transform::{apply_delta, TransformDelta};
use crate::scene::{RenderFlags, Scene, ShadingMode};
use crate::util::Color;

const MOVE_STEP: f32 = 0.1;
const ROTATE_STEP: f32 = 5.0; // Degrees.
const SCALE_STEP: f32 = 1.1;

/// Execution parameters of the viewer.
#[derive(Debug, Clone)]
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub print_fps: bool,
    pub mesh_path: Option<PathBuf>, // Built-in cube when absent.
    pub output: Option<PathBuf>,    // Render one frame to this PNG instead of opening a window.
    pub light_count: usize,
    pub flags: RenderFlags,
}

impl Default for Params {
    fn default() -> Self {
        return Self {
            width: 800,
            height: 800,
            print_fps: false,
            mesh_path: None,
            output: None,
            light_count: 1,
            flags: RenderFlags::default(),
        };
    }
}

/// Whether the window loop should go on after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Exit,
}

/// Builds the scene described by params: one model fitted into the unit cube, a perspective
/// camera and light_count lights.
pub fn build_scene(params: &Params) -> Result<Scene, ViewerError> {
    let (name, mesh) = match &params.mesh_path {
        Some(path) => (path.display().to_string(), load_mesh(path)?),
        None => (String::from("cube"), Mesh::cube()),
    };
    let mut model = Model::new(name, mesh);
    model.fit_to_unit_cube();
    model.material.ambient = Color::new(0.2, 0.05, 0.05);

    let camera = Camera::new(
        Point3::new(2.5, 2.0, 3.5),
        Point3::origin(),
        Vector3::y(),
        Projection::Perspective { fovy: std::f32::consts::FRAC_PI_4, aspect: 1.0, near: 0.5, far: 20.0 },
    )?;

    let mut scene = Scene::default();
    scene.cameras = vec![camera];
    scene.lights = default_lights(params.light_count);
    scene.flags = params.flags;
    scene.flags.multi_light = params.flags.multi_light || params.light_count > 1;
    scene.add_model(model);
    return Ok(scene);
}

/// Up to light_count lights, the first one white, the rest tinted and spread around.
fn default_lights(light_count: usize) -> Vec<Light> {
    let mut lights = Vec::with_capacity(light_count);
    for i in 0..light_count {
        if i == 0 {
            lights.push(Light::default());
            continue;
        }
        let angle = i as f32 * 2.0 * std::f32::consts::PI / light_count as f32;
        let position = Vector3::new(4.0 * angle.cos(), 1.0, 4.0 * angle.sin());
        lights.push(Light::at(position).with_colors(Color::zeros(), Color::new(0.1, 0.2, 0.5), Color::new(0.2, 0.2, 0.4)));
    }
    return lights;
}

/// Applies one key press to the scene.
pub fn handle_key(scene: &mut Scene, key: VirtualKeyCode) -> KeyAction {
    let delta = match key {
        VirtualKeyCode::Escape => return KeyAction::Exit,
        VirtualKeyCode::Left => Some(TransformDelta::translate(-MOVE_STEP, 0.0, 0.0)),
        VirtualKeyCode::Right => Some(TransformDelta::translate(MOVE_STEP, 0.0, 0.0)),
        VirtualKeyCode::Up => Some(TransformDelta::translate(0.0, MOVE_STEP, 0.0)),
        VirtualKeyCode::Down => Some(TransformDelta::translate(0.0, -MOVE_STEP, 0.0)),
        VirtualKeyCode::A => Some(TransformDelta::rotate(-ROTATE_STEP, Vector3::y())),
        VirtualKeyCode::D => Some(TransformDelta::rotate(ROTATE_STEP, Vector3::y())),
        VirtualKeyCode::W => Some(TransformDelta::rotate(-ROTATE_STEP, Vector3::x())),
        VirtualKeyCode::S => Some(TransformDelta::rotate(ROTATE_STEP, Vector3::x())),
        VirtualKeyCode::Z => Some(TransformDelta::scale(1.0 / SCALE_STEP, 1.0 / SCALE_STEP, 1.0 / SCALE_STEP)),
        VirtualKeyCode::X => Some(TransformDelta::scale(SCALE_STEP, SCALE_STEP, SCALE_STEP)),
        _ => None,
    };
    if let Some(delta) = delta {
        if let Some(model) = scene.active_model_mut() {
            model.transform = apply_delta(&model.transform, &delta);
        }
        return KeyAction::Continue;
    }

    match key {
        VirtualKeyCode::Tab => {
            if let Some(model) = scene.active_model_mut() {
                model.transform.target = model.transform.target.toggled();
                log::info!("Editing {:?} transform", model.transform.target);
            }
        }
        VirtualKeyCode::Back => {
            if let Some(model) = scene.active_model_mut() {
                model.transform.reset();
            }
        }
        VirtualKeyCode::F => {
            scene.flags.shading = match scene.flags.shading {
                ShadingMode::Flat => ShadingMode::Phong,
                ShadingMode::Phong => ShadingMode::Flat,
            };
            log::info!("Shading: {:?}", scene.flags.shading);
        }
        VirtualKeyCode::L => scene.flags.multi_light = !scene.flags.multi_light,
        VirtualKeyCode::G => scene.flags.fog = !scene.flags.fog,
        VirtualKeyCode::T => scene.flags.toon = !scene.flags.toon,
        VirtualKeyCode::N => scene.flags.draw_normals = !scene.flags.draw_normals,
        VirtualKeyCode::B => scene.flags.draw_box = !scene.flags.draw_box,
        VirtualKeyCode::Q | VirtualKeyCode::E => {
            let angle = if key == VirtualKeyCode::Q { -ROTATE_STEP } else { ROTATE_STEP };
            if let Some(camera) = scene.active_camera_mut() {
                if let Err(error) = camera.orbit(angle) {
                    log::warn!("Camera orbit rejected: {}", error);
                }
            }
        }
        _ => (),
    }
    return KeyAction::Continue;
}

/// Renders a single frame into a PNG file.
pub fn render_to_file(params: &Params, path: &Path) -> Result<(), ViewerError> {
    let scene = build_scene(params)?;
    let mut renderer = Renderer::new(params.width, params.height);
    let stats = renderer.render(&scene);
    log::info!("Rendered {} triangles, {} pixels", stats.triangles, stats.pixels);
    renderer.frame().to_image().save(path)?;
    log::info!("Saved {}", path.display());
    return Ok(());
}

/// Actually launches the window, showing rendered frames until Escape is pressed or the
/// window goes away. With params.output set renders one frame to a file instead.
pub fn run(params: Params) -> Result<(), ViewerError> {
    if let Some(path) = &params.output {
        return render_to_file(&params, path);
    }

    let mut scene = build_scene(&params)?;
    let mut renderer = Renderer::new(params.width, params.height);

    let window_options = WindowOptions {
        size: Some([params.width, params.height]),
        ..Default::default()
    };
    let window = create_window("mesh viewer", window_options).map_err(|error| ViewerError::Window(error.to_string()))?;
    let event_channel = window.event_channel().map_err(|error| ViewerError::Window(error.to_string()))?;

    let mut frame_counter_time_begin = time::Instant::now();
    let mut frame_counter: u32 = 0;
    'frames: loop {
        renderer.render(&scene);
        let render_data = renderer.frame().to_rgb8();
        let image_data = ImageView::new(ImageInfo::rgb8(params.width, params.height), &render_data);
        window.set_image("image", image_data).map_err(|error| ViewerError::Window(error.to_string()))?;

        // Draining everything that piled up since the last frame.
        loop {
            match event_channel.try_recv() {
                Ok(WindowEvent::KeyboardInput(event)) => {
                    if !event.input.state.is_released() {
                        continue;
                    }
                    if let Some(key) = event.input.key_code {
                        if handle_key(&mut scene, key) == KeyAction::Exit {
                            break 'frames;
                        }
                    }
                }
                Ok(_) => (),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'frames,
            }
        }

        if params.print_fps {
            // Counting frames to print stats every second.
            frame_counter += 1;
            if frame_counter_time_begin.elapsed().as_secs_f32() > 1.0 {
                log::info!("FPS --- {}", frame_counter);
                frame_counter_time_begin = time::Instant::now();
                frame_counter = 0;
            }
        }
    }

    return Ok(());
}
