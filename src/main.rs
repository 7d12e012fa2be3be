use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use mesh_viewer::app;
use mesh_viewer::scene::{RenderFlags, ShadingMode};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 800;

#[derive(Parser)]
#[command(name = "mesh_viewer")]
#[command(about = "Software rasterizer for OBJ meshes", long_about = None)]
#[command(version)]
struct Cli {
    /// OBJ file to show, a cube is shown when omitted
    mesh: Option<PathBuf>,

    #[arg(long, default_value_t = WIDTH)]
    width: u32,

    #[arg(long, default_value_t = HEIGHT)]
    height: u32,

    /// Render one frame into this PNG file instead of opening a window
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "phong")]
    shading: Shading,

    /// Number of lights in the scene
    #[arg(long, default_value = "1")]
    lights: usize,

    /// Blend distant pixels into the haze color
    #[arg(long)]
    fog: bool,

    /// Quantize colors into this many bands
    #[arg(long)]
    toon: Option<f32>,

    /// Draw edges only
    #[arg(long)]
    wireframe: bool,

    #[arg(long)]
    print_fps: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shading {
    Flat,
    Phong,
}

impl Cli {
    fn render_flags(&self) -> RenderFlags {
        let mut flags = if self.wireframe { RenderFlags::wireframe() } else { RenderFlags::default() };
        flags.shading = match self.shading {
            Shading::Flat => ShadingMode::Flat,
            Shading::Phong => ShadingMode::Phong,
        };
        flags.fog = self.fog;
        if let Some(levels) = self.toon {
            flags.toon = true;
            flags.levels = levels;
        }
        return flags;
    }
}

#[show_image::main]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let params = app::Params {
        width: cli.width,
        height: cli.height,
        print_fps: cli.print_fps,
        mesh_path: cli.mesh.clone(),
        output: cli.output.clone(),
        light_count: cli.lights,
        flags: cli.render_flags(),
    };

    app::run(params)?;

    return Ok(());
}
