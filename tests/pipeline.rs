use nalgebra as na;
use na::{Point3, Vector2, Vector3, Vector4};

use mesh_viewer::render::buffer::FrameBuffer;
use mesh_viewer::render::raster::{interpolate, Rasterizer, TriangleOutcome};
use mesh_viewer::render::shader::{illuminate, LightingTerms, SurfacePoint};
use mesh_viewer::render::viewport::Viewport;
use mesh_viewer::render::Renderer;
use mesh_viewer::scene::camera::{Camera, Projection};
use mesh_viewer::scene::light::Light;
use mesh_viewer::scene::model::{Face, Material, Mesh, Model};
use mesh_viewer::scene::{Scene, ShadingMode};
use mesh_viewer::util::{from_hom_point, to_hom_point, Color};

fn single_triangle_scene(shading: ShadingMode) -> Scene {
    let mesh = Mesh::new(
        vec![Vector3::new(-0.5, -0.5, 0.0), Vector3::new(0.5, -0.5, 0.0), Vector3::new(0.0, 0.5, 0.0)],
        Vec::new(),
        Vec::<Vector2<f32>>::new(),
        vec![Face::new([0, 1, 2])],
    )
    .unwrap();
    let mut scene = Scene::default();
    scene.flags.shading = shading;
    scene.add_model(Model::new("triangle", mesh));
    return scene;
}

fn triangle_colors(renderer: &Renderer, background: Color) -> Vec<Color> {
    let mut colors: Vec<Color> = Vec::new();
    for color in renderer.frame().colors() {
        if *color != background && !colors.contains(color) {
            colors.push(*color);
        }
    }
    return colors;
}

#[test]
fn right_triangle_fills_inclusive_lattice() {
    let mut frame = FrameBuffer::new(32, 32);
    let mut rasterizer = Rasterizer::new();
    let vertices = [Vector3::new(0.0, 0.0, 0.5), Vector3::new(10.0, 0.0, 0.5), Vector3::new(0.0, 10.0, 0.5)];
    let outcome = rasterizer.draw_triangle(&mut frame, &vertices, Color::zeros(), true, |_| Color::repeat(1.0));
    assert_eq!(outcome, TriangleOutcome::Filled(66));

    let covered: Vec<f32> = frame.depth().as_slice().iter().copied().filter(|d| d.is_finite()).collect();
    assert_eq!(covered.len(), 66);
    assert!(covered.iter().all(|d| (d - 0.5).abs() < 1e-6));
    assert!((frame.depth().get(5, 5) - 0.5).abs() < 1e-6);
    assert_eq!(frame.depth().get(6, 5), f32::INFINITY);
}

#[test]
fn overlapping_triangles_do_not_depend_on_order() {
    let near = [Vector3::new(2.0, 2.0, 0.2), Vector3::new(17.0, 2.0, 0.2), Vector3::new(2.0, 17.0, 0.2)];
    let far = [Vector3::new(3.0, 3.0, 0.8), Vector3::new(18.0, 3.0, 0.8), Vector3::new(18.0, 18.0, 0.8)];
    let near_color = Color::new(1.0, 0.0, 0.0);
    let far_color = Color::new(0.0, 0.0, 1.0);

    let render = |first: (&[Vector3<f32>; 3], Color), second: (&[Vector3<f32>; 3], Color)| -> FrameBuffer {
        let mut frame = FrameBuffer::new(20, 20);
        let mut rasterizer = Rasterizer::new();
        for (vertices, color) in [first, second] {
            rasterizer.draw_triangle(&mut frame, vertices, Color::zeros(), true, |_| color);
        }
        return frame;
    };
    let near_first = render((&near, near_color), (&far, far_color));
    let far_first = render((&far, far_color), (&near, near_color));

    assert_eq!(near_first.depth().as_slice(), far_first.depth().as_slice());
    assert!((near_first.depth().get(8, 5) - 0.2).abs() < 1e-6);
    assert_eq!(near_first.pixel(8, 5), Some(near_color));
    assert_eq!(far_first.pixel(8, 5), Some(near_color));
    assert_eq!(near_first.pixel(15, 10), Some(far_color));
}

#[test]
fn flat_shading_paints_one_color_per_face() {
    let scene = single_triangle_scene(ShadingMode::Flat);
    let mut renderer = Renderer::new(64, 64);
    let stats = renderer.render(&scene);
    assert_eq!(stats.triangles, 1);
    assert!(stats.pixels > 0);
    assert_eq!(triangle_colors(&renderer, scene.background).len(), 1);

    let scene = single_triangle_scene(ShadingMode::Phong);
    renderer.render(&scene);
    assert!(triangle_colors(&renderer, scene.background).len() > 1);
}

#[test]
fn ambient_only_lighting() {
    let light = Light::default();
    let material = Material { ambient: Color::new(1.0, 0.0, 0.0), ..Material::default() };
    let surface = SurfacePoint { position: Vector3::zeros(), normal: Vector3::z() };
    let terms = LightingTerms { ambient: true, diffuse: false, specular: false };
    let color = illuminate(&light, &material, &surface, Vector3::new(0.0, 0.0, 3.0), terms);
    assert_eq!(color, Color::new(0.5, 0.0, 0.0));
}

#[test]
fn light_at_face_centroid_adds_no_diffuse_or_specular() {
    let mut scene = single_triangle_scene(ShadingMode::Flat);
    scene.flags.ambient = false;
    let model = &scene.models[0];
    let world = model
        .mesh
        .face_positions(&model.mesh.faces()[0])
        .map(|p| from_hom_point(model.transform.matrix() * to_hom_point(p)));
    let centroid = interpolate(&Vector3::repeat(1.0 / 3.0), &world);
    scene.lights = vec![Light::at(centroid)];

    let surface = SurfacePoint { position: centroid, normal: Vector3::z() };
    let terms = LightingTerms { ambient: false, diffuse: true, specular: true };
    let color = illuminate(&scene.lights[0], &Material::default(), &surface, Vector3::new(0.0, 0.0, 2.0), terms);
    assert_eq!(color, Color::zeros());

    let mut renderer = Renderer::new(32, 32);
    let stats = renderer.render(&scene);
    assert!(stats.pixels > 0);
    let filled: Vec<Color> = renderer
        .frame()
        .colors()
        .iter()
        .copied()
        .filter(|c| *c != scene.background)
        .collect();
    assert!(filled.len() >= stats.pixels);
    assert!(filled.iter().all(|c| *c == Color::zeros()));
}

#[test]
fn viewport_mapping_round_trips() {
    let viewport = Viewport::new(640, 480);
    for point in [Vector3::new(0.25, -0.5, 0.9), Vector3::new(-1.0, 1.0, 0.0), Vector3::new(3.0, -2.0, -7.5)] {
        let back = viewport.undo_viewport(viewport.to_viewport(point));
        assert!((back - point).norm() < 1e-5);
    }
}

#[test]
fn homogeneous_divide_keeps_unit_w() {
    let point = Vector4::new(1.5, -2.0, 0.25, 1.0);
    assert_eq!(from_hom_point(point), Vector3::new(1.5, -2.0, 0.25));
    let scaled = Vector4::new(3.0, -4.0, 0.5, 2.0);
    assert_eq!(from_hom_point(scaled), Vector3::new(1.5, -2.0, 0.25));
    assert_eq!(from_hom_point(Vector4::new(1.0, 2.0, 3.0, 0.0)), Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn perspective_camera_renders_cube() {
    let mut model = Model::new("cube", Mesh::cube());
    model.fit_to_unit_cube();
    let camera = Camera::new(
        Point3::new(3.0, 3.0, 3.0),
        Point3::origin(),
        Vector3::y(),
        Projection::Perspective { fovy: std::f32::consts::FRAC_PI_3, aspect: 1.0, near: 0.5, far: 20.0 },
    )
    .unwrap();
    let mut scene = Scene::default();
    scene.cameras = vec![camera];
    scene.add_model(model);

    let mut renderer = Renderer::new(48, 48);
    let stats = renderer.render(&scene);
    assert_eq!(stats.triangles, 12);
    assert_eq!(stats.rejected, 0);
    // The cube is centered, so the middle pixel is covered.
    assert!(renderer.frame().depth().get(24, 24).is_finite());
    assert!(renderer.frame().depth().get(0, 0).is_infinite());
}
