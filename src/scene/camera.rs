use nalgebra as na;
use na::{Matrix4, Point3, Rotation3, Unit, Vector3};

use crate::error::CameraError;

const PARAM_EPSILON: f32 = 1e-6;

/// Projection parameters. Field of view is in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Orthographic { left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32 },
    Perspective { fovy: f32, aspect: f32, near: f32, far: f32 },
}

impl Projection {
    fn validate(&self) -> Result<(), CameraError> {
        match *self {
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                if (right - left).abs() <= PARAM_EPSILON {
                    return Err(CameraError::EmptyVolume { axis: "left/right", value: left });
                }
                if (top - bottom).abs() <= PARAM_EPSILON {
                    return Err(CameraError::EmptyVolume { axis: "bottom/top", value: bottom });
                }
                if (far - near).abs() <= PARAM_EPSILON {
                    return Err(CameraError::CoincidentClipPlanes(near));
                }
            }
            Projection::Perspective { fovy, aspect, near, far } => {
                if !(fovy > PARAM_EPSILON && fovy < std::f32::consts::PI) {
                    return Err(CameraError::InvalidFieldOfView(fovy));
                }
                if !(aspect > PARAM_EPSILON) {
                    return Err(CameraError::InvalidAspect(aspect));
                }
                if !(near > 0.0) {
                    return Err(CameraError::InvalidNear(near));
                }
                if (far - near).abs() <= PARAM_EPSILON {
                    return Err(CameraError::CoincidentClipPlanes(near));
                }
            }
        }
        return Ok(());
    }

    fn to_matrix(&self) -> Matrix4<f32> {
        return match *self {
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                Matrix4::new_orthographic(left, right, bottom, top, near, far)
            }
            Projection::Perspective { fovy, aspect, near, far } => {
                Matrix4::new_perspective(aspect, fovy, near, far)
            }
        };
    }

    pub fn near(&self) -> f32 {
        return match *self {
            Projection::Orthographic { near, .. } | Projection::Perspective { near, .. } => near,
        };
    }

    pub fn far(&self) -> f32 {
        return match *self {
            Projection::Orthographic { far, .. } | Projection::Perspective { far, .. } => far,
        };
    }
}

/// Camera holding look-at and projection parameters together with the matrices derived
/// from them. Matrices are rebuilt by every setter, so they are never stale.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Point3<f32>,
    at: Point3<f32>,
    up: Vector3<f32>,
    projection: Projection,
    view_matrix: Matrix4<f32>,       // World to camera space.
    projection_matrix: Matrix4<f32>, // Camera to clip space.
}

impl Default for Camera {
    fn default() -> Self {
        let eye = Point3::new(0.0, 0.0, 2.0);
        let at = Point3::origin();
        let up = Vector3::y();
        let projection = Projection::Orthographic {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
            near: 0.1,
            far: 10.0,
        };
        return Self {
            eye,
            at,
            up,
            projection,
            view_matrix: Matrix4::look_at_rh(&eye, &at, &up),
            projection_matrix: projection.to_matrix(),
        };
    }
}

impl Camera {
    pub fn new(eye: Point3<f32>, at: Point3<f32>, up: Vector3<f32>, projection: Projection) -> Result<Self, CameraError> {
        let mut camera = Self::default();
        camera.set_look_at(eye, at, up)?;
        camera.set_projection(projection)?;
        return Ok(camera);
    }

    pub fn set_look_at(&mut self, eye: Point3<f32>, at: Point3<f32>, up: Vector3<f32>) -> Result<(), CameraError> {
        let direction = at - eye;
        if direction.norm() <= PARAM_EPSILON {
            return Err(CameraError::CoincidentEye);
        }
        if direction.cross(&up).norm() <= PARAM_EPSILON * direction.norm() * up.norm().max(PARAM_EPSILON) {
            return Err(CameraError::ParallelUp);
        }
        self.eye = eye;
        self.at = at;
        self.up = up;
        self.view_matrix = Matrix4::look_at_rh(&eye, &at, &up);
        return Ok(());
    }

    pub fn set_projection(&mut self, projection: Projection) -> Result<(), CameraError> {
        projection.validate()?;
        self.projection = projection;
        self.projection_matrix = projection.to_matrix();
        return Ok(());
    }

    pub fn set_orthographic(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Result<(), CameraError> {
        return self.set_projection(Projection::Orthographic { left, right, bottom, top, near, far });
    }

    pub fn set_perspective(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) -> Result<(), CameraError> {
        return self.set_projection(Projection::Perspective { fovy, aspect, near, far });
    }

    /// Adapts the projection to a new output aspect ratio (width / height).
    /// Orthographic volumes keep their vertical extent and center.
    pub fn set_aspect_ratio(&mut self, aspect: f32) -> Result<(), CameraError> {
        if !(aspect > PARAM_EPSILON) {
            return Err(CameraError::InvalidAspect(aspect));
        }
        let projection = match self.projection {
            Projection::Perspective { fovy, near, far, .. } => Projection::Perspective { fovy, aspect, near, far },
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                let center = (left + right) / 2.0;
                let half_width = (top - bottom).abs() / 2.0 * aspect;
                Projection::Orthographic {
                    left: center - half_width,
                    right: center + half_width,
                    bottom,
                    top,
                    near,
                    far,
                }
            }
        };
        return self.set_projection(projection);
    }

    /// Rotates the eye around the target, angle in degrees about the up vector.
    pub fn orbit(&mut self, angle_degrees: f32) -> Result<(), CameraError> {
        let axis = Unit::try_new(self.up, PARAM_EPSILON).ok_or(CameraError::ParallelUp)?;
        let rotation = Rotation3::from_axis_angle(&axis, angle_degrees.to_radians());
        let eye = self.at + rotation * (self.eye - self.at);
        return self.set_look_at(eye, self.at, self.up);
    }

    /// Moves the eye along the view direction, factor < 1 gets closer.
    pub fn zoom(&mut self, factor: f32) -> Result<(), CameraError> {
        let eye = self.at + (self.eye - self.at) * factor;
        return self.set_look_at(eye, self.at, self.up);
    }

    pub fn view_matrix(&self) -> &Matrix4<f32> {
        return &self.view_matrix;
    }

    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        return &self.projection_matrix;
    }

    pub fn projection(&self) -> Projection {
        return self.projection;
    }

    pub fn eye(&self) -> Point3<f32> {
        return self.eye;
    }

    pub fn at(&self) -> Point3<f32> {
        return self.at;
    }

    pub fn up(&self) -> Vector3<f32> {
        return self.up;
    }

    pub fn near(&self) -> f32 {
        return self.projection.near();
    }

    pub fn far(&self) -> f32 {
        return self.projection.far();
    }
}
