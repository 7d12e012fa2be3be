use nalgebra as na;
use na::{Matrix4, Unit, UnitQuaternion, Vector3};

/// Decomposed affine transform. Matrix form is always translate * rotate * scale,
/// so scale is applied first and translation last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        return Self::identity();
    }
}

impl Transform {
    pub fn identity() -> Self {
        return Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        };
    }

    /// Homogeneous matrix T * R * S.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let translate = Matrix4::new_translation(&self.translation);
        let rotate = self.rotation.to_homogeneous();
        let scale = Matrix4::new_nonuniform_scaling(&self.scale);
        return translate * rotate * scale;
    }

    /// Composes a delta onto this transform, the same way successive translate/rotate/scale
    /// calls accumulate on separate matrices: translations add, rotations right-multiply,
    /// scales multiply per axis.
    pub fn compose(&self, delta: &TransformDelta) -> Self {
        return Self {
            translation: self.translation + delta.translation,
            rotation: self.rotation * delta.rotation,
            scale: self.scale.component_mul(&delta.scale),
        };
    }

    /// Transform moving the center of an axis aligned box to the origin and scaling its
    /// largest extent to 2, so the box fits into [-1, 1]^3.
    pub fn fit_unit_cube(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        let center = (min + max) / 2.0;
        let extent = (max - min).max();
        let factor = if extent > f32::EPSILON { 2.0 / extent } else { 1.0 };
        return Self {
            translation: -factor * center,
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(factor),
        };
    }
}

/// One user gesture worth of change. Identity delta changes nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDelta {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for TransformDelta {
    fn default() -> Self {
        return Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        };
    }
}

impl TransformDelta {
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        return Self { translation: Vector3::new(x, y, z), ..Default::default() };
    }

    /// Rotation by angle in degrees about axis. A zero axis yields no rotation.
    pub fn rotate(angle_degrees: f32, axis: Vector3<f32>) -> Self {
        let rotation = match Unit::try_new(axis, f32::EPSILON) {
            Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle_degrees.to_radians()),
            None => UnitQuaternion::identity(),
        };
        return Self { rotation, ..Default::default() };
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        return Self { scale: Vector3::new(x, y, z), ..Default::default() };
    }
}

/// Which transform group user edits go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformTarget {
    #[default]
    Local,
    World,
}

impl TransformTarget {
    pub fn toggled(self) -> Self {
        return match self {
            TransformTarget::Local => TransformTarget::World,
            TransformTarget::World => TransformTarget::Local,
        };
    }
}

/// Full transform state of one model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelTransform {
    pub local: Transform,
    pub world: Transform,
    pub target: TransformTarget,
}

impl ModelTransform {
    /// Effective model matrix, local * world.
    pub fn matrix(&self) -> Matrix4<f32> {
        return self.local.to_matrix() * self.world.to_matrix();
    }

    /// Back to identity in both groups. The edit target is kept.
    pub fn reset(&mut self) {
        self.local = Transform::identity();
        self.world = Transform::identity();
    }
}

/// Pure update step: new state with the delta composed onto the targeted group.
pub fn apply_delta(current: &ModelTransform, delta: &TransformDelta) -> ModelTransform {
    let mut next = *current;
    match current.target {
        TransformTarget::Local => next.local = current.local.compose(delta),
        TransformTarget::World => next.world = current.world.compose(delta),
    }
    return next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::{vector, Point3};

    fn approx_eq(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        return (a - b).norm() < 1e-5;
    }

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::identity().to_matrix(), Matrix4::identity());
        assert_eq!(ModelTransform::default().matrix(), Matrix4::identity());
    }

    #[test]
    fn scale_is_applied_before_translation() {
        let transform = Transform {
            translation: vector![10.0, 0.0, 0.0],
            rotation: UnitQuaternion::identity(),
            scale: vector![2.0, 2.0, 2.0],
        };
        let p = transform.to_matrix().transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert!(approx_eq(p.coords, vector![12.0, 2.0, 2.0]));
    }

    #[test]
    fn rotation_is_applied_before_translation() {
        let delta = TransformDelta::rotate(90.0, Vector3::z());
        let mut transform = Transform::identity().compose(&delta);
        transform.translation = vector![0.0, 0.0, 5.0];
        let p = transform.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(approx_eq(p.coords, vector![0.0, 1.0, 5.0]));
    }

    #[test]
    fn deltas_accumulate_instead_of_replacing() {
        let mut state = ModelTransform::default();
        state = apply_delta(&state, &TransformDelta::translate(1.0, 0.0, 0.0));
        state = apply_delta(&state, &TransformDelta::translate(0.5, 2.0, 0.0));
        state = apply_delta(&state, &TransformDelta::scale(2.0, 1.0, 1.0));
        state = apply_delta(&state, &TransformDelta::scale(3.0, 1.0, 1.0));
        assert!(approx_eq(state.local.translation, vector![1.5, 2.0, 0.0]));
        assert!(approx_eq(state.local.scale, vector![6.0, 1.0, 1.0]));
        assert_eq!(state.world, Transform::identity());
    }

    #[test]
    fn rotations_accumulate() {
        let mut state = ModelTransform::default();
        for _ in 0..4 {
            state = apply_delta(&state, &TransformDelta::rotate(45.0, Vector3::y()));
        }
        let p = state.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(approx_eq(p.coords, vector![-1.0, 0.0, 0.0]));
    }

    #[test]
    fn target_selects_group() {
        let state = ModelTransform { target: TransformTarget::World, ..Default::default() };
        let next = apply_delta(&state, &TransformDelta::translate(0.0, 0.0, -3.0));
        assert_eq!(next.local, Transform::identity());
        assert!(approx_eq(next.world.translation, vector![0.0, 0.0, -3.0]));
        // Input state is untouched.
        assert_eq!(state.world, Transform::identity());
    }

    #[test]
    fn effective_matrix_is_local_times_world() {
        let state = ModelTransform {
            local: Transform { translation: vector![1.0, 0.0, 0.0], ..Transform::identity() },
            world: Transform { scale: vector![2.0, 2.0, 2.0], ..Transform::identity() },
            target: TransformTarget::Local,
        };
        // World scale first, then local translation.
        let p = state.matrix().transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert!(approx_eq(p.coords, vector![3.0, 2.0, 2.0]));
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut state = ModelTransform { target: TransformTarget::World, ..Default::default() };
        state = apply_delta(&state, &TransformDelta::scale(4.0, 4.0, 4.0));
        state.reset();
        assert_eq!(state.matrix(), Matrix4::identity());
        assert_eq!(state.target, TransformTarget::World);
    }

    #[test]
    fn rotate_about_zero_axis_is_identity() {
        assert_eq!(TransformDelta::rotate(30.0, Vector3::zeros()), TransformDelta::default());
    }

    #[test]
    fn fit_unit_cube_maps_box_to_unit_range() {
        let min = vector![2.0, 0.0, -1.0];
        let max = vector![6.0, 2.0, 1.0];
        let m = Transform::fit_unit_cube(min, max).to_matrix();
        let lo = m.transform_point(&Point3::from(min));
        let hi = m.transform_point(&Point3::from(max));
        assert!(approx_eq(lo.coords, vector![-1.0, -0.5, -0.5]));
        assert!(approx_eq(hi.coords, vector![1.0, 0.5, 0.5]));
    }
}
