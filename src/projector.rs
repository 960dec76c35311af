use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::propagate::ScenePosition;

/// Pixel rectangle the scene is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width over height, or `None` when the rectangle is empty or too
    /// thin to build a projection for.
    pub fn aspect(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let aspect = self.width / self.height;
        (aspect.is_finite() && aspect > f64::EPSILON && aspect.recip() > f64::EPSILON)
            .then_some(aspect)
    }

    /// Zero-sized viewports are accepted and draw nothing.
    pub fn is_valid(&self) -> bool {
        let size_ok = |v: f64| v.is_finite() && v >= 0.0;
        size_ok(self.width) && size_ok(self.height) && (self.is_empty() || self.aspect().is_some())
    }
}

/// Perspective camera looking at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Combined view-projection for `viewport`. Clip space follows the
    /// OpenGL convention, depth in [-1, 1]. A degenerate viewport gets a
    /// square aspect; [`project`] hides everything in it anyway.
    pub fn transform(&self, viewport: &Viewport) -> CameraTransform {
        let aspect = viewport.aspect().unwrap_or(1.0);
        let projection = Perspective3::new(aspect, self.fov_y_deg.to_radians(), self.near, self.far);
        let view = Isometry3::look_at_rh(&self.eye, &self.target, &self.up);
        CameraTransform(projection.as_matrix() * view.to_homogeneous())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform(pub Matrix4<f64>);

/// Where a label goes this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LabelPlacement {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

impl LabelPlacement {
    pub const HIDDEN: LabelPlacement = LabelPlacement {
        x: 0.0,
        y: 0.0,
        visible: false,
    };
}

/// Project a scene position to viewport pixels.
///
/// Screen y grows downward. The label is visible only when the normalized
/// depth lies in [-1, 1], which culls points behind the camera and outside
/// the near/far range.
pub fn project(
    position: &ScenePosition,
    transform: &CameraTransform,
    viewport: &Viewport,
) -> LabelPlacement {
    if viewport.aspect().is_none() {
        return LabelPlacement::HIDDEN;
    }

    let clip = transform.0 * Vector4::new(position.x, position.y, position.z, 1.0);
    if clip.w == 0.0 || !clip.w.is_finite() {
        return LabelPlacement::HIDDEN;
    }
    let ndc = clip.xyz() / clip.w;
    if !ndc.iter().all(|c| c.is_finite()) {
        return LabelPlacement::HIDDEN;
    }

    LabelPlacement {
        x: viewport.x + (ndc.x + 1.0) * 0.5 * viewport.width,
        y: viewport.y + (1.0 - ndc.y) * 0.5 * viewport.height,
        visible: (-1.0..=1.0).contains(&ndc.z),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn origin_projects_to_viewport_center() {
        let vp = viewport();
        let placement = project(&Vector3::zeros(), &Camera::default().transform(&vp), &vp);
        assert!(placement.visible);
        assert_relative_eq!(placement.x, 400.0, epsilon = 1e-9);
        assert_relative_eq!(placement.y, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn screen_y_grows_downward() {
        let vp = viewport();
        let transform = Camera::default().transform(&vp);
        let above = project(&Vector3::new(0.0, 1.0, 0.0), &transform, &vp);
        let right = project(&Vector3::new(1.0, 0.0, 0.0), &transform, &vp);
        assert!(above.y < 300.0);
        assert!(right.x > 400.0);
    }

    #[test]
    fn viewport_offset_shifts_pixels() {
        let vp = Viewport {
            x: 100.0,
            y: 50.0,
            ..viewport()
        };
        let placement = project(&Vector3::zeros(), &Camera::default().transform(&vp), &vp);
        assert_relative_eq!(placement.x, 500.0, epsilon = 1e-9);
        assert_relative_eq!(placement.y, 350.0, epsilon = 1e-9);
    }

    #[test]
    fn behind_camera_and_beyond_far_plane_are_hidden() {
        let vp = viewport();
        let transform = Camera::default().transform(&vp);
        assert!(!project(&Vector3::new(0.0, 0.0, 10.0), &transform, &vp).visible);
        assert!(!project(&Vector3::new(0.0, 0.0, -2000.0), &transform, &vp).visible);
        assert!(!project(&Vector3::new(0.0, 0.0, 4.95), &transform, &vp).visible);
    }

    #[test]
    fn empty_viewport_is_never_visible() {
        let vp = Viewport::new(0.0, 600.0);
        let transform = Camera::default().transform(&viewport());
        assert_eq!(project(&Vector3::zeros(), &transform, &vp), LabelPlacement::HIDDEN);
    }

    #[rstest]
    #[case(1e-20, 600.0)]
    #[case(800.0, 1e-300)]
    #[case(1e300, 1e-300)]
    fn sliver_viewport_falls_back_and_hides(#[case] width: f64, #[case] height: f64) {
        let vp = Viewport::new(width, height);
        assert!(!vp.is_empty());
        assert_eq!(vp.aspect(), None);
        assert!(!vp.is_valid());

        let transform = Camera::default().transform(&vp);
        assert_eq!(transform, Camera::default().transform(&Viewport::new(1.0, 1.0)));
        assert_eq!(project(&Vector3::zeros(), &transform, &vp), LabelPlacement::HIDDEN);
    }

    #[rstest]
    #[case(Viewport::new(0.0, 0.0), true)]
    #[case(Viewport::new(0.0, 600.0), true)]
    #[case(Viewport::new(800.0, 600.0), true)]
    #[case(Viewport::new(-1.0, 600.0), false)]
    #[case(Viewport::new(f64::NAN, 600.0), false)]
    #[case(Viewport::new(800.0, f64::INFINITY), false)]
    fn viewport_validity(#[case] vp: Viewport, #[case] valid: bool) {
        assert_eq!(vp.is_valid(), valid);
    }

    #[rstest]
    #[case(Point3::new(0.0, 0.0, 5.0))]
    #[case(Point3::new(3.0, 2.0, -4.0))]
    #[case(Point3::new(-1.2, 0.4, 0.3))]
    #[case(Point3::new(0.0, 25.0, 0.1))]
    fn visibility_tracks_depth_range(#[case] eye: Point3<f64>) {
        let vp = viewport();
        let camera = Camera {
            eye,
            ..Camera::default()
        };
        let transform = camera.transform(&vp);
        for i in -20..=20 {
            for j in -20..=20 {
                let p = Vector3::new(i as f64 * 0.7, j as f64 * 0.7, (i * j) as f64 * 0.05);
                let clip = transform.0 * Vector4::new(p.x, p.y, p.z, 1.0);
                let depth = clip.z / clip.w;
                let placement = project(&p, &transform, &vp);
                if !(-1.0..=1.0).contains(&depth) {
                    assert!(!placement.visible);
                } else {
                    assert!(placement.visible);
                }
            }
        }
    }
}
