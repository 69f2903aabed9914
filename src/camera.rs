use glam::{Mat4, Vec2, Vec3, Vec4};
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::renderer::RaySource;
use crate::util::math::degree_to_radian;

/// Perspective camera that caches one world-space ray direction per pixel.
///
/// Directions are recomputed when the viewport or the view changes, never
/// during a render.
pub struct Camera {
    position: Vec3,
    forward: Vec3,
    up: Vec3,

    vertical_fov: f32,
    near_clip: f32,
    far_clip: f32,

    viewport_width: u32,
    viewport_height: u32,

    projection: Mat4,
    inverse_projection: Mat4,
    view: Mat4,
    inverse_view: Mat4,

    ray_directions: Vec<Vec3>,
}

impl Camera {
    /// `vertical_fov` is in degrees.
    pub fn new(vertical_fov: f32, near_clip: f32, far_clip: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            forward: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            vertical_fov,
            near_clip,
            far_clip,
            viewport_width: 0,
            viewport_height: 0,
            projection: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            ray_directions: Vec::new(),
        };
        camera.recalculate_view();
        camera
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize()
    }

    /// Adapt the cached projection and ray directions to a new viewport.
    ///
    /// No-op when the viewport already has these dimensions.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == self.viewport_width && height == self.viewport_height {
            return;
        }

        self.viewport_width = width;
        self.viewport_height = height;
        self.recalculate_projection();
        self.recalculate_ray_directions();
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.recalculate_view();
        self.recalculate_ray_directions();
    }

    fn recalculate_projection(&mut self) {
        let aspect = self.viewport_width as f32 / self.viewport_height as f32;
        self.projection = Mat4::perspective_rh(
            degree_to_radian(self.vertical_fov),
            aspect,
            self.near_clip,
            self.far_clip,
        );
        self.inverse_projection = self.projection.inverse();
    }

    fn recalculate_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.forward, self.up);
        self.inverse_view = self.view.inverse();
    }

    fn recalculate_ray_directions(&mut self) {
        let width = self.viewport_width;
        let height = self.viewport_height;

        self.ray_directions.clear();
        self.ray_directions.reserve((width * height) as usize);

        for y in 0..height {
            for x in 0..width {
                let coord =
                    Vec2::new(x as f32 / width as f32, y as f32 / height as f32) * 2.0 - 1.0;

                // Unproject through the pixel; image rows grow downward
                // while clip space y grows upward, hence the flip.
                let target = self.inverse_projection * Vec4::new(coord.x, -coord.y, 1.0, 1.0);
                let direction =
                    self.inverse_view * (target.truncate() / target.w).normalize().extend(0.0);
                self.ray_directions.push(direction.truncate());
            }
        }
    }
}

impl RaySource for Camera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn ray_directions(&self) -> &[Vec3] {
        &self.ray_directions
    }
}

/// Keyboard movement for the demo camera, driven by winit window events.
pub struct CameraController {
    pub speed: f32,
}

impl CameraController {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Returns true when the event moved the camera.
    pub fn process_events(&self, camera: &mut Camera, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } if *state == ElementState::Pressed => {
                let forward = camera.forward();
                let right = camera.right();
                let offset = match keycode {
                    VirtualKeyCode::W => forward * self.speed,
                    VirtualKeyCode::S => -forward * self.speed,
                    VirtualKeyCode::A => -right * self.speed,
                    VirtualKeyCode::D => right * self.speed,
                    _ => return false,
                };
                camera.translate(offset);
                tracing::debug!("camera moved to {:?}", camera.position());
                true
            }
            _ => false,
        }
    }
}
