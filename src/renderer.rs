use glam::{Vec3, Vec4};
use thiserror::Error;

use crate::scene::Scene;
use crate::util::color::pack_rgba;

/// One ray per pixel, rebuilt for every pixel of a frame.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    /// Not required to be normalized.
    pub direction: Vec3,
}

/// Single infinite directional light applied to every hit.
#[derive(Debug, Clone)]
pub struct Lighting {
    pub direction: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-1.0, -1.0, -1.0).normalize(),
        }
    }
}

/// Camera as seen by the renderer: a fixed origin plus one precomputed
/// ray direction per pixel, indexed by `x + y * width` in row-major order.
pub trait RaySource {
    fn position(&self) -> Vec3;
    fn ray_directions(&self) -> &[Vec3];
}

/// Presentable image the renderer publishes finished frames to.
///
/// `set_data` replaces the entire contents with a packed-pixel buffer
/// matching the current dimensions.
pub trait DisplayImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn resize(&mut self, width: u32, height: u32);
    fn set_data(&mut self, pixels: &[u32]);
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("camera supplies {actual} ray directions for a {expected} pixel target")]
    RayCountMismatch { expected: usize, actual: usize },
}

/// Shade a single ray against the scene.
///
/// Scans every sphere for the nearest intersection and lights it with the
/// configured directional light. Misses and empty scenes come back as
/// opaque black. Output channels are not clamped here; callers clamp
/// before packing.
pub fn trace_ray(scene: &Scene, ray: &Ray, lighting: &Lighting) -> Vec4 {
    if scene.spheres.is_empty() {
        return Vec4::new(0.0, 0.0, 0.0, 1.0);
    }

    let mut closest_sphere: Option<usize> = None;
    let mut hit_distance = f32::INFINITY;

    for (index, sphere) in scene.spheres.iter().enumerate() {
        let origin = ray.origin - sphere.position;

        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * origin.dot(ray.direction);
        let c = origin.dot(origin) - sphere.radius * sphere.radius;

        // Quadratic formula discriminant
        // b^2 - 4ac
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            continue;
        }

        // Near root only; the far root is where the ray exits the sphere.
        // The distance is not clamped, so a sphere behind the origin can
        // still register as the closest hit.
        let closest_t = (-b - discriminant.sqrt()) / (2.0 * a);
        if closest_t < hit_distance {
            hit_distance = closest_t;
            closest_sphere = Some(index);
        }
    }

    let sphere = match closest_sphere {
        Some(index) => &scene.spheres[index],
        None => return Vec4::new(0.0, 0.0, 0.0, 1.0),
    };

    let origin = ray.origin - sphere.position;
    let hit_point = origin + ray.direction * hit_distance;
    // hit_point is sphere-centered, so it doubles as the outward normal.
    let normal = hit_point.normalize();

    let intensity = normal.dot(-lighting.direction).max(0.0); // == cos(angle)

    let color = sphere.albedo * intensity;
    Vec4::new(color.x, color.y, color.z, 1.0)
}

/// Casts one ray per pixel and publishes the finished frame to a
/// [`DisplayImage`].
///
/// Owns the packed pixel buffer; `on_resize` is the only place it is
/// reallocated.
pub struct Renderer<I> {
    image: I,
    pixels: Vec<u32>,
    pub lighting: Lighting,
}

impl<I: DisplayImage> Renderer<I> {
    pub fn new(image: I) -> Self {
        let pixels = vec![0; (image.width() * image.height()) as usize];
        Self {
            image,
            pixels,
            lighting: Lighting::default(),
        }
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn pixel_data(&self) -> &[u32] {
        &self.pixels
    }

    /// Match the target image and pixel buffer to the requested size.
    ///
    /// No-op when the image already has exactly these dimensions.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if self.image.width() == width && self.image.height() == height {
            return;
        }

        self.image.resize(width, height);
        self.pixels = vec![0; (width * height) as usize];
    }

    /// Render the scene through the camera into the pixel buffer, then
    /// publish the whole buffer to the display image in one step.
    ///
    /// Fails up front, before any pixel is written, when the camera's ray
    /// directions do not cover the current resolution.
    pub fn render(&mut self, scene: &Scene, camera: &impl RaySource) -> Result<(), RenderError> {
        let directions = camera.ray_directions();
        if directions.len() != self.pixels.len() {
            return Err(RenderError::RayCountMismatch {
                expected: self.pixels.len(),
                actual: directions.len(),
            });
        }

        let width = self.image.width();
        let height = self.image.height();
        let mut ray = Ray {
            origin: camera.position(),
            direction: Vec3::ZERO,
        };

        for y in 0..height {
            for x in 0..width {
                let index = (x + y * width) as usize;
                ray.direction = directions[index];

                let color = trace_ray(scene, &ray, &self.lighting);
                let color = color.clamp(Vec4::ZERO, Vec4::ONE);
                self.pixels[index] = pack_rgba(color);
            }
        }

        self.image.set_data(&self.pixels);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Sphere;

    const OPAQUE_BLACK: u32 = 0xff00_0000;

    struct TestImage {
        width: u32,
        height: u32,
        data: Vec<u32>,
        resize_calls: usize,
        set_data_calls: usize,
    }

    impl TestImage {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                data: Vec::new(),
                resize_calls: 0,
                set_data_calls: 0,
            }
        }
    }

    impl DisplayImage for TestImage {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.width = width;
            self.height = height;
            self.resize_calls += 1;
        }

        fn set_data(&mut self, pixels: &[u32]) {
            self.data = pixels.to_vec();
            self.set_data_calls += 1;
        }
    }

    struct TestCamera {
        position: Vec3,
        directions: Vec<Vec3>,
    }

    impl RaySource for TestCamera {
        fn position(&self) -> Vec3 {
            self.position
        }

        fn ray_directions(&self) -> &[Vec3] {
            &self.directions
        }
    }

    fn single_pixel_camera(position: Vec3, direction: Vec3) -> TestCamera {
        TestCamera {
            position,
            directions: vec![direction],
        }
    }

    fn head_on_sphere(albedo: glam::Vec3) -> Scene {
        Scene {
            spheres: vec![Sphere {
                position: Vec3::ZERO,
                radius: 1.0,
                albedo,
            }],
        }
    }

    #[test]
    fn empty_scene_renders_opaque_black() {
        let mut renderer = Renderer::new(TestImage::new(4, 3));
        let camera = TestCamera {
            position: Vec3::ZERO,
            directions: vec![Vec3::new(0.0, 0.0, -1.0); 12],
        };

        renderer.render(&Scene::default(), &camera).unwrap();

        assert!(renderer.pixel_data().iter().all(|&p| p == OPAQUE_BLACK));
        assert_eq!(renderer.image().data, renderer.pixel_data());
        assert_eq!(renderer.image().set_data_calls, 1);
    }

    #[test]
    fn head_on_hit_shades_with_albedo_and_light() {
        // Camera at (0,0,3) looking down -z at a unit sphere: the ray
        // enters at (0,0,1) with normal (0,0,1), so the intensity is
        // dot((0,0,1), normalize(1,1,1)) = 1/sqrt(3).
        let mut renderer = Renderer::new(TestImage::new(1, 1));
        let camera = single_pixel_camera(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));

        renderer
            .render(&head_on_sphere(glam::Vec3::new(1.0, 1.0, 0.0)), &camera)
            .unwrap();

        let expected = ((1.0f32 / 3.0f32.sqrt()) * 255.0) as u32;
        let pixel = renderer.pixel_data()[0];
        assert_eq!(pixel & 0xff, expected);
        assert_eq!((pixel >> 8) & 0xff, expected);
        assert_eq!((pixel >> 16) & 0xff, 0);
        assert_eq!(pixel >> 24, 255);
    }

    #[test]
    fn channels_above_one_clamp_instead_of_wrapping() {
        let mut renderer = Renderer::new(TestImage::new(1, 1));
        let camera = single_pixel_camera(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));

        renderer
            .render(&head_on_sphere(glam::Vec3::new(10.0, 10.0, 10.0)), &camera)
            .unwrap();

        let pixel = renderer.pixel_data()[0];
        assert_eq!(pixel & 0xff, 255);
        assert_eq!((pixel >> 8) & 0xff, 255);
        assert_eq!((pixel >> 16) & 0xff, 255);
    }

    #[test]
    fn equal_distances_keep_the_first_sphere() {
        let mut renderer = Renderer::new(TestImage::new(1, 1));
        let camera = single_pixel_camera(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));

        let red = Sphere {
            position: Vec3::ZERO,
            radius: 1.0,
            albedo: glam::Vec3::new(1.0, 0.0, 0.0),
        };
        let green = Sphere {
            albedo: glam::Vec3::new(0.0, 1.0, 0.0),
            ..red.clone()
        };
        let scene = Scene {
            spheres: vec![red, green],
        };

        renderer.render(&scene, &camera).unwrap();

        let pixel = renderer.pixel_data()[0];
        assert!(pixel & 0xff > 0);
        assert_eq!((pixel >> 8) & 0xff, 0);
    }

    #[test]
    fn mismatched_ray_count_is_rejected_before_writing() {
        let mut renderer = Renderer::new(TestImage::new(2, 2));
        let camera = single_pixel_camera(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let result = renderer.render(&Scene::default(), &camera);

        assert!(matches!(
            result,
            Err(RenderError::RayCountMismatch {
                expected: 4,
                actual: 1
            })
        ));
        assert!(renderer.pixel_data().iter().all(|&p| p == 0));
        assert_eq!(renderer.image().set_data_calls, 0);
    }

    #[test]
    fn resize_allocates_exactly_width_times_height() {
        let mut renderer = Renderer::new(TestImage::new(1, 1));

        renderer.on_resize(7, 5);

        assert_eq!(renderer.pixel_data().len(), 35);
        assert_eq!(renderer.image().resize_calls, 1);
    }

    #[test]
    fn resize_to_same_dimensions_is_a_no_op() {
        let mut renderer = Renderer::new(TestImage::new(1, 1));

        renderer.on_resize(7, 5);
        renderer.on_resize(7, 5);

        assert_eq!(renderer.image().resize_calls, 1);
    }

    #[test]
    fn misses_shade_as_opaque_black() {
        let scene = head_on_sphere(glam::Vec3::ONE);
        let ray = Ray {
            origin: Vec3::new(0.0, 5.0, 3.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };

        let color = trace_ray(&scene, &ray, &Lighting::default());

        assert_eq!(color, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn negative_distance_hits_are_not_culled() {
        // A sphere centered behind the ray origin intersects at a negative
        // distance, which still beats an infinite running minimum.
        let scene = Scene {
            spheres: vec![Sphere {
                position: Vec3::new(0.0, 0.0, 5.0),
                radius: 1.0,
                albedo: glam::Vec3::ONE,
            }],
        };
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 3.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };

        let color = trace_ray(&scene, &ray, &Lighting::default());

        assert_ne!(color.truncate(), glam::Vec3::ZERO);
    }

    #[test]
    fn lighting_direction_is_configurable() {
        // Light shining straight down -z onto a front-facing normal gives
        // full intensity, so the hit shades with the raw albedo.
        let scene = head_on_sphere(glam::Vec3::new(0.25, 0.5, 0.75));
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 3.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let lighting = Lighting {
            direction: Vec3::new(0.0, 0.0, -1.0),
        };

        let color = trace_ray(&scene, &ray, &lighting);

        assert!((color.truncate() - glam::Vec3::new(0.25, 0.5, 0.75)).length() < 1e-6);
    }
}
