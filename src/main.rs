use sphere_tracer_lib::{
    application::{AppState, Application, Layer, Screen},
    camera::{Camera, CameraController},
    pipeline::BlitPipeline,
    renderer::Renderer,
    scene::{Scene, Sphere},
    texture::Texture,
};
use wgpu::{
    CommandEncoderDescriptor, RenderPassColorAttachment, RenderPassDescriptor, SurfaceError,
    TextureViewDescriptor,
};
use winit::{dpi::PhysicalSize, event::Event};

struct SphereTracer {
    camera: Camera,
    camera_controller: CameraController,
    scene: Scene,
    renderer: Renderer<Texture>,
    pipeline: BlitPipeline,
}

fn sample_scene() -> Scene {
    Scene {
        spheres: vec![
            Sphere {
                position: glam::Vec3::ZERO,
                radius: 0.5,
                albedo: glam::Vec3::new(1.0, 0.0, 1.0),
            },
            Sphere {
                position: glam::Vec3::new(1.0, 0.0, -5.0),
                radius: 1.5,
                albedo: glam::Vec3::new(0.2, 0.3, 1.0),
            },
        ],
    }
}

impl Layer for SphereTracer {
    type LayerErr = ();

    fn start(screen: &mut Screen, _app: &AppState) -> Self {
        let size = screen.window().inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let texture = Texture::new(screen.device.clone(), screen.queue.clone(), width, height);
        let pipeline = BlitPipeline::new(&screen.device, screen.config.format, &texture);

        let mut camera = Camera::new(45.0, 0.1, 100.0);
        camera.on_resize(width, height);

        Self {
            camera,
            camera_controller: CameraController::new(0.2),
            scene: sample_scene(),
            renderer: Renderer::new(texture),
            pipeline,
        }
    }

    fn process_event(&mut self, event: &Event<()>, _screen: &mut Screen) {
        if let Event::WindowEvent { event, .. } = event {
            self.camera_controller
                .process_events(&mut self.camera, event);
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>, _app: &AppState, screen: &mut Screen) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.camera.on_resize(new_size.width, new_size.height);
        self.renderer.on_resize(new_size.width, new_size.height);
        self.pipeline
            .rebind_texture(&screen.device, self.renderer.image());
    }

    fn update(&mut self, app: &AppState, _screen: &mut Screen) {
        tracing::trace!("frame time {:.3} ms", app.elapsed_time() * 1000.0);
    }

    fn render(&mut self, _app: &AppState, screen: &mut Screen) -> Result<(), SurfaceError> {
        if let Err(error) = self.renderer.render(&self.scene, &self.camera) {
            tracing::error!("skipping frame: {error}");
        }

        let output = screen.surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = screen
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            self.pipeline.draw(&mut render_pass);
        }

        screen.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn shutdown(&mut self, _app: &AppState, _screen: &mut Screen) -> Result<(), Self::LayerErr> {
        tracing::info!("exiting");
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt::init();
    pollster::block_on(Application::<SphereTracer>::init());
}
