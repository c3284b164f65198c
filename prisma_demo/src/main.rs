//! Render a Mandelbrot fractal off-screen and write it to a PPM file.
//!
//! Demonstrates the full toolkit flow: surfaceless GL context → backend →
//! framebuffer → program → uniforms → draw → readback.

use std::error::Error;
use std::ffi::CString;
use std::fs::File;
use std::io::Write;

use glow::HasContext;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextAttributesBuilder, NotCurrentContext, PossiblyCurrentContext};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use raw_window_handle::HasDisplayHandle;
use winit::event_loop::EventLoop;

use prisma_gpu::gpu_info;
use prisma_gpu::prisma::{Context, Framebuffer, PixelType, Program};
use prisma_gpu_backend_opengl::OpenGlBackend;

const WIDTH: usize = 800;
const HEIGHT: usize = 600;

/// Vertex stage: fullscreen triangle from the vertex index, mapping the
/// viewport into the complex plane through the fractal uniforms.
const MANDELBROT_VERTEX: &str = "\
#version 330 core
uniform vec2 offset;
uniform float zoom;
uniform float width_ratio;

out vec2 pos;

void main(void) {
    vec2 corner = vec2(float((gl_VertexID << 1) & 2), float(gl_VertexID & 2));
    vec2 ndc = corner * 2.0 - 1.0;
    pos = vec2(ndc.x * width_ratio / zoom + offset.x,
               ndc.y / zoom + offset.y);
    gl_Position = vec4(ndc, 0.0, 1.0);
}
";

/// Fragment stage: escape-time iteration of z -> z^2 + c.
const MANDELBROT_FRAGMENT: &str = "\
#version 330 core
in vec2 pos;
out vec4 frag_color;

void main(void) {
    float k;
    float r = 0.0;
    float i = 0.0;
    float a;
    float b;
    for (k = 0.0; k < 1.0; k += 0.005) {
        a = r * r - i * i + pos.x;
        b = 2.0 * r * i + pos.y;
        if ((a * a + b * b) > 4.0) {
            break;
        }
        r = a;
        i = b;
    }
    frag_color = vec4(k, 3.0 * sin(k), sin(k * 3.141 / 2.0), 1.0);
}
";

/// Everything that must stay alive while the GL context is in use
struct GlEnv {
    gl: Option<glow::Context>,
    display: Display,
    _context: PossiblyCurrentContext,
    _event_loop: EventLoop<()>,
}

/// Create a surfaceless EGL context and a glow handle for it
fn create_gl() -> Result<GlEnv, Box<dyn Error>> {
    let event_loop = EventLoop::<()>::new()?;
    let raw_display = event_loop.display_handle()?.as_raw();
    let display = unsafe { Display::new(raw_display, DisplayApiPreference::Egl)? };

    let template = ConfigTemplateBuilder::new().build();
    let config = unsafe { display.find_configs(template)? }
        .next()
        .ok_or("no GL config available")?;

    let attrs = ContextAttributesBuilder::new().build(None);
    let not_current = unsafe { display.create_context(&config, &attrs)? };
    // `make_current_surfaceless` lives on the concrete per-backend context, not
    // the top-level enum; we requested EGL above, so unwrap that variant.
    let context = match not_current {
        NotCurrentContext::Egl(ctx) => PossiblyCurrentContext::Egl(ctx.make_current_surfaceless()?),
        _ => return Err("expected an EGL context".into()),
    };

    let gl = unsafe {
        glow::Context::from_loader_function(|name| {
            let name = CString::new(name).unwrap();
            display.get_proc_address(&name)
        })
    };
    Ok(GlEnv {
        gl: Some(gl),
        display,
        _context: context,
        _event_loop: event_loop,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut env = create_gl()?;
    let gl = env.gl.take().ok_or("GL handle already taken")?;
    let display = &env.display;

    // a second glow handle over the same context for the raw draw call;
    // the first one is consumed by the backend
    let gl_draw = unsafe {
        glow::Context::from_loader_function(|name| {
            let name = CString::new(name).unwrap();
            display.get_proc_address(&name)
        })
    };

    let ctx = Context::new(Box::new(OpenGlBackend::new(gl)?));
    let info = ctx.hardware_info();
    gpu_info!("prisma::demo", "Rendering on {} ({})", info.renderer, info.version);

    // Create framebuffer object with a float RGB texture attached
    let fbo = Framebuffer::with_texture(&ctx, &[WIDTH, HEIGHT, 3], PixelType::F32)?;
    fbo.bind()?;

    // Initialise the shader program
    let program = Program::from_sources(&ctx, Some(MANDELBROT_VERTEX), Some(MANDELBROT_FRAGMENT))?;
    program.bind()?;

    // Setup the Mandelbrot fractal parameters
    program.set("offset", [-1.0f32, 0.0])?;
    program.set("width_ratio", WIDTH as f32 / HEIGHT as f32)?;
    program.set("zoom", 2.0f32)?;

    // Draw a fullscreen triangle on the framebuffer
    unsafe {
        gl_draw.viewport(0, 0, WIDTH as i32, HEIGHT as i32);
        gl_draw.clear_color(0.0, 0.0, 0.0, 1.0);
        gl_draw.clear(glow::COLOR_BUFFER_BIT);

        let vao = gl_draw.create_vertex_array().map_err(|e| format!("VAO: {}", e))?;
        gl_draw.bind_vertex_array(Some(vao));
        gl_draw.draw_arrays(glow::TRIANGLES, 0, 3);
        gl_draw.bind_vertex_array(None);
        gl_draw.delete_vertex_array(vao);
        gl_draw.finish();
    }

    program.unbind();

    // Copy the data from the graphics card to system memory
    let pixels = fbo.read_pixels_f32()?;
    fbo.unbind();

    let (min, max) = pixels
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });
    gpu_info!("prisma::demo", "Read back {} components (range {:.3} to {:.3})",
        pixels.len(), min, max);

    write_ppm("mandelbrot.ppm", &pixels)?;
    gpu_info!("prisma::demo", "Wrote mandelbrot.ppm");

    Ok(())
}

/// Write bottom-to-top float RGB data as a top-down binary PPM
fn write_ppm(path: &str, pixels: &[f32]) -> Result<(), Box<dyn Error>> {
    let mut file = File::create(path)?;
    write!(file, "P6\n{} {}\n255\n", WIDTH, HEIGHT)?;

    let mut row = Vec::with_capacity(WIDTH * 3);
    for y in (0..HEIGHT).rev() {
        row.clear();
        let line = &pixels[y * WIDTH * 3..(y + 1) * WIDTH * 3];
        row.extend(line.iter().map(|v| (v.clamp(0.0, 1.0) * 255.0) as u8));
        file.write_all(&row)?;
    }
    Ok(())
}
