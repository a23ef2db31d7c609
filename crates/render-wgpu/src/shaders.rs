/// WGSL shader for the particle sprites.
///
/// Each instance is one particle; four vertices per instance form a quad
/// drawn as a triangle strip. `params` holds
/// `(size, size_attenuation, viewport_width, viewport_height)`.
pub const POINTS_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var mask_texture: texture_2d<f32>;
@group(1) @binding(1)
var mask_sampler: sampler;

struct ParticleInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec3<f32>,
};

@vertex
fn vs_points(@builtin(vertex_index) vertex_index: u32, particle: ParticleInput) -> VertexOutput {
    var corners = array<vec2<f32>, 4>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>( 0.5, -0.5),
        vec2<f32>(-0.5,  0.5),
        vec2<f32>( 0.5,  0.5),
    );
    let corner = corners[vertex_index];
    let size = uniforms.params.x;

    var out: VertexOutput;
    if (uniforms.params.y > 0.5) {
        // World-space quad: shrinks with distance.
        let offset = uniforms.camera_right.xyz * corner.x + uniforms.camera_up.xyz * corner.y;
        out.clip_position = uniforms.view_proj * vec4<f32>(particle.position + offset * size, 1.0);
    } else {
        // Screen-space quad: `size` is in pixels.
        let center = uniforms.view_proj * vec4<f32>(particle.position, 1.0);
        let ndc_offset = corner * size * 2.0 / uniforms.params.zw;
        out.clip_position = center + vec4<f32>(ndc_offset * center.w, 0.0, 0.0);
    }
    out.uv = vec2<f32>(corner.x + 0.5, 0.5 - corner.y);
    out.color = particle.color;
    return out;
}

@fragment
fn fs_points(in: VertexOutput) -> @location(0) vec4<f32> {
    let mask = textureSample(mask_texture, mask_sampler, in.uv).g;
    return vec4<f32>(in.color, mask);
}
"#;
