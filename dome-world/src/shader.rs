use web_sys::{WebGl2RenderingContext as GL, WebGlProgram, WebGlShader, WebGlUniformLocation};

use crate::error::ViewerError;
use crate::vertex::AttributeKind;

pub const VERTEX_SHADER: &str = r#"#version 300 es
    layout(location = 0) in vec3 a_Position;
    layout(location = 1) in vec2 a_UV;
    layout(location = 2) in vec3 a_Normal;

    out vec2 v_UV;
    out vec3 v_Normal;
    out vec4 v_VertPos;
    out vec3 v_LightDir;

    uniform mat4 u_ModelMatrix;
    uniform mat4 u_NormalMatrix;
    uniform mat4 u_GlobalRotateMatrix;
    uniform mat4 u_ViewMatrix;
    uniform mat4 u_ProjectionMatrix;
    uniform vec3 u_lightPos;

    void main() {
        vec4 position = vec4(a_Position, 1.0);
        gl_Position = u_ProjectionMatrix * u_ViewMatrix * u_GlobalRotateMatrix * u_ModelMatrix * position;
        v_UV = a_UV;
        v_Normal = normalize(vec3(u_NormalMatrix * vec4(a_Normal, 0.0)));
        v_VertPos = u_ModelMatrix * position;
        v_LightDir = normalize(u_lightPos - vec3(v_VertPos));
    }"#;

// u_lightPos is read in both stages, so float precision has to match the
// vertex stage default.
pub const FRAGMENT_SHADER: &str = r#"#version 300 es
    precision highp float;

    in vec2 v_UV;
    in vec3 v_Normal;
    in vec4 v_VertPos;
    in vec3 v_LightDir;

    out vec4 FragColor;

    uniform vec4 u_FragColor;
    uniform sampler2D u_Sampler0;
    uniform sampler2D u_Sampler1;
    uniform sampler2D u_Sampler2;
    uniform int u_whichTexture;
    uniform vec3 u_lightPos;
    uniform vec3 u_cameraPos;
    uniform vec3 u_lightColor;
    uniform bool u_lightOn;
    uniform bool u_normalVisualization;
    uniform bool u_spotlightOn;
    uniform vec3 u_spotlightDir;
    uniform float u_spotlightCutoff;

    void main() {
        vec3 N = normalize(v_Normal);
        if (u_normalVisualization) {
            FragColor = vec4((N + 1.0) / 2.0, 1.0);
            return;
        }

        vec4 base;
        if (u_whichTexture == -2) {
            base = u_FragColor;
        } else if (u_whichTexture == -1) {
            base = vec4(v_UV, 1.0, 1.0);
        } else if (u_whichTexture == 0) {
            base = texture(u_Sampler0, v_UV);
        } else if (u_whichTexture == 1) {
            base = texture(u_Sampler1, v_UV);
        } else if (u_whichTexture == 2) {
            base = texture(u_Sampler2, v_UV);
        } else {
            base = vec4(1.0, 0.2, 0.2, 1.0);
        }

        if (!u_lightOn) {
            FragColor = base;
            return;
        }

        vec3 L = normalize(v_LightDir);
        float nDotL = max(dot(N, L), 0.0);

        vec3 E = normalize(u_cameraPos - vec3(v_VertPos));
        vec3 R = reflect(-L, N);
        float specular = pow(max(dot(E, R), 0.0), 32.0);

        float spot = 1.0;
        if (u_spotlightOn) {
            vec3 lightToFrag = normalize(vec3(v_VertPos) - u_lightPos);
            float spotCos = dot(lightToFrag, normalize(u_spotlightDir));
            float cutoffCos = cos(u_spotlightCutoff);
            spot = spotCos < cutoffCos ? 0.0 : pow((spotCos - cutoffCos) / (1.0 - cutoffCos), 2.0);
        }

        vec3 ambient = base.rgb * 0.2;
        vec3 diffuse = base.rgb * nDotL * 0.7 * u_lightColor;
        vec3 spec = vec3(1.0) * specular * 0.3 * u_lightColor;
        FragColor = vec4(ambient + (diffuse + spec) * spot, base.a);
    }"#;

pub fn compile_shader(gl: &GL, shader_type: u32, source: &str) -> Result<WebGlShader, ViewerError> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| ViewerError::Shader("unable to create shader".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(ViewerError::Shader(gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}

pub fn link_program(
    gl: &GL,
    vert_shader: &WebGlShader,
    frag_shader: &WebGlShader,
) -> Result<WebGlProgram, ViewerError> {
    let program = gl
        .create_program()
        .ok_or_else(|| ViewerError::Shader("unable to create program".into()))?;
    gl.attach_shader(&program, vert_shader);
    gl.attach_shader(&program, frag_shader);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(ViewerError::Shader(gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

/// Attribute slots, fixed by the `layout(location = N)` qualifiers.
pub fn attribute_location(kind: AttributeKind) -> u32 {
    match kind {
        AttributeKind::Position => 0,
        AttributeKind::Uv => 1,
        AttributeKind::Normal => 2,
    }
}

/// Uniform locations, looked up once after linking. A uniform the driver
/// optimized away stays `None`; uploads to it are silently dropped by WebGL.
pub struct Uniforms {
    pub model: Option<WebGlUniformLocation>,
    pub normal: Option<WebGlUniformLocation>,
    pub global_rotate: Option<WebGlUniformLocation>,
    pub view: Option<WebGlUniformLocation>,
    pub projection: Option<WebGlUniformLocation>,
    pub frag_color: Option<WebGlUniformLocation>,
    pub which_texture: Option<WebGlUniformLocation>,
    pub samplers: [Option<WebGlUniformLocation>; 3],
    pub light_pos: Option<WebGlUniformLocation>,
    pub camera_pos: Option<WebGlUniformLocation>,
    pub light_color: Option<WebGlUniformLocation>,
    pub light_on: Option<WebGlUniformLocation>,
    pub normal_visualization: Option<WebGlUniformLocation>,
    pub spotlight_on: Option<WebGlUniformLocation>,
    pub spotlight_dir: Option<WebGlUniformLocation>,
    pub spotlight_cutoff: Option<WebGlUniformLocation>,
}

fn lookup(gl: &GL, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
    let location = gl.get_uniform_location(program, name);
    if location.is_none() {
        log::warn!("could not get {} uniform location", name);
    }
    location
}

pub struct ShaderProgram {
    pub program: WebGlProgram,
    pub uniforms: Uniforms,
}

impl ShaderProgram {
    pub fn new(gl: &GL) -> Result<Self, ViewerError> {
        let vert_shader = compile_shader(gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let frag_shader = compile_shader(gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(gl, &vert_shader, &frag_shader)?;
        gl.use_program(Some(&program));

        let uniforms = Uniforms {
            model: lookup(gl, &program, "u_ModelMatrix"),
            normal: lookup(gl, &program, "u_NormalMatrix"),
            global_rotate: lookup(gl, &program, "u_GlobalRotateMatrix"),
            view: lookup(gl, &program, "u_ViewMatrix"),
            projection: lookup(gl, &program, "u_ProjectionMatrix"),
            frag_color: lookup(gl, &program, "u_FragColor"),
            which_texture: lookup(gl, &program, "u_whichTexture"),
            // samplers are unused while every shape draws solid, so the
            // driver may strip them; don't warn
            samplers: [
                gl.get_uniform_location(&program, "u_Sampler0"),
                gl.get_uniform_location(&program, "u_Sampler1"),
                gl.get_uniform_location(&program, "u_Sampler2"),
            ],
            light_pos: lookup(gl, &program, "u_lightPos"),
            camera_pos: lookup(gl, &program, "u_cameraPos"),
            light_color: lookup(gl, &program, "u_lightColor"),
            light_on: lookup(gl, &program, "u_lightOn"),
            normal_visualization: lookup(gl, &program, "u_normalVisualization"),
            spotlight_on: lookup(gl, &program, "u_spotlightOn"),
            spotlight_dir: lookup(gl, &program, "u_spotlightDir"),
            spotlight_cutoff: lookup(gl, &program, "u_spotlightCutoff"),
        };

        // bind each sampler to the texture unit of the same index
        for (unit, location) in uniforms.samplers.iter().enumerate() {
            gl.uniform1i(location.as_ref(), unit as i32);
        }

        log::info!("shader program linked");
        Ok(Self { program, uniforms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_slots_match_layout_qualifiers() {
        for kind in AttributeKind::ALL {
            let qualifier = format!("layout(location = {})", attribute_location(kind));
            assert!(VERTEX_SHADER.contains(&qualifier), "missing {}", qualifier);
        }
    }

    #[test]
    fn fragment_shader_uses_lighting_constants() {
        assert!(FRAGMENT_SHADER.contains("* 0.2"));
        assert!(FRAGMENT_SHADER.contains("* 0.7"));
        assert!(FRAGMENT_SHADER.contains("* 0.3"));
        assert!(FRAGMENT_SHADER.contains("32.0"));
    }

    const PRECISIONS: [&str; 3] = ["lowp", "mediump", "highp"];

    /// Default float precision of a stage; vertex shaders start at highp.
    fn float_precision(source: &str, vertex_default: bool) -> Option<String> {
        source
            .lines()
            .map(str::trim)
            .find_map(|line| {
                let rest = line.strip_prefix("precision ")?.strip_suffix("float;")?;
                Some(rest.trim().to_string())
            })
            .or_else(|| vertex_default.then(|| "highp".to_string()))
    }

    /// `(name, type, explicit precision)` of every uniform declaration.
    fn uniforms(source: &str) -> Vec<(String, String, Option<String>)> {
        source
            .lines()
            .map(str::trim)
            .filter_map(|line| line.strip_prefix("uniform "))
            .map(|decl| {
                let tokens: Vec<&str> = decl.trim_end_matches(';').split_whitespace().collect();
                match tokens.as_slice() {
                    [p, ty, name] if PRECISIONS.contains(p) => {
                        (name.to_string(), ty.to_string(), Some(p.to_string()))
                    }
                    [ty, name] => (name.to_string(), ty.to_string(), None),
                    other => panic!("unexpected uniform declaration {:?}", other),
                }
            })
            .collect()
    }

    fn is_float_type(ty: &str) -> bool {
        ty == "float" || ty.starts_with("vec") || ty.starts_with("mat")
    }

    #[test]
    fn uniforms_shared_between_stages_agree_on_precision() {
        let vertex_default = float_precision(VERTEX_SHADER, true);
        let fragment_default = float_precision(FRAGMENT_SHADER, false);
        assert!(fragment_default.is_some(), "fragment stage needs a float precision");

        let vertex = uniforms(VERTEX_SHADER);
        let fragment = uniforms(FRAGMENT_SHADER);
        let mut shared = 0;
        for (name, ty, precision) in &vertex {
            let Some((_, frag_ty, frag_precision)) = fragment.iter().find(|(n, _, _)| n == name) else {
                continue;
            };
            shared += 1;
            assert_eq!(ty, frag_ty, "{} declared with different types", name);
            if is_float_type(ty) {
                let v = precision.clone().or_else(|| vertex_default.clone());
                let f = frag_precision.clone().or_else(|| fragment_default.clone());
                assert_eq!(v, f, "precision of {} differs between stages", name);
            }
        }
        assert!(shared > 0);
    }
}
