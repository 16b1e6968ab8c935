use crate::backend::{ShaderUniform, UniformType};

/// Transform matrices the engine sets itself; never reported as material uniforms.
pub const ENGINE_MATRICES: &[&str] = &[
    "lumen_ModelViewMatrix",
    "lumen_ProjectionMatrix",
    "lumen_ModelViewProjectionMatrix",
];

const PRECISION_QUALIFIERS: &[&str] = &["lowp", "mediump", "highp"];

/// Collects the `uniform` declarations of one or more GLSL stages.
///
/// Declarations are returned in source order, stages in argument order. A name declared by
/// several stages is reported once (first declaration wins). Uniform blocks, unsupported types
/// and [`ENGINE_MATRICES`] are skipped.
pub fn reflect_uniforms(stages: &[&str]) -> Vec<ShaderUniform> {
    let mut out: Vec<ShaderUniform> = Vec::new();

    for source in stages {
        let code = strip_comments(source);
        for statement in code.split(';') {
            for uniform in parse_statement(statement) {
                if out.iter().any(|u| u.name == uniform.name) {
                    continue;
                }
                out.push(uniform);
            }
        }
    }

    out
}

fn parse_type(token: &str) -> Option<UniformType> {
    Some(match token {
        "float" => UniformType::Float,
        "vec2" => UniformType::Vec2,
        "vec3" => UniformType::Vec3,
        "vec4" => UniformType::Vec4,
        "mat4" => UniformType::Mat4,
        "sampler2D" => UniformType::Sampler2d,
        "samplerCube" => UniformType::SamplerCube,
        _ => return None,
    })
}

fn parse_statement(statement: &str) -> Vec<ShaderUniform> {
    // Preprocessor lines never terminate with ';' so they leak into the next statement.
    let code: Vec<&str> = statement
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect();
    let code = code.join(" ");

    let mut tokens = code
        .split(|c: char| c.is_whitespace() || c == '}')
        .filter(|t| !t.is_empty());

    if !tokens.by_ref().any(|t| t == "uniform") {
        return Vec::new();
    }

    let Some(mut ty) = tokens.next() else { return Vec::new() };
    while PRECISION_QUALIFIERS.contains(&ty) {
        match tokens.next() {
            Some(next) => ty = next,
            None => return Vec::new(),
        }
    }

    let Some(kind) = parse_type(ty) else {
        log::trace!("shader reflection: skipping uniform of type {ty:?}");
        return Vec::new();
    };

    let declarators: String = tokens.collect();
    if declarators.contains('{') {
        return Vec::new();
    }
    let declarators = strip_parens(&declarators);

    declarators
        .split(',')
        .filter_map(|d| parse_declarator(d, kind))
        .collect()
}

fn parse_declarator(declarator: &str, kind: UniformType) -> Option<ShaderUniform> {
    let declarator = declarator.split('=').next().unwrap_or_default();

    let (name, array_size) = match declarator.split_once('[') {
        Some((name, rest)) => {
            let len = rest.trim_end_matches(']');
            (name, len.parse::<u32>().unwrap_or(1).max(1))
        }
        None => (declarator, 1),
    };

    if name.is_empty() {
        return None;
    }
    if kind == UniformType::Mat4 && ENGINE_MATRICES.contains(&name) {
        return None;
    }

    Some(ShaderUniform {
        name: name.to_owned(),
        kind,
        array_size,
    })
}

/// Drops parenthesized text so initializers like `vec2(0.0, 1.0)` cannot split declarators.
fn strip_parens(code: &str) -> String {
    let mut depth = 0u32;
    code.chars()
        .filter(|&c| match c {
            '(' => {
                depth += 1;
                false
            }
            ')' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    loop {
        let line = rest.find("//");
        let block = rest.find("/*");
        let start = match (line, block) {
            (None, None) => break,
            (Some(l), Some(b)) => l.min(b),
            (Some(l), None) => l,
            (None, Some(b)) => b,
        };

        out.push_str(&rest[..start]);
        let comment = &rest[start..];

        if comment.starts_with("//") {
            match comment.find('\n') {
                Some(end) => rest = &comment[end..],
                None => return out,
            }
        } else {
            out.push(' ');
            match comment[2..].find("*/") {
                Some(end) => rest = &comment[2 + end + 2..],
                None => return out,
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(u: &[ShaderUniform]) -> Vec<&str> {
        u.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn collects_scalars_vectors_and_samplers() {
        let vs = "
            #version 330
            uniform mat4 lumen_ModelViewProjectionMatrix;
            uniform vec4 tint;
            uniform highp float time;
            void main() { gl_Position = vec4(0.0); }
        ";
        let fs = "uniform sampler2D base; uniform samplerCube env;";

        let u = reflect_uniforms(&[vs, fs]);
        assert_eq!(names(&u), ["tint", "time", "base", "env"]);
        assert_eq!(u[0].kind, UniformType::Vec4);
        assert_eq!(u[1].kind, UniformType::Float);
        assert_eq!(u[3].kind, UniformType::SamplerCube);
    }

    #[test]
    fn parses_arrays_and_multiple_declarators() {
        let u = reflect_uniforms(&["uniform vec3 lights[4], ambient; uniform mat4 bones [ 32 ];"]);
        assert_eq!(names(&u), ["lights", "ambient", "bones"]);
        assert_eq!(u[0].array_size, 4);
        assert_eq!(u[1].array_size, 1);
        assert_eq!(u[2].array_size, 32);
    }

    #[test]
    fn merges_duplicates_across_stages() {
        let u = reflect_uniforms(&["uniform vec4 color;", "uniform vec4 color; uniform float k;"]);
        assert_eq!(names(&u), ["color", "k"]);
    }

    #[test]
    fn ignores_comments_blocks_and_unknown_types() {
        let src = "
            // uniform vec4 commented;
            /* uniform float hidden; */
            uniform Material { vec4 albedo; };
            uniform ivec2 grid;
            uniform vec2 offset = vec2(0.0, 1.0);
        ";
        let u = reflect_uniforms(&[src]);
        assert_eq!(names(&u), ["offset"]);
    }
}
