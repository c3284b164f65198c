/// Uniform declaration scanner for GLSL source text.
///
/// Linking compares the *declared* uniform tables of all stages before the
/// driver ever sees the program, so that the same name declared with
/// different types in two stages is rejected deterministically (drivers
/// differ on whether they catch this). The scanner is not a GLSL parser:
/// it recognises plain `uniform <type> <name>;` declarations (with
/// optional precision qualifier, array length, initializer and multiple
/// declarators) and skips anything else.

use crate::backend::{UniformBaseType, UniformShape};

/// One uniform declaration found in shader source
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDecl {
    /// Declared variable name
    pub name: String,
    /// Numeric base type
    pub base_type: UniformBaseType,
    /// Element shape
    pub shape: UniformShape,
    /// Declared array length (1 if not an array)
    pub array_length: usize,
    /// Initializer expression text, if present (e.g. "1.5", "vec2(0.0, 1.0)")
    pub initializer: Option<String>,
}

impl UniformDecl {
    /// Whether two declarations of the same name agree in type
    pub fn same_type(&self, other: &UniformDecl) -> bool {
        self.base_type == other.base_type
            && self.shape == other.shape
            && self.array_length == other.array_length
    }

    /// Human-readable type description for diagnostics
    pub fn type_description(&self) -> String {
        let element = match (self.base_type, self.shape) {
            (UniformBaseType::Float, UniformShape::Scalar) => "float".to_string(),
            (UniformBaseType::Int, UniformShape::Scalar) => "int".to_string(),
            (UniformBaseType::Int, shape) => format!("i{}", shape),
            (UniformBaseType::Float, shape) => shape.to_string(),
        };
        if self.array_length > 1 {
            format!("{}[{}]", element, self.array_length)
        } else {
            element
        }
    }
}

/// Scan GLSL source for uniform declarations
pub fn scan_uniform_decls(source: &str) -> Vec<UniformDecl> {
    let clean = strip_directives(&strip_comments(source));
    let mut decls = Vec::new();
    for statement in clean.split(';') {
        parse_statement(statement, &mut decls);
    }
    decls
}

/// Remove preprocessor lines (`#version`, `#define`, ...), which are
/// newline-terminated rather than `;`-terminated
fn strip_directives(source: &str) -> String {
    source
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove `//` line comments and `/* */` block comments
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            // keep statements separated across the removed span
            out.push(' ');
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

/// Count occurrences of `name` as a whole identifier in `source`
///
/// A declaration contributes one occurrence, so a count of two or more
/// means the variable is referenced somewhere beyond its declaration.
pub fn identifier_occurrences(source: &str, name: &str) -> usize {
    let clean = strip_directives(&strip_comments(source));
    let bytes = clean.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        if is_ident_start(bytes[i]) {
            let start = i;
            while i < bytes.len() && is_ident_char(bytes[i]) {
                i += 1;
            }
            if &clean[start..i] == name {
                count += 1;
            }
        } else {
            i += 1;
        }
    }
    count
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Map a GLSL type keyword to its base type and shape
fn parse_type(token: &str) -> Option<(UniformBaseType, UniformShape)> {
    match token {
        "float" => Some((UniformBaseType::Float, UniformShape::Scalar)),
        "int" => Some((UniformBaseType::Int, UniformShape::Scalar)),
        "vec2" => Some((UniformBaseType::Float, UniformShape::Vec2)),
        "vec3" => Some((UniformBaseType::Float, UniformShape::Vec3)),
        "vec4" => Some((UniformBaseType::Float, UniformShape::Vec4)),
        "ivec2" => Some((UniformBaseType::Int, UniformShape::Vec2)),
        "ivec3" => Some((UniformBaseType::Int, UniformShape::Vec3)),
        "ivec4" => Some((UniformBaseType::Int, UniformShape::Vec4)),
        "mat2" => Some((UniformBaseType::Float, UniformShape::Mat2)),
        "mat3" => Some((UniformBaseType::Float, UniformShape::Mat3)),
        "mat4" => Some((UniformBaseType::Float, UniformShape::Mat4)),
        _ => None,
    }
}

fn parse_statement(statement: &str, out: &mut Vec<UniformDecl>) {
    // a top-level declaration can only follow the last block brace in the
    // chunk (function bodies carried over from the ';' split end in '}')
    let stmt = match statement.rfind(['{', '}']) {
        Some(pos) => &statement[pos + 1..],
        None => statement,
    };
    let stmt = stmt.trim_start();

    let rest = match stmt.strip_prefix("uniform") {
        Some(r) if r.starts_with(|c: char| c.is_whitespace()) => r.trim_start(),
        _ => return,
    };

    // optional precision qualifier
    let rest = ["lowp", "mediump", "highp"]
        .iter()
        .find_map(|q| {
            rest.strip_prefix(q)
                .filter(|r| r.starts_with(|c: char| c.is_whitespace()))
        })
        .map(str::trim_start)
        .unwrap_or(rest);

    let (type_token, declarators) = match rest.split_once(|c: char| c.is_whitespace()) {
        Some(pair) => pair,
        None => return,
    };
    let (base_type, shape) = match parse_type(type_token) {
        Some(t) => t,
        None => return,
    };

    for declarator in split_top_level_commas(declarators) {
        if let Some(decl) = parse_declarator(declarator, base_type, shape) {
            out.push(decl);
        }
    }
}

/// Split on commas that are not nested inside parentheses or brackets
fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_declarator(
    declarator: &str,
    base_type: UniformBaseType,
    shape: UniformShape,
) -> Option<UniformDecl> {
    let declarator = declarator.trim();

    let (name_part, initializer) = match declarator.split_once('=') {
        Some((n, init)) => (n.trim(), Some(init.trim().to_string())),
        None => (declarator, None),
    };

    let (name, array_length) = match name_part.split_once('[') {
        Some((n, rest)) => {
            let len_text = rest.strip_suffix(']')?.trim();
            (n.trim(), len_text.parse::<usize>().ok()?)
        }
        None => (name_part, 1),
    };

    if name.is_empty() || !is_ident_start(name.as_bytes()[0]) {
        return None;
    }
    if !name.bytes().all(is_ident_char) {
        return None;
    }

    Some(UniformDecl {
        name: name.to_string(),
        base_type,
        shape,
        array_length,
        initializer,
    })
}

#[cfg(test)]
#[path = "declarations_tests.rs"]
mod tests;
