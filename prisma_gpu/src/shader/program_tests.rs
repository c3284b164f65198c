//! Unit tests for Program
//!
//! Covers linking, cross-stage declaration conflicts, the active-uniform
//! map, bind-slot semantics, and validated uniform writes/reads for
//! every supported shape.

use std::sync::Arc;

use crate::backend::mock_backend::MockBackend;
use crate::backend::{BackendCaps, ShaderStage, UniformShape, UniformValue};
use crate::context::Context;
use crate::error::Error;
use crate::shader::{Program, ShaderUnit};

fn test_context() -> Arc<Context> {
    Context::new(Box::new(MockBackend::new()))
}

/// Vertex stage declaring (and referencing) one uniform of every shape
const ALL_SHAPES_VERTEX: &str = "\
uniform float f_scalar;
uniform int i_scalar;
uniform vec2 f_vec2;
uniform vec3 f_vec3;
uniform vec4 f_vec4;
uniform ivec3 i_vec3;
uniform mat2 f_mat2;
uniform mat3 f_mat3;
uniform mat4 f_mat4;
uniform float f_arr[3];
uniform vec2 v2_arr[4];

void main(void) {
    float x = f_scalar + float(i_scalar) + f_arr[1];
    vec2 a = f_vec2 + v2_arr[0];
    vec3 b = f_vec3 + vec3(i_vec3);
    vec4 c = f_vec4 + f_mat4[0];
    vec2 d = f_mat2[0] + f_mat3[0].xy;
    gl_Position = c + vec4(a + d, b.xy) + vec4(x);
}
";

fn all_shapes_program(ctx: &Arc<Context>) -> Program {
    Program::from_sources(ctx, Some(ALL_SHAPES_VERTEX), None).unwrap()
}

// ============================================================================
// LINKING
// ============================================================================

#[test]
fn test_link_requires_at_least_one_stage() {
    let ctx = test_context();
    match Program::link(&ctx, &[]) {
        Err(Error::Link(_)) => {}
        other => panic!("expected Link error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_link_rejects_duplicate_stages() {
    let ctx = test_context();
    let a = ShaderUnit::vertex(&ctx, "void main(void) { }").unwrap();
    let b = ShaderUnit::vertex(&ctx, "void main(void) { }").unwrap();
    match Program::link(&ctx, &[a, b]) {
        Err(Error::Link(diagnostic)) => assert!(diagnostic.contains("Vertex")),
        other => panic!("expected Link error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_single_stage_gets_implicit_partner() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    assert!(program.stages().contains(&ShaderStage::Vertex));
    assert!(program.stages().contains(&ShaderStage::Fragment));
}

#[test]
fn test_backend_link_failure_surfaces_diagnostic() {
    let mut mock = MockBackend::new();
    mock.fail_next_link("internal link scheduler error");
    let ctx = Context::new(Box::new(mock));

    match Program::from_sources(&ctx, Some("void main(void) { }"), None) {
        Err(Error::Link(diagnostic)) => {
            assert!(diagnostic.contains("internal link scheduler error"));
        }
        other => panic!("expected Link error, got {:?}", other.map(|_| ())),
    }
}

// ============================================================================
// CROSS-STAGE DECLARATION CONFLICTS
// ============================================================================

const FLOAT_DECL: &str = "uniform float shared_in;\nvoid main(void) { float x = shared_in; }";
const INT_DECL: &str = "uniform int shared_in;\nvoid main(void) { int y = shared_in; }";

#[test]
fn test_conflicting_uniform_types_fail_link() {
    let ctx = test_context();
    match Program::from_sources(&ctx, Some(FLOAT_DECL), Some(INT_DECL)) {
        Err(Error::Link(diagnostic)) => {
            assert!(diagnostic.contains("shared_in"));
            assert!(diagnostic.contains("float"));
            assert!(diagnostic.contains("int"));
        }
        other => panic!("expected Link error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_conflict_is_order_independent() {
    // the int declaration first must fail just the same
    let ctx = test_context();
    assert!(matches!(
        Program::from_sources(&ctx, Some(INT_DECL), Some(FLOAT_DECL)),
        Err(Error::Link(_))
    ));
}

#[test]
fn test_conflicting_array_lengths_fail_link() {
    let ctx = test_context();
    let vert = "uniform float arr[3];\nvoid main(void) { float x = arr[0]; }";
    let frag = "uniform float arr[4];\nvoid main(void) { float y = arr[0]; }";
    assert!(matches!(
        Program::from_sources(&ctx, Some(vert), Some(frag)),
        Err(Error::Link(_))
    ));
}

#[test]
fn test_matching_declarations_link_fine() {
    let ctx = test_context();
    assert!(Program::from_sources(&ctx, Some(FLOAT_DECL), Some(FLOAT_DECL)).is_ok());
}

// ============================================================================
// ACTIVE UNIFORM SET
// ============================================================================

#[test]
fn test_declared_but_unreferenced_uniform_is_unknown() {
    let ctx = test_context();
    let program = Program::from_sources(
        &ctx,
        Some("uniform float used_in;\nuniform float unused_in;\n\
              void main(void) { gl_Position = vec4(used_in); }"),
        None,
    )
    .unwrap();
    program.bind().unwrap();

    assert!(program.descriptor("used_in").is_some());
    assert!(program.descriptor("unused_in").is_none());

    match program.set("unused_in", 1.0f32) {
        Err(Error::UnknownUniform(msg)) => assert!(msg.contains("unused_in")),
        other => panic!("expected UnknownUniform, got {:?}", other),
    }
    assert!(matches!(program.get("unused_in"), Err(Error::UnknownUniform(_))));
}

#[test]
fn test_completely_absent_name_is_unknown() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();
    assert!(matches!(program.set("no_such", 1.0f32), Err(Error::UnknownUniform(_))));
}

#[test]
fn test_descriptor_metadata() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);

    let descriptor = program.descriptor("v2_arr").unwrap();
    assert_eq!(descriptor.shape(), UniformShape::Vec2);
    assert_eq!(descriptor.array_length(), 4);

    let names: Vec<&str> = program.uniform_names().collect();
    assert_eq!(names.len(), 11);
    assert!(names.contains(&"f_mat3"));
}

// ============================================================================
// BIND / UNBIND
// ============================================================================

#[test]
fn test_bind_unbind_cycle() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);

    assert!(!program.is_bound());
    program.bind().unwrap();
    assert!(program.is_bound());

    // re-binding while bound is permitted
    program.bind().unwrap();
    assert!(program.is_bound());

    program.unbind();
    assert!(!program.is_bound());
    assert_eq!(ctx.current_program(), None);
}

#[test]
fn test_binding_b_unbinds_a() {
    let ctx = test_context();
    let a = all_shapes_program(&ctx);
    let b = Program::from_sources(&ctx, Some("void main(void) { }"), None).unwrap();

    a.bind().unwrap();
    assert!(a.is_bound());

    b.bind().unwrap();
    assert!(b.is_bound());
    assert!(!a.is_bound());
}

#[test]
fn test_dropping_bound_program_vacates_slot() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();
    assert!(ctx.current_program().is_some());

    drop(program);
    assert_eq!(ctx.current_program(), None);
}

// ============================================================================
// UNIFORM WRITE / READ ROUND-TRIPS
// ============================================================================

#[test]
fn test_roundtrip_scalars() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    program.set("f_scalar", 1.25f32).unwrap();
    assert_eq!(program.get("f_scalar").unwrap(), UniformValue::Float(1.25));

    program.set("i_scalar", 7i32).unwrap();
    assert_eq!(program.get("i_scalar").unwrap(), UniformValue::Int(7));
}

#[test]
fn test_roundtrip_vectors() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    program.set("f_vec2", [0.5f32, 1.5]).unwrap();
    assert_eq!(program.get("f_vec2").unwrap(), UniformValue::FloatVec(vec![0.5, 1.5]));

    program.set("f_vec3", glam::Vec3::new(1.0, 2.0, 3.0)).unwrap();
    assert_eq!(
        program.get("f_vec3").unwrap(),
        UniformValue::FloatVec(vec![1.0, 2.0, 3.0])
    );

    program.set("f_vec4", [1.0f32, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(program.get("f_vec4").unwrap().component_count(), 4);

    program.set("i_vec3", glam::IVec3::new(4, 5, 6)).unwrap();
    assert_eq!(program.get("i_vec3").unwrap(), UniformValue::IntVec(vec![4, 5, 6]));
}

#[test]
fn test_roundtrip_matrices() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    program.set("f_mat2", [1.0f32, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(
        program.get("f_mat2").unwrap(),
        UniformValue::FloatVec(vec![1.0, 2.0, 3.0, 4.0])
    );

    let m3: Vec<f32> = (0..9).map(|i| i as f32).collect();
    program.set("f_mat3", m3.clone()).unwrap();
    assert_eq!(program.get("f_mat3").unwrap(), UniformValue::FloatVec(m3));

    program.set("f_mat4", glam::Mat4::IDENTITY).unwrap();
    assert_eq!(
        program.get("f_mat4").unwrap(),
        UniformValue::from(glam::Mat4::IDENTITY)
    );
}

#[test]
fn test_roundtrip_arrays() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    program.set("f_arr", [1.0f32, 2.0, 3.0]).unwrap();
    assert_eq!(
        program.get("f_arr").unwrap(),
        UniformValue::FloatVec(vec![1.0, 2.0, 3.0])
    );

    // full vec2[4]
    let full: Vec<f32> = (0..8).map(|i| i as f32).collect();
    program.set("v2_arr", full.clone()).unwrap();
    assert_eq!(program.get("v2_arr").unwrap(), UniformValue::FloatVec(full));
}

#[test]
fn test_partial_array_write_updates_leading_elements() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    program.set("f_arr", [1.0f32, 2.0, 3.0]).unwrap();
    program.set("f_arr", [9.0f32]).unwrap();
    assert_eq!(
        program.get("f_arr").unwrap(),
        UniformValue::FloatVec(vec![9.0, 2.0, 3.0])
    );
}

// ============================================================================
// VALIDATION FAILURES
// ============================================================================

#[test]
fn test_type_mismatch_scalar() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    // int value into a float uniform and vice versa
    assert!(matches!(program.set("f_scalar", 3i32), Err(Error::TypeMismatch(_))));
    assert!(matches!(program.set("i_scalar", 3.0f32), Err(Error::TypeMismatch(_))));
}

#[test]
fn test_type_mismatch_vector() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    assert!(matches!(
        program.set("i_vec3", [1.0f32, 2.0, 3.0]),
        Err(Error::TypeMismatch(_))
    ));
    assert!(matches!(
        program.set("f_mat2", [1i32, 2, 3, 4]),
        Err(Error::TypeMismatch(_))
    ));
}

#[test]
fn test_shape_mismatch_wrong_length() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    // three floats for a vec4
    assert!(matches!(
        program.set("f_vec4", [1.0f32, 2.0, 3.0]),
        Err(Error::ShapeMismatch(_))
    ));
    // eight floats for a mat3
    assert!(matches!(
        program.set("f_mat3", vec![0.0f32; 8]),
        Err(Error::ShapeMismatch(_))
    ));
}

#[test]
fn test_shape_mismatch_scalar_vs_sequence() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    // scalar where a vector is declared
    assert!(matches!(program.set("f_vec4", 1.0f32), Err(Error::ShapeMismatch(_))));
    // sequence where a scalar is declared
    assert!(matches!(
        program.set("f_scalar", [1.0f32, 2.0]),
        Err(Error::ShapeMismatch(_))
    ));
    // even a one-element sequence is not a scalar
    assert!(matches!(
        program.set("f_scalar", vec![1.0f32]),
        Err(Error::ShapeMismatch(_))
    ));
}

#[test]
fn test_shape_mismatch_arrays() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    // not a multiple of the element size
    assert!(matches!(
        program.set("v2_arr", vec![0.0f32; 5]),
        Err(Error::ShapeMismatch(_))
    ));
    // more elements than the declared length
    assert!(matches!(
        program.set("f_arr", vec![0.0f32; 4]),
        Err(Error::ShapeMismatch(_))
    ));
    // empty sequences never match
    assert!(matches!(
        program.set("f_arr", Vec::<f32>::new()),
        Err(Error::ShapeMismatch(_))
    ));
}

#[test]
fn test_failed_set_leaves_previous_value() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);
    program.bind().unwrap();

    program.set("f_vec4", [1.0f32, 2.0, 3.0, 4.0]).unwrap();
    assert!(program.set("f_vec4", [9.0f32, 9.0, 9.0]).is_err());
    assert_eq!(
        program.get("f_vec4").unwrap(),
        UniformValue::FloatVec(vec![1.0, 2.0, 3.0, 4.0])
    );
}

// ============================================================================
// BIND PRECONDITIONS
// ============================================================================

#[test]
fn test_set_while_unbound_fails() {
    let ctx = test_context();
    let program = all_shapes_program(&ctx);

    match program.set("f_scalar", 1.0f32) {
        Err(Error::NotBound(msg)) => assert!(msg.contains("f_scalar")),
        other => panic!("expected NotBound, got {:?}", other),
    }
}

#[test]
fn test_get_while_unbound_without_introspection_fails() {
    let mock = MockBackend::new()
        .with_capabilities(BackendCaps::all().difference(BackendCaps::UNBOUND_UNIFORM_QUERY));
    let ctx = Context::new(Box::new(mock));
    let program = all_shapes_program(&ctx);

    assert!(matches!(program.get("f_scalar"), Err(Error::NotBound(_))));
}

#[test]
fn test_get_before_bind_returns_declared_default() {
    // vertex shader declaring `uniform float f = 1.5;`, referenced by
    // reachable code; without ever binding, get("f") reports the default
    let ctx = test_context();
    let program = Program::from_sources(
        &ctx,
        Some("uniform float f = 1.5;\nvoid main(void) { gl_Position = vec4(f, 1.0, 1.0, 1.0); }"),
        None,
    )
    .unwrap();

    assert!(!program.is_bound());
    assert_eq!(program.get("f").unwrap(), UniformValue::Float(1.5));
}
