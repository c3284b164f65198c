//! Unit tests for ShaderUnit

use std::sync::Arc;

use crate::backend::mock_backend::MockBackend;
use crate::backend::ShaderStage;
use crate::context::Context;
use crate::error::Error;
use crate::shader::ShaderUnit;

fn test_context() -> Arc<Context> {
    Context::new(Box::new(MockBackend::new()))
}

#[test]
fn test_compile_vertex_shader() {
    let ctx = test_context();
    let unit = ShaderUnit::vertex(&ctx, "void main(void) { gl_Position = vec4(0.0); }").unwrap();
    assert_eq!(unit.stage(), ShaderStage::Vertex);
    assert!(unit.source().contains("gl_Position"));
}

#[test]
fn test_compile_fragment_shader() {
    let ctx = test_context();
    let unit = ShaderUnit::fragment(&ctx, "void main(void) { }").unwrap();
    assert_eq!(unit.stage(), ShaderStage::Fragment);
}

#[test]
fn test_compile_failure_yields_no_unit() {
    let ctx = test_context();
    let result = ShaderUnit::compile(
        &ctx,
        ShaderStage::Fragment,
        "#error this path is not supported\nvoid main(void) { }",
    );
    match result {
        Err(Error::Compile(diagnostic)) => {
            // the backend diagnostic is surfaced verbatim
            assert!(diagnostic.contains("this path is not supported"));
        }
        Ok(_) => panic!("compilation should have failed"),
        Err(other) => panic!("expected Compile error, got {:?}", other),
    }
}

#[test]
fn test_units_release_on_drop() {
    let ctx = test_context();
    let unit = ShaderUnit::vertex(&ctx, "void main(void) { }").unwrap();
    drop(unit);
    // dropping again elsewhere must not double-release; covered by the
    // mock's idempotent delete, this is a smoke check that drop runs
}
