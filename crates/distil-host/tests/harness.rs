//! End-to-end harness test against a stub palette module
//!
//! The real Distil artifact is an opaque external binary, so the integration
//! test instantiates a WAT stand-in that speaks the same ABI: an exported
//! `memory`, a bump `alloc`, a `read_img` returning a pointer table of RGB
//! triplets, and a `_getPoint` returning a tagged Point struct.

use distil_host::decode::{self, Point};
use distil_host::module::DistilModule;
use distil_host::{pipeline, HostError, POINT_SCHEMA_TAG};

/// Stub module memory map:
///   32: pointer table [64, 68]
///   64: RGB (1, 2, 3)
///   68: RGB (255, 0, 127)
///  128: Point { a: 7, b: 9, tag, name_ptr: 160 }
///  160: "P\0"
fn stub_module() -> DistilModule {
    let tag = POINT_SCHEMA_TAG.to_le_bytes();
    let tag_wat: String = tag.iter().map(|b| format!("\\{b:02x}")).collect();

    let wat = format!(
        r#"(module
            (import "env" "log_nr" (func $log_nr (param i32)))
            (memory (export "memory") 1)
            (data (i32.const 32) "\40\00\00\00\44\00\00\00")
            (data (i32.const 64) "\01\02\03")
            (data (i32.const 68) "\ff\00\7f")
            (data (i32.const 128) "\07\00\00\00\09\00\00\00{tag_wat}\a0\00\00\00")
            (data (i32.const 160) "P\00")
            (global $brk (mut i32) (i32.const 1024))
            (func (export "alloc") (param i32) (result i32)
                (local i32)
                global.get $brk
                local.set 1
                global.get $brk
                local.get 0
                i32.add
                global.set $brk
                local.get 1)
            (func (export "read_img") (param i32 i32 i32) (result i32)
                (call $log_nr (local.get 2))
                (i32.const 32))
            (func (export "_getPoint") (result i32)
                (i32.const 128)))"#
    );

    DistilModule::instantiate(&wat::parse_str(&wat).unwrap()).unwrap()
}

#[test]
fn pipeline_decodes_the_full_palette() {
    let mut module = stub_module();

    let swatches = pipeline::distil(&mut module, b"pretend jpeg bytes", 2).unwrap();

    assert_eq!(swatches.len(), 2);
    assert_eq!(swatches[0].rgb, [1, 2, 3]);
    assert_eq!(swatches[0].hex, "#010203");
    assert_eq!(swatches[1].rgb, [255, 0, 127]);
    assert_eq!(swatches[1].hex, "#ff007f");
}

#[test]
fn rendered_fragment_carries_the_sample_class() {
    let mut module = stub_module();
    let swatches = pipeline::distil(&mut module, b"pretend jpeg bytes", 2).unwrap();

    let html = pipeline::render_swatches(&swatches);
    assert_eq!(html.matches("class=\"sample\"").count(), 2);
    assert!(html.contains("#010203"));
}

#[test]
fn point_struct_decodes_through_get_point() {
    let mut module = stub_module();

    let ptr = module.get_point().unwrap();
    let point = module
        .with_view(|view| decode::decode_point(view, ptr as usize))
        .unwrap();

    assert_eq!(
        point,
        Point {
            a: 7,
            b: 9,
            name: "P".to_string()
        }
    );
}

#[test]
fn copied_image_survives_an_invocation() {
    let mut module = stub_module();
    let payload = b"pretend jpeg bytes";

    let handle = module.load_bytes(payload).unwrap();
    module.read_img(handle, 2).unwrap();

    // The view is re-acquired after the call; the copied bytes are intact.
    module
        .with_view(|view| {
            let read = view.read_bytes_at(handle.offset as usize, handle.len as usize)?;
            assert_eq!(read, payload);
            Ok(())
        })
        .unwrap();
}

#[test]
fn asking_for_more_colors_than_the_table_holds_fails_loudly() {
    let mut module = stub_module();

    // The stub's pointer table has 2 entries; entry 3 reads zeroed memory and
    // yields pointer 0, which still decodes (offset 0 holds 3 readable bytes),
    // but a count far past the table walks off the data segment pointers into
    // zeros rather than corrupting silently. Bounds violations surface as
    // errors when a pointer lands outside memory.
    let handle = module.load_bytes(b"img").unwrap();
    let ptr = module.read_img(handle, 2).unwrap();

    let result = module.with_view(|view| decode::decode_palette(view, ptr, 1 << 16));
    assert!(matches!(result, Err(HostError::OutOfBounds { .. })));
}
