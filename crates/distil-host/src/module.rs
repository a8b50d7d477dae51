//! wasmtime binding for the Distil module
//!
//! [`DistilModule`] is the explicit handle for one instantiated module: it
//! owns the store, instance, and exported memory, and every operation goes
//! through it. Nothing here lives in a global; the handle is created by
//! [`DistilModule::instantiate`] and torn down by dropping it.

use std::collections::HashSet;

use wasmtime::{
    Caller, Engine, ExternType, Instance, Linker, Memory, Module, Store, TypedFunc, Val, ValType,
    WasmParams, WasmResults,
};

use crate::bridge::{self, Allocator, MemoryHandle};
use crate::error::{HostError, Result};
use crate::view::MemoryView;

/// Handle to an instantiated Distil module
pub struct DistilModule {
    store: Store<()>,
    instance: Instance,
    memory: Memory,
    alloc: TypedFunc<i32, i32>,
}

impl DistilModule {
    /// Compile and instantiate a module from its binary bytes
    ///
    /// Host imports `env::log` and `env::log_nr` are provided; any other
    /// imported function is satisfied with a zero-returning stub, matching
    /// what the module tolerated from the legacy harness. Imported memories,
    /// tables, and globals are refused.
    ///
    /// The allocation capability is resolved here, accepting either the
    /// `alloc` or the `_malloc` export naming convention. Callers only ever
    /// see the [`Allocator`] trait.
    pub fn instantiate(wasm_bytes: &[u8]) -> Result<Self> {
        let engine = Engine::default();
        let module = Module::new(&engine, wasm_bytes)?;

        let mut linker: Linker<()> = Linker::new(&engine);
        define_host_imports(&mut linker)?;
        define_stub_imports(&mut linker, &module)?;

        let mut store = Store::new(&engine, ());
        let instance = linker.instantiate(&mut store, &module)?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| HostError::MissingExport {
                name: "memory".to_string(),
            })?;

        let alloc = instance
            .get_typed_func::<i32, i32>(&mut store, "alloc")
            .or_else(|_| instance.get_typed_func::<i32, i32>(&mut store, "_malloc"))
            .map_err(|_| HostError::MissingExport {
                name: "alloc/_malloc".to_string(),
            })?;

        Ok(DistilModule {
            store,
            instance,
            memory,
            alloc,
        })
    }

    /// Current size of the module's linear memory in bytes
    pub fn memory_len(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    /// Allocate a region inside the module and copy `bytes` into it
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<MemoryHandle> {
        let offset = self.allocate(bytes.len())?;
        let data = self.memory.data_mut(&mut self.store);
        bridge::copy_at(data, offset, bytes)
    }

    /// Call the `read_img` export with `(offset, len, palette_size)`
    ///
    /// Returns the result pointer; interpret it with [`crate::decode::decode_palette`]
    /// under [`Self::with_view`].
    pub fn read_img(&mut self, image: MemoryHandle, palette_size: u32) -> Result<u32> {
        let func = self.typed_export::<(i32, i32, i32), i32>("read_img")?;
        let ptr = func.call(
            &mut self.store,
            (image.offset as i32, image.len as i32, palette_size as i32),
        )?;
        Ok(ptr as u32)
    }

    /// Call the optional `_getPoint` export, returning the struct pointer
    pub fn get_point(&mut self) -> Result<u32> {
        let func = self.typed_export::<(), i32>("_getPoint")?;
        Ok(func.call(&mut self.store, ())? as u32)
    }

    /// Run `f` against a freshly acquired view of linear memory
    ///
    /// This is the only way to read module memory. The view borrows the
    /// store, so it cannot be held across `read_img`/`get_point`/`load_bytes`;
    /// memory growth during a call can therefore never invalidate a live view.
    pub fn with_view<R>(&self, f: impl FnOnce(&MemoryView<'_>) -> Result<R>) -> Result<R> {
        let view = MemoryView::new(self.memory.data(&self.store));
        f(&view)
    }

    fn typed_export<P, R>(&mut self, name: &str) -> Result<TypedFunc<P, R>>
    where
        P: WasmParams,
        R: WasmResults,
    {
        match self.instance.get_func(&mut self.store, name) {
            None => Err(HostError::MissingExport {
                name: name.to_string(),
            }),
            Some(func) => Ok(func.typed::<P, R>(&self.store)?),
        }
    }
}

impl Allocator for DistilModule {
    fn allocate(&mut self, len: usize) -> Result<u32> {
        let request = i32::try_from(len).map_err(|_| HostError::AllocationFailed {
            requested: len,
            remaining: 0,
        })?;
        let offset = self.alloc.call(&mut self.store, request)?;
        Ok(offset as u32)
    }
}

impl std::fmt::Debug for DistilModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistilModule")
            .field("memory_len", &self.memory_len())
            .finish()
    }
}

/// The module's logging imports, forwarded to `tracing`
fn define_host_imports(linker: &mut Linker<()>) -> Result<()> {
    linker.func_wrap(
        "env",
        "log",
        |mut caller: Caller<'_, ()>, ptr: i32, len: i32| {
            let memory = caller.get_export("memory").and_then(|e| e.into_memory());
            let message = match memory {
                Some(m) => MemoryView::new(m.data(&caller))
                    .read_ascii_at(ptr as usize, len as usize)
                    .unwrap_or_else(|_| format!("<unreadable log at {ptr}+{len}>")),
                None => format!("<unreadable log at {ptr}+{len}>"),
            };
            tracing::info!(target: "distil_wasm", "{message}");
        },
    )?;

    linker.func_wrap("env", "log_nr", |nr: i32| {
        tracing::info!(target: "distil_wasm", "{nr}");
    })?;

    Ok(())
}

/// Stub every imported function the harness does not provide
///
/// The legacy harness satisfied unknown imports with no-op shims so gc'd
/// module builds with vestigial imports still instantiate. Functions get a
/// zero-returning stub here; anything else (memory, table, global, or a
/// function returning reference types) is refused loudly.
fn define_stub_imports(linker: &mut Linker<()>, module: &Module) -> Result<()> {
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for import in module.imports() {
        let module_name = import.module().to_string();
        let name = import.name().to_string();
        if module_name == "env" && (name == "log" || name == "log_nr") {
            continue;
        }
        if !seen.insert((module_name.clone(), name.clone())) {
            continue;
        }

        match import.ty() {
            ExternType::Func(func_ty) => {
                let result_types: Vec<ValType> = func_ty.results().collect();
                if result_types.iter().any(|ty| zero_val(ty).is_none()) {
                    return Err(HostError::UnsupportedImport {
                        module: module_name,
                        name,
                        kind: "function with reference-typed results".to_string(),
                    });
                }

                tracing::debug!(module = %module_name, name = %name, "stubbing unknown import");
                linker.func_new(&module_name, &name, func_ty, move |_caller, _params, out| {
                    for (slot, ty) in out.iter_mut().zip(result_types.iter()) {
                        if let Some(val) = zero_val(ty) {
                            *slot = val;
                        }
                    }
                    Ok(())
                })?;
            }
            other => {
                return Err(HostError::UnsupportedImport {
                    module: module_name,
                    name,
                    kind: format!("{other:?}"),
                });
            }
        }
    }

    Ok(())
}

fn zero_val(ty: &ValType) -> Option<Val> {
    match ty {
        ValType::I32 => Some(Val::I32(0)),
        ValType::I64 => Some(Val::I64(0)),
        ValType::F32 => Some(Val::F32(0)),
        ValType::F64 => Some(Val::F64(0)),
        ValType::V128 => Some(Val::V128(0u128.into())),
        _ => None,
    }
}
