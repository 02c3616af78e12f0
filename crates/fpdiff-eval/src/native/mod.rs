//! Native kernels: the same C function compiled under different flag sets.
//!
//! Each [`NativeEvaluator`] owns a private build directory holding the
//! generated translation unit and the shared library compiled from it. The
//! library stays loaded for the evaluator's lifetime.

mod compiler;

pub use compiler::Compiler;

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use libloading::{Library, Symbol};
use tempfile::TempDir;
use tracing::{debug, trace};

use crate::kernel::{C1, C2};
use crate::{ComputeError, Evaluator, Result, alloc_output};

/// Exported kernel entry point.
const ENTRY_SYMBOL: &[u8] = b"fpdiff_evaluate\0";

type EvaluateFn = unsafe extern "C" fn(input: *const f32, result: *mut f32, count: usize);

/// Named set of compiler flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeProfile {
    name: String,
    flags: Vec<String>,
}

impl NativeProfile {
    /// Create a profile from explicit flags.
    pub fn new(name: impl Into<String>, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            flags: flags.into_iter().map(Into::into).collect(),
        }
    }

    /// No optimization and no contraction: the literal expression.
    #[must_use]
    pub fn baseline() -> Self {
        Self::new("baseline", ["-O0", "-ffp-contract=off"])
    }

    /// Full optimization with unsafe float math enabled.
    #[must_use]
    pub fn aggressive(compiler: &Compiler) -> Self {
        let mut flags = vec!["-O3", "-ffast-math", "-march=native", "-funroll-loops"];
        if compiler.is_clang() {
            // clang only contracts within a statement unless told otherwise
            flags.push("-ffp-contract=fast");
        }
        Self::new("aggressive", flags)
    }

    /// Parse a whitespace-separated flag string into a custom profile.
    #[must_use]
    pub fn custom(flags: &str) -> Self {
        Self::new("custom", flags.split_whitespace())
    }

    /// Profile name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiler flags.
    #[must_use]
    pub fn flags(&self) -> &[String] {
        &self.flags
    }
}

/// C source for the kernel, constants spelled as single-precision literals.
#[must_use]
pub fn kernel_source() -> String {
    let mut src = String::new();
    writeln!(src, "// Generated by fpdiff").unwrap();
    writeln!(src, "#include <stddef.h>").unwrap();
    writeln!(src).unwrap();
    writeln!(src, "static float calculate(float input) {{").unwrap();
    writeln!(src, "    return {C1:?}f * (input + {C2:?}f);").unwrap();
    writeln!(src, "}}").unwrap();
    writeln!(src).unwrap();
    writeln!(
        src,
        "void fpdiff_evaluate(const float* input, float* result, size_t count) {{"
    )
    .unwrap();
    writeln!(src, "    for (size_t i = 0; i < count; ++i) {{").unwrap();
    writeln!(src, "        result[i] = calculate(input[i]);").unwrap();
    writeln!(src, "    }}").unwrap();
    writeln!(src, "}}").unwrap();
    src
}

/// Compile `source` into a shared library at `output`.
///
/// # Errors
///
/// Returns [`ComputeError::CompilerSpawn`] if the compiler cannot be started
/// and [`ComputeError::CompilationFailed`] if it exits unsuccessfully.
pub fn compile_shared(
    compiler: &Compiler,
    profile: &NativeProfile,
    source: &Path,
    output: &Path,
) -> Result<()> {
    let mut cmd = Command::new(compiler.command());
    cmd.args(profile.flags())
        .args(["-fPIC", "-shared", "-o"])
        .arg(output)
        .arg(source);
    debug!(command = ?cmd, profile = profile.name(), "compiling native kernel");

    let out = cmd.output().map_err(|source| ComputeError::CompilerSpawn {
        command: compiler.to_string(),
        source,
    })?;

    if !out.status.success() {
        return Err(ComputeError::CompilationFailed {
            profile: profile.name().to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Evaluator backed by a compiled shared library.
pub struct NativeEvaluator {
    name: String,
    lib_path: PathBuf,
    // Dropped before the build directory that holds it.
    library: Library,
    _build_dir: TempDir,
}

impl NativeEvaluator {
    /// Generate, compile and load the kernel under `profile`.
    ///
    /// # Errors
    ///
    /// Fails if the build directory cannot be written, the compiler fails,
    /// or the library or its entry symbol cannot be loaded.
    pub fn build(compiler: &Compiler, profile: &NativeProfile) -> Result<Self> {
        let build_dir = tempfile::Builder::new().prefix("fpdiff-").tempdir()?;
        let source = build_dir.path().join("kernel.c");
        fs::write(&source, kernel_source())?;
        trace!(path = %source.display(), "wrote kernel source");

        let lib_path = build_dir
            .path()
            .join(libloading::library_filename(format!("fpdiff_{}", profile.name())));
        compile_shared(compiler, profile, &source, &lib_path)?;

        // SAFETY: the library was just built from our own source and runs no
        // initializers beyond the C runtime's.
        let library = unsafe { Library::new(&lib_path) }?;
        // SAFETY: the symbol type matches the generated definition.
        unsafe { library.get::<EvaluateFn>(ENTRY_SYMBOL) }
            .map_err(|e| ComputeError::SymbolNotFound("fpdiff_evaluate".to_string(), e))?;

        debug!(path = %lib_path.display(), "loaded native kernel");
        Ok(Self {
            name: format!("native-{}", profile.name()),
            lib_path,
            library,
            _build_dir: build_dir,
        })
    }

    /// Path of the loaded shared library.
    #[must_use]
    pub fn lib_path(&self) -> &Path {
        &self.lib_path
    }
}

impl Evaluator for NativeEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, inputs: &[f32]) -> Result<Vec<f32>> {
        // SAFETY: checked at build time; the signature matches the C source.
        let entry: Symbol<'_, EvaluateFn> = unsafe { self.library.get(ENTRY_SYMBOL) }
            .map_err(|e| ComputeError::SymbolNotFound("fpdiff_evaluate".to_string(), e))?;

        let mut out = alloc_output(inputs.len())?;
        out.resize(inputs.len(), 0.0);
        // SAFETY: both buffers hold exactly `inputs.len()` elements and the
        // kernel writes only within `count`.
        unsafe { entry(inputs.as_ptr(), out.as_mut_ptr(), inputs.len()) };
        Ok(out)
    }
}
