use fpdiff_eval::{Compiler, EvalPath, Strategy};
use fpdiff_input::GeneratorKind;

/// Seed used when none is given.
pub const DEFAULT_SEED: i32 = 12824;
/// Number of generated samples when none is given.
pub const DEFAULT_SAMPLE_COUNT: i32 = 10;

/// Options for one comparison run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Generator seed.
    pub seed: i32,
    /// Samples to generate; non-positive generates none.
    pub sample_count: i32,
    /// Inputs evaluated before the generated ones.
    pub inputs: Vec<f32>,
    /// Sample generator.
    pub generator: GeneratorKind,
    /// Baseline path.
    pub reference: EvalPath,
    /// Path under test.
    pub optimized: EvalPath,
    /// C compiler for native paths.
    pub compiler: Compiler,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            sample_count: DEFAULT_SAMPLE_COUNT,
            inputs: Vec::new(),
            generator: GeneratorKind::default(),
            reference: EvalPath::default(),
            optimized: EvalPath::Kernel(Strategy::Folded),
            compiler: Compiler::default(),
        }
    }
}

impl RunConfig {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: i32) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_sample_count(mut self, count: i32) -> Self {
        self.sample_count = count;
        self
    }

    /// Set the pre-supplied inputs. Generated samples are appended after them.
    #[must_use]
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = f32>) -> Self {
        self.inputs = inputs.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_generator(mut self, generator: GeneratorKind) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn with_reference(mut self, path: EvalPath) -> Self {
        self.reference = path;
        self
    }

    #[must_use]
    pub fn with_optimized(mut self, path: EvalPath) -> Self {
        self.optimized = path;
        self
    }

    #[must_use]
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Whether either path needs a C compiler.
    #[must_use]
    pub const fn needs_compiler(&self) -> bool {
        self.reference.is_native() || self.optimized.is_native()
    }
}
