//! Hook adapter - attaches the wrapping pass to whichever asset hook the host
//! exposes.
//!
//! Hosts expose one (or several) of three incompatible asset hook protocols.
//! The adapter keeps an ordered list of probes, each naming a hook, the
//! phases it can serve and how to register on it. The first probe whose hook
//! the host supports and that serves the configured phase is selected once,
//! at `apply` time, and reused for every compilation.

use std::sync::Arc;

use tracing::{debug, error, info_span, trace};

use swaddle_core::{
    Chunk, Compilation, Compiler, HashContext, HookKind, Phase, ProcessAssetsStage, WrapError,
    WrapResult,
};

use crate::matcher::FileFilter;
use crate::options::WrapperOptions;
use crate::wrapper::Wrapper;

/// Name the plugin registers its listeners under.
pub const PLUGIN_NAME: &str = "WrapperPlugin";

/// The hook selected for a plugin instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookBinding {
    /// Protocol the pass is attached to.
    pub hook: HookKind,
    /// Phase the pass runs in.
    pub phase: Phase,
    /// Stage tapped, for the staged protocol.
    pub stage: Option<ProcessAssetsStage>,
}

/// One wrapping pass: the wrapper plus the filter that picks its files.
#[derive(Debug)]
pub struct WrapPass {
    wrapper: Wrapper,
    filter: FileFilter,
}

impl WrapPass {
    /// Create a pass.
    #[must_use]
    pub fn new(wrapper: Wrapper, filter: FileFilter) -> Self {
        Self { wrapper, filter }
    }

    /// Create a pass from options.
    #[must_use]
    pub fn from_options(options: &WrapperOptions) -> Self {
        Self::new(
            Wrapper::new(options.header.clone(), options.footer.clone()),
            options.filter(),
        )
    }

    /// The wrapper (and through it, the composite cache).
    #[must_use]
    pub fn wrapper(&self) -> &Wrapper {
        &self.wrapper
    }

    /// Wrap the matching files of every freshly rendered chunk in `chunks`.
    ///
    /// Chunks not rendered in this compilation are skipped entirely: their
    /// assets were wrapped by an earlier pass. Returns how many files were
    /// wrapped.
    ///
    /// # Errors
    ///
    /// Stops at the first header/footer resolution error and returns it.
    pub fn wrap_chunks(
        &self,
        compilation: &mut dyn Compilation,
        chunks: &[Chunk],
    ) -> WrapResult<usize> {
        let build_hash = compilation.hash().map(str::to_owned);
        let mut wrapped = 0usize;

        for chunk in chunks {
            if !chunk.rendered {
                trace!(chunk = %chunk.id, "Skipping chunk not rendered in this compilation");
                continue;
            }
            let ctx = HashContext::new(build_hash.clone(), chunk.hash.clone());
            for filename in &chunk.files {
                if self.wrap_file(compilation, filename, &ctx)? {
                    wrapped = wrapped.saturating_add(1);
                }
            }
        }

        debug!(chunks = chunks.len(), wrapped, "Wrapped chunk batch");
        Ok(wrapped)
    }

    /// Wrap every matching file of the asset table.
    ///
    /// The staged protocol carries no chunk information, so content sees an
    /// empty [`HashContext`].
    ///
    /// # Errors
    ///
    /// Stops at the first header/footer resolution error and returns it.
    pub fn wrap_assets(&self, compilation: &mut dyn Compilation) -> WrapResult<usize> {
        let ctx = HashContext::empty();
        let mut wrapped = 0usize;

        for filename in compilation.asset_names() {
            if self.wrap_file(compilation, &filename, &ctx)? {
                wrapped = wrapped.saturating_add(1);
            }
        }

        debug!(wrapped, "Wrapped asset table");
        Ok(wrapped)
    }

    fn wrap_file(
        &self,
        compilation: &mut dyn Compilation,
        filename: &str,
        ctx: &HashContext,
    ) -> WrapResult<bool> {
        if !self.filter.accepts(filename) {
            return Ok(false);
        }
        let Some(source) = compilation.asset(filename) else {
            debug!(filename, "Chunk file has no asset, skipping");
            return Ok(false);
        };

        let wrapped = self.wrapper.wrap(filename, &source, ctx)?;
        compilation.set_asset(filename, wrapped);
        trace!(filename, "Wrapped asset");
        Ok(true)
    }
}

type Register = fn(&mut dyn Compilation, Arc<WrapPass>, HookBinding) -> WrapResult<()>;

struct Probe {
    hook: HookKind,
    phases: &'static [Phase],
    register: Register,
}

impl Probe {
    fn serves(&self, phase: Phase) -> bool {
        self.phases.contains(&phase)
    }

    fn binding(&self, phase: Phase) -> HookBinding {
        let stage = (self.hook == HookKind::ProcessAssets).then(|| staged_stage(phase));
        HookBinding {
            hook: self.hook,
            phase,
            stage,
        }
    }
}

/// Probes in priority order.
static PROBES: [Probe; 3] = [
    Probe {
        hook: HookKind::AfterOptimizeChunkAssets,
        phases: &[Phase::AfterOptimization],
        register: register_after_optimize,
    },
    Probe {
        hook: HookKind::ProcessAssets,
        phases: &[Phase::BeforeOptimization, Phase::AfterOptimization],
        register: register_process_assets,
    },
    Probe {
        hook: HookKind::OptimizeChunkAssets,
        phases: &[Phase::BeforeOptimization],
        register: register_optimize_async,
    },
];

/// Stage of the staged protocol used for `phase`.
#[must_use]
pub fn staged_stage(phase: Phase) -> ProcessAssetsStage {
    match phase {
        Phase::BeforeOptimization => ProcessAssetsStage::Additions,
        Phase::AfterOptimization => ProcessAssetsStage::OptimizeInline,
    }
}

fn select_probe(compiler: &dyn Compiler, phase: Phase) -> WrapResult<&'static Probe> {
    PROBES
        .iter()
        .find(|probe| probe.serves(phase) && compiler.supports(probe.hook))
        .ok_or_else(|| {
            let candidates: Vec<String> = PROBES
                .iter()
                .filter(|probe| probe.serves(phase))
                .map(|probe| format!("'{}'", probe.hook))
                .collect();
            WrapError::UnsupportedHostVersion {
                required: format!(
                    "host exposes none of {} needed for the {phase} phase",
                    candidates.join(", ")
                ),
            }
        })
}

/// Pick the hook for `phase` and tap the compiler so that every compilation
/// registers `pass` on it.
///
/// # Errors
///
/// Returns [`WrapError::UnsupportedHostVersion`] when the compiler supports
/// no hook that can serve `phase`. Nothing is tapped in that case.
pub fn attach(
    compiler: &mut dyn Compiler,
    pass: Arc<WrapPass>,
    phase: Phase,
) -> WrapResult<HookBinding> {
    let probe = select_probe(compiler, phase)?;
    let binding = probe.binding(phase);
    let register = probe.register;

    compiler.tap_compilation(
        PLUGIN_NAME,
        Box::new(move |compilation| {
            trace!(hook = %binding.hook, phase = %binding.phase, "Registering on compilation");
            register(compilation, Arc::clone(&pass), binding)
        }),
    );

    debug!(
        hook = %binding.hook,
        phase = %binding.phase,
        stage = ?binding.stage,
        "Selected asset hook"
    );
    Ok(binding)
}

fn register_after_optimize(
    compilation: &mut dyn Compilation,
    pass: Arc<WrapPass>,
    binding: HookBinding,
) -> WrapResult<()> {
    compilation.tap_after_optimize_chunk_assets(
        PLUGIN_NAME,
        Box::new(move |compilation, chunks| {
            let _span = info_span!("wrap", hook = %binding.hook, phase = %binding.phase).entered();
            pass.wrap_chunks(compilation, chunks).map(drop)
        }),
    )
}

fn register_process_assets(
    compilation: &mut dyn Compilation,
    pass: Arc<WrapPass>,
    binding: HookBinding,
) -> WrapResult<()> {
    let stage = binding.stage.unwrap_or_else(|| staged_stage(binding.phase));
    compilation.tap_process_assets(
        PLUGIN_NAME,
        stage,
        Box::new(move |compilation| {
            let _span =
                info_span!("wrap", hook = %binding.hook, phase = %binding.phase, %stage).entered();
            pass.wrap_assets(compilation).map(drop)
        }),
    )
}

fn register_optimize_async(
    compilation: &mut dyn Compilation,
    pass: Arc<WrapPass>,
    binding: HookBinding,
) -> WrapResult<()> {
    compilation.tap_optimize_chunk_assets(
        PLUGIN_NAME,
        Box::new(move |compilation, chunks, done| {
            let _span = info_span!("wrap", hook = %binding.hook, phase = %binding.phase).entered();
            let result = pass.wrap_chunks(compilation, chunks).map(drop);
            if let Err(e) = &result {
                error!(error = %e, "Wrapping failed");
            }
            done.finish(result);
        }),
    )
}
