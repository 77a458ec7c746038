//! tb-cli: a demonstration binary that drives the IR pipeline described by
//! §2's data flow end to end — graph construction, constant folding, CFG
//! discovery, global code motion, per-block list scheduling, and code
//! generation through the `ICodeGen` contract — against one of a few
//! hand-built example functions, then prints the result.
//!
//! The real front-end (preprocessor, lexer, parser) and back-end (x86-64
//! instruction encoder, object file writer, linker invocation) are outside
//! this repository's scope (§1); this binary exists to exercise the core
//! the way the original's driver would, not to replace either collaborator.

mod demo;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::Path;
use std::sync::Once;
use tb_codegen::{module_compile_function, stub::DemoCodeGen, IselMode};
use tb_ir::NodeId;
use tb_module::{Arch, Module, System, TargetDescriptor, TargetFeatures};
use tb_passes::{assign_scheduled_blocks, run_constant_fold};
use tb_printer::{print_function_dot, print_function_json};
use tb_scheduler::{schedule_block, DefaultLatencyModel};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "tb-cli", version, about = "tb sea-of-nodes IR pipeline demo")]
struct Args {
    /// Which demo function to build and compile.
    #[arg(long, value_enum, default_value_t = Demo::AddConst)]
    demo: Demo,

    /// Instruction-selection mode requested from the code generator (§4.H).
    #[arg(long, value_enum, default_value_t = IselArg::Fast)]
    isel: IselArg,

    /// Output format for the printed IR graph (§4.I plus the supplemented
    /// JSON dump mode).
    #[arg(long, value_enum, default_value_t = Format::Dot)]
    format: Format,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Demo {
    /// A scalar parameter plus a fully-constant addition the peephole pass
    /// folds away (§8 scenario 1).
    AddConst,
    /// A boolean `BRANCH` diamond rejoining at a `REGION` (§8 scenario 2).
    Branch,
    /// A `CALL` to an external symbol, exercising the object-writer patch
    /// list (§6).
    Call,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IselArg {
    Fast,
    Complex,
}

impl From<IselArg> for IselMode {
    fn from(value: IselArg) -> Self {
        match value {
            IselArg::Fast => IselMode::Fast,
            IselArg::Complex => IselMode::Complex,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Dot,
    Json,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("tb-cli.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "tb-cli.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    install_panic_hook();
    let _log_guard = configure_logging();

    tracing::info!(
        target: "runtime.startup",
        demo = ?args.demo,
        isel = ?args.isel,
        format = ?args.format,
        "tb_cli_start"
    );

    let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::SSE)
        .context("only x86_64/windows/win64 is a supported target (§6)")?;
    let module = Module::create(target);

    let mut function = demo::build(&module, args.demo)?;

    let rewrites = run_constant_fold(&mut function);
    tracing::info!(target: "ir.passes", rewrites, "constant_fold_complete");

    let cfg = tb_cfg::discover_cfg(&function);
    assign_scheduled_blocks(&mut function, &cfg);
    tracing::info!(target: "ir.passes", blocks = cfg.block_count(), "global_code_motion_complete");

    let latency = DefaultLatencyModel;
    let mut scheds: Vec<Vec<NodeId>> = Vec::with_capacity(cfg.block_count());
    for block in &cfg.blocks {
        let sched = schedule_block(&function, block, &latency)
            .with_context(|| format!("scheduling block {}", block.id))?;
        tracing::debug!(target: "ir.scheduler", block = block.id, len = sched.len(), "block_scheduled");
        scheds.push(sched);
    }

    let codegen = DemoCodeGen;
    let output = module_compile_function(&module, &function, &cfg, &scheds, &codegen, args.isel.into(), tb_arena::local_tid())
        .context("module_compile_function")?;
    tracing::info!(
        target: "codegen",
        code_size = output.code_size,
        prologue_length = output.prologue_length,
        epilogue_length = output.epilogue_length,
        patches = output.patches.len(),
        "function_compiled"
    );

    match args.format {
        Format::Dot => println!("{}", print_function_dot(&function)),
        Format::Json => println!("{}", print_function_json(&function)?),
    }

    println!(
        "; compiled: {} bytes ({} prologue + {} body + {} epilogue), {} symbol patch(es), {} function(s) compiled so far",
        output.code_size,
        output.prologue_length,
        output.code_size - output.prologue_length - output.epilogue_length,
        output.epilogue_length,
        output.patches.len(),
        module.compiled_function_count(),
    );

    Ok(())
}
