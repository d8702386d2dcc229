use crate::{RunArgs, EXIT_BUDGET, EXIT_ERRORED, EXIT_INPUT, EXIT_OK};
use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use grit_vm::{OutputSink, Status, Vm};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

fn badge(status: Status) -> ColoredString {
    match status {
        Status::Halted => status.as_str().green().bold(),
        Status::Errored => status.as_str().red().bold(),
        _ => status.as_str().yellow().bold(),
    }
}

/// Loads `program` (a path, or `-` for stdin) into `vm`.
fn load<O: OutputSink>(vm: &mut Vm<O>, program: &str, mem: &[i64]) -> Result<Status> {
    if program == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        Ok(vm.load_str(&buf, mem)?)
    } else {
        Ok(vm.load(program, mem)?)
    }
}

fn read_memory_file(path: &Path) -> Result<Vec<i64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read memory file {}", path.display()))?;
    let mem: Vec<i64> = serde_json::from_str(&text)
        .with_context(|| format!("parse memory file {}", path.display()))?;
    Ok(mem)
}

fn report_load_failure<O: OutputSink>(vm: &Vm<O>) {
    let detail = vm
        .load_failure()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "unrecognized instruction".into());
    eprintln!("{} {}", "load failed:".red().bold(), detail);
}

// ── run ─────────────────────────────────────────────────────────

/// Runs to completion, or steps until `max_steps` instructions have executed.
fn drive<O: OutputSink>(vm: &mut Vm<O>, max_steps: Option<u64>) -> Result<Status> {
    let status = match max_steps {
        None => vm.run()?,
        Some(limit) => {
            let mut status = vm.status();
            while !status.is_terminal() && vm.steps() < limit {
                status = vm.step()?;
            }
            status
        }
    };
    Ok(status)
}

fn exit_for(status: Status) -> i32 {
    match status {
        Status::Halted => EXIT_OK,
        Status::Errored => EXIT_ERRORED,
        _ => EXIT_BUDGET,
    }
}

pub fn run(args: &RunArgs) -> Result<i32> {
    let mem = match &args.mem_file {
        Some(path) => read_memory_file(path)?,
        None => args.mem.clone(),
    };

    if args.json {
        let mut vm = Vm::with_output(Vec::<i64>::new());
        if let Some(code) = prepare(&mut vm, &args.program, &mem)? {
            return Ok(code);
        }
        let status = drive(&mut vm, args.max_steps)?;
        let report = serde_json::json!({
            "snapshot": vm.snapshot(),
            "output": vm.output(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_for(status));
    }

    let mut vm = Vm::new();
    if let Some(code) = prepare(&mut vm, &args.program, &mem)? {
        return Ok(code);
    }
    let result = drive(&mut vm, args.max_steps);
    if args.dump || args.dump_program {
        eprint!("{}", vm.dump(true, args.dump_program));
    }
    let status = result?;

    println!();
    println!("{} {}", "Status:".dimmed(), badge(status));
    println!("{} {}", "Acc:   ".dimmed(), vm.accumulator());
    println!("{} {:?}", "Memory:".dimmed(), vm.memory().as_slice());
    println!("{} {}", "Steps: ".dimmed(), vm.steps());
    if status == Status::Running {
        println!("{}", "  (step budget exhausted)".yellow());
    }
    info!(status = %status, steps = vm.steps(), "run complete");
    Ok(exit_for(status))
}

/// Loads the program; returns an exit code when there is nothing to run.
fn prepare<O: OutputSink>(vm: &mut Vm<O>, program: &str, mem: &[i64]) -> Result<Option<i32>> {
    match load(vm, program, mem)? {
        Status::Errored => {
            report_load_failure(vm);
            Ok(Some(EXIT_INPUT))
        }
        Status::Waiting => {
            println!("{}", "No instructions to run.".dimmed());
            Ok(Some(EXIT_OK))
        }
        _ => Ok(None),
    }
}

// ── check ───────────────────────────────────────────────────────

pub fn check(program: &str) -> Result<i32> {
    let mut vm = Vm::with_output(Vec::<i64>::new());
    match load(&mut vm, program, &[])? {
        Status::Errored => {
            report_load_failure(&vm);
            Ok(EXIT_INPUT)
        }
        status => {
            let n = vm.program().len();
            println!("{} {}", "OK".green().bold(), format!("{n} instructions").dimmed());
            println!("{} {}", "CID:   ".dimmed(), vm.program().cid().cyan());
            println!("{} {}", "Status:".dimmed(), badge(status));
            Ok(EXIT_OK)
        }
    }
}

// ── disasm ──────────────────────────────────────────────────────

pub fn disasm(program: &str) -> Result<i32> {
    let mut vm = Vm::with_output(Vec::<i64>::new());
    let status = load(&mut vm, program, &[])?;
    for (i, ins) in vm.program().iter().enumerate() {
        println!("{:04}: {}", i, ins);
    }
    if status == Status::Errored {
        report_load_failure(&vm);
        return Ok(EXIT_INPUT);
    }
    Ok(EXIT_OK)
}
