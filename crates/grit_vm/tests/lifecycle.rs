use grit_vm::{ExecError, LoadError, ParseError, Status, Vm};
use std::io::Write;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn vm() -> Vm<Vec<i64>> {
    Vm::with_output(Vec::new())
}

// ── programs ────────────────────────────────────────────────────

#[test]
fn factorial_program() {
    for (n, expected) in [(0, 1), (1, 1), (5, 120), (10, 3_628_800)] {
        let mut v = vm();
        assert_eq!(v.load(fixture("factorial.gvm"), &[n, 0]).unwrap(), Status::Ready);
        assert_eq!(v.run().unwrap(), Status::Halted);
        assert_eq!(v.memory_snapshot(), vec![0, expected], "n = {n}");
        assert_eq!(v.output(), &vec![expected]);
    }
}

#[test]
fn factorial_guard_rejects_short_memory() {
    let mut v = vm();
    v.load(fixture("factorial.gvm"), &[5]).unwrap();
    assert_eq!(v.run().unwrap(), Status::Errored);
    assert_eq!(v.steps(), 1);
    assert_eq!(v.memory_snapshot(), vec![5]);
}

#[test]
fn sum_program_inserts_total() {
    let mut v = vm();
    v.load(fixture("sum3.gvm"), &[1, 2, 3]).unwrap();
    assert_eq!(v.run().unwrap(), Status::Halted);
    assert_eq!(v.output(), &vec![6]);
    assert_eq!(v.memory_snapshot(), vec![6, 1, 2, 3]);
}

#[test]
fn checkmem_against_short_memory_errors() {
    let mut v = vm();
    v.load_str("CHECKMEM 10\nADDCONST 1\nHALT\n", &[1, 2, 3]).unwrap();
    assert_eq!(v.run().unwrap(), Status::Errored);
    assert_eq!(v.accumulator(), 0);
    assert_eq!(v.steps(), 1);
}

#[test]
fn spin_loop_does_not_terminate_on_its_own() {
    let mut v = vm();
    v.load(fixture("spin.gvm"), &[]).unwrap();
    const CAP: u64 = 10_000;
    let mut status = Status::Ready;
    for _ in 0..CAP {
        status = v.step().unwrap();
        if status != Status::Running {
            break;
        }
    }
    assert_eq!(status, Status::Running, "spin loop must still be running after {CAP} steps");
    assert_eq!(v.steps(), CAP);
    // CLEAR, then ADDCONST/JUMPNZERO alternate; an even step count ends on the jump
    assert_eq!(v.cursor().index(), Some(2));
}

// ── run ─────────────────────────────────────────────────────────

#[test]
fn run_is_idempotent_once_terminal() {
    let mut v = vm();
    v.load(fixture("sum3.gvm"), &[4, 5, 6]).unwrap();
    let first = v.run().unwrap();
    let after_first = v.snapshot();
    for _ in 0..3 {
        assert_eq!(v.run().unwrap(), first);
    }
    assert_eq!(v.snapshot(), after_first);
    assert_eq!(v.output(), &vec![15]);
}

#[test]
fn run_before_load_returns_waiting() {
    let mut v = vm();
    assert_eq!(v.run().unwrap(), Status::Waiting);
}

#[test]
fn fatal_fault_leaves_errored_and_run_stays_put() {
    let mut v = vm();
    v.load_str("ADDCONST 1\nJUMPREL 0\nOUTPUT\n", &[]).unwrap();
    assert_eq!(v.run().unwrap_err(), ExecError::InvalidJump { index: 1 });
    assert_eq!(v.status(), Status::Errored);
    assert_eq!(v.run().unwrap(), Status::Errored);
    assert!(v.output().is_empty());
}

// ── load ────────────────────────────────────────────────────────

#[test]
fn load_outside_waiting_changes_nothing() {
    let mut ready = vm();
    ready.load(fixture("sum3.gvm"), &[1, 2, 3]).unwrap();

    let mut halted = vm();
    halted.load(fixture("sum3.gvm"), &[1, 2, 3]).unwrap();
    halted.run().unwrap();

    let mut errored = vm();
    errored.load(fixture("unknown_line.gvm"), &[]).unwrap();

    for v in [&mut ready, &mut halted, &mut errored] {
        let before = v.snapshot();
        let status = v.status();
        assert_eq!(v.load(fixture("factorial.gvm"), &[9, 9]).unwrap(), status);
        assert_eq!(v.load_str("HALT", &[7]).unwrap(), status);
        assert_eq!(v.snapshot(), before);
    }
}

#[test]
fn unknown_line_keeps_partial_program() {
    let mut v = vm();
    assert_eq!(v.load(fixture("unknown_line.gvm"), &[1, 2]).unwrap(), Status::Errored);
    assert_eq!(v.program().len(), 2);
    assert_eq!(v.program().back().unwrap().arg, 2);
    assert!(v.memory().is_empty());

    let failure = v.load_failure().unwrap();
    assert_eq!(failure.line, 3);
    assert_eq!(failure.error, ParseError::UnknownMnemonic("FOO".into()));
    assert_eq!(v.run().unwrap(), Status::Errored);
}

#[test]
fn comment_only_program_stays_waiting() {
    let mut v = vm();
    assert_eq!(v.load(fixture("comments_only.gvm"), &[1]).unwrap(), Status::Waiting);
    assert!(v.program().is_empty());
    assert_eq!(v.run().unwrap(), Status::Waiting);

    // still waiting, so a real program can be loaded without a reset
    assert_eq!(v.load_str("ADDMEM 0\nOUTPUT\n", &[3]).unwrap(), Status::Ready);
    assert_eq!(v.memory_snapshot(), vec![3]);
    v.run().unwrap();
    assert_eq!(v.output(), &vec![3]);
}

#[test]
fn missing_file_is_a_hard_error() {
    let mut v = vm();
    let err = v.load(fixture("does_not_exist.gvm"), &[]).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "got {err:?}");
    assert!(err.to_string().contains("does_not_exist.gvm"));
    assert_eq!(v.status(), Status::Waiting);
}

#[test]
fn unreadable_source_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut v = vm();
    let err = v.load(dir.path(), &[]).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "got {err:?}");
    assert_eq!(v.status(), Status::Waiting);
    assert!(v.program().is_empty());
}

#[test]
fn loads_from_temp_file_with_crlf() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    write!(tmp, "# crlf program\r\nCLEAR\r\nADDCONST 41\r\nADDCONST 1\r\nOUTPUT\r\n").unwrap();
    tmp.flush().unwrap();

    let mut v = vm();
    assert_eq!(v.load(tmp.path(), &[]).unwrap(), Status::Ready);
    assert_eq!(v.program().len(), 4);
    assert_eq!(v.run().unwrap(), Status::Halted);
    assert_eq!(v.output(), &vec![42]);
}

#[test]
fn non_utf8_line_in_file_errors_softly() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(b"CLEAR\nADDCONST 2\n\xff\xfe 1\nHALT\n").unwrap();
    tmp.flush().unwrap();

    let mut v = vm();
    assert_eq!(v.load(tmp.path(), &[1]).unwrap(), Status::Errored);
    assert_eq!(v.program().len(), 2);
    let failure = v.load_failure().unwrap();
    assert_eq!(failure.line, 3);
    assert_eq!(failure.error, ParseError::InvalidEncoding);
    assert_eq!(v.run().unwrap(), Status::Errored);
}

// ── reset ───────────────────────────────────────────────────────

#[test]
fn reset_returns_to_waiting_from_every_status() {
    let mut waiting = vm();

    let mut ready = vm();
    ready.load(fixture("sum3.gvm"), &[1, 2, 3]).unwrap();

    let mut running = vm();
    running.load(fixture("spin.gvm"), &[]).unwrap();
    running.step().unwrap();
    assert_eq!(running.status(), Status::Running);

    let mut halted = vm();
    halted.load(fixture("sum3.gvm"), &[1, 2, 3]).unwrap();
    halted.run().unwrap();

    let mut errored = vm();
    errored.load(fixture("unknown_line.gvm"), &[]).unwrap();

    for v in [&mut waiting, &mut ready, &mut running, &mut halted, &mut errored] {
        assert_eq!(v.reset(), Status::Waiting);
        assert_eq!(v.status(), Status::Waiting);
        assert_eq!(v.accumulator(), 0);
        assert!(v.memory().is_empty());
        assert!(v.program().is_empty());
        assert!(v.load_failure().is_none());
    }
}

#[test]
fn reset_then_reload_runs_fresh() {
    let mut v = vm();
    v.load(fixture("factorial.gvm"), &[4, 0]).unwrap();
    v.run().unwrap();
    v.reset();
    assert_eq!(v.load(fixture("factorial.gvm"), &[3, 0]).unwrap(), Status::Ready);
    assert_eq!(v.run().unwrap(), Status::Halted);
    assert_eq!(v.memory_snapshot(), vec![0, 6]);
    assert_eq!(v.output(), &vec![24, 6]);
}
