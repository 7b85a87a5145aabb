//! Log records emitted by rejected writes and forced fsyncs.

use std::thread::{self, ThreadId};

use fsync_control::{ControlSurface, Decision, FsyncControl};
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Logger that keeps every record together with the thread that emitted it,
/// so tests running in parallel only look at their own records.
struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records
            .lock()
            .push((thread::current().id(), record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

fn install() {
    // Already installed by an earlier test in this binary is fine.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

/// Records from the current thread at `level`, draining them.
fn take(level: Level) -> Vec<String> {
    let me = thread::current().id();
    let mut records = LOGGER.records.lock();
    let mut out = Vec::new();
    records.retain(|(id, lvl, msg)| {
        if *id == me {
            if *lvl == level {
                out.push(msg.clone());
            }
            false
        } else {
            true
        }
    });
    out
}

#[test]
fn malformed_counter_write_warns_once() {
    install();
    let s = ControlSurface::new(FsyncControl::new());
    let _ = take(Level::Warn);

    s.store("do_fsync_counter", b"abc").expect("store");
    let warnings = take(Level::Warn);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("do_fsync_counter"), "{warnings:?}");
    assert!(warnings[0].contains("abc"), "{warnings:?}");
    assert_eq!(s.show("do_fsync_counter").expect("show"), "1000\n");
}

#[test]
fn out_of_range_enabled_write_warns_once() {
    install();
    let s = ControlSurface::new(FsyncControl::new());
    let _ = take(Level::Warn);

    s.store("fsync_enabled", b"2").expect("store");
    let warnings = take(Level::Warn);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("fsync_enabled"), "{warnings:?}");
    assert!(warnings[0].contains('2'), "{warnings:?}");
    assert!(!s.control().enabled());
}

#[test]
fn accepted_write_logs_once_without_warning() {
    install();
    let s = ControlSurface::new(FsyncControl::new());
    let _ = take(Level::Info);
    let _ = take(Level::Warn);

    s.store("do_fsync_counter", b"+5\n").expect("store");
    let infos = take(Level::Info);
    assert_eq!(infos.len(), 1, "{infos:?}");
    assert!(infos[0].contains("do_fsync_counter = 5"), "{infos:?}");
    assert_eq!(s.show("do_fsync_counter").expect("show"), "5\n");

    s.store("fsync_enabled", b"1\n").expect("store");
    assert_eq!(take(Level::Info).len(), 1);
    assert!(take(Level::Warn).is_empty());
}

#[test]
fn forced_fsync_emits_notice() {
    install();
    let control = FsyncControl::builder().force_interval(2).build();
    let _ = take(Level::Info);

    for _ in 0..3 {
        assert_eq!(control.decide(), Decision::Skipped);
    }
    assert!(take(Level::Info).is_empty());

    assert_eq!(control.decide(), Decision::Forced);
    let infos = take(Level::Info);
    assert_eq!(infos.len(), 1, "{infos:?}");
    assert!(infos[0].contains("do fsync"), "{infos:?}");
}
