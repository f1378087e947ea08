//! A `log::Log` backend filtered by the severity mask.
//!
//! Severity numbers are fixed here:
//!
//! | sev | meaning                        |
//! |-----|--------------------------------|
//! | 0   | system                         |
//! | 1   | errors                         |
//! | 2   | warnings                       |
//! | 3   | notes (driver, file handling)  |
//! | 10  | tokenizer                      |
//! | 11  | token cleanup                  |
//! | 21  | brace cleanup                  |
//! | 22  | parse frames (#if stack)       |
//! | 30  | symbol classification          |
//! | 31  | label combining                |
//! | 32  | scope assignment               |
//! | 40  | output                         |
//! | 50  | index store                    |

use log::{Level, Metadata, Record};

use crate::logmask::LogMask;

pub struct MaskLogger {
    mask: LogMask,
    show_sev: bool,
}

/// Map a record to its severity number: level for errors and
/// warnings, subsystem otherwise.
fn severity(level: Level, target: &str) -> u32 {
    match level {
        Level::Error => 1,
        Level::Warn => 2,
        _ => {
            if target.contains("tokenize_cleanup") {
                11
            } else if target.contains("tokenize") {
                10
            } else if target.contains("brace_cleanup") {
                21
            } else if target.contains("parse_frame") {
                22
            } else if target.contains("fix_symbols") {
                30
            } else if target.contains("combine_labels") {
                31
            } else if target.contains("scope") {
                32
            } else if target.contains("output") {
                40
            } else if target.contains("toks_index") {
                50
            } else {
                3
            }
        }
    }
}

impl log::Log for MaskLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.mask.test(severity(metadata.level(), metadata.target()))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let sev = severity(record.level(), record.target());
        if self.show_sev {
            eprintln!("[{sev:2}] {}", record.args());
        } else {
            eprintln!("{}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the masked logger. Must run before any logging.
pub fn init(mask: LogMask, show_sev: bool) {
    let logger = MaskLogger { mask, show_sev };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}
