use log::LevelFilter;

use crate::logging::{Target, init_logger, parse_level};

#[uniffi::export]
pub fn set_debug_log_level() {
    init_logger(LevelFilter::Trace, Target::Stdout);
}

#[uniffi::export]
pub fn set_log_level(level: &str) -> bool {
    let Some(lvl) = parse_level(level) else {
        return false;
    };

    init_logger(lvl, Target::Stdout);
    true
}
