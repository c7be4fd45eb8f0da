use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

pub fn initialize_logger() {
    INIT.call_once(|| {
        let mut builder = Builder::new();

        builder
            .is_test(true)
            .filter_level(LevelFilter::Info)
            .filter_module("keyed_index", LevelFilter::Debug)
            .format_timestamp_millis()
            .parse_default_env();

        // a logger installed by the harness or an earlier test wins; ours is dropped
        let _ = builder.try_init();
    });
}
