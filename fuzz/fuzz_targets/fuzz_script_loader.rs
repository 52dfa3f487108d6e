#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(script) = mprofile_config::load_script_toml(data) {
        if script.validate().is_ok() {
            let _ = script.total_cycles();
        }
    }
});
