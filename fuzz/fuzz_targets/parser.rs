#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    if let Ok(program) = rok::parse(input) {
        let _ = rok::read(&program).to_string();
    }
});
