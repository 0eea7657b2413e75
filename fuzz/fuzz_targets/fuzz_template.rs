// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

use rename_plus::methods::{Method, MethodSpec};
use rename_plus::validate;

#[derive(Arbitrary, Debug)]
struct Input {
    template: String,
    name: String,
    extension: String,
    start: i64,
    pattern: String,
    replacement: String,
}

fuzz_target!(|input: Input| {
    let specs = [
        MethodSpec::Template { template: input.template, start: input.start },
        MethodSpec::Regex { pattern: input.pattern, replacement: input.replacement },
    ];
    for spec in &specs {
        let mut method = Method::from_spec(spec, None);
        // Errors are fine; panics are not
        if let Ok((name, ext)) = method.apply(&input.name, &input.extension, Path::new("/fuzz")) {
            let _ = validate(&name, &ext);
        }
    }
});
