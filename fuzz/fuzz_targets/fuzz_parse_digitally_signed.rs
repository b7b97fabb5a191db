// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

#![no_main]

use digitally_signed::DigitallySigned;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(ds) = DigitallySigned::from_bytes(data) {
        assert_eq!(ds.signed_bytes().unwrap(), data);
    }
});
