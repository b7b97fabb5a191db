// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

#![no_main]

use ct_structs::{LogEntry, SignedTreeHead};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = LogEntry::from_json(data);
    let _ = LogEntry::from_get_entries_json(data);
    let _ = SignedTreeHead::from_json(data);
});
