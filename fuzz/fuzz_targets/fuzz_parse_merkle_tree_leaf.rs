// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

#![no_main]

use ct_structs::MerkleTreeLeaf;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(leaf) = MerkleTreeLeaf::from_bytes(data) {
        assert_eq!(leaf.to_bytes().unwrap(), data);
        let _ = leaf.leaf_hash();
    }
});
