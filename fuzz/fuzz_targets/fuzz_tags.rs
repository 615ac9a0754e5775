// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use amalthea::tags::TagSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let tags = TagSet::parse(text);
    assert!(tags.iter().all(|t| !t.is_empty() && t.trim() == t));

    assert_eq!(TagSet::parse(&tags.to_string()), tags);

    let mut merged = tags.clone();
    if let Some(first) = tags.iter().next() {
        assert!(!merged.push_unique(first));
        assert_eq!(merged, tags);
    }
});
