// Licensed under the Apache-2.0 license

#![no_main]

use attestation::{Attestation, AuthorizationList};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are expected; panics are not
    if let Ok(attestation) = Attestation::from_extension_value(data) {
        let _ = attestation.to_string();
    }
    if let Ok(list) = AuthorizationList::from_der(data) {
        let _ = list.to_string();
        let _ = list.padding_modes_as_strings();
    }
});
