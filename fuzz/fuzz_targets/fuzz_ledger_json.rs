#![no_main]

use libfuzzer_sys::fuzz_target;
use slipway::RevisionLedger;

fuzz_target!(|data: &[u8]| {
    // Whatever the host returns, loading never panics and always yields a
    // ledger that survives its own serialization.
    let (ledger, _err) = RevisionLedger::load(data);
    let reparsed = RevisionLedger::parse(ledger.serialize().as_bytes());
    assert_eq!(reparsed.ok(), Some(ledger));
});
