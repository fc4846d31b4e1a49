#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let _ = matflat::npz::read_from(Cursor::new(data));
    let _ = matflat::npz::npy::read_value(&mut Cursor::new(data));
});
