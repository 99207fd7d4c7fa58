//! Fuzz target for stream framing
//!
//! Splits arbitrary bytes into lines the way a session reads its socket.

#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use tokio_util::codec::Decoder;

use slirc_session::transport::LineCodec;

fuzz_target!(|data: &[u8]| {
    let mut codec = LineCodec::new();
    let mut buf = BytesMut::from(data);
    loop {
        match codec.decode_eof(&mut buf) {
            Ok(Some(line)) => assert!(!line.contains('\n')),
            Ok(None) | Err(_) => break,
        }
    }
});
