//! End-to-end malformed/unsupported stream scenarios, plus targeted
//! coverage of the remaining error taxonomy not otherwise exercised by
//! the happy-path tests.
mod support;

use baseline_jpeg::{DecodeErrors, Decoder, UnsupportedSchemes};
use support::{
    dht_ac, dht_dc, dqt_identity, emit_dc_zero, emit_eob, segment, sof0_body, sos_body, BitWriter,
    ProbeSink,
};

#[test]
fn progressive_sof_is_reported_as_unsupported() {
    let data = [0xFF, 0xD8, 0xFF, 0xC2];
    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(
        err,
        DecodeErrors::Unsupported(UnsupportedSchemes::ProgressiveDctHuffman)
    ));
    assert!(sink.pixels.is_empty());
}

#[test]
fn lossless_sof_is_reported_as_unsupported() {
    let data = [0xFF, 0xD8, 0xFF, 0xC3];
    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(
        err,
        DecodeErrors::Unsupported(UnsupportedSchemes::LosslessHuffman)
    ));
}

#[test]
fn unstuffed_ff_in_entropy_data_is_bad_entropy() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    segment(&mut data, 0xC4, &dht_dc(0));
    segment(&mut data, 0xC4, &dht_ac(0));
    segment(&mut data, 0xC0, &sof0_body(1, 1, &[(1, 1, 1, 0)]));
    segment(&mut data, 0xDA, &sos_body(&[(1, 0, 0)]));
    // A bare 0xFF immediately followed by EOI's 0xD9: inside entropy data
    // this must be a stuffed 0x00, not a marker.
    data.push(0xFF);
    data.push(0xD9);

    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(err, DecodeErrors::BadEntropy(_)));
}

#[test]
fn non_eight_bit_precision_is_bad_segment() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    segment(&mut data, 0xC4, &dht_dc(0));
    segment(&mut data, 0xC4, &dht_ac(0));
    let mut sof = sof0_body(1, 1, &[(1, 1, 1, 0)]);
    sof[0] = 12; // precision
    segment(&mut data, 0xC0, &sof);
    segment(&mut data, 0xDA, &sos_body(&[(1, 0, 0)]));

    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(err, DecodeErrors::BadSegment(_)));
}

#[test]
fn sos_referencing_undefined_huffman_table_is_bad_table() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    segment(&mut data, 0xC4, &dht_dc(0));
    segment(&mut data, 0xC4, &dht_ac(0));
    segment(&mut data, 0xC0, &sof0_body(1, 1, &[(1, 1, 1, 0)]));
    // References DC/AC table 1, but only table 0 was ever defined.
    segment(&mut data, 0xDA, &sos_body(&[(1, 1, 1)]));

    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(err, DecodeErrors::BadTable(_)));
}

#[test]
fn truncated_stream_is_reported_as_such() {
    // A DQT segment that declares more bytes than actually follow it.
    let data = vec![0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43, 0x00];

    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(err, DecodeErrors::TruncatedStream(_)));
}

#[test]
fn dqt_too_short_for_its_precision_is_bad_segment() {
    // Declares a 16-bit-precision table (high nibble of the pq_tq byte set)
    // but a segment length only long enough for the pq_tq byte itself --
    // no room for even the first 2-byte coefficient, let alone all 64.
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &[0x10]);
    // More stream follows, so a byte cursor that doesn't check the
    // segment's own declared length against what it reads would happily
    // keep consuming these bytes instead of failing.
    segment(&mut data, 0xC4, &dht_dc(0));
    segment(&mut data, 0xC4, &dht_ac(0));
    segment(&mut data, 0xC0, &sof0_body(1, 1, &[(1, 1, 1, 0)]));
    segment(&mut data, 0xDA, &sos_body(&[(1, 0, 0)]));

    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(err, DecodeErrors::BadSegment(_)));
}

#[test]
fn dht_too_short_for_its_code_length_counts_is_bad_segment() {
    // A DHT body of just the class/table-id byte: declares zero more
    // bytes for the mandatory 16 code-length counts.
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    segment(&mut data, 0xC4, &[0x00]);
    segment(&mut data, 0xC4, &dht_ac(0));
    segment(&mut data, 0xC0, &sof0_body(1, 1, &[(1, 1, 1, 0)]));
    segment(&mut data, 0xDA, &sos_body(&[(1, 0, 0)]));

    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(err, DecodeErrors::BadSegment(_)));
}

#[test]
fn eoi_before_sos_is_bad_marker() {
    let data = [0xFF, 0xD8, 0xFF, 0xD9];
    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(err, DecodeErrors::BadMarker(_)));
}

#[test]
fn missing_eoi_after_scan_is_bad_marker() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    segment(&mut data, 0xC4, &dht_dc(0));
    segment(&mut data, 0xC4, &dht_ac(0));
    segment(&mut data, 0xC0, &sof0_body(1, 1, &[(1, 1, 1, 0)]));
    segment(&mut data, 0xDA, &sos_body(&[(1, 0, 0)]));

    let mut bw = BitWriter::new();
    emit_dc_zero(&mut bw);
    emit_eob(&mut bw);
    data.extend_from_slice(&bw.finish());
    // No EOI marker follows.

    let mut sink = ProbeSink::default();
    let err = Decoder::new().decode(&data, &mut sink).unwrap_err();
    assert!(matches!(
        err,
        DecodeErrors::BadMarker(_) | DecodeErrors::TruncatedStream(_)
    ));
}
