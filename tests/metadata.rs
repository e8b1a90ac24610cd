//! End-to-end COM segment scenario.
mod support;

use baseline_jpeg::Decoder;
use support::{
    dht_ac, dht_dc, dqt_identity, emit_dc_zero, emit_eob, segment, sof0_body, sos_body, BitWriter,
    ProbeSink,
};

#[test]
fn com_segment_before_sof0_is_delivered_once() {
    let mut data = vec![0xFF, 0xD8]; // SOI
    segment(&mut data, 0xFE, b"hello"); // COM, before SOF0
    segment(&mut data, 0xDB, &dqt_identity(0));
    segment(&mut data, 0xC4, &dht_dc(0));
    segment(&mut data, 0xC4, &dht_ac(0));
    segment(&mut data, 0xC0, &sof0_body(1, 1, &[(1, 1, 1, 0)]));
    segment(&mut data, 0xDA, &sos_body(&[(1, 0, 0)]));

    let mut bw = BitWriter::new();
    emit_dc_zero(&mut bw);
    emit_eob(&mut bw);
    data.extend_from_slice(&bw.finish());
    data.push(0xFF);
    data.push(0xD9); // EOI

    let mut sink = ProbeSink::default();
    Decoder::new().decode(&data, &mut sink).unwrap();

    assert_eq!(sink.comments, vec![b"hello".to_vec()]);
    assert_eq!(sink.pixel(0, 0), (128, 128, 128));
}

#[test]
fn multiple_com_segments_are_each_delivered() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xFE, b"first");
    segment(&mut data, 0xFE, b"second");
    segment(&mut data, 0xDB, &dqt_identity(0));
    segment(&mut data, 0xC4, &dht_dc(0));
    segment(&mut data, 0xC4, &dht_ac(0));
    segment(&mut data, 0xC0, &sof0_body(1, 1, &[(1, 1, 1, 0)]));
    segment(&mut data, 0xDA, &sos_body(&[(1, 0, 0)]));

    let mut bw = BitWriter::new();
    emit_dc_zero(&mut bw);
    emit_eob(&mut bw);
    data.extend_from_slice(&bw.finish());
    data.push(0xFF);
    data.push(0xD9);

    let mut sink = ProbeSink::default();
    Decoder::new().decode(&data, &mut sink).unwrap();

    assert_eq!(sink.comments, vec![b"first".to_vec(), b"second".to_vec()]);
}
