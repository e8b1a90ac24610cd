//! Marker-segment parsing and the top-level decode loop.
//!
//! Drives the segment state machine (SOI, APPn, COM, DQT, DHT, SOF0, SOS,
//! EOI), then hands off to the entropy decoder and MCU assembler for the
//! scan itself.
use crate::bitreader::{extend_sign, BitReader};
use crate::color_convert::{level_shift, ycbcr_to_rgb};
use crate::component::Component;
use crate::errors::{DecodeErrors, UnsupportedSchemes};
use crate::huffman::HuffmanTree;
use crate::idct::DctCalculator;
use crate::misc::{ColorSpace, START_OF_FRAME_BASE, UN_ZIGZAG};
use crate::options::{DecoderOptions, MAX_COMPONENTS, MAX_TABLES};
use crate::sink::ImageSink;

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const COM: u8 = 0xFE;
const DQT: u8 = 0xDB;
const DHT: u8 = 0xC4;
const SOF0: u8 = START_OF_FRAME_BASE;
const SOS: u8 = 0xDA;

/// A baseline sequential JPEG decoder.
///
/// Single use: construct one, call [`Decoder::decode`] once, and discard
/// it. There is no support for reusing a decoder across streams; this
/// keeps the component/table state simple and matches the single-pass,
/// single-threaded model the decoder is built for.
pub struct Decoder {
    options: DecoderOptions,
    qt_tables: [Option<[i32; 64]>; MAX_TABLES],
    dc_huffman_tables: [Option<HuffmanTree>; MAX_TABLES],
    ac_huffman_tables: [Option<HuffmanTree>; MAX_TABLES],
    components: Vec<Component>,
    width: u16,
    height: u16,
    max_h: u8,
    max_v: u8,
    seen_sof: bool,
    idct: DctCalculator,
    input_colorspace: ColorSpace,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_options(DecoderOptions::new())
    }

    #[must_use]
    pub fn new_with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            qt_tables: Default::default(),
            dc_huffman_tables: Default::default(),
            ac_huffman_tables: Default::default(),
            components: Vec::new(),
            width: 0,
            height: 0,
            max_h: 1,
            max_v: 1,
            seen_sof: false,
            idct: DctCalculator::new(),
            input_colorspace: ColorSpace::YCbCr,
        }
    }

    /// The color space SOF0 declared for the source stream: `GRAYSCALE`
    /// for a single-channel frame, `YCbCr` otherwise (every multi-channel
    /// baseline stream this decoder accepts is YCbCr; it is always
    /// converted to RGB before reaching the image sink regardless). Only
    /// meaningful after [`Decoder::decode`] has parsed SOF0; before that
    /// it reads as `YCbCr`, the default.
    #[must_use]
    pub fn input_colorspace(&self) -> ColorSpace {
        self.input_colorspace
    }

    /// Decodes `data` as a complete baseline JPEG stream, feeding the
    /// result into `sink`.
    pub fn decode(&mut self, data: &[u8], sink: &mut impl ImageSink) -> Result<(), DecodeErrors> {
        let mut reader = BitReader::new(data);

        let marker = self.expect_marker(&mut reader)?;
        if marker != SOI {
            return Err(DecodeErrors::BadMarker(format!(
                "expected SOI (0xFFD8) as the first marker, found 0xFF{marker:02X}"
            )));
        }
        debug!("SOI");

        loop {
            let marker = self.expect_marker(&mut reader)?;
            match marker {
                EOI => {
                    return Err(DecodeErrors::BadMarker(
                        "encountered EOI before SOS".into(),
                    ))
                }
                COM => self.parse_com(&mut reader, sink)?,
                DQT => self.parse_dqt(&mut reader)?,
                DHT => self.parse_dht(&mut reader)?,
                SOF0 => self.parse_sof0(&mut reader, sink)?,
                m if (0xE0..=0xEF).contains(&m) => self.skip_app(&mut reader, m)?,
                SOS => {
                    self.parse_sos_and_decode(&mut reader, sink)?;
                    return self.expect_eoi(&mut reader);
                }
                m => {
                    if let Some(feature) = UnsupportedSchemes::from_sof_marker(m) {
                        return Err(DecodeErrors::Unsupported(feature));
                    }
                    return Err(DecodeErrors::BadMarker(format!(
                        "unrecognized marker 0xFF{m:02X}"
                    )));
                }
            }
        }
    }

    fn expect_marker(&self, reader: &mut BitReader) -> Result<u8, DecodeErrors> {
        let first = reader.read_u8()?;
        if first != 0xFF {
            return Err(DecodeErrors::BadMarker(format!(
                "expected a marker (0xFF..) but found 0x{first:02X}"
            )));
        }
        let mut marker = reader.read_u8()?;
        // Fill bytes (extra 0xFF before the real marker) are legal.
        while marker == 0xFF {
            marker = reader.read_u8()?;
        }
        Ok(marker)
    }

    /// Checks for the EOI marker right after the last MCU of the scan, by
    /// peeking the next two bytes before consuming them -- the only
    /// lookahead this decoder ever needs.
    fn expect_eoi(&self, reader: &mut BitReader) -> Result<(), DecodeErrors> {
        let (first, second) = reader.peek_two_bytes().ok_or_else(|| {
            DecodeErrors::TruncatedStream(
                "stream ended before the EOI marker following the scan".into(),
            )
        })?;
        if first != 0xFF || second != EOI {
            return Err(DecodeErrors::BadMarker(format!(
                "expected EOI (0xFFD9) after the scan, found 0x{first:02X}{second:02X}"
            )));
        }
        reader.read_u8()?;
        reader.read_u8()?;
        debug!("EOI");
        Ok(())
    }

    fn segment_length(&self, reader: &mut BitReader) -> Result<usize, DecodeErrors> {
        let len = reader.read_u16_be()?;
        if len < 2 {
            return Err(DecodeErrors::BadSegment(format!(
                "segment declared length {len}, which cannot even cover its own length field"
            )));
        }
        Ok(usize::from(len) - 2)
    }

    fn skip_app(&self, reader: &mut BitReader, marker: u8) -> Result<(), DecodeErrors> {
        let len = self.segment_length(reader)?;
        warn!("skipping APP{} segment ({} bytes)", marker & 0x0F, len);
        for _ in 0..len {
            reader.read_u8()?;
        }
        Ok(())
    }

    fn parse_com(
        &self,
        reader: &mut BitReader,
        sink: &mut impl ImageSink,
    ) -> Result<(), DecodeErrors> {
        let len = self.segment_length(reader)?;
        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            bytes.push(reader.read_u8()?);
        }
        if self.options.strict_comments() && std::str::from_utf8(&bytes).is_err() {
            return Err(DecodeErrors::BadSegment(
                "COM segment was not valid UTF-8 and strict_comments is set".into(),
            ));
        }
        debug!("COM: {} bytes", bytes.len());
        sink.set_comment(&bytes);
        Ok(())
    }

    /// Debits `amount` bytes from a segment's declared remaining length,
    /// failing with `BadSegment` rather than underflowing when the
    /// segment claimed fewer bytes than its own fields require.
    fn debit(remaining: &mut usize, amount: usize, what: &str) -> Result<(), DecodeErrors> {
        *remaining = remaining.checked_sub(amount).ok_or_else(|| {
            DecodeErrors::BadSegment(format!(
                "segment's declared length ran out before {what} could be read"
            ))
        })?;
        Ok(())
    }

    fn parse_dqt(&mut self, reader: &mut BitReader) -> Result<(), DecodeErrors> {
        let mut remaining = self.segment_length(reader)?;
        while remaining > 0 {
            let pq_tq = reader.read_u8()?;
            Self::debit(&mut remaining, 1, "a DQT precision/table-id byte")?;
            let precision = pq_tq >> 4;
            let table_id = usize::from(pq_tq & 0x0F);
            if table_id >= MAX_TABLES {
                return Err(DecodeErrors::BadSegment(format!(
                    "DQT referenced table id {table_id}, out of range"
                )));
            }

            let mut zigzag = [0i32; 64];
            for slot in zigzag.iter_mut() {
                *slot = if precision == 0 {
                    let v = reader.read_u8()?;
                    Self::debit(&mut remaining, 1, "an 8-bit quantization coefficient")?;
                    i32::from(v)
                } else {
                    let v = reader.read_u16_be()?;
                    Self::debit(&mut remaining, 2, "a 16-bit quantization coefficient")?;
                    i32::from(v)
                };
            }
            let mut table = [0i32; 64];
            for (i, &value) in zigzag.iter().enumerate() {
                table[UN_ZIGZAG[i]] = value;
            }
            debug!("DQT: table {table_id}, precision {precision}");
            self.qt_tables[table_id] = Some(table);
        }
        Ok(())
    }

    fn parse_dht(&mut self, reader: &mut BitReader) -> Result<(), DecodeErrors> {
        let mut remaining = self.segment_length(reader)?;
        while remaining > 0 {
            let tc_th = reader.read_u8()?;
            Self::debit(&mut remaining, 1, "a DHT class/table-id byte")?;
            let class = tc_th >> 4;
            let table_id = usize::from(tc_th & 0x0F);
            if table_id >= MAX_TABLES {
                return Err(DecodeErrors::BadSegment(format!(
                    "DHT referenced table id {table_id}, out of range"
                )));
            }

            let mut counts = [0u8; 16];
            for c in counts.iter_mut() {
                *c = reader.read_u8()?;
            }
            Self::debit(&mut remaining, 16, "16 code-length counts")?;
            let total: usize = counts.iter().map(|&c| c as usize).sum();
            let mut values = Vec::with_capacity(total);
            for _ in 0..total {
                values.push(reader.read_u8()?);
            }
            Self::debit(&mut remaining, total, "the Huffman code values")?;

            let tree = HuffmanTree::build(&counts, &values)?;
            debug!(
                "DHT: {} table {table_id}, {total} codes",
                if class == 0 { "DC" } else { "AC" }
            );
            if class == 0 {
                self.dc_huffman_tables[table_id] = Some(tree);
            } else {
                self.ac_huffman_tables[table_id] = Some(tree);
            }
        }
        Ok(())
    }

    fn parse_sof0(
        &mut self,
        reader: &mut BitReader,
        sink: &mut impl ImageSink,
    ) -> Result<(), DecodeErrors> {
        if self.seen_sof {
            return Err(DecodeErrors::BadMarker(
                "encountered a second SOF0 segment".into(),
            ));
        }
        let _len = self.segment_length(reader)?;
        let precision = reader.read_u8()?;
        if precision != 8 {
            return Err(DecodeErrors::BadSegment(format!(
                "SOF0 declared {precision}-bit sample precision; only 8-bit is supported"
            )));
        }
        let height = reader.read_u16_be()?;
        let width = reader.read_u16_be()?;
        let pixels = usize::from(width) * usize::from(height);
        if pixels == 0 {
            return Err(DecodeErrors::BadSegment(
                "SOF0 declared a zero-area image".into(),
            ));
        }
        if pixels > self.options.max_pixels() {
            return Err(DecodeErrors::BadSegment(format!(
                "SOF0 declared {width}x{height} ({pixels} pixels), exceeding the configured limit"
            )));
        }

        let n_channels = usize::from(reader.read_u8()?);
        if n_channels == 0 || n_channels > MAX_COMPONENTS {
            return Err(DecodeErrors::BadSegment(format!(
                "SOF0 declared {n_channels} channels"
            )));
        }

        let mut components = Vec::with_capacity(n_channels);
        let mut max_h = 1u8;
        let mut max_v = 1u8;
        for _ in 0..n_channels {
            let id = reader.read_u8()?;
            let sampling = reader.read_u8()?;
            let qt = reader.read_u8()?;
            let component = Component::parse([id, sampling, qt])?;
            max_h = max_h.max(component.horizontal_sample);
            max_v = max_v.max(component.vertical_sample);
            components.push(component);
        }

        debug!("SOF0: {width}x{height}, {n_channels} channel(s), max sampling {max_h}x{max_v}");

        self.width = width;
        self.height = height;
        self.max_h = max_h;
        self.max_v = max_v;
        self.input_colorspace = if n_channels == 1 {
            ColorSpace::GRAYSCALE
        } else {
            ColorSpace::YCbCr
        };
        self.components = components;
        self.seen_sof = true;
        sink.set_size(width, height);
        Ok(())
    }

    fn parse_sos_and_decode(
        &mut self,
        reader: &mut BitReader,
        sink: &mut impl ImageSink,
    ) -> Result<(), DecodeErrors> {
        if !self.seen_sof {
            return Err(DecodeErrors::BadMarker(
                "encountered SOS before SOF0".into(),
            ));
        }
        let _len = self.segment_length(reader)?;
        let n_channels = usize::from(reader.read_u8()?);
        if n_channels != self.components.len() {
            return Err(DecodeErrors::BadSegment(format!(
                "SOS declared {n_channels} channels, SOF0 declared {}",
                self.components.len()
            )));
        }

        let mut scan_order = Vec::with_capacity(n_channels);
        for _ in 0..n_channels {
            let id = reader.read_u8()?;
            let tables = reader.read_u8()?;
            let dense_index = self
                .components
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| {
                    DecodeErrors::BadSegment(format!(
                        "SOS referenced component id {id} not declared in SOF0"
                    ))
                })?;
            self.components[dense_index].dc_table = usize::from(tables >> 4);
            self.components[dense_index].ac_table = usize::from(tables & 0x0F);
            self.components[dense_index].dc_prediction = 0;
            scan_order.push(dense_index);
        }

        let spectral_start = reader.read_u8()?;
        let spectral_end = reader.read_u8()?;
        let approximation = reader.read_u8()?;
        if spectral_start != 0 || spectral_end != 0x3F || approximation != 0 {
            return Err(DecodeErrors::Unsupported(
                UnsupportedSchemes::ProgressiveDctHuffman,
            ));
        }

        debug!("SOS: {n_channels} channel(s)");

        for &idx in &scan_order {
            let dc_idx = self.components[idx].dc_table;
            let ac_idx = self.components[idx].ac_table;
            if self.dc_huffman_tables[dc_idx].is_none() {
                return Err(DecodeErrors::BadTable(format!(
                    "channel references DC Huffman table {dc_idx}, never defined"
                )));
            }
            if self.ac_huffman_tables[ac_idx].is_none() {
                return Err(DecodeErrors::BadTable(format!(
                    "channel references AC Huffman table {ac_idx}, never defined"
                )));
            }
            if self.qt_tables[self.components[idx].quantization_table].is_none() {
                return Err(DecodeErrors::BadTable(format!(
                    "channel references quantization table {}, never defined",
                    self.components[idx].quantization_table
                )));
            }
        }

        reader.set_skip_stuffing(true);
        self.decode_scan(reader, &scan_order, sink)?;
        reader.discard_partial_byte();
        reader.set_skip_stuffing(false);
        Ok(())
    }

    /// Decodes every MCU of the single scan this decoder supports, tiling
    /// the image in row-major MCU order and, within each MCU, channels in
    /// SOS declaration order and blocks in row-major order within each
    /// channel's sampling grid. This interleaving order is load-bearing
    /// because the DC predictor is a sequential dependency.
    fn decode_scan(
        &mut self,
        reader: &mut BitReader,
        scan_order: &[usize],
        sink: &mut impl ImageSink,
    ) -> Result<(), DecodeErrors> {
        let max_h = self.max_h;
        let max_v = self.max_v;
        let mcu_pixel_w = 8 * usize::from(max_h);
        let mcu_pixel_h = 8 * usize::from(max_v);
        let mcu_cols = (usize::from(self.width) + mcu_pixel_w - 1) / mcu_pixel_w;
        let mcu_rows = (usize::from(self.height) + mcu_pixel_h - 1) / mcu_pixel_h;

        for mcu_row in 0..mcu_rows {
            for mcu_col in 0..mcu_cols {
                let mut channel_grids: Vec<(usize, usize, Vec<i32>)> =
                    Vec::with_capacity(scan_order.len());

                for &idx in scan_order {
                    let (h_c, v_c, grid_w, grid) = self.decode_channel_blocks(reader, idx)?;
                    let _ = h_c;
                    channel_grids.push((grid_w, v_c as usize, grid));
                }

                self.emit_mcu_pixels(
                    mcu_row,
                    mcu_col,
                    mcu_pixel_w,
                    mcu_pixel_h,
                    scan_order,
                    &channel_grids,
                    sink,
                )?;
            }
        }
        Ok(())
    }

    /// Decodes every 8x8 block of one channel within one MCU, dequantizes
    /// and IDCTs each, and assembles them into a single spatial-domain
    /// grid sized `(8*H_c) x (8*V_c)`.
    fn decode_channel_blocks(
        &mut self,
        reader: &mut BitReader,
        component_idx: usize,
    ) -> Result<(u8, u8, usize, Vec<i32>), DecodeErrors> {
        // Split into disjoint field borrows: the Huffman/quant tables are
        // read-only here while `components[component_idx].dc_prediction`
        // must be mutated in place as the running DC predictor.
        let Self {
            dc_huffman_tables,
            ac_huffman_tables,
            qt_tables,
            idct,
            components,
            ..
        } = self;
        let comp = &mut components[component_idx];
        let h_c = comp.horizontal_sample;
        let v_c = comp.vertical_sample;

        let dc_tree = dc_huffman_tables[comp.dc_table]
            .as_ref()
            .expect("presence checked in parse_sos_and_decode");
        let ac_tree = ac_huffman_tables[comp.ac_table]
            .as_ref()
            .expect("presence checked in parse_sos_and_decode");
        let quant =
            qt_tables[comp.quantization_table].expect("presence checked in parse_sos_and_decode");

        let grid_w = 8 * usize::from(h_c);
        let grid_h = 8 * usize::from(v_c);
        debug_assert_eq!(comp.blocks_per_mcu(), grid_w / 8 * (grid_h / 8));
        let mut grid = vec![0i32; grid_w * grid_h];

        for block_row in 0..usize::from(v_c) {
            for block_col in 0..usize::from(h_c) {
                let mut block = Self::decode_one_block(
                    reader,
                    dc_tree,
                    ac_tree,
                    &quant,
                    &mut comp.dc_prediction,
                )?;
                idct.inverse_transform(&mut block);

                for r in 0..8 {
                    for c in 0..8 {
                        let gy = block_row * 8 + r;
                        let gx = block_col * 8 + c;
                        grid[gy * grid_w + gx] = block[r * 8 + c];
                    }
                }
            }
        }

        Ok((h_c, v_c, grid_w, grid))
    }

    /// Decodes a single 8x8 block's coefficients, dequantizes with
    /// `quant`, and returns the natural-order, still-frequency-domain
    /// block (the caller runs the IDCT).
    ///
    /// `dc_prediction` is the channel's running DC predictor: the decoded
    /// value is a *difference* that accumulates onto it, and the updated
    /// predictor becomes this block's DC coefficient.
    fn decode_one_block(
        reader: &mut BitReader,
        dc_tree: &HuffmanTree,
        ac_tree: &HuffmanTree,
        quant: &[i32; 64],
        dc_prediction: &mut i32,
    ) -> Result<[i32; 64], DecodeErrors> {
        let mut zigzag = [0i32; 64];

        let s = dc_tree.decode_symbol(reader)?;
        if s > 11 {
            return Err(DecodeErrors::BadEntropy(format!(
                "DC coefficient category {s} exceeds the 8-bit-precision maximum of 11"
            )));
        }
        let diff = if s == 0 {
            0
        } else {
            extend_sign(reader.read_bits(s)?, s)
        };

        *dc_prediction += diff;
        let dc_coefficient = *dc_prediction;
        zigzag[0] = dc_coefficient;

        let mut k = 1;
        while k < 64 {
            let rs = ac_tree.decode_symbol(reader)?;
            let run = rs >> 4;
            let size = rs & 0x0F;

            if rs == 0x00 {
                break; // EOB
            }
            if run == 15 && size == 0 {
                // ZRL: 16 zero coefficients, no trailing value bits. Unlike
                // the run/size case below, landing exactly on k == 64 is a
                // block that ends precisely filled by the run, not an
                // overrun -- the while loop's own `k < 64` then ends it.
                k += 16;
                if k > 64 {
                    return Err(DecodeErrors::BadEntropy(
                        "ZRL run overran the 64-coefficient block".into(),
                    ));
                }
                continue;
            }
            k += usize::from(run);
            if k >= 64 {
                return Err(DecodeErrors::BadEntropy(
                    "AC run-length overran the 64-coefficient block".into(),
                ));
            }
            let value = extend_sign(reader.read_bits(size)?, size);
            zigzag[k] = value;
            k += 1;
        }

        let mut block = [0i32; 64];
        for (i, &coeff) in zigzag.iter().enumerate() {
            block[UN_ZIGZAG[i]] = coeff * quant[UN_ZIGZAG[i]];
        }

        Ok(block)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_mcu_pixels(
        &self,
        mcu_row: usize,
        mcu_col: usize,
        mcu_pixel_w: usize,
        mcu_pixel_h: usize,
        scan_order: &[usize],
        channel_grids: &[(usize, usize, Vec<i32>)],
        sink: &mut impl ImageSink,
    ) -> Result<(), DecodeErrors> {
        let width = usize::from(self.width);
        let height = usize::from(self.height);
        let max_h = self.max_h;
        let max_v = self.max_v;

        // Channels are indexed densely by SOF0 declaration order: by
        // convention the first declared channel is luma and, when present,
        // the second and third are Cb and Cr. Resolve each by its dense
        // index rather than assuming SOS repeats SOF0's order verbatim.
        let position_of = |dense_idx: usize| -> usize {
            scan_order
                .iter()
                .position(|&i| i == dense_idx)
                .unwrap_or(0)
        };
        let grayscale = self.input_colorspace == ColorSpace::GRAYSCALE;
        let y_pos = position_of(0);
        let (cb_pos, cr_pos) = if grayscale {
            (0, 0)
        } else {
            (position_of(1), position_of(2))
        };

        for i in 0..mcu_pixel_h {
            let out_y = mcu_row * mcu_pixel_h + i;
            if out_y >= height {
                continue;
            }
            for j in 0..mcu_pixel_w {
                let out_x = mcu_col * mcu_pixel_w + j;
                if out_x >= width {
                    continue;
                }

                let sample_channel = |c: usize| -> i32 {
                    let (grid_w, v_c, ref grid) = channel_grids[c];
                    let h_c = grid_w / 8;
                    crate::upsample::nearest_neighbor_sample(
                        grid,
                        grid_w,
                        v_c as u8,
                        h_c as u8,
                        max_v,
                        max_h,
                        i,
                        j,
                    )
                };

                let y_sample = level_shift(sample_channel(y_pos));
                let (cb_sample, cr_sample) = if grayscale {
                    (128u8, 128u8)
                } else {
                    (
                        level_shift(sample_channel(cb_pos)),
                        level_shift(sample_channel(cr_pos)),
                    )
                };

                let rgb = if grayscale {
                    (y_sample, y_sample, y_sample)
                } else {
                    ycbcr_to_rgb(y_sample, cb_sample, cr_sample)
                };
                sink.set_pixel(out_y as u16, out_x as u16, rgb);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// DC table with one code: "0" -> category 0 (difference 0).
    fn dc_tree() -> HuffmanTree {
        let mut lengths = [0u8; 16];
        lengths[0] = 1;
        HuffmanTree::build(&lengths, &[0x00]).unwrap()
    }

    /// AC table with three codes: "0" -> EOB, "10" -> ZRL (run=15,size=0),
    /// "11" -> run=0/size=1 (a single-bit-magnitude coefficient).
    fn ac_tree_with_zrl() -> HuffmanTree {
        let mut lengths = [0u8; 16];
        lengths[0] = 1; // one 1-bit code: EOB
        lengths[1] = 2; // two 2-bit codes: ZRL, run0/size1
        HuffmanTree::build(&lengths, &[0x00, 0xF0, 0x01]).unwrap()
    }

    #[test]
    fn zrl_skips_sixteen_coefficients_before_the_next_value() {
        // Bits: DC "0" (diff 0), AC "10" (ZRL), AC "11" (run0/size1) + "1"
        // (magnitude bit, value +1), AC "0" (EOB), padded with 1s to a
        // byte: 0 10 11 1 0 | 1 -> 0101_1101 = 0x5D.
        let mut reader = BitReader::new(&[0x5D]);
        let dc_tree = dc_tree();
        let ac_tree = ac_tree_with_zrl();
        let quant = [1i32; 64];
        let mut dc_prediction = 0;

        let block =
            Decoder::decode_one_block(&mut reader, &dc_tree, &ac_tree, &quant, &mut dc_prediction)
                .unwrap();

        // The ZRL run lands the next coefficient at zig-zag index 1 + 16 =
        // 17 (index 0 is the DC term), not 2.
        let expected_natural_index = UN_ZIGZAG[17];
        for (i, &v) in block.iter().enumerate() {
            if i == expected_natural_index {
                assert_eq!(v, 1, "coefficient after the ZRL run");
            } else {
                assert_eq!(v, 0, "coefficient at natural index {i} should be zero");
            }
        }
    }

    #[test]
    fn zrl_that_would_overrun_the_block_is_bad_entropy() {
        // DC "0", then four ZRLs in a row: 4 * 16 = 64 zero coefficients
        // overruns the 63 AC slots (zig-zag indices 1..=63) before a
        // terminating EOB is ever read.
        let mut writer = BitBuf::default();
        writer.push(0, 1); // DC diff 0
        for _ in 0..4 {
            writer.push(0b10, 2); // ZRL
        }
        let bits = writer.into_bytes();

        let mut reader = BitReader::new(&bits);
        let dc_tree = dc_tree();
        let ac_tree = ac_tree_with_zrl();
        let quant = [1i32; 64];
        let mut dc_prediction = 0;

        assert!(matches!(
            Decoder::decode_one_block(&mut reader, &dc_tree, &ac_tree, &quant, &mut dc_prediction),
            Err(DecodeErrors::BadEntropy(_))
        ));
    }

    /// Minimal MSB-first bit accumulator for hand-built entropy fixtures,
    /// local to these tests (the shared integration-test `BitWriter`
    /// lives in `tests/support` and isn't visible from here).
    #[derive(Default)]
    struct BitBuf {
        bytes: Vec<u8>,
        cur: u8,
        nbits: u8,
    }

    impl BitBuf {
        fn push(&mut self, value: u32, count: u8) {
            for i in (0..count).rev() {
                let bit = ((value >> i) & 1) as u8;
                self.cur = (self.cur << 1) | bit;
                self.nbits += 1;
                if self.nbits == 8 {
                    self.bytes.push(self.cur);
                    self.cur = 0;
                    self.nbits = 0;
                }
            }
        }

        fn into_bytes(mut self) -> Vec<u8> {
            if self.nbits > 0 {
                let pad = 8 - self.nbits;
                self.cur = (self.cur << pad) | ((1u16 << pad) - 1) as u8;
                self.bytes.push(self.cur);
            }
            self.bytes
        }
    }
}
