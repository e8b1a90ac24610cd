//! Per-channel (component) state: sampling factors, table indices, and
//! the running DC predictor.
use crate::errors::DecodeErrors;

/// One color channel as declared by SOF0, plus the decoder's running
/// state for it.
pub struct Component {
    /// The raw component id byte as it appeared in the stream (not
    /// necessarily 1/2/3; SOS resolves a channel by searching for this id
    /// rather than indexing an array by its value directly).
    pub id: u8,
    pub horizontal_sample: u8,
    pub vertical_sample: u8,
    pub quantization_table: usize,
    pub dc_table: usize,
    pub ac_table: usize,
    /// Running DC predictor for this channel within the current scan.
    pub dc_prediction: i32,
}

impl Component {
    pub fn parse(bytes: [u8; 3]) -> Result<Self, DecodeErrors> {
        let id = bytes[0];
        let horizontal_sample = bytes[1] >> 4;
        let vertical_sample = bytes[1] & 0x0F;
        let quantization_table = usize::from(bytes[2]);

        if !(1..=4).contains(&horizontal_sample) || !(1..=4).contains(&vertical_sample) {
            return Err(DecodeErrors::BadSegment(format!(
                "component {id} declared sampling factors {horizontal_sample}x{vertical_sample}, expected 1..=4"
            )));
        }
        if quantization_table >= crate::options::MAX_TABLES {
            return Err(DecodeErrors::BadSegment(format!(
                "component {id} referenced quantization table {quantization_table}, out of range"
            )));
        }

        Ok(Self {
            id,
            horizontal_sample,
            vertical_sample,
            quantization_table,
            dc_table: 0,
            ac_table: 0,
            dc_prediction: 0,
        })
    }

    #[must_use]
    pub fn blocks_per_mcu(&self) -> usize {
        usize::from(self.horizontal_sample) * usize::from(self.vertical_sample)
    }
}
