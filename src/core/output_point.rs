//! Output points with chain-state validation data
//!
//! An output point is the point an input spends, plus a sidecar that chain
//! state fills in before consensus checks run: where the spent output was
//! confirmed and what script locks it. The sidecar never goes on the wire
//! and plays no part in equality.

use crate::codec::{CodecError, Mode, Reader, SliceReader, Writer};
use crate::core::constants::COINBASE_MATURITY;
use crate::core::point::{HashDigest, Point};
use crate::core::script::Script;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Chain-state facts about the output being spent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrevoutValidation {
    /// Height of the block that confirmed the output
    pub height: u64,
    /// Median time past of that block
    pub median_time_past: u32,
    /// Locking script of the output
    pub referenced_script: Script,
    /// Whether the output was created by a coinbase transaction
    pub coinbase: bool,
}

/// Read by predicates when chain state has not populated the sidecar
static UNPOPULATED: PrevoutValidation = PrevoutValidation {
    height: 0,
    median_time_past: 0,
    referenced_script: Script::new(),
    coinbase: false,
};

/// The point an input spends
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputPoint {
    point: Point,
    #[serde(skip)]
    validation: Option<PrevoutValidation>,
}

impl OutputPoint {
    pub fn new(hash: HashDigest, index: u32) -> Self {
        Self::from(Point::new(hash, index))
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn hash(&self) -> &HashDigest {
        self.point.hash()
    }

    pub fn index(&self) -> u32 {
        self.point.index()
    }

    pub fn is_null(&self) -> bool {
        self.point.is_null()
    }

    pub fn is_valid(&self) -> bool {
        self.point.is_valid()
    }

    pub fn reset(&mut self) {
        self.point.reset();
        self.validation = None;
    }

    // Validation sidecar.
    // -------------------------------------------------------------------------

    /// Sidecar as populated by chain state, if it has been
    pub fn validation(&self) -> Option<&PrevoutValidation> {
        self.validation.as_ref()
    }

    pub fn set_validation(&mut self, validation: PrevoutValidation) {
        self.validation = Some(validation);
    }

    pub fn clear_validation(&mut self) {
        self.validation = None;
    }

    /// Sidecar for consensus predicates
    ///
    /// Callers must populate the sidecar first. Release builds read zeros
    /// when they have not.
    pub(crate) fn populated(&self) -> &PrevoutValidation {
        debug_assert!(
            self.validation.is_some(),
            "prevout {} validation not populated",
            self.point
        );
        self.validation.as_ref().unwrap_or(&UNPOPULATED)
    }

    /// Whether a coinbase output has buried deep enough to spend
    ///
    /// Non-coinbase and unpopulated prevouts are always mature.
    pub fn is_mature(&self, target_height: u64) -> bool {
        match &self.validation {
            Some(validation) if validation.coinbase => {
                target_height.saturating_sub(validation.height) >= COINBASE_MATURITY
            }
            _ => true,
        }
    }

    // Serialization.
    // -------------------------------------------------------------------------

    pub fn serialized_size(&self, mode: Mode) -> usize {
        self.point.serialized_size(mode)
    }

    /// Decode the point; the sidecar is cleared
    pub fn from_data<R: Reader>(&mut self, source: &mut R, mode: Mode) -> Result<(), CodecError> {
        self.validation = None;
        self.point.from_data(source, mode)
    }

    pub fn from_bytes(data: &[u8], mode: Mode) -> Result<Self, CodecError> {
        let mut output_point = Self::default();
        output_point.from_data(&mut SliceReader::new(data), mode)?;
        Ok(output_point)
    }

    pub fn to_data<W: Writer>(&self, sink: &mut W, mode: Mode) {
        self.point.to_data(sink, mode);
    }

    pub fn to_bytes(&self, mode: Mode) -> Vec<u8> {
        self.point.to_bytes(mode)
    }
}

impl From<Point> for OutputPoint {
    fn from(point: Point) -> Self {
        Self {
            point,
            validation: None,
        }
    }
}

impl PartialEq for OutputPoint {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for OutputPoint {}

impl Hash for OutputPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.point, state);
    }
}

impl fmt::Display for OutputPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.point, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_excluded_from_equality_and_wire() {
        let plain = OutputPoint::new([7u8; 32], 2);
        let mut populated = plain.clone();
        populated.set_validation(PrevoutValidation {
            height: 500,
            median_time_past: 1_600_000_000,
            referenced_script: Script::from_program(vec![0x51]),
            coinbase: false,
        });

        assert_eq!(plain, populated);
        assert_eq!(plain.to_bytes(Mode::Wire), populated.to_bytes(Mode::Wire));
    }

    #[test]
    fn test_decode_clears_sidecar() {
        let mut output_point = OutputPoint::new([1u8; 32], 0);
        output_point.set_validation(PrevoutValidation::default());

        let data = OutputPoint::new([2u8; 32], 5).to_bytes(Mode::Store);
        output_point
            .from_data(&mut SliceReader::new(&data), Mode::Store)
            .unwrap();

        assert_eq!(output_point.index(), 5);
        assert!(output_point.validation().is_none());
    }

    #[test]
    fn test_coinbase_maturity() {
        let mut output_point = OutputPoint::new([3u8; 32], 0);
        assert!(output_point.is_mature(0));

        output_point.set_validation(PrevoutValidation {
            height: 1_000,
            coinbase: true,
            ..Default::default()
        });
        assert!(!output_point.is_mature(1_099));
        assert!(output_point.is_mature(1_100));
        assert!(!output_point.is_mature(10));
    }
}
