//! Tetrahedral A-format to B-format conversion.
//!
//! A first-order tetrahedral microphone delivers four cardioid capsule
//! signals. Sums and differences of opposing capsule pairs give the
//! omnidirectional W channel and the three figure-of-eight channels X
//! (front-back), Y (left-right) and Z (up-down). No normalization or
//! capsule equalization is applied.

use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

/// One capsule of a tetrahedral microphone.
///
/// The declaration order is the canonical A-format channel order used
/// throughout the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capsule {
    /// Front-left-up capsule.
    FrontLeftUp,
    /// Front-right-down capsule.
    FrontRightDown,
    /// Back-left-down capsule.
    BackLeftDown,
    /// Back-right-up capsule.
    BackRightUp,
}

impl Capsule {
    /// All capsules in canonical A-format order.
    pub const ORDER: [Capsule; 4] = [
        Capsule::FrontLeftUp,
        Capsule::FrontRightDown,
        Capsule::BackLeftDown,
        Capsule::BackRightUp,
    ];

    /// Snake-case capsule name (`front_left_up`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Capsule::FrontLeftUp => "front_left_up",
            Capsule::FrontRightDown => "front_right_down",
            Capsule::BackLeftDown => "back_left_down",
            Capsule::BackRightUp => "back_right_up",
        }
    }

    /// Position of the capsule in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Capsule for a 1-based microphone capsule number (1 = FLU ... 4 = BRU).
    pub fn from_number(number: u8) -> Option<Capsule> {
        match number {
            1..=4 => Some(Capsule::ORDER[usize::from(number - 1)]),
            _ => None,
        }
    }
}

impl fmt::Display for Capsule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capsule {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Capsule::ORDER
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| AnalysisError::InputShape(format!("unknown capsule name '{s}'")))
    }
}

/// A B-format channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BChannel {
    /// Omnidirectional pressure.
    W,
    /// Front-back figure-of-eight.
    X,
    /// Left-right figure-of-eight.
    Y,
    /// Up-down figure-of-eight.
    Z,
}

/// Four-channel B-format signal, all channels of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct BFormat {
    w: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl BFormat {
    /// Build from already-orthogonal W, X, Y, Z channels.
    pub fn from_channels(w: Vec<f64>, x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        let len = w.len();
        if x.len() != len || y.len() != len || z.len() != len {
            return Err(AnalysisError::InputShape(format!(
                "B-format channels differ in length: W={}, X={}, Y={}, Z={}",
                len,
                x.len(),
                y.len(),
                z.len()
            )));
        }
        Ok(Self { w, x, y, z })
    }

    /// Samples of one channel.
    pub fn channel(&self, channel: BChannel) -> &[f64] {
        match channel {
            BChannel::W => &self.w,
            BChannel::X => &self.x,
            BChannel::Y => &self.y,
            BChannel::Z => &self.z,
        }
    }

    /// Omnidirectional channel.
    pub fn w(&self) -> &[f64] {
        &self.w
    }

    /// Lateral (left-right) channel.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.w.len()
    }

    /// Whether the channels are empty.
    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }
}

/// Convert four capsule signals, given individually in canonical order.
pub fn convert_a_to_b(
    front_left_up: &[f64],
    front_right_down: &[f64],
    back_left_down: &[f64],
    back_right_up: &[f64],
) -> Result<BFormat> {
    let len = front_left_up.len();
    if front_right_down.len() != len || back_left_down.len() != len || back_right_up.len() != len
    {
        return Err(AnalysisError::InputShape(format!(
            "A-format capsules differ in length: FLU={}, FRD={}, BLD={}, BRU={}",
            len,
            front_right_down.len(),
            back_left_down.len(),
            back_right_up.len()
        )));
    }

    Ok(combine(front_left_up, front_right_down, back_left_down, back_right_up))
}

/// Sum/difference matrix; callers guarantee equal lengths.
fn combine(flu: &[f64], frd: &[f64], bld: &[f64], bru: &[f64]) -> BFormat {
    let len = flu.len();
    let mut w = Vec::with_capacity(len);
    let mut x = Vec::with_capacity(len);
    let mut y = Vec::with_capacity(len);
    let mut z = Vec::with_capacity(len);

    for i in 0..len {
        let front = flu[i] + frd[i];
        let back = bld[i] + bru[i];
        let left = flu[i] + bld[i];
        let right = frd[i] + bru[i];
        let up = flu[i] + bru[i];
        let down = frd[i] + bld[i];

        w.push(front + back);
        x.push(front - back);
        y.push(left - right);
        z.push(up - down);
    }

    BFormat { w, x, y, z }
}

/// Convert an ordered collection of capsule signals (FLU, FRD, BLD, BRU).
///
/// Fails with [`AnalysisError::InputShape`] unless exactly four channels
/// are supplied.
pub fn convert_a_to_b_channels<C: AsRef<[f64]>>(channels: &[C]) -> Result<BFormat> {
    match channels {
        [flu, frd, bld, bru] => convert_a_to_b(flu.as_ref(), frd.as_ref(), bld.as_ref(), bru.as_ref()),
        _ => Err(AnalysisError::InputShape(format!(
            "A-format to B-format conversion requires 4 channels, got {}",
            channels.len()
        ))),
    }
}

/// An A-format capture: four capsule signals sharing one sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AFormatCapture {
    channels: [Vec<f64>; 4],
    sample_rate: u32,
}

impl AFormatCapture {
    /// Build a capture from capsule signals in canonical order.
    pub fn new(channels: [Vec<f64>; 4], sample_rate: u32) -> Result<Self> {
        let len = channels[0].len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(AnalysisError::InputShape(format!(
                "A-format capsules differ in length: {:?}",
                channels.iter().map(Vec::len).collect::<Vec<_>>()
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Samples of one capsule.
    pub fn capsule(&self, capsule: Capsule) -> &[f64] {
        &self.channels[capsule.index()]
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples per capsule.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Whether the capsules are empty.
    pub fn is_empty(&self) -> bool {
        self.channels[0].is_empty()
    }

    /// Convert to B-format.
    pub fn to_b_format(&self) -> BFormat {
        let [flu, frd, bld, bru] = &self.channels;
        combine(flu, frd, bld, bru)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_capsule_patterns() {
        // Only FLU active: front, left, up all positive
        let b = convert_a_to_b(&[1.0], &[0.0], &[0.0], &[0.0]).unwrap();
        assert_eq!(b.w(), &[1.0]);
        assert_eq!(b.channel(BChannel::X), &[1.0]);
        assert_eq!(b.y(), &[1.0]);
        assert_eq!(b.channel(BChannel::Z), &[1.0]);

        // Only FRD active: front, right, down
        let b = convert_a_to_b(&[0.0], &[1.0], &[0.0], &[0.0]).unwrap();
        assert_eq!(b.channel(BChannel::X), &[1.0]);
        assert_eq!(b.y(), &[-1.0]);
        assert_eq!(b.channel(BChannel::Z), &[-1.0]);

        // Only BLD active: back, left, down
        let b = convert_a_to_b(&[0.0], &[0.0], &[1.0], &[0.0]).unwrap();
        assert_eq!(b.channel(BChannel::X), &[-1.0]);
        assert_eq!(b.y(), &[1.0]);
        assert_eq!(b.channel(BChannel::Z), &[-1.0]);

        // Only BRU active: back, right, up
        let b = convert_a_to_b(&[0.0], &[0.0], &[0.0], &[1.0]).unwrap();
        assert_eq!(b.channel(BChannel::X), &[-1.0]);
        assert_eq!(b.y(), &[-1.0]);
        assert_eq!(b.channel(BChannel::Z), &[1.0]);
    }

    #[test]
    fn test_equal_capsules_cancel_directional_channels() {
        let s = vec![0.25, -0.5, 0.75];
        let b = convert_a_to_b(&s, &s, &s, &s).unwrap();
        assert_eq!(b.w(), &[1.0, -2.0, 3.0]);
        assert!(b.channel(BChannel::X).iter().all(|&v| v == 0.0));
        assert!(b.y().iter().all(|&v| v == 0.0));
        assert!(b.channel(BChannel::Z).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_channels_entry_point_matches_separate() {
        let chans = vec![
            vec![0.1, 0.2],
            vec![0.3, -0.4],
            vec![-0.5, 0.6],
            vec![0.7, 0.8],
        ];
        let a = convert_a_to_b_channels(&chans).unwrap();
        let b = convert_a_to_b(&chans[0], &chans[1], &chans[2], &chans[3]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wrong_channel_count() {
        let chans = vec![vec![0.0; 4]; 3];
        let err = convert_a_to_b_channels(&chans).unwrap_err();
        assert!(matches!(err, AnalysisError::InputShape(_)));

        let chans = vec![vec![0.0; 4]; 5];
        assert!(convert_a_to_b_channels(&chans).is_err());
    }

    #[test]
    fn test_unequal_lengths() {
        let err = convert_a_to_b(&[0.0; 4], &[0.0; 4], &[0.0; 3], &[0.0; 4]).unwrap_err();
        assert!(matches!(err, AnalysisError::InputShape(_)));
        assert!(
            AFormatCapture::new([vec![0.0; 2], vec![0.0; 2], vec![0.0; 2], vec![0.0; 1]], 48000)
                .is_err()
        );
    }

    #[test]
    fn test_capsule_names_and_numbers() {
        assert_eq!(Capsule::from_number(1), Some(Capsule::FrontLeftUp));
        assert_eq!(Capsule::from_number(3), Some(Capsule::BackLeftDown));
        assert_eq!(Capsule::from_number(0), None);
        assert_eq!(Capsule::from_number(5), None);
        assert_eq!(
            "back_right_up".parse::<Capsule>().unwrap(),
            Capsule::BackRightUp
        );
        assert!("left".parse::<Capsule>().is_err());
        assert_eq!(Capsule::FrontRightDown.to_string(), "front_right_down");
    }

    #[test]
    fn test_capture_to_b_format() {
        let capture = AFormatCapture::new(
            [vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0], vec![0.0, 0.0]],
            48000,
        )
        .unwrap();
        assert_eq!(capture.len(), 2);
        assert_eq!(capture.capsule(Capsule::FrontRightDown), &[0.0, 1.0]);
        let b = capture.to_b_format();
        assert_eq!(b.w(), &[1.0, 1.0]);
        assert_eq!(b.y(), &[1.0, -1.0]);
    }
}
