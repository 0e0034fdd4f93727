/// Units which are simply type aliases for `f32` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// This may be because:
///
/// + The values live in the inner loops of the backprojector, where they are
///   extracted from `uom` quantities once and then used as plain numbers.
///
/// + `uom` has no ready-made quantity for them (inverse area, detector
///   intensities), so we use plain `f32`s, but still want some clues in the
///   source as to what they represent.
///
/// Lengths are in mm unless stated otherwise.

pub type Lengthf32    = f32;
pub type Ratiof32     = f32;
pub type PerAreaf32   = f32; // TODO uom inverse Area for ramp kernel taps
pub type Intensityf32 = f32;
