//! Analog keyboard HID report layout and decoding primitives.
//!
//! This crate is intentionally small, I/O-free, and dependency-free so
//! the plugin and host-side tooling can share decode logic without
//! pulling in runtime concerns.
//!
//! The analog interface delivers a fixed-size input report packed as
//! consecutive 3-byte records: a big-endian 16-bit keycode followed by an
//! 8-bit intensity. Active keys sit contiguously at the front of the
//! report in firmware priority order; the first zero-intensity record
//! terminates the list and everything after it is padding.

/// Byte layout of the analog input report.
pub mod analog_report {
    /// Total report length in bytes.
    pub const REPORT_LEN: usize = 48;
    /// One record: big-endian keycode (2 bytes) + intensity (1 byte).
    pub const RECORD_LEN: usize = 3;
    /// Maximum number of key records one report can carry.
    pub const MAX_RECORDS: usize = REPORT_LEN / RECORD_LEN;
}

/// Raw intensity above which [`scale_bulk`] saturates to full travel.
pub const BULK_CLAMP_RAW: u8 = 225;

/// Gain applied by [`scale_single_key`] before clamping.
pub const SINGLE_KEY_GAIN: f32 = 1.2;

/// One raw record before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogRecordRaw {
    pub code: u16,
    pub value: u8,
}

/// One decoded (keycode, unit-interval intensity) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogSample {
    pub code: u16,
    pub value: f32,
}

/// Lightweight borrowed view over one raw analog report.
#[derive(Debug, Clone, Copy)]
pub struct RawAnalogReport<'a> {
    report: &'a [u8],
}

impl<'a> RawAnalogReport<'a> {
    pub fn new(report: &'a [u8]) -> Self {
        Self { report }
    }

    pub fn report_bytes(&self) -> &'a [u8] {
        self.report
    }

    /// Record at `index`, or `None` past the end of the buffer.
    ///
    /// A trailing partial record (fewer than 3 bytes left) is ignored.
    pub fn record(&self, index: usize) -> Option<AnalogRecordRaw> {
        let start = index.checked_mul(analog_report::RECORD_LEN)?;
        let bytes = self
            .report
            .get(start..start.checked_add(analog_report::RECORD_LEN)?)?;
        Some(AnalogRecordRaw {
            code: u16::from_be_bytes([bytes[0], bytes[1]]),
            value: bytes[2],
        })
    }

    /// Iterate records up to the first zero-intensity terminator.
    pub fn active_records(self) -> impl Iterator<Item = AnalogRecordRaw> + 'a {
        (0..analog_report::MAX_RECORDS)
            .map_while(move |index| self.record(index))
            .take_while(|record| record.value != 0)
    }
}

/// Bulk-read scaling: raw values above [`BULK_CLAMP_RAW`] saturate to
/// full travel before normalization, so 226..=255 all read as 1.0.
///
/// Deliberately different from [`scale_single_key`]. Hosts calibrate
/// against each entry point separately; the two curves must not be
/// unified.
pub fn scale_bulk(value: u8) -> f32 {
    let value = if value > BULK_CLAMP_RAW { u8::MAX } else { value };
    f32::from(value) / 255.0
}

/// Single-key scaling: [`SINGLE_KEY_GAIN`] gain, clamped to the unit
/// interval.
pub fn scale_single_key(value: u8) -> f32 {
    (f32::from(value) * SINGLE_KEY_GAIN / 255.0).min(1.0)
}

/// Decode one raw report with the bulk policy.
///
/// Stops at the first zero-intensity record or after `max_entries`
/// results, whichever comes first.
pub fn decode_report(report: &[u8], max_entries: usize) -> Vec<AnalogSample> {
    RawAnalogReport::new(report)
        .active_records()
        .take(max_entries)
        .map(|record| AnalogSample {
            code: record.code,
            value: scale_bulk(record.value),
        })
        .collect()
}

/// Raw intensity for `code`, or `None` if the key is not active.
///
/// The scan stops at the report terminator, so a key buried behind the
/// zero padding is never visible.
pub fn lookup_key(report: &[u8], code: u16) -> Option<u8> {
    RawAnalogReport::new(report)
        .active_records()
        .find(|record| record.code == code)
        .map(|record| record.value)
}
