//! Apple IIgs `TimeRec` date records.
//!
//! A TimeRec is 8 bytes: second, minute, hour, year (offset from 1900),
//! day, month, a filler byte, and the weekday. Day and month are zero-based
//! and the weekday counts from 1 = Sunday. An all-zero record means "no
//! date". Years below 1940 are read as 2000-2039, following the ShrinkIt
//! Y2K addendum.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Size of an encoded TimeRec in bytes.
pub const TIMEREC_LENGTH: usize = 8;

const SECOND: usize = 0;
const MINUTE: usize = 1;
const HOUR: usize = 2;
const YEAR: usize = 3;
const DAY: usize = 4;
const MONTH: usize = 5;
const WEEKDAY: usize = 7;

/// Decode a TimeRec into a calendar date and time.
///
/// Returns `None` for the all-zero record, and for records whose fields do
/// not form a valid date.
pub fn decode(data: &[u8; TIMEREC_LENGTH]) -> Option<NaiveDateTime> {
    if data.iter().all(|&b| b == 0) {
        return None;
    }

    let mut year = i32::from(data[YEAR]) + 1900;
    if year < 1940 {
        year += 100;
    }

    let decoded = NaiveDate::from_ymd_opt(
        year,
        u32::from(data[MONTH]) + 1,
        u32::from(data[DAY]) + 1,
    )
    .and_then(|date| {
        date.and_hms_opt(
            u32::from(data[HOUR]),
            u32::from(data[MINUTE]),
            u32::from(data[SECOND]),
        )
    });

    if decoded.is_none() {
        log::warn!("ignoring invalid TimeRec {:02x?}", data);
    }
    decoded
}

/// Encode a date as a TimeRec; `None` produces the all-zero record.
pub fn encode(date: Option<&NaiveDateTime>) -> [u8; TIMEREC_LENGTH] {
    let mut data = [0u8; TIMEREC_LENGTH];
    let Some(date) = date else {
        return data;
    };

    let year = date.year();
    let offset = if year < 2000 { year - 1900 } else { year - 2000 };
    data[YEAR] = offset.clamp(0, 0xFF) as u8;
    data[MONTH] = date.month0() as u8;
    data[DAY] = date.day0() as u8;
    data[HOUR] = date.hour() as u8;
    data[MINUTE] = date.minute() as u8;
    data[SECOND] = date.second() as u8;
    data[WEEKDAY] = date.weekday().number_from_sunday() as u8;
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn test_null_date() {
        assert_eq!(decode(&[0; 8]), None);
        assert_eq!(encode(None), [0; 8]);
    }

    #[test]
    fn test_decode_shrinkit_date() {
        // Creation date of a real ShrinkIt archive; weekday 4 is Wednesday.
        let data = [0x38, 0x0c, 0x14, 0x5f, 0x08, 0x07, 0x30, 0x04];
        assert_eq!(decode(&data), Some(datetime(1995, 8, 9, 20, 12, 56)));
    }

    #[test]
    fn test_y2k_window() {
        let data = [0, 0, 0, 5, 0, 0, 0, 0];
        assert_eq!(decode(&data), Some(datetime(2005, 1, 1, 0, 0, 0)));

        let data = [0, 0, 0, 40, 0, 0, 0, 0];
        assert_eq!(decode(&data), Some(datetime(1940, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_encode() {
        let date = datetime(1995, 8, 9, 20, 12, 56);
        assert_eq!(
            encode(Some(&date)),
            [0x38, 0x0c, 0x14, 0x5f, 0x08, 0x07, 0x00, 0x04]
        );

        let date = datetime(2012, 12, 31, 23, 59, 58);
        let data = encode(Some(&date));
        assert_eq!(data[YEAR], 12);
        assert_eq!(decode(&data), Some(date));
    }

    #[test]
    fn test_invalid_fields() {
        // Month byte 12 would be a thirteenth month.
        let data = [0, 0, 0, 90, 0, 12, 0, 0];
        assert_eq!(decode(&data), None);
    }
}
