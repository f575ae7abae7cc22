/*
 * mailfmt - POSIX libc time interface
 *
 * Copyright 2024 mailfmt Contributors
 *
 * This file is part of mailfmt.
 *
 * mailfmt is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * mailfmt is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with mailfmt. If not, see <http://www.gnu.org/licenses/>.
 */

//! Relative display of UNIX Epoch timestamps.
//!
//! The "is this today" comparison is made against the current instant on
//! every call (never cached), in the caller's active timezone, and the
//! rendered fields follow the active locale via `strftime`.
//!
//! # Examples
//!
//! ```rust
//! # use mailfmt::datetime::*;
//! // Get current UNIX Epoch timestamp.
//! let now: UnixTimestamp = now();
//!
//! // A message that arrived just now is rendered as time-of-day only.
//! let s = format_date_brief(now, None);
//! assert!(!s.is_empty());
//! ```

use std::{
    borrow::Cow,
    convert::TryInto,
    ffi::{CStr, CString},
    os::raw::c_int,
};

use crate::error::{Result, ResultIntoError};

pub type UnixTimestamp = u64;

pub mod formats {
    /// Time of day in the active locale.
    pub const LOCALE_TIME: &str = "%X\0";
    /// Calendar date in the active locale.
    pub const LOCALE_DATE: &str = "%x\0";
    /// Calendar date followed by time of day.
    pub const LOCALE_DATETIME: &str = "%x %X\0";
    /// Hour and minute, without seconds.
    pub const HOUR_MINUTE: &str = "%H:%M\0";
    /// Weekday name plus hour and minute, for messages from the last week.
    pub const WEEKDAY_TIME: &str = "%a %H:%M\0";
    /// Day and month plus hour and minute, for messages from the last year.
    pub const DAY_MONTH_TIME: &str = "%e %b %H:%M\0";
    pub const DEFAULT_FMT: &str = "%a, %d %b %Y %R\0";
}

use formats as fmt;

extern "C" {
    fn strftime(
        s: *mut std::os::raw::c_char,
        max: libc::size_t,
        format: *const std::os::raw::c_char,
        tm: *const libc::tm,
    ) -> libc::size_t;

    fn localtime_r(timep: *const libc::time_t, tm: *mut libc::tm) -> *mut libc::tm;

    fn gmtime_r(timep: *const libc::time_t, tm: *mut libc::tm) -> *mut libc::tm;

    fn gettimeofday(tv: *mut libc::timeval, tz: *mut libc::timezone) -> i32;
}

#[repr(i32)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
enum LocaleCategoryMask {
    Time = libc::LC_TIME_MASK,
    All = libc::LC_ALL_MASK,
}

#[repr(i32)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
enum LocaleCategory {
    Time = libc::LC_TIME,
    All = libc::LC_ALL,
}

#[allow(dead_code)]
struct Locale {
    mask: LocaleCategoryMask,
    category: LocaleCategory,
    new: libc::locale_t,
    old: libc::locale_t,
}

impl Drop for Locale {
    fn drop(&mut self) {
        unsafe {
            let _ = libc::uselocale(self.old);
            libc::freelocale(self.new);
        }
    }
}

impl Locale {
    fn new(
        mask: LocaleCategoryMask,
        category: LocaleCategory,
        locale: *const std::os::raw::c_char,
        base: libc::locale_t,
    ) -> Result<Self> {
        let new = unsafe { libc::newlocale(mask as c_int, locale, base) };
        if new.is_null() {
            return Err(nix::Error::last().into());
        }
        let old = unsafe { libc::uselocale(new) };
        if old.is_null() {
            unsafe { libc::freelocale(new) };
            return Err(nix::Error::last().into());
        }
        Ok(Self {
            mask,
            category,
            new,
            old,
        })
    }
}

fn broken_down(timestamp: UnixTimestamp, local: bool) -> libc::tm {
    let mut new_tm: libc::tm = unsafe { std::mem::zeroed() };
    unsafe {
        let i: i64 = timestamp.try_into().unwrap_or(0);
        if local {
            localtime_r(std::ptr::addr_of!(i), std::ptr::addr_of_mut!(new_tm));
        } else {
            gmtime_r(std::ptr::addr_of!(i), std::ptr::addr_of_mut!(new_tm));
        }
    }
    new_tm
}

#[inline]
fn timestamp_to_string_inner(
    timestamp: UnixTimestamp,
    fmt: Option<&str>,
    posix: bool,
    local: bool,
) -> String {
    let new_tm = broken_down(timestamp, local);
    let format: Cow<'_, CStr> = if let Some(cs) = fmt
        .map(str::as_bytes)
        .map(CStr::from_bytes_with_nul)
        .and_then(|res| res.ok())
    {
        Cow::from(cs)
    } else if let Some(cstring) = fmt
        .map(str::as_bytes)
        .map(CString::new)
        .and_then(|res| res.ok())
    {
        Cow::from(cstring)
    } else {
        unsafe { CStr::from_bytes_with_nul_unchecked(fmt::DEFAULT_FMT.as_bytes()).into() }
    };

    let mut vec: [u8; 256] = [0; 256];
    let ret = {
        let _with_locale: Option<Locale> = if posix {
            Locale::new(
                LocaleCategoryMask::Time,
                LocaleCategory::Time,
                b"C\0".as_ptr() as *const std::os::raw::c_char,
                std::ptr::null_mut(),
            )
            .chain_err_summary(|| "Could not set POSIX locale for datetime conversion")
            .map_err(|err| {
                log::debug!("{}", err);
                err
            })
            .ok()
        } else {
            None
        };

        unsafe {
            strftime(
                vec.as_mut_ptr() as *mut std::os::raw::c_char,
                256,
                format.as_ptr(),
                std::ptr::addr_of!(new_tm),
            )
        }
    };

    String::from_utf8_lossy(&vec[0..ret]).into_owned()
}

/// Return a UNIX epoch timestamp as string in the local timezone, using
/// `fmt` as the format argument passed to `strftime`. `posix` forces the
/// C locale for the conversion.
pub fn timestamp_to_string(timestamp: UnixTimestamp, fmt: Option<&str>, posix: bool) -> String {
    timestamp_to_string_inner(timestamp, fmt, posix, true)
}

/// Return a UNIX epoch timestamp as string in the UTC/GMT/+00:00 timezone,
/// using `fmt` as the format argument passed to `strftime`.
pub fn timestamp_to_string_utc(timestamp: UnixTimestamp, fmt: Option<&str>, posix: bool) -> String {
    timestamp_to_string_inner(timestamp, fmt, posix, false)
}

pub fn now() -> UnixTimestamp {
    use std::mem::MaybeUninit;
    let mut tv = MaybeUninit::<libc::timeval>::uninit();
    let mut tz = MaybeUninit::<libc::timezone>::uninit();
    unsafe {
        let ret = gettimeofday(tv.as_mut_ptr(), tz.as_mut_ptr());
        if ret == -1 {
            unreachable!("gettimeofday returned -1");
        }
        (tv.assume_init()).tv_sec as UnixTimestamp
    }
}

fn is_same_day_inner(a: UnixTimestamp, b: UnixTimestamp, local: bool) -> bool {
    let (a, b) = (broken_down(a, local), broken_down(b, local));
    a.tm_year == b.tm_year && a.tm_mon == b.tm_mon && a.tm_mday == b.tm_mday
}

/// Whether two timestamps fall on the same calendar date in the local
/// timezone, ignoring time of day.
pub fn is_same_day(a: UnixTimestamp, b: UnixTimestamp) -> bool {
    is_same_day_inner(a, b, true)
}

fn format_date_brief_inner(
    timestamp: UnixTimestamp,
    now_ts: UnixTimestamp,
    posix: bool,
    local: bool,
) -> String {
    if is_same_day_inner(timestamp, now_ts, local) {
        timestamp_to_string_inner(timestamp, Some(fmt::LOCALE_TIME), posix, local)
    } else {
        timestamp_to_string_inner(timestamp, Some(fmt::LOCALE_DATE), posix, local)
    }
}

/// Compact single-column rendering: time of day for messages from today,
/// calendar date (without time) otherwise. `now_ts` is the reference
/// instant for the same-day test; pass `None` to use the current one.
pub fn format_date_brief(timestamp: UnixTimestamp, now_ts: Option<UnixTimestamp>) -> String {
    format_date_brief_inner(timestamp, now_ts.unwrap_or_else(now), false, true)
}

fn format_date_detailed_inner(
    timestamp: UnixTimestamp,
    now_ts: UnixTimestamp,
    posix: bool,
    local: bool,
) -> String {
    if is_same_day_inner(timestamp, now_ts, local) {
        timestamp_to_string_inner(timestamp, Some(fmt::LOCALE_TIME), posix, local)
    } else {
        timestamp_to_string_inner(timestamp, Some(fmt::LOCALE_DATETIME), posix, local)
    }
}

/// Like [`format_date_brief`], but messages not from today render with both
/// calendar date and time of day.
pub fn format_date_detailed(timestamp: UnixTimestamp, now_ts: Option<UnixTimestamp>) -> String {
    format_date_detailed_inner(timestamp, now_ts.unwrap_or_else(now), false, true)
}

fn format_date_smart_inner(
    timestamp: UnixTimestamp,
    now_ts: UnixTimestamp,
    posix: bool,
    local: bool,
) -> String {
    // Clocks are not always synced properly, so accept slightly too new
    // messages as current ones.
    let now_skewed = now_ts + 15 * 60;
    if timestamp >= now_skewed {
        // Messages from the future always get the full format.
        timestamp_to_string_inner(timestamp, Some(fmt::DEFAULT_FMT), posix, local)
    } else if is_same_day_inner(timestamp, now_skewed, local)
        || timestamp + 6 * 60 * 60 > now_skewed
    {
        // Today's messages, or anything at most six hours old. The time is
        // displayed without seconds to conserve space.
        timestamp_to_string_inner(timestamp, Some(fmt::HOUR_MINUTE), posix, local)
    } else if timestamp + 7 * 24 * 60 * 60 > now_skewed {
        timestamp_to_string_inner(timestamp, Some(fmt::WEEKDAY_TIME), posix, local)
    } else if timestamp + 365 * 24 * 60 * 60 > now_skewed {
        // Messages newer than one year don't have to show the year.
        timestamp_to_string_inner(timestamp, Some(fmt::DAY_MONTH_TIME), posix, local)
    } else {
        timestamp_to_string_inner(timestamp, Some(fmt::DEFAULT_FMT), posix, local)
    }
}

/// Age-dependent rendering for message list columns: time only while the
/// message is recent, then weekday, then day and month, then the full
/// default format once it is over a year old.
pub fn format_date_smart(timestamp: UnixTimestamp, now_ts: Option<UnixTimestamp>) -> String {
    format_date_smart_inner(timestamp, now_ts.unwrap_or_else(now), false, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2020-01-08 18:44:03 UTC.
    const EPOCH: UnixTimestamp = 1578509043;
    const HOUR: UnixTimestamp = 60 * 60;
    const DAY: UnixTimestamp = 24 * HOUR;

    #[test]
    fn test_datetime_timestamp() {
        timestamp_to_string(0, None, false);
        assert_eq!(
            timestamp_to_string_utc(EPOCH, Some(formats::LOCALE_TIME), true),
            "18:44:03"
        );
        assert_eq!(
            timestamp_to_string_utc(EPOCH, Some(formats::LOCALE_DATE), true),
            "01/08/20"
        );
    }

    #[test]
    fn test_datetime_same_day() {
        assert!(is_same_day_inner(EPOCH, EPOCH, false));
        // 2020-01-08 23:59:59 UTC.
        assert!(is_same_day_inner(EPOCH, 1578527999, false));
        // 2020-01-09 00:00:00 UTC.
        assert!(!is_same_day_inner(EPOCH, 1578528000, false));
        assert!(!is_same_day_inner(EPOCH, EPOCH + 3 * DAY, false));
    }

    #[test]
    fn test_datetime_brief() {
        // Same day: time of day only.
        assert_eq!(
            format_date_brief_inner(EPOCH, EPOCH + HOUR, true, false),
            "18:44:03"
        );
        // Different day: calendar date only, no time component.
        assert_eq!(
            format_date_brief_inner(EPOCH, EPOCH + 3 * DAY, true, false),
            "01/08/20"
        );
    }

    #[test]
    fn test_datetime_detailed() {
        assert_eq!(
            format_date_detailed_inner(EPOCH, EPOCH + HOUR, true, false),
            "18:44:03"
        );
        assert_eq!(
            format_date_detailed_inner(EPOCH, EPOCH + 3 * DAY, true, false),
            "01/08/20 18:44:03"
        );
    }

    #[test]
    fn test_datetime_smart_tiers() {
        // Future messages get the full format.
        assert_eq!(
            format_date_smart_inner(EPOCH + DAY, EPOCH, true, false),
            "Thu, 09 Jan 2020 18:44"
        );
        // Today.
        assert_eq!(
            format_date_smart_inner(EPOCH - HOUR, EPOCH, true, false),
            "17:44"
        );
        // Anything at most six hours old still renders as time of day.
        assert_eq!(
            format_date_smart_inner(EPOCH - 5 * HOUR, EPOCH, true, false),
            "13:44"
        );
        // Last week: weekday and time.
        assert_eq!(
            format_date_smart_inner(EPOCH - 3 * DAY, EPOCH, true, false),
            "Sun 18:44"
        );
        // Last year: day and month.
        assert_eq!(
            format_date_smart_inner(EPOCH - 20 * DAY, EPOCH, true, false),
            "19 Dec 18:44"
        );
        // Older than a year: full format again.
        assert_eq!(
            format_date_smart_inner(EPOCH - 400 * DAY, EPOCH, true, false),
            "Tue, 04 Dec 2018 18:44"
        );
    }
}
