/// Returns the current local time formatted as YYYY-MM-DD HH:MM:SS TZ
#[cfg(target_family = "unix")]
pub fn now() -> String {
    use std::ffi::{CStr, CString};
    use std::time::{SystemTime, UNIX_EPOCH};

    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs() as libc::time_t;

    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    unsafe {
        libc::localtime_r(&seconds, &mut tm);
    }

    let format = CString::new("%Y-%m-%d %H:%M:%S %Z").unwrap();
    let mut buf = [0i8; 100];
    unsafe {
        libc::strftime(buf.as_mut_ptr(), buf.len(), format.as_ptr(), &tm);
        CStr::from_ptr(buf.as_ptr()).to_string_lossy().to_string()
    }
}

/// Returns the current local time formatted as YYYY-MM-DD HH:MM:SS TZ
#[cfg(target_family = "windows")]
pub fn now() -> String {
    use windows_sys::Win32::Foundation::SYSTEMTIME;
    use windows_sys::Win32::System::SystemInformation::GetLocalTime;
    use windows_sys::Win32::System::Time::{GetTimeZoneInformation, TIME_ZONE_INFORMATION};

    let mut tm: SYSTEMTIME = unsafe { std::mem::zeroed() };
    let mut tz: TIME_ZONE_INFORMATION = unsafe { std::mem::zeroed() };
    unsafe {
        GetLocalTime(&mut tm);
        GetTimeZoneInformation(&mut tz);
    }

    let tz_name: Vec<u16> = tz
        .StandardName
        .iter()
        .copied()
        .take_while(|c| *c != 0)
        .collect();

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} {}",
        tm.wYear,
        tm.wMonth,
        tm.wDay,
        tm.wHour,
        tm.wMinute,
        tm.wSecond,
        String::from_utf16_lossy(&tz_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_has_date_and_time_parts() {
        let stamp = now();
        // YYYY-MM-DD HH:MM:SS plus a timezone suffix
        assert!(stamp.len() >= 19, "unexpected timestamp: {}", stamp);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[13..14], ":");
    }
}
