//! Argument building for `adb shell`.
//!
//! `adb shell` joins everything after `shell` with spaces and hands the
//! result to the device's `sh`. Every word is single-quoted so scanned
//! payloads reach the device command unchanged.

/// Arguments for `adb [-s serial] shell <command...>`.
pub fn shell_args(serial: Option<&str>, command: &[&str]) -> Vec<String> {
    let mut args = Vec::with_capacity(command.len() + 3);

    if let Some(serial) = serial {
        args.extend(["-s".to_string(), serial.to_string()]);
    }

    args.push("shell".to_string());
    args.extend(command.iter().map(|word| shell_quote(word)));
    args
}

/// Quote one word for POSIX `sh`: wrap in `'…'`, embedded `'` becomes `'\''`.
pub fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}
