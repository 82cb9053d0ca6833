use crate::EncodedStringsError;
use encoding_rs::WINDOWS_1252;

type Result<T> = std::result::Result<T, EncodedStringsError>;

/// Filenames in MIX name databases are stored in the Windows ANSI code page.
pub fn from_windows_1252(bytes: &[u8]) -> String {
    let (result, _, _) = WINDOWS_1252.decode(bytes);
    result.into()
}

pub fn to_windows_1252(string: &str) -> Result<Vec<u8>> {
    let (result, _, has_errors) = WINDOWS_1252.encode(string);
    if has_errors {
        Err(EncodedStringsError::EncodingFailed(
            string.to_string(),
            "WINDOWS-1252".to_string(),
        ))
    } else {
        Ok(result.into())
    }
}
