use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("Out of bounds read of {1} byte(s) at '0x{0:x}' in a buffer of size '0x{2:x}'.")]
    OutOfBounds(usize, usize, usize),

    #[error("Fell out of buffer while reading a null-terminated string at '0x{0:x}'.")]
    UnterminatedString(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodedStringsError {
    #[error("Failed to encode string {0} with encoding {1}.")]
    EncodingFailed(String, String),
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Malformed MIX header: {0}.")]
    MalformedHeader(String),

    #[error("No entry named '{0}' in the archive.")]
    NotFound(String),

    #[error("Entry '{0}' is not a MIX archive.")]
    NotAContainer(String),

    #[error("The archive body is encrypted.")]
    Encrypted,

    #[error("Entry {0:08X} at '0x{1:x}' with size '0x{2:x}' does not fit a body of size '0x{3:x}'.")]
    EntryOutOfBounds(u32, usize, usize, usize),

    #[error(transparent)]
    CursorError(#[from] CursorError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Format80Error {
    #[error("Input ended at '0x{0:x}' before the end-of-stream marker.")]
    TruncatedInput(usize),

    #[error("Command at input '0x{0:x}' writes {1} byte(s) past an output of size '0x{2:x}'.")]
    OutputOverflow(usize, usize, usize),

    #[error("Command at input '0x{0:x}' references source '0x{1:x}' which is not before destination '0x{2:x}'.")]
    BadReference(usize, usize, usize),

    #[error("Command at input '0x{0:x}' reaches back {1} byte(s) from destination '0x{2:x}'.")]
    BadDistance(usize, usize, usize),
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Entries '{1}' and '{2}' share the id {0:08X}.")]
    DuplicateId(u32, String, String),

    #[error("Invalid filename '{0}'.")]
    InvalidFilename(String),

    #[error("Too many entries for a MIX index: {0}.")]
    TooManyEntries(usize),

    #[error("Archive body of {0} bytes does not fit in 32 bits.")]
    TooLarge(usize),

    #[error(transparent)]
    EncodedStringsError(#[from] EncodedStringsError),

    #[error(transparent)]
    NameDatabaseError(#[from] NameDatabaseError),
}

#[derive(Error, Debug)]
pub enum NameDatabaseError {
    #[error("Local mix database signature does not match.")]
    BadSignature,

    #[error("Unsupported local mix database type {0} / version {1}.")]
    UnsupportedVersion(u32, u32),

    #[error("Local mix database declares {0} bytes but the entry holds {1}.")]
    SizeMismatch(usize, usize),

    #[error(transparent)]
    CursorError(#[from] CursorError),

    #[error(transparent)]
    EncodedStringsError(#[from] EncodedStringsError),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Unrecognized palette data of length {0}.")]
    Unrecognized(usize),

    #[error("Malformed JASC palette at line {0}.")]
    MalformedText(usize),

    #[error("No palette file to load for a {0} selection.")]
    NothingToLoad(String),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("No layers were provided.")]
    NoLayers,

    #[error("Resource '{0}' was not found in any layer.")]
    FileNotFound(String),

    #[error("Failed to read '{0}' due to error {1}.")]
    ReadError(String, String),

    #[error("Failed to write '{0}' due to error {1}.")]
    WriteError(String, String),

    #[error(transparent)]
    PatternError(#[from] glob::PatternError),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}
