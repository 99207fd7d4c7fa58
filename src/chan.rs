//! Channel name helpers.

/// Extension methods for channel-name strings.
pub trait ChannelExt {
    /// Prefix a `#` unless the name already starts with one.
    ///
    /// ```
    /// use slirc_session::ChannelExt;
    ///
    /// assert_eq!("general".normalize_channel(), "#general");
    /// assert_eq!("#general".normalize_channel(), "#general");
    /// ```
    fn normalize_channel(&self) -> String;
}

impl ChannelExt for str {
    fn normalize_channel(&self) -> String {
        if self.starts_with('#') {
            self.to_owned()
        } else {
            format!("#{self}")
        }
    }
}

impl ChannelExt for String {
    fn normalize_channel(&self) -> String {
        self.as_str().normalize_channel()
    }
}
