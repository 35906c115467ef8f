use bytes::Bytes;

/// The payload a handler or middleware produced for the response.
///
/// Text is sent as UTF-8, binary payloads are passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    Binary(Bytes),
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Byte length of the body once encoded for the wire.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Text(text) => Bytes::from(text),
            Self::Binary(bytes) => bytes,
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Bytes> for ResponseBody {
    fn from(value: Bytes) -> Self {
        Self::Binary(value)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::ResponseBody;
    use bytes::Bytes;

    #[test]
    fn len_counts_utf8_bytes() {
        let body = ResponseBody::from("héllo".to_string());
        assert_eq!(body.len(), 6);
        assert!(!body.is_empty());
    }

    #[test]
    fn binary_passes_through() {
        let raw = vec![0u8, 159, 146, 150];
        let body = ResponseBody::from(raw.clone());
        assert_eq!(body.as_bytes(), &raw[..]);
        assert_eq!(body.into_bytes(), Bytes::from(raw));
    }

    #[test]
    fn default_is_empty_text() {
        assert_eq!(ResponseBody::default(), ResponseBody::Text(String::new()));
        assert!(ResponseBody::default().is_empty());
    }
}
