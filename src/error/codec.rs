use thiserror::Error;

/// Ошибка кодирования/декодирования полезной нагрузки.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),
}

// === Преобразования ===

/// Ошибки `serde_json` при `?` считаются ошибками декодирования; кодирование
/// JSON оборачивается в [`CodecError::Encode`] явно.
impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Decode(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        CodecError::Encode(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        CodecError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_syntax_error_is_decode() {
        let err = serde_json::from_slice::<u32>(b"{not json").unwrap_err();
        let converted: CodecError = err.into();
        assert!(matches!(converted, CodecError::Decode(_)));
    }

    #[test]
    fn test_msgpack_decode_error() {
        let err = rmp_serde::from_slice::<String>(&[0xc1]).unwrap_err();
        let converted: CodecError = err.into();
        assert!(matches!(converted, CodecError::Decode(_)));
    }
}
