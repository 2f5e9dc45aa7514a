//! Кодеки полезной нагрузки.
//!
//! Брокер передаёт полезную нагрузку как непрозрачные байты; кодек
//! превращает прикладные значения в байты и обратно.

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CodecError;

pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Bytes, CodecError>;

    fn decode<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
    ) -> Result<T, CodecError>;
}

/// JSON через `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Bytes, CodecError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
    ) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// MessagePack через `rmp-serde`. Структуры кодируются как map, чтобы
/// порядок полей не имел значения.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Bytes, CodecError> {
        Ok(Bytes::from(rmp_serde::to_vec_named(value)?))
    }

    fn decode<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
    ) -> Result<T, CodecError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
