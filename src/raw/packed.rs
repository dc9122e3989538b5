use std::{
    fmt::Formatter,
    io::{Read, Write},
    iter,
    marker::PhantomData,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
};

use crate::error::{TerrainError, TerrainResult};

/// How arrays are written out. Readers accept both.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Packing {
    #[default]
    Plain,
    Packed,
}

/// A fixed-width integer that can be stored in a packed array.
pub trait PackedInt: Copy {
    const WIDTH: usize;

    fn write_le(self, out: &mut Vec<u8>);

    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! packed_int {
    ($($t:ty),*) => {$(
        impl PackedInt for $t {
            const WIDTH: usize = size_of::<$t>();

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0; size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf)
            }
        }
    )*};
}

packed_int!(u8, u16, u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackedArray<T> {
    Plain(Vec<T>),
    /// Base64 of the zlib stream.
    Packed(String),
}

impl<T> Default for PackedArray<T> {
    fn default() -> Self {
        PackedArray::Plain(Vec::new())
    }
}

fn codec_error(e: impl std::fmt::Display) -> TerrainError {
    TerrainError::Codec(e.to_string())
}

impl<T: PackedInt> PackedArray<T> {
    pub fn pack(values: &[T], packing: Packing) -> TerrainResult<Self> {
        match packing {
            Packing::Plain => Ok(PackedArray::Plain(values.to_vec())),
            Packing::Packed => {
                let mut bytes = Vec::with_capacity(values.len() * T::WIDTH);
                for &value in values {
                    value.write_le(&mut bytes);
                }
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&bytes).map_err(codec_error)?;
                let compressed = encoder.finish().map_err(codec_error)?;
                Ok(PackedArray::Packed(STANDARD.encode(compressed)))
            }
        }
    }

    pub fn unpack(&self) -> TerrainResult<Vec<T>> {
        let text = match self {
            PackedArray::Plain(values) => return Ok(values.clone()),
            PackedArray::Packed(text) => text,
        };
        let compressed = STANDARD.decode(text.trim()).map_err(codec_error)?;
        let mut bytes = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut bytes).map_err(codec_error)?;
        if bytes.len() % T::WIDTH != 0 {
            return Err(TerrainError::Codec(format!(
                "{} bytes do not divide into {}-byte integers",
                bytes.len(),
                T::WIDTH
            )));
        }
        Ok(bytes.chunks_exact(T::WIDTH).map(T::read_le).collect())
    }

    pub fn is_packed(&self) -> bool {
        matches!(self, PackedArray::Packed(_))
    }
}

impl<T: Serialize> Serialize for PackedArray<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PackedArray::Plain(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            PackedArray::Packed(text) => serializer.serialize_str(text),
        }
    }
}

struct PackedArrayVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for PackedArrayVisitor<T> {
    type Value = PackedArray<T>;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("an array of integers or a base64 string of packed integers")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(PackedArray::Packed(v.to_string()))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let values = iter::from_fn(|| seq.next_element::<T>().transpose())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PackedArray::Plain(values))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PackedArray<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PackedArrayVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use test_case::test_case;

    use super::*;

    #[test_case(Packing::Plain)]
    #[test_case(Packing::Packed)]
    fn values_survive_packing(packing: Packing) {
        let values = vec![0u16, 1, 258, u16::MAX, 7];
        let packed = PackedArray::pack(&values, packing).unwrap();

        assert_eq!(packed.is_packed(), packing == Packing::Packed);
        assert_eq!(packed.unpack().unwrap(), values);
    }

    #[test]
    fn packed_layout_is_little_endian_zlib() {
        let PackedArray::Packed(text) = PackedArray::pack(&[0x0102u16], Packing::Packed).unwrap() else {
            panic!("expected packed output");
        };
        let compressed = STANDARD.decode(text).unwrap();
        // zlib header with the default compression level.
        assert_eq!(compressed[0], 0x78);
        let mut bytes = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, vec![0x02, 0x01]);
    }

    #[test]
    fn corrupt_input_is_a_codec_error() {
        let not_base64 = PackedArray::<u8>::Packed("%%%".to_string());
        assert_matches!(not_base64.unpack(), Err(TerrainError::Codec(_)));

        let not_zlib = PackedArray::<u8>::Packed(STANDARD.encode([1, 2, 3]));
        assert_matches!(not_zlib.unpack(), Err(TerrainError::Codec(_)));

        let odd = PackedArray::pack(&[1u8, 2, 3], Packing::Packed).unwrap();
        let PackedArray::Packed(text) = odd else { unreachable!() };
        assert_matches!(PackedArray::<u16>::Packed(text).unpack(), Err(TerrainError::Codec(_)));
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Holder {
        values: PackedArray<u8>,
    }

    #[test]
    fn toml_accepts_both_forms() {
        let plain: Holder = toml::from_str("values = [1, 2, 3]").unwrap();
        assert_eq!(plain.values, PackedArray::Plain(vec![1, 2, 3]));

        let packed = PackedArray::pack(&[1u8, 2, 3], Packing::Packed).unwrap();
        let text = toml::to_string(&Holder { values: packed.clone() }).unwrap();
        let parsed: Holder = toml::from_str(&text).unwrap();
        assert_eq!(parsed.values, packed);
        assert_eq!(parsed.values.unpack().unwrap(), vec![1, 2, 3]);
    }
}
