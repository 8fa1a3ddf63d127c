//! Text decoding for uploaded and fetched tables.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TideError};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Encodings the decoder knows how to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    /// Korean legacy code page (EUC-KR / Windows-949).
    EucKr,
}

impl TextEncoding {
    /// Canonical label.
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::EucKr => "euc-kr",
        }
    }

    /// Decode the whole input, refusing lossy replacement.
    fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            TextEncoding::EucKr => encoding_rs::EUC_KR
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "euc-kr" | "euckr" | "cp949" | "windows-949" => Ok(TextEncoding::EucKr),
            _ => Err(format!("Unknown encoding: {}. Use utf-8 or euc-kr.", s)),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Encodings tried in order; the first clean decode wins.
    pub encodings: Vec<TextEncoding>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            encodings: vec![TextEncoding::Utf8, TextEncoding::EucKr],
        }
    }
}

/// Decoded text and the encoding that produced it.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: TextEncoding,
    /// True when an encoding other than the first configured one was needed.
    pub fallback: bool,
}

/// Decode raw bytes with the configured encodings.
pub fn decode(bytes: &[u8], config: &DecodeConfig) -> Result<Decoded> {
    for (idx, encoding) in config.encodings.iter().enumerate() {
        if let Some(text) = encoding.decode(bytes) {
            if idx > 0 {
                tracing::info!(encoding = encoding.label(), "decoded with fallback encoding");
            }
            return Ok(Decoded {
                text,
                encoding: *encoding,
                fallback: idx > 0,
            });
        }
        tracing::debug!(encoding = encoding.label(), "decode attempt failed");
    }

    Err(TideError::Decode {
        encodings: config
            .encodings
            .iter()
            .map(|e| e.label().to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("연도,해수면\n2001,3.1\n".as_bytes());

        let decoded = decode(&bytes, &DecodeConfig::default()).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert!(!decoded.fallback);
        assert!(decoded.text.starts_with("연도"));
    }

    #[test]
    fn test_euc_kr_fallback() {
        let (bytes, _, had_errors) = encoding_rs::EUC_KR.encode("연도,연평균(cm)\n2001,5.0\n");
        assert!(!had_errors);

        let decoded = decode(&bytes, &DecodeConfig::default()).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::EucKr);
        assert!(decoded.fallback);
        assert_eq!(decoded.text, "연도,연평균(cm)\n2001,5.0\n");
    }

    #[test]
    fn test_undecodable() {
        let config = DecodeConfig {
            encodings: vec![TextEncoding::Utf8],
        };
        let err = decode(&[0xff, 0xfe, 0x00, 0xc3], &config).unwrap_err();
        assert!(matches!(err, TideError::Decode { .. }));
    }

    #[test]
    fn test_parse_encoding_names() {
        assert_eq!("CP949".parse::<TextEncoding>().unwrap(), TextEncoding::EucKr);
        assert_eq!("utf8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert!("latin1".parse::<TextEncoding>().is_err());
    }
}
