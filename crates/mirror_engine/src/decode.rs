use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedListing {
    pub html: String,
    pub encoding_label: String,
}

/// Decode listing-page bytes into UTF-8 using: BOM -> Content-Type charset
/// -> chardetng fallback.
///
/// Deliberately lenient: malformed sequences become replacement characters
/// rather than errors, since anchors survive either way and a listing that
/// fails to decode would only under-discover its subtree.
pub fn decode_listing(bytes: &[u8], content_type: Option<&str>) -> DecodedListing {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let part = part.trim();
            part.strip_prefix("charset=")
                .or_else(|| part.strip_prefix("Charset="))
                .or_else(|| part.strip_prefix("CHARSET="))
                .map(|v| v.trim_matches([' ', '"', '\''].as_ref()))
        })
        .next()
        .map(|s| s.to_string())
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedListing {
    let (text, actual, _had_errors) = enc.decode(bytes);
    DecodedListing {
        html: text.into_owned(),
        encoding_label: actual.name().to_string(),
    }
}
