//! 直接从 PDF 字节中读取内嵌文本
//!
//! 不解析对象结构：找到每个 `stream … endstream`，zlib 解压，
//! 取出内容流里所有括号字符串。解压失败的流直接跳过。

use std::io::Read;
use std::sync::LazyLock;

use flate2::read::ZlibDecoder;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use tracing::debug;

static STREAM_START_RE: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"stream\r?\n").expect("stream 正则"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("空白正则"));

const END_MARKER: &[u8] = b"endstream";

/// 整个 PDF → 一段以单个空格分隔的文本
pub fn extract_text(data: &[u8]) -> String {
    let mut literals: Vec<Vec<u8>> = Vec::new();
    let mut inflated_count = 0usize;
    let mut skipped_count = 0usize;

    for raw in raw_streams(data) {
        match inflate(raw) {
            Some(decoded) => {
                inflated_count += 1;
                literals.extend(literal_strings(&decoded));
            }
            None => skipped_count += 1,
        }
    }

    debug!(
        "内容流: 解压 {} 个, 跳过 {} 个, 字符串 {} 段",
        inflated_count,
        skipped_count,
        literals.len()
    );

    let joined = literals.join(&b'\n');
    let printable: Vec<u8> = joined
        .into_iter()
        .filter(|b| matches!(*b, b'\t' | b'\n' | b'\r' | 0x20..=0x7E))
        .collect();
    let text = String::from_utf8_lossy(&printable);
    WHITESPACE_RE.replace_all(&text, " ").into_owned()
}

/// 所有 `stream\r?\n` 与其后第一个 `endstream` 之间的原始字节
fn raw_streams(data: &[u8]) -> Vec<&[u8]> {
    STREAM_START_RE
        .find_iter(data)
        .filter_map(|m| {
            let start = m.end();
            let len = data[start..]
                .windows(END_MARKER.len())
                .position(|w| w == END_MARKER)?;
            Some(&data[start..start + len])
        })
        .collect()
}

fn inflate(raw: &[u8]) -> Option<Vec<u8>> {
    let mut decoded = Vec::new();
    ZlibDecoder::new(raw).read_to_end(&mut decoded).ok()?;
    Some(decoded)
}

/// 取出 `( … )` 字符串：支持嵌套括号，反斜杠后的字节按原样保留
pub fn literal_strings(content: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < content.len() {
        if content[i] != b'(' {
            i += 1;
            continue;
        }

        i += 1;
        let mut buf = Vec::new();
        let mut depth = 1;
        while i < content.len() && depth > 0 {
            let b = content[i];
            match b {
                b'\\' if i + 1 < content.len() => {
                    buf.push(content[i + 1]);
                    i += 2;
                    continue;
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        i += 1;
                        break;
                    }
                }
                _ => {}
            }
            buf.push(b);
            i += 1;
        }

        if !buf.is_empty() {
            out.push(buf);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn compress(content: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(content).unwrap();
        enc.finish().unwrap()
    }

    fn pdf_with_streams(streams: &[Vec<u8>]) -> Vec<u8> {
        let mut pdf = b"%PDF-1.4\n".to_vec();
        for (n, s) in streams.iter().enumerate() {
            pdf.extend(format!("{} 0 obj\n<< /Length {} /Filter /FlateDecode >>\nstream\r\n", n + 1, s.len()).bytes());
            pdf.extend(s);
            pdf.extend(b"\r\nendstream\nendobj\n");
        }
        pdf.extend(b"%%EOF\n");
        pdf
    }

    #[test]
    fn test_literal_strings_nesting_and_escapes() {
        let content = br"BT (Hello) Tj (a (nested) one) Tj (esc\) paren) Tj () Tj ET";
        let lits: Vec<String> = literal_strings(content)
            .into_iter()
            .map(|l| String::from_utf8(l).unwrap())
            .collect();
        assert_eq!(lits, ["Hello", "a (nested) one", "esc) paren"]);
    }

    #[test]
    fn test_extract_text_skips_broken_streams() {
        let good = compress(b"BT (Klassenstufen) Tj (7 und 8) Tj ET");
        let broken = b"this is not zlib".to_vec();
        let second = compress(b"BT (1 L\xf6sung:) Tj (Weil   2+2=4.) Tj ET");
        let pdf = pdf_with_streams(&[good, broken, second]);

        let text = extract_text(&pdf);
        assert_eq!(text, "Klassenstufen 7 und 8 1 Lsung: Weil 2+2=4.");
    }

    #[test]
    fn test_no_streams() {
        assert_eq!(extract_text(b"%PDF-1.4\n%%EOF"), "");
    }
}
