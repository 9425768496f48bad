// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 为缺少协议的输入补全 `https://`
pub fn ensure_scheme(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

/// 解析用户提交的扫描地址，只接受 http/https
pub fn parse_scan_url(raw: &str) -> Result<Url, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("URL is required".to_string());
    }
    let url = Url::parse(&ensure_scheme(raw)).map_err(|e| format!("Invalid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err("Invalid URL: missing host".to_string()),
        other => Err(format!("Invalid URL: unsupported scheme '{}'", other)),
    }
}

/// 解码后的路径，`/de/%C3%BCber-uns` 返回 `/de/über-uns`
pub fn decoded_path(url: &Url) -> String {
    let bytes = urlencoding::decode_binary(url.path().as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// 缓存键使用的规范化形式：小写主机 + 原样路径，去掉末尾斜杠
///
/// 协议、查询和片段不参与；无法解析的输入只去掉末尾斜杠
pub fn normalize_for_cache(raw: &str) -> String {
    let normalized = match Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default().to_lowercase();
            format!("{}{}", host, url.path())
        }
        Err(_) => raw.to_string(),
    };
    normalized.trim_end_matches('/').to_string()
}
