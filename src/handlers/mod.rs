pub mod protected;
pub mod public;

use axum::http::HeaderMap;

use crate::services::auth_service::DeviceInfo;

/// Device identity from the X-Device-Id / X-Device-Type headers. Absent
/// headers are fine on login: a device id is generated and echoed back.
pub fn device_info_from_headers(headers: &HeaderMap) -> DeviceInfo {
    DeviceInfo {
        device_id: header_string(headers, "x-device-id"),
        device_type: header_string(headers, "x-device-type"),
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_device_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-device-id", HeaderValue::from_static("pixel-7"));
        headers.insert("x-device-type", HeaderValue::from_static("android"));

        let device = device_info_from_headers(&headers);
        assert_eq!(device.device_id.as_deref(), Some("pixel-7"));
        assert_eq!(device.device_type.as_deref(), Some("android"));
    }

    #[test]
    fn blank_headers_are_none() {
        let mut headers = HeaderMap::new();
        headers.insert("x-device-id", HeaderValue::from_static("  "));

        let device = device_info_from_headers(&headers);
        assert!(device.device_id.is_none());
        assert!(device.device_type.is_none());
    }
}
