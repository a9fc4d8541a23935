//! Playback URL construction
//!
//! Pure string templating over the CDN host and the assigned node's address;
//! no state. HLS and DASH ride the CDN, WebRTC and RTMP go straight to the
//! node that ingested the stream.

use serde::{Deserialize, Serialize};

use crate::registry::StreamKey;

/// Addressing configuration for playback URLs
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// CDN hostname fronting HLS/DASH segment delivery
    pub cdn_host: String,

    /// Application path component on the ingest nodes
    pub app: String,

    /// RTMP playback port on the ingest nodes
    pub rtmp_port: u16,

    /// Address used when a stream has no resolvable assigned node
    pub fallback_address: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            cdn_host: "cdn.platform.com".to_owned(),
            app: "live".to_owned(),
            rtmp_port: 1936,
            fallback_address: "127.0.0.1".to_owned(),
        }
    }
}

impl PlaybackConfig {
    /// Set the CDN host
    pub fn cdn_host(mut self, host: impl Into<String>) -> Self {
        self.cdn_host = host.into();
        self
    }

    /// Set the application path component
    pub fn app(mut self, app: impl Into<String>) -> Self {
        self.app = app.into();
        self
    }

    /// Set the RTMP playback port
    pub fn rtmp_port(mut self, port: u16) -> Self {
        self.rtmp_port = port;
        self
    }

    /// Set the fallback node address
    pub fn fallback_address(mut self, address: impl Into<String>) -> Self {
        self.fallback_address = address.into();
        self
    }
}

/// Playback URLs for one stream across all supported protocols
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackUrls {
    /// HLS manifest via CDN
    pub hls: String,
    /// DASH manifest via CDN
    pub dash: String,
    /// WebRTC playback straight from the ingest node
    pub webrtc: String,
    /// RTMP playback straight from the ingest node
    pub rtmp: String,
}

/// Build the full URL set for a stream
///
/// `node_address` is the assigned node's endpoint when known; the configured
/// fallback is used otherwise.
pub fn playback_urls(
    config: &PlaybackConfig,
    key: &StreamKey,
    node_address: Option<&str>,
) -> PlaybackUrls {
    let node = node_address.unwrap_or(&config.fallback_address);

    PlaybackUrls {
        hls: format!("https://{}/{}/{}.m3u8", config.cdn_host, config.app, key),
        dash: format!("https://{}/{}/{}.mpd", config.cdn_host, config.app, key),
        webrtc: format!("webrtc://{}/{}/{}", node, config.app, key),
        rtmp: format!("rtmp://{}:{}/{}/{}", node, config.rtmp_port, config.app, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_with_assigned_node() {
        let config = PlaybackConfig::default().cdn_host("cdn.example.net");
        let key = StreamKey::new("abc123");

        let urls = playback_urls(&config, &key, Some("203.0.113.9"));

        assert_eq!(urls.hls, "https://cdn.example.net/live/abc123.m3u8");
        assert_eq!(urls.dash, "https://cdn.example.net/live/abc123.mpd");
        assert_eq!(urls.webrtc, "webrtc://203.0.113.9/live/abc123");
        assert_eq!(urls.rtmp, "rtmp://203.0.113.9:1936/live/abc123");
    }

    #[test]
    fn test_urls_fall_back_without_node() {
        let config = PlaybackConfig::default();
        let key = StreamKey::new("abc123");

        let urls = playback_urls(&config, &key, None);

        assert_eq!(urls.webrtc, "webrtc://127.0.0.1/live/abc123");
        assert_eq!(urls.rtmp, "rtmp://127.0.0.1:1936/live/abc123");
    }

    #[test]
    fn test_config_builder() {
        let config = PlaybackConfig::default()
            .cdn_host("edge.cdn.io")
            .app("broadcast")
            .rtmp_port(1935)
            .fallback_address("198.51.100.1");

        assert_eq!(config.cdn_host, "edge.cdn.io");
        assert_eq!(config.app, "broadcast");
        assert_eq!(config.rtmp_port, 1935);
        assert_eq!(config.fallback_address, "198.51.100.1");
    }
}
