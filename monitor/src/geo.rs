// Standard library imports
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

// Third party imports
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

// Internal imports
use pnode_common::{
    types::{DEFAULT_COUNTRY, DEFAULT_REGION, UNKNOWN},
    GeoLocation, MemoryCache, MonitorError, MonitorResult,
};

/// Cache vị trí theo IP đã làm sạch
pub type GeoCache = MemoryCache<String, GeoLocation>;

/// Dịch vụ tra cứu vị trí bên ngoài
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Tra cứu vị trí của một IP (đã làm sạch)
    async fn lookup(&self, ip: &str) -> MonitorResult<GeoLocation>;
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    region_code: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

/// Tra cứu qua ipapi.co: `GET {base}/{ip}/json/`
#[derive(Debug, Clone)]
pub struct IpApiLookup {
    base_url: String,
    client: reqwest::Client,
}

impl IpApiLookup {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> MonitorResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl GeoLookup for IpApiLookup {
    async fn lookup(&self, ip: &str) -> MonitorResult<GeoLocation> {
        let url = format!("{}/{}/json/", self.base_url, ip);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MonitorError::geo_error(format!("request for {} failed: {}", ip, e)))?;

        if !response.status().is_success() {
            // 429 khi bị giới hạn tần suất
            return Err(MonitorError::geo_error(format!(
                "lookup for {} failed with status: {}",
                ip,
                response.status()
            )));
        }

        let body: IpApiResponse = response.json().await?;
        Ok(location_from_codes(body.region_code, body.country_code))
    }
}

fn location_from_codes(region: Option<String>, country: Option<String>) -> GeoLocation {
    let region = region
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REGION.to_string());
    let country = country
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
    GeoLocation { region, country }
}

/// Bỏ phần port khỏi địa chỉ mạng
pub fn clean_ip(address: &str) -> String {
    let address = address.trim();
    if let Ok(socket) = address.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    // IP không kèm port (kể cả IPv6 trần)
    if let Ok(ip) = address.parse::<IpAddr>() {
        return ip.to_string();
    }
    address.split(':').next().unwrap_or_default().to_string()
}

/// Phân giải IP thành vị trí, có cache.
///
/// Lỗi tra cứu không bao giờ được trả ra ngoài: trả về `Global`/`UN` và không
/// lưu kết quả âm vào cache để lần sau có thể thử lại.
#[derive(Clone)]
pub struct GeoResolver {
    lookup: Arc<dyn GeoLookup>,
    cache: Arc<GeoCache>,
}

impl GeoResolver {
    /// Tạo resolver với cache do bên gọi sở hữu
    pub fn new(lookup: Arc<dyn GeoLookup>, cache: Arc<GeoCache>) -> Self {
        Self { lookup, cache }
    }

    pub fn cache(&self) -> &Arc<GeoCache> {
        &self.cache
    }

    pub async fn resolve(&self, address: &str) -> GeoLocation {
        if address.trim().is_empty() || address == UNKNOWN {
            return GeoLocation::default();
        }

        let ip = clean_ip(address);
        if ip.is_empty() {
            return GeoLocation::default();
        }

        if let Some(hit) = self.cache.get(ip.as_str()).await {
            return hit;
        }

        match self.lookup.lookup(&ip).await {
            Ok(location) => {
                self.cache.insert(ip, location.clone()).await;
                location
            }
            Err(e) => {
                debug!("Geo lookup for {} degraded to default: {}", ip, e);
                GeoLocation::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_with(mock: MockGeoLookup) -> GeoResolver {
        GeoResolver::new(Arc::new(mock), Arc::new(GeoCache::new()))
    }

    #[test]
    fn test_clean_ip() {
        assert_eq!(clean_ip("1.2.3.4:8001"), "1.2.3.4");
        assert_eq!(clean_ip("1.2.3.4"), "1.2.3.4");
        assert_eq!(clean_ip("[2001:db8::1]:8001"), "2001:db8::1");
        assert_eq!(clean_ip(" 10.0.0.1:80 "), "10.0.0.1");
        assert_eq!(clean_ip("2001:db8::1"), "2001:db8::1");
        assert_eq!(clean_ip("::1"), "::1");
    }

    #[test]
    fn test_location_from_codes_defaults() {
        let geo = location_from_codes(None, Some(String::new()));
        assert_eq!(geo, GeoLocation::default());

        let geo = location_from_codes(Some("CA".to_string()), None);
        assert_eq!(geo, GeoLocation::new("CA", "UN"));
    }

    /// Cùng một IP chỉ tra cứu một lần
    #[tokio::test]
    async fn test_cache_idempotence() {
        let mut mock = MockGeoLookup::new();
        mock.expect_lookup()
            .withf(|ip| ip == "8.8.4.4")
            .times(1)
            .returning(|_| Ok(GeoLocation::new("CA", "US")));
        let resolver = resolver_with(mock);

        let first = resolver.resolve("8.8.4.4:8001").await;
        let second = resolver.resolve("8.8.4.4").await;
        assert_eq!(first, GeoLocation::new("CA", "US"));
        assert_eq!(first, second);
        assert_eq!(resolver.cache().len().await, 1);
    }

    /// Chuỗi rỗng và "Unknown" không gọi dịch vụ ngoài
    #[tokio::test]
    async fn test_empty_and_unknown_short_circuit() {
        let mut mock = MockGeoLookup::new();
        mock.expect_lookup().times(0);
        let resolver = resolver_with(mock);

        assert_eq!(resolver.resolve("").await, GeoLocation::new("Global", "UN"));
        assert_eq!(resolver.resolve("Unknown").await, GeoLocation::new("Global", "UN"));
        assert!(resolver.cache().is_empty().await);
    }

    /// Lỗi mạng trả về mặc định và không được cache
    #[tokio::test]
    async fn test_failure_degrades_without_caching() {
        let mut mock = MockGeoLookup::new();
        mock.expect_lookup()
            .withf(|ip| ip == "8.8.8.8")
            .times(2)
            .returning(|_| Err(MonitorError::geo_error("network unreachable")));
        let resolver = resolver_with(mock);

        assert_eq!(resolver.resolve("8.8.8.8").await, GeoLocation::new("Global", "UN"));
        assert!(resolver.cache().is_empty().await);

        // Lần thử lại vẫn gọi dịch vụ
        assert_eq!(resolver.resolve("8.8.8.8").await, GeoLocation::default());
    }

    /// Cache được chia sẻ và có thể xóa từ bên ngoài
    #[tokio::test]
    async fn test_injected_cache_can_be_cleared() {
        let cache = Arc::new(GeoCache::new());
        cache.insert("1.1.1.1".to_string(), GeoLocation::new("NSW", "AU")).await;

        let mut mock = MockGeoLookup::new();
        mock.expect_lookup()
            .times(1)
            .returning(|_| Ok(GeoLocation::new("QLD", "AU")));
        let resolver = GeoResolver::new(Arc::new(mock), cache.clone());

        assert_eq!(resolver.resolve("1.1.1.1").await, GeoLocation::new("NSW", "AU"));
        cache.clear().await;
        assert_eq!(resolver.resolve("1.1.1.1").await, GeoLocation::new("QLD", "AU"));
    }
}
