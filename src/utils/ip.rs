//! IP 地址处理工具
//!
//! 解析路径中的地址参数，并为 `me` 解析出调用方的地址：
//! - 默认使用连接的对端地址
//! - 对端在可信代理列表（IP 或 CIDR）中时，使用 X-Forwarded-For / X-Real-IP

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// 代表调用方自身地址的路径参数
pub const SELF_ADDRESS_TOKEN: &str = "me";

/// 客户端地址解析策略
#[derive(Debug, Clone, Default)]
pub struct ClientAddressPolicy {
    trusted_proxies: Vec<String>,
}

impl ClientAddressPolicy {
    pub fn new(trusted_proxies: Vec<String>) -> Self {
        Self { trusted_proxies }
    }

    /// 解析调用方地址
    ///
    /// 没有对端地址（如 Unix socket）时返回 `None`。
    pub fn client_ip(&self, req: &HttpRequest) -> Option<IpAddr> {
        let peer_ip = req.peer_addr()?.ip();

        if is_trusted_proxy(&peer_ip, &self.trusted_proxies)
            && let Some(forwarded) = extract_forwarded_ip_from_headers(req.headers())
        {
            debug!("Trusted proxy {} -> {}", peer_ip, forwarded);
            return Some(forwarded);
        }

        Some(peer_ip)
    }

    /// 把路径参数解析为查询地址：`me` → 调用方地址，否则按 IPv4/IPv6 文本解析
    pub fn resolve(&self, token: &str, req: &HttpRequest) -> Option<IpAddr> {
        if token == SELF_ADDRESS_TOKEN {
            self.client_ip(req)
        } else {
            parse_ip(token)
        }
    }
}

/// 严格解析 IPv4 / IPv6 文本
pub fn parse_ip(text: &str) -> Option<IpAddr> {
    text.parse().ok()
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &IpAddr, trusted_proxies: &[String]) -> bool {
    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(ip, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|addr| addr == *ip)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false, // IPv4 vs IPv6 不匹配
    }
}

/// 从 HeaderMap 提取转发的 IP
///
/// 优先 X-Forwarded-For 的第一个地址（原始客户端），其次 X-Real-IP。
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| parse_ip(s.trim()))
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| parse_ip(s.trim()))
        })
}
