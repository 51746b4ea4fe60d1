//! 域名名称处理
//!
//! The API stores record sets under zone-relative names; callers work with
//! fully-qualified names. Zone names are kept without the trailing dot.

/// Relative name of the record set at the zone apex.
pub const APEX: &str = "@";

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

/// 将完整域名转换为相对名称
/// 如: "www.example.com." + "example.com" -> "www"
/// 如: "example.com" + "example.com" -> "@"
/// `None` for names outside the zone.
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> Option<String> {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    if full == zone {
        Some(APEX.to_string())
    } else {
        full.strip_suffix(&format!(".{zone}"))
            .filter(|subdomain| !subdomain.is_empty())
            .map(ToString::to_string)
    }
}

/// 将相对名称转换为完整域名
/// 如: "www" + "example.com" -> "www.example.com"
/// 如: "@" + "example.com" -> "example.com"
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);

    if relative_name == APEX || relative_name.is_empty() {
        zone
    } else {
        format!("{relative_name}.{zone}")
    }
}
