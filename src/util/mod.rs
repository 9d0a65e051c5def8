pub mod env;
pub mod telemetry;

use uuid::Uuid;

/// Short prefixed identifier, e.g. `att_9f2c1b7a4d3e`.
pub fn prefixed_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &hex[..12])
}

#[cfg(test)]
mod test {
    use super::prefixed_id;

    #[test]
    fn id_carries_prefix_and_short_hex() {
        let id = prefixed_id("track");
        assert!(id.starts_with("track_"));
        assert_eq!(id.len(), "track_".len() + 12);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(prefixed_id("user"), prefixed_id("user"));
    }
}
