//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new record identifier (hyphenated UUIDv4 string)
pub fn new_record_id() -> String {
    generate().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_id_is_parseable_v4() {
        let id = new_record_id();
        let parsed = Uuid::parse_str(&id).expect("record id should parse");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_new_record_ids_differ() {
        assert_ne!(new_record_id(), new_record_id());
    }
}
