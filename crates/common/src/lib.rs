//! Shared building blocks for the directory crates: logging setup,
//! Prometheus metrics and small response types.

pub mod metrics;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn deleted_message_matches_wire_text() {
        let m = types::Message::deleted();
        assert_eq!(m.message, "Successfully Deleted");
    }
}
