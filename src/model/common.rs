use uuid::Uuid;

/// Store-side identifiers are opaque strings generated per run.
pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}
