use uuid::Uuid;

/// Time-ordered record id; sorts consistently with `created_at`.
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}
